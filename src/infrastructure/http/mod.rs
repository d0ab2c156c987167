//! HTTP REST API routes

mod recommendation_routes;
mod record_routes;

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::infrastructure::state::AppState;

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Recommendation routes
        .route(
            "/api/worlds/{world_id}/recommendations",
            get(recommendation_routes::get_recommendations),
        )
        .route(
            "/api/worlds/{world_id}/recommendations/analyze",
            post(recommendation_routes::analyze_world),
        )
        .route(
            "/api/recommendations/{id}/apply",
            post(recommendation_routes::apply_recommendation),
        )
        .route(
            "/api/recommendations/{id}/dismiss",
            post(recommendation_routes::dismiss_recommendation),
        )
        .route(
            "/api/patterns/{id}",
            delete(recommendation_routes::dismiss_pattern),
        )
        // World record routes
        .route(
            "/api/worlds/{world_id}/characters",
            get(record_routes::list_characters).post(record_routes::create_character),
        )
        .route(
            "/api/worlds/{world_id}/lore",
            get(record_routes::list_lore_items).post(record_routes::create_lore_item),
        )
        .route(
            "/api/worlds/{world_id}/events",
            get(record_routes::list_events).post(record_routes::create_event),
        )
        .route(
            "/api/worlds/{world_id}/tagged",
            get(record_routes::list_tagged_entities).post(record_routes::create_tagged_entity),
        )
        .route(
            "/api/worlds/{world_id}/relationships",
            get(record_routes::list_relationships).post(record_routes::create_relationship),
        )
}
