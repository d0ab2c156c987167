//! Recommendation API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::dto::{AnalysisResponseDto, ApplyResponseDto};
use crate::application::services::{
    AnalysisOutcome, ApplyOutcome, RecommendationError, RecommendationSnapshot,
};
use crate::domain::value_objects::{PatternId, RecommendationId, WorldId};
use crate::infrastructure::state::AppState;

use super::record_routes::observe_relationships;

fn map_error(e: RecommendationError) -> (StatusCode, String) {
    match e {
        RecommendationError::NotFound(_) | RecommendationError::PatternNotFound(_) => {
            (StatusCode::NOT_FOUND, e.to_string())
        }
        RecommendationError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

fn parse_world_id(world_id: &str) -> Result<WorldId, (StatusCode, String)> {
    Uuid::parse_str(world_id)
        .map(WorldId::from_uuid)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid world ID".to_string()))
}

/// Run relationship analysis for a world now
pub async fn analyze_world(
    State(state): State<Arc<AppState>>,
    Path(world_id): Path<String>,
) -> Result<Json<AnalysisResponseDto>, (StatusCode, String)> {
    let world_id = parse_world_id(&world_id)?;
    let service = &state.recommendation_service;

    match service.analyze(world_id).await {
        AnalysisOutcome::Skipped => Err((
            StatusCode::CONFLICT,
            "Analysis already in progress".to_string(),
        )),
        AnalysisOutcome::Completed(_) | AnalysisOutcome::Failed(_) => Ok(Json(
            AnalysisResponseDto::from_snapshot(service.snapshot().await, service.is_analyzing()),
        )),
    }
}

/// Current recommendations and patterns for a world
pub async fn get_recommendations(
    State(state): State<Arc<AppState>>,
    Path(world_id): Path<String>,
) -> Result<Json<AnalysisResponseDto>, (StatusCode, String)> {
    let world_id = parse_world_id(&world_id)?;
    let service = &state.recommendation_service;

    let mut snapshot = service.snapshot().await;
    if snapshot.world_id != Some(world_id) {
        // Switching worlds queues a run for the newly selected one
        observe_relationships(&state, world_id).await?;
        snapshot = RecommendationSnapshot {
            world_id: Some(world_id),
            ..Default::default()
        };
    }

    Ok(Json(AnalysisResponseDto::from_snapshot(snapshot, service.is_analyzing())))
}

/// Accept a recommendation, creating its relationship
pub async fn apply_recommendation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApplyResponseDto>, (StatusCode, String)> {
    let uuid = Uuid::parse_str(&id)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid recommendation ID".to_string()))?;

    let outcome = state
        .recommendation_service
        .apply_recommendation(RecommendationId::from_uuid(uuid))
        .await
        .map_err(map_error)?;

    if let ApplyOutcome::Applied(relationship) = &outcome {
        observe_relationships(&state, relationship.world_id).await?;
    }

    Ok(Json(ApplyResponseDto::from(outcome)))
}

/// Reject a recommendation
pub async fn dismiss_recommendation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let uuid = Uuid::parse_str(&id)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid recommendation ID".to_string()))?;

    state
        .recommendation_service
        .dismiss_recommendation(RecommendationId::from_uuid(uuid))
        .await
        .map_err(map_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Hide a detected pattern until the next analysis
pub async fn dismiss_pattern(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let uuid = Uuid::parse_str(&id)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid pattern ID".to_string()))?;

    state
        .recommendation_service
        .dismiss_pattern(PatternId::from_uuid(uuid))
        .await
        .map_err(map_error)?;

    Ok(StatusCode::NO_CONTENT)
}
