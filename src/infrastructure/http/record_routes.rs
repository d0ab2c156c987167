//! World record API routes
//!
//! Thin list/create endpoints over the record store so a world can be
//! populated and inspected without the full content manager.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::dto::{
    CharacterResponseDto, CreateCharacterRequestDto, CreateEventRequestDto,
    CreateLoreItemRequestDto, CreateRelationshipRequestDto, CreateTaggedEntityRequestDto,
    EventResponseDto, LoreItemResponseDto, RelationshipResponseDto, TaggedEntityResponseDto,
};
use crate::domain::value_objects::WorldId;
use crate::infrastructure::state::AppState;

fn parse_world_id(world_id: &str) -> Result<WorldId, (StatusCode, String)> {
    Uuid::parse_str(world_id)
        .map(WorldId::from_uuid)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid world ID".to_string()))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e))
}

/// Hand the world's relationship count to the analysis scheduler
pub(super) async fn observe_relationships(
    state: &AppState,
    world_id: WorldId,
) -> Result<(), (StatusCode, String)> {
    let count = state
        .store
        .list_relationships(world_id)
        .await
        .map_err(internal)?
        .len();
    state.scheduler.observe(world_id, count).await;
    Ok(())
}

/// List characters in a world
pub async fn list_characters(
    State(state): State<Arc<AppState>>,
    Path(world_id): Path<String>,
) -> Result<Json<Vec<CharacterResponseDto>>, (StatusCode, String)> {
    let world_id = parse_world_id(&world_id)?;
    let characters = state.store.list_characters(world_id).await.map_err(internal)?;
    Ok(Json(characters.into_iter().map(CharacterResponseDto::from).collect()))
}

/// Create a character
pub async fn create_character(
    State(state): State<Arc<AppState>>,
    Path(world_id): Path<String>,
    Json(req): Json<CreateCharacterRequestDto>,
) -> Result<(StatusCode, Json<CharacterResponseDto>), (StatusCode, String)> {
    let world_id = parse_world_id(&world_id)?;
    let character = req.into_character(world_id);
    state.store.save_character(&character).await.map_err(internal)?;
    Ok((StatusCode::CREATED, Json(CharacterResponseDto::from(character))))
}

/// List lore entries in a world
pub async fn list_lore_items(
    State(state): State<Arc<AppState>>,
    Path(world_id): Path<String>,
) -> Result<Json<Vec<LoreItemResponseDto>>, (StatusCode, String)> {
    let world_id = parse_world_id(&world_id)?;
    let items = state.store.list_lore_items(world_id).await.map_err(internal)?;
    Ok(Json(items.into_iter().map(LoreItemResponseDto::from).collect()))
}

/// Create a lore entry
pub async fn create_lore_item(
    State(state): State<Arc<AppState>>,
    Path(world_id): Path<String>,
    Json(req): Json<CreateLoreItemRequestDto>,
) -> Result<(StatusCode, Json<LoreItemResponseDto>), (StatusCode, String)> {
    let world_id = parse_world_id(&world_id)?;
    let item = req.into_lore_item(world_id);
    state.store.save_lore_item(&item).await.map_err(internal)?;
    Ok((StatusCode::CREATED, Json(LoreItemResponseDto::from(item))))
}

/// List timeline events in a world
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Path(world_id): Path<String>,
) -> Result<Json<Vec<EventResponseDto>>, (StatusCode, String)> {
    let world_id = parse_world_id(&world_id)?;
    let events = state.store.list_events(world_id).await.map_err(internal)?;
    Ok(Json(events.into_iter().map(EventResponseDto::from).collect()))
}

/// Create a timeline event
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    Path(world_id): Path<String>,
    Json(req): Json<CreateEventRequestDto>,
) -> Result<(StatusCode, Json<EventResponseDto>), (StatusCode, String)> {
    let world_id = parse_world_id(&world_id)?;
    let event = req.into_event(world_id);
    state.store.save_event(&event).await.map_err(internal)?;
    Ok((StatusCode::CREATED, Json(EventResponseDto::from(event))))
}

/// List every tagged record in a world, characters and lore included
pub async fn list_tagged_entities(
    State(state): State<Arc<AppState>>,
    Path(world_id): Path<String>,
) -> Result<Json<Vec<TaggedEntityResponseDto>>, (StatusCode, String)> {
    let world_id = parse_world_id(&world_id)?;
    let tagged = state.store.list_tagged_entities(world_id).await.map_err(internal)?;
    Ok(Json(tagged.into_iter().map(TaggedEntityResponseDto::from).collect()))
}

/// Create a note or map
pub async fn create_tagged_entity(
    State(state): State<Arc<AppState>>,
    Path(world_id): Path<String>,
    Json(req): Json<CreateTaggedEntityRequestDto>,
) -> Result<(StatusCode, Json<TaggedEntityResponseDto>), (StatusCode, String)> {
    let world_id = parse_world_id(&world_id)?;
    let entity = req
        .into_tagged_entity(world_id)
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;
    state.store.save_tagged_entity(&entity).await.map_err(internal)?;
    Ok((StatusCode::CREATED, Json(TaggedEntityResponseDto::from(entity))))
}

/// List relationships in a world
pub async fn list_relationships(
    State(state): State<Arc<AppState>>,
    Path(world_id): Path<String>,
) -> Result<Json<Vec<RelationshipResponseDto>>, (StatusCode, String)> {
    let world_id = parse_world_id(&world_id)?;
    let relationships = state.store.list_relationships(world_id).await.map_err(internal)?;
    Ok(Json(relationships.into_iter().map(RelationshipResponseDto::from).collect()))
}

/// Create a relationship by hand
pub async fn create_relationship(
    State(state): State<Arc<AppState>>,
    Path(world_id): Path<String>,
    Json(req): Json<CreateRelationshipRequestDto>,
) -> Result<(StatusCode, Json<RelationshipResponseDto>), (StatusCode, String)> {
    let world_id = parse_world_id(&world_id)?;
    let draft = req
        .into_draft(world_id)
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    let relationship = state.store.create_relationship(draft).await.map_err(internal)?;
    observe_relationships(&state, world_id).await?;

    Ok((StatusCode::CREATED, Json(RelationshipResponseDto::from(relationship))))
}
