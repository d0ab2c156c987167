//! World record port - The narrow contract the inference engine has with storage
//!
//! Readers return every record of one kind for a world. Adapters treat a
//! missing or unreadable collection as empty rather than failing.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::entities::{Character, LoreItem, TaggedEntity, TimelineEvent};
use crate::domain::value_objects::{RecommendationId, Relationship, RelationshipDraft, WorldId};

/// Repository port for the records of a single world
#[async_trait]
pub trait WorldRecordPort: Send + Sync {
    /// List characters in a world
    async fn list_characters(&self, world_id: WorldId) -> Result<Vec<Character>>;

    /// List lore entries of every type in a world
    async fn list_lore_items(&self, world_id: WorldId) -> Result<Vec<LoreItem>>;

    /// List timeline events across all of a world's chronologies
    async fn list_events(&self, world_id: WorldId) -> Result<Vec<TimelineEvent>>;

    /// Characters, lore, notes and maps that carry at least one tag
    async fn list_tagged_entities(&self, world_id: WorldId) -> Result<Vec<TaggedEntity>>;

    /// List relationships in a world
    async fn list_relationships(&self, world_id: WorldId) -> Result<Vec<Relationship>>;

    /// Persist a relationship, assigning its id and timestamps
    async fn create_relationship(&self, draft: RelationshipDraft) -> Result<Relationship>;

    /// Record that a recommendation was dismissed
    async fn append_dismissed_id(&self, world_id: WorldId, id: RecommendationId) -> Result<()>;

    /// Ids previously recorded by `append_dismissed_id`
    async fn list_dismissed_ids(&self, world_id: WorldId) -> Result<Vec<RecommendationId>>;

    /// Insert or replace a character
    async fn save_character(&self, character: &Character) -> Result<()>;

    /// Insert or replace a lore entry
    async fn save_lore_item(&self, item: &LoreItem) -> Result<()>;

    /// Insert or replace a timeline event
    async fn save_event(&self, event: &TimelineEvent) -> Result<()>;

    /// Insert or replace a note or map; characters and lore are tagged through their own records
    async fn save_tagged_entity(&self, entity: &TaggedEntity) -> Result<()>;
}
