//! Analysis context - One immutable snapshot of a world for the detectors

use tracing::{debug, warn};

use crate::application::ports::outbound::WorldRecordPort;
use crate::domain::entities::{Character, LoreItem, TaggedEntity, TimelineEvent};
use crate::domain::value_objects::{Relationship, WorldId};

use super::dedup::RelationshipIndex;

/// Everything a detector may look at
///
/// Detectors are pure functions of this value; nothing else is shared
/// between them.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    pub world_id: WorldId,
    pub characters: Vec<Character>,
    /// Geography entries only
    pub locations: Vec<LoreItem>,
    pub events: Vec<TimelineEvent>,
    pub tagged_entities: Vec<TaggedEntity>,
    pub relationships: RelationshipIndex,
}

impl AnalysisContext {
    pub fn new(
        world_id: WorldId,
        characters: Vec<Character>,
        lore_items: Vec<LoreItem>,
        events: Vec<TimelineEvent>,
        tagged_entities: Vec<TaggedEntity>,
        relationships: Vec<Relationship>,
    ) -> Self {
        Self {
            world_id,
            characters,
            locations: lore_items.into_iter().filter(LoreItem::is_geography).collect(),
            events,
            tagged_entities: tagged_entities
                .into_iter()
                .filter(TaggedEntity::has_tags)
                .collect(),
            relationships: RelationshipIndex::new(&relationships),
        }
    }

    /// Pull the world's collections from the store
    ///
    /// A collection that cannot be read is analyzed as empty.
    pub async fn load(store: &dyn WorldRecordPort, world_id: WorldId) -> Self {
        let characters = or_empty("characters", world_id, store.list_characters(world_id).await);
        let lore_items = or_empty("lore", world_id, store.list_lore_items(world_id).await);
        let events = or_empty("events", world_id, store.list_events(world_id).await);
        let tagged = or_empty("tagged", world_id, store.list_tagged_entities(world_id).await);
        let relationships = or_empty(
            "relationships",
            world_id,
            store.list_relationships(world_id).await,
        );

        debug!(
            world_id = %world_id,
            characters = characters.len(),
            lore_items = lore_items.len(),
            events = events.len(),
            tagged = tagged.len(),
            relationships = relationships.len(),
            "Aggregated world snapshot"
        );

        Self::new(world_id, characters, lore_items, events, tagged, relationships)
    }
}

fn or_empty<T>(collection: &str, world_id: WorldId, result: anyhow::Result<Vec<T>>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            warn!(
                world_id = %world_id,
                collection,
                "Treating unreadable collection as empty: {:#}",
                e
            );
            Vec::new()
        }
    }
}
