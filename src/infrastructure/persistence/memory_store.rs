//! In-memory world record store

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::outbound::WorldRecordPort;
use crate::domain::entities::{Character, LoreItem, TaggedEntity, TimelineEvent};
use crate::domain::value_objects::{
    RecommendationId, Relationship, RelationshipDraft, RelationshipId, WorldId,
};

#[derive(Debug, Default, Clone)]
struct WorldRecords {
    characters: Vec<Character>,
    lore_items: Vec<LoreItem>,
    events: Vec<TimelineEvent>,
    /// Notes and maps
    tagged: Vec<TaggedEntity>,
    relationships: Vec<Relationship>,
    dismissed: Vec<RecommendationId>,
}

/// Volatile store used for tests and `STORE_BACKEND=memory`
#[derive(Debug, Default)]
pub struct InMemoryWorldStore {
    worlds: RwLock<HashMap<WorldId, WorldRecords>>,
}

impl InMemoryWorldStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a character and every relationship touching it
    #[cfg(test)]
    pub async fn delete_character(
        &self,
        world_id: WorldId,
        id: crate::domain::value_objects::CharacterId,
    ) {
        let endpoint = crate::domain::value_objects::EntityId::from(id);
        let mut worlds = self.worlds.write().await;
        if let Some(records) = worlds.get_mut(&world_id) {
            records.characters.retain(|c| c.id != id);
            records
                .relationships
                .retain(|r| r.source.id != endpoint && r.target.id != endpoint);
        }
    }
}

/// Replace by id or append, keeping insertion order
fn upsert<T: Clone, K: PartialEq>(items: &mut Vec<T>, item: &T, key: impl Fn(&T) -> K) {
    match items.iter().position(|existing| key(existing) == key(item)) {
        Some(pos) => items[pos] = item.clone(),
        None => items.push(item.clone()),
    }
}

#[async_trait]
impl WorldRecordPort for InMemoryWorldStore {
    async fn list_characters(&self, world_id: WorldId) -> Result<Vec<Character>> {
        let worlds = self.worlds.read().await;
        Ok(worlds
            .get(&world_id)
            .map(|w| w.characters.clone())
            .unwrap_or_default())
    }

    async fn list_lore_items(&self, world_id: WorldId) -> Result<Vec<LoreItem>> {
        let worlds = self.worlds.read().await;
        Ok(worlds
            .get(&world_id)
            .map(|w| w.lore_items.clone())
            .unwrap_or_default())
    }

    async fn list_events(&self, world_id: WorldId) -> Result<Vec<TimelineEvent>> {
        let worlds = self.worlds.read().await;
        Ok(worlds
            .get(&world_id)
            .map(|w| w.events.clone())
            .unwrap_or_default())
    }

    async fn list_tagged_entities(&self, world_id: WorldId) -> Result<Vec<TaggedEntity>> {
        let worlds = self.worlds.read().await;
        let Some(records) = worlds.get(&world_id) else {
            return Ok(Vec::new());
        };

        let tagged = records
            .characters
            .iter()
            .map(TaggedEntity::from)
            .chain(records.lore_items.iter().map(TaggedEntity::from))
            .chain(records.tagged.iter().cloned())
            .filter(TaggedEntity::has_tags)
            .collect();
        Ok(tagged)
    }

    async fn list_relationships(&self, world_id: WorldId) -> Result<Vec<Relationship>> {
        let worlds = self.worlds.read().await;
        Ok(worlds
            .get(&world_id)
            .map(|w| w.relationships.clone())
            .unwrap_or_default())
    }

    async fn create_relationship(&self, draft: RelationshipDraft) -> Result<Relationship> {
        let relationship = draft.into_relationship(RelationshipId::new(), chrono::Utc::now());
        let mut worlds = self.worlds.write().await;
        worlds
            .entry(relationship.world_id)
            .or_default()
            .relationships
            .push(relationship.clone());
        Ok(relationship)
    }

    async fn append_dismissed_id(&self, world_id: WorldId, id: RecommendationId) -> Result<()> {
        let mut worlds = self.worlds.write().await;
        worlds.entry(world_id).or_default().dismissed.push(id);
        Ok(())
    }

    async fn list_dismissed_ids(&self, world_id: WorldId) -> Result<Vec<RecommendationId>> {
        let worlds = self.worlds.read().await;
        Ok(worlds
            .get(&world_id)
            .map(|w| w.dismissed.clone())
            .unwrap_or_default())
    }

    async fn save_character(&self, character: &Character) -> Result<()> {
        let mut worlds = self.worlds.write().await;
        let records = worlds.entry(character.world_id).or_default();
        upsert(&mut records.characters, character, |c| c.id);
        Ok(())
    }

    async fn save_lore_item(&self, item: &LoreItem) -> Result<()> {
        let mut worlds = self.worlds.write().await;
        let records = worlds.entry(item.world_id).or_default();
        upsert(&mut records.lore_items, item, |l| l.id);
        Ok(())
    }

    async fn save_event(&self, event: &TimelineEvent) -> Result<()> {
        let mut worlds = self.worlds.write().await;
        let records = worlds.entry(event.world_id).or_default();
        upsert(&mut records.events, event, |e| e.id);
        Ok(())
    }

    async fn save_tagged_entity(&self, entity: &TaggedEntity) -> Result<()> {
        let mut worlds = self.worlds.write().await;
        let records = worlds.entry(entity.world_id).or_default();
        upsert(&mut records.tagged, entity, |t| t.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{LoreType, TaggedEntityKind};

    #[tokio::test]
    async fn test_tagged_entities_union_all_kinds() {
        let store = InMemoryWorldStore::new();
        let world_id = WorldId::new();
        store
            .save_character(&Character::new(world_id, "Mira").with_tag("mage"))
            .await
            .unwrap();
        store
            .save_character(&Character::new(world_id, "Untagged"))
            .await
            .unwrap();
        store
            .save_lore_item(&LoreItem::new(world_id, "Tower", LoreType::Geography).with_tag("mage"))
            .await
            .unwrap();
        store
            .save_tagged_entity(&TaggedEntity::new(
                world_id,
                TaggedEntityKind::Note,
                "Session 1",
                vec!["mage".into()],
            ))
            .await
            .unwrap();

        let tagged = store.list_tagged_entities(world_id).await.unwrap();

        assert_eq!(tagged.len(), 3);
        assert!(store.list_tagged_entities(WorldId::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_character_replaces_by_id() {
        let store = InMemoryWorldStore::new();
        let world_id = WorldId::new();
        let mut character = Character::new(world_id, "Mira");
        store.save_character(&character).await.unwrap();
        character.name = "Mira Vell".to_string();
        store.save_character(&character).await.unwrap();

        let characters = store.list_characters(world_id).await.unwrap();

        assert_eq!(characters.len(), 1);
        assert_eq!(characters[0].name, "Mira Vell");
    }
}
