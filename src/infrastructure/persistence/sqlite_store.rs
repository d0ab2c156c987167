//! SQLite world record store
//!
//! Each world collection is one JSON document keyed by `(world_id, collection)`.
//! A document that no longer parses is logged and read as an empty collection.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::SqlitePool;
use tokio::sync::Mutex;

use crate::application::ports::outbound::WorldRecordPort;
use crate::domain::entities::{Character, LoreItem, TaggedEntity, TimelineEvent};
use crate::domain::value_objects::{
    RecommendationId, Relationship, RelationshipDraft, RelationshipId, WorldId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collection {
    Characters,
    Lore,
    Events,
    /// Notes and maps
    Tagged,
    Relationships,
    Dismissed,
}

impl Collection {
    fn as_str(&self) -> &'static str {
        match self {
            Collection::Characters => "characters",
            Collection::Lore => "lore",
            Collection::Events => "events",
            Collection::Tagged => "tagged",
            Collection::Relationships => "relationships",
            Collection::Dismissed => "dismissed_recommendations",
        }
    }
}

pub struct SqliteWorldStore {
    pool: SqlitePool,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl SqliteWorldStore {
    pub async fn new(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS world_collections (
                world_id TEXT NOT NULL,
                collection TEXT NOT NULL,
                payload TEXT NOT NULL,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (world_id, collection)
            )
        "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self {
            pool,
            write_lock: Mutex::new(()),
        })
    }

    #[cfg(test)]
    fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch_payload(&self, world_id: WorldId, collection: Collection) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT payload FROM world_collections WHERE world_id = ? AND collection = ?",
        )
        .bind(world_id.to_string())
        .bind(collection.as_str())
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to read {} for world {}", collection.as_str(), world_id))?;

        Ok(row.map(|(payload,)| payload))
    }

    /// Read a collection, treating a malformed document as empty
    async fn load<T: DeserializeOwned>(
        &self,
        world_id: WorldId,
        collection: Collection,
    ) -> Result<Vec<T>> {
        let Some(payload) = self.fetch_payload(world_id, collection).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&payload) {
            Ok(items) => Ok(items),
            Err(e) => {
                tracing::warn!(
                    world_id = %world_id,
                    collection = collection.as_str(),
                    "Malformed stored collection, reading as empty: {}",
                    e
                );
                Ok(Vec::new())
            }
        }
    }

    /// Read a collection for rewriting; a malformed document is an error
    async fn load_for_update<T: DeserializeOwned>(
        &self,
        world_id: WorldId,
        collection: Collection,
    ) -> Result<Vec<T>> {
        let Some(payload) = self.fetch_payload(world_id, collection).await? else {
            return Ok(Vec::new());
        };

        serde_json::from_str(&payload).with_context(|| {
            format!(
                "Stored {} for world {} is malformed, refusing to overwrite",
                collection.as_str(),
                world_id
            )
        })
    }

    async fn store<T: Serialize>(
        &self,
        world_id: WorldId,
        collection: Collection,
        items: &[T],
    ) -> Result<()> {
        let payload = serde_json::to_string(items)?;
        sqlx::query(
            "INSERT OR REPLACE INTO world_collections (world_id, collection, payload, updated_at)
             VALUES (?, ?, ?, CURRENT_TIMESTAMP)",
        )
        .bind(world_id.to_string())
        .bind(collection.as_str())
        .bind(payload)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to write {} for world {}", collection.as_str(), world_id))?;
        Ok(())
    }

    async fn modify<T, F>(&self, world_id: WorldId, collection: Collection, change: F) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>),
    {
        let _guard = self.write_lock.lock().await;
        let mut items = self.load_for_update(world_id, collection).await?;
        change(&mut items);
        self.store(world_id, collection, &items).await
    }
}

fn upsert<T: Clone, K: PartialEq>(items: &mut Vec<T>, item: &T, key: impl Fn(&T) -> K) {
    match items.iter().position(|existing| key(existing) == key(item)) {
        Some(pos) => items[pos] = item.clone(),
        None => items.push(item.clone()),
    }
}

#[async_trait]
impl WorldRecordPort for SqliteWorldStore {
    async fn list_characters(&self, world_id: WorldId) -> Result<Vec<Character>> {
        self.load(world_id, Collection::Characters).await
    }

    async fn list_lore_items(&self, world_id: WorldId) -> Result<Vec<LoreItem>> {
        self.load(world_id, Collection::Lore).await
    }

    async fn list_events(&self, world_id: WorldId) -> Result<Vec<TimelineEvent>> {
        self.load(world_id, Collection::Events).await
    }

    async fn list_tagged_entities(&self, world_id: WorldId) -> Result<Vec<TaggedEntity>> {
        let characters = self.list_characters(world_id).await?;
        let lore_items = self.list_lore_items(world_id).await?;
        let others: Vec<TaggedEntity> = self.load(world_id, Collection::Tagged).await?;

        Ok(characters
            .iter()
            .map(TaggedEntity::from)
            .chain(lore_items.iter().map(TaggedEntity::from))
            .chain(others)
            .filter(TaggedEntity::has_tags)
            .collect())
    }

    async fn list_relationships(&self, world_id: WorldId) -> Result<Vec<Relationship>> {
        self.load(world_id, Collection::Relationships).await
    }

    async fn create_relationship(&self, draft: RelationshipDraft) -> Result<Relationship> {
        let relationship = draft.into_relationship(RelationshipId::new(), chrono::Utc::now());
        let created = relationship.clone();
        self.modify(relationship.world_id, Collection::Relationships, move |items| {
            items.push(relationship)
        })
        .await?;
        tracing::debug!(relationship_id = %created.id, "Created relationship");
        Ok(created)
    }

    async fn append_dismissed_id(&self, world_id: WorldId, id: RecommendationId) -> Result<()> {
        self.modify(world_id, Collection::Dismissed, |items: &mut Vec<RecommendationId>| {
            items.push(id)
        })
        .await
    }

    async fn list_dismissed_ids(&self, world_id: WorldId) -> Result<Vec<RecommendationId>> {
        self.load(world_id, Collection::Dismissed).await
    }

    async fn save_character(&self, character: &Character) -> Result<()> {
        self.modify(character.world_id, Collection::Characters, |items| {
            upsert(items, character, |c: &Character| c.id)
        })
        .await
    }

    async fn save_lore_item(&self, item: &LoreItem) -> Result<()> {
        self.modify(item.world_id, Collection::Lore, |items| {
            upsert(items, item, |l: &LoreItem| l.id)
        })
        .await
    }

    async fn save_event(&self, event: &TimelineEvent) -> Result<()> {
        self.modify(event.world_id, Collection::Events, |items| {
            upsert(items, event, |e: &TimelineEvent| e.id)
        })
        .await
    }

    async fn save_tagged_entity(&self, entity: &TaggedEntity) -> Result<()> {
        self.modify(entity.world_id, Collection::Tagged, |items| {
            upsert(items, entity, |t: &TaggedEntity| t.id)
        })
        .await
    }
}
