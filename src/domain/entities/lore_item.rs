//! Lore entity - Encyclopedic entries about the world

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{EntityRef, EntityType, LoreItemId, WorldId};

/// Category of a lore entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoreType {
    Geography,
    History,
    Culture,
    Religion,
    Magic,
    Organization,
    #[serde(other)]
    Other,
}

/// A lore entry in the world
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoreItem {
    pub id: LoreItemId,
    pub world_id: WorldId,
    #[serde(rename = "type")]
    pub lore_type: LoreType,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl LoreItem {
    pub fn new(world_id: WorldId, name: impl Into<String>, lore_type: LoreType) -> Self {
        Self {
            id: LoreItemId::new(),
            world_id,
            lore_type,
            name: name.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn is_geography(&self) -> bool {
        self.lore_type == LoreType::Geography
    }

    /// Geography entries are places; everything else is plain lore
    pub fn to_ref(&self) -> EntityRef {
        let entity_type = if self.is_geography() {
            EntityType::Location
        } else {
            EntityType::Lore
        };
        EntityRef::new(self.id, entity_type, self.name.clone())
    }
}
