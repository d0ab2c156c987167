//! Tagged entity - Any record kind viewed only through its tags
//!
//! Notes and maps never take part in relationship inference except here,
//! so they are stored in this shape directly.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{EntityId, EntityRef, EntityType, WorldId};

use super::{Character, LoreItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaggedEntityKind {
    Character,
    Lore,
    Note,
    Map,
}

impl TaggedEntityKind {
    /// Relationship endpoint type for this kind of record
    ///
    /// Notes become lore endpoints and maps become location endpoints.
    pub fn endpoint_type(&self) -> EntityType {
        match self {
            TaggedEntityKind::Character => EntityType::Character,
            TaggedEntityKind::Lore | TaggedEntityKind::Note => EntityType::Lore,
            TaggedEntityKind::Map => EntityType::Location,
        }
    }
}

/// A record carrying at least one tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedEntity {
    pub id: EntityId,
    pub world_id: WorldId,
    pub kind: TaggedEntityKind,
    pub name: String,
    pub tags: Vec<String>,
}

impl TaggedEntity {
    pub fn new(
        world_id: WorldId,
        kind: TaggedEntityKind,
        name: impl Into<String>,
        tags: Vec<String>,
    ) -> Self {
        Self {
            id: EntityId::from_uuid(Uuid::new_v4()),
            world_id,
            kind,
            name: name.into(),
            tags,
        }
    }

    pub fn has_tags(&self) -> bool {
        self.tags.iter().any(|tag| !tag.trim().is_empty())
    }

    pub fn to_ref(&self) -> EntityRef {
        EntityRef::new(self.id, self.kind.endpoint_type(), self.name.clone())
    }
}

impl From<&Character> for TaggedEntity {
    fn from(character: &Character) -> Self {
        Self {
            id: character.id.into(),
            world_id: character.world_id,
            kind: TaggedEntityKind::Character,
            name: character.name.clone(),
            tags: character.tags.clone(),
        }
    }
}

impl From<&LoreItem> for TaggedEntity {
    fn from(item: &LoreItem) -> Self {
        Self {
            id: item.id.into(),
            world_id: item.world_id,
            kind: TaggedEntityKind::Lore,
            name: item.name.clone(),
            tags: item.tags.clone(),
        }
    }
}
