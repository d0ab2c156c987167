//! Relationship value objects - Typed edges between world records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityId, RelationshipId, WorldId};

/// Kind of record at either end of a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Character,
    Location,
    Event,
    Lore,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntityType::Character => "character",
            EntityType::Location => "location",
            EntityType::Event => "event",
            EntityType::Lore => "lore",
        };
        write!(f, "{}", s)
    }
}

/// A resolved reference to a record: enough to render and to re-resolve it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub name: String,
}

impl EntityRef {
    pub fn new(id: impl Into<EntityId>, entity_type: EntityType, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entity_type,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipStrength {
    Weak,
    Medium,
    Strong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipStatus {
    #[default]
    Active,
    Inactive,
    Broken,
}

/// A relationship not yet written to the store
///
/// Recommendations carry one of these as their payload; the store assigns
/// the id and timestamps when it is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipDraft {
    pub world_id: WorldId,
    pub source: EntityRef,
    pub target: EntityRef,
    pub relationship_type: String,
    pub description: String,
    pub strength: RelationshipStrength,
    pub status: RelationshipStatus,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_secret: bool,
}

impl RelationshipDraft {
    /// An active, public relationship with no dates
    pub fn new(
        world_id: WorldId,
        source: EntityRef,
        target: EntityRef,
        relationship_type: impl Into<String>,
        strength: RelationshipStrength,
    ) -> Self {
        Self {
            world_id,
            source,
            target,
            relationship_type: relationship_type.into(),
            description: String::new(),
            strength,
            status: RelationshipStatus::Active,
            start_date: None,
            end_date: None,
            is_secret: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_start_date(mut self, start_date: impl Into<String>) -> Self {
        self.start_date = Some(start_date.into());
        self
    }

    /// Both endpoints are distinct and the label is present
    ///
    /// Endpoint names are display text only; unnamed records are still valid endpoints.
    pub fn is_well_formed(&self) -> bool {
        !self.relationship_type.trim().is_empty() && self.source.id != self.target.id
    }

    pub fn into_relationship(self, id: RelationshipId, now: DateTime<Utc>) -> Relationship {
        Relationship {
            id,
            world_id: self.world_id,
            source: self.source,
            target: self.target,
            relationship_type: self.relationship_type,
            description: self.description,
            strength: self.strength,
            status: self.status,
            start_date: self.start_date,
            end_date: self.end_date,
            is_secret: self.is_secret,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A persisted relationship between two records of a world
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: RelationshipId,
    pub world_id: WorldId,
    pub source: EntityRef,
    pub target: EntityRef,
    pub relationship_type: String,
    #[serde(default)]
    pub description: String,
    pub strength: RelationshipStrength,
    #[serde(default)]
    pub status: RelationshipStatus,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub is_secret: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Relationship {
    /// Same unordered endpoint pair as the draft
    pub fn connects(&self, a: EntityId, b: EntityId) -> bool {
        (self.source.id == a && self.target.id == b) || (self.source.id == b && self.target.id == a)
    }
}
