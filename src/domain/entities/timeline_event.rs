//! Timeline event entity - Dated happenings on a world's chronology

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{EntityRef, EntityType, EventId, WorldId};

/// An event on one of the world's timelines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: EventId,
    pub world_id: WorldId,
    /// Owning chronology, when the world keeps more than one
    #[serde(default)]
    pub timeline_id: Option<String>,
    pub name: String,
    pub year: i64,
    #[serde(default)]
    pub description: String,
    /// Free text naming the places involved
    #[serde(default)]
    pub related_locations: Option<String>,
    /// Free text naming the characters involved
    #[serde(default)]
    pub related_characters: Option<String>,
}

impl TimelineEvent {
    pub fn new(world_id: WorldId, name: impl Into<String>, year: i64) -> Self {
        Self {
            id: EventId::new(),
            world_id,
            timeline_id: None,
            name: name.into(),
            year,
            description: String::new(),
            related_locations: None,
            related_characters: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_related_locations(mut self, locations: impl Into<String>) -> Self {
        self.related_locations = Some(locations.into());
        self
    }

    pub fn with_related_characters(mut self, characters: impl Into<String>) -> Self {
        self.related_characters = Some(characters.into());
        self
    }

    pub fn to_ref(&self) -> EntityRef {
        EntityRef::new(self.id, EntityType::Event, self.name.clone())
    }
}
