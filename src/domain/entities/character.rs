//! Character entity - People of the world, with origin and lineage hints

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{CharacterId, EntityRef, EntityType, WorldId};

/// A character in the world
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub world_id: WorldId,
    pub name: String,
    /// Free-form date text ("Spring of 470", "470 AE")
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub birth_place: Option<String>,
    #[serde(default)]
    pub race: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Character {
    pub fn new(world_id: WorldId, name: impl Into<String>) -> Self {
        Self {
            id: CharacterId::new(),
            world_id,
            name: name.into(),
            birth_date: None,
            birth_place: None,
            race: String::new(),
            status: String::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_birth_date(mut self, birth_date: impl Into<String>) -> Self {
        self.birth_date = Some(birth_date.into());
        self
    }

    pub fn with_birth_place(mut self, birth_place: impl Into<String>) -> Self {
        self.birth_place = Some(birth_place.into());
        self
    }

    pub fn with_race(mut self, race: impl Into<String>) -> Self {
        self.race = race.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Last whitespace-delimited token, only for multi-token names
    pub fn surname(&self) -> Option<&str> {
        let mut tokens = self.name.split_whitespace();
        let first = tokens.next();
        let last = tokens.last();
        first.and(last)
    }

    /// Trimmed birth place, if it says anything
    pub fn birth_place(&self) -> Option<&str> {
        self.birth_place
            .as_deref()
            .map(str::trim)
            .filter(|place| !place.is_empty())
    }

    pub fn to_ref(&self) -> EntityRef {
        EntityRef::new(self.id, EntityType::Character, self.name.clone())
    }
}
