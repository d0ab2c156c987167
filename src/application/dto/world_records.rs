use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{Character, LoreItem, LoreType, TaggedEntity, TaggedEntityKind, TimelineEvent};
use crate::domain::value_objects::{
    EntityId, EntityRef, EntityType, Relationship, RelationshipDraft, RelationshipStatus,
    RelationshipStrength, WorldId,
};

/// A relationship endpoint as it appears on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRefDto {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub name: String,
}

impl From<EntityRef> for EntityRefDto {
    fn from(r: EntityRef) -> Self {
        Self {
            id: r.id.to_string(),
            entity_type: r.entity_type,
            name: r.name,
        }
    }
}

impl TryFrom<EntityRefDto> for EntityRef {
    type Error = String;

    fn try_from(dto: EntityRefDto) -> Result<Self, Self::Error> {
        let uuid = Uuid::parse_str(&dto.id).map_err(|_| format!("Invalid entity ID: {}", dto.id))?;
        Ok(EntityRef::new(EntityId::from_uuid(uuid), dto.entity_type, dto.name))
    }
}

// Characters

#[derive(Debug, Deserialize)]
pub struct CreateCharacterRequestDto {
    pub name: String,
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

impl CreateCharacterRequestDto {
    pub fn into_character(self, world_id: WorldId) -> Character {
        let mut character = Character::new(world_id, self.name)
            .with_race(self.race)
            .with_status(self.status);
        character.birth_date = self.birth_date;
        character.birth_place = self.birth_place;
        character.tags = self.tags;
        character
    }
}

#[derive(Debug, Serialize)]
pub struct CharacterResponseDto {
    pub id: String,
    pub world_id: String,
    pub name: String,
    pub birth_date: Option<String>,
    pub birth_place: Option<String>,
    pub race: String,
    pub status: String,
    pub tags: Vec<String>,
}

impl From<Character> for CharacterResponseDto {
    fn from(c: Character) -> Self {
        Self {
            id: c.id.to_string(),
            world_id: c.world_id.to_string(),
            name: c.name,
            birth_date: c.birth_date,
            birth_place: c.birth_place,
            race: c.race,
            status: c.status,
            tags: c.tags,
        }
    }
}

// Lore

#[derive(Debug, Deserialize)]
pub struct CreateLoreItemRequestDto {
    pub name: String,
    #[serde(rename = "type")]
    pub lore_type: LoreType,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CreateLoreItemRequestDto {
    pub fn into_lore_item(self, world_id: WorldId) -> LoreItem {
        let mut item = LoreItem::new(world_id, self.name, self.lore_type);
        item.tags = self.tags;
        item
    }
}

#[derive(Debug, Serialize)]
pub struct LoreItemResponseDto {
    pub id: String,
    pub world_id: String,
    #[serde(rename = "type")]
    pub lore_type: LoreType,
    pub name: String,
    pub tags: Vec<String>,
}

impl From<LoreItem> for LoreItemResponseDto {
    fn from(l: LoreItem) -> Self {
        Self {
            id: l.id.to_string(),
            world_id: l.world_id.to_string(),
            lore_type: l.lore_type,
            name: l.name,
            tags: l.tags,
        }
    }
}

// Timeline events

#[derive(Debug, Deserialize)]
pub struct CreateEventRequestDto {
    pub name: String,
    pub year: i64,
    #[serde(default)]
    pub timeline_id: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub related_locations: Option<String>,
    #[serde(default)]
    pub related_characters: Option<String>,
}

impl CreateEventRequestDto {
    pub fn into_event(self, world_id: WorldId) -> TimelineEvent {
        let mut event = TimelineEvent::new(world_id, self.name, self.year).with_description(self.description);
        event.timeline_id = self.timeline_id;
        event.related_locations = self.related_locations;
        event.related_characters = self.related_characters;
        event
    }
}

#[derive(Debug, Serialize)]
pub struct EventResponseDto {
    pub id: String,
    pub world_id: String,
    pub timeline_id: Option<String>,
    pub name: String,
    pub year: i64,
    pub description: String,
    pub related_locations: Option<String>,
    pub related_characters: Option<String>,
}

impl From<TimelineEvent> for EventResponseDto {
    fn from(e: TimelineEvent) -> Self {
        Self {
            id: e.id.to_string(),
            world_id: e.world_id.to_string(),
            timeline_id: e.timeline_id,
            name: e.name,
            year: e.year,
            description: e.description,
            related_locations: e.related_locations,
            related_characters: e.related_characters,
        }
    }
}

// Notes and maps

#[derive(Debug, Deserialize)]
pub struct CreateTaggedEntityRequestDto {
    pub kind: TaggedEntityKind,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CreateTaggedEntityRequestDto {
    /// Characters and lore carry their own tags and are created through their own routes
    pub fn into_tagged_entity(self, world_id: WorldId) -> Result<TaggedEntity, String> {
        match self.kind {
            TaggedEntityKind::Note | TaggedEntityKind::Map => {
                Ok(TaggedEntity::new(world_id, self.kind, self.name, self.tags))
            }
            kind => Err(format!("Tagged records must be notes or maps, got {:?}", kind)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaggedEntityResponseDto {
    pub id: String,
    pub world_id: String,
    pub kind: TaggedEntityKind,
    pub name: String,
    pub tags: Vec<String>,
}

impl From<TaggedEntity> for TaggedEntityResponseDto {
    fn from(t: TaggedEntity) -> Self {
        Self {
            id: t.id.to_string(),
            world_id: t.world_id.to_string(),
            kind: t.kind,
            name: t.name,
            tags: t.tags,
        }
    }
}

// Relationships

#[derive(Debug, Deserialize)]
pub struct CreateRelationshipRequestDto {
    pub source: EntityRefDto,
    pub target: EntityRefDto,
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
}

impl CreateRelationshipRequestDto {
    pub fn into_draft(self, world_id: WorldId) -> Result<RelationshipDraft, String> {
        let mut draft = RelationshipDraft::new(
            world_id,
            self.source.try_into()?,
            self.target.try_into()?,
            self.relationship_type,
            self.strength,
        )
        .with_description(self.description);
        draft.status = self.status;
        draft.start_date = self.start_date;
        draft.end_date = self.end_date;
        draft.is_secret = self.is_secret;

        if !draft.is_well_formed() {
            return Err("Relationship needs a type and two distinct, named endpoints".to_string());
        }
        Ok(draft)
    }
}

#[derive(Debug, Serialize)]
pub struct RelationshipResponseDto {
    pub id: String,
    pub world_id: String,
    pub source: EntityRefDto,
    pub target: EntityRefDto,
    pub relationship_type: String,
    pub description: String,
    pub strength: RelationshipStrength,
    pub status: RelationshipStatus,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_secret: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Relationship> for RelationshipResponseDto {
    fn from(r: Relationship) -> Self {
        Self {
            id: r.id.to_string(),
            world_id: r.world_id.to_string(),
            source: r.source.into(),
            target: r.target.into(),
            relationship_type: r.relationship_type,
            description: r.description,
            strength: r.strength,
            status: r.status,
            start_date: r.start_date,
            end_date: r.end_date,
            is_secret: r.is_secret,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
