//! Domain entities - Core business objects with identity

mod character;
mod lore_item;
mod tagged_entity;
mod timeline_event;

pub use character::Character;
pub use lore_item::{LoreItem, LoreType};
pub use tagged_entity::{TaggedEntity, TaggedEntityKind};
pub use timeline_event::TimelineEvent;
