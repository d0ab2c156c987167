//! Domain layer - Core business logic with no external dependencies
//!
//! This layer contains:
//! - Entities: Character, LoreItem, TimelineEvent, TaggedEntity
//! - Value Objects: typed ids, Relationship, Recommendation, DetectedPattern

pub mod entities;
pub mod value_objects;
