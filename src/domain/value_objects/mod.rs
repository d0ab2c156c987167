//! Value objects - Immutable objects defined by their attributes

mod ids;
mod recommendation;
mod relationship;

pub use ids::*;
pub use recommendation::{
    DetectedPattern, PatternKind, Recommendation, RecommendationKind,
};
pub use relationship::{
    EntityRef, EntityType, Relationship, RelationshipDraft, RelationshipStatus,
    RelationshipStrength,
};
