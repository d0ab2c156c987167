//! Recommendations and detected patterns produced by relationship inference
//!
//! Both are ephemeral: they live in memory between an analysis run and the
//! user's apply/dismiss decision, and are never persisted themselves.

use serde::{Deserialize, Serialize};

use super::{EntityRef, PatternId, RecommendationId, RelationshipDraft};

/// Heuristic certainty as an integer percentage
///
/// Construction clamps to `0..=100`, so no detector can emit an
/// out-of-range score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(u8);

impl Confidence {
    pub const MAX: u8 = 100;

    pub fn new(value: u32) -> Self {
        Self(value.min(Self::MAX as u32) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    #[default]
    Relationship,
}

/// A proposed new relationship awaiting accept/reject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: RecommendationId,
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
    pub confidence: Confidence,
    pub source: EntityRef,
    pub target: Option<EntityRef>,
    pub payload: RelationshipDraft,
    /// Human-readable justification, most important first
    pub reasoning: Vec<String>,
}

impl Recommendation {
    /// Build a relationship recommendation from its candidate payload
    ///
    /// The id is derived from `detector`, the endpoints and the label, so
    /// an equivalent observation maps to the same id on every run.
    pub fn relationship(
        detector: &str,
        title: impl Into<String>,
        description: impl Into<String>,
        confidence: u32,
        payload: RelationshipDraft,
        reasoning: Vec<String>,
    ) -> Self {
        let key = format!(
            "{}:{}:{}:{}",
            detector, payload.source.id, payload.target.id, payload.relationship_type
        );
        Self {
            id: RecommendationId::derive(&key),
            kind: RecommendationKind::Relationship,
            title: title.into(),
            description: description.into(),
            confidence: Confidence::new(confidence),
            source: payload.source.clone(),
            target: Some(payload.target.clone()),
            payload,
            reasoning,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Naming,
    Location,
    Timeline,
    Family,
    Conflict,
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PatternKind::Naming => "naming",
            PatternKind::Location => "location",
            PatternKind::Timeline => "timeline",
            PatternKind::Family => "family",
            PatternKind::Conflict => "conflict",
        };
        write!(f, "{}", s)
    }
}

/// A higher-level observation spanning several records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedPattern {
    pub id: PatternId,
    pub kind: PatternKind,
    pub entities: Vec<EntityRef>,
    pub confidence: Confidence,
    pub description: String,
    pub suggested_action: String,
}

impl DetectedPattern {
    /// `key` distinguishes patterns of the same kind (a surname, a place, an event id)
    pub fn new(
        kind: PatternKind,
        key: &str,
        entities: Vec<EntityRef>,
        confidence: u32,
        description: impl Into<String>,
        suggested_action: impl Into<String>,
    ) -> Self {
        Self {
            id: PatternId::derive(&format!("{}:{}", kind, key)),
            kind,
            entities,
            confidence: Confidence::new(confidence),
            description: description.into(),
            suggested_action: suggested_action.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(Confidence::new(250).value(), 100);
        assert_eq!(Confidence::new(0).value(), 0);
        assert_eq!(Confidence::new(85).value(), 85);
    }

    #[test]
    fn test_confidence_serializes_as_integer() {
        let json = serde_json::to_string(&Confidence::new(80)).expect("serialization should succeed");
        assert_eq!(json, "80");
    }
}
