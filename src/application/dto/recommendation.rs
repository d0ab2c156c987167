use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::services::{ApplyOutcome, RecommendationSnapshot};
use crate::domain::value_objects::{
    DetectedPattern, PatternKind, Recommendation, RecommendationKind,
    RelationshipDraft, RelationshipStatus, RelationshipStrength,
};

use super::{EntityRefDto, RelationshipResponseDto};

#[derive(Debug, Serialize)]
pub struct RecommendationResponseDto {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
    pub confidence: u8,
    pub source: EntityRefDto,
    pub target: Option<EntityRefDto>,
    pub payload: RelationshipPayloadDto,
    pub reasoning: Vec<String>,
}

impl From<Recommendation> for RecommendationResponseDto {
    fn from(r: Recommendation) -> Self {
        Self {
            id: r.id.to_string(),
            kind: r.kind,
            title: r.title,
            description: r.description,
            confidence: r.confidence.value(),
            source: r.source.into(),
            target: r.target.map(EntityRefDto::from),
            payload: r.payload.into(),
            reasoning: r.reasoning,
        }
    }
}

/// The relationship a recommendation would create
#[derive(Debug, Serialize)]
pub struct RelationshipPayloadDto {
    pub source: EntityRefDto,
    pub target: EntityRefDto,
    pub relationship_type: String,
    pub description: String,
    pub strength: RelationshipStrength,
    pub status: RelationshipStatus,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_secret: bool,
}

impl From<RelationshipDraft> for RelationshipPayloadDto {
    fn from(d: RelationshipDraft) -> Self {
        Self {
            source: d.source.into(),
            target: d.target.into(),
            relationship_type: d.relationship_type,
            description: d.description,
            strength: d.strength,
            status: d.status,
            start_date: d.start_date,
            end_date: d.end_date,
            is_secret: d.is_secret,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PatternResponseDto {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PatternKind,
    pub entities: Vec<EntityRefDto>,
    pub confidence: u8,
    pub description: String,
    pub suggested_action: String,
}

impl From<DetectedPattern> for PatternResponseDto {
    fn from(p: DetectedPattern) -> Self {
        Self {
            id: p.id.to_string(),
            kind: p.kind,
            entities: p.entities.into_iter().map(EntityRefDto::from).collect(),
            confidence: p.confidence.value(),
            description: p.description,
            suggested_action: p.suggested_action,
        }
    }
}

/// Current recommendation state for the UI
#[derive(Debug, Serialize)]
pub struct AnalysisResponseDto {
    pub world_id: Option<String>,
    pub recommendations: Vec<RecommendationResponseDto>,
    pub detected_patterns: Vec<PatternResponseDto>,
    pub is_analyzing: bool,
    pub analyzed_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl AnalysisResponseDto {
    pub fn from_snapshot(snapshot: RecommendationSnapshot, is_analyzing: bool) -> Self {
        Self {
            world_id: snapshot.world_id.map(|id| id.to_string()),
            recommendations: snapshot
                .recommendations
                .into_iter()
                .map(RecommendationResponseDto::from)
                .collect(),
            detected_patterns: snapshot
                .patterns
                .into_iter()
                .map(PatternResponseDto::from)
                .collect(),
            is_analyzing,
            analyzed_at: snapshot.analyzed_at,
            last_error: snapshot.last_error,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApplyResponseDto {
    pub applied: bool,
    pub relationship: Option<RelationshipResponseDto>,
    /// Why nothing was written, when `applied` is false
    pub reason: Option<String>,
}

impl From<ApplyOutcome> for ApplyResponseDto {
    fn from(outcome: ApplyOutcome) -> Self {
        match outcome {
            ApplyOutcome::Applied(relationship) => Self {
                applied: true,
                relationship: Some(relationship.into()),
                reason: None,
            },
            ApplyOutcome::Dropped { reason } => Self {
                applied: false,
                relationship: None,
                reason: Some(reason),
            },
        }
    }
}
