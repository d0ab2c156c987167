//! Application services - Use case implementations
//!
//! `inference` holds the pure detectors; `recommendation_service` drives them
//! against a world store and owns the apply/dismiss workflow.

pub mod inference;
pub mod recommendation_service;

pub use recommendation_service::{
    AnalysisOutcome, ApplyOutcome, DismissedPolicy, RecommendationError, RecommendationService,
    RecommendationSnapshot,
};
