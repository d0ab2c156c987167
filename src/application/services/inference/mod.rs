//! Relationship inference - Heuristic detectors over a world snapshot
//!
//! Each detector is a pure function of an [`AnalysisContext`]. The ranker
//! merges their output into one [`AnalysisReport`].

mod context;
mod dedup;
mod ranker;

pub mod conflict;
pub mod family;
pub mod isolation;
pub mod location;
pub mod tag_affinity;
pub mod temporal;

pub use context::AnalysisContext;
pub use dedup::relationship_exists;
pub use ranker::{rank, AnalysisReport};

use tracing::debug;

use crate::domain::value_objects::{DetectedPattern, Recommendation};

/// What one detector found
#[derive(Debug, Clone, Default)]
pub struct DetectorOutput {
    pub recommendations: Vec<Recommendation>,
    pub patterns: Vec<DetectedPattern>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detector {
    Family,
    Location,
    Temporal,
    TagAffinity,
    Conflict,
    Isolation,
}

impl Detector {
    /// Every detector, in emission order
    pub const ALL: [Detector; 6] = [
        Detector::Family,
        Detector::Location,
        Detector::Temporal,
        Detector::TagAffinity,
        Detector::Conflict,
        Detector::Isolation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Detector::Family => "family",
            Detector::Location => "location",
            Detector::Temporal => "temporal",
            Detector::TagAffinity => "tag_affinity",
            Detector::Conflict => "conflict",
            Detector::Isolation => "isolation",
        }
    }

    pub fn run(&self, ctx: &AnalysisContext) -> DetectorOutput {
        match self {
            Detector::Family => family::detect(ctx),
            Detector::Location => location::detect(ctx),
            Detector::Temporal => temporal::detect(ctx),
            Detector::TagAffinity => tag_affinity::detect(ctx),
            Detector::Conflict => conflict::detect(ctx),
            Detector::Isolation => isolation::detect(ctx),
        }
    }
}

/// Run every detector over the snapshot and rank the result
pub fn analyze(ctx: &AnalysisContext) -> AnalysisReport {
    let outputs = Detector::ALL
        .iter()
        .map(|detector| {
            let output = detector.run(ctx);
            debug!(
                world_id = %ctx.world_id,
                detector = detector.name(),
                recommendations = output.recommendations.len(),
                patterns = output.patterns.len(),
                "Detector finished"
            );
            output
        })
        .collect();
    rank(outputs)
}

/// Case-insensitive substring test
pub(crate) fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
