//! Recommendation ranker - Merge detector output and order by confidence

use std::collections::HashSet;

use crate::domain::value_objects::{DetectedPattern, Recommendation};

use super::DetectorOutput;

/// Ranked output of one analysis run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisReport {
    pub recommendations: Vec<Recommendation>,
    pub patterns: Vec<DetectedPattern>,
}

/// Concatenate outputs in detector order, drop repeated ids, then stable-sort
/// descending by confidence
pub fn rank(outputs: Vec<DetectorOutput>) -> AnalysisReport {
    let mut report = AnalysisReport::default();
    let mut seen_recommendations = HashSet::new();
    let mut seen_patterns = HashSet::new();

    for output in outputs {
        report.recommendations.extend(
            output
                .recommendations
                .into_iter()
                .filter(|r| seen_recommendations.insert(r.id)),
        );
        report.patterns.extend(
            output
                .patterns
                .into_iter()
                .filter(|p| seen_patterns.insert(p.id)),
        );
    }

    // sort_by is stable, so ties keep emission order
    report
        .recommendations
        .sort_by(|a, b| b.confidence.cmp(&a.confidence));
    report.patterns.sort_by(|a, b| b.confidence.cmp(&a.confidence));
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{
        EntityId, EntityRef, EntityType, RelationshipDraft, RelationshipStrength, WorldId,
    };

    fn rec(title: &str, confidence: u32) -> Recommendation {
        let payload = RelationshipDraft::new(
            WorldId::new(),
            EntityRef::new(EntityId::new(), EntityType::Character, "A"),
            EntityRef::new(EntityId::new(), EntityType::Character, "B"),
            "Friend",
            RelationshipStrength::Weak,
        );
        Recommendation::relationship("test", title, "", confidence, payload, vec![])
    }

    #[test]
    fn test_rank_is_descending_and_stable() {
        let first = DetectorOutput {
            recommendations: vec![rec("a", 45), rec("b", 80)],
            patterns: vec![],
        };
        let second = DetectorOutput {
            recommendations: vec![rec("c", 80), rec("d", 95)],
            patterns: vec![],
        };

        let report = rank(vec![first, second]);

        let titles: Vec<&str> = report.recommendations.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn test_rank_drops_repeated_ids() {
        let duplicate = rec("dup", 60);
        let report = rank(vec![
            DetectorOutput {
                recommendations: vec![duplicate.clone()],
                patterns: vec![],
            },
            DetectorOutput {
                recommendations: vec![duplicate],
                patterns: vec![],
            },
        ]);

        assert_eq!(report.recommendations.len(), 1);
    }
}
