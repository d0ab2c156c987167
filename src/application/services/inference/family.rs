//! Naming/family detector - Characters sharing a surname token

use std::collections::HashMap;

use crate::domain::entities::Character;
use crate::domain::value_objects::{
    DetectedPattern, PatternKind, Recommendation, RelationshipDraft, RelationshipStrength,
};

use super::{AnalysisContext, DetectorOutput};

const PATTERN_CONFIDENCE: u32 = 85;
const PAIR_CONFIDENCE: u32 = 80;

pub fn detect(ctx: &AnalysisContext) -> DetectorOutput {
    let mut output = DetectorOutput::default();

    for (surname, members) in group_by_surname(&ctx.characters) {
        if members.len() < 2 {
            continue;
        }

        output.patterns.push(DetectedPattern::new(
            PatternKind::Family,
            &surname.to_lowercase(),
            members.iter().map(|c| c.to_ref()).collect(),
            PATTERN_CONFIDENCE,
            format!("{} characters share the surname \"{}\"", members.len(), surname),
            format!("Create family relationships between the {} characters", surname),
        ));

        for (i, a) in members.iter().enumerate() {
            for b in &members[i + 1..] {
                if ctx.relationships.contains(a.id.into(), b.id.into()) {
                    continue;
                }

                let payload = RelationshipDraft::new(
                    ctx.world_id,
                    a.to_ref(),
                    b.to_ref(),
                    "Family",
                    RelationshipStrength::Medium,
                )
                .with_description(format!("Both carry the family name {}", surname));

                output.recommendations.push(Recommendation::relationship(
                    "family",
                    format!("{} and {} may be family", a.name, b.name),
                    format!("Shared surname \"{}\" suggests a family tie", surname),
                    PAIR_CONFIDENCE,
                    payload,
                    vec![
                        format!("shared surname token \"{}\"", surname),
                        "no existing relationship".to_string(),
                        "high-confidence family heuristic".to_string(),
                    ],
                ));
            }
        }
    }

    output
}

/// Groups in order of first appearance, keyed case-insensitively
fn group_by_surname(characters: &[Character]) -> Vec<(String, Vec<&Character>)> {
    let mut groups: Vec<(String, Vec<&Character>)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for character in characters {
        let Some(surname) = character.surname() else {
            continue;
        };
        let key = surname.to_lowercase();
        match positions.get(&key) {
            Some(&pos) => groups[pos].1.push(character),
            None => {
                positions.insert(key, groups.len());
                groups.push((surname.to_string(), vec![character]));
            }
        }
    }

    groups
}
