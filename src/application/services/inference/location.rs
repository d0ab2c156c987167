//! Geographic co-location detector - Shared birthplaces and known places of birth

use std::collections::HashMap;

use crate::domain::entities::Character;
use crate::domain::value_objects::{
    DetectedPattern, PatternKind, Recommendation, RelationshipDraft, RelationshipStrength,
};

use super::{AnalysisContext, DetectorOutput};

const PATTERN_CONFIDENCE: u32 = 70;
const ACQUAINTANCE_CONFIDENCE: u32 = 65;
const BORN_IN_CONFIDENCE: u32 = 90;

pub fn detect(ctx: &AnalysisContext) -> DetectorOutput {
    let mut output = DetectorOutput::default();

    for (place, members) in group_by_birth_place(&ctx.characters) {
        if members.len() < 2 {
            continue;
        }

        output.patterns.push(DetectedPattern::new(
            PatternKind::Location,
            &place.to_lowercase(),
            members.iter().map(|c| c.to_ref()).collect(),
            PATTERN_CONFIDENCE,
            format!("{} characters were born in {}", members.len(), place),
            format!("Link the characters from {} as acquaintances", place),
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
                    "Acquaintance",
                    RelationshipStrength::Weak,
                )
                .with_description(format!("Both were born in {}", place));

                output.recommendations.push(Recommendation::relationship(
                    "location",
                    format!("{} may know {}", a.name, b.name),
                    format!("Both were born in {}", place),
                    ACQUAINTANCE_CONFIDENCE,
                    payload,
                    vec![
                        format!("shared birthplace \"{}\"", place),
                        "plausible acquaintance in small settlements".to_string(),
                    ],
                ));
            }
        }
    }

    for character in &ctx.characters {
        let Some(place) = character.birth_place() else {
            continue;
        };
        let key = place.to_lowercase();

        for location in ctx
            .locations
            .iter()
            .filter(|l| l.name.trim().to_lowercase() == key)
        {
            if ctx.relationships.contains(character.id.into(), location.id.into()) {
                continue;
            }

            let payload = RelationshipDraft::new(
                ctx.world_id,
                character.to_ref(),
                location.to_ref(),
                "Born In",
                RelationshipStrength::Strong,
            )
            .with_description(format!("{} was born in {}", character.name, location.name));

            output.recommendations.push(Recommendation::relationship(
                "birthplace",
                format!("{} was born in {}", character.name, location.name),
                format!("Birth place matches the location entry {}", location.name),
                BORN_IN_CONFIDENCE,
                payload,
                vec![
                    "exact location-name match".to_string(),
                    "high confidence for birthplace linkage".to_string(),
                ],
            ));
        }
    }

    output
}

/// Groups in order of first appearance, keyed by lowercased place
fn group_by_birth_place(characters: &[Character]) -> Vec<(String, Vec<&Character>)> {
    let mut groups: Vec<(String, Vec<&Character>)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for character in characters {
        let Some(place) = character.birth_place() else {
            continue;
        };
        let key = place.to_lowercase();
        match positions.get(&key) {
            Some(&pos) => groups[pos].1.push(character),
            None => {
                positions.insert(key, groups.len());
                groups.push((place.to_string(), vec![character]));
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::inference::test_support::{context, context_with_lore};
    use crate::domain::entities::{LoreItem, LoreType};
    use crate::domain::value_objects::{EntityType, WorldId};

    #[test]
    fn test_birthplace_matching_geography_entry() {
        let world_id = WorldId::new();
        let toren = Character::new(world_id, "Toren").with_birth_place("Rivertown");
        let rivertown = LoreItem::new(world_id, "Rivertown", LoreType::Geography);
        let ctx = context_with_lore(world_id, vec![toren.clone()], vec![rivertown.clone()]);

        let output = detect(&ctx);

        assert!(output.patterns.is_empty());
        assert_eq!(output.recommendations.len(), 1);
        let rec = &output.recommendations[0];
        assert_eq!(rec.payload.relationship_type, "Born In");
        assert_eq!(rec.confidence.value(), 90);
        assert_eq!(rec.payload.strength, RelationshipStrength::Strong);
        assert_eq!(rec.payload.target.id, rivertown.id.into());
        assert_eq!(rec.payload.target.entity_type, EntityType::Location);
    }

    #[test]
    fn test_non_geography_lore_is_not_a_birthplace() {
        let world_id = WorldId::new();
        let toren = Character::new(world_id, "Toren").with_birth_place("Rivertown");
        let legend = LoreItem::new(world_id, "Rivertown", LoreType::History);
        let ctx = context_with_lore(world_id, vec![toren], vec![legend]);

        assert!(detect(&ctx).recommendations.is_empty());
    }

    #[test]
    fn test_shared_birthplace_is_case_insensitive() {
        let world_id = WorldId::new();
        let ctx = context(
            world_id,
            vec![
                Character::new(world_id, "Mira").with_birth_place("Highmoor"),
                Character::new(world_id, "Dell").with_birth_place("highmoor "),
                Character::new(world_id, "Ost").with_birth_place("Lowmoor"),
            ],
            vec![],
        );

        let output = detect(&ctx);

        assert_eq!(output.patterns.len(), 1);
        assert_eq!(output.patterns[0].confidence.value(), 70);
        assert_eq!(output.recommendations.len(), 1);
        let rec = &output.recommendations[0];
        assert_eq!(rec.payload.relationship_type, "Acquaintance");
        assert_eq!(rec.confidence.value(), 65);
        assert_eq!(rec.payload.strength, RelationshipStrength::Weak);
    }
}
