//! Isolation detector - Baseline suggestions for characters with no ties at all

use crate::domain::value_objects::{Recommendation, RelationshipDraft, RelationshipStrength};

use super::{AnalysisContext, DetectorOutput};

const CONFIDENCE: u32 = 45;
const MAX_SUGGESTIONS: usize = 2;

pub fn detect(ctx: &AnalysisContext) -> DetectorOutput {
    let mut output = DetectorOutput::default();

    for character in &ctx.characters {
        if ctx.relationships.degree(character.id.into()) > 0 {
            continue;
        }
        let race = character.race.trim().to_lowercase();
        if race.is_empty() {
            continue;
        }

        let peers = ctx
            .characters
            .iter()
            .filter(|other| other.id != character.id)
            .filter(|other| other.race.trim().to_lowercase() == race)
            .filter(|other| !ctx.relationships.contains(character.id.into(), other.id.into()))
            .take(MAX_SUGGESTIONS);

        for peer in peers {
            let payload = RelationshipDraft::new(
                ctx.world_id,
                character.to_ref(),
                peer.to_ref(),
                "Acquaintance",
                RelationshipStrength::Weak,
            )
            .with_description(format!("Both are {}", character.race.trim()));

            output.recommendations.push(Recommendation::relationship(
                "isolation",
                format!("Connect {} with {}", character.name, peer.name),
                format!("{} has no relationships yet", character.name),
                CONFIDENCE,
                payload,
                vec![
                    "no existing relationships".to_string(),
                    format!("shared race: {}", character.race.trim()),
                    "baseline sociability suggestion".to_string(),
                ],
            ));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::inference::test_support::{context, relate};
    use crate::domain::entities::Character;
    use crate::domain::value_objects::WorldId;

    #[test]
    fn test_isolated_character_gets_up_to_two_peers() {
        let world_id = WorldId::new();
        let loner = Character::new(world_id, "Loner").with_race("Elf");
        let peers: Vec<Character> = (0..4)
            .map(|i| Character::new(world_id, format!("Elf {}", i)).with_race("elf"))
            .collect();
        let dwarf = Character::new(world_id, "Dwarf").with_race("Dwarf");

        // Every peer and the dwarf are already related to something
        let existing = peers
            .iter()
            .map(|p| relate(&p.to_ref(), &dwarf.to_ref()))
            .collect();
        let mut characters = vec![loner.clone()];
        characters.extend(peers);
        characters.push(dwarf);
        let ctx = context(world_id, characters, existing);

        let output = detect(&ctx);

        assert_eq!(output.recommendations.len(), 2);
        for rec in &output.recommendations {
            assert_eq!(rec.source.id, loner.id.into());
            assert_eq!(rec.confidence.value(), 45);
            assert_eq!(rec.payload.relationship_type, "Acquaintance");
            assert_eq!(rec.payload.strength, RelationshipStrength::Weak);
        }
    }

    #[test]
    fn test_characters_with_relationships_are_not_isolated() {
        let world_id = WorldId::new();
        let a = Character::new(world_id, "A").with_race("Human");
        let b = Character::new(world_id, "B").with_race("Human");
        let existing = vec![relate(&a.to_ref(), &b.to_ref())];
        let ctx = context(world_id, vec![a, b], existing);

        assert!(detect(&ctx).recommendations.is_empty());
    }
}
