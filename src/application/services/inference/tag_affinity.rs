//! Tag affinity detector - Records of any kind sharing tags

use std::collections::HashSet;

use crate::domain::entities::TaggedEntity;
use crate::domain::value_objects::{Recommendation, RelationshipDraft, RelationshipStrength};

use super::{AnalysisContext, DetectorOutput};

const BASE_CONFIDENCE: u32 = 40;
const PER_TAG_CONFIDENCE: u32 = 15;
const MAX_CONFIDENCE: u32 = 90;

pub fn detect(ctx: &AnalysisContext) -> DetectorOutput {
    let mut output = DetectorOutput::default();

    for (i, a) in ctx.tagged_entities.iter().enumerate() {
        for b in &ctx.tagged_entities[i + 1..] {
            if a.id == b.id {
                continue;
            }
            let shared = shared_tags(a, b);
            if shared.is_empty() || ctx.relationships.contains(a.id, b.id) {
                continue;
            }

            let count = shared.len() as u32;
            let payload = RelationshipDraft::new(
                ctx.world_id,
                a.to_ref(),
                b.to_ref(),
                "Connected",
                strength_for(count),
            )
            .with_description(format!("Shared tags: {}", shared.join(", ")));

            let mut reasoning = vec![format!("{} shared tag(s)", count)];
            reasoning.extend(shared.iter().map(|tag| format!("shared tag: {}", tag)));

            output.recommendations.push(Recommendation::relationship(
                "tags",
                format!("{} and {} are thematically connected", a.name, b.name),
                format!("Both are tagged {}", shared.join(", ")),
                confidence_for(count),
                payload,
                reasoning,
            ));
        }
    }

    output
}

pub fn confidence_for(shared: u32) -> u32 {
    (BASE_CONFIDENCE + PER_TAG_CONFIDENCE * shared).min(MAX_CONFIDENCE)
}

pub fn strength_for(shared: u32) -> RelationshipStrength {
    match shared {
        n if n > 2 => RelationshipStrength::Strong,
        2 => RelationshipStrength::Medium,
        _ => RelationshipStrength::Weak,
    }
}

/// Tags of `a` (as written on `a`) that `b` also carries, ignoring case
fn shared_tags(a: &TaggedEntity, b: &TaggedEntity) -> Vec<String> {
    let other: HashSet<String> = b
        .tags
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    let mut seen = HashSet::new();
    a.tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .filter(|t| {
            let key = t.to_lowercase();
            other.contains(&key) && seen.insert(key)
        })
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::inference::test_support::context_with_tags;
    use crate::domain::entities::TaggedEntityKind;
    use crate::domain::value_objects::{EntityType, WorldId};

    fn tagged(world_id: WorldId, kind: TaggedEntityKind, name: &str, tags: &[&str]) -> TaggedEntity {
        TaggedEntity::new(world_id, kind, name, tags.iter().map(|t| t.to_string()).collect())
    }

    #[test]
    fn test_scoring_table() {
        assert_eq!(confidence_for(1), 55);
        assert_eq!(confidence_for(2), 70);
        assert_eq!(confidence_for(3), 85);
        assert_eq!(confidence_for(4), 90);
        assert_eq!(confidence_for(12), 90);
        assert_eq!(strength_for(1), RelationshipStrength::Weak);
        assert_eq!(strength_for(2), RelationshipStrength::Medium);
        assert_eq!(strength_for(3), RelationshipStrength::Strong);
    }

    #[test]
    fn test_no_shared_tags_no_recommendations() {
        let world_id = WorldId::new();
        let ctx = context_with_tags(
            world_id,
            vec![
                tagged(world_id, TaggedEntityKind::Character, "Mira", &["mage"]),
                tagged(world_id, TaggedEntityKind::Note, "Session 3", &["tavern"]),
                tagged(world_id, TaggedEntityKind::Map, "Coast", &["sea", "trade"]),
            ],
        );

        assert!(detect(&ctx).recommendations.is_empty());
    }

    #[test]
    fn test_cross_type_case_insensitive_match() {
        let world_id = WorldId::new();
        let ctx = context_with_tags(
            world_id,
            vec![
                tagged(world_id, TaggedEntityKind::Character, "Mira", &["Mage", "Exile", "north"]),
                tagged(world_id, TaggedEntityKind::Map, "Northern Wastes", &["NORTH", "exile"]),
            ],
        );

        let output = detect(&ctx);

        assert_eq!(output.recommendations.len(), 1);
        let rec = &output.recommendations[0];
        assert_eq!(rec.payload.relationship_type, "Connected");
        assert_eq!(rec.confidence.value(), 70);
        assert_eq!(rec.payload.strength, RelationshipStrength::Medium);
        assert_eq!(rec.payload.target.entity_type, EntityType::Location);
        assert!(rec.reasoning.contains(&"shared tag: Exile".to_string()));
        assert!(rec.reasoning.contains(&"shared tag: north".to_string()));
    }

    #[test]
    fn test_duplicate_tags_count_once() {
        let world_id = WorldId::new();
        let ctx = context_with_tags(
            world_id,
            vec![
                tagged(world_id, TaggedEntityKind::Lore, "Order", &["war", "War"]),
                tagged(world_id, TaggedEntityKind::Note, "Orders", &["war"]),
            ],
        );

        let output = detect(&ctx);

        assert_eq!(output.recommendations[0].confidence.value(), 55);
    }
}
