//! Conflict/alliance detector - Characters named together in wars and treaties

use crate::domain::entities::{Character, TimelineEvent};
use crate::domain::value_objects::{
    DetectedPattern, PatternKind, Recommendation, RelationshipDraft, RelationshipStrength,
};

use super::{contains_ci, AnalysisContext, DetectorOutput};

const CONFLICT_KEYWORDS: &[&str] = &["battle", "war", "conflict", "attack", "siege", "rebellion"];
const ALLIANCE_KEYWORDS: &[&str] = &["union", "alliance", "treaty", "peace", "agreement"];

const PATTERN_CONFIDENCE: u32 = 80;
const PAIR_CONFIDENCE: u32 = 75;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stance {
    Conflict,
    Alliance,
}

impl Stance {
    /// Conflict wins when an event matches both keyword sets
    pub fn of(event: &TimelineEvent) -> Option<Self> {
        let mentions = |keywords: &[&str]| {
            keywords
                .iter()
                .any(|k| contains_ci(&event.name, k) || contains_ci(&event.description, k))
        };
        if mentions(CONFLICT_KEYWORDS) {
            Some(Stance::Conflict)
        } else if mentions(ALLIANCE_KEYWORDS) {
            Some(Stance::Alliance)
        } else {
            None
        }
    }

    fn relationship_type(&self) -> &'static str {
        match self {
            Stance::Conflict => "Enmity",
            Stance::Alliance => "Ally",
        }
    }

    fn category(&self) -> &'static str {
        match self {
            Stance::Conflict => "conflict",
            Stance::Alliance => "alliance",
        }
    }

    fn link(&self) -> &'static str {
        match self {
            Stance::Conflict => "hostile",
            Stance::Alliance => "allied",
        }
    }
}

pub fn detect(ctx: &AnalysisContext) -> DetectorOutput {
    let mut output = DetectorOutput::default();

    for event in &ctx.events {
        let Some(stance) = Stance::of(event) else {
            continue;
        };
        let involved = involved_characters(&ctx.characters, event);
        if involved.len() < 2 {
            continue;
        }

        output.patterns.push(DetectedPattern::new(
            PatternKind::Conflict,
            &event.id.to_string(),
            involved.iter().map(|c| c.to_ref()).collect(),
            PATTERN_CONFIDENCE,
            format!(
                "{} characters are involved in the {} \"{}\"",
                involved.len(),
                stance.category(),
                event.name
            ),
            format!(
                "Create {} relationships between the participants of {}",
                stance.link(),
                event.name
            ),
        ));

        for (i, a) in involved.iter().enumerate() {
            for b in &involved[i + 1..] {
                if ctx.relationships.contains(a.id.into(), b.id.into()) {
                    continue;
                }

                let payload = RelationshipDraft::new(
                    ctx.world_id,
                    a.to_ref(),
                    b.to_ref(),
                    stance.relationship_type(),
                    RelationshipStrength::Strong,
                )
                .with_description(format!("Both were involved in {}", event.name))
                .with_start_date(event.year.to_string());

                output.recommendations.push(Recommendation::relationship(
                    stance.category(),
                    format!(
                        "{} and {}: {}",
                        a.name,
                        b.name,
                        stance.relationship_type().to_lowercase()
                    ),
                    format!("Both appear in {} ({})", event.name, event.year),
                    PAIR_CONFIDENCE,
                    payload,
                    vec![
                        format!("both involved in \"{}\"", event.name),
                        format!("{} keyword in event", stance.category()),
                    ],
                ));
            }
        }
    }

    output
}

fn involved_characters<'a>(characters: &'a [Character], event: &TimelineEvent) -> Vec<&'a Character> {
    characters
        .iter()
        .filter(|c| {
            let name = c.name.trim();
            !name.is_empty()
                && (event
                    .related_characters
                    .as_deref()
                    .is_some_and(|text| contains_ci(text, name))
                    || contains_ci(&event.description, name))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::inference::test_support::context_with_events;
    use crate::domain::value_objects::WorldId;

    #[test]
    fn test_conflict_event_pairs_participants() {
        let world_id = WorldId::new();
        let characters = vec![
            Character::new(world_id, "Toren"),
            Character::new(world_id, "Vask"),
            Character::new(world_id, "Ilsa"),
        ];
        let siege = TimelineEvent::new(world_id, "Siege of Harrow", 512)
            .with_related_characters("Toren, Vask");
        let ctx = context_with_events(world_id, characters, vec![siege]);

        let output = detect(&ctx);

        assert_eq!(output.patterns.len(), 1);
        assert_eq!(output.patterns[0].kind, PatternKind::Conflict);
        assert_eq!(output.patterns[0].confidence.value(), 80);
        assert!(output.patterns[0].suggested_action.contains("hostile"));
        assert_eq!(output.recommendations.len(), 1);
        let rec = &output.recommendations[0];
        assert_eq!(rec.payload.relationship_type, "Enmity");
        assert_eq!(rec.confidence.value(), 75);
        assert_eq!(rec.payload.start_date.as_deref(), Some("512"));
    }

    #[test]
    fn test_alliance_keywords() {
        let world_id = WorldId::new();
        let characters = vec![Character::new(world_id, "Toren"), Character::new(world_id, "Vask")];
        let treaty = TimelineEvent::new(world_id, "Accord of Thorns", 530)
            .with_description("A peace signed by toren and VASK.");
        let ctx = context_with_events(world_id, characters, vec![treaty]);

        let output = detect(&ctx);

        assert!(output.patterns[0].suggested_action.contains("allied"));
        assert_eq!(output.recommendations[0].payload.relationship_type, "Ally");
    }

    #[test]
    fn test_single_participant_is_not_a_pattern() {
        let world_id = WorldId::new();
        let characters = vec![Character::new(world_id, "Toren"), Character::new(world_id, "Vask")];
        let battle = TimelineEvent::new(world_id, "Battle of the Pass", 500)
            .with_description("Toren alone");
        let ctx = context_with_events(world_id, characters, vec![battle]);

        let output = detect(&ctx);

        assert!(output.patterns.is_empty());
        assert!(output.recommendations.is_empty());
    }

    #[test]
    fn test_conflict_takes_precedence() {
        let world_id = WorldId::new();
        let event = TimelineEvent::new(world_id, "War that ended in a treaty", 1);
        assert_eq!(Stance::of(&event), Some(Stance::Conflict));
        let event = TimelineEvent::new(world_id, "Harvest", 1);
        assert_eq!(Stance::of(&event), None);
    }
}
