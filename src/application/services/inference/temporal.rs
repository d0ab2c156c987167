//! Temporal co-occurrence detector - Characters alive when an event happened

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::entities::{Character, TimelineEvent};
use crate::domain::value_objects::{Recommendation, RelationshipDraft, RelationshipStrength};

use super::{contains_ci, AnalysisContext, DetectorOutput};

/// Years a character is assumed to live past birth
const LIFESPAN_YEARS: i64 = 100;
const PARTICIPANT_CONFIDENCE: u32 = 95;
const WITNESS_CONFIDENCE: u32 = 75;

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{3,4}").expect("valid year pattern"));

/// First three- or four-digit number in free-form date text
pub fn extract_year(text: &str) -> Option<i64> {
    YEAR_RE.find(text).and_then(|m| m.as_str().parse().ok())
}

pub fn detect(ctx: &AnalysisContext) -> DetectorOutput {
    let mut output = DetectorOutput::default();

    for character in &ctx.characters {
        let Some(birth_year) = character.birth_date.as_deref().and_then(extract_year) else {
            continue;
        };
        let window = birth_year..=birth_year + LIFESPAN_YEARS;

        for event in ctx.events.iter().filter(|e| window.contains(&e.year)) {
            if ctx.relationships.contains(character.id.into(), event.id.into()) {
                continue;
            }
            if let Some(rec) = recommend(ctx, character, event) {
                output.recommendations.push(rec);
            }
        }
    }

    output
}

fn recommend(
    ctx: &AnalysisContext,
    character: &Character,
    event: &TimelineEvent,
) -> Option<Recommendation> {
    let name = character.name.trim();
    let name_match = !name.is_empty()
        && (event
            .related_characters
            .as_deref()
            .is_some_and(|text| contains_ci(text, name))
            || contains_ci(&event.description, name));

    let location_match = character.birth_place().is_some_and(|place| {
        event
            .related_locations
            .as_deref()
            .is_some_and(|text| contains_ci(text, place))
            || contains_ci(&event.description, place)
    });

    let (relationship_type, strength, confidence, signal, verb) = if name_match {
        (
            "Participant",
            RelationshipStrength::Strong,
            PARTICIPANT_CONFIDENCE,
            "character named in event",
            "took part in",
        )
    } else if location_match {
        (
            "Witness",
            RelationshipStrength::Medium,
            WITNESS_CONFIDENCE,
            "event at character's birthplace",
            "witnessed",
        )
    } else {
        return None;
    };

    let payload = RelationshipDraft::new(
        ctx.world_id,
        character.to_ref(),
        event.to_ref(),
        relationship_type,
        strength,
    )
    .with_description(format!(
        "{} was alive during {} ({})",
        character.name, event.name, event.year
    ))
    .with_start_date(event.year.to_string());

    Some(Recommendation::relationship(
        "timeline",
        format!("{} {} {}", character.name, verb, event.name),
        format!(
            "{} was alive in {} and is linked to {}",
            character.name, event.year, event.name
        ),
        confidence,
        payload,
        vec![signal.to_string(), "alive during event window".to_string()],
    ))
}
