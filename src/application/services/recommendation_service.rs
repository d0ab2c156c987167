//! Recommendation Service - Relationship inference and the apply/dismiss workflow
//!
//! The service owns the in-memory result of the latest analysis run. Each
//! recommendation moves from proposed to applied or dismissed; either
//! decision removes it from the active list. A fresh run may propose an
//! equivalent recommendation again unless [`DismissedPolicy::Suppress`] is set.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

use crate::application::ports::outbound::WorldRecordPort;
use crate::application::services::inference::{self, relationship_exists, AnalysisContext, AnalysisReport};
use crate::domain::entities::TaggedEntity;
use crate::domain::value_objects::{
    DetectedPattern, EntityId, PatternId, Recommendation, RecommendationId, Relationship, WorldId,
};

/// Errors from the recommendation workflow
#[derive(Debug, thiserror::Error)]
pub enum RecommendationError {
    #[error("Recommendation not found: {0}")]
    NotFound(RecommendationId),

    #[error("Pattern not found: {0}")]
    PatternNotFound(PatternId),

    #[error("Store error: {0:#}")]
    Store(#[from] anyhow::Error),
}

/// What happens to dismissed recommendations on later runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DismissedPolicy {
    /// Dismissals are recorded but not read back; equivalent recommendations return
    #[default]
    Resurface,
    /// Recommendations whose id was dismissed are filtered out of new runs
    Suppress,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown dismissed policy: {0}")]
pub struct ParseDismissedPolicyError(String);

impl std::str::FromStr for DismissedPolicy {
    type Err = ParseDismissedPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "resurface" => Ok(DismissedPolicy::Resurface),
            "suppress" => Ok(DismissedPolicy::Suppress),
            other => Err(ParseDismissedPolicyError(other.to_string())),
        }
    }
}

/// The active recommendation list as the UI sees it
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecommendationSnapshot {
    pub world_id: Option<WorldId>,
    pub recommendations: Vec<Recommendation>,
    pub patterns: Vec<DetectedPattern>,
    pub analyzed_at: Option<DateTime<Utc>>,
    /// Set when the latest run failed; the lists are then the last good result
    pub last_error: Option<String>,
}

/// Result of an `analyze` call
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    Completed(AnalysisReport),
    /// Another run was already in flight
    Skipped,
    /// The run failed; previous results were kept
    Failed(String),
}

/// Result of applying a recommendation
#[derive(Debug, Clone)]
pub enum ApplyOutcome {
    Applied(Relationship),
    /// The store no longer supports the recommendation; nothing was written
    Dropped { reason: String },
}

type DetectFn = fn(&AnalysisContext) -> AnalysisReport;

/// Clears the in-progress flag when a run ends, however it ends
struct AnalyzingGuard<'a>(&'a AtomicBool);

impl Drop for AnalyzingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct RecommendationService {
    store: Arc<dyn WorldRecordPort>,
    policy: DismissedPolicy,
    detect: DetectFn,
    state: RwLock<RecommendationSnapshot>,
    analyzing: AtomicBool,
}

impl RecommendationService {
    pub fn new(store: Arc<dyn WorldRecordPort>, policy: DismissedPolicy) -> Self {
        Self::with_detector(store, policy, inference::analyze)
    }

    fn with_detector(store: Arc<dyn WorldRecordPort>, policy: DismissedPolicy, detect: DetectFn) -> Self {
        Self {
            store,
            policy,
            detect,
            state: RwLock::new(RecommendationSnapshot::default()),
            analyzing: AtomicBool::new(false),
        }
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing.load(Ordering::Acquire)
    }

    #[cfg(test)]
    pub(crate) fn set_analyzing(&self, analyzing: bool) {
        self.analyzing.store(analyzing, Ordering::Release);
    }

    pub async fn snapshot(&self) -> RecommendationSnapshot {
        self.state.read().await.clone()
    }

    /// Run every detector over the world and replace the active lists
    ///
    /// Detection runs on the blocking pool. A failure there leaves the last
    /// good result in place and is reported through `last_error`.
    #[instrument(skip(self))]
    pub async fn analyze(&self, world_id: WorldId) -> AnalysisOutcome {
        if self
            .analyzing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(world_id = %world_id, "Analysis already running, skipping trigger");
            return AnalysisOutcome::Skipped;
        }
        let _guard = AnalyzingGuard(&self.analyzing);

        let ctx = AnalysisContext::load(self.store.as_ref(), world_id).await;
        let dismissed = self.dismissed_ids(world_id).await;
        let detect = self.detect;

        let result = tokio::task::spawn_blocking(move || detect(&ctx)).await;

        let mut state = self.state.write().await;
        match result {
            Ok(mut report) => {
                if !dismissed.is_empty() {
                    report.recommendations.retain(|r| !dismissed.contains(&r.id));
                }
                info!(
                    world_id = %world_id,
                    recommendations = report.recommendations.len(),
                    patterns = report.patterns.len(),
                    "Relationship analysis complete"
                );
                *state = RecommendationSnapshot {
                    world_id: Some(world_id),
                    recommendations: report.recommendations.clone(),
                    patterns: report.patterns.clone(),
                    analyzed_at: Some(Utc::now()),
                    last_error: None,
                };
                AnalysisOutcome::Completed(report)
            }
            Err(e) => {
                let message = format!("Relationship analysis failed: {}", e);
                error!(world_id = %world_id, "{}", message);
                if state.world_id != Some(world_id) {
                    *state = RecommendationSnapshot {
                        world_id: Some(world_id),
                        ..Default::default()
                    };
                }
                state.last_error = Some(message.clone());
                AnalysisOutcome::Failed(message)
            }
        }
    }

    async fn dismissed_ids(&self, world_id: WorldId) -> HashSet<RecommendationId> {
        if self.policy == DismissedPolicy::Resurface {
            return HashSet::new();
        }
        match self.store.list_dismissed_ids(world_id).await {
            Ok(ids) => ids.into_iter().collect(),
            Err(e) => {
                warn!(world_id = %world_id, "Could not read dismissed recommendations: {:#}", e);
                HashSet::new()
            }
        }
    }

    /// Persist the recommendation's relationship and retire it
    ///
    /// Both endpoints must still exist and the pair must still be unrelated;
    /// otherwise the recommendation is dropped without writing anything.
    #[instrument(skip(self), fields(recommendation_id = %id))]
    pub async fn apply_recommendation(
        &self,
        id: RecommendationId,
    ) -> Result<ApplyOutcome, RecommendationError> {
        let recommendation = self
            .find(id)
            .await
            .ok_or(RecommendationError::NotFound(id))?;
        let payload = recommendation.payload.clone();
        let world_id = payload.world_id;

        if let Some(reason) = self.staleness(&recommendation).await? {
            warn!(world_id = %world_id, "Dropping stale recommendation: {}", reason);
            self.remove(id).await;
            return Ok(ApplyOutcome::Dropped { reason });
        }

        let relationship = self.store.create_relationship(payload).await?;
        self.remove(id).await;

        info!(
            world_id = %world_id,
            relationship_id = %relationship.id,
            "Applied recommendation: {} -[{}]-> {}",
            relationship.source.name,
            relationship.relationship_type,
            relationship.target.name
        );
        Ok(ApplyOutcome::Applied(relationship))
    }

    /// Why the recommendation can no longer be applied, if it can't
    async fn staleness(&self, recommendation: &Recommendation) -> anyhow::Result<Option<String>> {
        let payload = &recommendation.payload;
        let world_id = payload.world_id;

        let known = self.known_entity_ids(world_id).await?;
        for endpoint in [&payload.source, &payload.target] {
            if !known.contains(&endpoint.id) {
                return Ok(Some(format!(
                    "{} {} no longer exists",
                    endpoint.entity_type, endpoint.name
                )));
            }
        }

        let relationships = self.store.list_relationships(world_id).await?;
        if relationship_exists(&relationships, payload.source.id, payload.target.id) {
            return Ok(Some(format!(
                "{} and {} are already related",
                payload.source.name, payload.target.name
            )));
        }
        Ok(None)
    }

    async fn known_entity_ids(&self, world_id: WorldId) -> anyhow::Result<HashSet<EntityId>> {
        let mut known: HashSet<EntityId> = HashSet::new();
        known.extend(
            self.store
                .list_characters(world_id)
                .await?
                .into_iter()
                .map(|c| EntityId::from(c.id)),
        );
        known.extend(
            self.store
                .list_lore_items(world_id)
                .await?
                .into_iter()
                .map(|l| EntityId::from(l.id)),
        );
        known.extend(
            self.store
                .list_events(world_id)
                .await?
                .into_iter()
                .map(|e| EntityId::from(e.id)),
        );
        known.extend(
            self.store
                .list_tagged_entities(world_id)
                .await?
                .into_iter()
                .map(|t: TaggedEntity| t.id),
        );
        Ok(known)
    }

    /// Retire a recommendation and record the dismissal for its world
    #[instrument(skip(self), fields(recommendation_id = %id))]
    pub async fn dismiss_recommendation(&self, id: RecommendationId) -> Result<(), RecommendationError> {
        let recommendation = self.remove(id).await.ok_or(RecommendationError::NotFound(id))?;
        let world_id = recommendation.payload.world_id;

        self.store.append_dismissed_id(world_id, id).await?;
        debug!(world_id = %world_id, "Dismissed recommendation: {}", recommendation.title);
        Ok(())
    }

    /// Hide a pattern until the next run; nothing is persisted
    pub async fn dismiss_pattern(&self, id: PatternId) -> Result<(), RecommendationError> {
        let mut state = self.state.write().await;
        let pos = state
            .patterns
            .iter()
            .position(|p| p.id == id)
            .ok_or(RecommendationError::PatternNotFound(id))?;
        let pattern = state.patterns.remove(pos);
        debug!(pattern_id = %id, "Dismissed pattern: {}", pattern.description);
        Ok(())
    }

    async fn find(&self, id: RecommendationId) -> Option<Recommendation> {
        let state = self.state.read().await;
        state.recommendations.iter().find(|r| r.id == id).cloned()
    }

    async fn remove(&self, id: RecommendationId) -> Option<Recommendation> {
        let mut state = self.state.write().await;
        let pos = state.recommendations.iter().position(|r| r.id == id)?;
        Some(state.recommendations.remove(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Character, LoreItem, LoreType, TimelineEvent};
    use crate::domain::value_objects::PatternKind;
    use crate::infrastructure::persistence::InMemoryWorldStore;

    async fn smith_world() -> (Arc<InMemoryWorldStore>, WorldId, Character, Character) {
        let store = Arc::new(InMemoryWorldStore::new());
        let world_id = WorldId::new();
        let anna = Character::new(world_id, "Anna Smith");
        let bob = Character::new(world_id, "Bob Smith");
        store.save_character(&anna).await.unwrap();
        store.save_character(&bob).await.unwrap();
        (store, world_id, anna, bob)
    }

    fn family_rec(report: &AnalysisReport) -> Recommendation {
        report
            .recommendations
            .iter()
            .find(|r| r.payload.relationship_type == "Family")
            .cloned()
            .expect("family recommendation")
    }

    fn completed(outcome: AnalysisOutcome) -> AnalysisReport {
        match outcome {
            AnalysisOutcome::Completed(report) => report,
            other => panic!("expected a completed run, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_smith_family_example() {
        let (store, world_id, _, _) = smith_world().await;
        let service = RecommendationService::new(store, DismissedPolicy::Resurface);

        let report = completed(service.analyze(world_id).await);

        let rec = family_rec(&report);
        assert_eq!(rec.confidence.value(), 80);
        let pattern = report
            .patterns
            .iter()
            .find(|p| p.kind == PatternKind::Family)
            .expect("family pattern");
        assert_eq!(pattern.confidence.value(), 85);
        assert!(!service.is_analyzing());
    }

    #[tokio::test]
    async fn test_rivertown_and_battle_examples() {
        let store = Arc::new(InMemoryWorldStore::new());
        let world_id = WorldId::new();
        let toren = Character::new(world_id, "Toren")
            .with_birth_date("470")
            .with_birth_place("Rivertown");
        store.save_character(&toren).await.unwrap();
        store
            .save_lore_item(&LoreItem::new(world_id, "Rivertown", LoreType::Geography))
            .await
            .unwrap();
        store
            .save_event(
                &TimelineEvent::new(world_id, "Battle of the Pass", 500)
                    .with_description("Toren led the vanguard."),
            )
            .await
            .unwrap();
        let service = RecommendationService::new(store, DismissedPolicy::Resurface);

        let report = completed(service.analyze(world_id).await);

        let born_in = report
            .recommendations
            .iter()
            .find(|r| r.payload.relationship_type == "Born In")
            .expect("born in recommendation");
        assert_eq!(born_in.confidence.value(), 90);
        let participant = report
            .recommendations
            .iter()
            .find(|r| r.payload.relationship_type == "Participant")
            .expect("participant recommendation");
        assert_eq!(participant.confidence.value(), 95);
        assert_eq!(report.recommendations[0].id, participant.id);
    }

    #[tokio::test]
    async fn test_apply_creates_one_relationship_and_is_not_reproposed() {
        let (store, world_id, anna, bob) = smith_world().await;
        let service = RecommendationService::new(store.clone(), DismissedPolicy::Resurface);
        let rec = family_rec(&completed(service.analyze(world_id).await));

        let outcome = service.apply_recommendation(rec.id).await.unwrap();

        let relationship = match outcome {
            ApplyOutcome::Applied(relationship) => relationship,
            other => panic!("expected applied, got {:?}", other),
        };
        let stored = store.list_relationships(world_id).await.unwrap();
        assert_eq!(stored, vec![relationship.clone()]);
        assert_eq!(relationship.source, rec.payload.source);
        assert_eq!(relationship.target, rec.payload.target);
        assert_eq!(relationship.relationship_type, "Family");
        assert!(service.snapshot().await.recommendations.iter().all(|r| r.id != rec.id));

        let rerun = completed(service.analyze(world_id).await);
        let (anna_id, bob_id) = (EntityId::from(anna.id), EntityId::from(bob.id));
        assert!(rerun.recommendations.iter().all(|r| {
            let ends = (r.payload.source.id, r.payload.target.id);
            ends != (anna_id, bob_id) && ends != (bob_id, anna_id)
        }));
    }

    #[tokio::test]
    async fn test_apply_unknown_id_is_not_found() {
        let (store, _, _, _) = smith_world().await;
        let service = RecommendationService::new(store, DismissedPolicy::Resurface);

        let result = service.apply_recommendation(RecommendationId::new()).await;

        assert!(matches!(result, Err(RecommendationError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_apply_with_deleted_endpoint_is_dropped() {
        let (store, world_id, anna, _) = smith_world().await;
        let service = RecommendationService::new(store.clone(), DismissedPolicy::Resurface);
        let rec = family_rec(&completed(service.analyze(world_id).await));
        store.delete_character(world_id, anna.id).await;

        let outcome = service.apply_recommendation(rec.id).await.unwrap();

        assert!(matches!(outcome, ApplyOutcome::Dropped { .. }));
        assert!(store.list_relationships(world_id).await.unwrap().is_empty());
        assert!(service.snapshot().await.recommendations.iter().all(|r| r.id != rec.id));
    }

    #[tokio::test]
    async fn test_apply_when_pair_became_related_is_dropped() {
        let (store, world_id, _, _) = smith_world().await;
        let service = RecommendationService::new(store.clone(), DismissedPolicy::Resurface);
        let rec = family_rec(&completed(service.analyze(world_id).await));
        store.create_relationship(rec.payload.clone()).await.unwrap();

        let outcome = service.apply_recommendation(rec.id).await.unwrap();

        assert!(matches!(outcome, ApplyOutcome::Dropped { .. }));
        assert_eq!(store.list_relationships(world_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dismissed_recommendation_resurfaces_by_default() {
        let (store, world_id, _, _) = smith_world().await;
        let service = RecommendationService::new(store.clone(), DismissedPolicy::Resurface);
        let rec = family_rec(&completed(service.analyze(world_id).await));

        service.dismiss_recommendation(rec.id).await.unwrap();

        assert!(service.snapshot().await.recommendations.iter().all(|r| r.id != rec.id));
        assert_eq!(store.list_dismissed_ids(world_id).await.unwrap(), vec![rec.id]);

        let rerun = completed(service.analyze(world_id).await);
        assert!(rerun.recommendations.iter().any(|r| r.id == rec.id));
    }

    #[tokio::test]
    async fn test_dismissed_recommendation_suppressed_when_configured() {
        let (store, world_id, _, _) = smith_world().await;
        let service = RecommendationService::new(store, DismissedPolicy::Suppress);
        let rec = family_rec(&completed(service.analyze(world_id).await));

        service.dismiss_recommendation(rec.id).await.unwrap();
        let rerun = completed(service.analyze(world_id).await);

        assert!(rerun.recommendations.iter().all(|r| r.id != rec.id));
    }

    #[tokio::test]
    async fn test_dismiss_pattern_is_memory_only() {
        let (store, world_id, _, _) = smith_world().await;
        let service = RecommendationService::new(store.clone(), DismissedPolicy::Resurface);
        let report = completed(service.analyze(world_id).await);
        let pattern_id = report.patterns[0].id;

        service.dismiss_pattern(pattern_id).await.unwrap();

        assert!(service.snapshot().await.patterns.iter().all(|p| p.id != pattern_id));
        assert!(store.list_dismissed_ids(world_id).await.unwrap().is_empty());
        assert!(matches!(
            service.dismiss_pattern(pattern_id).await,
            Err(RecommendationError::PatternNotFound(_))
        ));
    }

    fn exploding_detector(_: &AnalysisContext) -> AnalysisReport {
        panic!("detector blew up")
    }

    #[tokio::test]
    async fn test_failed_run_keeps_last_good_result() {
        let (store, world_id, _, _) = smith_world().await;
        let good = RecommendationService::new(store.clone(), DismissedPolicy::Resurface);
        completed(good.analyze(world_id).await);
        let previous = good.snapshot().await;

        let service = RecommendationService {
            state: RwLock::new(previous.clone()),
            ..RecommendationService::with_detector(store, DismissedPolicy::Resurface, exploding_detector)
        };

        let outcome = service.analyze(world_id).await;

        assert!(matches!(outcome, AnalysisOutcome::Failed(_)));
        let snapshot = service.snapshot().await;
        assert_eq!(snapshot.recommendations, previous.recommendations);
        assert!(snapshot.last_error.is_some());
        assert!(!service.is_analyzing());
    }

    #[tokio::test]
    async fn test_failed_first_run_is_empty() {
        let (store, world_id, _, _) = smith_world().await;
        let service =
            RecommendationService::with_detector(store, DismissedPolicy::Resurface, exploding_detector);

        service.analyze(world_id).await;

        let snapshot = service.snapshot().await;
        assert!(snapshot.recommendations.is_empty());
        assert!(snapshot.last_error.is_some());
    }

    #[tokio::test]
    async fn test_overlapping_run_is_skipped() {
        let (store, world_id, _, _) = smith_world().await;
        let service = RecommendationService::new(store, DismissedPolicy::Resurface);
        service.set_analyzing(true);

        assert!(matches!(service.analyze(world_id).await, AnalysisOutcome::Skipped));
        assert!(service.is_analyzing());
    }

    #[test]
    fn test_policy_parses() {
        assert_eq!("Suppress".parse::<DismissedPolicy>().unwrap(), DismissedPolicy::Suppress);
        assert_eq!("resurface".parse::<DismissedPolicy>().unwrap(), DismissedPolicy::Resurface);
        assert!("forget".parse::<DismissedPolicy>().is_err());
    }
}
