//! Debounced re-analysis
//!
//! Writes and world switches report the world's relationship count here.
//! When the observed `(world, count)` key changes, an analysis is scheduled
//! after a quiet period; a newer change restarts the timer. A timer that
//! fires while another run is in flight waits one more period and retries.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::application::services::{AnalysisOutcome, RecommendationService};
use crate::domain::value_objects::WorldId;

struct PendingRun {
    handle: JoinHandle<()>,
    /// Set while the task is inside `analyze`
    running: Arc<AtomicBool>,
}

#[derive(Default)]
struct SchedulerState {
    last_key: Option<(WorldId, usize)>,
    pending: Option<PendingRun>,
}

pub struct AnalysisScheduler {
    service: Arc<RecommendationService>,
    debounce: Duration,
    state: Mutex<SchedulerState>,
}

impl AnalysisScheduler {
    pub fn new(service: Arc<RecommendationService>, debounce: Duration) -> Self {
        Self {
            service,
            debounce,
            state: Mutex::new(SchedulerState::default()),
        }
    }

    /// Record the current key; schedules a run only when it changed
    pub async fn observe(&self, world_id: WorldId, relationship_count: usize) -> bool {
        let key = (world_id, relationship_count);
        let mut state = self.state.lock().await;
        if state.last_key == Some(key) {
            return false;
        }
        state.last_key = Some(key);
        self.restart(&mut state, world_id);
        true
    }

    /// Schedule a run regardless of the last observed key
    pub async fn schedule(&self, world_id: WorldId) {
        let mut state = self.state.lock().await;
        self.restart(&mut state, world_id);
    }

    /// Drop any pending run
    pub async fn cancel(&self) {
        let mut state = self.state.lock().await;
        if let Some(run) = state.pending.take() {
            run.handle.abort();
            tracing::debug!("Cancelled pending analysis");
        }
    }

    #[cfg(test)]
    pub(crate) async fn wait_for_pending(&self) {
        let run = self.state.lock().await.pending.take();
        if let Some(run) = run {
            let _ = run.handle.await;
        }
    }

    fn restart(&self, state: &mut SchedulerState, world_id: WorldId) {
        // A run that already started is left to finish; the new timer retries
        // until the in-progress guard is free.
        if let Some(run) = state.pending.take() {
            if !run.running.load(Ordering::Acquire) {
                run.handle.abort();
            }
        }

        let service = self.service.clone();
        let debounce = self.debounce;
        let running = Arc::new(AtomicBool::new(false));
        let flag = running.clone();
        tracing::debug!(world_id = %world_id, delay_ms = debounce.as_millis() as u64, "Analysis scheduled");

        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(debounce).await;
                flag.store(true, Ordering::Release);
                let outcome = service.analyze(world_id).await;
                flag.store(false, Ordering::Release);

                match outcome {
                    AnalysisOutcome::Skipped => {
                        tracing::debug!(world_id = %world_id, "Analysis busy, retrying scheduled run");
                    }
                    AnalysisOutcome::Completed(report) => {
                        tracing::debug!(
                            world_id = %world_id,
                            recommendations = report.recommendations.len(),
                            "Scheduled analysis finished"
                        );
                        break;
                    }
                    AnalysisOutcome::Failed(message) => {
                        tracing::warn!(world_id = %world_id, "Scheduled analysis failed: {}", message);
                        break;
                    }
                }
            }
        });

        state.pending = Some(PendingRun { handle, running });
    }
}

impl Drop for AnalysisScheduler {
    fn drop(&mut self) {
        if let Some(run) = self.state.get_mut().pending.take() {
            run.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::outbound::WorldRecordPort;
    use crate::application::services::DismissedPolicy;
    use crate::domain::entities::Character;
    use crate::infrastructure::persistence::InMemoryWorldStore;

    async fn scheduler() -> (AnalysisScheduler, Arc<RecommendationService>, WorldId) {
        let store = Arc::new(InMemoryWorldStore::new());
        let world_id = WorldId::new();
        store
            .save_character(&Character::new(world_id, "Anna Smith"))
            .await
            .unwrap();
        store
            .save_character(&Character::new(world_id, "Bob Smith"))
            .await
            .unwrap();
        let service = Arc::new(RecommendationService::new(store, DismissedPolicy::Resurface));
        let scheduler = AnalysisScheduler::new(service.clone(), Duration::from_millis(1000));
        (scheduler, service, world_id)
    }

    async fn finish_pending(scheduler: &AnalysisScheduler) {
        let run = scheduler.state.lock().await.pending.take();
        run.expect("a run should be pending").handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_quiet_period() {
        let (scheduler, service, world_id) = scheduler().await;

        assert!(scheduler.observe(world_id, 0).await);
        assert!(service.snapshot().await.analyzed_at.is_none());
        finish_pending(&scheduler).await;

        let snapshot = service.snapshot().await;
        assert_eq!(snapshot.world_id, Some(world_id));
        assert!(!snapshot.recommendations.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_key_does_not_reschedule() {
        let (scheduler, _, world_id) = scheduler().await;

        assert!(scheduler.observe(world_id, 2).await);
        assert!(!scheduler.observe(world_id, 2).await);
        assert!(scheduler.observe(world_id, 3).await);
        assert!(scheduler.observe(WorldId::new(), 3).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_change_restarts_timer() {
        let (scheduler, service, world_id) = scheduler().await;

        scheduler.observe(world_id, 0).await;
        tokio::time::sleep(Duration::from_millis(600)).await;
        scheduler.observe(world_id, 1).await;
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert!(service.snapshot().await.analyzed_at.is_none());
        finish_pending(&scheduler).await;
        assert!(service.snapshot().await.analyzed_at.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_trigger_retries_until_guard_is_free() {
        let (scheduler, service, world_id) = scheduler().await;
        service.set_analyzing(true);

        scheduler.observe(world_id, 1).await;
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert!(service.snapshot().await.analyzed_at.is_none());
        {
            let state = scheduler.state.lock().await;
            let run = state.pending.as_ref().expect("retry should still be pending");
            assert!(!run.handle.is_finished());
        }

        service.set_analyzing(false);
        finish_pending(&scheduler).await;

        let snapshot = service.snapshot().await;
        assert_eq!(snapshot.world_id, Some(world_id));
        assert!(snapshot.analyzed_at.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_keeps_a_run_that_already_started() {
        let (scheduler, _, world_id) = scheduler().await;
        scheduler.observe(world_id, 0).await;
        let started = {
            let state = scheduler.state.lock().await;
            let run = state.pending.as_ref().expect("run should be pending");
            run.running.store(true, Ordering::Release);
            run.handle.abort_handle()
        };

        scheduler.observe(world_id, 1).await;
        tokio::task::yield_now().await;

        assert!(!started.is_finished());
        started.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_run() {
        let (scheduler, service, world_id) = scheduler().await;

        scheduler.schedule(world_id).await;
        scheduler.cancel().await;
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert!(service.snapshot().await.analyzed_at.is_none());
        assert!(scheduler.state.lock().await.pending.is_none());
    }
}
