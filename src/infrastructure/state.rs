//! Shared application state

use std::sync::Arc;

use anyhow::Result;

use crate::application::ports::outbound::WorldRecordPort;
use crate::application::services::RecommendationService;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::persistence::create_store;
use crate::infrastructure::scheduler::AnalysisScheduler;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn WorldRecordPort>,
    pub recommendation_service: Arc<RecommendationService>,
    /// Re-runs analysis after relationship writes settle
    pub scheduler: AnalysisScheduler,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let store = create_store(&config.store).await?;
        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: AppConfig, store: Arc<dyn WorldRecordPort>) -> Self {
        let recommendation_service = Arc::new(RecommendationService::new(
            store.clone(),
            config.analysis.dismissed_policy,
        ));
        let scheduler = AnalysisScheduler::new(recommendation_service.clone(), config.analysis.debounce);

        Self {
            config,
            store,
            recommendation_service,
            scheduler,
        }
    }
}
