use std::sync::Arc;

use crate::config::Config;
use crate::db::RatingStore;
use crate::models::ScoreScale;
use crate::services::Predictor;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RatingStore>,
    pub predictor: Predictor,
    pub scale: ScoreScale,
    pub judge_email: Arc<str>,
}

impl AppState {
    /// Creates state around an existing store, taking engine settings from config
    pub fn new(store: Arc<dyn RatingStore>, config: &Config) -> Self {
        Self {
            store,
            predictor: Predictor::new(config.rounding()),
            scale: config.score_scale(),
            judge_email: Arc::from(config.judge_email.as_str()),
        }
    }
}
