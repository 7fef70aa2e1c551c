//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::DiaryConfig;
use crate::persistence::DiaryStore;
use crate::service::DiaryService;
use crate::util::CookiePolicy;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Diary service for all business logic.
    pub diary_service: Arc<DiaryService>,
    /// Token cookie preset for this environment.
    pub cookie_policy: Arc<CookiePolicy>,
}

impl AppState {
    /// Wires the service layer on top of `store` using the calendar and
    /// cookie settings from `config`.
    #[must_use]
    pub fn new(config: &DiaryConfig, store: Arc<dyn DiaryStore>) -> Self {
        Self {
            diary_service: Arc::new(DiaryService::new(store, config.calendar())),
            cookie_policy: Arc::new(config.cookie_policy()),
        }
    }
}
