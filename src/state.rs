//! Application state management
//!
//! Contains shared state accessible across all handlers.

use crate::service::ReviewService;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// The review service, wired to the PostgreSQL store in production
    pub service: ReviewService,
}

impl AppState {
    pub fn new(service: ReviewService) -> Self {
        Self { service }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
