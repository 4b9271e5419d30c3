use chatbench_core::AppCore;
use std::sync::Arc;

/// Application state shared across all API handlers
pub type AppState = Arc<AppCore>;
