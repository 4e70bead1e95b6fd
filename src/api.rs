//! HTTP API for the trip planner

mod handlers;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::knowledge::KnowledgeBase;
use crate::runtime::ProductionManager;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<ProductionManager>,
    pub knowledge: Arc<KnowledgeBase>,
}

impl AppState {
    pub fn new(manager: ProductionManager, knowledge: Arc<KnowledgeBase>) -> Self {
        Self {
            manager: Arc::new(manager),
            knowledge,
        }
    }
}
