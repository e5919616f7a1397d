//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::services::DiscoveryServiceTrait;

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub discovery: Arc<dyn DiscoveryServiceTrait>,
}

impl AppState {
    pub fn new(discovery: Arc<dyn DiscoveryServiceTrait>) -> Self {
        Self { discovery }
    }
}
