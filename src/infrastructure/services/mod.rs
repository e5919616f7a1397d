//! Infrastructure services

mod discovery_service;
mod lexical_search;
mod personalization;

pub use discovery_service::{DiscoveryService, DiscoveryServiceTrait};
pub use lexical_search::{LexicalSearchConfig, LexicalSearchEngine};
pub use personalization::PersonalizationEnricher;
