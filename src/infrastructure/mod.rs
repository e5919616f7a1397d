//! Infrastructure layer - Adapters for storage, caching and the ranking service

pub mod cache;
pub mod catalog;
pub mod discovery;
pub mod logging;
pub mod observability;
pub mod semantic;
pub mod services;
