//! Cache domain - Key-value store with per-entry expiry

mod repository;

pub use repository::{Cache, CacheExt};

#[cfg(test)]
pub use repository::mock;
