//! Semantic search domain - Contract of the external ranking service

mod image;
mod provider;

pub use image::{ImageFormat, ImagePayload};
pub use provider::{RankedMatch, SemanticSearchProvider};

#[cfg(test)]
pub use provider::MockSemanticSearchProvider;
