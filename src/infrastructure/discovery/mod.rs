//! Discovery infrastructure - Token issuance and the image-search result cache

mod result_cache;
mod token;

pub use result_cache::ResultCache;
pub use token::TokenGenerator;
