//! Discovery domain - Query variants, cached result sets and ranking merge

mod cached_result;
mod merge;
mod outcome;
mod request;

pub use cached_result::{CachedResult, RESULT_TOKEN_TTL};
pub use merge::{MergedProduct, merge_ranked, merge_unranked, sort_by_score};
pub use outcome::{ImageSubmission, SearchSource, TextSearchResult, TokenLookup};
pub use request::DiscoveryRequest;
