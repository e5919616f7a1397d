//! Caller identity taken from the `X-User-Id` header
//!
//! Authentication happens upstream; this service only receives the already
//! resolved user id, if any.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

pub const USER_ID_HEADER: &str = "x-user-id";

/// Optional caller identity; a missing, blank or non-UTF-8 header is anonymous
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerIdentity(pub Option<String>);

impl CallerIdentity {
    pub fn user_id(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        let user_id = headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Self(user_id)
    }
}

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
