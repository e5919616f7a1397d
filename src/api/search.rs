//! Discovery endpoints
//!
//! Every route resolves its input into a [`DiscoveryRequest`] once and hands
//! it to [`dispatch`]. `POST /api/search` picks the variant from the content
//! type; the `/image` and `/token` aliases skip the sniffing.

use axum::{
    extract::{FromRequest, Multipart, Query, Request, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use tracing::{debug, info};

use super::middleware::CallerIdentity;
use super::state::AppState;
use super::types::{
    ApiError, ApiErrorType, ImageSubmitResponse, Json, SearchQuery, TextSearchResponse,
    TokenLookupResponse, TokenRequest,
};
use crate::domain::discovery::DiscoveryRequest;
use crate::domain::semantic::ImagePayload;

const IMAGE_FIELD: &str = "image";

pub fn create_search_router() -> Router<AppState> {
    Router::new()
        .route("/search", get(text_search).post(submit))
        .route("/search/image", post(image_search))
        .route("/search/token", post(token_lookup))
}

/// Runs a resolved request against the discovery service
pub async fn dispatch(state: &AppState, request: DiscoveryRequest) -> Result<Response, ApiError> {
    info!(kind = request.kind(), identified = request.user_id().is_some(), "Discovery request");

    let response = match request {
        DiscoveryRequest::TextSearch { query, user_id } => {
            let result = state
                .discovery
                .text_search(&query, user_id.as_deref())
                .await?;
            Json(TextSearchResponse::from(result)).into_response()
        }
        DiscoveryRequest::ImageSearchSubmit { payload, .. } => {
            let submission = state.discovery.submit_image(payload).await?;
            Json(ImageSubmitResponse::from(submission)).into_response()
        }
        DiscoveryRequest::TokenLookup { token, user_id } => {
            let lookup = state
                .discovery
                .lookup_token(&token, user_id.as_deref())
                .await?;
            Json(TokenLookupResponse::from(lookup)).into_response()
        }
    };

    Ok(response)
}

/// GET /api/search?query=...
async fn text_search(
    State(state): State<AppState>,
    identity: CallerIdentity,
    Query(params): Query<SearchQuery>,
) -> Result<Response, ApiError> {
    let query = params.query.unwrap_or_default();
    dispatch(&state, DiscoveryRequest::text(query, identity.0)).await
}

/// POST /api/search
async fn submit(
    State(state): State<AppState>,
    SearchSubmission(request): SearchSubmission,
) -> Result<Response, ApiError> {
    dispatch(&state, request).await
}

/// POST /api/search/image
async fn image_search(
    State(state): State<AppState>,
    identity: CallerIdentity,
    ImageUpload(payload): ImageUpload,
) -> Result<Response, ApiError> {
    let request = DiscoveryRequest::ImageSearchSubmit {
        payload,
        user_id: identity.0,
    };
    dispatch(&state, request).await
}

/// POST /api/search/token
async fn token_lookup(
    State(state): State<AppState>,
    identity: CallerIdentity,
    Json(body): Json<TokenRequest>,
) -> Result<Response, ApiError> {
    let token = require_token(body)?;
    dispatch(&state, DiscoveryRequest::token(token, identity.0)).await
}

fn require_token(body: TokenRequest) -> Result<String, ApiError> {
    body.token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::bad_request("Token is required"))
}

/// A POST body resolved into an image submission or a token lookup
#[derive(Debug)]
pub struct SearchSubmission(pub DiscoveryRequest);

impl<S> FromRequest<S> for SearchSubmission
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let user_id = CallerIdentity::from_headers(req.headers()).0;

        match BodyKind::of(req.headers()) {
            BodyKind::Multipart => {
                let ImageUpload(payload) = ImageUpload::from_request(req, state).await?;
                Ok(Self(DiscoveryRequest::ImageSearchSubmit { payload, user_id }))
            }
            BodyKind::Json => {
                let Json(body) = Json::<TokenRequest>::from_request(req, state).await?;
                let token = require_token(body)?;
                Ok(Self(DiscoveryRequest::token(token, user_id)))
            }
            BodyKind::Other => Err(ApiError::unsupported_media_type(
                "Expected multipart/form-data or application/json",
            )),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum BodyKind {
    Multipart,
    Json,
    Other,
}

impl BodyKind {
    fn of(headers: &HeaderMap) -> Self {
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            Self::Multipart
        } else if content_type.starts_with("application/json") {
            Self::Json
        } else {
            Self::Other
        }
    }
}

/// Image taken from a multipart body: the `image` field, or else the first
/// file field. The bytes are validated as an image and kept unmodified.
#[derive(Debug)]
pub struct ImageUpload(pub ImagePayload);

impl<S> FromRequest<S> for ImageUpload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state).await.map_err(|rejection| {
            upload_error(rejection.status(), rejection.body_text())
        })?;

        let mut fallback: Option<(Bytes, Option<String>)> = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| upload_error(e.status(), e.body_text()))?
        {
            let is_image_field = field.name() == Some(IMAGE_FIELD);

            if !is_image_field && (fallback.is_some() || field.file_name().is_none()) {
                continue;
            }

            let file_name = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| upload_error(e.status(), e.body_text()))?;

            if is_image_field {
                return Ok(Self(image_payload(bytes, file_name)?));
            }

            fallback = Some((bytes, file_name));
        }

        match fallback {
            Some((bytes, file_name)) => Ok(Self(image_payload(bytes, file_name)?)),
            None => Err(ApiError::bad_request("Image file is required")),
        }
    }
}

fn image_payload(bytes: Bytes, file_name: Option<String>) -> Result<ImagePayload, ApiError> {
    let payload = ImagePayload::new(bytes)?;
    debug!(bytes = payload.len(), format = ?payload.format(), "Image upload accepted");

    Ok(match file_name {
        Some(name) => payload.with_file_name(name),
        None => payload,
    })
}

fn upload_error(status: StatusCode, detail: String) -> ApiError {
    let error_type = match status {
        StatusCode::PAYLOAD_TOO_LARGE => ApiErrorType::PayloadTooLarge,
        StatusCode::UNSUPPORTED_MEDIA_TYPE => ApiErrorType::UnsupportedMediaType,
        s if s.is_server_error() => ApiErrorType::ServerError,
        _ => ApiErrorType::InvalidRequestError,
    };

    ApiError::new(status, error_type, format!("Failed to read upload: {}", detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    #[test]
    fn test_body_kind_sniffing() {
        assert_eq!(
            BodyKind::of(&headers("multipart/form-data; boundary=xyz")),
            BodyKind::Multipart
        );
        assert_eq!(BodyKind::of(&headers("application/json")), BodyKind::Json);
        assert_eq!(
            BodyKind::of(&headers("Application/JSON; charset=utf-8")),
            BodyKind::Json
        );
        assert_eq!(BodyKind::of(&headers("text/plain")), BodyKind::Other);
        assert_eq!(BodyKind::of(&HeaderMap::new()), BodyKind::Other);
    }

    #[test]
    fn test_require_token() {
        let ok = require_token(TokenRequest {
            token: Some(" abc ".to_string()),
        });
        assert_eq!(ok.unwrap(), "abc");

        let missing = require_token(TokenRequest { token: None }).unwrap_err();
        assert_eq!(missing.status, StatusCode::BAD_REQUEST);

        let blank = require_token(TokenRequest {
            token: Some("  ".to_string()),
        })
        .unwrap_err();
        assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    }
}
