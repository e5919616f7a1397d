//! Custom JSON extractor that returns errors as JSON

use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json as AxumJson,
};
use serde::de::DeserializeOwned;

use super::error::{ApiError, ApiErrorType};

/// Wrapper around `axum::Json` whose rejections use the API error body
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match AxumJson::<T>::from_request(req, state).await {
            Ok(AxumJson(value)) => Ok(Json(value)),
            Err(rejection) => Err(rejection_to_error(&rejection)),
        }
    }
}

fn rejection_to_error(rejection: &axum::extract::rejection::JsonRejection) -> ApiError {
    use axum::extract::rejection::JsonRejection::*;

    let message = match rejection {
        JsonDataError(err) => format!("Invalid JSON data: {}", err.body_text()),
        JsonSyntaxError(err) => format!("Invalid JSON syntax: {}", err.body_text()),
        MissingJsonContentType(_) => {
            "Missing Content-Type header. Expected 'application/json'.".to_string()
        }
        BytesRejection(err) => format!("Failed to read request body: {}", err.body_text()),
        _ => "Invalid JSON request".to_string(),
    };

    let error_type = match rejection.status() {
        StatusCode::UNSUPPORTED_MEDIA_TYPE => ApiErrorType::UnsupportedMediaType,
        StatusCode::PAYLOAD_TOO_LARGE => ApiErrorType::PayloadTooLarge,
        _ => ApiErrorType::InvalidRequestError,
    };

    ApiError::new(rejection.status(), error_type, message)
}

impl<T> IntoResponse for Json<T>
where
    T: serde::Serialize,
{
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct TokenBody {
        token: String,
    }

    fn request(content_type: &str, body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .header("content-type", content_type)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_extracts_valid_body() {
        let Json(body) = Json::<TokenBody>::from_request(
            request("application/json", r#"{"token":"abc"}"#),
            &(),
        )
        .await
        .unwrap();

        assert_eq!(body.token, "abc");
    }

    #[tokio::test]
    async fn test_missing_field_uses_api_error_body() {
        let err = Json::<TokenBody>::from_request(request("application/json", "{}"), &())
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.response.message.starts_with("Invalid JSON data"));
    }

    #[tokio::test]
    async fn test_wrong_content_type_is_unsupported_media() {
        let err = Json::<TokenBody>::from_request(request("text/plain", "token"), &())
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(err.response.error_type, ApiErrorType::UnsupportedMediaType);
    }
}
