use axum::{extract::DefaultBodyLimit, middleware, routing::get, Router};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::health;
use super::middleware::{logging_middleware, metrics_middleware};
use super::search;
use super::state::AppState;

/// Create the full router with application state
///
/// `max_upload_bytes` bounds every request body, which in practice means
/// image uploads.
pub fn create_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/api", search::create_search_router())
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::domain::catalog::{ProductSummary, StoreSummary};
    use crate::domain::semantic::{MockSemanticSearchProvider, RankedMatch};
    use crate::domain::DomainError;
    use crate::infrastructure::cache::InMemoryCache;
    use crate::infrastructure::catalog::{InMemoryCatalogRepository, InMemoryWishlistRepository};
    use crate::infrastructure::discovery::ResultCache;
    use crate::infrastructure::services::{
        DiscoveryService, LexicalSearchConfig, LexicalSearchEngine, PersonalizationEnricher,
    };

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];
    const BOUNDARY: &str = "discovery-boundary";

    fn app(semantic: MockSemanticSearchProvider) -> Router {
        let shack = StoreSummary::new("s1", "Shoe Shack").with_description("Sneakers and boots");
        let catalog = Arc::new(InMemoryCatalogRepository::with_catalog(
            vec![shack.clone()],
            vec![
                ProductSummary::new("P1", "Blue Sneakers", shack.to_ref()),
                ProductSummary::new("P3", "Navy Sneakers", shack.to_ref()),
                ProductSummary::new("L1", "Sneaker Laces", shack.to_ref()),
            ],
        ));
        let wishlist = Arc::new(InMemoryWishlistRepository::new());
        wishlist.add("u1", "P1").unwrap();

        let service = DiscoveryService::new(
            LexicalSearchEngine::new(catalog.clone(), LexicalSearchConfig::default()),
            catalog,
            Arc::new(semantic),
            ResultCache::new(Arc::new(InMemoryCache::new())),
            PersonalizationEnricher::new(wishlist),
        );

        create_router(AppState::new(Arc::new(service)), 1024 * 1024)
    }

    fn ranking_text(matches: Vec<RankedMatch>) -> MockSemanticSearchProvider {
        let mut semantic = MockSemanticSearchProvider::new();
        semantic
            .expect_rank_by_text()
            .returning(move |_, _| Ok(matches.clone()));
        semantic.expect_provider_name().return_const("semantic");
        semantic
    }

    fn ranking_image(
        result: impl Fn() -> Result<Vec<RankedMatch>, DomainError> + Send + 'static,
    ) -> MockSemanticSearchProvider {
        let mut semantic = MockSemanticSearchProvider::new();
        semantic.expect_rank_by_image().returning(move |_| result());
        semantic
    }

    fn multipart_body(field: &str, bytes: &[u8]) -> Body {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"shoe.png\"\r\n",
                field
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
        Body::from(body)
    }

    fn image_request(uri: &str, field: &str, bytes: &[u8]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(multipart_body(field, bytes))
            .unwrap()
    }

    fn token_request(token: &str, user_id: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/search")
            .header("content-type", "application/json");

        if let Some(user_id) = user_id {
            builder = builder.header("x-user-id", user_id);
        }

        builder
            .body(Body::from(serde_json::json!({ "token": token }).to_string()))
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };

        (status, json)
    }

    fn product_ids(json: &serde_json::Value) -> Vec<String> {
        json["productsWithWishlistStatus"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_text_search_ranked() {
        let app = app(ranking_text(vec![
            RankedMatch::new("P1", 0.9),
            RankedMatch::new("P2", 0.7),
            RankedMatch::new("P3", 0.95),
        ]));

        let request = Request::builder()
            .uri("/api/search?query=blue%20sneakers")
            .header("x-user-id", "u1")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], true);
        assert_eq!(json["source"], "ai");
        assert_eq!(json["count"], 2);
        assert_eq!(product_ids(&json), vec!["P3", "P1"]);
        assert_eq!(json["productsWithWishlistStatus"][1]["isWishlisted"], true);
        assert_eq!(json["stores"][0]["id"], "s1");
    }

    #[tokio::test]
    async fn test_text_search_fallback() {
        let app = app(ranking_text(Vec::new()));

        let request = Request::builder()
            .uri("/api/search?query=laces")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["source"], "fallback");
        assert_eq!(product_ids(&json), vec!["L1"]);
        assert!(json["productsWithWishlistStatus"][0].get("aiScore").is_none());
    }

    #[tokio::test]
    async fn test_text_search_without_query_is_bad_request() {
        let app = app(MockSemanticSearchProvider::new());

        let request = Request::builder().uri("/api/search").body(Body::empty()).unwrap();
        let (status, json) = send(&app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert_eq!(json["type"], "invalid_request_error");
    }

    #[tokio::test]
    async fn test_image_then_token_round_trip() {
        let app = app(ranking_image(|| {
            Ok(vec![RankedMatch::new("P1", 0.4), RankedMatch::new("P3", 0.8)])
        }));

        let (status, json) = send(&app, image_request("/api/search", "image", PNG)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        let token = json["token"].as_str().unwrap().to_string();

        for _ in 0..2 {
            let (status, json) = send(&app, token_request(&token, Some("u1"))).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json["status"], true);
            assert_eq!(json["count"], 2);
            assert_eq!(product_ids(&json), vec!["P3", "P1"]);
            assert_eq!(json["productsWithWishlistStatus"][1]["isWishlisted"], true);
        }
    }

    #[tokio::test]
    async fn test_image_alias_accepts_any_file_field() {
        let app = app(ranking_image(|| Ok(vec![RankedMatch::new("P1", 0.4)])));

        let (status, json) = send(&app, image_request("/api/search/image", "photo", PNG)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
    }

    #[tokio::test]
    async fn test_image_without_matches() {
        let app = app(ranking_image(|| Ok(Vec::new())));

        let (status, json) = send(&app, image_request("/api/search", "image", PNG)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            serde_json::json!({"success": false, "message": "No matching products found"})
        );
    }

    #[tokio::test]
    async fn test_image_upstream_failure_is_server_error() {
        let app = app(ranking_image(|| {
            Err(DomainError::provider("semantic", "HTTP 502"))
        }));

        let (status, json) = send(&app, image_request("/api/search", "image", PNG)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_non_image_upload_is_rejected() {
        let mut semantic = MockSemanticSearchProvider::new();
        semantic.expect_rank_by_image().never();
        let app = app(semantic);

        let (status, json) =
            send(&app, image_request("/api/search", "image", b"plain text")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_unknown_token_is_expired_not_error() {
        let app = app(MockSemanticSearchProvider::new());

        let request = Request::builder()
            .method("POST")
            .uri("/api/search/token")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"token":"AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"}"#))
            .unwrap();
        let (status, json) = send(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            serde_json::json!({"success": false, "message": "Token expired or invalid"})
        );
    }

    #[tokio::test]
    async fn test_missing_token_is_bad_request() {
        let app = app(MockSemanticSearchProvider::new());

        let request = Request::builder()
            .method("POST")
            .uri("/api/search")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let (status, _) = send(&app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unsupported_content_type() {
        let app = app(MockSemanticSearchProvider::new());

        let request = Request::builder()
            .method("POST")
            .uri("/api/search")
            .header("content-type", "text/plain")
            .body(Body::from("sneakers"))
            .unwrap();
        let (status, json) = send(&app, request).await;

        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(json["type"], "unsupported_media_type");
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = app(MockSemanticSearchProvider::new());

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");

        let request = Request::builder().uri("/ready").body(Body::empty()).unwrap();
        let (status, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["checks"].as_array().unwrap().len(), 2);

        let request = Request::builder().uri("/live").body(Body::empty()).unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let app = app(MockSemanticSearchProvider::new());

        let request = Request::builder().uri("/live").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert!(response.headers().contains_key("x-request-id"));
    }
}
