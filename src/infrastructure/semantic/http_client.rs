use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};

use crate::domain::DomainError;

/// A single-file multipart upload with optional extra text fields
#[derive(Debug, Clone)]
pub struct MultipartUpload {
    pub field_name: String,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Bytes,
    pub text_fields: Vec<(String, String)>,
}

/// Trait for HTTP client operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError>;

    async fn post_multipart(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        upload: MultipartUpload,
    ) -> Result<serde_json::Value, DomainError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<serde_json::Value, DomainError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                DomainError::provider("http", format!("Request timed out: {}", e))
            } else {
                DomainError::provider("http", format!("Request failed: {}", e))
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            return Err(DomainError::provider(
                "http",
                format!("HTTP {}: {}", status, error_body),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| DomainError::provider("http", format!("Failed to parse response: {}", e)))
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError> {
        let mut request = self.client.post(url);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        self.send(request.json(body)).await
    }

    async fn post_multipart(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        upload: MultipartUpload,
    ) -> Result<serde_json::Value, DomainError> {
        let part = Part::stream(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.mime_type)
            .map_err(|e| DomainError::validation(format!("Invalid MIME type: {}", e)))?;

        let mut form = Form::new().part(upload.field_name, part);

        for (name, value) in upload.text_fields {
            form = form.text(name, value);
        }

        let mut request = self.client.post(url);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        self.send(request.multipart(form)).await
    }
}
