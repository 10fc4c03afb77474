//! HTTP transport.
//!
//! Every component talks to the remote API through the [`Transport`] trait.
//! [`HttpTransport`] is the production implementation; tests use
//! [`crate::mock::MockTransport`].

use std::fmt;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tfe_core::document::Document;
use tfe_core::{Result, TfeError};
use tracing::debug;

use crate::config::ClientConfig;

/// Media type of every request and response body.
pub const JSON_API_CONTENT_TYPE: &str = "application/vnd.api+json";

/// HTTP verb of an [`ApiRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        };
        f.write_str(verb)
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A request relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Patch, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Attach query parameters.
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    /// Attach a JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Status code and parsed body of a response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// `Value::Null` when the response had no body.
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Best-effort description of a failed response.
    ///
    /// Prefers the first JSON:API error's `detail`, then its `title`.
    pub fn error_message(&self) -> String {
        let first_error = self
            .body
            .get("errors")
            .and_then(Value::as_array)
            .and_then(|errors| errors.first());

        if let Some(error) = first_error {
            for field in ["detail", "title"] {
                if let Some(text) = error.get(field).and_then(Value::as_str) {
                    return text.to_string();
                }
            }
        }

        match &self.body {
            Value::Null => "no response body".to_string(),
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }

    /// Convert a failed response into a [`TfeError::RemoteFailure`].
    pub fn into_remote_failure(self) -> TfeError {
        TfeError::RemoteFailure {
            status: self.status,
            message: self.error_message(),
        }
    }

    /// Deserialize the JSON:API `data` member.
    pub fn data<T: DeserializeOwned>(self) -> Result<T> {
        Document::data_from(self.body)
    }
}

/// Authenticated access to the remote API. No retries at this layer.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a request and return whatever status the server answered with.
    ///
    /// Only failures to reach the server or to read the response are `Err`;
    /// non-2xx statuses are returned as an [`ApiResponse`].
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;

    async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.send(ApiRequest::get(path)).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<ApiResponse> {
        self.send(ApiRequest::post(path, body)).await
    }

    async fn patch(&self, path: &str, body: Value) -> Result<ApiResponse> {
        self.send(ApiRequest::patch(path, body)).await
    }

    async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.send(ApiRequest::delete(path)).await
    }
}

/// [`Transport`] over HTTPS using reqwest.
#[derive(Clone)]
pub struct HttpTransport {
    /// Base URL of the API.
    base_url: String,

    /// Bearer token.
    token: String,

    /// HTTP client.
    http_client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport for the given connection settings.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            http_client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Turn an [`ApiRequest`] into an authenticated reqwest request.
    fn build(&self, request: &ApiRequest) -> reqwest::Result<reqwest::Request> {
        let mut builder = self
            .http_client
            .request(request.method.into(), self.url(&request.path))
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, JSON_API_CONTENT_TYPE)
            .header(ACCEPT, JSON_API_CONTENT_TYPE);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.to_string());
        }

        builder.build()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let http_request = self
            .build(&request)
            .map_err(|e| TfeError::ConnectionError(e.to_string()))?;
        let url = http_request.url().to_string();
        debug!(method = %request.method, url = %url, "sending request");

        let response = self
            .http_client
            .execute(http_request)
            .await
            .map_err(|e| TfeError::ConnectionError(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TfeError::ConnectionError(e.to_string()))?;

        debug!(method = %request.method, url = %url, status, "received response");

        Ok(ApiResponse::new(status, parse_body(status, text)?))
    }
}

/// Empty bodies become `Null`. A non-JSON body is kept as a string on
/// failure responses (proxies return HTML) and rejected on success ones.
fn parse_body(status: u16, text: String) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    match serde_json::from_str(&text) {
        Ok(value) => Ok(value),
        Err(_) if !(200..300).contains(&status) => Ok(Value::String(text)),
        Err(e) => Err(e.into()),
    }
}
