//! HTTP client for the dashboard backend.
//!
//! Every call goes through [`ApiClient::request`], which never fails: transport
//! errors, non-2xx statuses and unparseable bodies all come back as an
//! [`ApiResponse`] with `success: false` and a diagnostic message.

use super::envelope::{ApiResponse, PageBody, Paginated};
use super::error::ApiError;
use crate::settings::Settings;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Request body of a backend call.
#[derive(Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Vec<u8>),
    Multipart(Form),
}

/// Method, body and extra headers of a backend call.
#[derive(Debug)]
pub struct RequestOptions {
    method: Method,
    body: Result<RequestBody, String>,
    headers: HeaderMap,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            body: Ok(RequestBody::Empty),
            headers: HeaderMap::new(),
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    /// Send `payload` as a JSON body.
    #[must_use]
    pub fn json<B: Serialize + ?Sized>(mut self, payload: &B) -> Self {
        self.body = serde_json::to_vec(payload)
            .map(RequestBody::Json)
            .map_err(|e| e.to_string());
        self
    }

    /// Send a multipart form. No `Content-Type` is set by the client so the
    /// transport can add its own boundary.
    #[must_use]
    pub fn multipart(mut self, form: Form) -> Self {
        self.body = Ok(RequestBody::Multipart(form));
        self
    }

    /// Add a header. Caller headers win over the default JSON content type.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    fn is_multipart(&self) -> bool {
        matches!(self.body, Ok(RequestBody::Multipart(_)))
    }

    /// Default headers merged with the caller's.
    fn merged_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if !self.is_multipart() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        for (name, value) in &self.headers {
            if self.is_multipart() && name == CONTENT_TYPE {
                continue;
            }
            headers.insert(name.clone(), value.clone());
        }
        headers
    }
}

/// Client for the dashboard REST backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the backend at `base_url`.
    ///
    /// No request timeout is configured; the transport defaults apply.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a client from the loaded settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.api_url.clone())
    }

    /// Use a preconfigured reqwest client.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Call `endpoint` and return the backend's envelope verbatim.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> ApiResponse<T> {
        match self.send::<ApiResponse<T>>(endpoint, options).await {
            Ok(envelope) => envelope,
            Err(e) => failed(endpoint, e),
        }
    }

    /// Call a paged endpoint. Accepts either a bare page or an enveloped one.
    pub async fn request_page<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> ApiResponse<Paginated<T>> {
        match self.send::<PageBody<T>>(endpoint, options).await {
            Ok(body) => body.into(),
            Err(e) => failed(endpoint, e),
        }
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResponse<T> {
        self.request(endpoint, RequestOptions::get()).await
    }

    async fn send<B: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<B, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let headers = options.merged_headers();
        let RequestOptions { method, body, .. } = options;
        let body = body.map_err(ApiError::Encode)?;

        debug!(%method, %url, "API request");

        let builder = self.client.request(method, &url).headers(headers);
        let builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(bytes) => builder.body(bytes),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        let resp = builder
            .send()
            .await
            .map_err(|e| ApiError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ApiError::Status {
                status: resp.status().as_u16(),
            });
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ApiError::Connection(e.to_string()))?;

        serde_json::from_slice(&bytes).map_err(ApiError::from_json)
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

fn failed<T>(endpoint: &str, err: ApiError) -> ApiResponse<T> {
    warn!(endpoint, error = %err, "API request failed");
    ApiResponse::failure(format!("Failed to fetch {endpoint}: {err}"))
}
