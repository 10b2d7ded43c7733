use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client as HttpClient, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::app::AppConfig;
use crate::error::ApiError;
use crate::session::SessionStore;

pub const SESSION_HEADER: &str = "X-Session-Id";

/// Thin JSON-over-HTTP wrapper that knows the base URL and the current session.
#[derive(Clone)]
pub struct Transport {
    http: HttpClient,
    base_url: String,
    session: Arc<SessionStore>,
}

impl Transport {
    pub fn new(config: &AppConfig, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        let base = config.api_url()?;
        let http = HttpClient::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: base.as_str().trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_auth(&self, req: RequestBuilder) -> RequestBuilder {
        let req = req.header(CONTENT_TYPE, "application/json");
        match self.session.session_id() {
            Some(id) => req.header(SESSION_HEADER, id),
            None => req,
        }
    }

    /// Sends one request and returns the decoded JSON body, or `None` when the
    /// server answered 2xx without a JSON payload.
    pub async fn request(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> Result<Option<Value>, ApiError> {
        let url = self.endpoint(path);
        log::debug!("{method} {url}");
        let mut req = self.with_auth(self.http.request(method.clone(), &url));
        if let Some(body) = body {
            req = req.body(body);
        }
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            log::debug!("{method} {url} -> {status}");
            let body = if text.trim().is_empty() {
                format!("Erro na requisição: {}", status.as_u16())
            } else {
                text
            };
            return Err(ApiError::Status { status, body });
        }

        let is_json = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));
        if !is_json {
            return Ok(None);
        }
        let bytes = resp.bytes().await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ApiError> {
        let json = self.request(Method::GET, path, None).await?;
        Ok(json.map(serde_json::from_value).transpose()?)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<Option<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let bytes = serde_json::to_vec(body)?;
        let json = self.request(Method::POST, path, Some(bytes)).await?;
        Ok(json.map(serde_json::from_value).transpose()?)
    }
}
