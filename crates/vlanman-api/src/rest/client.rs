// REST API HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, JSON body handling, and
// FastAPI error-body parsing. Endpoint groups (domains, vlans, etc.) are
// implemented as inherent methods in sibling files to keep this module
// focused on transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::ErrorBody;

/// Async client for the IP-management REST API.
///
/// The base URL is the versioned API prefix (e.g.
/// `http://localhost:8000/api/v1`). The health endpoint is resolved
/// against the service root instead.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client from a base URL and transport configuration.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            timeout_secs: transport.timeout_secs(),
        })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            timeout_secs: 0,
        })
    }

    /// Ensure the base URL ends with `/` so relative joins append
    /// instead of replacing the last path segment.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The versioned API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Join a relative path (e.g. `"vlans/{id}"`) onto the API base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Resolve a path against the service root (scheme + host + port),
    /// ignoring the versioned API prefix.
    pub(crate) fn root_url(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url.set_query(None);
        url
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");
        let resp = self.http.get(url).send().await.map_err(|e| self.map_send(e))?;
        Self::handle_response(resp).await
    }

    pub(crate) async fn get_with_params<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        debug!("GET {url} params={params:?}");
        let resp = self
            .http
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| self.map_send(e))?;
        Self::handle_response(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("POST {url}");
        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send(e))?;
        Self::handle_response(resp).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("PUT {url}");
        let resp = self
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send(e))?;
        Self::handle_response(resp).await
    }

    pub(crate) async fn patch<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("PATCH {url}");
        let resp = self
            .http
            .patch(url)
            .send()
            .await
            .map_err(|e| self.map_send(e))?;
        Self::handle_response(resp).await
    }

    pub(crate) async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {url}");
        let resp = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(|e| self.map_send(e))?;
        Self::handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    fn map_send(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(err)
        }
    }

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let path = resp.url().path().to_owned();
        let raw = resp.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<ErrorBody>(&raw).ok();

        let message = parsed
            .as_ref()
            .and_then(|b| {
                b.message.clone().or_else(|| {
                    b.detail.as_ref().map(|d| match d {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                })
            })
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    raw.chars().take(200).collect()
                }
            });

        match status {
            reqwest::StatusCode::NOT_FOUND => Error::NotFound { path },
            reqwest::StatusCode::UNPROCESSABLE_ENTITY => Error::Validation { message },
            _ => Error::Api {
                status: status.as_u16(),
                message,
                kind: parsed.and_then(|b| b.kind),
            },
        }
    }
}
