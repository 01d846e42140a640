//! Thin client for the remote notification API.

use std::time::Duration;

use copicom_bridge::{config::ApiConfig, lenient};
use reqwest::{Method, StatusCode, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Errors returned by [`ApiClient`] calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The configured base URL cannot carry endpoint paths.
    #[error("invalid API base URL {0:?}")]
    InvalidBaseUrl(String),
    /// Transport, timeout or body decoding failure.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: StatusCode, url: Url },
}

/// A notification object exactly as the server sends it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RemoteNotification {
    /// Server identifier. Arrives as a string or a number.
    #[serde(default, rename = "_id")]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub titulo: Option<String>,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub mensaje: Option<String>,
    #[serde(default)]
    pub fecha: Option<String>,
    #[serde(default)]
    pub tipo: Option<String>,
    #[serde(default)]
    pub leida: Option<bool>,
    #[serde(default, rename = "noticiaId", deserialize_with = "lenient::id")]
    pub noticia_id: Option<String>,
    #[serde(default, rename = "encuestaId", deserialize_with = "lenient::id")]
    pub encuesta_id: Option<String>,
    #[serde(default, rename = "linkId", deserialize_with = "lenient::id")]
    pub link_id: Option<String>,
}

impl RemoteNotification {
    /// The server identifier as text, if present and non-empty.
    pub fn id_text(&self) -> Option<String> {
        lenient::id_from_value(self.id.as_ref()?)
    }
}

#[derive(Debug, Serialize)]
struct RegisterTokenBody<'a> {
    token: &'a str,
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(base_url).map_err(|_| ApiError::InvalidBaseUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self { client, base_url })
    }

    /// Builds the HTTP client and API client from configuration.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Self::new(builder.build()?, &config.base_url)
    }

    /// `GET /notificaciones`.
    ///
    /// A record that does not have the expected shape is skipped with a
    /// warning; only a body that is not a JSON array fails the call.
    pub async fn fetch_notifications(&self) -> Result<Vec<RemoteNotification>, ApiError> {
        let url = self.endpoint(&["notificaciones"])?;
        let response = self.send(Method::GET, url).await?;
        let raw: Vec<serde_json::Value> = response.json().await?;
        Ok(decode_records(raw))
    }

    /// `PATCH /notificaciones/{id}/leida`.
    pub async fn mark_read(&self, id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["notificaciones", id, "leida"])?;
        self.send(Method::PATCH, url).await?;
        Ok(())
    }

    /// `DELETE /notificaciones/{id}`.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["notificaciones", id])?;
        self.send(Method::DELETE, url).await?;
        Ok(())
    }

    /// `POST /tokens/register` with `{"token": ...}`.
    pub async fn register_push_token(&self, token: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["tokens", "register"])?;
        let response = self
            .client
            .post(url.clone())
            .json(&RegisterTokenBody { token })
            .send()
            .await?;
        Self::check_status(response, url).map(|_| ())
    }

    async fn send(&self, method: Method, url: Url) -> Result<reqwest::Response, ApiError> {
        log::debug!("{method} {url}");
        let response = self.client.request(method, url.clone()).send().await?;
        Self::check_status(response, url)
    }

    fn check_status(response: reqwest::Response, url: Url) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            log::info!("API error on {url}: status {status}");
            Err(ApiError::Status { status, url })
        }
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn decode_records(raw: Vec<serde_json::Value>) -> Vec<RemoteNotification> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Skipping malformed server notification #{index}: {e}");
                None
            }
        })
        .collect()
}
