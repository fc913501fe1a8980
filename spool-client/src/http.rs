//! HTTP client for the Spoolman REST API

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::models::{EntityKind, Record};
use tracing::{debug, instrument};

use crate::source::{EntitySource, SettingsStore};
use crate::{ClientConfig, ClientError, ClientResult};

/// Body of `GET /api/v1/setting/{key}`
#[derive(Debug, Deserialize)]
struct SettingResponse {
    /// JSON-encoded value
    value: String,
    is_set: bool,
}

/// HTTP client for a Spoolman server
#[derive(Debug, Clone)]
pub struct SpoolmanClient {
    client: Client,
    base_url: String,
}

impl SpoolmanClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.client.get(self.url(path)).send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            return match status {
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(text)),
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    Err(ClientError::Validation(text))
                }
                _ => Err(ClientError::Internal(format!("{}: {}", status, text))),
            };
        }

        response.json().await.map_err(Into::into)
    }
}

#[async_trait]
impl EntitySource for SpoolmanClient {
    #[instrument(skip(self))]
    async fn get_entity(&self, kind: EntityKind, id: i64) -> ClientResult<Record> {
        let value: Value = self
            .get(&format!("{}/{}", kind.path_segment(), id))
            .await?;
        if !value.is_object() {
            return Err(ClientError::InvalidResponse(format!(
                "{} {} is not an object",
                kind, id
            )));
        }
        debug!("Entity fetched");
        Ok(Record::from_json(&value))
    }
}

#[async_trait]
impl SettingsStore for SpoolmanClient {
    #[instrument(skip(self))]
    async fn get_setting(&self, key: &str) -> ClientResult<Option<String>> {
        let setting: SettingResponse = self.get(&format!("setting/{}", key)).await?;
        Ok(setting.is_set.then_some(setting.value))
    }

    #[instrument(skip(self, value), fields(len = value.len()))]
    async fn set_setting(&self, key: &str, value: &str) -> ClientResult<()> {
        // The endpoint takes the JSON-encoded value as a JSON string body.
        let _: Value = self.post(&format!("setting/{}", key), &value).await?;
        Ok(())
    }
}
