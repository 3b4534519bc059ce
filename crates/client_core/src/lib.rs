use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    domain::{ConfigId, ConfigRecord},
    protocol::{
        ApiEnvelope, ConfigDraft, DeleteRequest, EditRequest, GetRequest, ListRequest, PageResult,
        UploadResult,
    },
};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

const LIST_PATH: &str = "/api/list";
const DELETE_PATH: &str = "/api/delete";
const GET_PATH: &str = "/api/get";
const ADD_PATH: &str = "/api/add";
const EDIT_PATH: &str = "/api/edit";
const UPLOAD_PATH: &str = "/api/upload";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("unsupported server url scheme '{0}'")]
    UnsupportedScheme(String),
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        source: reqwest::Error,
    },
    #[error("undecodable response from {endpoint} (http {status}): {source}")]
    Decode {
        endpoint: &'static str,
        status: StatusCode,
        source: serde_json::Error,
    },
}

/// The admin API the list view talks to.
///
/// Implementations return the decoded envelope even when its `code` is
/// non-zero; only transport and decode problems are errors.
#[async_trait]
pub trait ConfigApi: Send + Sync {
    async fn list_configs(
        &self,
        request: &ListRequest,
    ) -> Result<ApiEnvelope<PageResult>, ClientError>;

    async fn delete_config(&self, id: ConfigId) -> Result<ApiEnvelope<Value>, ClientError>;

    async fn get_config(&self, id: ConfigId) -> Result<ApiEnvelope<ConfigRecord>, ClientError>;

    /// Creates a config; the envelope carries the stored record.
    async fn add_config(&self, draft: &ConfigDraft) -> Result<ApiEnvelope<ConfigRecord>, ClientError>;

    /// Overwrites every editable field of config `id` with `draft`.
    async fn edit_config(
        &self,
        id: ConfigId,
        draft: &ConfigDraft,
    ) -> Result<ApiEnvelope<ConfigRecord>, ClientError>;

    /// Sends a file through config `id` to its upstream endpoint.
    async fn upload_file(
        &self,
        id: ConfigId,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<ApiEnvelope<UploadResult>, ClientError>;
}

#[derive(Debug, Clone)]
pub struct ConfigApiClient {
    http: Client,
    server_url: String,
}

impl ConfigApiClient {
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        Self::with_http(Client::new(), server_url)
    }

    pub fn with_http(http: Client, server_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http,
            server_url: normalize_server_url(server_url)?,
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    async fn decode<T: DeserializeOwned>(
        endpoint: &'static str,
        response: reqwest::Response,
    ) -> Result<ApiEnvelope<T>, ClientError> {
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| ClientError::Transport { endpoint, source })?;
        let envelope: ApiEnvelope<T> =
            serde_json::from_slice(&body).map_err(|source| ClientError::Decode {
                endpoint,
                status,
                source,
            })?;
        debug!(
            endpoint,
            http_status = status.as_u16(),
            code = envelope.code,
            "admin api response"
        );
        Ok(envelope)
    }
}

#[async_trait]
impl ConfigApi for ConfigApiClient {
    async fn list_configs(
        &self,
        request: &ListRequest,
    ) -> Result<ApiEnvelope<PageResult>, ClientError> {
        let server_url = &self.server_url;
        let response = self
            .http
            .get(format!("{server_url}{LIST_PATH}"))
            .query(request)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: LIST_PATH,
                source,
            })?;
        Self::decode(LIST_PATH, response).await
    }

    async fn delete_config(&self, id: ConfigId) -> Result<ApiEnvelope<Value>, ClientError> {
        let server_url = &self.server_url;
        info!(config_id = id.0, "deleting config");
        let response = self
            .http
            .post(format!("{server_url}{DELETE_PATH}"))
            .form(&DeleteRequest { id })
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: DELETE_PATH,
                source,
            })?;
        Self::decode(DELETE_PATH, response).await
    }

    async fn get_config(&self, id: ConfigId) -> Result<ApiEnvelope<ConfigRecord>, ClientError> {
        let server_url = &self.server_url;
        let response = self
            .http
            .get(format!("{server_url}{GET_PATH}"))
            .query(&GetRequest { id })
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: GET_PATH,
                source,
            })?;
        Self::decode(GET_PATH, response).await
    }

    async fn add_config(
        &self,
        draft: &ConfigDraft,
    ) -> Result<ApiEnvelope<ConfigRecord>, ClientError> {
        let server_url = &self.server_url;
        info!(name = %draft.name, "adding config");
        let response = self
            .http
            .post(format!("{server_url}{ADD_PATH}"))
            .json(draft)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: ADD_PATH,
                source,
            })?;
        Self::decode(ADD_PATH, response).await
    }

    async fn edit_config(
        &self,
        id: ConfigId,
        draft: &ConfigDraft,
    ) -> Result<ApiEnvelope<ConfigRecord>, ClientError> {
        let server_url = &self.server_url;
        info!(config_id = id.0, "editing config");
        let response = self
            .http
            .post(format!("{server_url}{EDIT_PATH}"))
            .json(&EditRequest {
                id,
                draft: draft.clone(),
            })
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: EDIT_PATH,
                source,
            })?;
        Self::decode(EDIT_PATH, response).await
    }

    async fn upload_file(
        &self,
        id: ConfigId,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<ApiEnvelope<UploadResult>, ClientError> {
        let server_url = &self.server_url;
        info!(config_id = id.0, file_name, bytes = contents.len(), "uploading file");
        let form = Form::new()
            .text("configId", id.to_string())
            .part("file", Part::bytes(contents).file_name(file_name.to_string()));
        let response = self
            .http
            .post(format!("{server_url}{UPLOAD_PATH}"))
            .multipart(form)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: UPLOAD_PATH,
                source,
            })?;
        Self::decode(UPLOAD_PATH, response).await
    }
}

fn normalize_server_url(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed).map_err(|source| ClientError::InvalidUrl {
        url: trimmed.to_string(),
        source,
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ClientError::UnsupportedScheme(parsed.scheme().to_string()));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
