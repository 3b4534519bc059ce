use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    domain::{ConfigId, ConfigRecord, HttpMethod},
    error::{ApiError, ErrorCode},
};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Columns the listing endpoint accepts as a sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for SortField {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "id" => Ok(SortField::Id),
            "name" => Ok(SortField::Name),
            "created_at" => Ok(SortField::CreatedAt),
            "updated_at" => Ok(SortField::UpdatedAt),
            other => Err(UnknownVariant {
                kind: "sort field",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(UnknownVariant {
                kind: "sort order",
                value: s.to_string(),
            }),
        }
    }
}

/// Query string of `GET /api/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    pub page: u32,
    pub page_size: u32,
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub method: String,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
}

/// `data` payload of a successful listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    #[serde(rename = "data", default, deserialize_with = "null_as_empty")]
    pub items: Vec<ConfigRecord>,
    pub total: u64,
    pub total_pages: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// Form body of `POST /api/delete`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub id: ConfigId,
}

/// Query string of `GET /api/get`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GetRequest {
    pub id: ConfigId,
}

/// Editable fields of a config: the JSON body of `POST /api/add`.
///
/// The server stores absent text fields as empty strings, so an edit must send
/// every field it wants to keep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDraft {
    pub name: String,
    pub url: String,
    pub method: HttpMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_rule: Option<String>,
}

impl ConfigDraft {
    pub fn new(name: impl Into<String>, url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            method,
            parameters: None,
            request_body: None,
            headers: None,
            response_rule: None,
        }
    }
}

impl From<&ConfigRecord> for ConfigDraft {
    fn from(record: &ConfigRecord) -> Self {
        Self {
            name: record.name.clone(),
            url: record.url.clone(),
            method: record.method.clone(),
            parameters: record.parameters.clone(),
            request_body: record.request_body.clone(),
            headers: record.headers.clone(),
            response_rule: record.response_rule.clone(),
        }
    }
}

/// JSON body of `POST /api/edit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRequest {
    pub id: ConfigId,
    #[serde(flatten)]
    pub draft: ConfigDraft,
}

/// `data` payload of `POST /api/upload`: where the upstream stored the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub url: String,
}

/// Envelope every `/api/*` endpoint answers with. `code == 0` is success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: 0,
            message: "success".into(),
            data: Some(data),
        }
    }

    pub fn failure(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Splits the envelope into its payload or the server's error.
    ///
    /// A success code without a payload is reported as an internal error.
    pub fn into_result(self) -> Result<T, ApiError> {
        if !self.is_success() {
            return Err(ApiError::from_status(self.code, self.message));
        }
        self.data
            .ok_or_else(|| ApiError::new(ErrorCode::Internal, "success response without data"))
    }
}

// The server's item slice serializes as `null` when a page is empty.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
