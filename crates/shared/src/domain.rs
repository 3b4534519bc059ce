use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map($name)
            }
        }
    };
}

id_newtype!(ConfigId);

/// HTTP method of a configured endpoint.
///
/// Unrecognised methods are kept verbatim in [`HttpMethod::Other`] so that a
/// record written by a newer server still renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Other(String),
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Other(raw) => raw.as_str(),
        }
    }

    /// Lowercased form, used as the badge CSS class.
    pub fn css_class(&self) -> String {
        self.as_str().to_ascii_lowercase()
    }
}

impl From<&str> for HttpMethod {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "PATCH" => HttpMethod::Patch,
            "DELETE" => HttpMethod::Delete,
            "HEAD" => HttpMethod::Head,
            "OPTIONS" => HttpMethod::Options,
            _ => HttpMethod::Other(value.to_string()),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for HttpMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HttpMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(HttpMethod::from(raw.as_str()))
    }
}

/// A server-managed endpoint configuration.
///
/// The listing server is backed by an ORM that emits capitalized keys
/// (`ID`, `Name`, `URL`), while newer builds emit camelCase; both decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRecord {
    #[serde(alias = "ID", alias = "Id")]
    pub id: ConfigId,
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(alias = "URL", alias = "Url")]
    pub url: String,
    #[serde(alias = "Method")]
    pub method: HttpMethod,
    #[serde(default, alias = "Parameters", skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,
    #[serde(default, alias = "RequestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<String>,
    #[serde(default, alias = "Headers", skip_serializing_if = "Option::is_none")]
    pub headers: Option<String>,
    #[serde(default, alias = "ResponseRule", skip_serializing_if = "Option::is_none")]
    pub response_rule: Option<String>,
    #[serde(default, alias = "CreatedAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "UpdatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ConfigRecord {
    pub fn new(
        id: ConfigId,
        name: impl Into<String>,
        url: impl Into<String>,
        method: HttpMethod,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            url: url.into(),
            method,
            parameters: None,
            request_body: None,
            headers: None,
            response_rule: None,
            created_at: None,
            updated_at: None,
        }
    }
}
