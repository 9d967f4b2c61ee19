use crate::utils::error::{AfterShipError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type JsonObject = Map<String, Value>;

/// One output item produced by an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: JsonObject,
}

impl Record {
    pub fn new(data: JsonObject) -> Self {
        Self { data }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

impl From<JsonObject> for Record {
    fn from(data: JsonObject) -> Self {
        Self { data }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKind {
    Tracking,
    Shipping,
    Returns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A request against one of the AfterShip API surfaces, before credentials are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub endpoint: String,
    pub body: JsonObject,
    pub query: JsonObject,
    pub api: ApiKind,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            body: JsonObject::new(),
            query: JsonObject::new(),
            api: ApiKind::Tracking,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, endpoint)
    }

    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, endpoint)
    }

    pub fn patch(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, endpoint)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, endpoint)
    }

    pub fn with_body(mut self, body: JsonObject) -> Self {
        self.body = body;
        self
    }

    pub fn with_query(mut self, query: JsonObject) -> Self {
        self.query = query;
        self
    }

    pub fn on(mut self, api: ApiKind) -> Self {
        self.api = api;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub meta: ResponseMeta,
    #[serde(default)]
    pub data: Value,
}

/// User-supplied node parameters for a single item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters {
    values: JsonObject,
}

impl Parameters {
    pub fn new(values: JsonObject) -> Self {
        Self { values }
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            Value::Null => Ok(Self::default()),
            other => Err(AfterShipError::InvalidParameter {
                name: "parameters".to_string(),
                reason: format!("expected a JSON object, got {}", other),
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|v| !v.is_null())
    }

    /// Non-empty string value; numbers are rendered as strings.
    pub fn str(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn required_str(&self, name: &str) -> Result<String> {
        self.str(name).ok_or_else(|| AfterShipError::MissingParameter {
            name: name.to_string(),
        })
    }

    pub fn str_or(&self, name: &str, default: &str) -> String {
        self.str(name).unwrap_or_else(|| default.to_string())
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn u64(&self, name: &str) -> Result<Option<u64>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Number(n)) => n.as_u64().map(Some).ok_or_else(|| {
                AfterShipError::InvalidParameter {
                    name: name.to_string(),
                    reason: format!("expected a positive integer, got {}", n),
                }
            }),
            Some(Value::String(s)) => {
                s.trim()
                    .parse()
                    .map(Some)
                    .map_err(|_| AfterShipError::InvalidParameter {
                        name: name.to_string(),
                        reason: format!("expected a positive integer, got '{}'", s),
                    })
            }
            Some(other) => Err(AfterShipError::InvalidParameter {
                name: name.to_string(),
                reason: format!("expected a positive integer, got {}", other),
            }),
        }
    }

    /// A collection parameter (filters, additionalFields, ...). Missing means empty.
    pub fn object(&self, name: &str) -> JsonObject {
        self.get(name)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    }

    pub fn as_object(&self) -> &JsonObject {
        &self.values
    }
}

impl From<JsonObject> for Parameters {
    fn from(values: JsonObject) -> Self {
        Self { values }
    }
}
