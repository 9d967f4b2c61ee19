//! AfterShip operation catalogue: one module per resource, each mapping
//! operation names onto API requests and reshaping the responses into records.

pub mod carriers;
pub mod checkpoints;
pub mod couriers;
pub mod estimated_delivery;
pub mod exports;
pub mod labels;
pub mod notifications;
pub mod orders;
pub mod return_settings;
pub mod returns;
pub mod shipments;
pub mod trackings;

use crate::core::constants::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT, MIN_LIST_LIMIT};
use crate::core::format::is_truthy;
use crate::core::transport::{records_from_data, request_all_items};
use crate::domain::model::{ApiRequest, JsonObject, Parameters, Record};
use crate::domain::ports::ApiTransport;
use crate::utils::error::{AfterShipError, Result};
use crate::utils::validation::validate_range;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Tracking,
    Courier,
    EstimatedDelivery,
    Notification,
    Label,
    Shipment,
    Carrier,
    Return,
    ReturnSettings,
    Order,
    Export,
    Checkpoint,
}

impl Resource {
    pub const ALL: [Resource; 12] = [
        Resource::Tracking,
        Resource::Courier,
        Resource::EstimatedDelivery,
        Resource::Notification,
        Resource::Label,
        Resource::Shipment,
        Resource::Carrier,
        Resource::Return,
        Resource::ReturnSettings,
        Resource::Order,
        Resource::Export,
        Resource::Checkpoint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Tracking => "trackings",
            Resource::Courier => "couriers",
            Resource::EstimatedDelivery => "estimatedDelivery",
            Resource::Notification => "notifications",
            Resource::Label => "labels",
            Resource::Shipment => "shipments",
            Resource::Carrier => "carriers",
            Resource::Return => "returns",
            Resource::ReturnSettings => "returnSettings",
            Resource::Order => "orders",
            Resource::Export => "exports",
            Resource::Checkpoint => "checkpoints",
        }
    }

    pub fn operations(&self) -> &'static [&'static str] {
        match self {
            Resource::Tracking => trackings::OPERATIONS,
            Resource::Courier => couriers::OPERATIONS,
            Resource::EstimatedDelivery => estimated_delivery::OPERATIONS,
            Resource::Notification => notifications::OPERATIONS,
            Resource::Label => labels::OPERATIONS,
            Resource::Shipment => shipments::OPERATIONS,
            Resource::Carrier => carriers::OPERATIONS,
            Resource::Return => returns::OPERATIONS,
            Resource::ReturnSettings => return_settings::OPERATIONS,
            Resource::Order => orders::OPERATIONS,
            Resource::Export => exports::OPERATIONS,
            Resource::Checkpoint => checkpoints::OPERATIONS,
        }
    }

    pub fn supports(&self, operation: &str) -> bool {
        self.operations().contains(&operation)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = AfterShipError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        Resource::ALL
            .iter()
            .find(|resource| resource.as_str().eq_ignore_ascii_case(name))
            .copied()
            .ok_or_else(|| AfterShipError::UnsupportedOperation {
                resource: name.to_string(),
                operation: "*".to_string(),
            })
    }
}

/// Runs one operation for one parameter item.
pub async fn execute(
    transport: &dyn ApiTransport,
    resource: Resource,
    operation: &str,
    params: &Parameters,
) -> Result<Vec<Record>> {
    tracing::debug!("🔧 {}.{}", resource, operation);

    match resource {
        Resource::Tracking => trackings::execute(transport, operation, params).await,
        Resource::Courier => couriers::execute(transport, operation, params).await,
        Resource::EstimatedDelivery => {
            estimated_delivery::execute(transport, operation, params).await
        }
        Resource::Notification => notifications::execute(transport, operation, params).await,
        Resource::Label => labels::execute(transport, operation, params).await,
        Resource::Shipment => shipments::execute(transport, operation, params).await,
        Resource::Carrier => carriers::execute(transport, operation, params).await,
        Resource::Return => returns::execute(transport, operation, params).await,
        Resource::ReturnSettings => return_settings::execute(transport, operation, params).await,
        Resource::Order => orders::execute(transport, operation, params).await,
        Resource::Export => exports::execute(transport, operation, params).await,
        Resource::Checkpoint => checkpoints::execute(transport, operation, params).await,
    }
}

pub(crate) fn unsupported(resource: Resource, operation: &str) -> AfterShipError {
    AfterShipError::UnsupportedOperation {
        resource: resource.to_string(),
        operation: operation.to_string(),
    }
}

/// Sends the request and turns `data` into records as-is.
pub(crate) async fn send(transport: &dyn ApiTransport, request: ApiRequest) -> Result<Vec<Record>> {
    let response = transport.request(request).await?;
    Ok(records_from_data(response.data))
}

/// Shared body of every "list" operation: `returnAll` paginates, otherwise one
/// page of `limit` items is read from `data.<key>`.
pub(crate) async fn list(
    transport: &dyn ApiTransport,
    params: &Parameters,
    mut request: ApiRequest,
    key: &str,
    fallback_to_data: bool,
) -> Result<Vec<Record>> {
    if params.bool("returnAll").unwrap_or(false) {
        return request_all_items(transport, request).await;
    }

    let limit = params.u64("limit")?.unwrap_or(DEFAULT_LIST_LIMIT);
    validate_range("limit", limit, MIN_LIST_LIMIT, MAX_LIST_LIMIT)?;
    request.query.insert("limit".to_string(), limit.into());

    let response = transport.request(request).await?;
    Ok(collection(response.data, key, fallback_to_data))
}

/// `data.<key>` when it is an array, else `[data]` or nothing.
pub(crate) fn collection(data: Value, key: &str, fallback_to_data: bool) -> Vec<Record> {
    match data {
        Value::Object(mut object) => match object.remove(key) {
            Some(items @ Value::Array(_)) => records_from_data(items),
            Some(other) if fallback_to_data => {
                object.insert(key.to_string(), other);
                vec![Record::new(object)]
            }
            None if fallback_to_data => vec![Record::new(object)],
            _ => Vec::new(),
        },
        Value::Null => Vec::new(),
        other if fallback_to_data => records_from_data(other),
        _ => Vec::new(),
    }
}

/// Copies `source[from]` into `target[to]` when it is set (not null, false, 0 or "").
pub(crate) fn copy_set(target: &mut JsonObject, source: &JsonObject, from: &str, to: &str) {
    if let Some(value) = source.get(from).filter(|v| is_truthy(v)) {
        target.insert(to.to_string(), value.clone());
    }
}

/// Copies `source[from]` into `target[to]` whenever it is present, including `false`.
pub(crate) fn copy_present(target: &mut JsonObject, source: &JsonObject, from: &str, to: &str) {
    if let Some(value) = source.get(from).filter(|v| !v.is_null()) {
        target.insert(to.to_string(), value.clone());
    }
}

/// Builds a query from a filter collection, renaming keys on the way.
pub(crate) fn filters_to_query(filters: &JsonObject, mapping: &[(&str, &str)]) -> JsonObject {
    let mut query = JsonObject::new();
    for (from, to) in mapping {
        copy_set(&mut query, filters, from, to);
    }
    query
}

/// A parameter holding a list of objects, given either as a JSON array or as JSON text.
pub(crate) fn json_array_param(params: &Parameters, name: &str) -> Result<Vec<JsonObject>> {
    let invalid = || invalid_json(name);

    let value = match params.get(name) {
        Some(Value::String(text)) => serde_json::from_str(text).map_err(|_| invalid())?,
        Some(value) => value.clone(),
        None => {
            return Err(AfterShipError::MissingParameter {
                name: name.to_string(),
            })
        }
    };

    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(object) => Ok(object),
                _ => Err(invalid()),
            })
            .collect(),
        _ => Err(invalid()),
    }
}

/// JSON-typed field given inline or as JSON text. Null and blank text are absent.
pub(crate) fn json_value_param(value: Option<&Value>, name: &str) -> Result<Option<Value>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => serde_json::from_str(text)
            .map(Some)
            .map_err(|_| invalid_json(name)),
        Some(value) => Ok(Some(value.clone())),
    }
}

/// Like [`json_value_param`], but the value must be a JSON object.
pub(crate) fn json_object_param(value: Option<&Value>, name: &str) -> Result<Option<JsonObject>> {
    match json_value_param(value, name)? {
        None => Ok(None),
        Some(Value::Object(object)) => Ok(Some(object)),
        Some(_) => Err(invalid_json(name)),
    }
}

fn invalid_json(name: &str) -> AfterShipError {
    AfterShipError::InvalidParameter {
        name: name.to_string(),
        reason: format!("Invalid JSON format for {}", name),
    }
}

/// Comma-separated ids, trimmed. Arrays are accepted as well.
pub(crate) fn id_list(params: &Parameters, name: &str) -> Result<Vec<String>> {
    match params.get(name) {
        Some(Value::Array(items)) => Ok(items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect()),
        _ => Ok(params
            .required_str(name)?
            .split(',')
            .map(|id| id.trim().to_string())
            .collect()),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::domain::model::ApiResponse;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// Records every request and answers with queued `data` values (null once drained).
    #[derive(Clone, Default)]
    pub struct MockTransport {
        requests: Arc<Mutex<Vec<ApiRequest>>>,
        responses: Arc<Mutex<VecDeque<Value>>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond_with(data: Value) -> Self {
            Self::responding(vec![data])
        }

        pub fn responding(data: Vec<Value>) -> Self {
            Self {
                requests: Arc::default(),
                responses: Arc::new(Mutex::new(data.into())),
            }
        }

        pub async fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().await.clone()
        }

        pub async fn last_request(&self) -> ApiRequest {
            self.requests
                .lock()
                .await
                .last()
                .cloned()
                .expect("no request was sent")
        }
    }

    #[async_trait]
    impl ApiTransport for MockTransport {
        async fn request(&self, request: ApiRequest) -> Result<ApiResponse> {
            self.requests.lock().await.push(request);
            let data = self.responses.lock().await.pop_front().unwrap_or(Value::Null);
            Ok(ApiResponse {
                data,
                ..Default::default()
            })
        }
    }

    pub fn params(value: Value) -> Parameters {
        Parameters::from_value(value).unwrap()
    }
}
