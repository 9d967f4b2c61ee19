use super::{unsupported, Resource};
use crate::core::transport::{identifier_from_params, records_from_data};
use crate::domain::model::{ApiRequest, Parameters, Record};
use crate::domain::ports::ApiTransport;
use crate::utils::error::Result;
use serde_json::Value;

pub const OPERATIONS: &[&str] = &["get"];

pub async fn execute(
    transport: &dyn ApiTransport,
    operation: &str,
    params: &Parameters,
) -> Result<Vec<Record>> {
    match operation {
        "get" => get_checkpoints(transport, params).await,
        other => Err(unsupported(Resource::Checkpoint, other)),
    }
}

/// One record per checkpoint of the tracking, oldest first as AfterShip returns them.
pub async fn get_checkpoints(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let identifier = identifier_from_params(params)?;
    let response = transport
        .request(ApiRequest::get(format!("/trackings{}", identifier)))
        .await?;

    let mut tracking = match response.data {
        Value::Object(mut data) => match data.remove("tracking") {
            Some(Value::Object(tracking)) => tracking,
            _ => data,
        },
        _ => return Ok(Vec::new()),
    };

    match tracking.remove("checkpoints") {
        Some(checkpoints @ Value::Array(_)) => Ok(records_from_data(checkpoints)),
        _ => Ok(Vec::new()),
    }
}
