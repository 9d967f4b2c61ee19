use super::{send, unsupported, Resource};
use crate::core::transport::identifier_from_params;
use crate::domain::model::{ApiRequest, JsonObject, Parameters, Record};
use crate::domain::ports::ApiTransport;
use crate::utils::error::Result;
use serde_json::{json, Value};

pub const OPERATIONS: &[&str] = &["getSettings", "addReceiver", "removeReceiver"];

pub async fn execute(
    transport: &dyn ApiTransport,
    operation: &str,
    params: &Parameters,
) -> Result<Vec<Record>> {
    match operation {
        "getSettings" => get_settings(transport, params).await,
        "addReceiver" => change_receiver(transport, params, "add").await,
        "removeReceiver" => change_receiver(transport, params, "remove").await,
        other => Err(unsupported(Resource::Notification, other)),
    }
}

pub async fn get_settings(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let identifier = identifier_from_params(params)?;
    send(
        transport,
        ApiRequest::get(format!("/notifications{}", identifier)),
    )
    .await
}

/// `action` is `add` or `remove`.
async fn change_receiver(
    transport: &dyn ApiTransport,
    params: &Parameters,
    action: &str,
) -> Result<Vec<Record>> {
    let identifier = identifier_from_params(params)?;
    let receiver = params.required_str("receiver")?;

    let channel = match params.str("receiverType").as_deref() {
        Some("email") => "emails",
        _ => "smses",
    };

    let mut notification = JsonObject::new();
    notification.insert(channel.to_string(), json!([receiver]));

    let mut body = JsonObject::new();
    body.insert("notification".to_string(), Value::Object(notification));

    let request =
        ApiRequest::post(format!("/notifications{}/{}", identifier, action)).with_body(body);
    send(transport, request).await
}
