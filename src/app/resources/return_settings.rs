use super::{collection, copy_present, copy_set, send, unsupported, Resource};
use crate::domain::model::{ApiKind, ApiRequest, JsonObject, Parameters, Record};
use crate::domain::ports::ApiTransport;
use crate::utils::error::Result;
use serde_json::Value;

pub const OPERATIONS: &[&str] = &["getSettings", "updateSettings", "listReasons", "createReason"];

pub async fn execute(
    transport: &dyn ApiTransport,
    operation: &str,
    params: &Parameters,
) -> Result<Vec<Record>> {
    match operation {
        "getSettings" => get_settings(transport).await,
        "updateSettings" => update_settings(transport, params).await,
        "listReasons" => list_reasons(transport).await,
        "createReason" => create_reason(transport, params).await,
        other => Err(unsupported(Resource::ReturnSettings, other)),
    }
}

pub async fn get_settings(transport: &dyn ApiTransport) -> Result<Vec<Record>> {
    send(transport, ApiRequest::get("/settings").on(ApiKind::Returns)).await
}

pub async fn update_settings(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let fields = params.object("updateFields");

    let mut settings = JsonObject::new();
    copy_set(&mut settings, &fields, "returnWindow", "return_window");
    copy_present(&mut settings, &fields, "autoApprove", "auto_approve");
    copy_present(&mut settings, &fields, "requirePhotos", "require_photos");
    copy_present(&mut settings, &fields, "requireReason", "require_reason");
    copy_set(&mut settings, &fields, "notificationEmail", "notification_email");

    let mut body = JsonObject::new();
    body.insert("settings".to_string(), Value::Object(settings));

    let request = ApiRequest::patch("/settings")
        .with_body(body)
        .on(ApiKind::Returns);
    send(transport, request).await
}

pub async fn list_reasons(transport: &dyn ApiTransport) -> Result<Vec<Record>> {
    let response = transport
        .request(ApiRequest::get("/reasons").on(ApiKind::Returns))
        .await?;
    Ok(collection(response.data, "reasons", true))
}

pub async fn create_reason(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let additional = params.object("additionalFields");

    let mut reason = JsonObject::new();
    reason.insert("title".to_string(), params.required_str("title")?.into());
    copy_set(&mut reason, &additional, "description", "description");
    copy_present(&mut reason, &additional, "requirePhoto", "require_photo");
    copy_present(&mut reason, &additional, "requireNote", "require_note");
    copy_present(&mut reason, &additional, "active", "active");

    let mut body = JsonObject::new();
    body.insert("reason".to_string(), Value::Object(reason));

    let request = ApiRequest::post("/reasons")
        .with_body(body)
        .on(ApiKind::Returns);
    send(transport, request).await
}
