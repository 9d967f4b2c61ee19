use super::{copy_set, send, unsupported, Resource};
use crate::core::format::is_truthy;
use crate::domain::model::{ApiRequest, JsonObject, Parameters, Record};
use crate::domain::ports::ApiTransport;
use crate::utils::error::{AfterShipError, Result};
use serde_json::Value;

pub const OPERATIONS: &[&str] = &["create", "get", "download"];

const EXPORT_FIELDS: &[(&str, &str)] = &[
    ("format", "format"),
    ("createdAtMin", "created_at_min"),
    ("createdAtMax", "created_at_max"),
    ("slug", "slug"),
    ("tag", "tag"),
    ("fields", "fields"),
];

pub async fn execute(
    transport: &dyn ApiTransport,
    operation: &str,
    params: &Parameters,
) -> Result<Vec<Record>> {
    match operation {
        "create" => create_export(transport, params).await,
        "get" => get_export(transport, params).await,
        "download" => download_export(transport, params).await,
        other => Err(unsupported(Resource::Export, other)),
    }
}

fn export_request(params: &Parameters) -> Result<ApiRequest> {
    Ok(ApiRequest::get(format!(
        "/exports/{}",
        params.required_str("exportId")?
    )))
}

pub async fn create_export(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let additional = params.object("additionalFields");

    let mut export = JsonObject::new();
    export.insert("type".to_string(), params.required_str("exportType")?.into());
    for (from, to) in EXPORT_FIELDS {
        copy_set(&mut export, &additional, from, to);
    }

    let mut body = JsonObject::new();
    body.insert("export".to_string(), Value::Object(export));

    send(transport, ApiRequest::post("/exports").with_body(body)).await
}

pub async fn get_export(transport: &dyn ApiTransport, params: &Parameters) -> Result<Vec<Record>> {
    send(transport, export_request(params)?).await
}

/// Resolves the file URL of a finished export.
pub async fn download_export(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let response = transport.request(export_request(params)?).await?;
    let mut export = match response.data {
        Value::Object(export) => export,
        _ => JsonObject::new(),
    };

    let status = export.get("status").cloned().unwrap_or(Value::Null);
    if status.as_str() != Some("completed") {
        return Err(AfterShipError::ExportNotReady {
            status: match status {
                Value::String(s) => s,
                Value::Null => "undefined".to_string(),
                other => other.to_string(),
            },
        });
    }

    let file_url = export
        .get("file_url")
        .filter(|v| is_truthy(v))
        .cloned()
        .ok_or_else(|| AfterShipError::NotFound {
            message: "Export file URL is not available".to_string(),
        })?;

    export.insert(
        "message".to_string(),
        Value::String("Export is ready for download".to_string()),
    );
    export.insert("download_url".to_string(), file_url);

    tracing::info!("📦 Export ready for download");
    Ok(vec![Record::new(export)])
}
