use super::{copy_set, filters_to_query, list, send, unsupported, Resource};
use crate::core::constants::{PAPER_SIZES, RETURN_STATUSES};
use crate::core::format::is_truthy;
use crate::domain::model::{ApiKind, ApiRequest, JsonObject, Parameters, Record};
use crate::domain::ports::ApiTransport;
use crate::utils::error::{AfterShipError, Result};
use crate::utils::validation::validate_option;
use serde_json::Value;

pub const OPERATIONS: &[&str] = &[
    "list",
    "get",
    "create",
    "update",
    "getLabels",
    "createLabel",
];

const LIST_FILTERS: &[(&str, &str)] = &[
    ("status", "status"),
    ("orderId", "order_id"),
    ("createdAtMin", "created_at_min"),
    ("createdAtMax", "created_at_max"),
];

pub async fn execute(
    transport: &dyn ApiTransport,
    operation: &str,
    params: &Parameters,
) -> Result<Vec<Record>> {
    match operation {
        "list" => list_returns(transport, params).await,
        "get" => get_return(transport, params).await,
        "create" => create_return(transport, params).await,
        "update" => update_return(transport, params).await,
        "getLabels" => get_return_labels(transport, params).await,
        "createLabel" => create_return_label(transport, params).await,
        other => Err(unsupported(Resource::Return, other)),
    }
}

fn return_path(params: &Parameters) -> Result<String> {
    Ok(format!("/returns/{}", params.required_str("returnId")?))
}

fn check_status(fields: &JsonObject, name: &str) -> Result<()> {
    match fields.get("status").and_then(Value::as_str) {
        Some(status) if !status.is_empty() => validate_option(name, status, RETURN_STATUSES),
        _ => Ok(()),
    }
}

pub async fn list_returns(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let filters = params.object("filters");
    check_status(&filters, "filters.status")?;

    let request = ApiRequest::get("/returns")
        .with_query(filters_to_query(&filters, LIST_FILTERS))
        .on(ApiKind::Returns);
    list(transport, params, request, "returns", true).await
}

pub async fn get_return(transport: &dyn ApiTransport, params: &Parameters) -> Result<Vec<Record>> {
    let request = ApiRequest::get(return_path(params)?).on(ApiKind::Returns);
    send(transport, request).await
}

/// Line items accept either `id` or `itemId`.
fn return_item(item: &Value) -> Value {
    let field = |key: &str| item.get(key).cloned().unwrap_or(Value::Null);
    let id = item
        .get("id")
        .filter(|v| is_truthy(v))
        .or_else(|| item.get("itemId"))
        .cloned()
        .unwrap_or(Value::Null);

    let mut line = JsonObject::new();
    for (key, value) in [
        ("id", id),
        ("title", field("title")),
        ("sku", field("sku")),
        ("quantity", field("quantity")),
        ("reason", field("reason")),
    ] {
        if !value.is_null() {
            line.insert(key.to_string(), value);
        }
    }
    Value::Object(line)
}

pub async fn create_return(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let order_id = params.required_str("orderId")?;
    let items = match params.get("items") {
        None => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(return_item).collect(),
        Some(_) => {
            return Err(AfterShipError::InvalidParameter {
                name: "items".to_string(),
                reason: "expected a list of return items".to_string(),
            })
        }
    };

    let mut record = JsonObject::new();
    record.insert("order_id".to_string(), order_id.into());
    record.insert("items".to_string(), Value::Array(items));

    let additional = params.object("additionalFields");
    copy_set(&mut record, &additional, "reason", "reason");
    copy_set(&mut record, &additional, "notes", "notes");
    copy_set(&mut record, &additional, "orderNumber", "order_number");

    let mut body = JsonObject::new();
    body.insert("return".to_string(), Value::Object(record));

    let request = ApiRequest::post("/returns")
        .with_body(body)
        .on(ApiKind::Returns);
    send(transport, request).await
}

pub async fn update_return(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let path = return_path(params)?;
    let fields = params.object("updateFields");
    check_status(&fields, "status")?;

    let mut record = JsonObject::new();
    copy_set(&mut record, &fields, "status", "status");
    copy_set(&mut record, &fields, "reason", "reason");
    copy_set(&mut record, &fields, "notes", "notes");
    copy_set(&mut record, &fields, "refundAmount", "refund_amount");
    copy_set(&mut record, &fields, "refundCurrency", "refund_currency");

    let mut body = JsonObject::new();
    body.insert("return".to_string(), Value::Object(record));

    let request = ApiRequest::patch(path).with_body(body).on(ApiKind::Returns);
    send(transport, request).await
}

pub async fn get_return_labels(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let request = ApiRequest::get(format!("{}/labels", return_path(params)?)).on(ApiKind::Returns);
    send(transport, request).await
}

pub async fn create_return_label(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let path = return_path(params)?;
    let carrier = params.required_str("carrier")?;
    let additional = params.object("additionalFields");

    let mut label = JsonObject::new();
    label.insert("carrier".to_string(), carrier.into());
    copy_set(&mut label, &additional, "serviceType", "service_type");
    if let Some(paper_size) = additional
        .get("paperSize")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
    {
        validate_option("paperSize", paper_size, PAPER_SIZES)?;
        label.insert("paper_size".to_string(), paper_size.into());
    }

    let mut body = JsonObject::new();
    body.insert("label".to_string(), Value::Object(label));

    let request = ApiRequest::post(format!("{}/labels", path))
        .with_body(body)
        .on(ApiKind::Returns);
    send(transport, request).await
}
