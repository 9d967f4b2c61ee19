use super::{
    copy_set, filters_to_query, json_object_param, json_value_param, list, send, unsupported,
    Resource,
};
use crate::core::format::format_address_data;
use crate::domain::model::{ApiRequest, JsonObject, Parameters, Record};
use crate::domain::ports::ApiTransport;
use crate::utils::error::{AfterShipError, Result};
use serde_json::Value;

pub const OPERATIONS: &[&str] = &["list", "get", "create", "update", "delete"];

const LIST_FILTERS: &[(&str, &str)] = &[
    ("status", "status"),
    ("platform", "platform"),
    ("keyword", "keyword"),
    ("createdAtMin", "created_at_min"),
    ("createdAtMax", "created_at_max"),
];

pub async fn execute(
    transport: &dyn ApiTransport,
    operation: &str,
    params: &Parameters,
) -> Result<Vec<Record>> {
    match operation {
        "list" => list_orders(transport, params).await,
        "get" => get_order(transport, params).await,
        "create" => create_order(transport, params).await,
        "update" => update_order(transport, params).await,
        "delete" => delete_order(transport, params).await,
        other => Err(unsupported(Resource::Order, other)),
    }
}

fn order_path(params: &Parameters) -> Result<String> {
    Ok(format!("/orders/{}", params.required_str("orderId")?))
}

/// Optional order fields shared by create and update. Items and addresses may
/// arrive as JSON text.
fn order_fields(order: &mut JsonObject, fields: &JsonObject) -> Result<()> {
    copy_set(order, fields, "orderNumber", "order_number");
    copy_set(order, fields, "platform", "platform");
    copy_set(order, fields, "status", "status");

    match json_value_param(fields.get("items"), "items")? {
        Some(items @ Value::Array(_)) => {
            order.insert("items".to_string(), items);
        }
        Some(_) => {
            return Err(AfterShipError::InvalidParameter {
                name: "items".to_string(),
                reason: "Invalid JSON format for items".to_string(),
            })
        }
        None => {}
    }
    for (from, to) in [
        ("shippingAddress", "shipping_address"),
        ("billingAddress", "billing_address"),
    ] {
        if let Some(address) = json_object_param(fields.get(from), from)? {
            order.insert(
                to.to_string(),
                Value::Object(format_address_data(&address, "")),
            );
        }
    }
    Ok(())
}

pub async fn list_orders(transport: &dyn ApiTransport, params: &Parameters) -> Result<Vec<Record>> {
    let filters = params.object("filters");
    let request = ApiRequest::get("/orders").with_query(filters_to_query(&filters, LIST_FILTERS));
    list(transport, params, request, "orders", true).await
}

pub async fn get_order(transport: &dyn ApiTransport, params: &Parameters) -> Result<Vec<Record>> {
    send(transport, ApiRequest::get(order_path(params)?)).await
}

pub async fn create_order(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let mut order = JsonObject::new();
    order.insert("order_id".to_string(), params.required_str("orderId")?.into());
    order_fields(&mut order, &params.object("additionalFields"))?;

    let mut body = JsonObject::new();
    body.insert("order".to_string(), Value::Object(order));

    send(transport, ApiRequest::post("/orders").with_body(body)).await
}

pub async fn update_order(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let path = order_path(params)?;

    let mut order = JsonObject::new();
    order_fields(&mut order, &params.object("updateFields"))?;

    let mut body = JsonObject::new();
    body.insert("order".to_string(), Value::Object(order));

    send(transport, ApiRequest::put(path).with_body(body)).await
}

pub async fn delete_order(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    send(transport, ApiRequest::delete(order_path(params)?)).await
}
