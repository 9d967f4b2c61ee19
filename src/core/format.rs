//! Allow-listing helpers that turn loose parameter objects into AfterShip request bodies.

use crate::domain::model::JsonObject;
use serde_json::{json, Value};

const TRACKING_FIELDS: &[&str] = &[
    "tracking_number",
    "slug",
    "title",
    "emails",
    "smses",
    "customer_name",
    "order_id",
    "order_id_path",
    "order_date",
    "origin_country_iso3",
    "origin_state",
    "origin_city",
    "origin_postal_code",
    "origin_raw_location",
    "destination_country_iso3",
    "destination_state",
    "destination_city",
    "destination_postal_code",
    "destination_raw_location",
    "note",
    "language",
    "custom_fields",
    "analytics",
    "shipment_type",
    "shipment_weight",
    "shipment_weight_unit",
    "shipment_package_count",
    "shipment_pickup_date",
    "shipment_delivery_date",
];

const ADDRESS_FIELDS: &[&str] = &[
    "contact_name",
    "company_name",
    "street1",
    "street2",
    "street3",
    "city",
    "state",
    "postal_code",
    "country",
    "phone",
    "email",
    "type",
];

/// A value counts as provided unless it is null or an empty string.
pub fn is_provided(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Truthiness for optional inputs: false, zero, null and "" are all unset.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn allow_list(data: &JsonObject, fields: &[&str], prefix: &str) -> JsonObject {
    let mut formatted = JsonObject::new();
    for field in fields {
        let key = if prefix.is_empty() {
            (*field).to_string()
        } else {
            format!("{}_{}", prefix, field)
        };
        if let Some(value) = data.get(&key).filter(|v| is_provided(v)) {
            formatted.insert((*field).to_string(), value.clone());
        }
    }
    formatted
}

pub fn format_tracking_data(data: &JsonObject) -> JsonObject {
    allow_list(data, TRACKING_FIELDS, "")
}

pub fn format_address_data(data: &JsonObject, prefix: &str) -> JsonObject {
    allow_list(data, ADDRESS_FIELDS, prefix)
}

fn as_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        json!(n as i64)
    } else {
        json!(n)
    }
}

fn unit_or(data: &JsonObject, key: &str, default: &str) -> Value {
    data.get(key)
        .filter(|v| is_truthy(v))
        .cloned()
        .unwrap_or_else(|| json!(default))
}

pub fn format_parcel_data(data: &JsonObject) -> JsonObject {
    let mut parcel = JsonObject::new();

    if let Some(box_type) = data.get("box_type").filter(|v| is_truthy(v)) {
        parcel.insert("box_type".to_string(), box_type.clone());
    }

    if data.get("weight_value").is_some_and(is_truthy) {
        let value = as_number(data.get("weight_value")).unwrap_or(0.0);
        parcel.insert(
            "weight".to_string(),
            json!({
                "value": number_value(value),
                "unit": unit_or(data, "weight_unit", "kg"),
            }),
        );
    }

    let dimensions = ["dimension_width", "dimension_height", "dimension_depth"];
    if dimensions
        .iter()
        .any(|key| data.get(*key).is_some_and(is_truthy))
    {
        let dim = |key: &str| number_value(as_number(data.get(key)).unwrap_or(0.0));
        parcel.insert(
            "dimension".to_string(),
            json!({
                "width": dim("dimension_width"),
                "height": dim("dimension_height"),
                "depth": dim("dimension_depth"),
                "unit": unit_or(data, "dimension_unit", "cm"),
            }),
        );
    }

    if let Some(description) = data.get("description").filter(|v| is_truthy(v)) {
        parcel.insert("description".to_string(), description.clone());
    }

    parcel
}

/// Accepts a webhook body that may arrive as JSON text wrapped in a string.
pub fn parse_webhook_body(body: Value) -> Value {
    match body {
        Value::String(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
        other => other,
    }
}
