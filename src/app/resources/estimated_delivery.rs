use super::{json_array_param, send, unsupported, Resource};
use crate::core::format::is_truthy;
use crate::core::transport::identifier_from_params;
use crate::domain::model::{ApiRequest, JsonObject, Parameters, Record};
use crate::domain::ports::ApiTransport;
use crate::utils::error::Result;
use serde_json::Value;

pub const OPERATIONS: &[&str] = &["get", "batchGet"];

/// Output key, then the accepted input keys in order of preference.
const PREDICTION_FIELDS: &[(&str, &[&str])] = &[
    ("slug", &["slug"]),
    ("tracking_number", &["tracking_number", "trackingNumber"]),
    ("origin_address", &["origin_address", "originAddress"]),
    ("destination_address", &["destination_address", "destinationAddress"]),
    ("pickup_time", &["pickup_time", "pickupTime"]),
    ("weight", &["weight"]),
];

pub async fn execute(
    transport: &dyn ApiTransport,
    operation: &str,
    params: &Parameters,
) -> Result<Vec<Record>> {
    match operation {
        "get" => get_estimated_delivery(transport, params).await,
        "batchGet" => batch_get_estimated_delivery(transport, params).await,
        other => Err(unsupported(Resource::EstimatedDelivery, other)),
    }
}

pub async fn get_estimated_delivery(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let identifier = identifier_from_params(params)?;
    send(
        transport,
        ApiRequest::get(format!("/estimated-delivery-date{}", identifier)),
    )
    .await
}

pub async fn batch_get_estimated_delivery(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let predictions: Vec<Value> = json_array_param(params, "trackings")?
        .iter()
        .map(|tracking| Value::Object(prediction_request(tracking)))
        .collect();

    let mut body = JsonObject::new();
    body.insert(
        "estimated_delivery_dates".to_string(),
        Value::Array(predictions),
    );

    let request = ApiRequest::post("/estimated-delivery-date/predict-batch").with_body(body);
    send(transport, request).await
}

/// Earlier input keys win only with a truthy value; the last key is taken as
/// long as it is not null.
fn prediction_request(tracking: &JsonObject) -> JsonObject {
    PREDICTION_FIELDS
        .iter()
        .filter_map(|(field, sources)| {
            let (last, preferred) = sources.split_last()?;
            preferred
                .iter()
                .filter_map(|source| tracking.get(*source))
                .find(|value| is_truthy(value))
                .or_else(|| tracking.get(*last).filter(|value| !value.is_null()))
                .map(|value| (field.to_string(), value.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::resources::testing::{params, MockTransport};
    use serde_json::json;

    #[tokio::test]
    async fn test_get_uses_tracking_identifier() {
        let transport = MockTransport::respond_with(json!({"estimated_delivery_date": {"id": "e1"}}));
        let records = get_estimated_delivery(
            &transport,
            &params(json!({"identifierType": "id", "trackingId": "t9"})),
        )
        .await
        .unwrap();

        assert_eq!(
            transport.last_request().await.endpoint,
            "/estimated-delivery-date/t9"
        );
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_batch_accepts_camel_and_snake_keys() {
        let transport = MockTransport::new();
        batch_get_estimated_delivery(
            &transport,
            &params(json!({"trackings": [
                {"slug": "ups", "trackingNumber": "1", "pickupTime": "2024-05-01"},
                {"slug": "dhl", "tracking_number": "2", "originAddress": {"country": "DEU"}, "weight": {"value": 1}}
            ]})),
        )
        .await
        .unwrap();

        let sent = transport.last_request().await;
        assert_eq!(sent.endpoint, "/estimated-delivery-date/predict-batch");
        assert_eq!(
            sent.body.get("estimated_delivery_dates"),
            Some(&json!([
                {"slug": "ups", "tracking_number": "1", "pickup_time": "2024-05-01"},
                {"slug": "dhl", "tracking_number": "2", "origin_address": {"country": "DEU"}, "weight": {"value": 1}}
            ]))
        );
    }

    #[tokio::test]
    async fn test_batch_keeps_falsy_values_that_are_present() {
        let transport = MockTransport::new();
        batch_get_estimated_delivery(
            &transport,
            &params(json!({"trackings": [
                {"slug": "", "tracking_number": "", "trackingNumber": "7", "weight": 0, "pickupTime": null}
            ]})),
        )
        .await
        .unwrap();

        let sent = transport.last_request().await;
        assert_eq!(
            sent.body.get("estimated_delivery_dates"),
            Some(&json!([{"slug": "", "tracking_number": "7", "weight": 0}]))
        );
    }
}
