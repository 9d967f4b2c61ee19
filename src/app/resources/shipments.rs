use super::{copy_present, copy_set, filters_to_query, list, send, unsupported, Resource};
use crate::core::constants::SHIPMENT_STATUSES;
use crate::core::format::{format_address_data, format_parcel_data};
use crate::domain::model::{ApiKind, ApiRequest, JsonObject, Parameters, Record};
use crate::domain::ports::ApiTransport;
use crate::utils::error::Result;
use crate::utils::validation::validate_option;
use serde_json::Value;

pub const OPERATIONS: &[&str] = &["create", "get", "list"];

const LIST_FILTERS: &[(&str, &str)] = &[
    ("status", "status"),
    ("createdAtMin", "created_at_min"),
    ("createdAtMax", "created_at_max"),
];

pub async fn execute(
    transport: &dyn ApiTransport,
    operation: &str,
    params: &Parameters,
) -> Result<Vec<Record>> {
    match operation {
        "create" => create_shipment(transport, params).await,
        "get" => get_shipment(transport, params).await,
        "list" => list_shipments(transport, params).await,
        other => Err(unsupported(Resource::Shipment, other)),
    }
}

/// `ship_from`, `ship_to` and a single parcel, plus the optional shipment
/// flags from `additionalFields`. Shared with label creation and rating.
pub(crate) fn shipment_body(params: &Parameters, with_options: bool) -> JsonObject {
    let mut shipment = JsonObject::new();
    shipment.insert(
        "ship_from".to_string(),
        Value::Object(format_address_data(&params.object("shipFrom"), "")),
    );
    shipment.insert(
        "ship_to".to_string(),
        Value::Object(format_address_data(&params.object("shipTo"), "")),
    );
    shipment.insert(
        "parcels".to_string(),
        Value::Array(vec![Value::Object(format_parcel_data(
            &params.object("parcel"),
        ))]),
    );

    if with_options {
        let additional = params.object("additionalFields");
        copy_present(&mut shipment, &additional, "returnShipment", "return_shipment");
        copy_present(&mut shipment, &additional, "isDocument", "is_document");
        copy_set(
            &mut shipment,
            &additional,
            "deliveryInstructions",
            "delivery_instructions",
        );
        copy_set(&mut shipment, &additional, "references", "references");
    }

    shipment
}

pub async fn create_shipment(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let mut body = JsonObject::new();
    body.insert(
        "shipment".to_string(),
        Value::Object(shipment_body(params, true)),
    );

    let request = ApiRequest::post("/shipments")
        .with_body(body)
        .on(ApiKind::Shipping);
    send(transport, request).await
}

pub async fn get_shipment(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let shipment_id = params.required_str("shipmentId")?;
    let request = ApiRequest::get(format!("/shipments/{}", shipment_id)).on(ApiKind::Shipping);
    send(transport, request).await
}

pub async fn list_shipments(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let filters = params.object("filters");
    if let Some(status) = filters.get("status").and_then(Value::as_str) {
        if !status.is_empty() {
            validate_option("filters.status", status, SHIPMENT_STATUSES)?;
        }
    }

    let request = ApiRequest::get("/shipments")
        .with_query(filters_to_query(&filters, LIST_FILTERS))
        .on(ApiKind::Shipping);
    list(transport, params, request, "shipments", true).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::resources::testing::{params, MockTransport};
    use serde_json::json;

    #[tokio::test]
    async fn test_create_builds_shipment() {
        let transport = MockTransport::respond_with(json!({"id": "s1"}));
        create_shipment(
            &transport,
            &params(json!({
                "shipFrom": {"contact_name": "Warehouse", "country": "USA", "phone": ""},
                "shipTo": {"city": "Toronto", "country": "CAN"},
                "parcel": {"weight_value": "2.5", "box_type": "custom"},
                "additionalFields": {"isDocument": false, "references": ["PO-1"]}
            })),
        )
        .await
        .unwrap();

        let sent = transport.last_request().await;
        assert_eq!(sent.api, ApiKind::Shipping);
        assert_eq!(sent.endpoint, "/shipments");
        assert_eq!(
            Value::Object(sent.body),
            json!({"shipment": {
                "ship_from": {"contact_name": "Warehouse", "country": "USA"},
                "ship_to": {"city": "Toronto", "country": "CAN"},
                "parcels": [{"box_type": "custom", "weight": {"value": 2.5, "unit": "kg"}}],
                "is_document": false,
                "references": ["PO-1"]
            }})
        );
    }

    #[tokio::test]
    async fn test_list_falls_back_to_data() {
        let transport = MockTransport::respond_with(json!({"next_token": null}));
        let records = list_shipments(
            &transport,
            &params(json!({"filters": {"status": "manifested"}})),
        )
        .await
        .unwrap();

        let sent = transport.last_request().await;
        assert_eq!(sent.query.get("status"), Some(&json!("manifested")));
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_status() {
        let transport = MockTransport::new();
        let result =
            list_shipments(&transport, &params(json!({"filters": {"status": "lost"}}))).await;
        assert!(result.is_err());
        assert!(transport.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_get_requires_id() {
        let transport = MockTransport::new();
        assert!(get_shipment(&transport, &params(json!({}))).await.is_err());

        get_shipment(&transport, &params(json!({"shipmentId": "s1"})))
            .await
            .unwrap();
        assert_eq!(transport.last_request().await.endpoint, "/shipments/s1");
    }
}
