use super::{copy_set, filters_to_query, json_array_param, list, send, unsupported, Resource};
use crate::core::constants::{COMPLETION_REASONS, DELIVERY_STATUSES};
use crate::core::format::format_tracking_data;
use crate::core::transport::identifier_from_params;
use crate::domain::model::{ApiRequest, JsonObject, Parameters, Record};
use crate::domain::ports::ApiTransport;
use crate::utils::error::Result;
use crate::utils::validation::validate_option;
use serde_json::Value;

pub const OPERATIONS: &[&str] = &[
    "list",
    "get",
    "create",
    "update",
    "delete",
    "retrack",
    "markAsCompleted",
    "getLastCheckpoint",
    "batchCreate",
    "getBySlug",
    "detectCourier",
];

const LIST_FILTERS: &[(&str, &str)] = &[
    ("slug", "slug"),
    ("tag", "tag"),
    ("keyword", "keyword"),
    ("origin", "origin"),
    ("destination", "destination"),
    ("createdAtMin", "created_at_min"),
    ("createdAtMax", "created_at_max"),
    ("fields", "fields"),
];

pub async fn execute(
    transport: &dyn ApiTransport,
    operation: &str,
    params: &Parameters,
) -> Result<Vec<Record>> {
    match operation {
        "list" => list_trackings(transport, params).await,
        "get" => get_tracking(transport, params).await,
        "create" => create_tracking(transport, params).await,
        "update" => update_tracking(transport, params).await,
        "delete" => delete_tracking(transport, params).await,
        "retrack" => retrack(transport, params).await,
        "markAsCompleted" => mark_as_completed(transport, params).await,
        "getLastCheckpoint" => get_last_checkpoint(transport, params).await,
        "batchCreate" => batch_create(transport, params).await,
        "getBySlug" => get_by_slug(transport, params).await,
        "detectCourier" => detect_courier(transport, params).await,
        other => Err(unsupported(Resource::Tracking, other)),
    }
}

pub async fn list_trackings(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let filters = params.object("filters");
    if let Some(tag) = filters.get("tag").and_then(Value::as_str) {
        if !tag.is_empty() {
            validate_option("filters.tag", tag, DELIVERY_STATUSES)?;
        }
    }

    let request =
        ApiRequest::get("/trackings").with_query(filters_to_query(&filters, LIST_FILTERS));
    list(transport, params, request, "trackings", false).await
}

pub async fn get_tracking(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let identifier = identifier_from_params(params)?;
    send(transport, ApiRequest::get(format!("/trackings{}", identifier))).await
}

pub async fn create_tracking(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let mut tracking = JsonObject::new();
    tracking.insert(
        "tracking_number".to_string(),
        params.required_str("trackingNumber")?.into(),
    );
    tracking.extend(params.object("additionalFields"));

    let mut body = JsonObject::new();
    body.insert(
        "tracking".to_string(),
        Value::Object(format_tracking_data(&tracking)),
    );

    send(transport, ApiRequest::post("/trackings").with_body(body)).await
}

pub async fn update_tracking(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let identifier = identifier_from_params(params)?;

    let mut body = JsonObject::new();
    body.insert(
        "tracking".to_string(),
        Value::Object(format_tracking_data(&params.object("updateFields"))),
    );

    let request = ApiRequest::put(format!("/trackings{}", identifier)).with_body(body);
    send(transport, request).await
}

pub async fn delete_tracking(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let identifier = identifier_from_params(params)?;
    send(transport, ApiRequest::delete(format!("/trackings{}", identifier))).await
}

pub async fn retrack(transport: &dyn ApiTransport, params: &Parameters) -> Result<Vec<Record>> {
    let identifier = identifier_from_params(params)?;
    send(
        transport,
        ApiRequest::post(format!("/trackings{}/retrack", identifier)),
    )
    .await
}

pub async fn mark_as_completed(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let identifier = identifier_from_params(params)?;
    let reason = params.str_or("reason", "DELIVERED");
    validate_option("reason", &reason, COMPLETION_REASONS)?;

    let mut body = JsonObject::new();
    body.insert("reason".to_string(), reason.into());

    let request =
        ApiRequest::post(format!("/trackings{}/mark-as-completed", identifier)).with_body(body);
    send(transport, request).await
}

pub async fn get_last_checkpoint(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let identifier = identifier_from_params(params)?;
    send(
        transport,
        ApiRequest::get(format!("/last_checkpoint{}", identifier)),
    )
    .await
}

pub async fn batch_create(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let trackings: Vec<Value> = json_array_param(params, "trackings")?
        .iter()
        .map(|tracking| Value::Object(format_tracking_data(tracking)))
        .collect();

    let mut body = JsonObject::new();
    body.insert("trackings".to_string(), Value::Array(trackings));

    send(transport, ApiRequest::post("/trackings/batch").with_body(body)).await
}

pub async fn get_by_slug(transport: &dyn ApiTransport, params: &Parameters) -> Result<Vec<Record>> {
    let slug = params.required_str("slug")?;
    let tracking_number = params.required_str("trackingNumber")?;
    let additional = params.object("additionalFields");

    let mut query = JsonObject::new();
    copy_set(&mut query, &additional, "fields", "fields");
    copy_set(&mut query, &additional, "lang", "lang");

    let request =
        ApiRequest::get(format!("/trackings/{}/{}", slug, tracking_number)).with_query(query);
    send(transport, request).await
}

pub async fn detect_courier(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let body = detection_body(params, false)?;
    send(transport, ApiRequest::post("/couriers/detect").with_body(body)).await
}

/// `{tracking: {...}}` for `/couriers/detect`. Courier detection additionally
/// forwards the origin and destination country hints.
pub(crate) fn detection_body(params: &Parameters, with_countries: bool) -> Result<JsonObject> {
    let additional = params.object("additionalFields");

    let mut tracking = JsonObject::new();
    tracking.insert(
        "tracking_number".to_string(),
        params.required_str("trackingNumber")?.into(),
    );
    copy_set(&mut tracking, &additional, "trackingPostalCode", "tracking_postal_code");
    copy_set(&mut tracking, &additional, "trackingShipDate", "tracking_ship_date");
    copy_set(
        &mut tracking,
        &additional,
        "trackingAccountNumber",
        "tracking_account_number",
    );
    if with_countries {
        copy_set(
            &mut tracking,
            &additional,
            "trackingOriginCountry",
            "tracking_origin_country",
        );
        copy_set(
            &mut tracking,
            &additional,
            "trackingDestinationCountry",
            "tracking_destination_country",
        );
    }
    copy_set(&mut tracking, &additional, "slug", "slug");

    let mut body = JsonObject::new();
    body.insert("tracking".to_string(), Value::Object(tracking));
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::resources::testing::{params, MockTransport};
    use crate::domain::model::HttpMethod;
    use crate::utils::error::AfterShipError;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_maps_filters_and_reads_trackings() {
        let transport = MockTransport::respond_with(json!({
            "page": 1,
            "trackings": [{"id": "t1"}, {"id": "t2"}]
        }));

        let records = list_trackings(
            &transport,
            &params(json!({
                "limit": 10,
                "filters": {"slug": "ups", "createdAtMin": "2024-01-01", "keyword": ""}
            })),
        )
        .await
        .unwrap();

        let sent = transport.last_request().await;
        assert_eq!(sent.endpoint, "/trackings");
        assert_eq!(sent.query.get("slug"), Some(&json!("ups")));
        assert_eq!(sent.query.get("created_at_min"), Some(&json!("2024-01-01")));
        assert_eq!(sent.query.get("limit"), Some(&json!(10)));
        assert!(!sent.query.contains_key("keyword"));
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_list_without_collection_is_empty() {
        let transport = MockTransport::respond_with(json!({"page": 1}));
        let records = list_trackings(&transport, &params(json!({})))
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_tag() {
        let transport = MockTransport::new();
        let result =
            list_trackings(&transport, &params(json!({"filters": {"tag": "Lost"}}))).await;
        assert!(matches!(result, Err(AfterShipError::InvalidParameter { .. })));
    }

    #[tokio::test]
    async fn test_create_allow_lists_fields() {
        let transport = MockTransport::respond_with(json!({"tracking": {"id": "new"}}));

        let records = create_tracking(
            &transport,
            &params(json!({
                "trackingNumber": "1Z999",
                "additionalFields": {"slug": "ups", "title": "", "bogus": true}
            })),
        )
        .await
        .unwrap();

        let sent = transport.last_request().await;
        assert_eq!(sent.method, HttpMethod::Post);
        assert_eq!(
            Value::Object(sent.body),
            json!({"tracking": {"tracking_number": "1Z999", "slug": "ups"}})
        );
        assert_eq!(records[0].get("tracking"), Some(&json!({"id": "new"})));
    }

    #[tokio::test]
    async fn test_identifier_paths() {
        let transport = MockTransport::new();
        let by_id = params(json!({"identifierType": "id", "trackingId": "abc"}));
        let by_slug = params(json!({"identifierType": "slugAndNumber", "slug": "dhl", "trackingNumber": "42"}));

        get_tracking(&transport, &by_id).await.unwrap();
        retrack(&transport, &by_slug).await.unwrap();
        get_last_checkpoint(&transport, &by_id).await.unwrap();
        delete_tracking(&transport, &by_slug).await.unwrap();

        let endpoints: Vec<_> = transport
            .requests()
            .await
            .into_iter()
            .map(|r| (r.method, r.endpoint))
            .collect();
        assert_eq!(
            endpoints,
            vec![
                (HttpMethod::Get, "/trackings/abc".to_string()),
                (HttpMethod::Post, "/trackings/dhl/42/retrack".to_string()),
                (HttpMethod::Get, "/last_checkpoint/abc".to_string()),
                (HttpMethod::Delete, "/trackings/dhl/42".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_identifier_fails_before_request() {
        let transport = MockTransport::new();
        let err = get_tracking(&transport, &params(json!({"slug": "ups"})))
            .await
            .unwrap_err();
        assert!(matches!(err, AfterShipError::InvalidIdentifier));
        assert!(transport.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_mark_as_completed_reason() {
        let transport = MockTransport::new();
        let by_id = json!({"identifierType": "id", "trackingId": "abc"});

        mark_as_completed(&transport, &params(by_id.clone())).await.unwrap();
        assert_eq!(
            transport.last_request().await.body.get("reason"),
            Some(&json!("DELIVERED"))
        );

        let mut lost = by_id.clone();
        lost["reason"] = json!("LOST");
        mark_as_completed(&transport, &params(lost)).await.unwrap();
        let sent = transport.last_request().await;
        assert_eq!(sent.endpoint, "/trackings/abc/mark-as-completed");
        assert_eq!(sent.body.get("reason"), Some(&json!("LOST")));

        let mut bad = by_id;
        bad["reason"] = json!("STOLEN");
        assert!(mark_as_completed(&transport, &params(bad)).await.is_err());
    }

    #[tokio::test]
    async fn test_batch_create_parses_json_text() {
        let transport = MockTransport::new();
        batch_create(
            &transport,
            &params(json!({
                "trackings": "[{\"tracking_number\": \"1\", \"junk\": 1}, {\"tracking_number\": \"2\", \"slug\": \"usps\"}]"
            })),
        )
        .await
        .unwrap();

        let sent = transport.last_request().await;
        assert_eq!(sent.endpoint, "/trackings/batch");
        assert_eq!(
            sent.body.get("trackings"),
            Some(&json!([
                {"tracking_number": "1"},
                {"tracking_number": "2", "slug": "usps"}
            ]))
        );

        let err = batch_create(&transport, &params(json!({"trackings": "nope"})))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid JSON format for trackings"));
    }

    #[tokio::test]
    async fn test_get_by_slug_query() {
        let transport = MockTransport::new();
        get_by_slug(
            &transport,
            &params(json!({
                "slug": "fedex",
                "trackingNumber": "777",
                "additionalFields": {"lang": "en"}
            })),
        )
        .await
        .unwrap();

        let sent = transport.last_request().await;
        assert_eq!(sent.endpoint, "/trackings/fedex/777");
        assert_eq!(Value::Object(sent.query), json!({"lang": "en"}));
    }

    #[tokio::test]
    async fn test_detect_courier_body() {
        let transport = MockTransport::new();
        detect_courier(
            &transport,
            &params(json!({
                "trackingNumber": "777",
                "additionalFields": {"trackingPostalCode": "10001", "trackingOriginCountry": "USA"}
            })),
        )
        .await
        .unwrap();

        let sent = transport.last_request().await;
        assert_eq!(sent.endpoint, "/couriers/detect");
        assert_eq!(
            Value::Object(sent.body),
            json!({"tracking": {"tracking_number": "777", "tracking_postal_code": "10001"}})
        );
    }
}
