use super::trackings::detection_body;
use super::{collection, send, unsupported, Resource};
use crate::core::constants::POPULAR_COURIERS;
use crate::domain::model::{ApiRequest, JsonObject, Parameters, Record};
use crate::domain::ports::ApiTransport;
use crate::utils::error::{AfterShipError, Result};
use serde_json::Value;

pub const OPERATIONS: &[&str] = &["list", "listAll", "detect", "getBySlug", "listOptions"];

pub async fn execute(
    transport: &dyn ApiTransport,
    operation: &str,
    params: &Parameters,
) -> Result<Vec<Record>> {
    match operation {
        "list" => list_couriers(transport).await,
        "listAll" => list_all_couriers(transport).await,
        "detect" => detect_couriers(transport, params).await,
        "getBySlug" => get_courier_by_slug(transport, params).await,
        "listOptions" => Ok(courier_options(transport).await),
        other => Err(unsupported(Resource::Courier, other)),
    }
}

/// Couriers activated on the account.
pub async fn list_couriers(transport: &dyn ApiTransport) -> Result<Vec<Record>> {
    let response = transport.request(ApiRequest::get("/couriers")).await?;
    Ok(collection(response.data, "couriers", false))
}

/// Every courier AfterShip supports.
pub async fn list_all_couriers(transport: &dyn ApiTransport) -> Result<Vec<Record>> {
    let response = transport.request(ApiRequest::get("/couriers/all")).await?;
    Ok(collection(response.data, "couriers", false))
}

pub async fn detect_couriers(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let body = detection_body(params, true)?;
    send(transport, ApiRequest::post("/couriers/detect").with_body(body)).await
}

pub async fn get_courier_by_slug(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let slug = params.required_str("slug")?;

    list_all_couriers(transport)
        .await?
        .into_iter()
        .find(|courier| courier.get("slug").and_then(Value::as_str) == Some(slug.as_str()))
        .map(|courier| vec![courier])
        .ok_or_else(|| AfterShipError::NotFound {
            message: format!("Courier with slug \"{}\" not found", slug),
        })
}

fn courier_option(name: &str, slug: &str) -> Record {
    let mut option = JsonObject::new();
    option.insert("name".to_string(), name.into());
    option.insert("value".to_string(), slug.into());
    Record::new(option)
}

/// `{name, value}` choices for courier pickers, one per courier slug. Falls
/// back to a built-in list of popular couriers when the API call fails.
pub async fn courier_options(transport: &dyn ApiTransport) -> Vec<Record> {
    match list_all_couriers(transport).await {
        Ok(couriers) => couriers
            .iter()
            .filter_map(|courier| {
                let slug = courier.get("slug").and_then(Value::as_str)?;
                let name = courier.get("name").and_then(Value::as_str).unwrap_or(slug);
                Some(courier_option(name, slug))
            })
            .collect(),
        Err(e) => {
            tracing::warn!("⚠️ Could not load couriers ({}), using popular couriers", e);
            POPULAR_COURIERS
                .iter()
                .map(|(name, slug)| courier_option(name, slug))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::resources::testing::{params, MockTransport};
    use crate::domain::model::ApiResponse;
    use async_trait::async_trait;
    use serde_json::json;

    struct UnreachableApi;

    #[async_trait]
    impl ApiTransport for UnreachableApi {
        async fn request(&self, _request: ApiRequest) -> Result<ApiResponse> {
            Err(AfterShipError::Api {
                status: 503,
                code: None,
                message: "Service Unavailable".to_string(),
            })
        }
    }

    fn courier_list() -> Value {
        json!({"total": 2, "couriers": [
            {"slug": "ups", "name": "UPS"},
            {"slug": "fedex", "name": "FedEx"}
        ]})
    }

    #[tokio::test]
    async fn test_list_endpoints() {
        let transport = MockTransport::responding(vec![courier_list(), json!({"total": 0})]);

        assert_eq!(list_couriers(&transport).await.unwrap().len(), 2);
        assert!(list_all_couriers(&transport).await.unwrap().is_empty());

        let endpoints: Vec<_> = transport
            .requests()
            .await
            .into_iter()
            .map(|r| r.endpoint)
            .collect();
        assert_eq!(endpoints, vec!["/couriers", "/couriers/all"]);
    }

    #[tokio::test]
    async fn test_get_by_slug_picks_matching_courier() {
        let transport = MockTransport::respond_with(courier_list());
        let records = get_courier_by_slug(&transport, &params(json!({"slug": "fedex"})))
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("name"), Some(&json!("FedEx")));
    }

    #[tokio::test]
    async fn test_get_by_slug_not_found() {
        let transport = MockTransport::respond_with(courier_list());
        let err = get_courier_by_slug(&transport, &params(json!({"slug": "dhl"})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Courier with slug \"dhl\" not found");
    }

    #[tokio::test]
    async fn test_detect_forwards_country_hints() {
        let transport = MockTransport::new();
        detect_couriers(
            &transport,
            &params(json!({
                "trackingNumber": "1Z",
                "additionalFields": {
                    "trackingOriginCountry": "USA",
                    "trackingDestinationCountry": "CAN",
                    "slug": "ups"
                }
            })),
        )
        .await
        .unwrap();

        let sent = transport.last_request().await;
        assert_eq!(
            Value::Object(sent.body),
            json!({"tracking": {
                "tracking_number": "1Z",
                "tracking_origin_country": "USA",
                "tracking_destination_country": "CAN",
                "slug": "ups"
            }})
        );
    }

    #[tokio::test]
    async fn test_courier_options_from_api() {
        let transport = MockTransport::respond_with(json!({"couriers": [
            {"slug": "ups", "name": "UPS"},
            {"slug": "gls"},
            {"name": "No slug"}
        ]}));

        let options = courier_options(&transport).await;

        assert_eq!(transport.last_request().await.endpoint, "/couriers/all");
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].get("name"), Some(&json!("UPS")));
        assert_eq!(options[0].get("value"), Some(&json!("ups")));
        assert_eq!(options[1].get("name"), Some(&json!("gls")));
    }

    #[tokio::test]
    async fn test_courier_options_fall_back_to_popular_couriers() {
        let options = execute(&UnreachableApi, "listOptions", &params(json!({})))
            .await
            .unwrap();

        assert_eq!(options.len(), POPULAR_COURIERS.len());
        assert_eq!(options[0].get("name"), Some(&json!("FedEx")));
        assert_eq!(options[0].get("value"), Some(&json!("fedex")));
        assert_eq!(options[19].get("value"), Some(&json!("swiss-post")));
    }
}
