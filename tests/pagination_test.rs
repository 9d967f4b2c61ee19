use aftership_node::core::transport::request_all_items;
use aftership_node::domain::model::{ApiKind, ApiRequest, Parameters};
use aftership_node::{AfterShipClient, Credentials, NodeEngine, Resource};
use anyhow::Result;
use httpmock::prelude::*;
use serde_json::{json, Value};

fn client_for(server: &MockServer) -> AfterShipClient<Credentials> {
    AfterShipClient::new(Credentials::new("page-key", "2025-01", server.base_url()))
}

fn page_of(prefix: &str, count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| json!({"id": format!("{}-{}", prefix, i)}))
        .collect()
}

#[tokio::test]
async fn test_return_all_shipments_reads_every_page() -> Result<()> {
    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method(GET)
            .path("/postmen/v3/shipments")
            .query_param("page", "1")
            .query_param("limit", "100")
            .query_param("status", "created");
        then.status(200).json_body(json!({
            "meta": {"code": 200},
            "data": {"shipments": page_of("a", 100)}
        }));
    });
    let second = server.mock(|when, then| {
        when.method(GET)
            .path("/postmen/v3/shipments")
            .query_param("page", "2")
            .query_param("limit", "100");
        then.status(200).json_body(json!({
            "meta": {"code": 200},
            "data": {"shipments": page_of("b", 7)}
        }));
    });

    let engine = NodeEngine::new(client_for(&server));
    let params = Parameters::from_value(json!({
        "returnAll": true,
        "filters": {"status": "created"}
    }))?;
    let records = engine
        .execute(Resource::Shipment, "list", &[params])
        .await?;

    first.assert();
    second.assert();
    assert_eq!(records.len(), 107);
    assert_eq!(records[106].get("id"), Some(&json!("b-6")));
    Ok(())
}

#[tokio::test]
async fn test_return_all_shipper_accounts_stops_on_short_page() -> Result<()> {
    let server = MockServer::start();
    let only = server.mock(|when, then| {
        when.method(GET)
            .path("/postmen/v3/shipper-accounts")
            .query_param("page", "1");
        then.status(200).json_body(json!({
            "meta": {"code": 200},
            "data": {"shipper_accounts": page_of("acc", 3)}
        }));
    });

    let engine = NodeEngine::new(client_for(&server));
    let params = Parameters::from_value(json!({"returnAll": true}))?;
    let records = engine.execute(Resource::Carrier, "list", &[params]).await?;

    only.assert_hits(1);
    assert_eq!(records.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_returns_pagination_with_explicit_page_size() -> Result<()> {
    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method(GET)
            .path("/returns/2025-01/returns")
            .query_param("page", "1")
            .query_param("limit", "2");
        then.status(200).json_body(json!({
            "meta": {"code": 200},
            "data": {"returns": page_of("r", 2)}
        }));
    });
    let second = server.mock(|when, then| {
        when.method(GET)
            .path("/returns/2025-01/returns")
            .query_param("page", "2")
            .query_param("limit", "2");
        then.status(200).json_body(json!({"meta": {"code": 200}, "data": {"returns": []}}));
    });

    let mut query = serde_json::Map::new();
    query.insert("limit".to_string(), json!(2));
    let request = ApiRequest::get("/returns")
        .with_query(query)
        .on(ApiKind::Returns);

    let records = request_all_items(&client_for(&server), request).await?;

    first.assert();
    second.assert();
    assert_eq!(records.len(), 2);
    Ok(())
}

#[test]
fn test_single_page_list_honours_limit() -> Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/tracking/2025-01/orders")
            .query_param("limit", "25");
        then.status(200).json_body(json!({
            "meta": {"code": 200},
            "data": {"orders": page_of("o", 25), "page": 1}
        }));
    });

    let engine = NodeEngine::new(client_for(&server));
    let params = Parameters::from_value(json!({"limit": 25}))?;
    let records = tokio_test::block_on(engine.execute(Resource::Order, "list", &[params]))?;

    mock.assert();
    assert_eq!(records.len(), 25);
    Ok(())
}
