use super::shipments::shipment_body;
use super::{id_list, send, unsupported, Resource};
use crate::core::constants::PAPER_SIZES;
use crate::domain::model::{ApiKind, ApiRequest, JsonObject, Parameters, Record};
use crate::domain::ports::ApiTransport;
use crate::utils::error::Result;
use crate::utils::validation::validate_option;
use serde_json::{json, Value};

pub const OPERATIONS: &[&str] = &[
    "create",
    "get",
    "cancel",
    "getRates",
    "createManifest",
    "getManifest",
];

pub async fn execute(
    transport: &dyn ApiTransport,
    operation: &str,
    params: &Parameters,
) -> Result<Vec<Record>> {
    match operation {
        "create" => create_label(transport, params).await,
        "get" => get_label(transport, params).await,
        "cancel" => cancel_label(transport, params).await,
        "getRates" => get_rates(transport, params).await,
        "createManifest" => create_manifest(transport, params).await,
        "getManifest" => get_manifest(transport, params).await,
        other => Err(unsupported(Resource::Label, other)),
    }
}

pub async fn create_label(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let shipper_account_id = params.required_str("shipperAccountId")?;
    let service_type = params.required_str("serviceType")?;

    let mut body = JsonObject::new();
    body.insert(
        "shipper_account".to_string(),
        json!({ "id": shipper_account_id }),
    );
    body.insert("service_type".to_string(), service_type.into());
    body.insert(
        "shipment".to_string(),
        Value::Object(shipment_body(params, true)),
    );

    let additional = params.object("additionalFields");
    if let Some(paper_size) = additional
        .get("paperSize")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
    {
        validate_option("paperSize", paper_size, PAPER_SIZES)?;
        body.insert("paper_size".to_string(), paper_size.into());
    }

    let request = ApiRequest::post("/labels")
        .with_body(body)
        .on(ApiKind::Shipping);
    send(transport, request).await
}

pub async fn get_label(transport: &dyn ApiTransport, params: &Parameters) -> Result<Vec<Record>> {
    let label_id = params.required_str("labelId")?;
    let request = ApiRequest::get(format!("/labels/{}", label_id)).on(ApiKind::Shipping);
    send(transport, request).await
}

pub async fn cancel_label(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let label_id = params.required_str("labelId")?;
    let request = ApiRequest::post(format!("/labels/{}/cancel", label_id)).on(ApiKind::Shipping);
    send(transport, request).await
}

pub async fn get_rates(transport: &dyn ApiTransport, params: &Parameters) -> Result<Vec<Record>> {
    let accounts: Vec<Value> = id_list(params, "shipperAccountIds")?
        .into_iter()
        .map(|id| json!({ "id": id }))
        .collect();

    let mut body = JsonObject::new();
    body.insert("shipper_accounts".to_string(), Value::Array(accounts));
    body.insert(
        "shipment".to_string(),
        Value::Object(shipment_body(params, false)),
    );

    let request = ApiRequest::post("/rates")
        .with_body(body)
        .on(ApiKind::Shipping);
    send(transport, request).await
}

pub async fn create_manifest(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let shipper_account_id = params.required_str("shipperAccountId")?;
    let label_ids = id_list(params, "labelIds")?;

    let mut body = JsonObject::new();
    body.insert(
        "shipper_account".to_string(),
        json!({ "id": shipper_account_id }),
    );
    body.insert("label_ids".to_string(), json!(label_ids));

    let request = ApiRequest::post("/manifests")
        .with_body(body)
        .on(ApiKind::Shipping);
    send(transport, request).await
}

pub async fn get_manifest(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let manifest_id = params.required_str("manifestId")?;
    let request = ApiRequest::get(format!("/manifests/{}", manifest_id)).on(ApiKind::Shipping);
    send(transport, request).await
}
