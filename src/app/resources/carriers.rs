//! Shipper accounts: the carrier credentials labels are purchased with.

use super::{copy_set, filters_to_query, json_object_param, list, send, unsupported, Resource};
use crate::core::format::format_address_data;
use crate::domain::model::{ApiKind, ApiRequest, JsonObject, Parameters, Record};
use crate::domain::ports::ApiTransport;
use crate::utils::error::Result;
use serde_json::Value;

pub const OPERATIONS: &[&str] = &["list", "create", "get", "update", "delete"];

pub async fn execute(
    transport: &dyn ApiTransport,
    operation: &str,
    params: &Parameters,
) -> Result<Vec<Record>> {
    match operation {
        "list" => list_shipper_accounts(transport, params).await,
        "create" => create_shipper_account(transport, params).await,
        "get" => get_shipper_account(transport, params).await,
        "update" => update_shipper_account(transport, params).await,
        "delete" => delete_shipper_account(transport, params).await,
        other => Err(unsupported(Resource::Carrier, other)),
    }
}

fn account_path(params: &Parameters) -> Result<String> {
    Ok(format!("/shipper-accounts/{}", params.required_str("accountId")?))
}

/// Credentials and address are only forwarded when they are non-empty objects.
/// Both may arrive as JSON text.
fn insert_details(
    account: &mut JsonObject,
    credentials: Option<&Value>,
    address: Option<&Value>,
) -> Result<()> {
    if let Some(credentials) = json_object_param(credentials, "credentials")?
        .filter(|c| !c.is_empty())
    {
        account.insert("credentials".to_string(), Value::Object(credentials));
    }
    if let Some(address) = json_object_param(address, "address")?.filter(|a| !a.is_empty()) {
        account.insert(
            "address".to_string(),
            Value::Object(format_address_data(&address, "")),
        );
    }
    Ok(())
}

pub async fn list_shipper_accounts(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let query = filters_to_query(&params.object("filters"), &[("slug", "slug")]);
    let request = ApiRequest::get("/shipper-accounts")
        .with_query(query)
        .on(ApiKind::Shipping);
    list(transport, params, request, "shipper_accounts", true).await
}

pub async fn create_shipper_account(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let mut account = JsonObject::new();
    account.insert("slug".to_string(), params.required_str("slug")?.into());
    if let Some(description) = params.str("description") {
        account.insert("description".to_string(), description.into());
    }
    insert_details(&mut account, params.get("credentials"), params.get("address"))?;

    let mut body = JsonObject::new();
    body.insert("shipper_account".to_string(), Value::Object(account));

    let request = ApiRequest::post("/shipper-accounts")
        .with_body(body)
        .on(ApiKind::Shipping);
    send(transport, request).await
}

pub async fn get_shipper_account(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let request = ApiRequest::get(account_path(params)?).on(ApiKind::Shipping);
    send(transport, request).await
}

pub async fn update_shipper_account(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let path = account_path(params)?;
    let fields = params.object("updateFields");

    let mut account = JsonObject::new();
    copy_set(&mut account, &fields, "description", "description");
    insert_details(&mut account, fields.get("credentials"), fields.get("address"))?;

    let mut body = JsonObject::new();
    body.insert("shipper_account".to_string(), Value::Object(account));

    let request = ApiRequest::patch(path).with_body(body).on(ApiKind::Shipping);
    send(transport, request).await
}

pub async fn delete_shipper_account(
    transport: &dyn ApiTransport,
    params: &Parameters,
) -> Result<Vec<Record>> {
    let request = ApiRequest::delete(account_path(params)?).on(ApiKind::Shipping);
    send(transport, request).await
}
