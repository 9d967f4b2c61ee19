use crate::core::constants::{
    API_KEY_HEADER, COLLECTION_KEYS, DEFAULT_PAGE_LIMIT, MAX_PAGES, RETURNS_PATH, SHIPPING_PATH,
    TRACKING_PATH,
};
use crate::domain::model::{
    ApiKind, ApiRequest, ApiResponse, HttpMethod, JsonObject, Parameters, Record,
};
use crate::domain::ports::{ApiTransport, CredentialsProvider};
use crate::utils::error::{AfterShipError, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;

pub struct AfterShipClient<C: CredentialsProvider> {
    credentials: C,
    client: Client,
}

impl<C: CredentialsProvider> AfterShipClient<C> {
    pub fn new(credentials: C) -> Self {
        Self::with_client(credentials, Client::new())
    }

    pub fn with_client(credentials: C, client: Client) -> Self {
        Self {
            credentials,
            client,
        }
    }

    pub fn credentials(&self) -> &C {
        &self.credentials
    }

    pub fn base_path(&self, api: ApiKind) -> String {
        match api {
            ApiKind::Tracking => format!("{}/{}", TRACKING_PATH, self.credentials.api_version()),
            ApiKind::Shipping => SHIPPING_PATH.to_string(),
            ApiKind::Returns => format!("{}/{}", RETURNS_PATH, self.credentials.api_version()),
        }
    }

    pub fn url_for(&self, request: &ApiRequest) -> String {
        format!(
            "{}{}{}",
            self.credentials.base_url().trim_end_matches('/'),
            self.base_path(request.api),
            request.endpoint
        )
    }

    /// Lists the account's couriers; succeeds only if the API key is accepted.
    pub async fn test_credentials(&self) -> Result<()> {
        self.request(ApiRequest::get("/couriers")).await?;
        tracing::info!("✅ AfterShip credentials verified");
        Ok(())
    }
}

#[async_trait]
impl<C: CredentialsProvider> ApiTransport for AfterShipClient<C> {
    async fn request(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.url_for(&request);

        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &url)
            .header(API_KEY_HEADER, self.credentials.api_key())
            .header(CONTENT_TYPE, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&query_pairs(&request.query));
        }

        if !request.body.is_empty() {
            builder = builder.json(&request.body);
        }

        tracing::debug!("📡 {} {}", request.method.as_str(), url);
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        tracing::debug!("📡 Response status: {}", status);

        if !status.is_success() {
            let error = api_error(status, &text);
            tracing::error!("❌ {} {} failed: {}", request.method.as_str(), url, error);
            return Err(error);
        }

        if text.trim().is_empty() {
            return Ok(ApiResponse::default());
        }

        Ok(serde_json::from_str(&text)?)
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// Renders query values the way AfterShip expects them: scalars as text, lists comma-joined.
pub fn query_pairs(query: &JsonObject) -> Vec<(String, String)> {
    query
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| (key.clone(), query_value(value)))
        .collect()
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(query_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

fn api_error(status: StatusCode, body: &str) -> AfterShipError {
    let meta = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("meta").cloned());

    let code = meta.as_ref().and_then(|m| m.get("code")).and_then(Value::as_i64);
    let meta_message = meta
        .as_ref()
        .and_then(|m| m.get("message"))
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string);

    let message = match (meta_message, code) {
        (Some(message), _) => message,
        (None, Some(code)) => format!("AfterShip API Error: {}", code),
        (None, None) => status
            .canonical_reason()
            .map(|reason| format!("Request failed with status {} {}", status.as_u16(), reason))
            .unwrap_or_else(|| "An unknown error occurred".to_string()),
    };

    AfterShipError::Api {
        status: status.as_u16(),
        code,
        message,
    }
}

/// Follows `page`/`limit` pagination until a short page, collecting every item.
pub async fn request_all_items<T: ApiTransport + ?Sized>(
    transport: &T,
    request: ApiRequest,
) -> Result<Vec<Record>> {
    let limit = request
        .query
        .get("limit")
        .and_then(value_as_u64)
        .filter(|limit| *limit > 0)
        .unwrap_or(DEFAULT_PAGE_LIMIT);

    let mut records = Vec::new();
    let mut page: u64 = 1;

    loop {
        let mut page_request = request.clone();
        page_request.query.insert("page".to_string(), page.into());
        page_request.query.insert("limit".to_string(), limit.into());

        let response = transport.request(page_request).await?;

        let has_more = match response.data {
            Value::Array(items) => {
                let count = items.len() as u64;
                records.extend(items.into_iter().map(record_from_value));
                count == limit
            }
            Value::Object(mut data) => {
                let key = COLLECTION_KEYS
                    .iter()
                    .find(|key| data.get(**key).is_some_and(Value::is_array));
                match key.and_then(|key| data.remove(*key)) {
                    Some(Value::Array(items)) => {
                        let count = items.len() as u64;
                        records.extend(items.into_iter().map(record_from_value));
                        count == limit
                    }
                    _ => {
                        records.push(Record::new(data));
                        false
                    }
                }
            }
            _ => false,
        };

        tracing::debug!("📄 Page {} fetched, {} items so far", page, records.len());

        page += 1;
        if !has_more {
            break;
        }
        if page > MAX_PAGES {
            tracing::warn!("⚠️ Stopped paginating after {} pages", MAX_PAGES);
            break;
        }
    }

    Ok(records)
}

fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn record_from_value(value: Value) -> Record {
    match value {
        Value::Object(data) => Record::new(data),
        other => {
            let mut data = JsonObject::new();
            data.insert("response".to_string(), other);
            Record::new(data)
        }
    }
}

/// Reshapes a response `data` value into output records.
pub fn records_from_data(data: Value) -> Vec<Record> {
    match data {
        Value::Null => Vec::new(),
        Value::Array(items) => items.into_iter().map(record_from_value).collect(),
        other => vec![record_from_value(other)],
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

pub fn build_tracking_identifier(
    tracking_id: Option<&str>,
    slug: Option<&str>,
    tracking_number: Option<&str>,
) -> Result<String> {
    if let Some(id) = present(tracking_id) {
        return Ok(format!("/{}", id));
    }

    match (present(slug), present(tracking_number)) {
        (Some(slug), Some(number)) => Ok(format!("/{}/{}", slug, number)),
        _ => Err(AfterShipError::InvalidIdentifier),
    }
}

/// Resolves the tracking path suffix from `identifierType` and its companion parameters.
pub fn identifier_from_params(params: &Parameters) -> Result<String> {
    if params.str("identifierType").as_deref() == Some("id") {
        let tracking_id = params.required_str("trackingId")?;
        build_tracking_identifier(Some(&tracking_id), None, None)
    } else {
        let slug = params.str("slug");
        let tracking_number = params.str("trackingNumber");
        build_tracking_identifier(None, slug.as_deref(), tracking_number.as_deref())
    }
}
