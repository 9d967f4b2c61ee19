//! Webhook receiver logic: signature check, payload parsing, tag-to-event mapping and filtering.

use crate::core::constants::SIGNATURE_HEADER;
use crate::core::format::parse_webhook_body;
use crate::domain::model::{JsonObject, Record};
use crate::utils::error::{AfterShipError, Result};
use base64::prelude::{Engine as _, BASE64_STANDARD};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::Sha256;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WebhookEvent {
    All,
    AttemptFail,
    AvailableForPickup,
    Delivered,
    Exception,
    Expired,
    InTransit,
    InfoReceived,
    OutForDelivery,
    Pending,
    ReturnToSender,
    #[default]
    TrackingUpdate,
}

impl WebhookEvent {
    pub const ALL: [WebhookEvent; 12] = [
        WebhookEvent::All,
        WebhookEvent::AttemptFail,
        WebhookEvent::AvailableForPickup,
        WebhookEvent::Delivered,
        WebhookEvent::Exception,
        WebhookEvent::Expired,
        WebhookEvent::InTransit,
        WebhookEvent::InfoReceived,
        WebhookEvent::OutForDelivery,
        WebhookEvent::Pending,
        WebhookEvent::ReturnToSender,
        WebhookEvent::TrackingUpdate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookEvent::All => "all",
            WebhookEvent::AttemptFail => "attemptFail",
            WebhookEvent::AvailableForPickup => "availableForPickup",
            WebhookEvent::Delivered => "delivered",
            WebhookEvent::Exception => "exception",
            WebhookEvent::Expired => "expired",
            WebhookEvent::InTransit => "inTransit",
            WebhookEvent::InfoReceived => "infoReceived",
            WebhookEvent::OutForDelivery => "outForDelivery",
            WebhookEvent::Pending => "pending",
            WebhookEvent::ReturnToSender => "returnToSender",
            WebhookEvent::TrackingUpdate => "trackingUpdate",
        }
    }

    /// Maps an AfterShip delivery-status tag (any case) to an event.
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_lowercase().as_str() {
            "pending" => WebhookEvent::Pending,
            "inforeceived" => WebhookEvent::InfoReceived,
            "intransit" => WebhookEvent::InTransit,
            "outfordelivery" => WebhookEvent::OutForDelivery,
            "attemptfail" => WebhookEvent::AttemptFail,
            "delivered" => WebhookEvent::Delivered,
            "availableforpickup" => WebhookEvent::AvailableForPickup,
            "exception" => WebhookEvent::Exception,
            "expired" => WebhookEvent::Expired,
            "returntosender" => WebhookEvent::ReturnToSender,
            _ => WebhookEvent::TrackingUpdate,
        }
    }

    /// `all` and `trackingUpdate` subscribe to every delivery.
    pub fn accepts(&self, incoming: WebhookEvent) -> bool {
        matches!(self, WebhookEvent::All | WebhookEvent::TrackingUpdate) || *self == incoming
    }
}

impl fmt::Display for WebhookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WebhookEvent {
    type Err = AfterShipError;

    fn from_str(s: &str) -> Result<Self> {
        WebhookEvent::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| AfterShipError::InvalidConfigValueError {
                field: "trigger.event".to_string(),
                value: s.to_string(),
                reason: "Unknown webhook event".to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFieldFilter {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerOptions {
    pub courier_slug: Option<String>,
    #[serde(default)]
    pub custom_fields_filter: Vec<CustomFieldFilter>,
    #[serde(default)]
    pub include_raw_payload: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerConfig {
    #[serde(default)]
    pub event: WebhookEvent,
    pub webhook_secret: Option<String>,
    #[serde(default)]
    pub options: TriggerOptions,
}

/// An inbound webhook delivery as received over HTTP.
#[derive(Debug, Clone, Default)]
pub struct WebhookRequest {
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl WebhookRequest {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_lowercase(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    /// The delivery matched; these records start the workflow.
    Triggered(Vec<Record>),
    /// The delivery was answered without triggering.
    Responded { status: u16, body: Value },
}

impl WebhookOutcome {
    pub fn status(&self) -> u16 {
        match self {
            WebhookOutcome::Triggered(_) => 200,
            WebhookOutcome::Responded { status, .. } => *status,
        }
    }

    pub fn is_triggered(&self) -> bool {
        matches!(self, WebhookOutcome::Triggered(_))
    }

    fn filtered() -> Self {
        WebhookOutcome::Responded {
            status: 200,
            body: json!({"received": true, "filtered": true}),
        }
    }
}

/// Base64 HMAC-SHA256 of the payload, as AfterShip sends in `aftership-hmac-sha256`.
pub fn compute_signature(secret: &str, payload: &[u8]) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| {
        AfterShipError::WebhookError {
            message: format!("Invalid webhook secret: {}", e),
        }
    })?;
    mac.update(payload);
    Ok(BASE64_STANDARD.encode(mac.finalize().into_bytes()))
}

/// Constant-time check of a base64 signature against the payload.
pub fn verify_signature(secret: &str, payload: &[u8], signature: &str) -> bool {
    let Ok(expected) = BASE64_STANDARD.decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TrackingSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tracking_number: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    slug: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subtag: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subtag_message: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    origin_country: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    destination_country: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected_delivery: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    signed_by: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shipment_type: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CourierSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    slug: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tracking_url: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    order_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_number: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_path: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TriggerOutput {
    event: WebhookEvent,
    #[serde(skip_serializing_if = "Option::is_none")]
    event_time: Option<Value>,
    tracking: TrackingSummary,
    courier: CourierSummary,
    checkpoints: Value,
    custom_fields: Value,
    order_info: OrderInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_payload: Option<Value>,
}

pub struct WebhookTrigger {
    config: TriggerConfig,
}

impl WebhookTrigger {
    pub fn new(config: TriggerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    pub fn handle(&self, request: &WebhookRequest) -> Result<WebhookOutcome> {
        if let Some(secret) = self.config.webhook_secret.as_deref().filter(|s| !s.is_empty()) {
            match request.header(SIGNATURE_HEADER) {
                Some(signature) => {
                    if !verify_signature(secret, request.body(), signature) {
                        tracing::warn!("🔒 Rejected webhook with invalid signature");
                        return Ok(WebhookOutcome::Responded {
                            status: 401,
                            body: json!({"error": "Invalid signature"}),
                        });
                    }
                }
                None => {
                    tracing::warn!(
                        "🔒 Webhook secret configured but no {} header present, accepting unsigned delivery",
                        SIGNATURE_HEADER
                    );
                }
            }
        }

        let body = serde_json::from_slice::<Value>(request.body())
            .map(parse_webhook_body)
            .unwrap_or(Value::Null);

        let Some(message) = body.get("msg").and_then(Value::as_object) else {
            return Ok(WebhookOutcome::Responded {
                status: 400,
                body: json!({"error": "Invalid payload: missing msg field"}),
            });
        };

        let tag = message.get("tag").and_then(Value::as_str).unwrap_or_default();
        let event = WebhookEvent::from_tag(tag);

        if !self.config.event.accepts(event) {
            tracing::debug!("Webhook event {} filtered by {}", event, self.config.event);
            return Ok(WebhookOutcome::filtered());
        }

        if !self.matches_courier(message) || !self.matches_custom_fields(message) {
            tracing::debug!("Webhook for event {} filtered by options", event);
            return Ok(WebhookOutcome::filtered());
        }

        let output = self.build_output(event, &body, message);
        let record = match serde_json::to_value(output)? {
            Value::Object(data) => Record::new(data),
            other => {
                return Err(AfterShipError::WebhookError {
                    message: format!("Unexpected trigger output: {}", other),
                })
            }
        };

        let tracking_number = message
            .get("tracking_number")
            .and_then(Value::as_str)
            .unwrap_or("unknown tracking");
        tracing::info!("📦 Webhook triggered: {} ({})", event, tracking_number);
        Ok(WebhookOutcome::Triggered(vec![record]))
    }

    fn matches_courier(&self, message: &JsonObject) -> bool {
        let Some(wanted) = self
            .config
            .options
            .courier_slug
            .as_deref()
            .filter(|s| !s.is_empty())
        else {
            return true;
        };
        let slug = message.get("slug").and_then(Value::as_str).unwrap_or_default();
        slug.to_lowercase() == wanted.to_lowercase()
    }

    fn matches_custom_fields(&self, message: &JsonObject) -> bool {
        let filters = &self.config.options.custom_fields_filter;
        if filters.is_empty() {
            return true;
        }
        let Some(custom_fields) = message.get("custom_fields").and_then(Value::as_object) else {
            return true;
        };
        filters.iter().all(|filter| {
            custom_fields.get(&filter.name).and_then(Value::as_str) == Some(filter.value.as_str())
        })
    }

    fn build_output(&self, event: WebhookEvent, body: &Value, message: &JsonObject) -> TriggerOutput {
        let field = |key: &str| message.get(key).cloned();

        TriggerOutput {
            event,
            event_time: body.get("ts").cloned(),
            tracking: TrackingSummary {
                id: field("id"),
                tracking_number: field("tracking_number"),
                slug: field("slug"),
                title: field("title"),
                tag: field("tag"),
                subtag: field("subtag"),
                subtag_message: field("subtag_message"),
                origin_country: field("origin_country_iso3"),
                destination_country: field("destination_country_iso3"),
                expected_delivery: field("expected_delivery"),
                signed_by: field("signed_by"),
                shipment_type: field("shipment_type"),
            },
            courier: CourierSummary {
                slug: field("slug"),
                name: field("courier_destination_country_iso3"),
                tracking_url: field("courier_tracking_link"),
            },
            checkpoints: field("checkpoints")
                .filter(|v| !v.is_null())
                .unwrap_or_else(|| json!([])),
            custom_fields: field("custom_fields")
                .filter(|v| !v.is_null())
                .unwrap_or_else(|| json!({})),
            order_info: OrderInfo {
                order_id: field("order_id"),
                order_number: field("order_number"),
                order_path: field("order_id_path"),
            },
            raw_payload: self
                .config
                .options
                .include_raw_payload
                .then(|| body.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(tag: &str) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "ts": 1700000000,
            "msg": {
                "id": "trk_1",
                "tracking_number": "1Z999",
                "slug": "UPS",
                "tag": tag,
                "custom_fields": {"store": "eu"}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_tag_mapping() {
        assert_eq!(WebhookEvent::from_tag("Delivered"), WebhookEvent::Delivered);
        assert_eq!(WebhookEvent::from_tag("OutForDelivery"), WebhookEvent::OutForDelivery);
        assert_eq!(WebhookEvent::from_tag("AttemptFail"), WebhookEvent::AttemptFail);
        assert_eq!(WebhookEvent::from_tag("ReturnToSender"), WebhookEvent::ReturnToSender);
        assert_eq!(WebhookEvent::from_tag("Something"), WebhookEvent::TrackingUpdate);
        assert_eq!(WebhookEvent::from_tag(""), WebhookEvent::TrackingUpdate);
    }

    #[test]
    fn test_event_from_str_round_trips_names() {
        for event in WebhookEvent::ALL {
            assert_eq!(event.as_str().parse::<WebhookEvent>().unwrap(), event);
        }
        assert!("delivered_now".parse::<WebhookEvent>().is_err());
    }

    #[test]
    fn test_signature_verification() {
        let body = payload("Delivered");
        let signature = compute_signature("secret", &body).unwrap();

        assert!(verify_signature("secret", &body, &signature));
        assert!(!verify_signature("other", &body, &signature));
        assert!(!verify_signature("secret", b"tampered", &signature));
        assert!(!verify_signature("secret", &body, "not base64!"));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let trigger = WebhookTrigger::new(TriggerConfig {
            webhook_secret: Some("secret".to_string()),
            ..Default::default()
        });
        let signature = compute_signature("secret", &payload("Delivered")).unwrap();
        let request =
            WebhookRequest::new(payload("Exception")).with_header("AfterShip-Hmac-Sha256", signature);

        let outcome = trigger.handle(&request).unwrap();
        assert_eq!(
            outcome,
            WebhookOutcome::Responded {
                status: 401,
                body: json!({"error": "Invalid signature"})
            }
        );
    }

    #[test]
    fn test_unsigned_delivery_accepted_with_secret_configured() {
        let trigger = WebhookTrigger::new(TriggerConfig {
            webhook_secret: Some("secret".to_string()),
            ..Default::default()
        });

        let outcome = trigger
            .handle(&WebhookRequest::new(payload("Delivered")))
            .unwrap();

        assert!(outcome.is_triggered());
        assert_eq!(outcome.status(), 200);
    }

    #[test]
    fn test_missing_msg_is_bad_request() {
        let trigger = WebhookTrigger::new(TriggerConfig::default());
        let outcome = trigger
            .handle(&WebhookRequest::new(b"{\"ts\": 1}".to_vec()))
            .unwrap();
        assert_eq!(outcome.status(), 400);

        let outcome = trigger.handle(&WebhookRequest::new(b"garbage".to_vec())).unwrap();
        assert_eq!(outcome.status(), 400);
    }

    #[test]
    fn test_event_filter() {
        let trigger = WebhookTrigger::new(TriggerConfig {
            event: WebhookEvent::Delivered,
            ..Default::default()
        });

        let filtered = trigger.handle(&WebhookRequest::new(payload("InTransit"))).unwrap();
        assert_eq!(
            filtered,
            WebhookOutcome::Responded {
                status: 200,
                body: json!({"received": true, "filtered": true})
            }
        );

        let matched = trigger.handle(&WebhookRequest::new(payload("Delivered"))).unwrap();
        assert!(matched.is_triggered());
    }

    #[test]
    fn test_courier_and_custom_field_filters() {
        let mut config = TriggerConfig {
            event: WebhookEvent::All,
            ..Default::default()
        };
        config.options.courier_slug = Some("ups".to_string());
        config.options.custom_fields_filter = vec![CustomFieldFilter {
            name: "store".to_string(),
            value: "eu".to_string(),
        }];
        let trigger = WebhookTrigger::new(config.clone());
        assert!(trigger
            .handle(&WebhookRequest::new(payload("Delivered")))
            .unwrap()
            .is_triggered());

        config.options.custom_fields_filter[0].value = "us".to_string();
        let trigger = WebhookTrigger::new(config.clone());
        assert!(!trigger
            .handle(&WebhookRequest::new(payload("Delivered")))
            .unwrap()
            .is_triggered());

        config.options.custom_fields_filter.clear();
        config.options.courier_slug = Some("fedex".to_string());
        let trigger = WebhookTrigger::new(config);
        assert!(!trigger
            .handle(&WebhookRequest::new(payload("Delivered")))
            .unwrap()
            .is_triggered());
    }

    #[test]
    fn test_output_shape() {
        let mut config = TriggerConfig::default();
        config.options.include_raw_payload = true;
        let trigger = WebhookTrigger::new(config);

        let WebhookOutcome::Triggered(records) =
            trigger.handle(&WebhookRequest::new(payload("Delivered"))).unwrap()
        else {
            panic!("expected trigger");
        };

        let record = &records[0];
        assert_eq!(record.get("event"), Some(&json!("delivered")));
        assert_eq!(record.get("eventTime"), Some(&json!(1700000000)));
        assert_eq!(record.data["tracking"]["trackingNumber"], "1Z999");
        assert_eq!(record.data["courier"]["slug"], "UPS");
        assert_eq!(record.data["checkpoints"], json!([]));
        assert_eq!(record.data["customFields"], json!({"store": "eu"}));
        assert!(record.data["rawPayload"]["msg"].is_object());
    }
}
