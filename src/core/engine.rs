use crate::app::resources::{self, Resource};
use crate::domain::model::{JsonObject, Parameters, Record};
use crate::domain::ports::ApiTransport;
use crate::utils::error::{AfterShipError, Result};
use serde_json::Value;

/// Runs one resource operation over a batch of parameter items.
pub struct NodeEngine<T: ApiTransport> {
    transport: T,
    continue_on_fail: bool,
}

impl<T: ApiTransport> NodeEngine<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            continue_on_fail: false,
        }
    }

    pub fn with_continue_on_fail(mut self, continue_on_fail: bool) -> Self {
        self.continue_on_fail = continue_on_fail;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Items run one after another; their records are concatenated in order.
    pub async fn execute(
        &self,
        resource: Resource,
        operation: &str,
        items: &[Parameters],
    ) -> Result<Vec<Record>> {
        if !resource.supports(operation) {
            return Err(AfterShipError::UnsupportedOperation {
                resource: resource.to_string(),
                operation: operation.to_string(),
            });
        }

        tracing::info!(
            "🚀 Running {}.{} for {} item(s)",
            resource,
            operation,
            items.len()
        );

        let mut output = Vec::new();
        let mut failed = 0;

        for (index, params) in items.iter().enumerate() {
            tracing::debug!("📋 Item {}", index);

            match resources::execute(&self.transport, resource, operation, params).await {
                Ok(records) => {
                    tracing::debug!("📋 Item {} produced {} record(s)", index, records.len());
                    output.extend(records);
                }
                Err(e) if self.continue_on_fail => {
                    tracing::warn!("⚠️ Item {} failed, continuing: {}", index, e);
                    failed += 1;
                    output.push(error_record(&e, index));
                }
                Err(e) => {
                    tracing::error!("❌ Item {} failed: {}", index, e);
                    return Err(e);
                }
            }
        }

        tracing::info!(
            "✅ {}.{} finished: {} record(s), {} failed item(s)",
            resource,
            operation,
            output.len(),
            failed
        );

        Ok(output)
    }
}

fn error_record(error: &AfterShipError, index: usize) -> Record {
    let mut data = JsonObject::new();
    data.insert("error".to_string(), Value::String(error.to_string()));
    data.insert("paired_item".to_string(), index.into());
    Record::new(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::resources::testing::{params, MockTransport};
    use serde_json::json;

    #[tokio::test]
    async fn test_runs_each_item_in_order() {
        let transport = MockTransport::responding(vec![
            json!({"tracking": {"id": "a"}}),
            json!({"tracking": {"id": "b"}}),
        ]);
        let engine = NodeEngine::new(transport);

        let items = vec![
            params(json!({"identifierType": "id", "trackingId": "a"})),
            params(json!({"identifierType": "id", "trackingId": "b"})),
        ];
        let records = engine
            .execute(Resource::Tracking, "get", &items)
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("tracking"), Some(&json!({"id": "b"})));
        let endpoints: Vec<_> = engine
            .transport()
            .requests()
            .await
            .into_iter()
            .map(|r| r.endpoint)
            .collect();
        assert_eq!(endpoints, vec!["/trackings/a", "/trackings/b"]);
    }

    #[tokio::test]
    async fn test_stops_on_first_error() {
        let engine = NodeEngine::new(MockTransport::new());
        let items = vec![
            params(json!({"slug": "ups"})),
            params(json!({"identifierType": "id", "trackingId": "b"})),
        ];

        let err = engine
            .execute(Resource::Tracking, "get", &items)
            .await
            .unwrap_err();

        assert!(matches!(err, AfterShipError::InvalidIdentifier));
        assert!(engine.transport().requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_continue_on_fail_emits_error_records() {
        let transport = MockTransport::respond_with(json!({"tracking": {"id": "b"}}));
        let engine = NodeEngine::new(transport).with_continue_on_fail(true);
        let items = vec![
            params(json!({"slug": "ups"})),
            params(json!({"identifierType": "id", "trackingId": "b"})),
        ];

        let records = engine
            .execute(Resource::Tracking, "get", &items)
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].get("error"),
            Some(&json!(
                "Either trackingId or both slug and trackingNumber must be provided"
            ))
        );
        assert_eq!(records[0].get("paired_item"), Some(&json!(0)));
        assert_eq!(records[1].get("tracking"), Some(&json!({"id": "b"})));
    }

    #[tokio::test]
    async fn test_unknown_operation_is_rejected_up_front() {
        let engine = NodeEngine::new(MockTransport::new()).with_continue_on_fail(true);
        let result = engine
            .execute(Resource::Label, "refund", &[Parameters::default()])
            .await;

        assert!(matches!(
            result,
            Err(AfterShipError::UnsupportedOperation { .. })
        ));
    }
}
