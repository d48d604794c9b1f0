//! Client for the external queue-assigner service.
//!
//! The queue-assigner owns priority scores, queue ordering and wait-time estimates.
//! This module only speaks its HTTP contract:
//!
//! | Call | Endpoint |
//! |---|---|
//! | [`QueueAssigner::probe`] | `GET /` |
//! | [`QueueAssigner::queue`] | `GET /queue/` |
//! | [`QueueAssigner::predict`] | `POST /predict/` |
//! | [`QueueAssigner::next`] | `GET /queue/next/` |
//! | [`QueueAssigner::update_priorities`] | `POST /queue/update-priorities/` |
//!
//! No call is ever retried here. Every request is bounded by the configured timeout.

use crate::constants::{PREDICT_PATH, QUEUE_NEXT_PATH, QUEUE_PATH, UPDATE_PRIORITIES_PATH};
use crate::prediction::PredictionRequest;
use crate::{CoreConfig, KioskError, KioskResult};
use api_shared::QueueEntry;
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde_json::Value;

/// Longest upstream error body echoed back in an error message.
const MAX_ERROR_BODY: usize = 200;

/// Operations offered by the external queue-assigner.
#[async_trait]
pub trait QueueAssigner: Send + Sync {
    /// Checks the service answers; returns its HTTP status code.
    async fn probe(&self) -> KioskResult<u16>;

    /// The current queue, in the service's order.
    async fn queue(&self) -> KioskResult<Vec<QueueEntry>>;

    /// Submits vital signs; the service enqueues the patient. Returns the raw prediction.
    async fn predict(&self, request: &PredictionRequest) -> KioskResult<Value>;

    /// Dequeues the next patient. `None` when the service reports nothing to call.
    async fn next(&self) -> KioskResult<Option<QueueEntry>>;

    /// Asks the service to recompute priorities of waiting patients.
    async fn update_priorities(&self) -> KioskResult<()>;
}

/// [`QueueAssigner`] over HTTP with `reqwest`.
#[derive(Clone, Debug)]
pub struct HttpQueueAssigner {
    client: Client,
    base: Url,
}

impl HttpQueueAssigner {
    /// Builds a client bounded by the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns `KioskError::Config` if the HTTP client cannot be constructed.
    pub fn new(cfg: &CoreConfig) -> KioskResult<Self> {
        let client = Client::builder()
            .timeout(cfg.http_timeout())
            .build()
            .map_err(|e| KioskError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base: cfg.queue_assigner_url().clone(),
        })
    }

    /// The URL probed by [`QueueAssigner::probe`].
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> KioskResult<Url> {
        self.base
            .join(path)
            .map_err(|e| KioskError::Config(format!("invalid endpoint {path}: {e}")))
    }
}

#[async_trait]
impl QueueAssigner for HttpQueueAssigner {
    async fn probe(&self) -> KioskResult<u16> {
        let response = self.client.get(self.base.clone()).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.status().as_u16())
    }

    async fn queue(&self) -> KioskResult<Vec<QueueEntry>> {
        let response = self.client.get(self.endpoint(QUEUE_PATH)?).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<Vec<QueueEntry>>().await?)
    }

    async fn predict(&self, request: &PredictionRequest) -> KioskResult<Value> {
        let response = self
            .client
            .post(self.endpoint(PREDICT_PATH)?)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(request)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<Value>().await?)
    }

    async fn next(&self) -> KioskResult<Option<QueueEntry>> {
        let response = self
            .client
            .get(self.endpoint(QUEUE_NEXT_PATH)?)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let body = response.json::<Value>().await?;
        Ok(entry_from_body(body))
    }

    async fn update_priorities(&self) -> KioskResult<()> {
        let response = self
            .client
            .post(self.endpoint(UPDATE_PRIORITIES_PATH)?)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

/// Interprets a body that may or may not describe a patient.
///
/// Bodies without a string `patient_id` (for example `{"message": "Queue is empty"}`)
/// yield `None`. Other fields are never type-checked, so a dequeued patient is always
/// recovered from the body.
pub fn entry_from_body(body: Value) -> Option<QueueEntry> {
    let Value::Object(mut fields) = body else {
        return None;
    };
    match fields.remove("patient_id") {
        Some(Value::String(patient_id)) => Some(QueueEntry { patient_id, fields }),
        _ => None,
    }
}

async fn ensure_success(response: Response) -> KioskResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(KioskError::UpstreamStatus {
        status: status.as_u16(),
        message: error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string()),
    })
}

/// Picks a human-readable message out of an upstream error body.
///
/// Understands `{"message": ...}` and `{"detail": ...}` bodies and falls back to a
/// truncated plain-text body.
fn error_message(body: &str) -> Option<String> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["message", "detail"] {
            if let Some(Value::String(text)) = map.get(key) {
                return Some(text.clone());
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_ERROR_BODY).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entry_from_body_requires_string_patient_id() {
        let entry =
            entry_from_body(json!({"patient_id": "abc123", "priority_score": 3.2})).unwrap();
        assert_eq!(entry.patient_id, "abc123");
        assert_eq!(entry.number("priority_score"), Some(3.2));

        assert!(entry_from_body(json!({"message": "Queue is empty"})).is_none());
        assert!(entry_from_body(json!(null)).is_none());
        assert!(entry_from_body(json!({"patient_id": null})).is_none());
        assert!(entry_from_body(json!({"patient_id": 7})).is_none());
    }

    #[test]
    fn entry_from_body_accepts_any_type_for_uninterpreted_fields() {
        let entry = entry_from_body(json!({
            "patient_id": "abc123",
            "timestamp": 1714557600.5,
            "queue_position": 1.0
        }))
        .unwrap();
        assert_eq!(entry.patient_id, "abc123");
        assert_eq!(entry.fields["timestamp"], json!(1714557600.5));

        let entry = entry_from_body(json!({"patient_id": "a", "queue_position": "first"})).unwrap();
        assert_eq!(entry.fields["queue_position"], "first");
    }

    #[test]
    fn error_message_prefers_structured_fields() {
        assert_eq!(
            error_message(r#"{"detail": "Queue is empty"}"#).as_deref(),
            Some("Queue is empty")
        );
        assert_eq!(
            error_message(r#"{"message": "nope", "detail": "other"}"#).as_deref(),
            Some("nope")
        );
        assert_eq!(error_message("  Bad Gateway \n").as_deref(), Some("Bad Gateway"));
        assert_eq!(error_message(""), None);
        assert_eq!(error_message(&"x".repeat(500)).map(|m| m.len()), Some(200));
    }
}
