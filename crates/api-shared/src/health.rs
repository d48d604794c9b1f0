use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health-check response.
///
/// `externalApiStatus` is present when the queue-assigner answered; `message` is present
/// when it did not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub status: String,
    #[serde(
        rename = "externalApiStatus",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub external_api_status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthRes {
    pub fn is_up(&self) -> bool {
        self.status == "up"
    }
}

/// Builds health responses for both the REST API and the CLI.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// The external queue-assigner answered with `external_status`.
    pub fn up(external_status: u16) -> HealthRes {
        HealthRes {
            status: "up".into(),
            external_api_status: Some(external_status),
            message: None,
        }
    }

    /// The external queue-assigner could not be reached or answered with an error.
    pub fn down() -> HealthRes {
        HealthRes {
            status: "down".into(),
            external_api_status: None,
            message: Some("External API is not responding".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn up_response_uses_camel_case_status_field() {
        let json = serde_json::to_value(HealthService::up(200)).unwrap();
        assert_eq!(json, serde_json::json!({"status": "up", "externalApiStatus": 200}));
    }

    #[test]
    fn down_response_carries_message_only() {
        let json = serde_json::to_value(HealthService::down()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "down", "message": "External API is not responding"})
        );
    }
}
