use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::editor::fields::FieldMap;

/// Outbound message submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest {
    pub message_type: String,
    pub fields: FieldMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mock_response: Option<bool>,
    /// Switch response timeout in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// Result of a message submission or scenario run. Immutable once received;
/// a new submission replaces the prior one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_mti: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_mti: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_fields: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_fields: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_code: Option<String>,
    /// Round-trip time in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    pub timestamp: DateTime<Utc>,
}

/// Server-side field template for one message type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageTemplate {
    pub message_type: String,
    #[serde(default)]
    pub fields: FieldMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Switch connection status, embedded in the stats payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub connected: bool,
    pub host: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checked: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate simulator counters, polled by the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatorStats {
    pub total_messages_sent: u64,
    pub successful_responses: u64,
    pub failed_responses: u64,
    pub average_response_time: f64,
    pub connection_status: ConnectionStatus,
}

impl SimulatorStats {
    /// Percentage of successful responses, 0 when nothing was sent yet
    pub fn success_rate(&self) -> u64 {
        if self.total_messages_sent == 0 {
            return 0;
        }
        (self.successful_responses * 100 + self.total_messages_sent / 2) / self.total_messages_sent
    }
}

/// Error body shape the backend uses for non-2xx responses
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
