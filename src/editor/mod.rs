pub mod fields;

use std::fmt;
use std::sync::Arc;

use crate::api::types::{MessageRequest, MessageResponse};
use crate::api::SimulatorGateway;
use crate::error::ConsoleError;
use crate::report::{DraftArtifact, ResponseSummary, DRAFT_SCHEMA_VERSION};
use fields::FieldMap;

/// Message-type catalog. Template lookup is server-side; the console only
/// knows the enumerated identifiers and their display labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    FinancialRequest0200,
    ReversalRequest0400,
    NetworkRequest0800,
}

impl MessageType {
    pub const ALL: [MessageType; 3] = [
        MessageType::FinancialRequest0200,
        MessageType::ReversalRequest0400,
        MessageType::NetworkRequest0800,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::FinancialRequest0200 => "FINANCIAL_REQUEST_0200",
            MessageType::ReversalRequest0400 => "REVERSAL_REQUEST_0400",
            MessageType::NetworkRequest0800 => "NETWORK_REQUEST_0800",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MessageType::FinancialRequest0200 => "0200 - Financial Request",
            MessageType::ReversalRequest0400 => "0400 - Reversal Request",
            MessageType::NetworkRequest0800 => "0800 - Network Request",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|mt| mt.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Editable message draft plus submission mediation.
///
/// Owns the field mapping under construction and the most recent response;
/// nothing here is shared with the test runner.
pub struct MessageEditor {
    gateway: Arc<dyn SimulatorGateway>,
    message_type: Option<MessageType>,
    fields: FieldMap,
    busy: bool,
    last_response: Option<MessageResponse>,
    timeout_ms: u64,
}

impl MessageEditor {
    pub fn new(gateway: Arc<dyn SimulatorGateway>) -> Self {
        Self {
            gateway,
            message_type: None,
            fields: FieldMap::new(),
            busy: false,
            last_response: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn message_type(&self) -> Option<MessageType> {
        self.message_type
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub fn last_response(&self) -> Option<&MessageResponse> {
        self.last_response.as_ref()
    }

    /// Re-entrancy guard for drivers that poll between suspension points
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Choose the active message type and seed the draft from its template.
    /// The prior mapping is replaced wholesale. A failed template fetch is
    /// logged and leaves the mapping empty so the operator can compose
    /// fields manually.
    pub async fn select_message_type(&mut self, message_type: MessageType) {
        self.message_type = Some(message_type);
        self.fields.clear();

        match self.gateway.fetch_template(message_type.as_str()).await {
            Ok(template) => self.fields = template.fields,
            Err(e) => log::warn!("could not load template for {}: {}", message_type, e),
        }
    }

    /// Choose a type without template seeding; the draft starts empty.
    pub fn set_message_type(&mut self, message_type: MessageType) {
        self.message_type = Some(message_type);
        self.fields.clear();
    }

    /// Add a field with an empty value. Empty or duplicate numbers are a
    /// no-op; returns whether the draft changed.
    pub fn add_field(&mut self, number: &str) -> bool {
        self.fields.add(number)
    }

    /// Set a field value, creating the entry when absent
    pub fn update_field(&mut self, number: &str, value: &str) {
        self.fields.set(number, value);
    }

    /// Remove a field; no-op when absent
    pub fn remove_field(&mut self, number: &str) -> bool {
        self.fields.remove(number)
    }

    /// Drop the draft and the last response
    pub fn reset(&mut self) {
        self.message_type = None;
        self.fields.clear();
        self.last_response = None;
    }

    /// Submit the draft. Mock mode asks the backend to generate a response
    /// without touching the switch. The prior response is cleared when the
    /// attempt starts, not on failure.
    pub async fn submit(&mut self, mock_mode: bool) -> Result<&MessageResponse, ConsoleError> {
        if self.busy {
            return Err(ConsoleError::validation(
                "a submission is already in progress",
            ));
        }
        let message_type = self
            .message_type
            .ok_or_else(|| ConsoleError::validation("no message type selected"))?;

        self.busy = true;
        self.last_response = None;

        let request = MessageRequest {
            message_type: message_type.as_str().to_string(),
            fields: self.fields.clone(),
            mock_response: Some(mock_mode),
            timeout: Some(self.timeout_ms),
        };

        let result = if mock_mode {
            self.gateway.generate_mock(&request).await
        } else {
            self.gateway.send_message(&request).await
        };
        self.busy = false;

        let response = result?;
        Ok(&*self.last_response.insert(response))
    }

    /// Build the exportable draft artifact; pure, no I/O
    pub fn export_draft(&self) -> DraftArtifact {
        DraftArtifact {
            schema_version: DRAFT_SCHEMA_VERSION,
            message_type: self.message_type.map(|mt| mt.as_str().to_string()),
            fields: self.fields.clone(),
            response: self.last_response.as_ref().map(|r| ResponseSummary {
                success: r.success,
                response_code: r.response_code.clone(),
                response_time: r.response_time,
                timestamp: r.timestamp,
            }),
        }
    }
}
