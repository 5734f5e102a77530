pub mod types;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::error::ConsoleError;
use crate::runner::catalog::TestScenario;
use crate::utils::config::Config;
use types::{ErrorBody, MessageRequest, MessageResponse, MessageTemplate, SimulatorStats};

/// Request/response façade over the simulator backend. The ISO8583 engine
/// (encoding, bitmaps, switch sockets) lives server-side; the console only
/// ever speaks these shapes. Stateless from the caller's perspective, so it
/// is safe to share between the editor and the test runner.
#[async_trait]
pub trait SimulatorGateway: Send + Sync {
    /// Submit a message to the switch
    async fn send_message(&self, request: &MessageRequest) -> Result<MessageResponse, ConsoleError>;

    /// Have the backend generate a mock response without touching the switch
    async fn generate_mock(&self, request: &MessageRequest)
        -> Result<MessageResponse, ConsoleError>;

    /// Fetch the field template for a message type
    async fn fetch_template(&self, message_type: &str) -> Result<MessageTemplate, ConsoleError>;

    /// Fetch aggregate simulator stats (includes connection status)
    async fn fetch_stats(&self) -> Result<SimulatorStats, ConsoleError>;

    /// Fire a switch connection test; the result body is opaque
    async fn test_connection(&self) -> Result<(), ConsoleError>;

    /// Run one test scenario against the switch or its mock
    async fn run_scenario(&self, scenario: &TestScenario) -> Result<MessageResponse, ConsoleError>;
}

/// HTTP implementation of the gateway
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, String> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http.get(&url).send().await.map_err(|e| e.to_string())?;
        Self::decode(response).await
    }

    async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, String>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        Self::decode(response).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, String> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        Self::decode(response).await
    }

    /// Parse a success body, or extract the server's error message. Falls
    /// back to a status-derived message when the body has none.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, String> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(message);
        }
        response.json::<T>().await.map_err(|e| e.to_string())
    }
}

#[async_trait]
impl SimulatorGateway for ApiClient {
    async fn send_message(&self, request: &MessageRequest) -> Result<MessageResponse, ConsoleError> {
        self.post("/simulator/send", request)
            .await
            .map_err(ConsoleError::Submission)
    }

    async fn generate_mock(
        &self,
        request: &MessageRequest,
    ) -> Result<MessageResponse, ConsoleError> {
        self.post("/simulator/mock", request)
            .await
            .map_err(ConsoleError::Submission)
    }

    async fn fetch_template(&self, message_type: &str) -> Result<MessageTemplate, ConsoleError> {
        self.get(&format!("/simulator/message-template/{}", message_type))
            .await
            .map_err(ConsoleError::TemplateLoad)
    }

    async fn fetch_stats(&self) -> Result<SimulatorStats, ConsoleError> {
        self.get("/simulator/stats")
            .await
            .map_err(ConsoleError::Submission)
    }

    async fn test_connection(&self) -> Result<(), ConsoleError> {
        // The status payload is informational only; the follow-up stats
        // refresh carries the authoritative connection state.
        self.post_empty::<serde_json::Value>("/simulator/connection/test")
            .await
            .map(|_| ())
            .map_err(ConsoleError::Submission)
    }

    async fn run_scenario(&self, scenario: &TestScenario) -> Result<MessageResponse, ConsoleError> {
        self.post("/test/scenario", scenario)
            .await
            .map_err(ConsoleError::Submission)
    }
}
