use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::catalog::TestScenario;
use crate::api::SimulatorGateway;

/// Outcome of one scenario execution
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub success: bool,
    pub duration_ms: u64,
    pub message: String,
}

/// Boundary to whatever actually runs a scenario against the switch or its
/// mock. Real and simulated executors honor the same contract: one outcome
/// per scenario, with an elapsed-time measurement.
#[async_trait]
pub trait ScenarioExecutor: Send + Sync {
    async fn execute(&self, scenario: &TestScenario) -> Result<ScenarioOutcome>;
}

/// Runs scenarios through the backend's test endpoint
pub struct RemoteExecutor {
    gateway: Arc<dyn SimulatorGateway>,
}

impl RemoteExecutor {
    pub fn new(gateway: Arc<dyn SimulatorGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl ScenarioExecutor for RemoteExecutor {
    async fn execute(&self, scenario: &TestScenario) -> Result<ScenarioOutcome> {
        let started = Instant::now();
        let response = self.gateway.run_scenario(scenario).await?;

        // Prefer the backend's measurement when it reports one
        let duration_ms = response
            .response_time
            .unwrap_or_else(|| started.elapsed().as_millis() as u64);
        let message = if response.success {
            "Scenario executed successfully".to_string()
        } else {
            response
                .error_message
                .unwrap_or_else(|| "Unexpected response from authorizer".to_string())
        };

        Ok(ScenarioOutcome {
            success: response.success,
            duration_ms,
            message,
        })
    }
}

/// Local stand-in used when no backend is reachable: 2-5s latency with an
/// 80% pass rate.
pub struct SimulatedExecutor;

#[async_trait]
impl ScenarioExecutor for SimulatedExecutor {
    async fn execute(&self, _scenario: &TestScenario) -> Result<ScenarioOutcome> {
        let started = Instant::now();
        let (delay_ms, success) = {
            let mut rng = rand::thread_rng();
            (rng.gen_range(2_000..5_000u64), rng.gen_bool(0.8))
        };
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;

        let message = if success {
            "Scenario executed successfully".to_string()
        } else {
            "Error: unexpected response from authorizer".to_string()
        };

        Ok(ScenarioOutcome {
            success,
            duration_ms: started.elapsed().as_millis() as u64,
            message,
        })
    }
}
