use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use super::catalog::TestScenario;
use super::events::{EventEmitter, RunEvent};
use super::executor::ScenarioExecutor;
use super::state::{RunState, RunSummary, TestResult, TestStatus};

const CANCEL_MESSAGE: &str = "Test cancelled by user";

/// Handle for requesting cancellation from outside the run loop (e.g. a
/// Ctrl+C handler). Cancellation is advisory for in-flight work and
/// authoritative for scheduling: the in-flight call is never aborted, but
/// nothing new starts after the flag is raised.
#[derive(Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs a selected subset of catalog scenarios strictly sequentially,
/// tracking one live result record per started scenario. Sequential by
/// design: the switch connection is a single non-multiplexed channel, so
/// the next scenario never starts before the previous one is terminal.
pub struct TestOrchestrator {
    catalog: Vec<TestScenario>,
    selection: Vec<String>,
    results: Vec<TestResult>,
    state: RunState,
    stop: Arc<AtomicBool>,
    emitter: EventEmitter,
    run_id: Option<String>,
}

impl TestOrchestrator {
    pub fn new(catalog: Vec<TestScenario>) -> Self {
        Self {
            catalog,
            selection: Vec::new(),
            results: Vec::new(),
            state: RunState::Idle,
            stop: Arc::new(AtomicBool::new(false)),
            emitter: EventEmitter::default(),
            run_id: None,
        }
    }

    /// Id of the most recent run, if any
    pub fn run_id(&self) -> Option<&str> {
        self.run_id.as_deref()
    }

    pub fn catalog(&self) -> &[TestScenario] {
        &self.catalog
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::RunningBatch
    }

    /// Derived counts, recomputed from the live result list
    pub fn summary(&self) -> RunSummary {
        RunSummary::from_results(&self.results)
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<RunEvent> {
        self.emitter.subscribe()
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(self.stop.clone())
    }

    /// Toggle a scenario in or out of the selection. Disabled or unknown
    /// scenarios never enter the set; returns whether the selection changed.
    pub fn toggle_selection(&mut self, scenario_id: &str) -> bool {
        let selectable = self
            .catalog
            .iter()
            .any(|s| s.id == scenario_id && s.enabled);
        if !selectable {
            return false;
        }

        if let Some(pos) = self.selection.iter().position(|id| id == scenario_id) {
            self.selection.remove(pos);
        } else {
            self.selection.push(scenario_id.to_string());
        }
        true
    }

    pub fn select_all(&mut self) {
        self.selection = self
            .catalog
            .iter()
            .filter(|s| s.enabled)
            .map(|s| s.id.clone())
            .collect();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Request cancellation of the current batch. The record currently
    /// `running` is closed out as skipped; scenarios not yet started never
    /// acquire a record.
    pub fn stop(&mut self) {
        if self.state != RunState::RunningBatch {
            return;
        }
        self.stop.store(true, Ordering::SeqCst);
        self.state = RunState::Idle;
        for result in &mut self.results {
            if result.status == TestStatus::Running {
                result.skip(CANCEL_MESSAGE);
                self.emitter.emit(RunEvent::ScenarioSkipped {
                    id: result.id.clone(),
                    reason: CANCEL_MESSAGE.to_string(),
                });
            }
        }
    }

    /// Execute the selected scenarios in catalog order. Clears the previous
    /// run's results, appends a `running` record per started scenario and
    /// updates that record in place as the scenario completes. Executor
    /// failures are recorded as `failed`; they never abort the batch.
    pub async fn run_selected(&mut self, executor: &dyn ScenarioExecutor) -> Result<RunSummary> {
        if self.state == RunState::RunningBatch {
            anyhow::bail!("a test run is already in progress");
        }
        if self.selection.is_empty() {
            anyhow::bail!("no scenarios selected");
        }

        self.stop.store(false, Ordering::SeqCst);
        self.results.clear();
        self.state = RunState::RunningBatch;

        let queue: Vec<TestScenario> = self
            .catalog
            .iter()
            .filter(|s| s.enabled && self.selection.iter().any(|id| id == &s.id))
            .cloned()
            .collect();

        let run_id = Uuid::new_v4().to_string();
        self.run_id = Some(run_id.clone());
        self.emitter.emit(RunEvent::RunStarted {
            run_id,
            total: queue.len(),
        });

        for scenario in &queue {
            if self.stop.load(Ordering::SeqCst) {
                break;
            }

            self.results
                .push(TestResult::started(&scenario.id, &scenario.name));
            self.emitter.emit(RunEvent::ScenarioStarted {
                id: scenario.id.clone(),
                name: scenario.name.clone(),
            });

            let started = Instant::now();
            let outcome = executor.execute(scenario).await;

            if self.stop.load(Ordering::SeqCst) {
                // Stop arrived while the call was in flight: the outcome is
                // discarded and the record closed out as skipped. stop()
                // may already have done both; skip() is sticky either way.
                if let Some(result) = self.result_mut(&scenario.id) {
                    result.skip(CANCEL_MESSAGE);
                }
                self.emitter.emit(RunEvent::ScenarioSkipped {
                    id: scenario.id.clone(),
                    reason: CANCEL_MESSAGE.to_string(),
                });
                break;
            }

            let event = match outcome {
                Ok(outcome) => {
                    let duration_ms = outcome.duration_ms;
                    if let Some(result) = self.result_mut(&scenario.id) {
                        if outcome.success {
                            result.pass(duration_ms, outcome.message.clone());
                        } else {
                            result.fail(duration_ms, outcome.message.clone());
                        }
                    }
                    if outcome.success {
                        RunEvent::ScenarioPassed {
                            id: scenario.id.clone(),
                            duration_ms,
                        }
                    } else {
                        RunEvent::ScenarioFailed {
                            id: scenario.id.clone(),
                            duration_ms,
                            error: outcome.message,
                        }
                    }
                }
                Err(e) => {
                    let duration_ms = started.elapsed().as_millis() as u64;
                    let error = e.to_string();
                    if let Some(result) = self.result_mut(&scenario.id) {
                        result.fail(duration_ms, error.clone());
                    }
                    RunEvent::ScenarioFailed {
                        id: scenario.id.clone(),
                        duration_ms,
                        error,
                    }
                }
            };
            self.emitter.emit(event);
        }

        self.state = RunState::Idle;
        let summary = self.summary();
        self.emitter.emit(RunEvent::RunFinished { summary });
        Ok(summary)
    }

    fn result_mut(&mut self, id: &str) -> Option<&mut TestResult> {
        self.results.iter_mut().find(|r| r.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::catalog::builtin_catalog;
    use crate::runner::executor::ScenarioOutcome;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    /// Scripted executor: pass/fail by scenario id, with optional hooks
    struct ScriptedExecutor {
        fail_ids: Vec<&'static str>,
        error_ids: Vec<&'static str>,
        calls: AtomicUsize,
        stop_on_first: Option<StopHandle>,
    }

    impl ScriptedExecutor {
        fn passing() -> Self {
            Self {
                fail_ids: Vec::new(),
                error_ids: Vec::new(),
                calls: AtomicUsize::new(0),
                stop_on_first: None,
            }
        }

        fn failing(ids: Vec<&'static str>) -> Self {
            Self {
                fail_ids: ids,
                ..Self::passing()
            }
        }

        fn erroring(ids: Vec<&'static str>) -> Self {
            Self {
                error_ids: ids,
                ..Self::passing()
            }
        }

        /// Raises the stop flag during the first execution, modeling a
        /// cancellation that lands while a call is in flight
        fn stopping_on_first(handle: StopHandle) -> Self {
            Self {
                stop_on_first: Some(handle),
                ..Self::passing()
            }
        }
    }

    #[async_trait]
    impl ScenarioExecutor for ScriptedExecutor {
        async fn execute(&self, scenario: &TestScenario) -> Result<ScenarioOutcome> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call == 0 {
                if let Some(handle) = &self.stop_on_first {
                    handle.stop();
                }
            }
            if self.error_ids.contains(&scenario.id.as_str()) {
                anyhow::bail!("executor crashed");
            }
            Ok(ScenarioOutcome {
                success: !self.fail_ids.contains(&scenario.id.as_str()),
                duration_ms: 10,
                message: "scripted".to_string(),
            })
        }
    }

    #[test]
    fn test_selection_toggle_is_idempotent_pairwise() {
        let mut orchestrator = TestOrchestrator::new(builtin_catalog());
        assert!(orchestrator.toggle_selection("test-1"));
        assert_eq!(orchestrator.selection(), ["test-1"]);
        assert!(orchestrator.toggle_selection("test-1"));
        assert!(orchestrator.selection().is_empty());
    }

    #[test]
    fn test_disabled_scenarios_cannot_be_selected() {
        let mut orchestrator = TestOrchestrator::new(builtin_catalog());
        assert!(!orchestrator.toggle_selection("test-5"));
        assert!(!orchestrator.toggle_selection("no-such-id"));
        assert!(orchestrator.selection().is_empty());
    }

    #[test]
    fn test_select_all_takes_enabled_only() {
        let mut orchestrator = TestOrchestrator::new(builtin_catalog());
        orchestrator.select_all();
        assert_eq!(
            orchestrator.selection(),
            ["test-1", "test-2", "test-3", "test-4"]
        );
        orchestrator.clear_selection();
        assert!(orchestrator.selection().is_empty());
    }

    #[tokio::test]
    async fn test_run_selected_in_catalog_order() {
        let mut orchestrator = TestOrchestrator::new(builtin_catalog());
        // Select out of catalog order on purpose
        orchestrator.toggle_selection("test-3");
        orchestrator.toggle_selection("test-1");

        let executor = ScriptedExecutor::passing();
        let summary = orchestrator.run_selected(&executor).await.unwrap();

        let ids: Vec<&str> = orchestrator.results().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["test-1", "test-3"]);
        assert!(orchestrator
            .results()
            .iter()
            .all(|r| r.status.is_terminal()));
        assert_eq!(summary.total, 2);
        assert_eq!(summary.passed, 2);
        assert_eq!(orchestrator.state(), RunState::Idle);
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_batch() {
        let mut orchestrator = TestOrchestrator::new(builtin_catalog());
        orchestrator.toggle_selection("test-1");
        orchestrator.toggle_selection("test-2");
        orchestrator.toggle_selection("test-3");

        let executor = ScriptedExecutor::failing(vec!["test-2"]);
        let summary = orchestrator.run_selected(&executor).await.unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        let failed = &orchestrator.results()[1];
        assert_eq!(failed.id, "test-2");
        assert_eq!(failed.status, TestStatus::Failed);
    }

    #[tokio::test]
    async fn test_executor_error_recorded_as_failed() {
        let mut orchestrator = TestOrchestrator::new(builtin_catalog());
        orchestrator.toggle_selection("test-1");
        orchestrator.toggle_selection("test-2");

        let executor = ScriptedExecutor::erroring(vec!["test-1"]);
        let summary = orchestrator.run_selected(&executor).await.unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.passed, 1);
        let errored = &orchestrator.results()[0];
        assert_eq!(errored.status, TestStatus::Failed);
        assert_eq!(errored.message.as_deref(), Some("executor crashed"));
    }

    #[tokio::test]
    async fn test_stop_skips_running_and_schedules_nothing_further() {
        let mut orchestrator = TestOrchestrator::new(builtin_catalog());
        orchestrator.toggle_selection("test-1");
        orchestrator.toggle_selection("test-2");
        orchestrator.toggle_selection("test-3");

        let executor = ScriptedExecutor::stopping_on_first(orchestrator.stop_handle());
        let summary = orchestrator.run_selected(&executor).await.unwrap();

        // Only the first scenario ever started; its record is skipped and
        // the remaining two stay implicitly pending (no record at all)
        assert_eq!(orchestrator.results().len(), 1);
        assert_eq!(orchestrator.results()[0].status, TestStatus::Skipped);
        assert_eq!(
            orchestrator.results()[0].message.as_deref(),
            Some(CANCEL_MESSAGE)
        );
        assert_eq!(summary.total, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(orchestrator.state(), RunState::Idle);
        assert_eq!(executor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_run_requires_selection() {
        let mut orchestrator = TestOrchestrator::new(builtin_catalog());
        let executor = ScriptedExecutor::passing();
        assert!(orchestrator.run_selected(&executor).await.is_err());
    }

    #[tokio::test]
    async fn test_rerun_clears_previous_results() {
        let mut orchestrator = TestOrchestrator::new(builtin_catalog());
        orchestrator.toggle_selection("test-1");

        let executor = ScriptedExecutor::passing();
        orchestrator.run_selected(&executor).await.unwrap();
        assert_eq!(orchestrator.results().len(), 1);

        orchestrator.toggle_selection("test-4");
        let executor = ScriptedExecutor::passing();
        orchestrator.run_selected(&executor).await.unwrap();

        let ids: Vec<&str> = orchestrator.results().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["test-1", "test-4"]);
        // One record per scenario id, updated in place
        assert_eq!(orchestrator.summary().total, 2);
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let mut orchestrator = TestOrchestrator::new(builtin_catalog());
        orchestrator.stop();
        assert_eq!(orchestrator.state(), RunState::Idle);
        assert!(!orchestrator.stop_handle().is_stopped());
    }
}
