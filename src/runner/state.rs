use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-scenario execution status. `Pending` is implicit (no record exists
/// yet); a record is born `Running` and moves exactly once to a terminal
/// state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Pending,
    Running,
    Passed,
    Failed,
    Skipped,
}

impl TestStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TestStatus::Passed | TestStatus::Failed | TestStatus::Skipped
        )
    }
}

/// Orchestrator-level state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    RunningBatch,
}

/// Live result record for one scenario within a run. Keyed by scenario id;
/// the orchestrator updates the record in place, never duplicates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub id: String,
    pub name: String,
    pub status: TestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl TestResult {
    /// A record is created the instant its scenario starts
    pub fn started(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            status: TestStatus::Running,
            duration_ms: None,
            message: None,
            timestamp: Utc::now(),
        }
    }

    pub fn pass(&mut self, duration_ms: u64, message: impl Into<String>) {
        self.finish(TestStatus::Passed, Some(duration_ms), message.into());
    }

    pub fn fail(&mut self, duration_ms: u64, message: impl Into<String>) {
        self.finish(TestStatus::Failed, Some(duration_ms), message.into());
    }

    pub fn skip(&mut self, message: impl Into<String>) {
        self.finish(TestStatus::Skipped, None, message.into());
    }

    fn finish(&mut self, status: TestStatus, duration_ms: Option<u64>, message: String) {
        // Terminal states are sticky for the run
        if self.status.is_terminal() {
            return;
        }
        self.status = status;
        self.duration_ms = duration_ms;
        self.message = Some(message);
    }
}

/// Derived counts over the live result list; recomputed on every call so
/// the view can never drift from the records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunSummary {
    pub fn from_results(results: &[TestResult]) -> Self {
        let mut summary = RunSummary {
            total: results.len(),
            ..Default::default()
        };
        for result in results {
            match result.status {
                TestStatus::Passed => summary.passed += 1,
                TestStatus::Failed => summary.failed += 1,
                TestStatus::Skipped => summary.skipped += 1,
                TestStatus::Pending | TestStatus::Running => {}
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_starts_running() {
        let result = TestResult::started("test-1", "Financial Request 0200 - Approved");
        assert_eq!(result.status, TestStatus::Running);
        assert!(result.duration_ms.is_none());
        assert!(result.message.is_none());
    }

    #[test]
    fn test_terminal_states_are_sticky() {
        let mut result = TestResult::started("test-1", "Approved");
        result.pass(1200, "Scenario executed successfully");
        result.fail(5, "late failure must not apply");
        result.skip("late skip must not apply");

        assert_eq!(result.status, TestStatus::Passed);
        assert_eq!(result.duration_ms, Some(1200));
        assert_eq!(result.message.as_deref(), Some("Scenario executed successfully"));
    }

    #[test]
    fn test_summary_counts_sum_to_total() {
        let mut a = TestResult::started("test-1", "a");
        a.pass(10, "ok");
        let mut b = TestResult::started("test-2", "b");
        b.fail(20, "nope");
        let mut c = TestResult::started("test-3", "c");
        c.skip("cancelled");
        let d = TestResult::started("test-4", "d");

        let results = vec![a, b, c, d];
        let summary = RunSummary::from_results(&results);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        // One record is still running: accounted for in total only
        assert_eq!(summary.passed + summary.failed + summary.skipped, 3);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&TestStatus::Skipped).unwrap();
        assert_eq!(json, r#""skipped""#);
    }
}
