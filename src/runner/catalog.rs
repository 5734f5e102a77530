use serde::Serialize;

/// Static test scenario entry. The catalog is read-only configuration; only
/// enabled scenarios can enter a run selection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestScenario {
    pub id: String,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub message_type: String,
}

impl TestScenario {
    pub fn new(id: &str, name: &str, description: &str, enabled: bool, message_type: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            enabled,
            message_type: message_type.to_string(),
        }
    }
}

/// Built-in scenario catalog, in execution order
pub fn builtin_catalog() -> Vec<TestScenario> {
    vec![
        TestScenario::new(
            "test-1",
            "Financial Request 0200 - Approved",
            "Exercises a successful financial transaction",
            true,
            "FINANCIAL_REQUEST_0200",
        ),
        TestScenario::new(
            "test-2",
            "Financial Request 0200 - Declined",
            "Transaction declined for insufficient funds",
            true,
            "FINANCIAL_REQUEST_0200",
        ),
        TestScenario::new(
            "test-3",
            "Reversal 0400 - Successful",
            "Reverses a previously submitted transaction",
            true,
            "REVERSAL_REQUEST_0400",
        ),
        TestScenario::new(
            "test-4",
            "Network Management 0800",
            "Network connectivity echo test",
            true,
            "NETWORK_REQUEST_0800",
        ),
        TestScenario::new(
            "test-5",
            "Timeout Test",
            "Connection timeout handling",
            false,
            "FINANCIAL_REQUEST_0200",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_unique() {
        let catalog = builtin_catalog();
        let mut ids: Vec<&str> = catalog.iter().map(|s| s.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn test_timeout_scenario_disabled() {
        let catalog = builtin_catalog();
        let timeout = catalog.iter().find(|s| s.id == "test-5").unwrap();
        assert!(!timeout.enabled);
    }
}
