/// Dropdown state machine: a selected value plus an open flag. Owned by the
/// caller and passed explicitly to whatever renders it; there is no ambient
/// context to look it up from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectState {
    value: Option<String>,
    open: bool,
}

impl SelectState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// Selecting a value also closes the list
    pub fn select(&mut self, value: impl Into<String>) {
        self.value = Some(value.into());
        self.open = false;
    }

    pub fn clear(&mut self) {
        self.value = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_closed_and_empty() {
        let select = SelectState::new();
        assert!(!select.is_open());
        assert!(select.value().is_none());
    }

    #[test]
    fn test_select_sets_value_and_closes() {
        let mut select = SelectState::new();
        select.open();
        assert!(select.is_open());

        select.select("FINANCIAL_REQUEST_0200");
        assert_eq!(select.value(), Some("FINANCIAL_REQUEST_0200"));
        assert!(!select.is_open());
    }

    #[test]
    fn test_toggle_keeps_value() {
        let mut select = SelectState::new();
        select.select("NETWORK_REQUEST_0800");
        select.toggle();
        assert!(select.is_open());
        select.toggle();
        assert!(!select.is_open());
        assert_eq!(select.value(), Some("NETWORK_REQUEST_0800"));
    }

    #[test]
    fn test_reselect_replaces_value() {
        let mut select = SelectState::new();
        select.select("FINANCIAL_REQUEST_0200");
        select.open();
        select.select("REVERSAL_REQUEST_0400");
        assert_eq!(select.value(), Some("REVERSAL_REQUEST_0400"));

        select.clear();
        assert!(select.value().is_none());
    }
}
