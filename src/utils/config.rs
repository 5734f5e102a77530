/// Console configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the simulator backend API
    pub base_url: String,

    /// Timeout for message submissions (ms)
    pub request_timeout_ms: u64,

    /// Dashboard stats poll interval (ms)
    pub poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/v1".to_string(),
            request_timeout_ms: 30_000,
            poll_interval_ms: 5_000,
        }
    }
}

impl Config {
    /// Load defaults, honoring environment overrides
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("ISO_CONSOLE_API_URL") {
            let url = url.trim().trim_end_matches('/');
            if !url.is_empty() {
                config.base_url = url.to_string();
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://localhost:8080/api/v1");
        assert_eq!(config.request_timeout_ms, 30_000);
        assert_eq!(config.poll_interval_ms, 5_000);
    }
}
