//! Client configuration.
//!
//! Defaults suit a backend running locally; every value can be overridden
//! from the environment or with the `with_*` builders.

use std::time::Duration;

use crate::client::DEFAULT_BASE_URL;
use crate::dispatcher::PartialAnswerPolicy;
use crate::health::{DEFAULT_BOUND, DEFAULT_INTERVAL};

/// Primary base URL override.
pub const ENV_API_URL: &str = "CLEARPATH_API_URL";
/// Base URL fallback shared with the web frontend.
pub const ENV_API_URL_FALLBACK: &str = "NEXT_PUBLIC_API_URL";
pub const ENV_HEALTH_INTERVAL: &str = "CLEARPATH_HEALTH_INTERVAL_SECS";
pub const ENV_HEALTH_BOUND: &str = "CLEARPATH_HEALTH_BOUND_SECS";
pub const ENV_REQUEST_TIMEOUT: &str = "CLEARPATH_REQUEST_TIMEOUT_SECS";
/// Any value keeps partial answers when a stream ends without finishing.
pub const ENV_KEEP_PARTIAL: &str = "CLEARPATH_KEEP_PARTIAL";

/// Configuration for the query client, session and health monitor.
///
/// # Example
///
/// ```ignore
/// use clearpath::config::ClientConfig;
///
/// let config = ClientConfig::from_env()
///     .with_health_interval(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// API base URL, without a trailing slash
    pub base_url: String,
    /// Time between liveness probes (default: 5s)
    pub health_interval: Duration,
    /// Total liveness polling lifetime (default: 60s)
    pub health_bound: Duration,
    /// Timeout for non-streaming requests. The query stream is never timed out.
    pub request_timeout: Option<Duration>,
    /// What to do with streamed text when a stream ends without finishing
    pub partial_answers: PartialAnswerPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            health_interval: DEFAULT_INTERVAL,
            health_bound: DEFAULT_BOUND,
            request_timeout: None,
            partial_answers: PartialAnswerPolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API base URL. A trailing `/` is dropped.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_health_interval(mut self, interval: Duration) -> Self {
        self.health_interval = interval;
        self
    }

    pub fn with_health_bound(mut self, bound: Duration) -> Self {
        self.health_bound = bound;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_partial_answers(mut self, policy: PartialAnswerPolicy) -> Self {
        self.partial_answers = policy;
        self
    }

    /// Build a config from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    ///
    /// Blank values are treated as unset. Durations are whole seconds;
    /// unparseable or zero values are ignored with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = var(ENV_API_URL).or_else(|| var(ENV_API_URL_FALLBACK)) {
            config = config.with_base_url(url.trim());
        }
        let secs = |key: &str| var(key).and_then(|v| parse_secs(key, &v));

        if let Some(interval) = secs(ENV_HEALTH_INTERVAL) {
            config = config.with_health_interval(interval);
        }
        if let Some(bound) = secs(ENV_HEALTH_BOUND) {
            config = config.with_health_bound(bound);
        }
        if let Some(timeout) = secs(ENV_REQUEST_TIMEOUT) {
            config = config.with_request_timeout(timeout);
        }
        if var(ENV_KEEP_PARTIAL).is_some() {
            config = config.with_partial_answers(PartialAnswerPolicy::Keep);
        }

        config
    }
}

fn parse_secs(key: &str, value: &str) -> Option<Duration> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => {
            tracing::warn!("Ignoring invalid {}={:?}", key, value);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.health_interval, Duration::from_secs(5));
        assert_eq!(config.health_bound, Duration::from_secs(60));
        assert!(config.request_timeout.is_none());
        assert_eq!(config.partial_answers, PartialAnswerPolicy::Discard);
    }

    #[test]
    fn test_empty_environment_is_default() {
        assert_eq!(ClientConfig::from_lookup(lookup(&[])), ClientConfig::default());
    }

    #[test]
    fn test_primary_url_wins_over_fallback() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_API_URL, "https://api.example.com/"),
            (ENV_API_URL_FALLBACK, "http://ignored"),
        ]));
        assert_eq!(config.base_url, "https://api.example.com");
    }

    #[test]
    fn test_fallback_url_used_when_primary_blank() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_API_URL, "  "),
            (ENV_API_URL_FALLBACK, "http://frontend-api:8000"),
        ]));
        assert_eq!(config.base_url, "http://frontend-api:8000");
    }

    #[test]
    fn test_durations_and_flags() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_HEALTH_INTERVAL, "2"),
            (ENV_HEALTH_BOUND, "30"),
            (ENV_REQUEST_TIMEOUT, "15"),
            (ENV_KEEP_PARTIAL, "1"),
        ]));
        assert_eq!(config.health_interval, Duration::from_secs(2));
        assert_eq!(config.health_bound, Duration::from_secs(30));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.partial_answers, PartialAnswerPolicy::Keep);
    }

    #[test]
    fn test_invalid_durations_are_ignored() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_HEALTH_INTERVAL, "soon"),
            (ENV_HEALTH_BOUND, "0"),
        ]));
        assert_eq!(config.health_interval, DEFAULT_INTERVAL);
        assert_eq!(config.health_bound, DEFAULT_BOUND);
    }
}
