use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Environment-driven configuration.
///
/// `RECONCILE_DELAY_MS` is the pause between a confirmed optimistic cart
/// mutation and the authoritative reload; it is deliberately tunable to
/// whatever the backend's recompute latency turns out to be.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub request_timeout: Duration,
    pub reconcile_delay: Duration,
    pub session_path: PathBuf,
}

const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_RECONCILE_DELAY_MS: u64 = 500;

impl Config {
    pub fn from_env() -> Self {
        let base_url =
            env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8000/api".to_string());
        let request_timeout = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .map(|v| v.parse().expect("REQUEST_TIMEOUT_SECS must be a number"))
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let reconcile_delay = env::var("RECONCILE_DELAY_MS")
            .ok()
            .map(|v| v.parse().expect("RECONCILE_DELAY_MS must be a number"))
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(DEFAULT_RECONCILE_DELAY_MS));
        let session_path = env::var("SESSION_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".storefront-session.json"));

        Config {
            base_url,
            request_timeout,
            reconcile_delay,
            session_path,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: "http://localhost:8000/api".to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            reconcile_delay: Duration::from_millis(DEFAULT_RECONCILE_DELAY_MS),
            session_path: PathBuf::from(".storefront-session.json"),
        }
    }
}
