//! Application-level configuration: constants, log filter, backend endpoint.

/// Application-level constants
pub const APP_NAME: &str = "Slotboard";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable overriding the clinic backend base URL.
pub const BACKEND_URL_ENV: &str = "SLOTBOARD_BACKEND_URL";

/// Default clinic backend base URL (local development gateway).
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:4000";

/// Per-request timeout for backend calls (seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Default `RUST_LOG`-style filter when the environment does not set one.
pub fn default_log_filter() -> String {
    format!("info,{}=debug", "slotboard_lib")
}

/// Clinic backend base URL: environment override, else the local default.
pub fn backend_url() -> String {
    std::env::var(BACKEND_URL_ENV).unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_is_slotboard() {
        assert_eq!(APP_NAME, "Slotboard");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.3.0");
    }

    #[test]
    fn default_filter_enables_crate_debug() {
        let filter = default_log_filter();
        assert!(filter.contains("slotboard_lib=debug"));
    }

    #[test]
    fn backend_url_has_scheme() {
        assert!(backend_url().starts_with("http"));
    }
}
