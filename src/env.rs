//! Environment variable names used by this crate for convenient
//! configuration from services.
//!
//! These are purely helpers; the handler and layer types remain decoupled
//! from environment access.

/// Destination URL payloads are POSTed to.
pub const RESTAPI_LOG_ENDPOINT_ENV: &str = "RESTAPI_LOG_ENDPOINT";

/// Minimum level shipped to the endpoint (`trace` .. `error`).
pub const RESTAPI_LOG_LEVEL_ENV: &str = "RESTAPI_LOG_LEVEL";

/// `true`/`false`: also print events to stdout.
pub const RESTAPI_LOG_STDOUT_ENV: &str = "RESTAPI_LOG_STDOUT";

/// `Content-Type` header of posted payloads.
pub const RESTAPI_LOG_CONTENT_TYPE_ENV: &str = "RESTAPI_LOG_CONTENT_TYPE";

/// Whole-request timeout of the HTTP client, in milliseconds.
pub const RESTAPI_LOG_TIMEOUT_MS_ENV: &str = "RESTAPI_LOG_TIMEOUT_MS";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a boolean flag value, `None` if it is not a recognised spelling.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
