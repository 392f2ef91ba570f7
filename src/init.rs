use crate::env::{
    parse_flag, RESTAPI_LOG_CONTENT_TYPE_ENV, RESTAPI_LOG_LEVEL_ENV, RESTAPI_LOG_STDOUT_ENV,
    RESTAPI_LOG_TIMEOUT_MS_ENV,
};
use crate::error::InitError;
use crate::handler::RestApiHandler;
use crate::layer::RestApiLayer;
use crate::sink::JSON_CONTENT_TYPE;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the logging layer.
///
/// **Fields**
/// - `min_level`: least severe level that is shipped to the endpoint.
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is
///   stacked next to [`RestApiLayer`] so events are also printed.
/// - `content_type`: `Content-Type` header of posted payloads.
/// - `timeout`: whole-request timeout enforced by the HTTP client.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub min_level: Level,
    pub enable_stdout: bool,
    pub content_type: String,
    pub timeout: Option<Duration>,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            min_level: Level::INFO,
            enable_stdout: true,
            content_type: JSON_CONTENT_TYPE.to_string(),
            timeout: Some(Duration::from_secs(5)),
        }
    }
}

impl LayerConfig {
    /// Build a config from the `RESTAPI_LOG_*` environment variables, using
    /// [`LayerConfig::default`] for anything unset. Set but unparsable values
    /// are errors.
    pub fn from_env() -> Result<Self, InitError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, InitError> {
        let mut config = Self::default();

        if let Some(level) = lookup(RESTAPI_LOG_LEVEL_ENV) {
            config.min_level = level
                .trim()
                .parse::<Level>()
                .map_err(|_| InitError::InvalidLevel(level.clone()))?;
        }
        if let Some(flag) = lookup(RESTAPI_LOG_STDOUT_ENV) {
            config.enable_stdout = parse_flag(&flag).ok_or(InitError::InvalidValue {
                key: RESTAPI_LOG_STDOUT_ENV,
                value: flag.clone(),
            })?;
        }
        if let Some(content_type) = lookup(RESTAPI_LOG_CONTENT_TYPE_ENV) {
            config.content_type = content_type;
        }
        if let Some(ms) = lookup(RESTAPI_LOG_TIMEOUT_MS_ENV) {
            let ms = ms.trim().parse::<u64>().map_err(|_| InitError::InvalidValue {
                key: RESTAPI_LOG_TIMEOUT_MS_ENV,
                value: ms.clone(),
            })?;
            // 0 disables the client-side timeout.
            config.timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }

        Ok(config)
    }
}

/// Install a global `tracing` subscriber that ships events through
/// `handler`.
///
/// **Parameters**
/// - `handler`: a ready [`RestApiHandler`]; its sink decides how payloads
///   travel.
/// - `config`: [`LayerConfig`]; only `min_level` and `enable_stdout` are
///   used here, the HTTP settings belong to the handler's sink.
///
/// **Returns**
/// - `Err(InitError::AlreadyInstalled)` if another global subscriber is set.
pub fn init_tracing_with_handler(handler: RestApiHandler, config: &LayerConfig) -> Result<(), InitError> {
    let endpoint = handler.endpoint().to_string();
    let layer = RestApiLayer::new(handler, config.min_level);

    // Both branches build a different subscriber type, hence the split.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)?;
    }

    tracing::debug!(%endpoint, min_level = %config.min_level, "restapi log layer installed");
    Ok(())
}

/// Install the layer posting to `endpoint` through a `reqwest` client built
/// from `config`. Must be called from within a Tokio runtime.
#[cfg(feature = "http")]
pub fn init_tracing_with_config(endpoint: impl Into<String>, config: LayerConfig) -> Result<(), InitError> {
    use crate::http::ReqwestSink;
    use std::sync::Arc;

    let sink = ReqwestSink::new(config.content_type.clone(), config.timeout)?;
    let handler = RestApiHandler::with_sink(endpoint, Arc::new(sink))?;
    init_tracing_with_handler(handler, &config)
}

/// Initialize tracing with sensible defaults.
///
/// Equivalent to [`init_tracing_with_config`] with [`LayerConfig::default`].
/// This is the recommended entrypoint for typical services.
#[cfg(feature = "http")]
pub fn init_tracing(endpoint: impl Into<String>) -> Result<(), InitError> {
    init_tracing_with_config(endpoint, LayerConfig::default())
}

/// Initialize tracing entirely from `RESTAPI_LOG_*` environment variables.
/// `RESTAPI_LOG_ENDPOINT` is required.
#[cfg(feature = "http")]
pub fn init_tracing_from_env() -> Result<(), InitError> {
    use crate::env::RESTAPI_LOG_ENDPOINT_ENV;

    let endpoint = std::env::var(RESTAPI_LOG_ENDPOINT_ENV)
        .map_err(|_| InitError::MissingEndpoint(RESTAPI_LOG_ENDPOINT_ENV))?;
    init_tracing_with_config(endpoint, LayerConfig::from_env()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = LayerConfig::from_lookup(lookup(&[])).expect("config");
        assert_eq!(config.min_level, Level::INFO);
        assert!(config.enable_stdout);
        assert_eq!(config.content_type, "application/json");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn variables_override_defaults() {
        let config = LayerConfig::from_lookup(lookup(&[
            (RESTAPI_LOG_LEVEL_ENV, "warn"),
            (RESTAPI_LOG_CONTENT_TYPE_ENV, "application/vnd.logs+json"),
            (RESTAPI_LOG_TIMEOUT_MS_ENV, "0"),
            (RESTAPI_LOG_STDOUT_ENV, "off"),
        ]))
        .expect("config");

        assert_eq!(config.min_level, Level::WARN);
        assert!(!config.enable_stdout);
        assert_eq!(config.content_type, "application/vnd.logs+json");
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn unknown_level_is_rejected() {
        let err = LayerConfig::from_lookup(lookup(&[(RESTAPI_LOG_LEVEL_ENV, "loud")])).unwrap_err();
        assert!(matches!(err, InitError::InvalidLevel(ref l) if l == "loud"));
    }

    #[test]
    fn unparsable_values_are_rejected() {
        let err = LayerConfig::from_lookup(lookup(&[(RESTAPI_LOG_TIMEOUT_MS_ENV, "soon")])).unwrap_err();
        assert!(matches!(err, InitError::InvalidValue { key: RESTAPI_LOG_TIMEOUT_MS_ENV, ref value } if value == "soon"));

        let err = LayerConfig::from_lookup(lookup(&[(RESTAPI_LOG_STDOUT_ENV, "maybe")])).unwrap_err();
        assert!(matches!(err, InitError::InvalidValue { key: RESTAPI_LOG_STDOUT_ENV, .. }));
    }
}
