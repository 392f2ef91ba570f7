/// Error returned by an [`HttpSink`](crate::sink::HttpSink) when a POST
/// could not be completed.
///
/// The handler never inspects it; it only travels inside the
/// [`DispatchHandle`](crate::handler::DispatchHandle) returned by `emit`.
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[cfg(feature = "http")]
    #[error("http transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("endpoint rejected payload with status {0}")]
    Status(u16),
}

/// Error type returned when building a [`RestApiHandler`](crate::handler::RestApiHandler).
#[derive(thiserror::Error, Debug)]
pub enum HandlerError {
    #[error("no tokio runtime available to dispatch log payloads")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    #[cfg(feature = "http")]
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Error type returned by the `init_tracing*` family.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("environment variable {0} is not set")]
    MissingEndpoint(&'static str),

    #[error("invalid log level {0:?}")]
    InvalidLevel(String),

    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },

    #[error(transparent)]
    Handler(#[from] HandlerError),

    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled(#[from] tracing::subscriber::SetGlobalDefaultError),
}
