use crate::error::{HandlerError, SinkError};
use crate::payload::Payload;
use crate::record::LogRecord;
use crate::sink::HttpSink;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Handle to the in-flight POST of one record. Dropping it does not cancel
/// delivery.
pub type DispatchHandle = JoinHandle<Result<u16, SinkError>>;

/// Normalizes [`LogRecord`]s into [`Payload`]s and fires one POST per record
/// at a fixed endpoint.
///
/// Normalization runs on the caller's thread; the POST runs as a task on the
/// Tokio runtime captured at construction. The handler never waits for,
/// inspects or retries the response.
#[derive(Clone)]
pub struct RestApiHandler {
    endpoint: Arc<str>,
    sink: Arc<dyn HttpSink>,
    runtime: Handle,
}

impl RestApiHandler {
    /// Create a handler posting JSON to `endpoint` with a default `reqwest`
    /// client. Must be called from within a Tokio runtime.
    ///
    /// The endpoint is not validated; a bad URL only shows up as a failed
    /// dispatch.
    #[cfg(feature = "http")]
    pub fn new(endpoint: impl Into<String>) -> Result<Self, HandlerError> {
        use crate::http::ReqwestSink;
        use crate::sink::JSON_CONTENT_TYPE;

        let sink = ReqwestSink::new(JSON_CONTENT_TYPE, None)?;
        Self::with_sink(endpoint, Arc::new(sink))
    }

    /// Create a handler delivering through a custom [`HttpSink`], spawning
    /// onto the current Tokio runtime.
    pub fn with_sink(endpoint: impl Into<String>, sink: Arc<dyn HttpSink>) -> Result<Self, HandlerError> {
        let runtime = Handle::try_current()?;
        Ok(Self::with_runtime(endpoint, sink, runtime))
    }

    /// Create a handler spawning onto an explicit runtime, for applications
    /// that log from threads outside of it.
    pub fn with_runtime(endpoint: impl Into<String>, sink: Arc<dyn HttpSink>, runtime: Handle) -> Self {
        let endpoint: String = endpoint.into();
        Self {
            endpoint: Arc::from(endpoint),
            sink,
            runtime,
        }
    }

    /// Destination URL the handler posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Normalize `record` and submit it for delivery.
    ///
    /// Returns as soon as the POST task is spawned. Exactly one POST is
    /// attempted per call.
    pub fn emit(&self, record: &LogRecord) -> DispatchHandle {
        let body = Payload::from_record(record).to_json_bytes();
        let sink = Arc::clone(&self.sink);
        let url = Arc::clone(&self.endpoint);

        match body {
            Ok(body) => self.runtime.spawn(async move { sink.post(&url, body).await }),
            Err(e) => self.runtime.spawn(async move { Err(SinkError::from(e)) }),
        }
    }
}
