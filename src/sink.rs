use crate::error::SinkError;
use async_trait::async_trait;

/// Default `Content-Type` of posted payloads.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Asynchronous HTTP client capability used to deliver payloads.
///
/// Implementations own connection pooling, TLS and timeouts. The handler
/// calls `post` from a spawned Tokio task and never awaits it on the
/// application thread, so it must be safe to share across threads.
#[async_trait]
pub trait HttpSink: Send + Sync {
    /// POST `body` to `url`.
    ///
    /// **Returns**
    /// - `Ok(status)` with the HTTP status code once the endpoint answered
    ///   with a success status.
    /// - `Err(..)` on transport failure or a non-success status. Nobody
    ///   retries; the error only surfaces to whoever awaits the
    ///   [`DispatchHandle`](crate::handler::DispatchHandle).
    async fn post(&self, url: &str, body: Vec<u8>) -> Result<u16, SinkError>;
}
