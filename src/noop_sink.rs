use crate::error::SinkError;
use crate::sink::HttpSink;
use async_trait::async_trait;

/// A sink that accepts every payload without any network I/O.
///
/// Useful for measuring the overhead of normalization and dispatch alone,
/// and for tests that don't care about delivery.
#[derive(Clone, Default)]
pub struct NoopSink;

#[async_trait]
impl HttpSink for NoopSink {
    async fn post(&self, _url: &str, _body: Vec<u8>) -> Result<u16, SinkError> {
        Ok(200)
    }
}
