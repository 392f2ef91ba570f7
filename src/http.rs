use crate::error::{HandlerError, SinkError};
use crate::sink::HttpSink;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

/// [`HttpSink`] backed by a shared `reqwest` client.
#[derive(Clone, Debug)]
pub struct ReqwestSink {
    client: Client,
    content_type: String,
}

impl ReqwestSink {
    /// Build a sink with a fresh client.
    ///
    /// **Parameters**
    /// - `content_type`: value of the `Content-Type` header on every POST.
    /// - `timeout`: whole-request timeout enforced by the client, if any.
    pub fn new(content_type: impl Into<String>, timeout: Option<Duration>) -> Result<Self, HandlerError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(HandlerError::Client)?;
        Ok(Self::with_client(client, content_type))
    }

    /// Reuse an existing client, e.g. one already configured by the
    /// application.
    pub fn with_client(client: Client, content_type: impl Into<String>) -> Self {
        Self {
            client,
            content_type: content_type.into(),
        }
    }
}

#[async_trait]
impl HttpSink for ReqwestSink {
    async fn post(&self, url: &str, body: Vec<u8>) -> Result<u16, SinkError> {
        let resp = self
            .client
            .post(url)
            .header(CONTENT_TYPE, self.content_type.as_str())
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            Ok(status.as_u16())
        } else {
            tracing::debug!(%status, url, "log endpoint rejected payload");
            Err(SinkError::Status(status.as_u16()))
        }
    }
}
