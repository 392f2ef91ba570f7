use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};
use tracing_restapi_sink::{
    error::SinkError,
    handler::RestApiHandler,
    init::{init_tracing_with_handler, LayerConfig},
    sink::HttpSink,
};

/// Example of delivering payloads through a completely custom transport by
/// implementing the `HttpSink` trait directly. Imagine this wraps an
/// in-house HTTP client with its own auth and proxy setup.
struct StdoutSink;

#[async_trait]
impl HttpSink for StdoutSink {
    async fn post(&self, url: &str, body: Vec<u8>) -> Result<u16, SinkError> {
        // Here you would call your own client library.
        // For the sake of example we just print the payload.
        println!("[POST {}] {}", url, String::from_utf8_lossy(&body));
        Ok(200)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let handler = RestApiHandler::with_sink("https://logs.example.com/v1/ingest", Arc::new(StdoutSink))?;
    let config = LayerConfig {
        enable_stdout: false,
        ..LayerConfig::default()
    };
    init_tracing_with_handler(handler, &config)?;

    info!("custom transport example started");
    error!(db = "orders", retries = 3, "simulated error sent via custom transport");

    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    Ok(())
}
