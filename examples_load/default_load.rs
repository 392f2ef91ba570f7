use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::error;

use tracing_restapi_sink::handler::RestApiHandler;
use tracing_restapi_sink::init::{init_tracing_with_handler, LayerConfig};
use tracing_restapi_sink::noop_sink::NoopSink;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let handler = RestApiHandler::with_sink("http://127.0.0.1:8080/log", Arc::new(NoopSink))?;
    let config = LayerConfig {
        enable_stdout: false,
        ..LayerConfig::default()
    };
    init_tracing_with_handler(handler, &config)?;

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        error!(iteration = i, "default load test error");
    }

    let elapsed = start.elapsed();
    println!("default config: emitted {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    // Give the spawned dispatch tasks a little time to drain
    sleep(Duration::from_secs(2)).await;
    Ok(())
}
