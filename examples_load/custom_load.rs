use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{error, Level};

use tracing_restapi_sink::handler::RestApiHandler;
use tracing_restapi_sink::init::{init_tracing_with_handler, LayerConfig};
use tracing_restapi_sink::noop_sink::NoopSink;
use tracing_restapi_sink::value::FieldValue;
use tracing_restapi_sink::LogRecord;

/// Compares the cost of going through the tracing layer with calling
/// `emit` directly on hand-built records carrying non-native extras.
#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let handler = RestApiHandler::with_sink("http://127.0.0.1:8080/log", Arc::new(NoopSink))?;

    let layer_config = LayerConfig {
        min_level: Level::ERROR,
        enable_stdout: false,
        ..LayerConfig::default()
    };
    init_tracing_with_handler(handler.clone(), &layer_config)?;

    let n: u64 = 100_000;

    let start = Instant::now();
    for i in 0..n {
        error!(iteration = i, "custom load test error");
    }
    report("tracing layer", n, start);

    let start = Instant::now();
    for i in 0..n {
        let record = LogRecord::new("load", "ERROR", "custom load test error")
            .with_extra("iteration", i)
            .with_extra("request_id", uuid::Uuid::new_v4())
            .with_extra("at", chrono::Utc::now())
            .with_extra("peer", FieldValue::object([("host", "10.0.0.7"), ("zone", "eu-1")]));
        drop(handler.emit(&record));
    }
    report("direct emit", n, start);

    sleep(Duration::from_secs(2)).await;
    Ok(())
}

fn report(label: &str, n: u64, start: Instant) {
    let elapsed = start.elapsed();
    println!("{}: emitted {} records in {:?} (~{:.0} ev/s)",
        label,
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
