use tokio::time::{sleep, Duration};
use tracing::{error, info, instrument};

use tracing_restapi_sink::env::{env_or, RESTAPI_LOG_ENDPOINT_ENV};
use tracing_restapi_sink::init::init_tracing;

#[derive(Debug)]
struct LoginError;

impl std::fmt::Display for LoginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("invalid password")
    }
}

impl std::error::Error for LoginError {}

#[instrument]
fn authenticate(user_id: u64) {
    let err = LoginError;
    error!(
        user_id,
        error = &err as &(dyn std::error::Error + 'static),
        "authentication failed"
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Point RESTAPI_LOG_ENDPOINT at any HTTP endpoint accepting JSON POSTs.
    let endpoint = env_or(RESTAPI_LOG_ENDPOINT_ENV, "http://127.0.0.1:8080/log");
    init_tracing(endpoint)?;

    info!(version = env!("CARGO_PKG_VERSION"), "starting service");
    authenticate(42);

    // Delivery is fire-and-forget; keep the runtime alive long enough.
    sleep(Duration::from_secs(2)).await;
    Ok(())
}
