// Installs the global subscriber, so it lives in its own test binary.
#![cfg(feature = "http")]

use serde_json::{json, Value};
use tokio::time::{sleep, Duration, Instant};
use tracing::Level;
use tracing_restapi_sink::error::InitError;
use tracing_restapi_sink::init::{init_tracing_with_config, LayerConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn wait_for_requests(server: &MockServer, count: usize) -> Vec<Value> {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let requests = server.received_requests().await.expect("request recording");
        if requests.len() >= count || Instant::now() > deadline {
            return requests
                .iter()
                .map(|r| serde_json::from_slice(&r.body).expect("json body"))
                .collect();
        }
        sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn global_layer_ships_events_at_or_above_min_level() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ingest"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let config = LayerConfig {
        min_level: Level::WARN,
        enable_stdout: false,
        ..LayerConfig::default()
    };
    init_tracing_with_config(format!("{}/ingest", server.uri()), config.clone()).expect("install");

    tracing::info!("starting service");
    tracing::error!(user_id = 42, reason = "invalid password", "authentication failed");

    let payloads = wait_for_requests(&server, 1).await;
    // Give a stray second POST the chance to show up before counting.
    sleep(Duration::from_millis(200)).await;
    assert_eq!(server.received_requests().await.expect("recording").len(), 1);

    let payload = &payloads[0];
    assert_eq!(payload["log"], "global_init");
    assert_eq!(payload["level"], "ERROR");
    assert_eq!(payload["message"], "authentication failed");
    assert_eq!(
        payload["details"],
        json!({"user_id": "42", "reason": "\"invalid password\""})
    );
    assert!(payload.get("traceback").is_none());

    let again = init_tracing_with_config(server.uri(), config);
    assert!(matches!(again, Err(InitError::AlreadyInstalled(_))));
}
