//! End-to-end relay server tests
//!
//! A real server bound to an ephemeral port is exercised with reqwest, with
//! wiremock standing in for the GitHub API.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use instabot_trigger::config::TriggerConfig;
use instabot_trigger::server::{RunningTriggerServer, TriggerServer};
use instabot_trigger::trigger::TriggerService;

const RUNS_PATH: &str = "/repos/test-owner/test-repo/actions/runs";
const DISPATCH_PATH: &str = "/repos/test-owner/test-repo/dispatches";

fn test_config(api_base: &str) -> TriggerConfig {
    let mut config = TriggerConfig::default();
    config.github.api_base = api_base.to_string();
    config.github.owner = "test-owner".to_string();
    config.github.repo = "test-repo".to_string();
    config.github.token = Some("mock-token".to_string());
    config.trigger.confirm_delay_ms = 10;
    config.device.enabled = false;
    config
}

async fn start_relay(github: &MockServer) -> RunningTriggerServer {
    let service = TriggerService::from_config(&test_config(&github.uri())).unwrap();
    TriggerServer::new("127.0.0.1:0".parse().unwrap(), service)
        .start()
        .await
        .unwrap()
}

async fn mock_active_run(server: &MockServer) {
    let now = chrono::Utc::now();
    Mock::given(method("GET"))
        .and(path(RUNS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "workflow_runs": [{
                "id": 7,
                "name": "Instagram Bot",
                "status": "in_progress",
                "conclusion": null,
                "html_url": "https://github.com/test-owner/test-repo/actions/runs/7",
                "created_at": now.to_rfc3339(),
                "updated_at": now.to_rfc3339(),
            }]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn success_page_with_no_cache_headers() {
    let github = MockServer::start().await;
    mock_active_run(&github).await;

    let relay = start_relay(&github).await;
    let url = format!("http://{}/", relay.bound_address());

    let response = reqwest::get(&url).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers().get("cache-control").unwrap(),
        "no-store, no-cache, must-revalidate"
    );
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/html;charset=UTF-8"
    );
    assert_eq!(response.headers().get("pragma").unwrap(), "no-cache");

    let body = response.text().await.unwrap();
    assert!(body.contains("Starting Bot..."));
    assert!(body.contains("instagram://app"));

    relay.stop().await.unwrap();
}

#[tokio::test]
async fn any_method_and_path_triggers_the_relay() {
    let github = MockServer::start().await;
    mock_active_run(&github).await;

    let relay = start_relay(&github).await;
    let url = format!("http://{}/some/odd/path", relay.bound_address());

    let client = reqwest::Client::new();
    let response = client.post(&url).body("ignored").send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.text().await.unwrap().contains("Starting Bot..."));

    relay.stop().await.unwrap();
}

#[tokio::test]
async fn dispatch_failure_renders_error_page_with_500() {
    let github = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RUNS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "workflow_runs": [] })))
        .mount(&github)
        .await;
    Mock::given(method("POST"))
        .and(path(DISPATCH_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("service down"))
        .mount(&github)
        .await;

    let relay = start_relay(&github).await;
    let url = format!("http://{}/", relay.bound_address());

    let response = reqwest::get(&url).await.unwrap();
    assert_eq!(response.status(), 500);
    assert_eq!(
        response.headers().get("cache-control").unwrap(),
        "no-store, no-cache, must-revalidate"
    );

    let body = response.text().await.unwrap();
    assert!(body.contains("GitHub API responded with 503"));
    assert!(body.contains("service down"));

    relay.stop().await.unwrap();
}

#[tokio::test]
async fn confirmation_failure_renders_failed_to_start() {
    let github = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RUNS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "workflow_runs": [] })))
        .mount(&github)
        .await;
    Mock::given(method("POST"))
        .and(path(DISPATCH_PATH))
        .respond_with(ResponseTemplate::new(204))
        .mount(&github)
        .await;

    let relay = start_relay(&github).await;
    let url = format!("http://{}/", relay.bound_address());

    let response = reqwest::get(&url).await.unwrap();
    assert_eq!(response.status(), 500);
    assert!(response
        .text()
        .await
        .unwrap()
        .contains("Failed to start workflow"));

    relay.stop().await.unwrap();
}
