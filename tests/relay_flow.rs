//! End-to-end tests: caller → relay → echo backend.

use cors_relay::config::RelayConfig;
use cors_relay::relay::normalize::DEFAULT_USER_AGENT;
use reqwest::StatusCode;
use serde_json::json;

mod common;

use common::{client, closed_port, component, start_echo_backend, start_relay};

#[tokio::test]
async fn test_get_encoded_request_is_relayed() {
    let backend = start_echo_backend().await;
    let (relay, shutdown) = start_relay(RelayConfig::default()).await;

    let target = format!("http://{}/hello?a=1&b=2", backend);
    let res = client()
        .get(format!("http://{}/?url={}&preset=mp", relay, component(&target)))
        .header("Origin", "https://app.example")
        .send()
        .await
        .expect("Relay unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["access-control-allow-origin"], "https://app.example");
    assert_eq!(res.headers()["access-control-max-age"], "86400");
    assert_eq!(res.headers()["content-type"], "text/x-echo");

    let body = res.text().await.unwrap();
    assert!(body.starts_with("GET /hello?a=1&b=2 HTTP/1.1\r\n"), "{}", body);
    assert!(body.contains(&format!("user-agent: {}", DEFAULT_USER_AGENT)), "{}", body);
    assert!(body.contains("referer: https://mp.weixin.qq.com"), "{}", body);

    shutdown.trigger();
}

#[tokio::test]
async fn test_post_encoded_request_is_relayed() {
    let backend = start_echo_backend().await;
    let (relay, shutdown) = start_relay(RelayConfig::default()).await;

    let payload = json!({
        "url": format!("http://{}/submit", backend),
        "method": "PUT",
        "body": "a=1&b=2",
        "headers": { "X-Token": "secret", "Referer": "https://caller.example" },
        "preset": "mp",
    });
    let res = client()
        .post(format!("http://{}/", relay))
        .json(&payload)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");

    let body = res.text().await.unwrap();
    assert!(body.starts_with("PUT /submit HTTP/1.1\r\n"), "{}", body);
    assert!(body.contains("x-token: secret"), "{}", body);
    assert!(body.contains("referer: https://mp.weixin.qq.com"), "{}", body);
    assert!(!body.contains("caller.example"), "{}", body);
    assert!(body.ends_with("\r\na=1&b=2"), "{}", body);

    shutdown.trigger();
}

#[tokio::test]
async fn test_relay_accepts_any_path() {
    let backend = start_echo_backend().await;
    let (relay, shutdown) = start_relay(RelayConfig::default()).await;

    let res = client()
        .get(format!(
            "http://{}/some/prefix?url={}",
            relay,
            component(&format!("http://{}/x", backend))
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_target_status_is_masked_by_default() {
    let backend = start_echo_backend().await;
    let (relay, shutdown) = start_relay(RelayConfig::default()).await;

    let res = client()
        .post(format!("http://{}", relay))
        .json(&json!({ "url": format!("http://{}/status/404", backend) }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    shutdown.trigger();
}

#[tokio::test]
async fn test_target_status_propagates_when_enabled() {
    let backend = start_echo_backend().await;
    let mut config = RelayConfig::default();
    config.relay.propagate_status = true;
    let (relay, shutdown) = start_relay(config).await;

    let res = client()
        .post(format!("http://{}", relay))
        .json(&json!({ "url": format!("http://{}/status/404", backend) }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");

    shutdown.trigger();
}

#[tokio::test]
async fn test_missing_target_content_type_is_not_invented() {
    let backend = start_echo_backend().await;
    let (relay, shutdown) = start_relay(RelayConfig::default()).await;

    let res = client()
        .post(format!("http://{}", relay))
        .json(&json!({ "url": format!("http://{}/bare", backend) }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get("content-type").is_none());

    shutdown.trigger();
}

#[tokio::test]
async fn test_validation_errors_are_plain_text_400() {
    let (relay, shutdown) = start_relay(RelayConfig::default()).await;
    let client = client();

    let res = client
        .post(format!("http://{}", relay))
        .json(&json!({ "url": "ftp://example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(res.headers().get("access-control-allow-origin").is_none());
    assert_eq!(res.text().await.unwrap(), "URL not valid");

    let res = client
        .post(format!("http://{}", relay))
        .json(&json!({ "method": "POST", "body": "a=1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.text().await.unwrap(), "URL not found");

    let res = client
        .get(format!("http://{}/?url=https%3A%2F%2Fexample.com&headers=%5B%5D", relay))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.text().await.unwrap(), "Headers not valid");

    shutdown.trigger();
}

#[tokio::test]
async fn test_unsupported_inbound_method() {
    let (relay, shutdown) = start_relay(RelayConfig::default()).await;

    let res = client()
        .put(format!("http://{}/?url=https%3A%2F%2Fexample.com", relay))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.text().await.unwrap(), "Method not implemented");

    shutdown.trigger();
}

#[tokio::test]
async fn test_network_failure_is_400() {
    let dead = closed_port().await;
    let (relay, shutdown) = start_relay(RelayConfig::default()).await;

    let res = client()
        .post(format!("http://{}", relay))
        .json(&json!({ "url": format!("http://{}/", dead) }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(!res.text().await.unwrap().is_empty());

    shutdown.trigger();
}

#[tokio::test]
async fn test_cors_on_error_when_enabled() {
    let mut config = RelayConfig::default();
    config.relay.cors_on_error = true;
    let (relay, shutdown) = start_relay(config).await;

    let res = client()
        .get(format!("http://{}/", relay))
        .header("Origin", "https://app.example")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.headers()["access-control-allow-origin"], "https://app.example");
    assert_eq!(res.text().await.unwrap(), "URL not found");

    shutdown.trigger();
}

#[tokio::test]
async fn test_oversized_payload_rejected() {
    let mut config = RelayConfig::default();
    config.relay.max_payload_bytes = 32;
    let (relay, shutdown) = start_relay(config).await;

    let res = client()
        .post(format!("http://{}", relay))
        .json(&json!({ "url": format!("https://example.com/{}", "a".repeat(64)) }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    shutdown.trigger();
}

#[tokio::test]
async fn test_configured_preset_and_user_agent() {
    let backend = start_echo_backend().await;
    let mut config = RelayConfig::default();
    config.relay.user_agent = "relay-test/1.0".into();
    config.presets.insert(
        "api".into(),
        [("X-Api-Version".to_string(), "2".to_string())].into(),
    );
    let (relay, shutdown) = start_relay(config).await;

    let res = client()
        .post(format!("http://{}", relay))
        .json(&json!({ "url": format!("http://{}/", backend), "preset": "api" }))
        .send()
        .await
        .unwrap();
    let body = res.text().await.unwrap();
    assert!(body.contains("user-agent: relay-test/1.0"), "{}", body);
    assert!(body.contains("x-api-version: 2"), "{}", body);

    shutdown.trigger();
}

#[tokio::test]
async fn test_preset_wins_over_lowercase_caller_header() {
    let backend = start_echo_backend().await;
    let (relay, shutdown) = start_relay(RelayConfig::default()).await;

    let res = client()
        .post(format!("http://{}", relay))
        .json(&json!({
            "url": format!("http://{}/", backend),
            "headers": { "referer": "https://caller.example" },
            "preset": "mp",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.text().await.unwrap();
    assert!(body.contains("referer: https://mp.weixin.qq.com"), "{}", body);
    assert!(!body.contains("caller.example"), "{}", body);

    shutdown.trigger();
}

#[tokio::test]
async fn test_unsendable_header_value_is_400() {
    let backend = start_echo_backend().await;
    let (relay, shutdown) = start_relay(RelayConfig::default()).await;

    let res = client()
        .post(format!("http://{}", relay))
        .json(&json!({
            "url": format!("http://{}/", backend),
            "headers": { "X-Note": "line\nbreak" },
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.text().await.unwrap(), "Invalid header: X-Note");

    shutdown.trigger();
}

#[tokio::test]
async fn test_lowercase_get_with_body_is_400() {
    let backend = start_echo_backend().await;
    let (relay, shutdown) = start_relay(RelayConfig::default()).await;

    let res = client()
        .post(format!("http://{}", relay))
        .json(&json!({
            "url": format!("http://{}/", backend),
            "method": "get",
            "body": "x",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.text().await.unwrap(),
        "Request with GET/HEAD method cannot have body"
    );

    shutdown.trigger();
}
