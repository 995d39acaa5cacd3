//! End-to-end dispatch through the real HTTP client against a mock AbuseIPDB.

use abuseipdb_mcp::config::AbuseIpdbConfig;
use abuseipdb_mcp::{AbuseIpdbClient, Dispatcher, TokenBudgetGuard, ToolRegistry};
use serde_json::{json, Map as JsonMap, Value};
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn dispatcher(config: AbuseIpdbConfig, max_tokens: usize) -> Dispatcher {
    let client = AbuseIpdbClient::new(&config).unwrap();
    Dispatcher::new(
        Arc::new(ToolRegistry::with_default_operations().unwrap()),
        Arc::new(client),
        TokenBudgetGuard::new(max_tokens),
    )
}

fn native(server: &MockServer) -> AbuseIpdbConfig {
    AbuseIpdbConfig {
        api_key: Some("test-key".to_string()),
        base_url: Some(server.uri()),
        timeout_ms: 5000,
        ..Default::default()
    }
}

fn args(value: Value) -> JsonMap<String, Value> {
    value.as_object().cloned().unwrap()
}

fn check_body(ip: &str, score: u8) -> Value {
    json!({
        "data": {
            "ipAddress": ip,
            "isPublic": true,
            "abuseConfidenceScore": score,
            "countryCode": "DE",
            "countryName": "Germany",
            "isp": "Example Hosting",
            "totalReports": 3
        }
    })
}

#[tokio::test]
async fn test_check_ip_with_native_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/check"))
        .and(header("key", "test-key"))
        .and(query_param("ipAddress", "203.0.113.5"))
        .and(query_param("maxAgeInDays", "30"))
        .and(query_param("verbose", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(check_body("203.0.113.5", 88)))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = dispatcher(native(&server), 20_000);
    let response = dispatcher
        .call("check_ip", Some(&args(json!({ "ip_address": "203.0.113.5" }))))
        .await;

    assert!(!response.is_error, "{}", response.text);
    assert!(response.text.contains("Germany"));
    assert!(response.text.contains("HIGH"));
    assert!(response.text.contains("FLAGGED"));
}

#[tokio::test]
async fn test_proxy_token_sent_as_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/check"))
        .and(header("authorization", "Bearer proxy-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(check_body("198.51.100.1", 0)))
        .expect(1)
        .mount(&server)
        .await;

    let config = AbuseIpdbConfig {
        auth_token: Some("proxy-token".to_string()),
        base_url: Some(format!("{}/api/v2/", server.uri())),
        timeout_ms: 5000,
        ..Default::default()
    };
    let response = dispatcher(config, 20_000)
        .call("check_ip", Some(&args(json!({ "ip_address": "198.51.100.1" }))))
        .await;

    assert!(!response.is_error, "{}", response.text);
    assert!(response.text.contains("CLEAN"));
}

#[tokio::test]
async fn test_bulk_check_sequential_and_isolated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/check"))
        .and(query_param("ipAddress", "192.0.2.2"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "errors": [{ "detail": "The ip address must be a valid IPv4 or IPv6 address." }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(check_body("192.0.2.1", 90)))
        .mount(&server)
        .await;

    let dispatcher = dispatcher(native(&server), 20_000);
    let response = dispatcher
        .call(
            "bulk_check",
            Some(&args(json!({
                "ip_addresses": ["192.0.2.3", "192.0.2.2", "192.0.2.3", "192.0.2.1"]
            }))),
        )
        .await;

    assert!(!response.is_error, "{}", response.text);
    assert!(response.text.contains("Unique IPs processed: 3"));
    assert!(response.text.contains("  Failed:               1"));
    assert!(response
        .text
        .contains("192.0.2.2 – ERROR: AbuseIPDB API error (HTTP 422): The ip address must be a valid IPv4 or IPv6 address."));

    let order: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter_map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "ipAddress")
                .map(|(_, v)| v.into_owned())
        })
        .collect();
    assert_eq!(order, vec!["192.0.2.3", "192.0.2.2", "192.0.2.1"]);
}

#[tokio::test]
async fn test_check_block_budget_guard() {
    let server = MockServer::start().await;
    let reported: Vec<Value> = (1..=40)
        .map(|i| {
            json!({
                "ipAddress": format!("198.51.100.{}", i),
                "numReports": i,
                "mostRecentReport": "2024-04-01T00:00:00+00:00",
                "abuseConfidencePercentage": 100 - i,
                "countryCode": "US"
            })
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/check-block"))
        .and(query_param("network", "198.51.100.0/24"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "networkAddress": "198.51.100.0",
                "netmask": "255.255.255.0",
                "minAddress": "198.51.100.1",
                "maxAddress": "198.51.100.254",
                "numPossibleHosts": 254,
                "addressSpaceDesc": "Internet",
                "reportedAddress": reported
            }
        })))
        .mount(&server)
        .await;

    let dispatcher = dispatcher(native(&server), 50);

    let denied = dispatcher
        .call("check_block", Some(&args(json!({ "network": "198.51.100.0/24" }))))
        .await;
    assert!(denied.is_error);
    assert!(denied.text.starts_with("Response too large"));

    let allowed = dispatcher
        .call(
            "check_block",
            Some(&args(json!({ "network": "198.51.100.0/24", "break_token_rule": true }))),
        )
        .await;
    assert!(!allowed.is_error, "{}", allowed.text);
    assert!(allowed.text.contains("Reported IPs:      40"));
    assert!(allowed.text.ends_with("  ... and 30 more"));
}

#[tokio::test]
async fn test_invalid_cidr_rejected_without_request() {
    let server = MockServer::start().await;
    let dispatcher = dispatcher(native(&server), 20_000);

    let response = dispatcher
        .call("check_block", Some(&args(json!({ "network": "not-a-network" }))))
        .await;

    assert!(response.is_error);
    assert!(response.text.contains("network:"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rate_limit_surfaces_as_error_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blacklist"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "errors": [{ "detail": "Daily rate limit of 5 requests exceeded for this endpoint." }]
        })))
        .mount(&server)
        .await;

    let response = dispatcher(native(&server), 20_000)
        .call("get_blacklist", None)
        .await;

    assert!(response.is_error);
    assert_eq!(
        response.text,
        "Error: AbuseIPDB rate limit exceeded (HTTP 429): Daily rate limit of 5 requests exceeded for this endpoint."
    );
}
