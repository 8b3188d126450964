use easy_alert::core::{Alert, HostContext, Level, MessageCatalog};
use easy_alert::watchers::HttpWatcher;
use serde_yaml::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Run the blocking watcher off the async runtime that serves the mock
async fn watch(config: String) -> Vec<Alert> {
    tokio::task::spawn_blocking(move || {
        let config: Value = serde_yaml::from_str(&config).unwrap();
        HttpWatcher::from_config(&config)
            .unwrap()
            .watch(&HostContext::new("host1", MessageCatalog::english()))
            .unwrap()
    })
    .await
    .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_code_expectation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello world"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let ok = watch(format!(
        "[{{name: ok, level: error, url: '{}/ok', expect_code: 200}}]",
        server.uri()
    ))
    .await;
    assert!(ok.is_empty());

    let missing = watch(format!(
        "[{{name: missing, level: error, url: '{}/missing', expect_code: 200, additional_info: see runbook}}]",
        server.uri()
    ))
    .await;
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].level, Level::Error);
    assert_eq!(missing[0].title, "Found HTTP Connection Error");
    let lines: Vec<&str> = missing[0].message.lines().collect();
    assert!(lines.contains(&"[ERROR] Failed health check: missing"));
    assert!(lines.contains(&"  actual : {code:404, size:0}"));
    assert!(lines.contains(&"  expect : {code:200, size:None, regexp:None}"));
    assert!(lines.contains(&"  message: see runbook"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_size_and_body_expectations() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("status: green"))
        .mount(&server)
        .await;

    let alerts = watch(format!(
        "
- {{name: body ok, level: info, url: '{uri}/', expect_regexp: 'status: (green|yellow)', expect_size: '<100'}}
- {{name: body bad, level: warn, url: '{uri}/', expect_regexp: 'red'}}
- {{name: size bad, level: info, url: '{uri}/', expect_size: '>=100'}}
",
        uri = server.uri()
    ))
    .await;

    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].level, Level::Warn);
    let message = &alerts[0].message;
    assert!(!message.contains("body ok"));
    assert!(message.contains("  expect : {code:None, size:None, regexp:red}"));
    assert!(message.contains("  actual : {code:200, size:13}"));
    assert!(message.contains("  expect : {code:None, size:>=100, regexp:None}"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_connection_failure_is_reported() {
    // bind then release a port so nothing listens on it
    let uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };

    let alerts = watch(format!(
        "[{{name: down, level: critical, url: '{}/', retry: 1, retry_interval: 0, timeout: 2, expect_code: 200}}]",
        uri
    ))
    .await;

    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].level, Level::Critical);
    let message = &alerts[0].message;
    assert!(message.contains("[CRITICAL] Failed health check: down"));
    assert!(message.contains("  error  : "));
}
