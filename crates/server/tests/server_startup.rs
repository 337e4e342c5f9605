use std::io::Write;
use std::net::TcpListener;
use std::time::Duration;

use reqwest::Client;
use tempfile::NamedTempFile;
use tokio::time::{sleep, timeout};

/// Find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Config pointing the gateway at a port nothing listens on
fn minimal_config(port: u16, gateway_port: u16) -> String {
    format!(
        r#"
[server]
host = "127.0.0.1"
port = {}

[gateway]
url = "http://127.0.0.1:{}"
timeout_secs = 2
"#,
        port, gateway_port
    )
}

fn write_config(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

/// Spawn the server and return a handle
async fn spawn_server(config_path: &std::path::Path) -> tokio::process::Child {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_tapdash"))
        .env("TAPDASH_CONFIG", config_path)
        .env("RUST_LOG", "error") // Quiet logs during tests
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server")
}

/// Wait for server to be ready
async fn wait_for_server(port: u16, max_attempts: u32) -> bool {
    let client = Client::new();
    for _ in 0..max_attempts {
        if client
            .get(format!("http://127.0.0.1:{}/api/v1/health", port))
            .send()
            .await
            .is_ok()
        {
            return true;
        }
        sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test]
async fn test_health_endpoint_without_gateway() {
    let port = get_available_port();
    let temp_file = write_config(&minimal_config(port, get_available_port()));

    let mut server = spawn_server(temp_file.path()).await;

    assert!(
        wait_for_server(port, 100).await,
        "Server did not start in time"
    );

    let client = Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{}/api/v1/health", port))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let json: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(json["status"], "ok");
    assert_eq!(json["gateway_connected"], false);

    server.kill().await.ok();
}

#[tokio::test]
async fn test_config_endpoint_returns_sanitized() {
    let port = get_available_port();
    let gateway_port = get_available_port();
    let temp_file = write_config(&minimal_config(port, gateway_port));

    let mut server = spawn_server(temp_file.path()).await;

    assert!(
        wait_for_server(port, 100).await,
        "Server did not start in time"
    );

    let client = Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{}/api/v1/config", port))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let json: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(json["server"]["port"], port);
    assert_eq!(
        json["gateway"]["url"],
        format!("http://127.0.0.1:{}", gateway_port)
    );
    assert_eq!(json["gateway"]["timeout_secs"], 2);

    server.kill().await.ok();
}

#[tokio::test]
async fn test_mint_status_served_while_gateway_down() {
    let port = get_available_port();
    let temp_file = write_config(&minimal_config(port, get_available_port()));

    let mut server = spawn_server(temp_file.path()).await;

    assert!(
        wait_for_server(port, 100).await,
        "Server did not start in time"
    );

    let client = Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{}/api/v1/mint", port))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let json: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(json["stage"], "create");
    assert_eq!(json["running"], true);

    server.kill().await.ok();
}

#[tokio::test]
async fn test_invalid_config_exits_with_error() {
    let temp_file = write_config(
        r#"
[server]
port = 0
"#,
    );

    let result = timeout(
        Duration::from_secs(5),
        tokio::process::Command::new(env!("CARGO_BIN_EXE_tapdash"))
            .env("TAPDASH_CONFIG", temp_file.path())
            .env("RUST_LOG", "error")
            .output(),
    )
    .await;

    let output = result
        .expect("Process timed out")
        .expect("Failed to run process");
    assert!(
        !output.status.success(),
        "Server should exit with error for invalid config"
    );
}

#[tokio::test]
async fn test_bad_gateway_url_exits_with_error() {
    let temp_file = write_config(
        r#"
[gateway]
url = "localhost:8080"
"#,
    );

    let result = timeout(
        Duration::from_secs(5),
        tokio::process::Command::new(env!("CARGO_BIN_EXE_tapdash"))
            .env("TAPDASH_CONFIG", temp_file.path())
            .env("RUST_LOG", "error")
            .output(),
    )
    .await;

    let output = result
        .expect("Process timed out")
        .expect("Failed to run process");
    assert!(!output.status.success());
}

#[tokio::test]
async fn test_json_log_format() {
    let port = get_available_port();
    let config = format!(
        "{}\n[logging]\nformat = \"json\"\n",
        minimal_config(port, get_available_port())
    );
    let temp_file = write_config(&config);

    let mut server = tokio::process::Command::new(env!("CARGO_BIN_EXE_tapdash"))
        .env("TAPDASH_CONFIG", temp_file.path())
        .env("RUST_LOG", "info")
        .stdout(std::process::Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server");

    assert!(
        wait_for_server(port, 100).await,
        "Server did not start in time"
    );

    server.kill().await.ok();
    let output = server.wait_with_output().await.expect("Failed to collect output");
    let stdout = String::from_utf8_lossy(&output.stdout);

    let first = stdout.lines().next().expect("no log output");
    let line: serde_json::Value = serde_json::from_str(first).expect("log line is not JSON");
    assert_eq!(line["level"], "INFO");
    assert!(line["fields"]["message"].is_string());
}
