//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use api_logger::config::AppConfig;
use api_logger::{HttpServer, Shutdown};
use serde_json::Value;
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// A running server bound to an ephemeral port, logging into a temp dir.
pub struct TestServer {
    pub addr: SocketAddr,
    pub log_path: PathBuf,
    pub shutdown: Shutdown,
    handle: JoinHandle<()>,
    _dir: TempDir,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Stop the server and wait for it to drain.
    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = tokio::time::timeout(Duration::from_secs(10), self.handle).await;
    }
}

/// Default config for tests: generous limits, no notification targets.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.rate_limit.requests = 100;
    config
}

/// Start a server. `config.storage.log_path` is replaced with a temp file
/// unless `keep_log_path` is set.
pub async fn start_server_with(mut config: AppConfig, keep_log_path: bool) -> TestServer {
    let dir = TempDir::new().unwrap();
    if !keep_log_path {
        config.storage.log_path = dir.path().join("logs.jsonl").to_string_lossy().into_owned();
    }
    let log_path = PathBuf::from(&config.storage.log_path);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let rx = shutdown.subscribe();
    let handle = tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    TestServer {
        addr,
        log_path,
        shutdown,
        handle,
        _dir: dir,
    }
}

pub async fn start_server(config: AppConfig) -> TestServer {
    start_server_with(config, false).await
}

/// Every line of the log, parsed independently. Missing file means no lines.
pub fn read_log(path: &Path) -> Vec<Value> {
    match std::fs::read_to_string(path) {
        Ok(content) => content
            .lines()
            .map(|l| serde_json::from_str(l).expect("log line is not valid JSON"))
            .collect(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => panic!("failed to read log: {e}"),
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
