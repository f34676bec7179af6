//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use car_pooling::config::ServiceConfig;
use car_pooling::http::HttpServer;
use car_pooling::lifecycle::Shutdown;
use car_pooling::SharedEngine;

/// A service running on an ephemeral port.
pub struct TestService {
    pub addr: SocketAddr,
    pub engine: SharedEngine,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl TestService {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn put_cars(&self, body: serde_json::Value) -> reqwest::Response {
        self.client
            .put(self.url("/cars"))
            .json(&body)
            .send()
            .await
            .expect("service unreachable")
    }

    pub async fn journey(&self, id: u64, people: u8) -> reqwest::Response {
        self.client
            .post(self.url("/journey"))
            .json(&serde_json::json!({ "id": id, "people": people }))
            .send()
            .await
            .expect("service unreachable")
    }

    pub async fn dropoff(&self, id: u64) -> reqwest::Response {
        self.form("/dropoff", id).await
    }

    pub async fn locate(&self, id: u64) -> reqwest::Response {
        self.form("/locate", id).await
    }

    async fn form(&self, path: &str, id: u64) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(&[("ID", id.to_string())])
            .send()
            .await
            .expect("service unreachable")
    }
}

impl Drop for TestService {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the service with default configuration.
pub async fn start_service() -> TestService {
    start_service_with(ServiceConfig::default()).await
}

/// Start the service with the given configuration on 127.0.0.1:0.
pub async fn start_service_with(mut config: ServiceConfig) -> TestService {
    config.listener.bind_address = "127.0.0.1:0".to_string();
    let listener = tokio::net::TcpListener::bind(&config.listener.bind_address)
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let engine = server.engine();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap();

    TestService {
        addr,
        engine,
        client,
        shutdown,
    }
}
