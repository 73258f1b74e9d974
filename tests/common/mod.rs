//! Shared utilities for integration tests.

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use wiremock::MockServer;
use woo_proxy::config::{loader, AuthPolicy, CredentialPlacement, ProxyConfig, Secret};
use woo_proxy::{HttpServer, Shutdown};

pub const CONSUMER_KEY: &str = "ck_integration";
pub const CONSUMER_SECRET: &str = "cs_integration_secret";

/// A proxy running on an ephemeral port. Shuts down when dropped.
pub struct TestProxy {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestProxy {
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the proxy with `config`. The listener is bound before returning, so
/// requests can be sent immediately.
pub async fn start_proxy(mut config: ProxyConfig) -> TestProxy {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let config = loader::finalize(config).expect("test config must be valid");
    let server = HttpServer::new(config).unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestProxy { addr, shutdown }
}

/// Caller-supplied Authorization, forwarded verbatim.
pub fn passthrough_config(upstream: &MockServer) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.upstream.base_url = Some(upstream.uri());
    config
}

/// Server-held credentials with the given placement.
pub fn server_credentials_config(
    upstream: &MockServer,
    placement: CredentialPlacement,
) -> ProxyConfig {
    let mut config = passthrough_config(upstream);
    config.auth.policy = AuthPolicy::ServerCredentials;
    config.auth.placement = placement;
    config.auth.consumer_key = Some(CONSUMER_KEY.to_string());
    config.auth.consumer_secret = Some(Secret::new(CONSUMER_SECRET));
    config
}

/// A base URL nothing is listening on.
#[allow(dead_code)]
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}

/// Send a GET with `target` written verbatim on the request line.
///
/// HTTP clients normalize dot segments before sending; this does not.
/// Returns the raw response text.
pub async fn send_raw_get(addr: SocketAddr, target: &str) -> String {
    let mut socket = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        target, addr
    );
    socket.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    socket.read_to_end(&mut response).await.unwrap();
    String::from_utf8_lossy(&response).into_owned()
}
