//! Shared utilities for integration testing.

use std::net::SocketAddr;

use cors_relay::config::RelayConfig;
use cors_relay::http::HttpServer;
use cors_relay::lifecycle::Shutdown;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

/// Start a backend that answers every request with its own request head and
/// body as `text/x-echo`.
///
/// Paths shape the answer: `/status/<code>` sets the status line and
/// `/bare` omits the `Content-Type` header.
pub async fn start_echo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let (read_half, mut write_half) = socket.into_split();
                let mut reader = BufReader::new(read_half);

                let mut head = String::new();
                let mut content_length = 0usize;
                loop {
                    let mut line = String::new();
                    match reader.read_line(&mut line).await {
                        Ok(0) | Err(_) => return,
                        Ok(_) => {}
                    }
                    if line == "\r\n" {
                        break;
                    }
                    if let Some((name, value)) = line.split_once(':') {
                        if name.eq_ignore_ascii_case("content-length") {
                            content_length = value.trim().parse().unwrap_or(0);
                        }
                    }
                    head.push_str(&line);
                }

                let mut body = vec![0u8; content_length];
                if reader.read_exact(&mut body).await.is_err() {
                    return;
                }

                let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                let status = path
                    .strip_prefix("/status/")
                    .and_then(|code| code.parse::<u16>().ok())
                    .unwrap_or(200);
                let content_type = if path == "/bare" {
                    String::new()
                } else {
                    "Content-Type: text/x-echo\r\n".to_string()
                };

                let echoed = format!("{}\r\n{}", head, String::from_utf8_lossy(&body));
                let response = format!(
                    "HTTP/1.1 {} Echo\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    content_type,
                    echoed.len(),
                    echoed
                );
                let _ = write_half.write_all(response.as_bytes()).await;
                let _ = write_half.shutdown().await;
            });
        }
    });

    addr
}

/// Start a relay on an ephemeral port. Trigger the returned `Shutdown` to stop it.
pub async fn start_relay(config: RelayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// `encodeURIComponent`-style escaping for query values.
pub fn component(value: &str) -> String {
    percent_encoding::utf8_percent_encode(value, percent_encoding::NON_ALPHANUMERIC).to_string()
}
