// src/core/scanner/test_support.rs
//
// Loopback servers for exercising the network clients without the internet.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A WHOIS server on loopback that answers every query with `reply`.
/// Returns its `host:port` and a connection counter.
pub async fn whois_server(reply: String) -> (String, Arc<AtomicUsize>) {
    whois_server_with(move |_| reply).await
}

/// Like [`whois_server`], but the reply is built from the server's own
/// `host:port`.
pub async fn whois_server_with(make_reply: impl FnOnce(&str) -> String) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let reply = make_reply(&addr);
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            let reply = reply.clone();
            tokio::spawn(async move {
                read_until(&mut stream, b"\n").await;
                // The client may hang up early when it caps the read.
                let _ = stream.write_all(reply.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });
    (addr, hits)
}

/// An HTTP/1.1 server on loopback that answers every request with the
/// given status line and JSON body. Returns its base URL.
pub async fn http_server(status: &'static str, body: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let body = body.clone();
            tokio::spawn(async move {
                read_until(&mut stream, b"\r\n\r\n").await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });
    base
}

/// A loopback address nothing listens on.
pub async fn closed_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().to_string()
}

/// A client that ignores any proxy configured in the environment.
pub fn direct_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

async fn read_until(stream: &mut TcpStream, marker: &[u8]) {
    let mut seen = Vec::new();
    let mut chunk = [0u8; 1024];
    while !seen.windows(marker.len()).any(|w| w == marker) {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => seen.extend_from_slice(&chunk[..n]),
        }
    }
}
