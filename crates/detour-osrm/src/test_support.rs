//! Local HTTP stand-in for an OSRM mirror.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub(crate) const ROUTE_BODY: &str = r#"{"code":"Ok","routes":[{"geometry":{"type":"LineString","coordinates":[[72.85,19.10],[72.87,19.11],[72.90,19.12]]},"distance":6400.0,"duration":720.0}]}"#;

/// Answers the first `failures` requests with HTTP 503, then serves
/// [`ROUTE_BODY`]. Returns the base URL and a request counter.
pub(crate) async fn flaky_mirror(failures: usize) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                let mut buf = vec![0u8; 8192];
                let mut read = 0;
                loop {
                    match socket.read(&mut buf[read..]).await {
                        Ok(0) | Err(_) => return,
                        Ok(k) => read += k,
                    }
                    if read == buf.len() || buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }

                let (status, body) = if n < failures {
                    ("503 Service Unavailable", "busy")
                } else {
                    ("200 OK", ROUTE_BODY)
                };
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{addr}"), hits)
}
