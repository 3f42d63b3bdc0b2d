//! TCP front end serving the HTTP routes.
//!
//! Connections are accepted on a tokio listener and each is driven by hyper's HTTP/1
//! connection on its own task. Every connection is bounded: the request head must arrive
//! within `header_read_timeout`, may not exceed `max_buf_size` bytes or `max_headers`
//! header lines, and the whole exchange is dropped after `connection_timeout`.

use std::net::SocketAddr;
use std::time::Duration;

use asset_common::Result;
use axum::Router;
use hyper::server::conn::http1;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::service::TowerToHyperService;
use log::{debug, info, warn};
use tokio::net::TcpListener;
use tokio::time::timeout;

/// Smallest read buffer hyper accepts.
pub const MIN_BUF_SIZE: usize = 8192;

/// Per-connection resource limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServerLimits {
    /// Deadline for receiving the complete request head.
    pub header_read_timeout: Duration,
    /// Hard cap on the lifetime of one connection.
    pub connection_timeout: Duration,
    /// Largest request head, in bytes. Raised to `MIN_BUF_SIZE` if smaller.
    pub max_buf_size: usize,
    /// Largest number of header lines in one request.
    pub max_headers: usize,
}

impl Default for ServerLimits {
    fn default() -> Self {
        Self {
            header_read_timeout: Duration::from_secs(10),
            connection_timeout: Duration::from_secs(60),
            max_buf_size: 16 * 1024,
            max_headers: 64,
        }
    }
}

/// Bound listening socket plus the limits applied to every accepted connection.
pub struct TriggerListener {
    socket: TcpListener,
    limits: ServerLimits,
}

impl TriggerListener {
    /// Bind to `bind_addr` (e.g. `0.0.0.0:8090`).
    pub async fn bind(bind_addr: &str, limits: ServerLimits) -> Result<Self> {
        let socket = TcpListener::bind(bind_addr).await?;
        Ok(Self { socket, limits })
    }

    /// Address actually bound, useful with port 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Accept loop. Runs until the runtime shuts down; a failed accept only skips
    /// that connection.
    pub async fn serve(self, app: Router) {
        match self.socket.local_addr() {
            Ok(addr) => info!("Trigger server is started on {}", addr),
            Err(e) => warn!("Trigger server is started on an unknown address: {}", e),
        }
        let limits = self.limits;

        loop {
            let (stream, peer) = match self.socket.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    warn!("TCP connection error: {}", e);
                    continue;
                }
            };
            let service = TowerToHyperService::new(app.clone());

            tokio::spawn(async move {
                let mut builder = http1::Builder::new();
                builder
                    .timer(TokioTimer::new())
                    .header_read_timeout(limits.header_read_timeout)
                    .max_buf_size(limits.max_buf_size.max(MIN_BUF_SIZE))
                    .max_headers(limits.max_headers)
                    .keep_alive(false);
                let conn = builder.serve_connection(TokioIo::new(stream), service);

                match timeout(limits.connection_timeout, conn).await {
                    Ok(Ok(())) => debug!("Connection from {} closed", peer),
                    Ok(Err(e)) => debug!("Connection from {} ended with error: {}", peer, e),
                    Err(_) => warn!(
                        "Connection from {} exceeded {:?}, dropping it",
                        peer, limits.connection_timeout
                    ),
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::{AppState, router};
    use crate::worker::UpdateWorker;
    use asset_common::store::MemoryStore;
    use price_engine::{BatchUpdater, SeededSource};
    use serde_json::json;
    use std::io::{Read, Write};
    use std::net::TcpStream;
    use std::time::Instant;
    use tokio::runtime::{Builder, Runtime};

    fn start(limits: ServerLimits) -> (Runtime, SocketAddr) {
        let records = serde_json::from_value(json!([
            { "id": 1, "name": "cryptoPrices", "data": [{ "id": "btc", "price": 100 }] }
        ]))
        .unwrap();
        let (jobs, _worker) =
            UpdateWorker::start(BatchUpdater::new(MemoryStore::new(records), SeededSource::new(1)));

        let runtime = Builder::new_multi_thread().worker_threads(2).enable_all().build().unwrap();
        let listener = runtime
            .block_on(TriggerListener::bind("127.0.0.1:0", limits))
            .unwrap();
        let addr = listener.local_addr().unwrap();
        runtime.spawn(listener.serve(router(AppState::new(Some("k".into()), jobs))));
        (runtime, addr)
    }

    /// Write `request`, then read whatever comes back until the server closes.
    fn exchange(addr: SocketAddr, request: &[u8]) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        // The server may hang up before an oversized request is fully written.
        let _ = stream.write_all(request);
        let mut raw = Vec::new();
        let _ = stream.read_to_end(&mut raw);
        String::from_utf8_lossy(&raw).into_owned()
    }

    #[test]
    fn serves_requests_over_tcp() {
        let (_runtime, addr) = start(ServerLimits::default());
        let resp = exchange(
            addr,
            b"GET /api/cron/updatePrices HTTP/1.1\r\nHost: localhost\r\nAuthorization: Bearer k\r\n\r\n",
        );
        assert!(resp.starts_with("HTTP/1.1 200"), "{resp}");
        assert!(resp.contains(r#""status":"success""#), "{resp}");

        let resp = exchange(addr, b"nonsense\r\n\r\n");
        assert!(resp.is_empty() || resp.starts_with("HTTP/1.1 400"), "{resp}");
    }

    #[test]
    fn idle_connection_is_dropped() {
        let (_runtime, addr) = start(ServerLimits {
            header_read_timeout: Duration::from_millis(200),
            connection_timeout: Duration::from_millis(600),
            ..ServerLimits::default()
        });
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        stream.write_all(b"GET /api/assets HTTP/1.1\r\n").unwrap();

        let started = Instant::now();
        let mut buf = [0u8; 256];
        let _ = stream.read(&mut buf);
        assert!(started.elapsed() < Duration::from_secs(3), "{:?}", started.elapsed());
    }

    #[test]
    fn oversized_head_is_rejected() {
        let (_runtime, addr) = start(ServerLimits {
            max_buf_size: MIN_BUF_SIZE,
            ..ServerLimits::default()
        });
        let mut request = b"GET /api/assets HTTP/1.1\r\nHost: localhost\r\nX-Filler: ".to_vec();
        request.extend(std::iter::repeat_n(b'a', 64 * 1024));
        request.extend_from_slice(b"\r\n\r\n");

        let resp = exchange(addr, &request);
        assert!(resp.is_empty() || resp.starts_with("HTTP/1.1 431"), "{resp}");
    }

    #[test]
    fn too_many_headers_are_rejected() {
        let (_runtime, addr) = start(ServerLimits {
            max_headers: 8,
            ..ServerLimits::default()
        });
        let mut request = String::from("GET /api/assets HTTP/1.1\r\nHost: localhost\r\n");
        for i in 0..20 {
            request.push_str(&format!("X-Extra-{i}: {i}\r\n"));
        }
        request.push_str("\r\n");

        let resp = exchange(addr, request.as_bytes());
        assert!(!resp.starts_with("HTTP/1.1 200"), "{resp}");

        let ok = exchange(addr, b"GET /api/assets HTTP/1.1\r\nHost: localhost\r\n\r\n");
        assert!(ok.starts_with("HTTP/1.1 200"), "{ok}");
    }
}
