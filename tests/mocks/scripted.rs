//! Hand-scripted upstream over a raw TCP socket
//!
//! Wiremock always sends a whole response at once. These servers write the
//! response piece by piece so tests can observe chunk timing and mid-body
//! failures.

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

/// One-shot scripted upstream
pub struct ScriptedUpstream {
    addr: SocketAddr,
}

impl ScriptedUpstream {
    /// Get the upstream URI
    pub fn uri(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Serve one chunked event stream: `first` immediately, `second` only
    /// after the returned sender fires.
    pub async fn event_stream_in_two_parts(
        first: &'static str,
        second: &'static str,
    ) -> (Self, oneshot::Sender<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (release_tx, release_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request_head(&mut socket).await;

            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\ntransfer-encoding: chunked\r\n\r\n",
                )
                .await
                .unwrap();
            write_chunk(&mut socket, first).await;

            let _ = release_rx.await;

            write_chunk(&mut socket, second).await;
            let _ = socket.write_all(b"0\r\n\r\n").await;
            let _ = socket.flush().await;
        });

        (Self { addr }, release_tx)
    }

    /// Answer one request with an empty 200 and report the raw request line
    /// (`METHOD target HTTP/1.1`) exactly as it arrived on the socket.
    pub async fn capture_request_line() -> (Self, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (line_tx, line_rx) = oneshot::channel::<String>();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let head = read_request_head(&mut socket).await;

            let head = String::from_utf8_lossy(&head);
            let line = head.split("\r\n").next().unwrap_or_default().to_string();
            let _ = line_tx.send(line);

            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n")
                .await;
            let _ = socket.flush().await;
        });

        (Self { addr }, line_rx)
    }

    /// Announce `declared_len` body bytes, send `sent`, then close the socket.
    pub async fn truncated_body(declared_len: usize, sent: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request_head(&mut socket).await;

            let head = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\ncontent-length: {}\r\n\r\n",
                declared_len
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(sent.as_bytes()).await.unwrap();
            socket.flush().await.unwrap();
            // Dropping the socket cuts the body short
        });

        Self { addr }
    }
}

/// Read until the end of the request head (bodiless requests only)
async fn read_request_head(socket: &mut TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    buf
}

async fn write_chunk(socket: &mut TcpStream, data: &str) {
    let frame = format!("{:x}\r\n{}\r\n", data.len(), data);
    let _ = socket.write_all(frame.as_bytes()).await;
    let _ = socket.flush().await;
}

/// URL of a local port with nothing listening on it
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
