//! Local mock upstream for network tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

/// What the mock sends back for every request.
#[derive(Clone)]
pub enum Reply {
    Full { status: u16, body: Vec<u8> },
    /// Declares a longer body than it sends, then closes.
    Truncated { status: u16, sent: Vec<u8>, declared: usize },
    /// Accepts the request and never answers.
    Hang,
}

pub struct MockUpstream {
    pub base_url: Url,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockUpstream {
    pub async fn start(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&requests);
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let seen = Arc::clone(&seen);
                let reply = reply.clone();
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => buf.extend_from_slice(&chunk[..n]),
                        }
                    }
                    let head = String::from_utf8_lossy(&buf).to_string();
                    let line = head.lines().next().unwrap_or_default().to_string();
                    seen.lock().unwrap().push(line);

                    match reply {
                        Reply::Full { status, body } => {
                            let head = format!(
                                "HTTP/1.1 {} X\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                                status,
                                body.len()
                            );
                            let _ = socket.write_all(head.as_bytes()).await;
                            let _ = socket.write_all(&body).await;
                        }
                        Reply::Truncated { status, sent, declared } => {
                            let head = format!(
                                "HTTP/1.1 {} X\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                                status, declared
                            );
                            let _ = socket.write_all(head.as_bytes()).await;
                            let _ = socket.write_all(&sent).await;
                        }
                        Reply::Hang => {
                            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
                        }
                    }
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self {
            base_url: Url::parse(&format!("http://{}", addr)).unwrap(),
            requests,
        }
    }

    /// Request lines received so far, e.g. "GET /random.json HTTP/1.1".
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// A base URL nothing is listening on.
pub async fn dead_base_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{}", addr)).unwrap()
}
