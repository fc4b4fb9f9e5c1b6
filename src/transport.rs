//! Artifact transport
//!
//! Performs a single URI -> local file transfer. The mirror decides whether
//! and where to call it.

use crate::error::{RelcacheError, RelcacheResult};
use crate::fsutil;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Abstract single-file download
#[async_trait]
pub trait ArtifactTransport: Send + Sync {
    /// Download `uri` into `dest`, replacing it atomically.
    /// The parent directory of `dest` already exists.
    async fn fetch(&self, uri: &Url, dest: &Path) -> RelcacheResult<()>;
}

/// Build a blocking HTTP agent with a global per-request timeout
pub fn http_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into()
}

/// Map a ureq error to a transport failure for `uri`
pub(crate) fn transport_error(uri: &Url, err: ureq::Error) -> RelcacheError {
    let reason = match err {
        ureq::Error::StatusCode(code) => format!("server returned status {}", code),
        ureq::Error::Timeout(kind) => format!("timed out ({:?})", kind),
        other => other.to_string(),
    };
    RelcacheError::transport(uri.as_str(), reason)
}

/// HTTP(S) transport backed by `ureq`
#[derive(Clone)]
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: http_agent(timeout),
        }
    }
}

#[async_trait]
impl ArtifactTransport for HttpTransport {
    async fn fetch(&self, uri: &Url, dest: &Path) -> RelcacheResult<()> {
        let agent = self.agent.clone();
        let uri = uri.clone();
        let dest: PathBuf = dest.to_path_buf();

        debug!("Downloading {}", uri);
        tokio::task::spawn_blocking(move || {
            let response = agent
                .get(uri.as_str())
                .call()
                .map_err(|e| transport_error(&uri, e))?;

            let mut reader = response.into_body().into_reader();
            fsutil::atomic_write_with(&dest, |file| io::copy(&mut reader, file).map(|_| ()))
                .map_err(|e| RelcacheError::transport(uri.as_str(), e.to_string()))
        })
        .await
        .map_err(|e| RelcacheError::Internal(format!("download task failed: {}", e)))?
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;
    use url::Url;

    /// Loopback HTTP server answering exactly one request with a canned response
    pub struct OneShotServer {
        base_url: Url,
        requests: mpsc::Receiver<String>,
    }

    impl OneShotServer {
        pub fn start(status: u16, body: impl Into<Vec<u8>>) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
            let addr = listener.local_addr().expect("local_addr");
            let body = body.into();
            let (tx, requests) = mpsc::channel();

            thread::spawn(move || {
                let Ok((mut stream, _)) = listener.accept() else {
                    return;
                };
                let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
                let mut request_line = String::new();
                let _ = reader.read_line(&mut request_line);

                // Drain headers; GET requests carry no body
                let mut line = String::new();
                while reader.read_line(&mut line).map(|n| n > 0).unwrap_or(false) {
                    if line == "\r\n" {
                        break;
                    }
                    line.clear();
                }

                let reason = match status {
                    200 => "OK",
                    404 => "Not Found",
                    _ => "Error",
                };
                let head = format!(
                    "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n\r\n",
                    status,
                    reason,
                    body.len()
                );
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(&body);
                let _ = stream.flush();
                let _ = tx.send(request_line.trim_end().to_string());
            });

            Self {
                base_url: Url::parse(&format!("http://{addr}/")).expect("server url"),
                requests,
            }
        }

        pub fn base_url(&self) -> &Url {
            &self.base_url
        }

        pub fn url(&self, path: &str) -> Url {
            self.base_url.join(path).expect("join server url")
        }

        /// Request line of the served request, e.g. `GET /a HTTP/1.1`
        pub fn request_line(&self) -> String {
            self.requests
                .recv_timeout(Duration::from_secs(5))
                .expect("server saw no request")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::OneShotServer;
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn fetch_writes_body_bytes() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("pkg.tar.gz");
        let body: Vec<u8> = (0..=255u8).cycle().take(70_000).collect();
        let server = OneShotServer::start(200, body.clone());
        let uri = server.url("widget/1.0/pkg.tar.gz");

        HttpTransport::new(Duration::from_secs(5))
            .fetch(&uri, &dest)
            .await
            .unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), body);
        assert_eq!(server.request_line(), "GET /widget/1.0/pkg.tar.gz HTTP/1.1");
    }

    #[tokio::test]
    async fn error_status_leaves_previous_file() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("pkg.tar.gz");
        std::fs::write(&dest, b"previous").unwrap();
        let server = OneShotServer::start(404, "gone");
        let uri = server.url("widget/pkg.tar.gz");

        let err = HttpTransport::new(Duration::from_secs(5))
            .fetch(&uri, &dest)
            .await
            .unwrap_err();

        match err {
            RelcacheError::TransportFailure { uri: failed, reason } => {
                assert_eq!(failed, uri.as_str());
                assert!(reason.contains("status 404"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(std::fs::read(&dest).unwrap(), b"previous");
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_failure() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("pkg.tar.gz");
        let transport = HttpTransport::new(Duration::from_secs(2));
        // Port 9 on loopback is the discard service; nothing listens there in CI
        let uri = Url::parse("http://127.0.0.1:9/widget/pkg.tar.gz").unwrap();

        let err = transport.fetch(&uri, &dest).await.unwrap_err();
        assert!(matches!(err, RelcacheError::TransportFailure { .. }));
        assert!(err.is_retryable());
        assert!(!dest.exists());
    }

    #[test]
    fn status_code_reason() {
        let uri = Url::parse("https://example.test/a").unwrap();
        let err = transport_error(&uri, ureq::Error::StatusCode(404));
        assert!(err.to_string().contains("status 404"));
    }
}
