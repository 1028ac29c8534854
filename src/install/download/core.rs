//! Artifact download with bounded exponential backoff

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use log::{debug, info, warn};
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;

use crate::config::RetryPolicy;
use crate::error::{Result, SetupError};

const DOWNLOAD_CONNECT_TIMEOUT: Duration = Duration::from_secs(30); // Initial connection
const DOWNLOAD_INACTIVITY_TIMEOUT: Duration = Duration::from_secs(300); // 5 min no data
const PROGRESS_LOG_BYTES: u64 = 16 * 1024 * 1024;

pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// One download attempt of `url` into `destination`.
///
/// Implementations overwrite `destination` on every call and return the
/// number of bytes written.
pub trait Transport {
    fn fetch(
        &self,
        url: &str,
        destination: &Path,
    ) -> impl Future<Output = Result<u64, TransportError>> + Send;
}

/// Streams the response body straight to disk
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(DOWNLOAD_CONNECT_TIMEOUT)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64, TransportError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let total_bytes = response.content_length();

        let mut file = tokio::fs::File::create(destination).await?;
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;
        let mut last_logged: u64 = 0;

        loop {
            let chunk = match timeout(DOWNLOAD_INACTIVITY_TIMEOUT, stream.next()).await {
                Ok(Some(chunk)) => chunk?,
                Ok(None) => break,
                Err(_) => {
                    return Err(format!(
                        "no data received for {} seconds after {} bytes",
                        DOWNLOAD_INACTIVITY_TIMEOUT.as_secs(),
                        downloaded
                    )
                    .into());
                }
            };

            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            if downloaded - last_logged >= PROGRESS_LOG_BYTES {
                match total_bytes {
                    Some(total) => debug!(
                        "Downloaded {:.1}/{:.1} MB",
                        downloaded as f64 / 1_048_576.0,
                        total as f64 / 1_048_576.0
                    ),
                    None => debug!("Downloaded {:.1} MB", downloaded as f64 / 1_048_576.0),
                }
                last_logged = downloaded;
            }
        }

        file.flush().await?;

        if let Some(total) = total_bytes
            && downloaded != total
        {
            return Err(format!("truncated download: {downloaded} of {total} bytes").into());
        }

        Ok(downloaded)
    }
}

/// Delay before retry `attempt` (1-based): `initial * 2^(attempt-1)`
pub fn backoff_delay(initial: Duration, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    initial.saturating_mul(factor)
}

/// Download `url` to `destination`, making at most `policy.max_attempts`
/// attempts. Failed partial files are left in place for the next attempt to
/// overwrite; the caller owns cleanup after a final failure.
pub async fn download_with_retry<T: Transport>(
    transport: &T,
    url: &str,
    destination: &Path,
    policy: RetryPolicy,
) -> Result<u64> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match transport.fetch(url, destination).await {
            Ok(bytes) => {
                info!("Downloaded {} ({} bytes)", url, bytes);
                return Ok(bytes);
            }
            Err(e) if attempt < max_attempts => {
                let delay = backoff_delay(policy.initial_delay(), attempt);
                warn!(
                    "Download attempt {}/{} failed: {}. Retrying in {}s",
                    attempt,
                    max_attempts,
                    e,
                    delay.as_secs()
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                return Err(SetupError::DownloadFailed {
                    url: url.to_string(),
                    attempts: attempt,
                    source: e,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Fails until `succeed_on`, recording when each attempt started
    struct ScriptedTransport {
        succeed_on: Option<u32>,
        calls: Mutex<Vec<Instant>>,
    }

    impl ScriptedTransport {
        fn new(succeed_on: Option<u32>) -> Self {
            Self {
                succeed_on,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_times(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Transport for ScriptedTransport {
        async fn fetch(&self, _url: &str, _destination: &Path) -> Result<u64, TransportError> {
            let attempt = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(Instant::now());
                calls.len() as u32
            };
            if Some(attempt) == self.succeed_on {
                Ok(42)
            } else {
                Err(format!("connection reset on attempt {attempt}").into())
            }
        }
    }

    fn gaps(times: &[Instant]) -> Vec<Duration> {
        times.windows(2).map(|w| w[1] - w[0]).collect()
    }

    #[test]
    fn backoff_doubles() {
        let initial = Duration::from_secs(10);
        assert_eq!(backoff_delay(initial, 1), Duration::from_secs(10));
        assert_eq!(backoff_delay(initial, 2), Duration::from_secs(20));
        assert_eq!(backoff_delay(initial, 9), Duration::from_secs(2560));
    }

    #[test]
    fn default_policy_worst_case_wait() {
        let policy = RetryPolicy::default();
        let total: Duration = (1..policy.max_attempts)
            .map(|n| backoff_delay(policy.initial_delay(), n))
            .sum();
        assert_eq!(total, Duration::from_secs(5110));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_attempts_with_exponential_delays() {
        let transport = ScriptedTransport::new(None);
        let policy = RetryPolicy {
            max_attempts: 4,
            initial_delay_secs: 3,
        };

        let err = download_with_retry(&transport, "https://x.invalid/a", Path::new("a"), policy)
            .await
            .unwrap_err();

        match err {
            SetupError::DownloadFailed { attempts, source, .. } => {
                assert_eq!(attempts, 4);
                assert_eq!(source.to_string(), "connection reset on attempt 4");
            }
            other => panic!("unexpected error: {other}"),
        }

        let times = transport.call_times();
        assert_eq!(times.len(), 4);
        assert_eq!(
            gaps(&times),
            vec![
                Duration::from_secs(3),
                Duration::from_secs(6),
                Duration::from_secs(12)
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stops_retrying_after_success() {
        let transport = ScriptedTransport::new(Some(3));
        let policy = RetryPolicy::default();

        let bytes = download_with_retry(&transport, "https://x.invalid/a", Path::new("a"), policy)
            .await
            .unwrap();

        assert_eq!(bytes, 42);
        let times = transport.call_times();
        assert_eq!(times.len(), 3);
        assert_eq!(
            gaps(&times),
            vec![Duration::from_secs(10), Duration::from_secs(20)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn single_attempt_policy_does_not_sleep() {
        let transport = ScriptedTransport::new(None);
        let policy = RetryPolicy {
            max_attempts: 1,
            initial_delay_secs: 10,
        };
        let start = Instant::now();
        let result =
            download_with_retry(&transport, "https://x.invalid/a", Path::new("a"), policy).await;
        assert!(result.is_err());
        assert_eq!(transport.call_times().len(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn http_transport_writes_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/asset.tar.gz")
            .with_status(200)
            .with_body(vec![7u8; 2048])
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("asset.tar.gz");
        std::fs::write(&dest, b"stale partial content from an earlier attempt").unwrap();

        let transport = HttpTransport::new("setup-pwsh-test").unwrap();
        let bytes = transport
            .fetch(&format!("{}/asset.tar.gz", server.url()), &dest)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(bytes, 2048);
        assert_eq!(std::fs::read(&dest).unwrap(), vec![7u8; 2048]);
    }

    #[tokio::test]
    async fn http_transport_rejects_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let transport = HttpTransport::new("setup-pwsh-test").unwrap();
        let err = transport
            .fetch(&format!("{}/missing", server.url()), &dir.path().join("x"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("404"));
    }
}
