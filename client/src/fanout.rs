//! Fan-out transport: query every host at once, keep the fastest answer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinSet;
use yubiverify_proto::VerifyError;

use crate::transport::{host_of, within_deadline, Fetch, ReqwestFetch, Transport};

/// Races one GET per URL and returns the first successful body.
///
/// The losing requests are aborted as soon as a winner is known, and also
/// when the caller stops waiting (deadline or dropped future).
#[derive(Debug)]
pub struct RacingTransport<F> {
    fetcher: Arc<F>,
}

/// The production transport: racing HTTPS requests.
pub type HttpTransport = RacingTransport<ReqwestFetch>;

impl<F: Fetch> RacingTransport<F> {
    pub fn with_fetcher(fetcher: F) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
        }
    }

    async fn race(&self, urls: &[String]) -> Result<Vec<u8>, VerifyError> {
        if urls.is_empty() {
            return Err(VerifyError::Transport("no validation hosts configured".into()));
        }

        // Fast path: single host, no fan-out needed
        if urls.len() == 1 {
            return self.fetcher.get(&urls[0]).await.map_err(VerifyError::Transport);
        }

        // Dropping the set aborts every task still in flight.
        let mut tasks = JoinSet::new();
        for url in urls {
            let fetcher = Arc::clone(&self.fetcher);
            let url = url.clone();
            tasks.spawn(async move {
                let res = fetcher.get(&url).await;
                (url, res)
            });
        }

        // Wait for first success
        let mut last_err = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((url, Ok(body))) => {
                    tracing::debug!(host = host_of(&url), "validation server answered first");
                    tasks.abort_all();
                    return Ok(body);
                }
                Ok((url, Err(e))) => {
                    tracing::debug!(host = host_of(&url), error = %e, "validation server failed");
                    last_err = Some(e);
                }
                Err(e) => {
                    last_err = Some(format!("request task failed: {e}"));
                }
            }
        }

        Err(VerifyError::Transport(format!(
            "all {} validation servers failed, last error: {}",
            urls.len(),
            last_err.unwrap_or_else(|| "unknown".into())
        )))
    }
}

impl HttpTransport {
    /// Racing transport over a fresh HTTPS-only client.
    pub fn https() -> Result<Self, VerifyError> {
        Ok(Self::with_fetcher(ReqwestFetch::new()?))
    }
}

#[async_trait]
impl<F: Fetch> Transport for RacingTransport<F> {
    async fn fetch(
        &self,
        urls: &[String],
        deadline: Option<Duration>,
    ) -> Result<Vec<u8>, VerifyError> {
        within_deadline(deadline, self.race(urls)).await
    }
}
