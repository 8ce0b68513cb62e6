//! HTTP transport to the validation servers.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use yubiverify_proto::VerifyError;

/// Fetch one verify response, given the same request addressed to several
/// interchangeable hosts.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Return the body of a successful response from one of `urls`.
    ///
    /// Fails with [`VerifyError::Transport`] if no URL yields a response, or
    /// none does before `deadline`.
    async fn fetch(&self, urls: &[String], deadline: Option<Duration>)
        -> Result<Vec<u8>, VerifyError>;
}

/// A single GET against a single URL.
#[async_trait]
pub trait Fetch: Send + Sync + 'static {
    async fn get(&self, url: &str) -> Result<Vec<u8>, String>;
}

/// Largest verify response body accepted. Real answers are a few hundred
/// bytes.
pub const MAX_BODY_LEN: usize = 8 * 1024;

/// `reqwest`-backed [`Fetch`]: HTTPS only, redirects are not followed, and
/// a non-2xx status counts as a failure. Bodies over [`MAX_BODY_LEN`] are
/// failures too.
#[derive(Debug, Clone)]
pub struct ReqwestFetch {
    client: reqwest::Client,
}

impl ReqwestFetch {
    pub fn new() -> Result<Self, VerifyError> {
        let client = reqwest::Client::builder()
            .https_only(true)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("yubiverify/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| VerifyError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Use a preconfigured client as-is.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetch for ReqwestFetch {
    async fn get(&self, url: &str) -> Result<Vec<u8>, String> {
        // Errors are stripped of the URL: it carries the OTP.
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| e.without_url().to_string())?;

        let too_large = || format!("response body exceeds {MAX_BODY_LEN} bytes");
        if response
            .content_length()
            .is_some_and(|len| len > MAX_BODY_LEN as u64)
        {
            return Err(too_large());
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| format!("read body failed: {}", e.without_url()))?
        {
            if body.len() + chunk.len() > MAX_BODY_LEN {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

/// Sends the request to one host picked at random instead of racing all of
/// them.
#[derive(Debug, Clone)]
pub struct RandomHostTransport<F> {
    fetcher: F,
}

impl<F: Fetch> RandomHostTransport<F> {
    pub fn with_fetcher(fetcher: F) -> Self {
        Self { fetcher }
    }
}

impl RandomHostTransport<ReqwestFetch> {
    pub fn https() -> Result<Self, VerifyError> {
        Ok(Self::with_fetcher(ReqwestFetch::new()?))
    }
}

#[async_trait]
impl<F: Fetch> Transport for RandomHostTransport<F> {
    async fn fetch(
        &self,
        urls: &[String],
        deadline: Option<Duration>,
    ) -> Result<Vec<u8>, VerifyError> {
        let url = {
            let mut rng = rand::thread_rng();
            urls.choose(&mut rng)
        }
        .ok_or_else(|| VerifyError::Transport("no validation hosts configured".into()))?;
        tracing::debug!(host = host_of(url), "querying single validation server");

        within_deadline(deadline, async {
            self.fetcher.get(url).await.map_err(VerifyError::Transport)
        })
        .await
    }
}

/// Bound `fut` by `deadline`; dropping it on expiry cancels whatever it
/// was waiting on.
pub(crate) async fn within_deadline<T, Fut>(
    deadline: Option<Duration>,
    fut: Fut,
) -> Result<T, VerifyError>
where
    Fut: Future<Output = Result<T, VerifyError>>,
{
    match deadline {
        Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
            VerifyError::Transport(format!("no validation server answered within {limit:?}"))
        })?,
        None => fut.await,
    }
}

/// Authority part of a verify URL, for logging without the query.
pub(crate) fn host_of(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    rest.split(|c: char| c == '/' || c == '?').next().unwrap_or(rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recording {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Fetch for Recording {
        async fn get(&self, url: &str) -> Result<Vec<u8>, String> {
            self.seen.lock().unwrap().push(url.to_string());
            Ok(url.as_bytes().to_vec())
        }
    }

    struct Stalled;

    #[async_trait]
    impl Fetch for Stalled {
        async fn get(&self, _url: &str) -> Result<Vec<u8>, String> {
            std::future::pending().await
        }
    }

    fn urls() -> Vec<String> {
        (1..=5)
            .map(|i| format!("https://api{i}.example.org/wsapi/2.0/verify?id=1"))
            .collect()
    }

    #[test]
    fn host_of_strips_scheme_and_query() {
        assert_eq!(
            host_of("https://api.yubico.com/wsapi/2.0/verify?otp=x"),
            "api.yubico.com"
        );
        assert_eq!(host_of("http://127.0.0.1:8080?x"), "127.0.0.1:8080");
        assert_eq!(host_of("api.yubico.com"), "api.yubico.com");
    }

    #[tokio::test]
    async fn random_host_issues_exactly_one_request() {
        let transport = RandomHostTransport::with_fetcher(Recording {
            seen: Mutex::new(Vec::new()),
        });
        let urls = urls();
        let body = transport.fetch(&urls, None).await.unwrap();

        let seen = transport.fetcher.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(urls.contains(&seen[0]));
        assert_eq!(body, seen[0].as_bytes());
    }

    #[tokio::test]
    async fn random_host_without_hosts_fails() {
        let transport = RandomHostTransport::with_fetcher(Stalled);
        let err = transport.fetch(&[], None).await.unwrap_err();
        assert!(matches!(err, VerifyError::Transport(_)));
    }

    #[tokio::test]
    async fn deadline_expires() {
        let transport = RandomHostTransport::with_fetcher(Stalled);
        let err = transport
            .fetch(&urls(), Some(Duration::from_millis(20)))
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::Transport(msg) if msg.contains("within")));
    }

    #[test]
    fn reqwest_fetch_builds() {
        assert!(ReqwestFetch::new().is_ok());
    }
}
