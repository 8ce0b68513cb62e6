//! Test doubles for code that embeds a [`Validator`](crate::Validator).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use yubiverify_proto::VerifyError;

use crate::random::RandomSource;
use crate::transport::Transport;

/// A [`Transport`] that answers every fetch with the same canned result and
/// records the URLs it was asked for.
#[derive(Debug)]
pub struct CannedTransport {
    reply: Result<Vec<u8>, String>,
    calls: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

impl CannedTransport {
    /// Always answer with `body`.
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self::with_reply(Ok(body.into()))
    }

    /// Always fail as if no host could be reached.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_reply(Err(message.into()))
    }

    fn with_reply(reply: Result<Vec<u8>, String>) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
        }
    }

    /// Number of fetches so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// URLs passed to the most recent fetch.
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().map(|u| u.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Transport for CannedTransport {
    async fn fetch(
        &self,
        urls: &[String],
        _deadline: Option<Duration>,
    ) -> Result<Vec<u8>, VerifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.urls.lock() {
            *seen = urls.to_vec();
        }
        self.reply.clone().map_err(VerifyError::Transport)
    }
}

/// A [`RandomSource`] that always returns the same nonce.
#[derive(Debug, Clone)]
pub struct FixedNonce(String);

impl FixedNonce {
    pub fn new(nonce: impl Into<String>) -> Self {
        Self(nonce.into())
    }
}

impl RandomSource for FixedNonce {
    fn nonce(&self) -> String {
        self.0.clone()
    }
}
