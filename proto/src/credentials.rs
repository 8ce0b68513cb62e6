//! API client credentials.

use std::fmt;

use base64::Engine;
use zeroize::Zeroizing;

use crate::error::VerifyError;

/// Client id plus the shared HMAC key issued with it.
///
/// The secret is handed out base64-encoded; it is decoded once here and
/// the raw key bytes are wiped on drop.
#[derive(Clone)]
pub struct ClientCredentials {
    id: String,
    key: Zeroizing<Vec<u8>>,
}

impl ClientCredentials {
    pub fn new(id: impl Into<String>, secret_b64: &str) -> Result<Self, VerifyError> {
        let key = base64::engine::general_purpose::STANDARD.decode(secret_b64.trim())?;
        Ok(Self {
            id: id.into(),
            key: Zeroizing::new(key),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Raw HMAC key.
    pub fn key(&self) -> &[u8] {
        &self.key
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("id", &self.id)
            .field("key", &"<redacted>")
            .finish()
    }
}
