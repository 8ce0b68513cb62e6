//! OTP and nonce value types.
//!
//! Both are validated on construction, so anything holding an [`Otp`] or a
//! [`Nonce`] already satisfies the shape rules of the validation protocol.

use std::fmt;
use std::str::FromStr;

use crate::error::VerifyError;

/// Shortest OTP accepted (a bare passcode without identity prefix).
pub const OTP_MIN_LEN: usize = 32;
/// Longest OTP accepted (16-character identity prefix plus passcode).
pub const OTP_MAX_LEN: usize = 48;
/// Length of the one-time passcode suffix.
pub const PASSCODE_LEN: usize = 32;

pub const NONCE_MIN_LEN: usize = 16;
pub const NONCE_MAX_LEN: usize = 40;

/// Printable ASCII, space included (POSIX `[:print:]`).
fn is_printable(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7e).contains(&b))
}

/// A YubiKey OTP: 32 to 48 printable characters.
///
/// The last [`PASSCODE_LEN`] characters are the one-time passcode; anything
/// before them is the token's public identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Otp(String);

impl Otp {
    pub fn parse(otp: &str) -> Result<Self, VerifyError> {
        if !(OTP_MIN_LEN..=OTP_MAX_LEN).contains(&otp.len()) || !is_printable(otp) {
            return Err(VerifyError::InvalidOtp);
        }
        Ok(Self(otp.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The public identity prefix, if the OTP carries one.
    pub fn identity(&self) -> Option<&str> {
        // ASCII only, so byte offsets are char boundaries.
        let prefix = &self.0[..self.0.len() - PASSCODE_LEN];
        (!prefix.is_empty()).then_some(prefix)
    }
}

impl FromStr for Otp {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Otp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Single-use request nonce: 16 to 40 printable characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nonce(String);

impl Nonce {
    pub fn new(nonce: impl Into<String>) -> Result<Self, VerifyError> {
        let nonce = nonce.into();
        if !(NONCE_MIN_LEN..=NONCE_MAX_LEN).contains(&nonce.len()) || !is_printable(&nonce) {
            return Err(VerifyError::InvalidNonce);
        }
        Ok(Self(nonce))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
