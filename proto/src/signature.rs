//! HMAC-SHA1 request and response signatures (the `h` parameter).
//!
//! The signed plaintext is built by sorting the parameters by key and joining
//! them as `key=value` pairs with `&`, *without* percent-encoding. This equals
//! url-decoding the form-encoded sorted query, which is how the server side
//! defines it.
//!
//! ```text
//! h = base64(HMAC-SHA1(key, "k1=v1&k2=v2&..."))    keys in byte order
//! ```

use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::error::VerifyError;

type HmacSha1 = Hmac<Sha1>;

/// Build the plaintext that gets signed. Parameter order does not matter.
pub fn canonical_string<'a, I>(params: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut pairs: Vec<(&str, &str)> = params.into_iter().collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn keyed_mac(key: &[u8]) -> HmacSha1 {
    HmacSha1::new_from_slice(key).expect("HMAC accepts keys of any length")
}

/// Compute the base64 `h` value over `params`.
pub fn sign<'a, I>(params: I, key: &[u8]) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut mac = keyed_mac(key);
    mac.update(canonical_string(params).as_bytes());
    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

/// Check a received `h` value against `params` (which must not include `h`).
///
/// The digest comparison is constant-time.
pub fn verify<'a, I>(params: I, key: &[u8], received: &str) -> Result<(), VerifyError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let received = base64::engine::general_purpose::STANDARD
        .decode(received)
        .map_err(|_| VerifyError::ResponseSignatureMismatch)?;

    let mut mac = keyed_mac(key);
    mac.update(canonical_string(params).as_bytes());
    mac.verify_slice(&received)
        .map_err(|_| VerifyError::ResponseSignatureMismatch)
}
