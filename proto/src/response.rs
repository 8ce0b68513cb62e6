//! Response body parsing.

use std::collections::BTreeMap;

use crate::error::VerifyError;
use crate::wire::fields;

/// Parsed `key=value` response fields.
///
/// Always contains `status` and `h`; everything else is optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValueResponse {
    fields: BTreeMap<String, String>,
}

impl KeyValueResponse {
    /// Parse a raw response body.
    ///
    /// Each line is split on its first `=`; values are trimmed, keys are
    /// taken as-is. Lines without `=` are skipped and a repeated key keeps
    /// its last value.
    pub fn parse(raw: &[u8]) -> Result<Self, VerifyError> {
        let body = std::str::from_utf8(raw).map_err(|_| VerifyError::NonTextBody)?;
        if !body.contains('\n') {
            return Err(VerifyError::NoLineBreak);
        }

        let fields: BTreeMap<String, String> = body
            .split('\n')
            .filter_map(|line| line.split_once('='))
            .map(|(k, v)| (k.to_string(), v.trim().to_string()))
            .collect();

        if !fields.contains_key(fields::SIGNATURE) {
            return Err(VerifyError::MissingField(fields::SIGNATURE));
        }
        if !fields.contains_key(fields::STATUS) {
            return Err(VerifyError::MissingField(fields::STATUS));
        }

        Ok(Self { fields })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn status(&self) -> &str {
        self.get(fields::STATUS).unwrap_or_default()
    }

    /// The server's `h` value.
    pub fn signature(&self) -> &str {
        self.get(fields::SIGNATURE).unwrap_or_default()
    }

    /// Every field except `h`, i.e. what the server signed.
    pub fn signed_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .filter(|(k, _)| k.as_str() != fields::SIGNATURE)
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
