//! Outcome of an authenticated verify call.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::VerifyError;
use crate::otp::Otp;
use crate::response::KeyValueResponse;
use crate::wire::{fields, Status};

/// Trailing characters of `t` that are not part of the wall-clock time.
///
/// Servers append four digits after the `Z`. Their meaning is undocumented
/// (possibly milliseconds), so they are stripped and ignored.
const TIMESTAMP_SUFFIX_LEN: usize = 4;

/// An authenticated server answer for one OTP.
///
/// A non-`OK` status is still a valid answer: [`success`](Self::success)
/// tells acceptance apart from authenticity.
#[derive(Debug, Clone)]
pub struct Verification {
    otp: Otp,
    response: KeyValueResponse,
}

impl Verification {
    /// Wrap a response that has already passed signature and echo checks.
    pub fn new(otp: Otp, response: KeyValueResponse) -> Self {
        Self { otp, response }
    }

    pub fn success(&self) -> bool {
        self.status() == Status::Ok.as_str()
    }

    /// Raw status token.
    pub fn status(&self) -> &str {
        self.response.status()
    }

    pub fn status_code(&self) -> Status {
        Status::parse(self.status())
    }

    /// Server time from the `t` field, in UTC.
    pub fn timestamp(&self) -> Result<DateTime<Utc>, VerifyError> {
        let t = self
            .response
            .get(fields::TIMESTAMP)
            .ok_or(VerifyError::MissingField(fields::TIMESTAMP))?;
        parse_timestamp(t)
    }

    /// The public identity of the token that produced the OTP.
    pub fn id(&self) -> Result<&str, VerifyError> {
        self.otp.identity().ok_or(VerifyError::NoIdentity)
    }

    /// The OTP that was verified.
    pub fn otp(&self) -> &Otp {
        &self.otp
    }

    /// Percentage of servers that synchronized before answering, if reported.
    pub fn sync_level(&self) -> Option<u8> {
        self.response
            .get(fields::SYNC_LEVEL)
            .and_then(|sl| sl.parse().ok())
            .filter(|sl| *sl <= 100)
    }

    /// Any other response field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.response.get(field)
    }
}

fn parse_timestamp(t: &str) -> Result<DateTime<Utc>, VerifyError> {
    let invalid = || VerifyError::InvalidTimestamp(t.to_string());

    let cut = t
        .len()
        .checked_sub(TIMESTAMP_SUFFIX_LEN)
        .filter(|cut| t.is_char_boundary(*cut))
        .ok_or_else(invalid)?;
    let wall_clock = &t[..cut];

    if let Ok(dt) = DateTime::parse_from_rfc3339(wall_clock) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(wall_clock, "%Y-%m-%dT%H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|_| invalid())
}
