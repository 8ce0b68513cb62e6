//! Wire vocabulary of the validation protocol, version 2.0.
//!
//! Responses are `\n`- (or `\r\n`-) separated `key=value` lines. The server
//! always includes `h` and `status`; `t`, `otp`, `nonce` and `sl` are
//! optional.

use std::fmt;

// ── Response field names ────────────────────────────────────────────────

pub mod fields {
    pub const SIGNATURE: &str = "h";
    pub const STATUS: &str = "status";
    pub const TIMESTAMP: &str = "t";
    pub const OTP: &str = "otp";
    pub const NONCE: &str = "nonce";
    pub const SYNC_LEVEL: &str = "sl";
}

// ── Status tokens ───────────────────────────────────────────────────────

/// Value of the `status` response field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// The OTP is valid.
    Ok,
    /// The OTP is invalid format.
    BadOtp,
    /// The OTP has already been seen by the service.
    ReplayedOtp,
    /// The HMAC signature verification failed.
    BadSignature,
    /// The request lacks a parameter.
    MissingParameter,
    /// The request id does not exist.
    NoSuchClient,
    /// The request id is not allowed to verify OTPs.
    OperationNotAllowed,
    /// Unexpected error in the server.
    BackendError,
    /// Server could not get requested number of syncs before timeout.
    NotEnoughAnswers,
    /// Server has seen the OTP/nonce combination before.
    ReplayedRequest,
    /// Anything this client does not know about.
    Other(String),
}

impl Status {
    pub fn parse(token: &str) -> Self {
        match token {
            "OK" => Status::Ok,
            "BAD_OTP" => Status::BadOtp,
            "REPLAYED_OTP" => Status::ReplayedOtp,
            "BAD_SIGNATURE" => Status::BadSignature,
            "MISSING_PARAMETER" => Status::MissingParameter,
            "NO_SUCH_CLIENT" => Status::NoSuchClient,
            "OPERATION_NOT_ALLOWED" => Status::OperationNotAllowed,
            "BACKEND_ERROR" => Status::BackendError,
            "NOT_ENOUGH_ANSWERS" => Status::NotEnoughAnswers,
            "REPLAYED_REQUEST" => Status::ReplayedRequest,
            other => Status::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Status::Ok => "OK",
            Status::BadOtp => "BAD_OTP",
            Status::ReplayedOtp => "REPLAYED_OTP",
            Status::BadSignature => "BAD_SIGNATURE",
            Status::MissingParameter => "MISSING_PARAMETER",
            Status::NoSuchClient => "NO_SUCH_CLIENT",
            Status::OperationNotAllowed => "OPERATION_NOT_ALLOWED",
            Status::BackendError => "BACKEND_ERROR",
            Status::NotEnoughAnswers => "NOT_ENOUGH_ANSWERS",
            Status::ReplayedRequest => "REPLAYED_REQUEST",
            Status::Other(s) => s,
        }
    }

    /// The server has already seen this OTP or this OTP/nonce pair.
    pub fn is_replay(&self) -> bool {
        matches!(self, Status::ReplayedOtp | Status::ReplayedRequest)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
