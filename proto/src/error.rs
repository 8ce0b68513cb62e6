use thiserror::Error;

/// Broad failure category, for callers that only need to branch on the kind
/// of problem rather than the exact cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed local input; nothing was sent.
    Format,
    /// No validation server produced a usable response.
    Transport,
    /// The response body could not be parsed.
    Protocol,
    /// The server rejected our signature, or we rejected theirs.
    Signature,
    /// The echoed nonce or OTP does not match what was sent.
    Consistency,
    /// The OTP carries no public identity prefix.
    NoIdentity,
}

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("invalid YubiKey OTP format")]
    InvalidOtp,

    #[error("invalid nonce: expected 16 to 40 printable characters")]
    InvalidNonce,

    #[error("invalid client secret: {0}")]
    InvalidSecret(#[from] base64::DecodeError),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("the response body is not valid UTF-8 text")]
    NonTextBody,

    #[error("the response body contains no line breaks")]
    NoLineBreak,

    #[error("missing \"{0}\" key in the response body")]
    MissingField(&'static str),

    #[error("invalid request signature")]
    BadRequestSignature,

    #[error("response signature does not match with expected value")]
    ResponseSignatureMismatch,

    #[error("unexpected nonce value in response body")]
    NonceMismatch,

    #[error("unexpected otp value in response body")]
    OtpMismatch,

    #[error("YubiKey OTP does not contain a unique identifier")]
    NoIdentity,

    #[error("invalid timestamp in response body: {0}")]
    InvalidTimestamp(String),
}

impl VerifyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VerifyError::InvalidOtp | VerifyError::InvalidNonce | VerifyError::InvalidSecret(_) => {
                ErrorKind::Format
            }
            VerifyError::Transport(_) => ErrorKind::Transport,
            VerifyError::NonTextBody
            | VerifyError::NoLineBreak
            | VerifyError::MissingField(_)
            | VerifyError::InvalidTimestamp(_) => ErrorKind::Protocol,
            VerifyError::BadRequestSignature | VerifyError::ResponseSignatureMismatch => {
                ErrorKind::Signature
            }
            VerifyError::NonceMismatch | VerifyError::OtpMismatch => ErrorKind::Consistency,
            VerifyError::NoIdentity => ErrorKind::NoIdentity,
        }
    }
}
