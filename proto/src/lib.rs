//! Protocol layer for the YubiKey OTP validation service (protocol 2.0).
//!
//! Pure functions and value types only: building and signing requests,
//! parsing and checking responses. Networking lives in the `yubiverify`
//! crate.

pub mod credentials;
pub mod error;
pub mod otp;
pub mod request;
pub mod response;
pub mod signature;
pub mod verification;
pub mod wire;

pub use credentials::ClientCredentials;
pub use error::{ErrorKind, VerifyError};
pub use otp::{Nonce, Otp};
pub use response::KeyValueResponse;
pub use verification::Verification;
pub use wire::Status;
