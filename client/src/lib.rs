//! Client for the YubiKey OTP validation service.
//!
//! A [`Validator`] sends each verify request to every configured host at
//! once, takes the first answer, and authenticates it before handing back a
//! [`Verification`].
//!
//! ```no_run
//! # async fn run() -> Result<(), yubiverify::VerifyError> {
//! use yubiverify::{HttpTransport, Validator, ValidatorConfig};
//!
//! let validator = Validator::new(ValidatorConfig::default(), HttpTransport::https()?);
//! let result = validator.verify("vvbvdirtrlvddetcvnndcufrjdjukelgfrtfnnfbijui").await?;
//! if result.success() {
//!     println!("key {}", result.id()?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod fanout;
pub mod random;
pub mod testing;
pub mod transport;
pub mod validator;

pub use config::{ValidatorConfig, DEFAULT_HOSTS};
pub use fanout::{HttpTransport, RacingTransport};
pub use random::{OsRandom, RandomSource};
pub use transport::{Fetch, RandomHostTransport, ReqwestFetch, Transport};
pub use validator::Validator;

pub use yubiverify_proto::{
    ClientCredentials, ErrorKind, KeyValueResponse, Otp, Status, Verification, VerifyError,
};
