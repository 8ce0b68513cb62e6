//! The verify call: format check, request, race, parse, authenticate.

use yubiverify_proto::wire::{fields, Status};
use yubiverify_proto::{
    request, signature, ClientCredentials, KeyValueResponse, Nonce, Otp, Verification,
    VerifyError,
};

use crate::config::ValidatorConfig;
use crate::random::{OsRandom, RandomSource};
use crate::transport::Transport;

/// Verifies OTPs against the configured validation servers.
///
/// Holds no per-call state: every [`verify`](Self::verify) draws its own
/// nonce, so one validator can serve concurrent calls.
pub struct Validator<T, R = OsRandom> {
    config: ValidatorConfig,
    transport: T,
    random: R,
}

impl<T: Transport> Validator<T> {
    pub fn new(config: ValidatorConfig, transport: T) -> Self {
        Self::with_random(config, transport, OsRandom)
    }
}

impl<T: Transport, R: RandomSource> Validator<T, R> {
    pub fn with_random(config: ValidatorConfig, transport: T, random: R) -> Self {
        Self {
            config,
            transport,
            random,
        }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Verify `otp` with the validation service.
    ///
    /// A response that authenticates correctly is returned even when the
    /// server did not accept the OTP; check [`Verification::success`].
    pub async fn verify(&self, otp: &str) -> Result<Verification, VerifyError> {
        let otp = Otp::parse(otp)?;

        let nonce = Nonce::new(self.random.nonce())?;
        let credentials = self.config.credentials.as_ref();
        let query = request::build_query(&otp, &nonce, credentials);
        let urls = request::verify_urls(&self.config.hosts, &query);
        tracing::debug!(
            hosts = urls.len(),
            signed = credentials.is_some(),
            "sending verify request"
        );

        let body = self.transport.fetch(&urls, self.config.timeout).await?;

        let response = KeyValueResponse::parse(&body)?;
        authenticate(&response, &nonce, &otp, credentials).inspect_err(|e| {
            tracing::warn!(status = response.status(), "rejected verify response: {e}");
        })?;

        tracing::debug!(status = response.status(), "verify response authenticated");
        Ok(Verification::new(otp, response))
    }
}

/// Check that `response` answers the request we sent.
///
/// `BAD_SIGNATURE` comes first: our own check of such a body would fail as
/// well and hide the real cause. The signature is checked before any
/// content so a forged body cannot pass as a mere mismatch.
fn authenticate(
    response: &KeyValueResponse,
    nonce: &Nonce,
    otp: &Otp,
    credentials: Option<&ClientCredentials>,
) -> Result<(), VerifyError> {
    if response.status() == Status::BadSignature.as_str() {
        return Err(VerifyError::BadRequestSignature);
    }

    if let Some(creds) = credentials {
        signature::verify(response.signed_fields(), creds.key(), response.signature())?;
    }

    if response
        .get(fields::NONCE)
        .is_some_and(|echoed| echoed != nonce.as_str())
    {
        return Err(VerifyError::NonceMismatch);
    }

    if response
        .get(fields::OTP)
        .is_some_and(|echoed| echoed != otp.as_str())
    {
        return Err(VerifyError::OtpMismatch);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fanout::RacingTransport;
    use crate::testing::{CannedTransport, FixedNonce};
    use crate::transport::Fetch;
    use async_trait::async_trait;
    use std::time::Duration;
    use yubiverify_proto::ErrorKind;

    const OTP: &str = "vvbvdirtrlvddetcvnndcufrjdjukelgfrtfnnfbijui";
    const NONCE: &str = "602bbcad5b9f4790b591cd356a8f9a2b";

    const SIGNED_OTP: &str = "vvbvdirtrlvdvvlfjurvlbudndrugkjukgvuhufuhfnt";
    const SIGNED_NONCE: &str = "c49d1205699edc3ff19c12b1f5efbcfb";
    const CLIENT_ID: &str = "30972";
    const CLIENT_SECRET: &str = "wbEmh4faKEIOr6ro4wrgaAhskxc=";

    fn unsigned_body(status: &str, nonce: &str, otp: &str) -> String {
        format!(
            "h=1cvMn0ZT7ifIs0cJ4oZCZ3WjWpY=\r\nt=2017-01-02T14:03:28Z0637\r\n\
             otp={otp}\r\nnonce={nonce}\r\nsl=25\r\nstatus={status}\r\n\r\n"
        )
    }

    fn signed_body(h: &str, status: &str) -> String {
        format!(
            "h={h}\r\nt=2017-01-02T14:12:51Z0244\r\notp={SIGNED_OTP}\r\n\
             nonce={SIGNED_NONCE}\r\nsl=25\r\nstatus={status}\r\n\r\n"
        )
    }

    fn unsigned(body: String) -> Validator<CannedTransport, FixedNonce> {
        Validator::with_random(
            ValidatorConfig::default(),
            CannedTransport::new(body),
            FixedNonce::new(NONCE),
        )
    }

    fn signed(body: String) -> Validator<CannedTransport, FixedNonce> {
        let creds = ClientCredentials::new(CLIENT_ID, CLIENT_SECRET).unwrap();
        Validator::with_random(
            ValidatorConfig::default().with_credentials(creds),
            CannedTransport::new(body),
            FixedNonce::new(SIGNED_NONCE),
        )
    }

    #[tokio::test]
    async fn okay() {
        let v = unsigned(unsigned_body("OK", NONCE, OTP));
        let result = v.verify(OTP).await.unwrap();
        assert!(result.success());
        assert_eq!(result.id().unwrap(), "vvbvdirtrlvd");
        assert_eq!(
            result.timestamp().unwrap().format("%Y-%m-%d %H:%M:%S").to_string(),
            "2017-01-02 14:03:28"
        );
    }

    #[tokio::test]
    async fn replayed_request_is_a_result_not_an_error() {
        let v = unsigned(unsigned_body("REPLAYED_REQUEST", NONCE, OTP));
        let result = v.verify(OTP).await.unwrap();
        assert!(!result.success());
        assert_eq!(result.status(), "REPLAYED_REQUEST");
    }

    #[tokio::test]
    async fn replayed_otp_is_a_result_not_an_error() {
        let v = unsigned(unsigned_body("REPLAYED_OTP", NONCE, OTP));
        let result = v.verify(OTP).await.unwrap();
        assert!(!result.success());
        assert_eq!(result.status(), "REPLAYED_OTP");
    }

    #[tokio::test]
    async fn signed_okay() {
        let v = signed(signed_body("FVXNHjVXcHNZibTk2WWo4j4wJ5M=", "OK"));
        let result = v.verify(SIGNED_OTP).await.unwrap();
        assert!(result.success());
        assert_eq!(result.id().unwrap(), "vvbvdirtrlvd");
    }

    #[tokio::test]
    async fn signed_replay_with_valid_signature() {
        let v = signed(signed_body("aW5d7GVfyKRD+nepOk9z1i9av5c=", "REPLAYED_OTP"));
        let result = v.verify(SIGNED_OTP).await.unwrap();
        assert!(!result.success());
        assert!(result.status_code().is_replay());
    }

    #[tokio::test]
    async fn signed_request_carries_id_and_h() {
        let v = signed(signed_body("FVXNHjVXcHNZibTk2WWo4j4wJ5M=", "OK"));
        v.verify(SIGNED_OTP).await.unwrap();
        let urls = v.transport.urls();
        assert_eq!(urls.len(), 5);
        for url in &urls {
            assert!(url.contains("?id=30972&nonce="), "{url}");
            assert!(url.ends_with("&timestamp=1&h=4kw4sT9myD1pisyiknfo2pk93ig%3D"), "{url}");
        }
    }

    #[tokio::test]
    async fn one_url_per_host_with_identical_query() {
        let v = unsigned(unsigned_body("OK", NONCE, OTP));
        v.verify(OTP).await.unwrap();
        let urls = v.transport.urls();
        let query = format!("id=1&nonce={NONCE}&otp={OTP}&timestamp=1");
        assert_eq!(
            urls,
            vec![
                format!("https://api.yubico.com/wsapi/2.0/verify?{query}"),
                format!("https://api2.yubico.com/wsapi/2.0/verify?{query}"),
                format!("https://api3.yubico.com/wsapi/2.0/verify?{query}"),
                format!("https://api4.yubico.com/wsapi/2.0/verify?{query}"),
                format!("https://api5.yubico.com/wsapi/2.0/verify?{query}"),
            ]
        );
        assert_eq!(v.transport.calls(), 1);
    }

    #[tokio::test]
    async fn malformed_otp_never_reaches_the_network() {
        let v = unsigned(unsigned_body("OK", NONCE, OTP));
        for otp in [
            String::new(),
            "c".repeat(31),
            "c".repeat(49),
            format!("{}\n", "c".repeat(40)),
        ] {
            let err = v.verify(&otp).await.unwrap_err();
            assert!(matches!(err, VerifyError::InvalidOtp), "{otp:?}");
            assert_eq!(err.kind(), ErrorKind::Format);
        }
        assert_eq!(v.transport.calls(), 0);
    }

    #[tokio::test]
    async fn bad_nonce_source_never_reaches_the_network() {
        let v = Validator::with_random(
            ValidatorConfig::default(),
            CannedTransport::new(unsigned_body("OK", NONCE, OTP)),
            FixedNonce::new("short"),
        );
        assert!(matches!(
            v.verify(OTP).await,
            Err(VerifyError::InvalidNonce)
        ));
        assert_eq!(v.transport.calls(), 0);
    }

    #[tokio::test]
    async fn bad_signature_status_without_credentials() {
        let v = unsigned(unsigned_body("BAD_SIGNATURE", NONCE, OTP));
        let err = v.verify(OTP).await.unwrap_err();
        assert!(matches!(err, VerifyError::BadRequestSignature));
        assert_eq!(err.to_string(), "invalid request signature");
    }

    #[tokio::test]
    async fn bad_signature_status_takes_priority_over_mismatch() {
        // h is not valid for this body, which must not be what gets reported
        let v = signed(signed_body("FVXNHjVXcHNZibTk2WWo4j4wJ5M=", "BAD_SIGNATURE"));
        let err = v.verify(SIGNED_OTP).await.unwrap_err();
        assert!(matches!(err, VerifyError::BadRequestSignature));
    }

    #[tokio::test]
    async fn tampered_signed_response_is_rejected() {
        // valid h for OK, but the body says REPLAYED_OTP
        let v = signed(signed_body("FVXNHjVXcHNZibTk2WWo4j4wJ5M=", "REPLAYED_OTP"));
        let err = v.verify(SIGNED_OTP).await.unwrap_err();
        assert!(matches!(err, VerifyError::ResponseSignatureMismatch));
        assert_eq!(
            err.to_string(),
            "response signature does not match with expected value"
        );
    }

    #[tokio::test]
    async fn signature_is_checked_before_echoes() {
        let body = signed_body("FVXNHjVXcHNZibTk2WWo4j4wJ5M=", "OK")
            .replace(SIGNED_NONCE, "ffffffffffffffffffffffffffffffff");
        let err = signed(body).verify(SIGNED_OTP).await.unwrap_err();
        assert!(matches!(err, VerifyError::ResponseSignatureMismatch));
    }

    #[tokio::test]
    async fn unsigned_mode_ignores_h() {
        let body = unsigned_body("OK", NONCE, OTP).replace("1cvMn0ZT7ifIs0cJ4oZCZ3WjWpY=", "junk");
        assert!(unsigned(body).verify(OTP).await.unwrap().success());
    }

    #[tokio::test]
    async fn nonce_mismatch_even_when_ok() {
        let v = unsigned(unsigned_body("OK", "602bbcad5b9f4790b591cd356a8f9a2c", OTP));
        let err = v.verify(OTP).await.unwrap_err();
        assert!(matches!(err, VerifyError::NonceMismatch));
        assert_eq!(err.kind(), ErrorKind::Consistency);
    }

    #[tokio::test]
    async fn otp_mismatch() {
        let other = "vvbvdirtrlvdvvlfjurvlbudndrugkjukgvuhufuhfnt";
        let v = unsigned(unsigned_body("OK", NONCE, other));
        let err = v.verify(OTP).await.unwrap_err();
        assert!(matches!(err, VerifyError::OtpMismatch));
    }

    #[tokio::test]
    async fn echoes_are_optional() {
        let v = unsigned("h=x\nstatus=OK\n".to_string());
        let result = v.verify(OTP).await.unwrap();
        assert!(result.success());
        assert_eq!(result.id().unwrap(), "vvbvdirtrlvd");
    }

    #[tokio::test]
    async fn malformed_body_is_a_protocol_error() {
        for body in ["status=OK", "status=OK\nnonce=x\n", "<html>\n</html>\n"] {
            let err = unsigned(body.to_string()).verify(OTP).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Protocol, "{body:?}");
        }
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let v = Validator::with_random(
            ValidatorConfig::default(),
            CannedTransport::failing("connection refused"),
            FixedNonce::new(NONCE),
        );
        let err = v.verify(OTP).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn default_random_source_produces_valid_nonces() {
        let v = Validator::new(
            ValidatorConfig::default(),
            CannedTransport::new("h=x\nstatus=OK\n"),
        );
        assert!(v.verify(OTP).await.unwrap().success());
        let url = &v.transport.urls()[0];
        let nonce = url
            .split('&')
            .find_map(|kv| kv.strip_prefix("nonce="))
            .unwrap();
        assert_eq!(nonce.len(), 32);
    }

    /// Four hosts down or hanging, one answering.
    struct MostlyDown {
        body: String,
    }

    #[async_trait]
    impl Fetch for MostlyDown {
        async fn get(&self, url: &str) -> Result<Vec<u8>, String> {
            if url.starts_with("https://api3.yubico.com/") {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(self.body.clone().into_bytes())
            } else if url.starts_with("https://api4.yubico.com/") {
                std::future::pending().await
            } else {
                Err("connection timed out".into())
            }
        }
    }

    #[tokio::test]
    async fn race_survives_four_dead_hosts() {
        let v = Validator::with_random(
            ValidatorConfig::default(),
            RacingTransport::with_fetcher(MostlyDown {
                body: unsigned_body("OK", NONCE, OTP),
            }),
            FixedNonce::new(NONCE),
        );
        let result = v.verify(OTP).await.unwrap();
        assert!(result.success());
        assert_eq!(result.id().unwrap(), "vvbvdirtrlvd");
    }

    #[tokio::test]
    async fn deadline_from_config_reaches_transport() {
        let v = Validator::with_random(
            ValidatorConfig::default()
                .with_hosts(["api4.yubico.com"])
                .with_timeout(Duration::from_millis(20)),
            RacingTransport::with_fetcher(MostlyDown {
                body: String::new(),
            }),
            FixedNonce::new(NONCE),
        );
        let err = v.verify(OTP).await.unwrap_err();
        assert!(matches!(err, VerifyError::Transport(msg) if msg.contains("within")));
    }
}
