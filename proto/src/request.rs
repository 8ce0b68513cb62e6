//! Verification request construction.

use url::form_urlencoded;

use crate::credentials::ClientCredentials;
use crate::otp::{Nonce, Otp};
use crate::signature;

/// Path of the verify endpoint on every validation host.
pub const VERIFY_PATH: &str = "/wsapi/2.0/verify";

/// Client id sent when no credentials are configured.
pub const ANONYMOUS_CLIENT_ID: &str = "1";

/// Build the query string for a verify request.
///
/// Parameters go out in the order `id`, `nonce`, `otp`, `timestamp`, followed
/// by `h` when credentials are given. `timestamp=1` asks the server to include
/// its `t` field in the reply.
pub fn build_query(otp: &Otp, nonce: &Nonce, credentials: Option<&ClientCredentials>) -> String {
    let id = credentials.map_or(ANONYMOUS_CLIENT_ID, ClientCredentials::id);
    let mut params = vec![
        ("id", id.to_string()),
        ("nonce", nonce.as_str().to_string()),
        ("otp", otp.as_str().to_string()),
        ("timestamp", "1".to_string()),
    ];

    if let Some(creds) = credentials {
        let h = signature::sign(params.iter().map(|(k, v)| (*k, v.as_str())), creds.key());
        params.push(("h", h));
    }

    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
        .finish()
}

/// One verify URL per host, all carrying the same query.
pub fn verify_urls(hosts: &[String], query: &str) -> Vec<String> {
    hosts
        .iter()
        .map(|host| format!("https://{host}{VERIFY_PATH}?{query}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const OTP: &str = "vvbvdirtrlvddetcvnndcufrjdjukelgfrtfnnfbijui";
    const NONCE: &str = "602bbcad5b9f4790b591cd356a8f9a2b";

    #[test]
    fn unsigned_query_is_deterministic() {
        let otp = Otp::parse(OTP).unwrap();
        let nonce = Nonce::new(NONCE).unwrap();
        let q = build_query(&otp, &nonce, None);
        assert_eq!(q, format!("id=1&nonce={NONCE}&otp={OTP}&timestamp=1"));
        assert_eq!(q, build_query(&otp, &nonce, None));
    }

    #[test]
    fn signed_query_appends_h() {
        let otp = Otp::parse("vvbvdirtrlvdvvlfjurvlbudndrugkjukgvuhufuhfnt").unwrap();
        let nonce = Nonce::new("c49d1205699edc3ff19c12b1f5efbcfb").unwrap();
        let creds = ClientCredentials::new("30972", "wbEmh4faKEIOr6ro4wrgaAhskxc=").unwrap();
        let q = build_query(&otp, &nonce, Some(&creds));
        assert_eq!(
            q,
            "id=30972&nonce=c49d1205699edc3ff19c12b1f5efbcfb\
             &otp=vvbvdirtrlvdvvlfjurvlbudndrugkjukgvuhufuhfnt\
             &timestamp=1&h=4kw4sT9myD1pisyiknfo2pk93ig%3D"
        );
    }

    #[test]
    fn otp_is_form_encoded() {
        let otp = Otp::parse(&format!("a b+c&{}", "x".repeat(32))).unwrap();
        let nonce = Nonce::new(NONCE).unwrap();
        let q = build_query(&otp, &nonce, None);
        assert!(q.contains(&format!("otp=a+b%2Bc%26{}", "x".repeat(32))));
    }

    #[test]
    fn one_url_per_host() {
        let hosts = vec!["api.yubico.com".to_string(), "api2.yubico.com".to_string()];
        let urls = verify_urls(&hosts, "id=1");
        assert_eq!(
            urls,
            vec![
                "https://api.yubico.com/wsapi/2.0/verify?id=1",
                "https://api2.yubico.com/wsapi/2.0/verify?id=1",
            ]
        );
    }
}
