//! Validator configuration.

use std::time::Duration;

use yubiverify_proto::ClientCredentials;

/// The public validation servers.
pub const DEFAULT_HOSTS: [&str; 5] = [
    "api.yubico.com",
    "api2.yubico.com",
    "api3.yubico.com",
    "api4.yubico.com",
    "api5.yubico.com",
];

/// Settings fixed for the lifetime of a [`Validator`](crate::Validator).
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Hosts queried in parallel for every verify call.
    pub hosts: Vec<String>,
    /// Sign requests and verify response signatures when set.
    pub credentials: Option<ClientCredentials>,
    /// Give up if no host has answered within this long. `None` waits until
    /// every host has failed.
    pub timeout: Option<Duration>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            hosts: DEFAULT_HOSTS.iter().map(|h| h.to_string()).collect(),
            credentials: None,
            timeout: None,
        }
    }
}

impl ValidatorConfig {
    pub fn with_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_credentials(mut self, credentials: ClientCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
