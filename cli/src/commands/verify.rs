//! `yubiverify verify <OTP>`: check one OTP against the validation service.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use yubiverify::{
    ClientCredentials, HttpTransport, RandomHostTransport, Transport, Validator, ValidatorConfig,
    Verification, VerifyError,
};

use crate::storage::{self, Config, Mode};

/// Overrides for the values in ~/.yubiverify/config.toml.
#[derive(Debug, Default, Args)]
pub struct ValidatorArgs {
    /// API client id (required to sign requests)
    #[arg(long, env = "YUBIVERIFY_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Base64 API secret key (required to sign requests)
    #[arg(long, env = "YUBIVERIFY_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Validation host; repeat to query several
    #[arg(long = "host", env = "YUBIVERIFY_HOSTS", value_delimiter = ',')]
    pub hosts: Vec<String>,

    /// Give up after this many seconds
    #[arg(long, env = "YUBIVERIFY_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Query a single random host instead of racing all of them
    #[arg(long, env = "YUBIVERIFY_SINGLE")]
    pub single: bool,
}

/// Verify `otp` and print the verdict. Returns whether the OTP was accepted.
pub async fn run(otp: &str, args: ValidatorArgs) -> Result<bool> {
    let file = storage::load_config()?;
    let (config, mode) = resolve(args, file)?;

    let outcome = match mode {
        Mode::Race => verify_with(config, HttpTransport::https()?, otp).await,
        Mode::Single => verify_with(config, RandomHostTransport::https()?, otp).await,
    };

    let mut out = String::new();
    let accepted = report(&outcome, &mut out);
    print!("{out}");
    Ok(accepted)
}

async fn verify_with<T: Transport>(
    config: ValidatorConfig,
    transport: T,
    otp: &str,
) -> Result<Verification, VerifyError> {
    Validator::new(config, transport).verify(otp).await
}

/// Merge command-line overrides over the config file.
fn resolve(args: ValidatorArgs, file: Config) -> Result<(ValidatorConfig, Mode)> {
    let mut config = ValidatorConfig::default();

    let hosts = if args.hosts.is_empty() { file.hosts } else { args.hosts };
    if !hosts.is_empty() {
        config = config.with_hosts(hosts);
    }

    match (args.client_id.or(file.client_id), args.client_secret.or(file.client_secret)) {
        (Some(id), Some(secret)) => {
            let creds = ClientCredentials::new(id, &secret).context("invalid client secret")?;
            config = config.with_credentials(creds);
        }
        (None, None) => {}
        (Some(_), None) => anyhow::bail!("client id given without a client secret"),
        (None, Some(_)) => anyhow::bail!("client secret given without a client id"),
    }

    match args.timeout.or(file.timeout_secs) {
        Some(0) => anyhow::bail!("timeout must be at least one second"),
        Some(secs) => config = config.with_timeout(Duration::from_secs(secs)),
        None => {}
    }

    let mode = if args.single { Mode::Single } else { file.mode };
    tracing::debug!(
        hosts = config.hosts.len(),
        signed = config.credentials.is_some(),
        %mode,
        "resolved validator settings"
    );
    Ok((config, mode))
}

/// Render the verdict lines. Returns whether the OTP was accepted.
fn report(outcome: &Result<Verification, VerifyError>, out: &mut String) -> bool {
    match outcome {
        Ok(v) if v.success() => {
            out.push_str("OK\n");
            match v.id() {
                Ok(id) => {
                    out.push_str(&format!("ID: {id}\n"));
                    true
                }
                // Accepted, but there is no identity to bind to an account.
                Err(e) => {
                    out.push_str(&format!("ERROR: {e}\n"));
                    false
                }
            }
        }
        Ok(v) => {
            out.push_str(&format!("FAILED\nERROR: {}\n", v.status()));
            false
        }
        Err(e) => {
            out.push_str(&format!("ERROR: {e}\n"));
            false
        }
    }
}
