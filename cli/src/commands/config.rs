//! `yubiverify config set/get`: config file management.

use crate::storage::{self, Config, Mode};
use anyhow::{Context, Result};

const KEYS: &str = "client_id, client_secret, hosts, timeout, mode";

pub fn set(key: &str, value: &str) -> Result<()> {
    let mut config = storage::load_config()?;
    apply(&mut config, key, value)?;
    storage::save_config(&config)?;
    eprintln!("{key} = {}", render(&config, key)?);
    Ok(())
}

pub fn get(key: &str) -> Result<()> {
    let config = storage::load_config()?;
    println!("{}", render(&config, key)?);
    Ok(())
}

/// Update one key. An empty value clears it.
fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let value = value.trim();
    let optional = |v: &str| (!v.is_empty()).then(|| v.to_string());

    match key {
        "client_id" => config.client_id = optional(value),
        "client_secret" => {
            if !value.is_empty() {
                yubiverify::ClientCredentials::new("", value)
                    .context("client_secret must be base64")?;
            }
            config.client_secret = optional(value);
        }
        "hosts" => {
            config.hosts = value
                .split(',')
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(String::from)
                .collect();
        }
        "timeout" => {
            config.timeout_secs = match value {
                "" => None,
                secs => {
                    let secs: u64 = secs.parse().context("timeout must be whole seconds")?;
                    if secs == 0 {
                        anyhow::bail!("timeout must be at least one second");
                    }
                    Some(secs)
                }
            };
        }
        "mode" => config.mode = if value.is_empty() { Mode::default() } else { value.parse()? },
        _ => anyhow::bail!("unknown config key: {key} (valid keys: {KEYS})"),
    }
    Ok(())
}

fn render(config: &Config, key: &str) -> Result<String> {
    Ok(match key {
        "client_id" => config.client_id.clone().unwrap_or_default(),
        // Never echo the secret itself.
        "client_secret" => match config.client_secret {
            Some(_) => "(set)".to_string(),
            None => String::new(),
        },
        "hosts" => config.hosts.join(","),
        "timeout" => config
            .timeout_secs
            .map(|s| s.to_string())
            .unwrap_or_default(),
        "mode" => config.mode.to_string(),
        _ => anyhow::bail!("unknown config key: {key} (valid keys: {KEYS})"),
    })
}
