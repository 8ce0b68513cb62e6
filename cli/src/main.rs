mod commands;
mod storage;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::verify::ValidatorArgs;

#[derive(Parser)]
#[command(name = "yubiverify", about = "Verify YubiKey OTPs against the validation service")]
struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, env = "YUBIVERIFY_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a one-time password
    Verify {
        /// The OTP, as typed by the YubiKey
        otp: String,

        #[command(flatten)]
        args: ValidatorArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Set a config value (empty value clears it)
    Set { key: String, value: String },
    /// Get a config value
    Get { key: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let result = match cli.command {
        Commands::Verify { otp, args } => commands::verify::run(&otp, args).await,
        Commands::Config { action } => match action {
            ConfigAction::Set { key, value } => commands::config::set(&key, &value).map(|_| true),
            ConfigAction::Get { key } => commands::config::get(&key).map(|_| true),
        },
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            std::process::exit(1);
        }
    }
}
