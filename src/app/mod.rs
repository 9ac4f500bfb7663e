mod config;
pub mod log;

pub use config::Config;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::keys::{Address, Wallet};
use crate::request::{decode_result, RequestConfig, ReturnType};
use crate::secrets::{self, prompt, GatewaySecretsManager, JsonRpcProvider, UploadOptions};
use crate::simulator::{simulate_script, SimulationResult};
use crate::util::Error;
use crate::{log_debug, log_info};
use log::LogLevel;

const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CONFIG_FILE: &str = "functions.toml";

#[derive(Debug, Parser)]
#[command(name = "monobank-functions", version, about = "Monobank oracle scripts and secrets tooling")]
pub struct Cli {
    /// Path of the TOML config; created with defaults when missing
    #[arg(short, long, value_name = "FILE", default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// Overrides the config's log level
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a script locally and print what it returns
    Simulate {
        #[arg(value_enum)]
        script: ScriptName,

        #[command(flatten)]
        credentials: Credentials,
    },
    /// Encrypt the Monobank credentials and store them in the DON
    UploadSecrets {
        #[arg(long, env = "RPC_URL")]
        rpc_url: String,

        #[arg(long, env = "CHAINLINK_SECRET_SLOT_ID")]
        slot_id: u8,

        #[command(flatten)]
        credentials: Credentials,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ScriptName {
    Collateral,
    ExchangeRate,
}

#[derive(Clone, Debug, Default, Args)]
pub struct Credentials {
    #[arg(long, env = "MONOBANK_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "MONOBANK_IBAN", hide_env_values = true)]
    pub iban: Option<String>,
}

pub async fn run(cli: Cli) -> Result<(), Error> {
    if let Some(level) = cli.log_level {
        log::set_level(level);
    }
    let config = Config::load_or_create(&cli.config)?;
    log::set_level(cli.log_level.unwrap_or(config.log_level));
    log_info!("Starting monobank-functions version {}", VERSION);

    match cli.command {
        Command::Simulate {
            script,
            credentials,
        } => simulate(&config, script, credentials).await,
        Command::UploadSecrets {
            rpc_url,
            slot_id,
            credentials,
        } => upload(&config, &rpc_url, slot_id, credentials).await,
    }
}

/// Builds the request for `script` against the configured Monobank API.
pub fn request_for(config: &Config, script: ScriptName, credentials: Credentials) -> RequestConfig {
    match script {
        ScriptName::Collateral => RequestConfig::off_chain_collateral(
            &config.monobank_api_url,
            credentials.api_key,
            credentials.iban,
        ),
        ScriptName::ExchangeRate => RequestConfig::usd_exchange_rate(&config.monobank_api_url),
    }
}

/// The lines `simulate` prints, on stdout/stderr regardless of log level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptOutput {
    pub response: Option<String>,
    pub error: Option<String>,
}

impl ScriptOutput {
    pub fn new(result: &SimulationResult, return_type: ReturnType) -> Result<Self, Error> {
        let response = match &result.response_bytes_hexstring {
            Some(hex) => Some(format!(
                "Response returned by script {}",
                decode_result(hex, return_type)?
            )),
            None => None,
        };
        let error = result
            .error_string
            .as_ref()
            .map(|err| format!("Error returned by script: {}", err));
        Ok(Self { response, error })
    }

    pub fn print(&self) {
        if let Some(line) = &self.response {
            println!("{}", line);
        }
        if let Some(line) = &self.error {
            eprintln!("{}", line);
        }
    }
}

async fn simulate(config: &Config, script: ScriptName, credentials: Credentials) -> Result<(), Error> {
    let request = request_for(config, script, credentials);
    log_info!("Simulating {}", request.source());
    log_debug!("{:?}", request);

    let result = simulate_script(&request, &config.simulation_limits()).await;
    // Script failures are reported, not propagated.
    ScriptOutput::new(&result, request.expected_return_type())?.print();
    Ok(())
}

async fn upload(
    config: &Config,
    rpc_url: &str,
    slot_id: u8,
    credentials: Credentials,
) -> Result<(), Error> {
    let secrets = secrets::collect_secrets(credentials.api_key, credentials.iban)?;

    let private = prompt::prompt_private_key()?;
    let wallet = Wallet::new(&private)?;
    log_info!("Using address {}", wallet.address());

    let router: Address = config.router_address.parse()?;
    let provider = JsonRpcProvider::new(rpc_url)?;
    let mut manager = GatewaySecretsManager::new(provider, wallet, router, config.don_id.clone())?;

    let options = UploadOptions {
        slot_id,
        gateway_urls: config.gateway_urls.clone(),
        minutes_until_expiration: config.secrets_expiration_minutes,
    };
    secrets::upload_secrets(&mut manager, &secrets, &options).await?;
    Ok(())
}
