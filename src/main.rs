//! ABEX price feed deployer.
//!
//! ```text
//!   deployments.json ──▶ registry ──┐
//!   --sender-private-key ─▶ wallet ─┤
//!   --attestation ──────▶ call chain ┼──▶ submitter ──▶ JSON-RPC node
//!   --network / --rpc-url ─▶ endpoints ┘                     │
//!                                                            ▼
//!                                     receipt (stdout, pretty JSON)
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use base64::Engine;
use clap::Parser;

use abex_deployer::blockchain::Address;
use abex_deployer::config::{load_config, validate_config, ConfigError, DeployerConfig};
use abex_deployer::deploy::{self, DeployParams, PriceFeedTargets};
use abex_deployer::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "abex-deployer")]
#[command(about = "Create oracle price feeds for an ABEX deployment", long_about = None)]
struct Cli {
    /// Network name (devnet, testnet, mainnet). Unknown names use devnet.
    #[arg(long)]
    network: Option<String>,

    /// Base64 Ed25519 secret key.
    #[arg(long, env = "ABEX_SENDER_PRIVATE_KEY", default_value = "", hide_env_values = true)]
    sender_private_key: String,

    #[arg(long, default_value = "./deployments.json")]
    deployments_file: PathBuf,

    #[arg(long)]
    pyth_package_address: Address,

    #[arg(long)]
    pyth_state_address: Address,

    #[arg(long)]
    worm_package_address: Address,

    #[arg(long)]
    worm_state_address: Address,

    /// Base64 price update payload to verify and register.
    #[arg(long)]
    attestation: String,

    /// TOML settings file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Replaces the network's built-in RPC endpoint.
    #[arg(long)]
    rpc_url: Option<String>,

    /// Gas budget in MIST.
    #[arg(long)]
    gas_budget: Option<u64>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    /// Settings file (or defaults) with flag overrides applied.
    fn settings(&self) -> Result<DeployerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => DeployerConfig::default(),
        };

        // An empty name counts as not given.
        if let Some(network) = self.network.as_ref().filter(|n| !n.is_empty()) {
            config.network.name = network.clone();
        }
        if let Some(rpc_url) = &self.rpc_url {
            config.network.rpc_url = Some(rpc_url.clone());
        }
        if let Some(gas_budget) = self.gas_budget {
            config.transaction.gas_budget = gas_budget;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.network.request_timeout_secs = timeout_secs;
        }
        config.observability.json_logs |= self.json_logs;

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    fn params(&self) -> Result<DeployParams, base64::DecodeError> {
        let attestation = base64::engine::general_purpose::STANDARD.decode(self.attestation.trim())?;
        Ok(DeployParams {
            secret_key: self.sender_private_key.clone(),
            deployments_file: self.deployments_file.clone(),
            targets: PriceFeedTargets {
                pyth_package: self.pyth_package_address,
                pyth_state: self.pyth_state_address,
                worm_package: self.worm_package_address,
                worm_state: self.worm_state_address,
            },
            attestation,
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.settings() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    logging::init_logging(
        &config.observability.log_level,
        config.observability.json_logs,
    );
    let recorder = if config.observability.metrics_summary {
        metrics::install_recorder()
    } else {
        None
    };

    tracing::info!("abex-deployer v{} starting", env!("CARGO_PKG_VERSION"));

    let params = match cli.params() {
        Ok(params) => params,
        Err(e) => {
            tracing::error!(error = %e, "Attestation is not valid base64");
            return ExitCode::from(2);
        }
    };

    let outcome = deploy::run(&params, &config).await;

    if let Some(handle) = &recorder {
        metrics::log_snapshot(handle);
    }

    match outcome {
        Ok(receipt) => match serde_json::to_string_pretty(&receipt) {
            Ok(rendered) => {
                println!("{}", rendered);
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!(error = %e, digest = %receipt.digest, "Cannot render receipt");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "Deployment failed");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
