use alloy::providers::RootProvider;
use clap::Parser;
use log::info;
use shared::models::GsnStatistics;
use shared::web3::{ContractBuilder, ContractInteractor};
use tokio_util::sync::CancellationToken;

use crate::config::{
    parse_address, parse_optional_address, resolve_network_url, DeploymentArgs, StatusConfig,
    DEFAULT_GET_ADDRESS_TIMEOUT_MS, DEFAULT_MAX_CONCURRENT_RELAYS,
    DEFAULT_MAX_CONCURRENT_WORKER_BALANCES,
};
use crate::error::{StatusError, StatusResult};
use crate::printer::{render_json, render_statistics};
use crate::probe::HttpClient;
use crate::status::StatusLogic;

#[derive(Parser, Debug)]
#[command(author, version, about = "Print the status of a GSN relay network", long_about = None)]
pub struct Cli {
    /// Network: `localhost`, an RPC URL or an Infura network name (needs INFURA_ID)
    #[arg(short = 'n', long, default_value = "http://localhost:8545")]
    pub network: String,

    /// RelayHub address
    #[arg(long)]
    pub hub: Option<String>,

    /// StakeManager address, read from the RelayHub when omitted
    #[arg(long)]
    pub stake_manager: Option<String>,

    /// Penalizer address, read from the RelayHub when omitted
    #[arg(long)]
    pub penalizer: Option<String>,

    /// VersionRegistry address, only reported
    #[arg(long)]
    pub version_registry: Option<String>,

    /// Block explorer base URL used to link transactions
    #[arg(long)]
    pub block_explorer_url: Option<String>,

    /// Relay ping timeout in milliseconds (0 for no timeout)
    #[arg(long, default_value_t = DEFAULT_GET_ADDRESS_TIMEOUT_MS)]
    pub get_address_timeout_ms: u64,

    /// Maximum number of relays queried concurrently
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENT_RELAYS)]
    pub max_concurrent_relays: usize,

    /// Maximum number of worker balance reads in flight per relay
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENT_WORKER_BALANCES)]
    pub max_concurrent_worker_balances: usize,

    /// Print the snapshot as JSON
    #[arg(long, default_value = "false")]
    pub json: bool,

    /// Log level
    #[arg(short = 'l', long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    pub fn status_config(&self) -> StatusResult<StatusConfig> {
        let config = StatusConfig {
            block_explorer_url: self.block_explorer_url.clone(),
            get_address_timeout_ms: self.get_address_timeout_ms,
            max_concurrent_relays: self.max_concurrent_relays,
            max_concurrent_worker_balances: self.max_concurrent_worker_balances,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn deployment_args(&self) -> StatusResult<DeploymentArgs> {
        let hub = self.hub.as_deref().ok_or_else(|| {
            StatusError::Configuration("please specify the RelayHub address with --hub".into())
        })?;

        Ok(DeploymentArgs {
            relay_hub: parse_address("--hub", hub)?,
            stake_manager: parse_optional_address("--stake-manager", self.stake_manager.as_deref())?,
            penalizer: parse_optional_address("--penalizer", self.penalizer.as_deref())?,
            version_registry: parse_optional_address(
                "--version-registry",
                self.version_registry.as_deref(),
            )?,
        })
    }

    pub async fn run(self, cancellation_token: CancellationToken) -> anyhow::Result<()> {
        let deployment = self.deployment_args()?;
        let config = self.status_config()?;
        let infura_id = std::env::var("INFURA_ID").ok();
        let rpc_url = resolve_network_url(&self.network, infura_id.as_deref())?;

        let statistics = tokio::select! {
            result = gather(rpc_url, deployment, config) => result?,
            _ = cancellation_token.cancelled() => return Err(StatusError::Cancelled.into()),
        };

        if self.json {
            println!("{}", render_json(&statistics)?);
        } else {
            print!("{}", render_statistics(&statistics));
        }
        Ok(())
    }
}

async fn gather(
    rpc_url: url::Url,
    deployment: DeploymentArgs,
    config: StatusConfig,
) -> StatusResult<GsnStatistics> {
    info!("Connecting to {rpc_url}");
    let provider = RootProvider::new_http(rpc_url);
    let contracts = ContractBuilder::new(provider.clone())
        .with_relay_hub(deployment.relay_hub)
        .with_stake_manager(deployment.stake_manager)
        .with_penalizer(deployment.penalizer)
        .with_version_registry(deployment.version_registry)
        .build()
        .await?;

    let probe = HttpClient::new(config.get_address_timeout_ms)?;
    let logic = StatusLogic::new(ContractInteractor::new(provider, contracts), probe, config);
    logic.gather_statistics().await
}
