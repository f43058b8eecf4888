use alloy::primitives::Address;
use log::debug;

use crate::models::GsnContractsDeployment;
use crate::web3::contracts::{
    core::error::{ContractError, ContractResult},
    implementations::relay_hub_contract::RelayHubContract,
};

#[derive(Clone)]
pub struct Contracts<P: alloy_provider::Provider> {
    pub relay_hub: RelayHubContract<P>,
    pub deployment: GsnContractsDeployment,
}

/// Resolves a full deployment starting from the RelayHub address.
///
/// Addresses that are not set explicitly are read from the hub itself.
pub struct ContractBuilder<P: alloy_provider::Provider + Clone> {
    provider: P,
    relay_hub: Option<Address>,
    stake_manager: Option<Address>,
    penalizer: Option<Address>,
    version_registry: Option<Address>,
}

impl<P: alloy_provider::Provider + Clone> ContractBuilder<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            relay_hub: None,
            stake_manager: None,
            penalizer: None,
            version_registry: None,
        }
    }

    pub fn with_relay_hub(mut self, address: Address) -> Self {
        self.relay_hub = Some(address);
        self
    }

    pub fn with_stake_manager(mut self, address: Option<Address>) -> Self {
        self.stake_manager = address;
        self
    }

    pub fn with_penalizer(mut self, address: Option<Address>) -> Self {
        self.penalizer = address;
        self
    }

    pub fn with_version_registry(mut self, address: Option<Address>) -> Self {
        self.version_registry = address;
        self
    }

    pub async fn build(self) -> ContractResult<Contracts<P>> {
        let relay_hub_address = self
            .relay_hub
            .ok_or_else(|| ContractError::MissingDeployment("RelayHub not set".into()))?;
        let relay_hub = RelayHubContract::new(relay_hub_address, self.provider, "relay_hub.json")?;

        let stake_manager_address = match self.stake_manager {
            Some(address) => address,
            None => relay_hub.stake_manager().await?,
        };
        if stake_manager_address == Address::ZERO {
            return Err(ContractError::MissingDeployment(format!(
                "RelayHub {relay_hub_address} has no StakeManager"
            )));
        }

        let penalizer_address = match self.penalizer {
            Some(address) => Some(address),
            None => Some(relay_hub.penalizer().await?).filter(|address| !address.is_zero()),
        };

        debug!(
            "Resolved deployment: hub {relay_hub_address}, stake manager {stake_manager_address}, penalizer {penalizer_address:?}"
        );

        Ok(Contracts {
            relay_hub,
            deployment: GsnContractsDeployment {
                relay_hub_address,
                stake_manager_address,
                penalizer_address,
                version_registry_address: self.version_registry,
            },
        })
    }
}
