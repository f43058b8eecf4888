use crate::web3::contracts::core::contract::Contract;
use crate::web3::contracts::core::error::ContractResult;
use alloy::primitives::Address;

#[derive(Clone)]
pub struct RelayHubContract<P: alloy_provider::Provider> {
    instance: Contract<P>,
}

impl<P: alloy_provider::Provider> RelayHubContract<P> {
    pub fn new(address: Address, provider: P, abi_file_path: &str) -> ContractResult<Self> {
        let instance = Contract::new(address, provider, abi_file_path)?;
        Ok(Self { instance })
    }

    pub fn address(&self) -> Address {
        self.instance.address()
    }

    pub async fn stake_manager(&self) -> ContractResult<Address> {
        self.instance.call_address_getter("stakeManager").await
    }

    pub async fn penalizer(&self) -> ContractResult<Address> {
        self.instance.call_address_getter("penalizer").await
    }
}
