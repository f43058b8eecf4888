mod relay_info;
pub mod stake_index;
mod statistics;

pub use relay_info::promote_status;
pub use stake_index::{RelaysByStakeStatus, StakeEventIndex};
pub use statistics::RUNTIME_VERSION;

use shared::web3::EventLedger;

use crate::config::StatusConfig;
use crate::probe::HealthProbe;

/// Builds [`shared::models::GsnStatistics`] from a ledger and a relay health probe.
pub struct StatusLogic<L, H> {
    ledger: L,
    probe: H,
    config: StatusConfig,
}

impl<L: EventLedger, H: HealthProbe> StatusLogic<L, H> {
    pub fn new(ledger: L, probe: H, config: StatusConfig) -> Self {
        Self {
            ledger,
            probe,
            config,
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    fn relay_concurrency(&self) -> usize {
        self.config.max_concurrent_relays.max(1)
    }

    fn worker_balance_concurrency(&self) -> usize {
        self.config.max_concurrent_worker_balances.max(1)
    }

    fn block_explorer_url(&self) -> Option<&str> {
        self.config.block_explorer_url.as_deref()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;

    use alloy::primitives::{address, Address, U256};
    use async_trait::async_trait;
    use shared::models::event::{
        RelayRegisteredEventInfo, RelayWorkersAddedEventInfo, StakeAddedEventInfo,
        StakeUnlockedEventInfo, StakeWithdrawnEventInfo,
    };
    use shared::models::{GsnContractsDeployment, GsnEvent, PingResponse};

    use crate::error::ProbeError;
    use crate::probe::HealthProbe;

    pub(crate) const HUB: Address = address!("0x00000000000000000000000000000000000000a1");
    pub(crate) const STAKE_MANAGER: Address = address!("0x00000000000000000000000000000000000000a2");
    pub(crate) const OWNER: Address = address!("0x00000000000000000000000000000000000000f0");

    pub(crate) fn deployment() -> GsnContractsDeployment {
        GsnContractsDeployment {
            relay_hub_address: HUB,
            stake_manager_address: STAKE_MANAGER,
            penalizer_address: None,
            version_registry_address: None,
        }
    }

    pub(crate) fn stake_added(manager: Address, owner: Address) -> GsnEvent {
        GsnEvent::StakeAdded(StakeAddedEventInfo {
            relay_manager: manager,
            owner,
            stake: U256::from(10u64).pow(U256::from(18)),
            unstake_delay: U256::from(15_000),
        })
    }

    pub(crate) fn stake_unlocked(manager: Address) -> GsnEvent {
        GsnEvent::StakeUnlocked(StakeUnlockedEventInfo {
            relay_manager: manager,
            owner: OWNER,
            withdraw_block: U256::from(500),
        })
    }

    pub(crate) fn stake_withdrawn(manager: Address) -> GsnEvent {
        GsnEvent::StakeWithdrawn(StakeWithdrawnEventInfo {
            relay_manager: manager,
            owner: OWNER,
            amount: U256::from(10u64).pow(U256::from(18)),
        })
    }

    pub(crate) fn relay_registered(manager: Address, url: &str) -> GsnEvent {
        GsnEvent::RelayServerRegistered(RelayRegisteredEventInfo {
            relay_manager: manager,
            base_relay_fee: U256::from(0),
            pct_relay_fee: U256::from(70),
            relay_url: url.to_string(),
        })
    }

    pub(crate) fn workers_added(manager: Address, workers: Vec<Address>) -> GsnEvent {
        GsnEvent::RelayWorkersAdded(RelayWorkersAddedEventInfo {
            relay_manager: manager,
            workers_count: U256::from(workers.len()),
            new_relay_workers: workers,
        })
    }

    pub(crate) fn ping_response(manager: Address) -> PingResponse {
        PingResponse {
            relay_worker_address: address!("0x00000000000000000000000000000000000000b1"),
            relay_manager_address: manager,
            relay_hub_address: HUB,
            owner_address: Some(OWNER),
            min_gas_price: "1000000000".to_string(),
            max_acceptance_budget: None,
            chain_id: Some("1337".to_string()),
            network_id: Some("1337".to_string()),
            ready: true,
            version: "2.2.0".to_string(),
        }
    }

    /// Answers pings from a fixed table, every other URL is unreachable.
    #[derive(Default)]
    pub(crate) struct StaticProbe {
        responses: HashMap<String, PingResponse>,
    }

    impl StaticProbe {
        pub(crate) fn with_relay(mut self, url: &str, response: PingResponse) -> Self {
            self.responses.insert(url.to_string(), response);
            self
        }
    }

    #[async_trait]
    impl HealthProbe for StaticProbe {
        async fn get_ping_response(&self, relay_url: &str) -> Result<PingResponse, ProbeError> {
            self.responses
                .get(relay_url)
                .cloned()
                .ok_or_else(|| ProbeError::Timeout {
                    url: format!("{relay_url}/getaddr"),
                    timeout_ms: 1000,
                })
        }
    }
}
