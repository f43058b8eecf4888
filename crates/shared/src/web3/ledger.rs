use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use alloy::primitives::{Address, B256, U256};
use alloy::rpc::types::Filter;
use async_trait::async_trait;
use log::debug;

use crate::models::event::{GsnEvent, GsnEventLog, GsnEventName};
use crate::models::GsnContractsDeployment;
use crate::web3::contracts::core::builder::Contracts;
use crate::web3::contracts::core::error::{ContractError, ContractResult};
use crate::web3::contracts::events::decode_gsn_log;

/// First block searched for GSN events.
pub const EVENTS_FROM_BLOCK: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractSelector {
    RelayHub,
    StakeManager,
}

/// Read-only access to chain state and GSN event history.
#[async_trait]
pub trait EventLedger: Send + Sync {
    fn deployment(&self) -> &GsnContractsDeployment;

    async fn get_block_number(&self) -> ContractResult<u64>;

    async fn get_balance(&self, address: Address) -> ContractResult<U256>;

    /// Events of the given kinds emitted by `contract` since `from_block`, in emission order.
    ///
    /// `topics` filter the indexed arguments by position, starting with the first one.
    async fn get_past_events(
        &self,
        contract: ContractSelector,
        event_names: &[GsnEventName],
        topics: &[B256],
        from_block: u64,
    ) -> ContractResult<Vec<GsnEventLog>>;

    /// Workers added by `manager`, in the order they were added.
    async fn get_registered_workers(&self, manager: Address) -> ContractResult<Vec<Address>> {
        let logs = self
            .get_past_events(
                ContractSelector::RelayHub,
                &[GsnEventName::RelayWorkersAdded],
                &[manager.into_word()],
                EVENTS_FROM_BLOCK,
            )
            .await?;

        let mut workers = Vec::new();
        for log in logs {
            if let GsnEvent::RelayWorkersAdded(info) = log.event {
                for worker in info.new_relay_workers {
                    if !workers.contains(&worker) {
                        workers.push(worker);
                    }
                }
            }
        }
        Ok(workers)
    }
}

/// [`EventLedger`] backed by a JSON-RPC node.
pub struct ContractInteractor<P: alloy_provider::Provider> {
    provider: P,
    contracts: Contracts<P>,
}

impl<P: alloy_provider::Provider + Clone> ContractInteractor<P> {
    pub fn new(provider: P, contracts: Contracts<P>) -> Self {
        Self {
            provider,
            contracts,
        }
    }

    fn contract_address(&self, contract: ContractSelector) -> Address {
        match contract {
            ContractSelector::RelayHub => self.contracts.relay_hub.address(),
            ContractSelector::StakeManager => self.contracts.deployment.stake_manager_address,
        }
    }
}

#[async_trait]
impl<P> EventLedger for ContractInteractor<P>
where
    P: alloy_provider::Provider + Clone + Send + Sync + 'static,
{
    fn deployment(&self) -> &GsnContractsDeployment {
        &self.contracts.deployment
    }

    async fn get_block_number(&self) -> ContractResult<u64> {
        Ok(self.provider.get_block_number().await?)
    }

    async fn get_balance(&self, address: Address) -> ContractResult<U256> {
        Ok(self.provider.get_balance(address).await?)
    }

    async fn get_past_events(
        &self,
        contract: ContractSelector,
        event_names: &[GsnEventName],
        topics: &[B256],
        from_block: u64,
    ) -> ContractResult<Vec<GsnEventLog>> {
        let address = self.contract_address(contract);
        let signatures: Vec<B256> = event_names.iter().map(|name| name.signature_hash()).collect();

        let mut filter = Filter::new()
            .address(address)
            .event_signature(signatures)
            .from_block(from_block);
        for (position, topic) in topics.iter().enumerate() {
            filter = match position {
                0 => filter.topic1(*topic),
                1 => filter.topic2(*topic),
                2 => filter.topic3(*topic),
                _ => {
                    return Err(ContractError::Other(
                        "at most three indexed topics can be filtered".into(),
                    ))
                }
            };
        }

        let logs = self.provider.get_logs(&filter).await?;
        debug!("Fetched {} logs from {contract:?} at {address}", logs.len());

        let mut events = Vec::with_capacity(logs.len());
        for log in &logs {
            if let Some(event) = decode_gsn_log(log)? {
                events.push(event);
            }
        }
        events.sort_by_key(|event| (event.block_number, event.log_index));
        Ok(events)
    }
}

/// In-memory ledger for tests and dry runs.
pub struct MockLedger {
    deployment: GsnContractsDeployment,
    block_number: AtomicU64,
    balances: HashMap<Address, U256>,
    failing_balances: HashSet<Address>,
    logs: Vec<(ContractSelector, GsnEventLog)>,
    unreachable: bool,
    stake_manager_queries: AtomicUsize,
}

impl MockLedger {
    pub fn new(deployment: GsnContractsDeployment) -> Self {
        Self {
            deployment,
            block_number: AtomicU64::new(1),
            balances: HashMap::new(),
            failing_balances: HashSet::new(),
            logs: Vec::new(),
            unreachable: false,
            stake_manager_queries: AtomicUsize::new(0),
        }
    }

    pub fn with_block_number(self, block_number: u64) -> Self {
        self.block_number.store(block_number, Ordering::SeqCst);
        self
    }

    pub fn with_balance(mut self, address: Address, balance: U256) -> Self {
        self.balances.insert(address, balance);
        self
    }

    /// Balance queries for `address` fail as if the node dropped the request.
    pub fn with_failing_balance(mut self, address: Address) -> Self {
        self.failing_balances.insert(address);
        self
    }

    /// Appends `event` in a block of its own, after every event added so far.
    pub fn with_event(mut self, event: GsnEvent) -> Self {
        let contract = match event.name() {
            GsnEventName::RelayServerRegistered | GsnEventName::RelayWorkersAdded => {
                ContractSelector::RelayHub
            }
            _ => ContractSelector::StakeManager,
        };
        let block_number = self.logs.len() as u64 + 1;
        self.logs.push((
            contract,
            GsnEventLog {
                event,
                transaction_hash: B256::left_padding_from(&block_number.to_be_bytes()),
                block_number,
                log_index: 0,
            },
        ));
        self
    }

    /// Every request fails.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    pub fn advance_block(&self) {
        self.block_number.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of StakeManager event queries served so far.
    pub fn stake_manager_queries(&self) -> usize {
        self.stake_manager_queries.load(Ordering::SeqCst)
    }

    fn check_reachable(&self) -> ContractResult<()> {
        if self.unreachable {
            return Err(ContractError::RpcError("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl EventLedger for MockLedger {
    fn deployment(&self) -> &GsnContractsDeployment {
        &self.deployment
    }

    async fn get_block_number(&self) -> ContractResult<u64> {
        self.check_reachable()?;
        Ok(self.block_number.load(Ordering::SeqCst))
    }

    async fn get_balance(&self, address: Address) -> ContractResult<U256> {
        self.check_reachable()?;
        if self.failing_balances.contains(&address) {
            return Err(ContractError::RpcError(format!(
                "eth_getBalance failed for {address}"
            )));
        }
        Ok(self.balances.get(&address).copied().unwrap_or_default())
    }

    async fn get_past_events(
        &self,
        contract: ContractSelector,
        event_names: &[GsnEventName],
        topics: &[B256],
        from_block: u64,
    ) -> ContractResult<Vec<GsnEventLog>> {
        self.check_reachable()?;
        if contract == ContractSelector::StakeManager {
            self.stake_manager_queries.fetch_add(1, Ordering::SeqCst);
        }

        Ok(self
            .logs
            .iter()
            .filter(|(emitter, log)| {
                let indexed = log.event.indexed_topics();
                *emitter == contract
                    && log.block_number >= from_block
                    && event_names.contains(&log.event.name())
                    && topics
                        .iter()
                        .enumerate()
                        .all(|(position, topic)| indexed.get(position) == Some(topic))
            })
            .map(|(_, log)| log.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::{RelayWorkersAddedEventInfo, StakeAddedEventInfo};
    use crate::web3::contracts::events::IRelayHub;
    use crate::web3::contracts::implementations::relay_hub_contract::RelayHubContract;
    use alloy::network::Ethereum;
    use alloy::primitives::address;
    use alloy::providers::RootProvider;
    use alloy::rpc::client::RpcClient;
    use alloy::rpc::types::Log;
    use alloy::sol_types::SolEvent;
    use alloy::transports::mock::Asserter;

    fn deployment() -> GsnContractsDeployment {
        GsnContractsDeployment {
            relay_hub_address: address!("0x00000000000000000000000000000000000000a1"),
            stake_manager_address: address!("0x00000000000000000000000000000000000000a2"),
            penalizer_address: None,
            version_registry_address: None,
        }
    }

    fn workers_added(manager: Address, workers: Vec<Address>) -> GsnEvent {
        GsnEvent::RelayWorkersAdded(RelayWorkersAddedEventInfo {
            relay_manager: manager,
            workers_count: U256::from(workers.len()),
            new_relay_workers: workers,
        })
    }

    #[tokio::test]
    async fn test_registered_workers_are_flattened_in_order() {
        let manager = address!("0x1111111111111111111111111111111111111111");
        let other = address!("0x2222222222222222222222222222222222222222");
        let w1 = address!("0x0000000000000000000000000000000000000001");
        let w2 = address!("0x0000000000000000000000000000000000000002");
        let w3 = address!("0x0000000000000000000000000000000000000003");

        let ledger = MockLedger::new(deployment())
            .with_event(workers_added(manager, vec![w2, w1]))
            .with_event(workers_added(other, vec![w3]))
            .with_event(workers_added(manager, vec![w1, w3]));

        let workers = ledger.get_registered_workers(manager).await.unwrap();
        assert_eq!(workers, vec![w2, w1, w3]);
    }

    #[tokio::test]
    async fn test_mock_filters_by_contract_name_and_topic() {
        let manager = address!("0x1111111111111111111111111111111111111111");
        let owner = address!("0x3333333333333333333333333333333333333333");
        let ledger = MockLedger::new(deployment())
            .with_event(GsnEvent::StakeAdded(StakeAddedEventInfo {
                relay_manager: manager,
                owner,
                stake: U256::from(1),
                unstake_delay: U256::from(1),
            }))
            .with_event(workers_added(manager, vec![]));

        let stake_events = ledger
            .get_past_events(
                ContractSelector::StakeManager,
                &GsnEventName::STAKE_MANAGER_EVENTS,
                &[manager.into_word(), owner.into_word()],
                EVENTS_FROM_BLOCK,
            )
            .await
            .unwrap();
        assert_eq!(stake_events.len(), 1);
        assert_eq!(ledger.stake_manager_queries(), 1);

        let by_other_owner = ledger
            .get_past_events(
                ContractSelector::StakeManager,
                &GsnEventName::STAKE_MANAGER_EVENTS,
                &[manager.into_word(), manager.into_word()],
                EVENTS_FROM_BLOCK,
            )
            .await
            .unwrap();
        assert!(by_other_owner.is_empty());
    }

    fn relay_registered_log(url: &str, block_number: u64, log_index: u64) -> Log {
        let event = IRelayHub::RelayServerRegistered {
            relayManager: address!("0x1111111111111111111111111111111111111111"),
            baseRelayFee: U256::ZERO,
            pctRelayFee: U256::from(70),
            relayUrl: url.to_string(),
        };
        Log {
            inner: alloy::primitives::Log {
                address: deployment().relay_hub_address,
                data: event.encode_log_data(),
            },
            block_hash: None,
            block_number: Some(block_number),
            block_timestamp: None,
            transaction_hash: Some(B256::repeat_byte(block_number as u8)),
            transaction_index: None,
            log_index: Some(log_index),
            removed: false,
        }
    }

    #[tokio::test]
    async fn test_interactor_orders_logs_by_block_and_log_index() {
        let asserter = Asserter::new();
        let provider = RootProvider::<Ethereum>::new(RpcClient::mocked(asserter.clone()));
        let relay_hub = RelayHubContract::new(
            deployment().relay_hub_address,
            provider.clone(),
            "relay_hub.json",
        )
        .unwrap();
        let interactor = ContractInteractor::new(
            provider,
            Contracts {
                relay_hub,
                deployment: deployment(),
            },
        );

        asserter.push_success(&vec![
            relay_registered_log("http://block-9", 9, 0),
            relay_registered_log("http://block-5-second", 5, 2),
            relay_registered_log("http://block-5-first", 5, 1),
        ]);

        let events = interactor
            .get_past_events(
                ContractSelector::RelayHub,
                &[GsnEventName::RelayServerRegistered],
                &[],
                EVENTS_FROM_BLOCK,
            )
            .await
            .unwrap();

        let positions: Vec<(u64, u64)> = events
            .iter()
            .map(|event| (event.block_number, event.log_index))
            .collect();
        assert_eq!(positions, vec![(5, 1), (5, 2), (9, 0)]);

        let urls: Vec<&str> = events
            .iter()
            .filter_map(|event| match &event.event {
                GsnEvent::RelayServerRegistered(info) => Some(info.relay_url.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            urls,
            vec!["http://block-5-first", "http://block-5-second", "http://block-9"]
        );
    }

    #[tokio::test]
    async fn test_interactor_rejects_more_than_three_topics() {
        let asserter = Asserter::new();
        let provider = RootProvider::<Ethereum>::new(RpcClient::mocked(asserter.clone()));
        let relay_hub = RelayHubContract::new(
            deployment().relay_hub_address,
            provider.clone(),
            "relay_hub.json",
        )
        .unwrap();
        let interactor = ContractInteractor::new(
            provider,
            Contracts {
                relay_hub,
                deployment: deployment(),
            },
        );

        let err = interactor
            .get_past_events(
                ContractSelector::RelayHub,
                &[GsnEventName::RelayServerRegistered],
                &[B256::ZERO; 4],
                EVENTS_FROM_BLOCK,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::Other(_)));
    }

    #[tokio::test]
    async fn test_unreachable_mock_fails_every_call() {
        let ledger = MockLedger::new(deployment()).unreachable();
        assert!(ledger.get_block_number().await.is_err());
        assert!(ledger.get_balance(Address::ZERO).await.is_err());
    }
}
