use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Names of the RelayHub and StakeManager events the status report is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GsnEventName {
    StakeAdded,
    StakeUnlocked,
    StakeWithdrawn,
    StakePenalized,
    HubAuthorized,
    HubUnauthorized,
    RelayServerRegistered,
    RelayWorkersAdded,
}

impl GsnEventName {
    /// Every event emitted by the StakeManager.
    pub const STAKE_MANAGER_EVENTS: [GsnEventName; 6] = [
        GsnEventName::StakeAdded,
        GsnEventName::HubAuthorized,
        GsnEventName::HubUnauthorized,
        GsnEventName::StakeUnlocked,
        GsnEventName::StakeWithdrawn,
        GsnEventName::StakePenalized,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            GsnEventName::StakeAdded => "StakeAdded",
            GsnEventName::StakeUnlocked => "StakeUnlocked",
            GsnEventName::StakeWithdrawn => "StakeWithdrawn",
            GsnEventName::StakePenalized => "StakePenalized",
            GsnEventName::HubAuthorized => "HubAuthorized",
            GsnEventName::HubUnauthorized => "HubUnauthorized",
            GsnEventName::RelayServerRegistered => "RelayServerRegistered",
            GsnEventName::RelayWorkersAdded => "RelayWorkersAdded",
        }
    }
}

impl fmt::Display for GsnEventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeAddedEventInfo {
    pub relay_manager: Address,
    pub owner: Address,
    pub stake: U256,
    pub unstake_delay: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeUnlockedEventInfo {
    pub relay_manager: Address,
    pub owner: Address,
    pub withdraw_block: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeWithdrawnEventInfo {
    pub relay_manager: Address,
    pub owner: Address,
    pub amount: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePenalizedEventInfo {
    pub relay_manager: Address,
    pub beneficiary: Address,
    pub reward: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubAuthorizedEventInfo {
    pub relay_manager: Address,
    pub relay_hub: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubUnauthorizedEventInfo {
    pub relay_manager: Address,
    pub relay_hub: Address,
    pub removal_block: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayRegisteredEventInfo {
    pub relay_manager: Address,
    pub base_relay_fee: U256,
    pub pct_relay_fee: U256,
    pub relay_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayWorkersAddedEventInfo {
    pub relay_manager: Address,
    pub new_relay_workers: Vec<Address>,
    pub workers_count: U256,
}

/// A decoded contract event. Every variant carries the relay manager it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GsnEvent {
    StakeAdded(StakeAddedEventInfo),
    StakeUnlocked(StakeUnlockedEventInfo),
    StakeWithdrawn(StakeWithdrawnEventInfo),
    StakePenalized(StakePenalizedEventInfo),
    HubAuthorized(HubAuthorizedEventInfo),
    HubUnauthorized(HubUnauthorizedEventInfo),
    RelayServerRegistered(RelayRegisteredEventInfo),
    RelayWorkersAdded(RelayWorkersAddedEventInfo),
}

impl GsnEvent {
    pub fn name(&self) -> GsnEventName {
        match self {
            GsnEvent::StakeAdded(_) => GsnEventName::StakeAdded,
            GsnEvent::StakeUnlocked(_) => GsnEventName::StakeUnlocked,
            GsnEvent::StakeWithdrawn(_) => GsnEventName::StakeWithdrawn,
            GsnEvent::StakePenalized(_) => GsnEventName::StakePenalized,
            GsnEvent::HubAuthorized(_) => GsnEventName::HubAuthorized,
            GsnEvent::HubUnauthorized(_) => GsnEventName::HubUnauthorized,
            GsnEvent::RelayServerRegistered(_) => GsnEventName::RelayServerRegistered,
            GsnEvent::RelayWorkersAdded(_) => GsnEventName::RelayWorkersAdded,
        }
    }

    pub fn relay_manager(&self) -> Address {
        match self {
            GsnEvent::StakeAdded(info) => info.relay_manager,
            GsnEvent::StakeUnlocked(info) => info.relay_manager,
            GsnEvent::StakeWithdrawn(info) => info.relay_manager,
            GsnEvent::StakePenalized(info) => info.relay_manager,
            GsnEvent::HubAuthorized(info) => info.relay_manager,
            GsnEvent::HubUnauthorized(info) => info.relay_manager,
            GsnEvent::RelayServerRegistered(info) => info.relay_manager,
            GsnEvent::RelayWorkersAdded(info) => info.relay_manager,
        }
    }

    /// Indexed topics following the event signature, in declaration order.
    pub fn indexed_topics(&self) -> Vec<B256> {
        let second = match self {
            GsnEvent::StakeAdded(info) => Some(info.owner),
            GsnEvent::StakeUnlocked(info) => Some(info.owner),
            GsnEvent::StakeWithdrawn(info) => Some(info.owner),
            GsnEvent::StakePenalized(info) => Some(info.beneficiary),
            GsnEvent::HubAuthorized(info) => Some(info.relay_hub),
            GsnEvent::HubUnauthorized(info) => Some(info.relay_hub),
            GsnEvent::RelayServerRegistered(_) | GsnEvent::RelayWorkersAdded(_) => None,
        };
        std::iter::once(self.relay_manager())
            .chain(second)
            .map(|a| a.into_word())
            .collect()
    }
}

/// A decoded event together with its position on chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GsnEventLog {
    pub event: GsnEvent,
    pub transaction_hash: B256,
    pub block_number: u64,
    pub log_index: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetail {
    pub transaction_hash: B256,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
}

impl TransactionDetail {
    pub fn new(transaction_hash: B256, block_explorer_url: Option<&str>) -> Self {
        let explorer_url = block_explorer_url
            .map(|base| format!("{}/tx/{transaction_hash}", base.trim_end_matches('/')));
        Self {
            transaction_hash,
            explorer_url,
        }
    }
}

/// Simplified view of an event log used in the user-visible report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTransactionInfo<T> {
    pub event_info: T,
    pub transaction_detail: TransactionDetail,
}

/// Collects the events of one kind from `logs`, keeping their order.
pub fn extract_transaction_infos<T>(
    logs: &[GsnEventLog],
    block_explorer_url: Option<&str>,
    select: impl Fn(&GsnEvent) -> Option<&T>,
) -> Vec<EventTransactionInfo<T>>
where
    T: Clone,
{
    logs.iter()
        .filter_map(|log| {
            select(&log.event).map(|info| EventTransactionInfo {
                event_info: info.clone(),
                transaction_detail: TransactionDetail::new(log.transaction_hash, block_explorer_url),
            })
        })
        .collect()
}
