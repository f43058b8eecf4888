use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::deployment::GsnContractsDeployment;
use super::event::{
    extract_transaction_infos, EventTransactionInfo, GsnEvent, GsnEventLog,
    HubAuthorizedEventInfo, HubUnauthorizedEventInfo, RelayRegisteredEventInfo,
    StakeAddedEventInfo, StakePenalizedEventInfo, StakeUnlockedEventInfo,
    StakeWithdrawnEventInfo,
};
use super::ping::PingResult;

/// Current lifecycle state of a relay manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum RelayServerRegistrationStatus {
    /// only staked, but never registered on currently selected RelayHub
    Staked,
    /// staked and registered on currently selected RelayHub
    Registered,
    /// stake unlocked but not yet withdrawn
    Unlocked,
    /// stake withdrawn
    Withdrawn,
    /// stake has been penalized
    Penalized,
}

impl fmt::Display for RelayServerRegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            RelayServerRegistrationStatus::Staked => "staked",
            RelayServerRegistrationStatus::Registered => "registered",
            RelayServerRegistrationStatus::Unlocked => "unlocked",
            RelayServerRegistrationStatus::Withdrawn => "withdrawn",
            RelayServerRegistrationStatus::Penalized => "penalized",
        };
        f.write_str(status)
    }
}

/// StakeManager history split by event kind, each list in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct StakeManagerEvents {
    pub stake_added_events: Vec<EventTransactionInfo<StakeAddedEventInfo>>,
    pub stake_unlocked_events: Vec<EventTransactionInfo<StakeUnlockedEventInfo>>,
    pub stake_withdrawn_events: Vec<EventTransactionInfo<StakeWithdrawnEventInfo>>,
    pub stake_penalized_events: Vec<EventTransactionInfo<StakePenalizedEventInfo>>,
    pub hub_authorized_events: Vec<EventTransactionInfo<HubAuthorizedEventInfo>>,
    pub hub_unauthorized_events: Vec<EventTransactionInfo<HubUnauthorizedEventInfo>>,
}

impl StakeManagerEvents {
    /// Splits decoded logs by kind. Events not emitted by the StakeManager are ignored.
    pub fn from_logs(logs: &[GsnEventLog], block_explorer_url: Option<&str>) -> Self {
        Self {
            stake_added_events: extract_transaction_infos(logs, block_explorer_url, |e| match e {
                GsnEvent::StakeAdded(info) => Some(info),
                _ => None,
            }),
            stake_unlocked_events: extract_transaction_infos(logs, block_explorer_url, |e| {
                match e {
                    GsnEvent::StakeUnlocked(info) => Some(info),
                    _ => None,
                }
            }),
            stake_withdrawn_events: extract_transaction_infos(logs, block_explorer_url, |e| {
                match e {
                    GsnEvent::StakeWithdrawn(info) => Some(info),
                    _ => None,
                }
            }),
            stake_penalized_events: extract_transaction_infos(logs, block_explorer_url, |e| {
                match e {
                    GsnEvent::StakePenalized(info) => Some(info),
                    _ => None,
                }
            }),
            hub_authorized_events: extract_transaction_infos(logs, block_explorer_url, |e| {
                match e {
                    GsnEvent::HubAuthorized(info) => Some(info),
                    _ => None,
                }
            }),
            hub_unauthorized_events: extract_transaction_infos(logs, block_explorer_url, |e| {
                match e {
                    GsnEvent::HubUnauthorized(info) => Some(info),
                    _ => None,
                }
            }),
        }
    }

    /// The subset of this history that concerns `manager`.
    pub fn for_manager(&self, manager: Address) -> Self {
        fn select<T: Clone>(
            events: &[EventTransactionInfo<T>],
            manager: Address,
            relay_manager: impl Fn(&T) -> Address,
        ) -> Vec<EventTransactionInfo<T>> {
            events
                .iter()
                .filter(|event| relay_manager(&event.event_info) == manager)
                .cloned()
                .collect()
        }

        Self {
            stake_added_events: select(&self.stake_added_events, manager, |e| e.relay_manager),
            stake_unlocked_events: select(&self.stake_unlocked_events, manager, |e| {
                e.relay_manager
            }),
            stake_withdrawn_events: select(&self.stake_withdrawn_events, manager, |e| {
                e.relay_manager
            }),
            stake_penalized_events: select(&self.stake_penalized_events, manager, |e| {
                e.relay_manager
            }),
            hub_authorized_events: select(&self.hub_authorized_events, manager, |e| {
                e.relay_manager
            }),
            hub_unauthorized_events: select(&self.hub_unauthorized_events, manager, |e| {
                e.relay_manager
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WorkerBalance {
    pub address: Address,
    pub balance: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RelayServerRegistrationInfo {
    pub last_registered_url: String,
    pub ping_result: PingResult,
    pub manager_balance: U256,
    pub registered_workers: Vec<Address>,
    pub worker_balances: Vec<WorkerBalance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RelayServerInfo {
    pub current_status: RelayServerRegistrationStatus,
    pub relay_owner: Address,
    pub manager_address: Address,
    /// Always empty for now: hub authorization tracking is not gathered yet.
    pub authorized_hubs: Vec<Address>,
    pub stake_manager_events: StakeManagerEvents,
    pub relay_registered_events: Vec<EventTransactionInfo<RelayRegisteredEventInfo>>,
    /// Present if and only if `current_status` is `Registered`.
    pub registration_info: Option<RelayServerRegistrationInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PaymasterInfo {
    pub address: Address,
    pub relay_hub_balance: U256,
    pub accepted_transactions_count: u64,
    pub rejected_transactions_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RecipientInfo {
    pub address: Address,
    pub transaction_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SenderInfo {
    pub address: Address,
    pub transaction_count: u64,
}

/// Point-in-time snapshot of a GSN deployment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GsnStatistics {
    pub block_number: u64,
    pub runtime_version: String,
    pub contracts_deployment: GsnContractsDeployment,
    pub senders: Vec<SenderInfo>,
    pub paymasters: Vec<PaymasterInfo>,
    pub recipients: Vec<RecipientInfo>,
    pub relay_servers: Vec<RelayServerInfo>,
    pub total_gas_paid_via_gsn: U256,
    pub total_stakes_by_relays: U256,
    /// Data inconsistencies found while gathering; the affected relays are left out.
    pub warnings: Vec<String>,
}
