use alloy::primitives::B256;
use alloy::rpc::types::Log;
use alloy::sol;
use alloy::sol_types::SolEvent;

use crate::models::event::{
    GsnEvent, GsnEventLog, GsnEventName, HubAuthorizedEventInfo, HubUnauthorizedEventInfo,
    RelayRegisteredEventInfo, RelayWorkersAddedEventInfo, StakeAddedEventInfo,
    StakePenalizedEventInfo, StakeUnlockedEventInfo, StakeWithdrawnEventInfo,
};
use crate::web3::contracts::core::error::{ContractError, ContractResult};

sol! {
    interface IStakeManager {
        event StakeAdded(address indexed relayManager, address indexed owner, uint256 stake, uint256 unstakeDelay);
        event StakeUnlocked(address indexed relayManager, address indexed owner, uint256 withdrawBlock);
        event StakeWithdrawn(address indexed relayManager, address indexed owner, uint256 amount);
        event StakePenalized(address indexed relayManager, address indexed beneficiary, uint256 reward);
        event HubAuthorized(address indexed relayManager, address indexed relayHub);
        event HubUnauthorized(address indexed relayManager, address indexed relayHub, uint256 removalBlock);
    }

    interface IRelayHub {
        event RelayServerRegistered(address indexed relayManager, uint256 baseRelayFee, uint256 pctRelayFee, string relayUrl);
        event RelayWorkersAdded(address indexed relayManager, address[] newRelayWorkers, uint256 workersCount);
    }
}

const ALL_EVENTS: [GsnEventName; 8] = [
    GsnEventName::StakeAdded,
    GsnEventName::StakeUnlocked,
    GsnEventName::StakeWithdrawn,
    GsnEventName::StakePenalized,
    GsnEventName::HubAuthorized,
    GsnEventName::HubUnauthorized,
    GsnEventName::RelayServerRegistered,
    GsnEventName::RelayWorkersAdded,
];

impl GsnEventName {
    /// Keccak hash of the event signature, i.e. the first topic of its logs.
    pub fn signature_hash(&self) -> B256 {
        match self {
            GsnEventName::StakeAdded => IStakeManager::StakeAdded::SIGNATURE_HASH,
            GsnEventName::StakeUnlocked => IStakeManager::StakeUnlocked::SIGNATURE_HASH,
            GsnEventName::StakeWithdrawn => IStakeManager::StakeWithdrawn::SIGNATURE_HASH,
            GsnEventName::StakePenalized => IStakeManager::StakePenalized::SIGNATURE_HASH,
            GsnEventName::HubAuthorized => IStakeManager::HubAuthorized::SIGNATURE_HASH,
            GsnEventName::HubUnauthorized => IStakeManager::HubUnauthorized::SIGNATURE_HASH,
            GsnEventName::RelayServerRegistered => IRelayHub::RelayServerRegistered::SIGNATURE_HASH,
            GsnEventName::RelayWorkersAdded => IRelayHub::RelayWorkersAdded::SIGNATURE_HASH,
        }
    }

    pub fn from_signature_hash(hash: &B256) -> Option<Self> {
        ALL_EVENTS
            .into_iter()
            .find(|name| name.signature_hash() == *hash)
    }
}

fn decode<E: SolEvent>(log: &Log) -> ContractResult<E> {
    log.log_decode::<E>()
        .map(|decoded| decoded.inner.data)
        .map_err(|e| ContractError::UndecodableLog {
            contract: log.address(),
            reason: e.to_string(),
        })
}

/// Decodes a raw log into a [`GsnEventLog`].
///
/// Returns `Ok(None)` for logs whose signature is not a known GSN event.
pub fn decode_gsn_log(log: &Log) -> ContractResult<Option<GsnEventLog>> {
    let Some(name) = log.topics().first().and_then(GsnEventName::from_signature_hash) else {
        return Ok(None);
    };

    let event = match name {
        GsnEventName::StakeAdded => {
            let e = decode::<IStakeManager::StakeAdded>(log)?;
            GsnEvent::StakeAdded(StakeAddedEventInfo {
                relay_manager: e.relayManager,
                owner: e.owner,
                stake: e.stake,
                unstake_delay: e.unstakeDelay,
            })
        }
        GsnEventName::StakeUnlocked => {
            let e = decode::<IStakeManager::StakeUnlocked>(log)?;
            GsnEvent::StakeUnlocked(StakeUnlockedEventInfo {
                relay_manager: e.relayManager,
                owner: e.owner,
                withdraw_block: e.withdrawBlock,
            })
        }
        GsnEventName::StakeWithdrawn => {
            let e = decode::<IStakeManager::StakeWithdrawn>(log)?;
            GsnEvent::StakeWithdrawn(StakeWithdrawnEventInfo {
                relay_manager: e.relayManager,
                owner: e.owner,
                amount: e.amount,
            })
        }
        GsnEventName::StakePenalized => {
            let e = decode::<IStakeManager::StakePenalized>(log)?;
            GsnEvent::StakePenalized(StakePenalizedEventInfo {
                relay_manager: e.relayManager,
                beneficiary: e.beneficiary,
                reward: e.reward,
            })
        }
        GsnEventName::HubAuthorized => {
            let e = decode::<IStakeManager::HubAuthorized>(log)?;
            GsnEvent::HubAuthorized(HubAuthorizedEventInfo {
                relay_manager: e.relayManager,
                relay_hub: e.relayHub,
            })
        }
        GsnEventName::HubUnauthorized => {
            let e = decode::<IStakeManager::HubUnauthorized>(log)?;
            GsnEvent::HubUnauthorized(HubUnauthorizedEventInfo {
                relay_manager: e.relayManager,
                relay_hub: e.relayHub,
                removal_block: e.removalBlock,
            })
        }
        GsnEventName::RelayServerRegistered => {
            let e = decode::<IRelayHub::RelayServerRegistered>(log)?;
            GsnEvent::RelayServerRegistered(RelayRegisteredEventInfo {
                relay_manager: e.relayManager,
                base_relay_fee: e.baseRelayFee,
                pct_relay_fee: e.pctRelayFee,
                relay_url: e.relayUrl,
            })
        }
        GsnEventName::RelayWorkersAdded => {
            let e = decode::<IRelayHub::RelayWorkersAdded>(log)?;
            GsnEvent::RelayWorkersAdded(RelayWorkersAddedEventInfo {
                relay_manager: e.relayManager,
                new_relay_workers: e.newRelayWorkers,
                workers_count: e.workersCount,
            })
        }
    };

    let transaction_hash = log.transaction_hash.ok_or_else(|| {
        ContractError::InvalidResponse(format!("{name} log without transaction hash"))
    })?;

    Ok(Some(GsnEventLog {
        event,
        transaction_hash,
        block_number: log.block_number.unwrap_or_default(),
        log_index: log.log_index.unwrap_or_default(),
    }))
}
