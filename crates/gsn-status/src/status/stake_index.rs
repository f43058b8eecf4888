use std::collections::BTreeSet;

use alloy::primitives::Address;
use shared::models::{RelayServerRegistrationStatus, StakeManagerEvents};

/// Every StakeManager event of the deployment, fetched once per run.
///
/// Read-only after construction and shared by all per-relay lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StakeEventIndex {
    events: StakeManagerEvents,
}

/// Relay managers grouped by their current stake state.
///
/// The four buckets are disjoint and together hold every manager that ever staked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelaysByStakeStatus {
    pub staked: BTreeSet<Address>,
    pub unlocked: BTreeSet<Address>,
    pub withdrawn: BTreeSet<Address>,
    pub penalized: BTreeSet<Address>,
    /// Managers with unlock, withdraw or penalty events but no stake.
    pub orphaned: BTreeSet<Address>,
}

impl StakeEventIndex {
    pub fn new(events: StakeManagerEvents) -> Self {
        Self { events }
    }

    pub fn for_manager(&self, manager: Address) -> StakeManagerEvents {
        self.events.for_manager(manager)
    }

    pub fn relays_by_stake_status(&self) -> RelaysByStakeStatus {
        let ever_staked: BTreeSet<Address> = self
            .events
            .stake_added_events
            .iter()
            .map(|e| e.event_info.relay_manager)
            .collect();
        let ever_unlocked: BTreeSet<Address> = self
            .events
            .stake_unlocked_events
            .iter()
            .map(|e| e.event_info.relay_manager)
            .collect();
        let currently_withdrawn: BTreeSet<Address> = self
            .events
            .stake_withdrawn_events
            .iter()
            .map(|e| e.event_info.relay_manager)
            .collect();
        let currently_penalized: BTreeSet<Address> = self
            .events
            .stake_penalized_events
            .iter()
            .map(|e| e.event_info.relay_manager)
            .collect();

        let orphaned = ever_unlocked
            .iter()
            .chain(&currently_withdrawn)
            .chain(&currently_penalized)
            .filter(|manager| !ever_staked.contains(*manager))
            .copied()
            .collect();

        let withdrawn: BTreeSet<Address> = currently_withdrawn
            .intersection(&ever_staked)
            .copied()
            .collect();
        let penalized: BTreeSet<Address> = currently_penalized
            .intersection(&ever_staked)
            .filter(|manager| !withdrawn.contains(*manager))
            .copied()
            .collect();
        let unlocked: BTreeSet<Address> = ever_unlocked
            .intersection(&ever_staked)
            .filter(|manager| !withdrawn.contains(*manager) && !penalized.contains(*manager))
            .copied()
            .collect();
        let staked = ever_staked
            .iter()
            .filter(|manager| {
                !withdrawn.contains(*manager)
                    && !penalized.contains(*manager)
                    && !unlocked.contains(*manager)
            })
            .copied()
            .collect();

        RelaysByStakeStatus {
            staked,
            unlocked,
            withdrawn,
            penalized,
            orphaned,
        }
    }
}

impl RelaysByStakeStatus {
    /// Managers with their candidate status: withdrawn, unlocked, penalized, then staked.
    ///
    /// A manager is listed once, under the first bucket that holds it.
    pub fn in_processing_order(&self) -> Vec<(Address, RelayServerRegistrationStatus)> {
        let buckets = [
            (&self.withdrawn, RelayServerRegistrationStatus::Withdrawn),
            (&self.unlocked, RelayServerRegistrationStatus::Unlocked),
            (&self.penalized, RelayServerRegistrationStatus::Penalized),
            (&self.staked, RelayServerRegistrationStatus::Staked),
        ];

        let mut seen = BTreeSet::new();
        let mut ordered = Vec::new();
        for (managers, status) in buckets {
            for manager in managers {
                if seen.insert(*manager) {
                    ordered.push((*manager, status));
                }
            }
        }
        ordered
    }

    pub fn status_of(&self, manager: &Address) -> Option<RelayServerRegistrationStatus> {
        self.in_processing_order()
            .into_iter()
            .find(|(candidate, _)| candidate == manager)
            .map(|(_, status)| status)
    }

    pub fn len(&self) -> usize {
        self.staked.len() + self.unlocked.len() + self.withdrawn.len() + self.penalized.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
