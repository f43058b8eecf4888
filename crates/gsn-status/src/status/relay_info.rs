use alloy::primitives::Address;
use futures::{stream, StreamExt, TryStreamExt};
use log::{debug, warn};
use shared::models::event::extract_transaction_infos;
use shared::models::{
    GsnEvent, GsnEventName, PingResult, RelayServerInfo, RelayServerRegistrationInfo,
    RelayServerRegistrationStatus, WorkerBalance,
};
use shared::web3::{ContractError, ContractSelector, EventLedger, EVENTS_FROM_BLOCK};

use super::stake_index::StakeEventIndex;
use super::StatusLogic;
use crate::error::{StatusError, StatusResult};
use crate::probe::HealthProbe;

/// A staked relay with registrations is registered. Every other status is kept.
pub fn promote_status(
    candidate: RelayServerRegistrationStatus,
    has_registrations: bool,
) -> RelayServerRegistrationStatus {
    match candidate {
        RelayServerRegistrationStatus::Staked if has_registrations => {
            RelayServerRegistrationStatus::Registered
        }
        other => other,
    }
}

impl<L: EventLedger, H: HealthProbe> StatusLogic<L, H> {
    pub async fn gather_relay_info(
        &self,
        index: &StakeEventIndex,
        manager: Address,
        candidate: RelayServerRegistrationStatus,
    ) -> StatusResult<RelayServerInfo> {
        let stake_manager_events = index.for_manager(manager);
        let relay_owner = stake_manager_events
            .stake_added_events
            .first()
            .map(|added| added.event_info.owner)
            .ok_or(StatusError::MissingOwner(manager))?;

        let registered_logs = self
            .ledger
            .get_past_events(
                ContractSelector::RelayHub,
                &[GsnEventName::RelayServerRegistered],
                &[manager.into_word()],
                EVENTS_FROM_BLOCK,
            )
            .await?;
        let relay_registered_events =
            extract_transaction_infos(&registered_logs, self.block_explorer_url(), |e| match e {
                GsnEvent::RelayServerRegistered(info) => Some(info),
                _ => None,
            });

        let current_status = promote_status(candidate, !relay_registered_events.is_empty());
        debug!("Relay manager {manager} is {current_status}");

        let registration_info = match relay_registered_events.last() {
            Some(last) if current_status == RelayServerRegistrationStatus::Registered => Some(
                self.gather_registration_info(manager, &last.event_info.relay_url)
                    .await?,
            ),
            _ => None,
        };

        Ok(RelayServerInfo {
            current_status,
            relay_owner,
            manager_address: manager,
            authorized_hubs: Vec::new(),
            stake_manager_events,
            relay_registered_events,
            registration_info,
        })
    }

    async fn gather_registration_info(
        &self,
        manager: Address,
        relay_url: &str,
    ) -> StatusResult<RelayServerRegistrationInfo> {
        let (ping_result, manager_balance, registered_workers) = tokio::join!(
            self.ping(relay_url),
            self.ledger.get_balance(manager),
            self.ledger.get_registered_workers(manager),
        );
        let manager_balance = manager_balance?;
        let registered_workers = registered_workers?;

        let worker_balances: Vec<WorkerBalance> = stream::iter(registered_workers.iter().copied())
            .map(|worker| async move {
                let balance = self.ledger.get_balance(worker).await?;
                Ok::<_, ContractError>(WorkerBalance {
                    address: worker,
                    balance,
                })
            })
            .buffered(self.worker_balance_concurrency())
            .try_collect()
            .await?;

        Ok(RelayServerRegistrationInfo {
            last_registered_url: relay_url.to_string(),
            ping_result,
            manager_balance,
            registered_workers,
            worker_balances,
        })
    }

    async fn ping(&self, relay_url: &str) -> PingResult {
        match self.probe.get_ping_response(relay_url).await {
            Ok(response) => PingResult::PingResponse(response),
            Err(e) => {
                warn!("Failed to ping relay at {relay_url}: {e}");
                PingResult::Error(e.to_string())
            }
        }
    }
}
