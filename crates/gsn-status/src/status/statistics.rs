use alloy::primitives::{Address, U256};
use futures::{stream, StreamExt, TryStreamExt};
use log::{info, warn};
use shared::models::{
    GsnEventName, GsnStatistics, PaymasterInfo, RecipientInfo, RelayServerInfo,
    RelayServerRegistrationStatus, SenderInfo, StakeManagerEvents,
};
use shared::web3::{ContractSelector, EventLedger, EVENTS_FROM_BLOCK};

use super::stake_index::{RelaysByStakeStatus, StakeEventIndex};
use super::StatusLogic;
use crate::error::{StatusError, StatusResult};
use crate::probe::HealthProbe;

pub const RUNTIME_VERSION: &str = env!("CARGO_PKG_VERSION");

impl<L: EventLedger, H: HealthProbe> StatusLogic<L, H> {
    /// Takes a snapshot of the whole relay network.
    ///
    /// Ledger failures abort the run. Unreachable relays only mark their own record.
    pub async fn gather_statistics(&self) -> StatusResult<GsnStatistics> {
        let block_number = self.ledger.get_block_number().await?;
        let contracts_deployment = self.ledger.deployment().clone();
        info!("Gathering GSN statistics at block {block_number}");

        let total_stakes_by_relays = self
            .ledger
            .get_balance(contracts_deployment.stake_manager_address)
            .await?;

        let index = self.build_stake_event_index().await?;
        let relays = index.relays_by_stake_status();

        let mut warnings = Vec::new();
        for manager in &relays.orphaned {
            let warning = format!("Relay manager {manager} has stake events but never staked");
            warn!("{warning}");
            warnings.push(warning);
        }

        let relay_servers = self
            .gather_relay_servers(&index, &relays, &mut warnings)
            .await?;
        info!("Collected {} relay servers", relay_servers.len());

        Ok(GsnStatistics {
            block_number,
            runtime_version: RUNTIME_VERSION.to_string(),
            contracts_deployment,
            senders: self.gather_senders(),
            paymasters: self.gather_paymasters(),
            recipients: self.gather_recipients(),
            relay_servers,
            total_gas_paid_via_gsn: U256::ZERO,
            total_stakes_by_relays,
            warnings,
        })
    }

    /// One query for every StakeManager event, shared by all relays.
    pub async fn build_stake_event_index(&self) -> StatusResult<StakeEventIndex> {
        let logs = self
            .ledger
            .get_past_events(
                ContractSelector::StakeManager,
                &GsnEventName::STAKE_MANAGER_EVENTS,
                &[],
                EVENTS_FROM_BLOCK,
            )
            .await?;
        Ok(StakeEventIndex::new(StakeManagerEvents::from_logs(
            &logs,
            self.block_explorer_url(),
        )))
    }

    async fn gather_relay_servers(
        &self,
        index: &StakeEventIndex,
        relays: &RelaysByStakeStatus,
        warnings: &mut Vec<String>,
    ) -> StatusResult<Vec<RelayServerInfo>> {
        let managers = relays.in_processing_order();

        let records: Vec<Option<RelayServerInfo>> = stream::iter(managers.iter().copied())
            .map(|(manager, status)| self.gather_relay_record(index, manager, status))
            .buffered(self.relay_concurrency())
            .try_collect()
            .await?;

        let mut relay_servers = Vec::with_capacity(records.len());
        for ((manager, _), record) in managers.iter().zip(records) {
            match record {
                Some(record) => relay_servers.push(record),
                None => warnings.push(format!(
                    "Relay manager {manager} skipped: no StakeAdded event found"
                )),
            }
        }
        Ok(relay_servers)
    }

    async fn gather_relay_record(
        &self,
        index: &StakeEventIndex,
        manager: Address,
        status: RelayServerRegistrationStatus,
    ) -> StatusResult<Option<RelayServerInfo>> {
        match self.gather_relay_info(index, manager, status).await {
            Ok(record) => Ok(Some(record)),
            Err(StatusError::MissingOwner(manager)) => {
                warn!("Skipping relay manager {manager}: no StakeAdded event found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    // Sender, paymaster and recipient activity and gas totals are not aggregated yet.
    fn gather_senders(&self) -> Vec<SenderInfo> {
        Vec::new()
    }

    fn gather_paymasters(&self) -> Vec<PaymasterInfo> {
        Vec::new()
    }

    fn gather_recipients(&self) -> Vec<RecipientInfo> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StatusConfig;
    use crate::status::test_support::*;
    use alloy::primitives::address;
    use shared::web3::MockLedger;

    const M1: Address = address!("0x0000000000000000000000000000000000000001");
    const M2: Address = address!("0x0000000000000000000000000000000000000002");
    const M3: Address = address!("0x0000000000000000000000000000000000000003");

    fn logic(ledger: MockLedger, probe: StaticProbe) -> StatusLogic<MockLedger, StaticProbe> {
        StatusLogic::new(ledger, probe, StatusConfig::default())
    }

    #[tokio::test]
    async fn test_single_stake_is_reported_as_staked() {
        let ledger = MockLedger::new(deployment())
            .with_block_number(1234)
            .with_balance(STAKE_MANAGER, U256::from(5))
            .with_event(stake_added(M1, OWNER));

        let stats = logic(ledger, StaticProbe::default())
            .gather_statistics()
            .await
            .unwrap();

        assert_eq!(stats.block_number, 1234);
        assert_eq!(stats.runtime_version, RUNTIME_VERSION);
        assert_eq!(stats.contracts_deployment, deployment());
        assert_eq!(stats.total_stakes_by_relays, U256::from(5));
        assert_eq!(stats.total_gas_paid_via_gsn, U256::ZERO);
        assert!(stats.senders.is_empty());
        assert!(stats.paymasters.is_empty());
        assert!(stats.recipients.is_empty());
        assert!(stats.warnings.is_empty());

        assert_eq!(stats.relay_servers.len(), 1);
        let relay = &stats.relay_servers[0];
        assert_eq!(relay.manager_address, M1);
        assert_eq!(relay.current_status, RelayServerRegistrationStatus::Staked);
        assert_eq!(relay.relay_owner, OWNER);
        assert!(relay.registration_info.is_none());
    }

    #[tokio::test]
    async fn test_registered_relay_with_reachable_ping() {
        let ledger = MockLedger::new(deployment())
            .with_event(stake_added(M1, OWNER))
            .with_event(relay_registered(M1, "http://x"));
        let probe = StaticProbe::default().with_relay("http://x", ping_response(M1));

        let stats = logic(ledger, probe).gather_statistics().await.unwrap();

        let relay = &stats.relay_servers[0];
        assert_eq!(relay.current_status, RelayServerRegistrationStatus::Registered);
        let registration = relay.registration_info.as_ref().unwrap();
        assert_eq!(registration.last_registered_url, "http://x");
        assert!(registration.ping_result.ping_response().is_some());
        assert!(registration.ping_result.error().is_none());
    }

    #[tokio::test]
    async fn test_registered_relay_with_failed_ping_still_reports() {
        let ledger = MockLedger::new(deployment())
            .with_event(stake_added(M1, OWNER))
            .with_event(relay_registered(M1, "http://x"))
            .with_event(stake_added(M2, OWNER));

        let stats = logic(ledger, StaticProbe::default())
            .gather_statistics()
            .await
            .unwrap();

        assert_eq!(stats.relay_servers.len(), 2);
        let relay = stats
            .relay_servers
            .iter()
            .find(|r| r.manager_address == M1)
            .unwrap();
        assert_eq!(relay.current_status, RelayServerRegistrationStatus::Registered);
        let registration = relay.registration_info.as_ref().unwrap();
        assert!(registration.ping_result.error().is_some());
        assert!(registration.ping_result.ping_response().is_none());
    }

    #[tokio::test]
    async fn test_withdrawn_relay_ignores_later_registration() {
        let ledger = MockLedger::new(deployment())
            .with_event(stake_added(M1, OWNER))
            .with_event(stake_withdrawn(M1))
            .with_event(relay_registered(M1, "http://x"));

        let stats = logic(ledger, StaticProbe::default())
            .gather_statistics()
            .await
            .unwrap();

        assert_eq!(stats.relay_servers.len(), 1);
        let relay = &stats.relay_servers[0];
        assert_eq!(relay.current_status, RelayServerRegistrationStatus::Withdrawn);
        assert!(relay.registration_info.is_none());
        assert_eq!(relay.relay_registered_events.len(), 1);
    }

    #[tokio::test]
    async fn test_relays_are_ordered_by_bucket() {
        let ledger = MockLedger::new(deployment())
            .with_event(stake_added(M1, OWNER))
            .with_event(stake_added(M2, OWNER))
            .with_event(stake_unlocked(M2))
            .with_event(stake_added(M3, OWNER))
            .with_event(stake_withdrawn(M3));

        let stats = logic(ledger, StaticProbe::default())
            .gather_statistics()
            .await
            .unwrap();

        let order: Vec<_> = stats
            .relay_servers
            .iter()
            .map(|r| (r.manager_address, r.current_status))
            .collect();
        assert_eq!(
            order,
            vec![
                (M3, RelayServerRegistrationStatus::Withdrawn),
                (M2, RelayServerRegistrationStatus::Unlocked),
                (M1, RelayServerRegistrationStatus::Staked),
            ]
        );
    }

    #[tokio::test]
    async fn test_stake_history_is_queried_once() {
        let ledger = MockLedger::new(deployment())
            .with_event(stake_added(M1, OWNER))
            .with_event(stake_added(M2, OWNER))
            .with_event(stake_added(M3, OWNER));
        let logic = logic(ledger, StaticProbe::default());

        let stats = logic.gather_statistics().await.unwrap();

        assert_eq!(stats.relay_servers.len(), 3);
        assert_eq!(logic.ledger().stake_manager_queries(), 1);
    }

    #[tokio::test]
    async fn test_repeated_runs_differ_only_in_block_number() {
        let ledger = MockLedger::new(deployment())
            .with_block_number(10)
            .with_event(stake_added(M1, OWNER))
            .with_event(relay_registered(M1, "http://x"))
            .with_event(workers_added(M1, vec![M2]))
            .with_event(stake_added(M3, OWNER))
            .with_event(stake_unlocked(M3));
        let probe = StaticProbe::default().with_relay("http://x", ping_response(M1));
        let logic = logic(ledger, probe);

        let first = logic.gather_statistics().await.unwrap();
        logic.ledger().advance_block();
        let second = logic.gather_statistics().await.unwrap();

        assert_eq!(second.block_number, first.block_number + 1);
        let normalized = GsnStatistics {
            block_number: first.block_number,
            ..second
        };
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&normalized).unwrap()
        );
    }

    #[tokio::test]
    async fn test_orphaned_events_become_warnings() {
        let ledger = MockLedger::new(deployment())
            .with_event(stake_added(M1, OWNER))
            .with_event(stake_unlocked(M2));

        let stats = logic(ledger, StaticProbe::default())
            .gather_statistics()
            .await
            .unwrap();

        assert_eq!(stats.relay_servers.len(), 1);
        assert_eq!(stats.warnings.len(), 1);
        assert!(stats.warnings[0].contains(&M2.to_string()));
    }

    #[tokio::test]
    async fn test_unreachable_ledger_is_fatal() {
        let ledger = MockLedger::new(deployment())
            .with_event(stake_added(M1, OWNER))
            .unreachable();

        let err = logic(ledger, StaticProbe::default())
            .gather_statistics()
            .await
            .unwrap_err();
        assert!(matches!(err, StatusError::LedgerQuery(_)));
    }

    #[tokio::test]
    async fn test_failing_worker_balance_is_fatal() {
        let ledger = MockLedger::new(deployment())
            .with_event(stake_added(M1, OWNER))
            .with_event(relay_registered(M1, "http://x"))
            .with_event(workers_added(M1, vec![M2]))
            .with_failing_balance(M2);
        let probe = StaticProbe::default().with_relay("http://x", ping_response(M1));

        let err = logic(ledger, probe).gather_statistics().await.unwrap_err();
        assert!(matches!(err, StatusError::LedgerQuery(_)));
    }

    #[tokio::test]
    async fn test_single_relay_concurrency_keeps_order() {
        let ledger = MockLedger::new(deployment())
            .with_event(stake_added(M3, OWNER))
            .with_event(stake_added(M1, OWNER))
            .with_event(stake_added(M2, OWNER));
        let config = StatusConfig {
            max_concurrent_relays: 1,
            ..Default::default()
        };
        let stats = StatusLogic::new(ledger, StaticProbe::default(), config)
            .gather_statistics()
            .await
            .unwrap();

        let managers: Vec<Address> = stats
            .relay_servers
            .iter()
            .map(|r| r.manager_address)
            .collect();
        assert_eq!(managers, vec![M1, M2, M3]);
    }
}
