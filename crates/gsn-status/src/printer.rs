use std::fmt;

use alloy::primitives::utils::format_ether;
use alloy::primitives::Address;
use shared::models::{
    GsnStatistics, PingResult, RelayServerInfo, RelayServerRegistrationInfo, TransactionDetail,
};

/// Human readable rendering of a [`GsnStatistics`] snapshot.
pub struct StatisticsReport<'a>(pub &'a GsnStatistics);

pub fn render_statistics(statistics: &GsnStatistics) -> String {
    StatisticsReport(statistics).to_string()
}

pub fn render_json(statistics: &GsnStatistics) -> serde_json::Result<String> {
    serde_json::to_string_pretty(statistics)
}

fn optional_address(address: Option<Address>) -> String {
    address.map_or_else(|| "not set".to_string(), |a| a.to_string())
}

fn ping_status(ping_result: &PingResult) -> String {
    match ping_result {
        PingResult::PingResponse(response) => response.ready.to_string(),
        PingResult::Error(error) => error.clone(),
    }
}

fn transaction_link(detail: &TransactionDetail) -> String {
    detail
        .explorer_url
        .clone()
        .unwrap_or_else(|| detail.transaction_hash.to_string())
}

impl fmt::Display for StatisticsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.0;
        let deployment = &stats.contracts_deployment;

        writeln!(
            f,
            "GSN status for version {} at block height {}",
            stats.runtime_version, stats.block_number
        )?;
        writeln!(
            f,
            "Total stakes by all relays: {} ETH",
            format_ether(stats.total_stakes_by_relays)
        )?;
        writeln!(f, "GSN contracts deployment:")?;
        writeln!(
            f,
            "  Version Registry: {}",
            optional_address(deployment.version_registry_address)
        )?;
        writeln!(f, "  Stake Manager: {}", deployment.stake_manager_address)?;
        writeln!(f, "  Relay Hub: {}", deployment.relay_hub_address)?;
        writeln!(
            f,
            "  Penalizer: {}",
            optional_address(deployment.penalizer_address)
        )?;

        writeln!(f)?;
        writeln!(f, "# Relays:")?;
        if stats.relay_servers.is_empty() {
            writeln!(f, "No relays found")?;
        }
        for relay in &stats.relay_servers {
            write_relay(f, relay)?;
        }

        if !stats.warnings.is_empty() {
            writeln!(f)?;
            writeln!(f, "# Warnings:")?;
            for warning in &stats.warnings {
                writeln!(f, "- {warning}")?;
            }
        }
        Ok(())
    }
}

fn write_relay(f: &mut fmt::Formatter<'_>, relay: &RelayServerInfo) -> fmt::Result {
    writeln!(f)?;
    writeln!(
        f,
        "- {} is currently {}",
        relay.manager_address, relay.current_status
    )?;
    writeln!(f, "\towner: {}", relay.relay_owner)?;

    if let Some(registration) = &relay.registration_info {
        write_registration(f, relay, registration)?;
    }

    let events = &relay.stake_manager_events;
    for added in &events.stake_added_events {
        writeln!(
            f,
            "\tstaked {} ETH: {}",
            format_ether(added.event_info.stake),
            transaction_link(&added.transaction_detail)
        )?;
    }
    for unlocked in &events.stake_unlocked_events {
        writeln!(
            f,
            "\tunlocked until block {}: {}",
            unlocked.event_info.withdraw_block,
            transaction_link(&unlocked.transaction_detail)
        )?;
    }
    for withdrawn in &events.stake_withdrawn_events {
        writeln!(
            f,
            "\twithdrawn {} ETH: {}",
            format_ether(withdrawn.event_info.amount),
            transaction_link(&withdrawn.transaction_detail)
        )?;
    }
    for penalized in &events.stake_penalized_events {
        writeln!(
            f,
            "\tpenalized, {} ETH to {}: {}",
            format_ether(penalized.event_info.reward),
            penalized.event_info.beneficiary,
            transaction_link(&penalized.transaction_detail)
        )?;
    }
    Ok(())
}

fn write_registration(
    f: &mut fmt::Formatter<'_>,
    relay: &RelayServerInfo,
    registration: &RelayServerRegistrationInfo,
) -> fmt::Result {
    writeln!(f, "\turl: {}", registration.last_registered_url)?;
    if let Some(last) = relay.relay_registered_events.last() {
        writeln!(
            f,
            "\tfee: {} wei + {}%",
            last.event_info.base_relay_fee, last.event_info.pct_relay_fee
        )?;
    }
    writeln!(
        f,
        "\tbalance: {} ETH",
        format_ether(registration.manager_balance)
    )?;
    writeln!(f, "\tstatus: {}", ping_status(&registration.ping_result))?;
    for worker in &registration.worker_balances {
        writeln!(
            f,
            "\tworker {}: {} ETH",
            worker.address,
            format_ether(worker.balance)
        )?;
    }
    Ok(())
}
