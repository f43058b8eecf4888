use alloy::primitives::Address;
use shared::web3::ContractError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatusError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Ledger query failed: {0}")]
    LedgerQuery(#[from] ContractError),

    /// The manager was classified from its stake history but none of it records an owner.
    #[error("Relay manager {0} has no StakeAdded event")]
    MissingOwner(Address),

    #[error("Status gathering was cancelled")]
    Cancelled,
}

pub type StatusResult<T> = Result<T, StatusError>;

/// Reasons a relay could not be pinged. Captured into the relay's record, never fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("{url} did not answer within {timeout_ms} ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("Connection to {url} failed: {reason}")]
    Connection { url: String, reason: String },

    #[error("{url} answered with HTTP {status}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("{url} returned an empty body")]
    EmptyBody { url: String },

    #[error("Malformed ping response from {url}: {reason}")]
    Malformed { url: String, reason: String },
}
