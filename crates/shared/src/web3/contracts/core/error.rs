use alloy::primitives::Address;
use std::fmt;

#[derive(Debug)]
pub enum ContractError {
    // Initialization errors
    AbiParseError(String),
    UnknownArtifact(String),
    MissingDeployment(String),

    // Contract interaction errors
    CallError(String),

    // Data parsing errors
    InvalidResponse(String),

    // Ledger errors
    RpcError(String),
    UndecodableLog {
        contract: Address,
        reason: String,
    },

    // Generic errors
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl std::error::Error for ContractError {}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Initialization errors
            ContractError::AbiParseError(msg) => write!(f, "Failed to parse ABI: {msg}"),
            ContractError::UnknownArtifact(path) => write!(f, "Unknown ABI artifact: {path}"),
            ContractError::MissingDeployment(msg) => {
                write!(f, "Incomplete contracts deployment: {msg}")
            }

            // Contract interaction errors
            ContractError::CallError(msg) => write!(f, "Contract call failed: {msg}"),

            // Data parsing errors
            ContractError::InvalidResponse(msg) => write!(f, "Invalid contract response: {msg}"),

            // Ledger errors
            ContractError::RpcError(msg) => write!(f, "RPC request failed: {msg}"),
            ContractError::UndecodableLog { contract, reason } => {
                write!(f, "Undecodable log emitted by {contract}: {reason}")
            }

            // Generic errors
            ContractError::Other(e) => write!(f, "Other error: {e}"),
        }
    }
}

// Convenient type alias for Result with ContractError
pub type ContractResult<T> = Result<T, ContractError>;

impl From<serde_json::Error> for ContractError {
    fn from(err: serde_json::Error) -> Self {
        ContractError::AbiParseError(err.to_string())
    }
}

impl From<alloy::transports::TransportError> for ContractError {
    fn from(err: alloy::transports::TransportError) -> Self {
        ContractError::RpcError(err.to_string())
    }
}

impl From<alloy::contract::Error> for ContractError {
    fn from(err: alloy::contract::Error) -> Self {
        ContractError::CallError(err.to_string())
    }
}
