use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// Addresses of the GSN contracts the report was gathered from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GsnContractsDeployment {
    pub relay_hub_address: Address,
    pub stake_manager_address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub penalizer_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_registry_address: Option<Address>,
}
