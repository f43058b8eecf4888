use std::str::FromStr;

use alloy::primitives::Address;
use url::Url;

use crate::error::{StatusError, StatusResult};

pub const DEFAULT_GET_ADDRESS_TIMEOUT_MS: u64 = 1000;
pub const DEFAULT_MAX_CONCURRENT_RELAYS: usize = 10;
pub const DEFAULT_MAX_CONCURRENT_WORKER_BALANCES: usize = 4;
pub const LOCALHOST_RPC_URL: &str = "http://127.0.0.1:8545";

/// Runtime options of a status run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusConfig {
    /// Base URL used to build `<base>/tx/<hash>` links for every reported transaction.
    pub block_explorer_url: Option<String>,
    /// Ping timeout in milliseconds, 0 waits forever.
    pub get_address_timeout_ms: u64,
    /// Upper bound on relays gathered at the same time.
    pub max_concurrent_relays: usize,
    /// Upper bound on worker balance reads in flight for one relay.
    ///
    /// Relays run concurrently, so up to `max_concurrent_relays * max_concurrent_worker_balances`
    /// balance reads can be pending at once.
    pub max_concurrent_worker_balances: usize,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            block_explorer_url: None,
            get_address_timeout_ms: DEFAULT_GET_ADDRESS_TIMEOUT_MS,
            max_concurrent_relays: DEFAULT_MAX_CONCURRENT_RELAYS,
            max_concurrent_worker_balances: DEFAULT_MAX_CONCURRENT_WORKER_BALANCES,
        }
    }
}

impl StatusConfig {
    pub fn validate(&self) -> StatusResult<()> {
        if self.max_concurrent_relays == 0 {
            return Err(StatusError::Configuration(
                "max concurrent relays must be at least 1".to_string(),
            ));
        }
        if self.max_concurrent_worker_balances == 0 {
            return Err(StatusError::Configuration(
                "max concurrent worker balances must be at least 1".to_string(),
            ));
        }
        if let Some(explorer) = &self.block_explorer_url {
            Url::parse(explorer).map_err(|e| {
                StatusError::Configuration(format!("invalid block explorer URL {explorer}: {e}"))
            })?;
        }
        Ok(())
    }
}

/// Contract addresses given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentArgs {
    pub relay_hub: Address,
    pub stake_manager: Option<Address>,
    pub penalizer: Option<Address>,
    pub version_registry: Option<Address>,
}

/// Turns a `--network` value into the RPC endpoint.
///
/// `localhost` is the local dev chain, full `http(s)://` URLs are used as given and any
/// other value is taken as an Infura network name, which needs `infura_id`.
pub fn resolve_network_url(network: &str, infura_id: Option<&str>) -> StatusResult<Url> {
    let network = network.trim();
    let raw = if network == "localhost" {
        LOCALHOST_RPC_URL.to_string()
    } else if network.starts_with("http://") || network.starts_with("https://") {
        network.to_string()
    } else {
        if network.is_empty()
            || !network
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(StatusError::Configuration(format!(
                "invalid network name: {network:?}"
            )));
        }
        let Some(infura_id) = infura_id.filter(|id| !id.is_empty()) else {
            return Err(StatusError::Configuration(format!(
                "network {network} requires the INFURA_ID environment variable"
            )));
        };
        format!("https://{network}.infura.io/v3/{infura_id}")
    };

    Url::parse(&raw)
        .map_err(|e| StatusError::Configuration(format!("invalid network URL {raw}: {e}")))
}

pub fn parse_address(flag: &str, value: &str) -> StatusResult<Address> {
    Address::from_str(value.trim())
        .map_err(|e| StatusError::Configuration(format!("invalid {flag} address {value:?}: {e}")))
}

pub fn parse_optional_address(flag: &str, value: Option<&str>) -> StatusResult<Option<Address>> {
    value.map(|value| parse_address(flag, value)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_localhost_maps_to_local_node() {
        let url = resolve_network_url("localhost", None).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8545/");
    }

    #[test]
    fn test_explicit_url_is_kept() {
        let url = resolve_network_url("https://rpc.example.org/v1", None).unwrap();
        assert_eq!(url.as_str(), "https://rpc.example.org/v1");
    }

    #[test]
    fn test_network_name_expands_to_infura() {
        let url = resolve_network_url("sepolia", Some("abc123")).unwrap();
        assert_eq!(url.as_str(), "https://sepolia.infura.io/v3/abc123");
    }

    #[test]
    fn test_network_name_without_infura_id_is_rejected() {
        assert!(matches!(
            resolve_network_url("sepolia", None),
            Err(StatusError::Configuration(_))
        ));
        assert!(matches!(
            resolve_network_url("sepolia", Some("")),
            Err(StatusError::Configuration(_))
        ));
        assert!(matches!(
            resolve_network_url("not a network", Some("abc")),
            Err(StatusError::Configuration(_))
        ));
    }

    #[test]
    fn test_address_parsing() {
        assert_eq!(
            parse_address("--hub", "0x00000000000000000000000000000000000000a1").unwrap(),
            address!("0x00000000000000000000000000000000000000a1")
        );
        assert!(matches!(
            parse_address("--hub", "0x1234"),
            Err(StatusError::Configuration(_))
        ));
        assert_eq!(parse_optional_address("--penalizer", None).unwrap(), None);
    }

    #[test]
    fn test_config_validation() {
        assert!(StatusConfig::default().validate().is_ok());

        let no_concurrency = StatusConfig {
            max_concurrent_relays: 0,
            ..Default::default()
        };
        assert!(no_concurrency.validate().is_err());

        let no_worker_concurrency = StatusConfig {
            max_concurrent_worker_balances: 0,
            ..Default::default()
        };
        assert!(matches!(
            no_worker_concurrency.validate(),
            Err(StatusError::Configuration(_))
        ));

        let bad_explorer = StatusConfig {
            block_explorer_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(bad_explorer.validate().is_err());
    }
}
