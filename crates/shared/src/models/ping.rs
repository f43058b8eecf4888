use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// Body returned by a relay server on `GET /getaddr`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PingResponse {
    pub relay_worker_address: Address,
    pub relay_manager_address: Address,
    pub relay_hub_address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_address: Option<Address>,
    pub min_gas_price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_acceptance_budget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,
    pub ready: bool,
    pub version: String,
}

/// Outcome of a health probe: exactly one of a response or a captured failure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PingResult {
    PingResponse(PingResponse),
    Error(String),
}

impl PingResult {
    pub fn ping_response(&self) -> Option<&PingResponse> {
        match self {
            PingResult::PingResponse(response) => Some(response),
            PingResult::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            PingResult::PingResponse(_) => None,
            PingResult::Error(error) => Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_response_accepts_relay_server_body() {
        let body = serde_json::json!({
            "relayWorkerAddress": "0x1111111111111111111111111111111111111111",
            "relayManagerAddress": "0x2222222222222222222222222222222222222222",
            "relayHubAddress": "0x3333333333333333333333333333333333333333",
            "minGasPrice": "1000000000",
            "chainId": "1337",
            "networkId": "1337",
            "ready": true,
            "version": "2.1.0"
        });
        let response: PingResponse = serde_json::from_value(body).unwrap();
        assert!(response.ready);
        assert_eq!(response.owner_address, None);
        assert_eq!(response.chain_id.as_deref(), Some("1337"));
    }

    #[test]
    fn test_ping_result_serializes_a_single_field() {
        let failed = PingResult::Error("connection refused".to_string());
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "connection refused" }));
        assert!(failed.ping_response().is_none());
        assert_eq!(failed.error(), Some("connection refused"));
    }
}
