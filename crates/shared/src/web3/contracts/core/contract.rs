use alloy::{
    contract::{ContractInstance, Interface},
    json_abi::JsonAbi,
    primitives::Address,
};

use std::include_bytes;

use super::error::{ContractError, ContractResult};

macro_rules! include_abi {
    ($path:expr) => {{
        const ABI_BYTES: &[u8] = include_bytes!($path);
        ABI_BYTES
    }};
}

#[derive(Clone)]
pub struct Contract<P: alloy_provider::Provider> {
    instance: ContractInstance<P>,
}

impl<P: alloy_provider::Provider> Contract<P> {
    pub fn new(address: Address, provider: P, abi_file_path: &str) -> ContractResult<Self> {
        let instance = Self::parse_abi(abi_file_path, provider, address)?;
        Ok(Self { instance })
    }

    fn parse_abi(path: &str, provider: P, address: Address) -> ContractResult<ContractInstance<P>> {
        let artifact = match path {
            "relay_hub.json" => include_abi!("../../../../artifacts/abi/relay_hub.json"),
            _ => return Err(ContractError::UnknownArtifact(path.to_string())),
        };

        let abi: JsonAbi = serde_json::from_slice(artifact)?;
        Ok(ContractInstance::new(address, provider, Interface::new(abi)))
    }

    pub fn address(&self) -> Address {
        *self.instance.address()
    }

    /// Calls a parameterless view function returning a single address.
    pub async fn call_address_getter(&self, function: &str) -> ContractResult<Address> {
        let result = self.instance.function(function, &[])?.call().await?;
        result
            .first()
            .and_then(|value| value.as_address())
            .ok_or_else(|| {
                ContractError::InvalidResponse(format!("{function}() did not return an address"))
            })
    }
}
