pub mod relay_hub_contract;
