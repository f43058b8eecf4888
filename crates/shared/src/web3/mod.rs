pub mod contracts;
pub mod ledger;

pub use contracts::core::builder::{ContractBuilder, Contracts};
pub use contracts::core::error::{ContractError, ContractResult};
pub use ledger::{ContractInteractor, ContractSelector, EventLedger, MockLedger, EVENTS_FROM_BLOCK};
