pub mod builder;
pub mod contract;
pub mod error;
