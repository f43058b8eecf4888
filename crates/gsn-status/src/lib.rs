pub mod cli;
pub mod config;
pub mod error;
pub mod printer;
pub mod probe;
pub mod status;

pub use cli::Cli;
pub use config::StatusConfig;
pub use error::{ProbeError, StatusError, StatusResult};
pub use probe::{HealthProbe, HttpClient};
pub use status::StatusLogic;
