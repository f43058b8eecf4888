pub mod deployment;
pub mod event;
pub mod ping;
pub mod statistics;

pub use deployment::GsnContractsDeployment;
pub use event::{EventTransactionInfo, GsnEvent, GsnEventLog, GsnEventName, TransactionDetail};
pub use ping::{PingResponse, PingResult};
pub use statistics::{
    GsnStatistics, PaymasterInfo, RecipientInfo, RelayServerInfo, RelayServerRegistrationInfo,
    RelayServerRegistrationStatus, SenderInfo, StakeManagerEvents, WorkerBalance,
};
