pub mod config;
pub mod debounce;
pub mod error;
pub mod messages;
pub mod protocol;
pub mod session;
pub mod version;
pub mod worker;

pub use config::RecomputeConfig;
pub use debounce::Debouncer;
pub use error::{ConfigError, RecomputeError};
pub use messages::{RecomputeRequest, RecomputeResult, WorkerMessage};
pub use protocol::{PendingRecompute, PendingTable, RecomputeClient};
pub use session::{DisplayState, PanelSession, SessionStats};
pub use version::{compute_version, Version};
pub use worker::{recompute, RecomputeWorker, WorkerHandle, WorkerInput};
