pub mod store;
pub mod types;

pub use store::OperationStore;
pub use types::*;
