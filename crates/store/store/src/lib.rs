pub mod error;
pub mod filter;
pub mod store;
pub mod testing;

pub use error::StoreError;
pub use filter::RoundFilter;
pub use store::{DecisionResult, FinalizeResult, SignatureUpsert, WorkflowStore};
