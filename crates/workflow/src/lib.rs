//! The signing-round approval workflow.
//!
//! [`WorkflowEngine`] is the single entry point: it owns a
//! [`WorkflowStore`](signet_store::WorkflowStore) for records and a
//! [`BlobStore`](signet_blob::BlobStore) for uploaded files, and exposes one
//! operation per behaviour (signature registry, round lifecycle, decisions,
//! reporting).

pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod registry;
pub mod reporting;
pub mod views;

pub use builder::WorkflowEngineBuilder;
pub use config::WorkflowConfig;
pub use engine::WorkflowEngine;
pub use error::WorkflowError;
pub use views::{
    AssignedSignature, DecisionOutcome, Overview, RoundStatusReport, SignatureView, StartRound,
    StartedRound, Upload,
};
