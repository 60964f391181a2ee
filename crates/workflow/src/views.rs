//! Inputs and results of workflow operations.

use bytes::Bytes;
use serde::Serialize;

use signet_core::{
    DocumentId, Round, Signature, SignatureId, StatusDetail, StatusRow, VerificationLog,
};

/// A file received from a client, not yet persisted.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

impl Upload {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }
}

/// Parameters for opening a signing round.
#[derive(Debug, Clone)]
pub struct StartRound {
    pub document_id: DocumentId,
    /// Requested signatures. Repeated ids are collapsed, keeping the first.
    pub signature_ids: Vec<SignatureId>,
    pub edited_file: Upload,
    pub draft: bool,
}

/// Result of uploading a signature.
#[derive(Debug, Clone, Serialize)]
pub struct SignatureView {
    pub signature: Signature,
    /// `true` when an existing signature was overwritten.
    pub replaced: bool,
}

/// A newly created status row together with the file of its signature.
#[derive(Debug, Clone, Serialize)]
pub struct AssignedSignature {
    pub status: StatusRow,
    pub signature_file: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartedRound {
    pub round: Round,
    pub assigned: Vec<AssignedSignature>,
}

/// The updated status row and the log entry written with it.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionOutcome {
    pub status: StatusRow,
    pub log: VerificationLog,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundStatusReport {
    pub round: Round,
    pub statuses: Vec<StatusDetail>,
}

/// Dashboard counters.
///
/// `total_documents` counts final rounds that are either fully signed or
/// still waiting on a signer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub total_documents: u64,
    pub fully_signed: u64,
    pub pending: u64,
    pub users: u64,
}
