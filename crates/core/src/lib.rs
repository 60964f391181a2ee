pub mod completion;
pub mod error;
pub mod model;
pub mod requester;
pub mod role;
pub mod status;
pub mod types;

pub use completion::{Completion, RoundTally};
pub use error::ParseError;
pub use model::{
    Document, NewDocument, NewRound, NewUser, Round, Signature, StatusDetail, StatusRow, User,
    VerificationLog,
};
pub use requester::Requester;
pub use role::Role;
pub use status::{ApprovalStatus, Decision};
pub use types::{DocumentId, LogId, RoundId, SignatureId, StatusId, UserId};
