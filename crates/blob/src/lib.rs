pub mod error;
pub mod filesystem;
pub mod key;
pub mod memory;
pub mod store;
pub mod types;

pub use error::BlobError;
pub use filesystem::FilesystemBlobStore;
pub use memory::MemoryBlobStore;
pub use store::BlobStore;
pub use types::{BlobMetadata, ResolvedBlob};
