//! The error-specification mining/checking service (§6/§7): request/response shapes,
//! URI-scheme blob I/O, and the orchestration functions an RPC front end would expose.

pub mod blob_store;
pub mod error;
pub mod orchestration;
pub mod requests;

pub use blob_store::{BlobStore, FileBlobStore};
pub use error::{Error, Result};
pub use orchestration::{get_graph, get_violations, random_walk, ModuleLoader};
pub use requests::{
    EdgeRecord, ErrorCode, GetGraphRequest, GetViolationsRequest, GetViolationsResponse, GraphResponse,
    RandomWalkRequest, SentenceRecord, SpecificationRequest, ViolationRecord,
};
