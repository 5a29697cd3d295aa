//! chunkpost-core: chunk requests, their form encoding, checksums, errors,
//! and configuration. All other chunkpost crates depend on this one.

pub mod checksum;
pub mod config;
pub mod error;
pub mod request;

pub use error::ChunkError;
pub use request::ChunkRequest;
