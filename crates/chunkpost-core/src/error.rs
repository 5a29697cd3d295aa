//! Request-scoped failures.
//!
//! `Display` renders only the short label that goes back to the client as the
//! whole response body. Clients match on these strings, so they must not
//! change. The underlying I/O error stays reachable through `source()` for
//! logging.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    #[error("mkdir")]
    DirectoryCreate(#[source] io::Error),
    #[error("fopen")]
    FileOpen(#[source] io::Error),
    #[error("fseek")]
    Seek(#[source] io::Error),
    #[error("sha1")]
    ChecksumMismatch { expected: String, actual: String },
    #[error("size")]
    SizeMismatch { declared: i64, written: usize },
    #[error("fwrite")]
    Write(#[source] io::Error),
    #[error("fclose")]
    FileClose(#[source] io::Error),
    #[error("unknown function {0}")]
    UnknownFunction(String),
    #[error("decode {0}")]
    Decode(&'static str),
    #[error("internal")]
    Internal,
}

impl ChunkError {
    /// The label sent to the client.
    pub fn label(&self) -> String {
        self.to_string()
    }
}
