//! CLI command modules.

pub mod http;
pub mod mode;
pub mod upload;
