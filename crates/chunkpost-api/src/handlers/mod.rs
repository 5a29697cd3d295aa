//! The single POST endpoint. The `function` form field picks the operation.
//!
//! Every failure answers `203` with the error label as the whole body. The
//! status is the same for every kind of failure; clients tell them apart by
//! the body text.

pub mod mode;
pub mod upload;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};

use chunkpost_core::request::{field, function};
use chunkpost_core::ChunkError;
use chunkpost_services::{ChunkFs, ChunkWriter, PathLocks, ServerMode, ServerModeWriter};

pub struct ApiState<F: ChunkFs> {
    pub writer: Arc<ChunkWriter<F>>,
    pub modes: Arc<ServerModeWriter<F>>,
}

impl<F: ChunkFs> Clone for ApiState<F> {
    fn clone(&self) -> Self {
        Self {
            writer: self.writer.clone(),
            modes: self.modes.clone(),
        }
    }
}

impl<F: ChunkFs> ApiState<F> {
    /// `mode_file_dir` is where `.htaccess` is written, resolved by `fs`.
    pub fn new(fs: F, mode_file_dir: impl AsRef<Path>, serialize_writes: bool) -> Self {
        let mut writer = ChunkWriter::new(fs.clone());
        if serialize_writes {
            writer = writer.with_path_locks(PathLocks::new());
        }
        Self {
            writer: Arc::new(writer),
            modes: Arc::new(ServerModeWriter::new(fs, mode_file_dir)),
        }
    }
}

pub async fn handle_endpoint<F: ChunkFs>(
    State(state): State<ApiState<F>>,
    method: Method,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Response {
    if method != Method::POST {
        return StatusCode::OK.into_response();
    }

    // An unreadable or oversized body reads as an empty form.
    let fields = match form {
        Ok(Form(fields)) => fields,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "form body rejected, treating as empty");
            HashMap::new()
        }
    };

    match dispatch(&state, fields).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => (StatusCode::NON_AUTHORITATIVE_INFORMATION, e.label()).into_response(),
    }
}

async fn dispatch<F: ChunkFs>(
    state: &ApiState<F>,
    fields: HashMap<String, String>,
) -> Result<(), ChunkError> {
    let name = fields.get(field::FUNCTION).cloned().unwrap_or_default();

    if name == function::UPLOAD {
        return upload::handle_upload(state, &fields).await;
    }
    match ServerMode::from_function(&name) {
        Some(mode) => mode::handle_set_mode(state, mode).await,
        None => {
            tracing::warn!(function = %name, "unknown function");
            Err(ChunkError::UnknownFunction(name))
        }
    }
}

/// Run filesystem work on the blocking pool.
async fn run_blocking<T, Op>(op: Op) -> Result<T, ChunkError>
where
    T: Send + 'static,
    Op: FnOnce() -> Result<T, ChunkError> + Send + 'static,
{
    tokio::task::spawn_blocking(op).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "blocking task failed");
        Err(ChunkError::Internal)
    })
}
