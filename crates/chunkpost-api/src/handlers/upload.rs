//! function=upload

use std::collections::HashMap;

use chunkpost_core::{ChunkError, ChunkRequest};
use chunkpost_services::ChunkFs;

use super::{run_blocking, ApiState};

pub async fn handle_upload<F: ChunkFs>(
    state: &ApiState<F>,
    fields: &HashMap<String, String>,
) -> Result<(), ChunkError> {
    let request = ChunkRequest::from_form(fields).inspect_err(|e| {
        tracing::warn!(label = %e, "chunk request rejected");
    })?;

    let writer = state.writer.clone();
    run_blocking(move || writer.write_chunk(&request)).await
}
