//! function=set_upload_mode, function=set_default_mode

use chunkpost_core::ChunkError;
use chunkpost_services::{ChunkFs, ServerMode};

use super::{run_blocking, ApiState};

pub async fn handle_set_mode<F: ChunkFs>(
    state: &ApiState<F>,
    mode: ServerMode,
) -> Result<(), ChunkError> {
    let modes = state.modes.clone();
    run_blocking(move || modes.set_mode(mode)).await
}
