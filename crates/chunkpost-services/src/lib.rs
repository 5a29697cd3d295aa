//! chunkpost-services: the chunk writer and the filesystem it writes through.

pub mod chunk_writer;
pub mod fs;
pub mod mem_fs;
pub mod path_lock;
pub mod server_mode;

pub use chunk_writer::ChunkWriter;
pub use fs::{ChunkFs, LocalFs, OpenMode};
pub use mem_fs::{Faults, MemFs};
pub use path_lock::PathLocks;
pub use server_mode::{ServerMode, ServerModeWriter, MODE_FILE_NAME};
