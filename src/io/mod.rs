//! Checkpoint persistence

mod checkpoint;

pub use checkpoint::{CheckpointStore, DEFAULT_LOG_DIR};
