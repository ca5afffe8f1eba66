//! Dataset batching and on-disk image tensors

mod batch;
mod images;

pub use batch::{permutation, Batch, Batches, IdBatch, IdBatches};
pub use images::{ImageStore, DEFAULT_IMAGE_DIR};
