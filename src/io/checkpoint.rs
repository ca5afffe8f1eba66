//! Checkpoint save/load
//!
//! Checkpoints are pretty-printed JSON [`ModelState`] files under a log
//! directory, named by the caller. `open` creates the directory if missing;
//! it is an explicit initialization step, constructing a trainer never
//! touches the filesystem. There is no versioning and no integrity check: a
//! load against a missing or corrupt file is a propagated error.

use crate::model::ModelState;
use crate::{Error, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Default checkpoint directory
pub const DEFAULT_LOG_DIR: &str = "./logs";

/// Checkpoint files under one log directory
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    /// Open a store, creating the directory if absent
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Path of a named checkpoint
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Serialize model parameters, overwriting any previous checkpoint of
    /// the same name
    pub fn save(&self, name: &str, state: &ModelState) -> Result<()> {
        let file = File::create(self.path(name))?;
        serde_json::to_writer_pretty(BufWriter::new(file), state)
            .map_err(|e| Error::Serialization(format!("checkpoint `{name}`: {e}")))
    }

    /// Deserialize a named checkpoint
    pub fn load(&self, name: &str) -> Result<ModelState> {
        let path = self.path(name);
        if !path.exists() {
            return Err(Error::CheckpointNotFound(path));
        }
        let file = File::open(&path)?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::Serialization(format!("checkpoint `{name}`: {e}")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
