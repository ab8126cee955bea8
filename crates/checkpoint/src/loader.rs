//! Checkpoint loading seam
//!
//! The serialization format belongs to the training framework; resume logic
//! only needs something that turns a path into a checkpoint tree.

use runtime_core::{CheckpointTree, Error, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Deserializes a checkpoint file into a nested state dict
pub trait CheckpointLoader {
    fn load(&self, path: &Path) -> Result<CheckpointTree>;
}

impl<F> CheckpointLoader for F
where
    F: Fn(&Path) -> Result<CheckpointTree>,
{
    fn load(&self, path: &Path) -> Result<CheckpointTree> {
        self(path)
    }
}

/// Loader for checkpoints stored as bincode-encoded trees
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeLoader;

impl BincodeLoader {
    /// Write a tree atomically (temp file, then rename)
    #[instrument(skip_all, fields(path = %path.display(), entries = tree.len()))]
    pub fn save(path: &Path, tree: &CheckpointTree) -> Result<u64> {
        let bytes = bincode::serialize(tree).map_err(|e| Error::Serialization(e.to_string()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &bytes)?;
        fs::rename(&temp_path, path)?;

        debug!(size_bytes = bytes.len(), "Checkpoint written");
        Ok(bytes.len() as u64)
    }
}

impl CheckpointLoader for BincodeLoader {
    #[instrument(skip_all, fields(path = %path.display()))]
    fn load(&self, path: &Path) -> Result<CheckpointTree> {
        let bytes = fs::read(path)?;
        let tree: CheckpointTree =
            bincode::deserialize(&bytes).map_err(|e| Error::Serialization(e.to_string()))?;
        info!(size_bytes = bytes.len(), entries = tree.len(), "Loaded checkpoint");
        Ok(tree)
    }
}
