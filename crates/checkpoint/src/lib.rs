//! Checkpoint discovery for distributed training
//!
//! Scans a checkpoint folder, decides whether a run already finished and
//! picks the snapshot to resume from.

pub mod loader;
pub mod resume;
pub mod scanner;

pub use loader::{BincodeLoader, CheckpointLoader};
pub use resume::{
    checkpoint_folder, is_training_finished, resolve, resume_checkpoint, resume_target,
    ResumePoint,
};
pub use scanner::{folder_state, has_any_checkpoint, has_final_checkpoint, scan};
