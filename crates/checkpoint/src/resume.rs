//! Resume policy
//!
//! Decides at process start whether a run already finished and which
//! snapshot of the checkpoint folder to resume from.

use runtime_core::{
    CheckpointFile, CheckpointKind, CheckpointTree, Error, Result, RuntimeConfig,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use crate::loader::CheckpointLoader;
use crate::scanner;

/// Training is finished when a final snapshot exists and we are not
/// overwriting it.
pub fn is_training_finished(config: &RuntimeConfig, folder: &Path) -> Result<bool> {
    Ok(!config.checkpoint.overwrite_existing && scanner::has_final_checkpoint(folder)?)
}

/// Category of in-progress snapshots the job writes.
///
/// Iteration snapshots are newer than the last phase snapshot, so they are
/// preferred whenever the job writes them.
pub fn active_kind(config: &RuntimeConfig) -> CheckpointKind {
    if config.checkpoint.checkpoint_iter_frequency > 0 {
        CheckpointKind::Iteration
    } else {
        CheckpointKind::Phase
    }
}

/// Pick the snapshot to resume from.
///
/// A final snapshot wins unless `CHECKPOINT.OVERWRITE_EXISTING` is set.
/// Otherwise the in-progress snapshots of the active category are ranked
/// newest first and `CHECKPOINT.LATEST_CHECKPOINT_RESUME_FILE_NUM` picks one,
/// clamped to the available range. Rank 2 skips a corrupt latest file.
#[instrument(skip_all, fields(folder = %folder.display()))]
pub fn resolve(folder: &Path, config: &RuntimeConfig) -> Result<Option<CheckpointFile>> {
    let skip_final = config.checkpoint.overwrite_existing;
    if !skip_final {
        if let Some(last) = scanner::find_final(folder)? {
            info!(file = %last, "Found final checkpoint");
            return Ok(Some(last));
        }
    }

    let kind = active_kind(config);
    let mut candidates = scanner::collect_ordinals(folder, kind)?;
    if candidates.is_empty() {
        info!(kind = %kind, "No checkpoint to resume");
        return Ok(None);
    }

    candidates.sort_by(|a, b| b.ordinal.cmp(&a.ordinal));
    let requested = config.checkpoint.latest_checkpoint_resume_file_num;
    let index = requested.saturating_sub(1).min(candidates.len() - 1);
    info!(
        kind = %kind,
        available = candidates.len(),
        requested,
        checkpoint_resume_num = index,
        "Selecting resume checkpoint"
    );

    Ok(Some(candidates.swap_remove(index)))
}

/// Absolute checkpoint folder for this run, created if missing.
///
/// Multi-node runs may get a per-run subfolder named after
/// `DISTRIBUTED.RUN_ID`.
pub fn checkpoint_folder(config: &RuntimeConfig) -> Result<PathBuf> {
    let dir = config
        .checkpoint
        .dir
        .as_ref()
        .filter(|dir| !dir.as_os_str().is_empty())
        .ok_or_else(|| Error::InvalidConfig {
            message: "Please specify CHECKPOINT.DIR parameter. It should not be None.".to_string(),
        })?;

    let mut folder = absolute_path(dir)?;
    if config.distributed.num_nodes > 1 && config.checkpoint.append_distr_run_id {
        folder = folder.join(&config.distributed.run_id);
        fs::create_dir_all(&folder)?;
    }
    Ok(folder)
}

/// Make `path` absolute against the working directory and create it
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    fs::create_dir_all(&absolute)?;
    Ok(absolute)
}

/// Whether a snapshot should be written at `mode_num`.
///
/// Iteration snapshots follow the frequency only; phase snapshots are also
/// written for the last phase of training. A zero frequency disables the
/// periodic part.
pub fn is_checkpoint_phase(
    mode_num: u64,
    mode_frequency: u64,
    train_phase_idx: u64,
    num_epochs: u64,
    kind: CheckpointKind,
) -> bool {
    let periodic = mode_frequency > 0 && mode_num % mode_frequency == 0;
    match kind {
        CheckpointKind::Iteration => periodic,
        CheckpointKind::Phase => periodic || train_phase_idx + 1 == num_epochs,
        CheckpointKind::Final => false,
    }
}

/// Phase-boundary variant of [`is_checkpoint_phase`] using
/// `CHECKPOINT.CHECKPOINT_FREQUENCY`
pub fn should_checkpoint_phase(
    config: &RuntimeConfig,
    phase_num: u64,
    train_phase_idx: u64,
    num_epochs: u64,
) -> bool {
    is_checkpoint_phase(
        phase_num,
        config.checkpoint.checkpoint_frequency,
        train_phase_idx,
        num_epochs,
        CheckpointKind::Phase,
    )
}

/// Snapshot chosen for resumption, already deserialized
#[derive(Debug)]
pub struct ResumePoint {
    pub file: CheckpointFile,
    pub path: PathBuf,
    pub checkpoint: CheckpointTree,
}

/// The snapshot the job would resume from, without loading it.
///
/// `None` when `CHECKPOINT.AUTO_RESUME` is off or the folder has no usable
/// snapshot.
pub fn resume_target(config: &RuntimeConfig, folder: &Path) -> Result<Option<CheckpointFile>> {
    let skip_final = config.checkpoint.overwrite_existing;
    if !config.checkpoint.auto_resume || !scanner::has_any_checkpoint(folder, skip_final)? {
        return Ok(None);
    }

    let file = resolve(folder, config)?;
    if file.is_none() {
        warn!(
            folder = %folder.display(),
            "Checkpoints exist but none of the active category can be resumed"
        );
    }
    Ok(file)
}

/// Load the snapshot to resume from, if resuming applies
pub fn resume_checkpoint<L: CheckpointLoader + ?Sized>(
    config: &RuntimeConfig,
    folder: &Path,
    loader: &L,
) -> Result<Option<ResumePoint>> {
    let Some(file) = resume_target(config, folder)? else {
        return Ok(None);
    };

    let path = folder.join(&file.filename);
    info!(path = %path.display(), "Resume from file");
    let checkpoint = loader.load(&path)?;
    Ok(Some(ResumePoint {
        file,
        path,
        checkpoint,
    }))
}
