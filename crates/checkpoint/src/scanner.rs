//! Checkpoint folder scanner
//!
//! Lists snapshot files and classifies them by naming convention:
//! `model_final_<suffix>.torch`, `model_phase<N>.torch` and
//! `model_iteration<N>.torch`.

use runtime_core::{
    CheckpointFile, CheckpointKind, Error, FolderState, Result, CHECKPOINT_EXTENSION,
};
use std::fs;
use std::path::Path;
use tracing::{debug, instrument};

/// Names of every snapshot file in the folder, sorted
#[instrument(skip_all, fields(folder = %folder.display()))]
pub fn list_snapshot_files(folder: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.ends_with(CHECKPOINT_EXTENSION) {
            names.push(name);
        }
    }
    names.sort();
    debug!(count = names.len(), "Found snapshot files");
    Ok(names)
}

/// Whether the folder holds any snapshot.
///
/// With `skip_final`, final snapshots are ignored (the run is being
/// overwritten).
pub fn has_any_checkpoint(folder: &Path, skip_final: bool) -> Result<bool> {
    Ok(list_snapshot_files(folder)?.iter().any(|name| {
        CheckpointKind::classify(name) != Some(CheckpointKind::Final) || !skip_final
    }))
}

/// Whether a final snapshot exists in the folder
pub fn has_final_checkpoint(folder: &Path) -> Result<bool> {
    Ok(find_final(folder)?.is_some())
}

/// The final snapshot of the folder, if any.
///
/// Only one final snapshot is authoritative; if several are present the
/// first in name order wins.
pub fn find_final(folder: &Path) -> Result<Option<CheckpointFile>> {
    Ok(list_snapshot_files(folder)?
        .into_iter()
        .find(|name| CheckpointKind::classify(name) == Some(CheckpointKind::Final))
        .map(|filename| CheckpointFile {
            filename,
            kind: CheckpointKind::Final,
            ordinal: None,
        }))
}

/// Every snapshot in the folder, classified, in name order.
///
/// Ordinals are parsed for every non-final file, so a malformed name of any
/// category fails the scan.
pub fn scan(folder: &Path) -> Result<Vec<CheckpointFile>> {
    list_snapshot_files(folder)?
        .into_iter()
        .filter_map(|filename| CheckpointKind::classify(&filename).map(|kind| (filename, kind)))
        .map(|(filename, kind)| {
            let ordinal = match kind {
                CheckpointKind::Final => None,
                _ => Some(parse_ordinal(&filename, kind)?),
            };
            Ok(CheckpointFile {
                filename,
                kind,
                ordinal,
            })
        })
        .collect()
}

/// Every snapshot of a non-final category with its parsed ordinal.
///
/// A filename of that category without a valid ordinal is a fatal
/// misconfiguration of the folder.
pub fn collect_ordinals(folder: &Path, kind: CheckpointKind) -> Result<Vec<CheckpointFile>> {
    debug_assert!(kind != CheckpointKind::Final);
    list_snapshot_files(folder)?
        .into_iter()
        .filter(|name| CheckpointKind::classify(name) == Some(kind))
        .map(|filename| {
            let ordinal = parse_ordinal(&filename, kind)?;
            Ok(CheckpointFile {
                filename,
                kind,
                ordinal: Some(ordinal),
            })
        })
        .collect()
}

/// Extract the ordinal from `<tag><N>.torch`.
///
/// The tag has to be a real prefix of the name; a name that merely contains
/// it somewhere else is rejected rather than guessed at.
pub fn parse_ordinal(filename: &str, kind: CheckpointKind) -> Result<u64> {
    let stem = filename
        .strip_suffix(CHECKPOINT_EXTENSION)
        .unwrap_or(filename);
    let digits = stem
        .strip_prefix(kind.tag())
        .ok_or_else(|| Error::MalformedCheckpointName {
            filename: filename.to_string(),
            reason: format!("expected the name to start with '{}'", kind.tag()),
        })?;
    digits
        .parse::<u64>()
        .map_err(|e| Error::MalformedCheckpointName {
            filename: filename.to_string(),
            reason: format!("invalid {} number '{}': {}", kind, digits, e),
        })
}

/// Directory-level state of the folder
pub fn folder_state(folder: &Path) -> Result<FolderState> {
    let names = list_snapshot_files(folder)?;
    let state = if names
        .iter()
        .any(|name| CheckpointKind::classify(name) == Some(CheckpointKind::Final))
    {
        FolderState::HasFinal
    } else if names.is_empty() {
        FolderState::Empty
    } else {
        FolderState::HasCheckpoints
    };
    Ok(state)
}
