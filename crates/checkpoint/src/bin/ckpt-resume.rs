//! Resume probe entry point
//!
//! Reads a training config and reports whether the run already finished and
//! which snapshot it would resume from.

use std::path::PathBuf;

use runtime_core::{RankInfo, RuntimeConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "checkpoint=info,runtime_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path: PathBuf = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or("usage: ckpt-resume <config.json>")?;

    let config = RuntimeConfig::from_json_file(&config_path)?;
    let rank = RankInfo::from_env();
    let folder = checkpoint::checkpoint_folder(&config)?;

    if checkpoint::is_training_finished(&config, &folder)? {
        if rank.is_primary() {
            tracing::info!(folder = %folder.display(), "Training already finished");
        }
        println!("finished");
        return Ok(());
    }

    match checkpoint::resume_target(&config, &folder)? {
        Some(file) => {
            if rank.is_primary() {
                tracing::info!(file = %file, kind = %file.kind, "Would resume from checkpoint");
            }
            println!("{}", folder.join(&file.filename).display());
        }
        None => {
            if rank.is_primary() {
                tracing::info!(folder = %folder.display(), "Starting from scratch");
            }
            println!("none");
        }
    }

    Ok(())
}
