//! Shared fixtures for the cross-crate tests

use std::path::Path;

use checkpoint::BincodeLoader;
use runtime_core::{CheckpointTree, StateDict, StateValue, Tensor};

/// Install a test subscriber once; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

pub fn param(shape: Vec<usize>, value: f32) -> StateValue {
    StateValue::Param(Tensor::full(shape, value).into())
}

pub fn dict(entries: Vec<(&str, StateValue)>) -> CheckpointTree {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Checkpoint as written by the trainer: `classy_state_dict.base_model.model.{trunk,heads}`
pub fn trainer_checkpoint(trunk_value: f32, head_value: f32) -> CheckpointTree {
    let trunk = dict(vec![
        ("_feature_blocks.conv1.weight", param(vec![4, 3], trunk_value)),
        ("_feature_blocks.bn1.weight", param(vec![4], trunk_value)),
        ("_feature_blocks.bn1.num_batches_tracked", param(vec![], 7.0)),
    ]);
    let heads = dict(vec![("0.clf.weight", param(vec![10, 4], head_value))]);
    dict(vec![
        ("phase_idx", param(vec![], trunk_value)),
        (
            "classy_state_dict",
            StateValue::Dict(dict(vec![(
                "base_model",
                StateValue::Dict(dict(vec![(
                    "model",
                    StateValue::Dict(dict(vec![
                        ("trunk", StateValue::Dict(trunk)),
                        ("heads", StateValue::Dict(heads)),
                    ])),
                )])),
            )])),
        ),
    ])
}

/// Parameters of the model under training, all zero
pub fn fresh_model(trunk_prefix: &str) -> StateDict<Tensor> {
    [
        (format!("{}_feature_blocks.conv1.weight", trunk_prefix), vec![4, 3]),
        (format!("{}_feature_blocks.bn1.weight", trunk_prefix), vec![4]),
        (
            format!("{}_feature_blocks.bn1.num_batches_tracked", trunk_prefix),
            vec![],
        ),
        ("heads.0.clf.weight".to_string(), vec![10, 4]),
    ]
    .into_iter()
    .map(|(name, shape)| (name, Tensor::zeros(shape)))
    .collect()
}

pub fn save(folder: &Path, filename: &str, tree: &CheckpointTree) -> anyhow::Result<()> {
    BincodeLoader::save(&folder.join(filename), tree)?;
    Ok(())
}
