//! Initializing a model from checkpoints found on disk

use anyhow::Result;
use checkpoint::{resume_checkpoint, BincodeLoader};
use integration_tests::{fresh_model, init_tracing, save, trainer_checkpoint};
use runtime_core::{Error, ParamValue, RuntimeConfig, StateDict, Tensor};
use state_dict::{
    apply_state_dict, init_model_from_weights, LayerStatus, ModelParameters, WeightInitRequest,
    CLASSY_STATE_DICT_KEY,
};
use tempfile::tempdir;

#[test]
fn test_resume_then_initialize_from_trainer_checkpoint() -> Result<()> {
    init_tracing();
    let dir = tempdir()?;
    save(dir.path(), "model_phase1.torch", &trainer_checkpoint(1.0, 10.0))?;
    save(dir.path(), "model_phase2.torch", &trainer_checkpoint(2.0, 20.0))?;

    let mut config = RuntimeConfig::default();
    config.checkpoint.dir = Some(dir.path().to_path_buf());
    let point = resume_checkpoint(&config, dir.path(), &BincodeLoader)?.expect("resume expected");
    assert_eq!(point.file.ordinal, Some(2));

    let mut model = fresh_model("trunk.");
    let skip = vec!["num_batches_tracked".to_string()];
    let request = WeightInitRequest {
        key_name: Some(CLASSY_STATE_DICT_KEY),
        skip_layers: &skip,
        ..Default::default()
    };
    let report = init_model_from_weights(&config, &mut model, point.checkpoint, &request, true)?;

    assert_eq!(report.loaded_count(), 3);
    assert_eq!(
        report.skipped().collect::<Vec<_>>(),
        vec!["trunk._feature_blocks.bn1.num_batches_tracked"]
    );
    assert!(report.extra_layers.is_empty());

    let conv = model
        .parameter("trunk._feature_blocks.conv1.weight")
        .expect("conv1");
    assert!(conv.data().iter().all(|&v| v == 2.0));
    let head = model.parameter("heads.0.clf.weight").expect("head");
    assert!(head.data().iter().all(|&v| v == 20.0));
    let tracked = model
        .parameter("trunk._feature_blocks.bn1.num_batches_tracked")
        .expect("tracked");
    assert_eq!(tracked.data(), &[0.0]);
    Ok(())
}

#[test]
fn test_feature_eval_wraps_trunk() -> Result<()> {
    let dir = tempdir()?;
    save(dir.path(), "model_final_checkpoint_phase3.torch", &trainer_checkpoint(3.0, 30.0))?;

    let mut config = RuntimeConfig::default();
    config.model.feature_eval_mode = true;
    let point = resume_checkpoint(&config, dir.path(), &BincodeLoader)?.expect("final expected");
    assert!(point.file.is_final());

    let mut model = fresh_model("trunk.base_model.");
    let request = WeightInitRequest {
        key_name: Some(CLASSY_STATE_DICT_KEY),
        ..Default::default()
    };
    let report = init_model_from_weights(&config, &mut model, point.checkpoint, &request, false)?;

    assert_eq!(report.loaded_count(), 4);
    assert!(report.not_found().next().is_none());
    assert!(matches!(
        report.status("trunk.base_model._feature_blocks.conv1.weight"),
        Some(LayerStatus::Loaded { shape }) if shape == &vec![4, 3]
    ));
    Ok(())
}

#[test]
fn test_external_weights_renamed_from_config() -> Result<()> {
    let dir = tempdir()?;
    let mut weights: StateDict<ParamValue> = StateDict::new();
    weights.insert("module.conv1.weight", Tensor::full(vec![4, 3], 0.25).into());
    weights.insert("module.bn1.weight", Tensor::full(vec![4], 0.75).into());
    let mut raw = runtime_core::CheckpointTree::new();
    raw.insert(
        "model_state_dict",
        runtime_core::StateValue::Dict(
            weights
                .into_iter()
                .map(|(k, v)| (k, runtime_core::StateValue::Param(v)))
                .collect(),
        ),
    );
    let path = dir.path().join("pretrained.torch");
    BincodeLoader::save(&path, &raw)?;

    let config: RuntimeConfig = serde_json::from_value(serde_json::json!({
        "MODEL": {
            "PARAMS_FILE": {
                "PATH": path,
                "STATE_DICT_KEY_NAME": "model_state_dict",
                "REMOVE_PREFIX": "module.",
                "APPEND_PREFIX": "trunk._feature_blocks.",
            }
        }
    }))?;
    let loaded = checkpoint::CheckpointLoader::load(&BincodeLoader, &path)?;

    let mut model = fresh_model("trunk.");
    let report = init_model_from_weights(
        &config,
        &mut model,
        loaded,
        &WeightInitRequest::from_config(&config),
        true,
    )?;

    assert_eq!(report.loaded_count(), 2);
    assert_eq!(
        report.not_found().collect::<Vec<_>>(),
        vec![
            "trunk._feature_blocks.bn1.num_batches_tracked",
            "heads.0.clf.weight"
        ]
    );
    Ok(())
}

#[test]
fn test_unprefixed_weights_are_rejected() -> Result<()> {
    let mut raw = runtime_core::CheckpointTree::new();
    raw.insert(
        "conv1.weight",
        runtime_core::StateValue::Param(Tensor::full(vec![4, 3], 1.0).into()),
    );
    let config = RuntimeConfig::default();
    let mut model = fresh_model("trunk.");

    let err = init_model_from_weights(
        &config,
        &mut model,
        raw,
        &WeightInitRequest::default(),
        false,
    )
    .unwrap_err();
    assert!(matches!(err, Error::IncompatibleStateDict { .. }));
    assert_eq!(err.layer(), Some("conv1.weight"));
    assert!(model
        .parameter("trunk._feature_blocks.conv1.weight")
        .expect("conv1")
        .data()
        .iter()
        .all(|&v| v == 0.0));
    Ok(())
}

#[test]
fn test_apply_reports_loaded_missing_and_extra() -> Result<()> {
    let mut model: StateDict<Tensor> = StateDict::new();
    model.insert("trunk.conv1", Tensor::zeros(vec![2, 2]));
    model.insert("heads.fc", Tensor::zeros(vec![3]));

    let mut source: StateDict<ParamValue> = StateDict::new();
    source.insert("trunk.conv1", Tensor::full(vec![2, 2], 1.5).into());
    source.insert("extra.layer", Tensor::zeros(vec![1]).into());

    let report = apply_state_dict(&mut model, &source, &[], true)?;
    assert_eq!(report.loaded().collect::<Vec<_>>(), vec!["trunk.conv1"]);
    assert_eq!(report.status("heads.fc"), Some(&LayerStatus::NotFound));
    assert_eq!(report.extra_layers, vec!["extra.layer"]);
    assert_eq!(
        model.parameter("trunk.conv1").expect("conv1").data(),
        &[1.5, 1.5, 1.5, 1.5]
    );
    assert_eq!(model.parameter("heads.fc").expect("fc").data(), &[0.0, 0.0, 0.0]);
    Ok(())
}
