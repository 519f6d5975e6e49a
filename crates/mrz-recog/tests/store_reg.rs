//! Model store regression test
//!
//! Test structure:
//!   Test 0: save and load round trip through a directory candidate
//!   Test 1: environment override beats injected paths
//!   Test 2: missing artifacts name every attempted path
//!   Test 3: artifacts from different runs are rejected
//!   Test 4: corrupt artifacts report both paths
//!   Test 5: train and predict through the store
//!   Test 6: stored weights reload bit for bit

use std::ffi::OsString;
use std::fs;
use std::path::Path;

use mrz_recog::store::{DESCRIPTORS_PATH_ENV, MODEL_PATH_ENV};
use mrz_recog::{
    Classifier, ClassifierOptions, KernelOptions, ModelPathConfig, ModelPaths, ModelStore,
    RecogError, load_classifier, predict, save_classifier, train,
};
use mrz_test::RegParams;

fn toy(labels: &[u32]) -> Classifier {
    let descriptors = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.7, 0.7]];
    Classifier::train(descriptors, labels, &ClassifierOptions::default()).unwrap()
}

fn env_config(paths: &ModelPaths) -> ModelPathConfig {
    let d = OsString::from(paths.descriptors_path.as_os_str());
    let m = OsString::from(paths.model_path.as_os_str());
    ModelPathConfig::from_env_vars(move |name| match name {
        DESCRIPTORS_PATH_ENV => Some(d.clone()),
        MODEL_PATH_ENV => Some(m.clone()),
        _ => None,
    })
}

/// Test 0: round trip
#[test]
fn test_0_round_trip() {
    let mut rp = RegParams::new("store_0_round_trip");
    let dir = tempfile::tempdir().unwrap();

    let config = ModelPathConfig::default()
        .with_candidate_dirs(vec![dir.path().join("models")])
        .with_model_name("td3");
    let store = ModelStore::new(config);
    let original = toy(&[65, 66, 67]);

    let paths = store.save(&original).unwrap();
    rp.compare_values(1.0, paths.exists() as u8 as f64, 0.0);
    rp.compare_values(
        1.0,
        (paths.model_path == dir.path().join("models").join("td3.model.json")) as u8 as f64,
        0.0,
    );

    let loaded = store.load().unwrap();
    rp.compare_values(1.0, (loaded.descriptors() == original.descriptors()) as u8 as f64, 0.0);
    rp.compare_values(1.0, (loaded.kernel() == original.kernel()) as u8 as f64, 0.0);
    rp.compare_slices(original.labels(), loaded.labels());
    rp.compare_values(1.0, (loaded.model() == original.model()) as u8 as f64, 0.0);
    let probe = vec![vec![0.1, 0.9]];
    rp.compare_slices(&original.predict(&probe).unwrap(), &loaded.predict(&probe).unwrap());

    assert!(rp.cleanup(), "store test 0 (round trip) failed");
}

/// Test 1: resolution priority
#[test]
fn test_1_env_override() {
    let mut rp = RegParams::new("store_1_env_override");
    let dir = tempfile::tempdir().unwrap();

    let env_paths = ModelPaths::in_dir(&dir.path().join("env"), "mrz");
    let injected_paths = ModelPaths::in_dir(&dir.path().join("injected"), "mrz");
    save_classifier(&toy(&[65, 66, 67]), &env_paths).unwrap();
    save_classifier(&toy(&[65, 65, 65]), &injected_paths).unwrap();

    let config = env_config(&env_paths)
        .with_paths(&injected_paths.descriptors_path, &injected_paths.model_path)
        .unwrap()
        .with_candidate_dirs(Vec::new());
    let resolved = config.resolve().unwrap();
    rp.compare_values(1.0, (resolved == env_paths) as u8 as f64, 0.0);

    let loaded = ModelStore::new(config).load().unwrap();
    rp.compare_values(3.0, loaded.labels().len() as f64, 0.0);

    // Without the override the injected pair wins
    let config = ModelPathConfig::default()
        .with_paths(&injected_paths.descriptors_path, &injected_paths.model_path)
        .unwrap();
    rp.compare_values(1.0, (config.resolve().unwrap() == injected_paths) as u8 as f64, 0.0);

    // An override pointing nowhere falls through to the next resolver
    let missing = ModelPaths::in_dir(&dir.path().join("missing"), "mrz");
    let config = env_config(&missing)
        .with_paths(&injected_paths.descriptors_path, &injected_paths.model_path)
        .unwrap();
    rp.compare_values(1.0, (config.resolve().unwrap() == injected_paths) as u8 as f64, 0.0);

    assert!(rp.cleanup(), "store test 1 (env override) failed");
}

/// Test 2: nothing found
#[test]
fn test_2_not_found() {
    let mut rp = RegParams::new("store_2_not_found");
    let dir = tempfile::tempdir().unwrap();

    let config = ModelPathConfig::default()
        .with_paths(dir.path().join("a.bin"), dir.path().join("a.json"))
        .unwrap()
        .with_candidate_dirs(vec![dir.path().join("x"), dir.path().join("y")]);

    match ModelStore::new(config).load() {
        Err(RecogError::ArtifactNotFound { attempted }) => {
            rp.compare_values(3.0, attempted.len() as f64, 0.0);
            rp.compare_values(1.0, attempted[0].contains("a.json") as u8 as f64, 0.0);
            rp.compare_values(1.0, attempted[2].contains("mrz.descriptors.bin") as u8 as f64, 0.0);
        }
        other => panic!("expected ArtifactNotFound, got {other:?}"),
    }

    // Only one of the two files present is still missing
    let half = ModelPaths::in_dir(dir.path(), "half");
    save_classifier(&toy(&[65, 66, 67]), &half).unwrap();
    fs::remove_file(&half.model_path).unwrap();
    let config = ModelPathConfig::default()
        .with_paths(&half.descriptors_path, &half.model_path)
        .unwrap()
        .with_candidate_dirs(Vec::new());
    rp.compare_values(
        1.0,
        matches!(config.resolve(), Err(RecogError::ArtifactNotFound { .. })) as u8 as f64,
        0.0,
    );

    assert!(rp.cleanup(), "store test 2 (not found) failed");
}

/// Test 3: mismatched pair
#[test]
fn test_3_mismatch() {
    let mut rp = RegParams::new("store_3_mismatch");
    let dir = tempfile::tempdir().unwrap();

    let first = ModelPaths::in_dir(dir.path(), "first");
    let second = ModelPaths::in_dir(dir.path(), "second");
    save_classifier(&toy(&[65, 66, 67]), &first).unwrap();
    let other = Classifier::train(
        vec![vec![0.0, 2.0], vec![2.0, 0.0], vec![1.0, 1.0]],
        &[65, 66, 67],
        &ClassifierOptions::default(),
    )
    .unwrap();
    save_classifier(&other, &second).unwrap();

    let crossed = ModelPaths::new(&first.descriptors_path, &second.model_path);
    match load_classifier(&crossed) {
        Err(RecogError::ArtifactMismatch {
            descriptors_path,
            model_path,
        }) => {
            rp.compare_values(1.0, (descriptors_path == first.descriptors_path) as u8 as f64, 0.0);
            rp.compare_values(1.0, (model_path == second.model_path) as u8 as f64, 0.0);
        }
        other => panic!("expected ArtifactMismatch, got {other:?}"),
    }

    assert!(rp.cleanup(), "store test 3 (mismatch) failed");
}

/// Test 4: corrupt files
#[test]
fn test_4_corrupt() {
    let mut rp = RegParams::new("store_4_corrupt");
    let dir = tempfile::tempdir().unwrap();

    let paths = ModelPaths::in_dir(dir.path(), "mrz");
    save_classifier(&toy(&[65, 66, 67]), &paths).unwrap();
    fs::write(&paths.model_path, "{ not json").unwrap();

    match load_classifier(&paths) {
        Err(RecogError::ArtifactLoad {
            path, paired_with, ..
        }) => {
            rp.compare_values(1.0, (path == paths.model_path) as u8 as f64, 0.0);
            rp.compare_values(1.0, (paired_with == paths.descriptors_path) as u8 as f64, 0.0);
        }
        other => panic!("expected ArtifactLoad, got {other:?}"),
    }

    fs::write(&paths.descriptors_path, b"garbage").unwrap();
    let err = load_classifier(&paths).unwrap_err();
    let message = err.to_string();
    rp.compare_values(1.0, message.contains("mrz.descriptors.bin") as u8 as f64, 0.0);
    rp.compare_values(1.0, message.contains("mrz.model.json") as u8 as f64, 0.0);

    assert!(rp.cleanup(), "store test 4 (corrupt) failed");
}

/// Test 5: train and predict entry points
#[test]
fn test_5_train_predict() {
    let mut rp = RegParams::new("store_5_train_predict");
    let dir = tempfile::tempdir().unwrap();
    let target: &Path = dir.path();

    let store = ModelStore::new(
        ModelPathConfig::default()
            .with_paths(target.join("d.bin"), target.join("m.json"))
            .unwrap(),
    );
    let samples = vec![
        sample(vec![1.0, 0.0], 'X'),
        sample(vec![0.9, 0.1], 'X'),
        sample(vec![0.0, 1.0], 'Y'),
    ];
    let report = train(&samples, &ClassifierOptions::default(), &store).unwrap();
    rp.compare_values(3.0, report.sample_count as f64, 0.0);
    rp.compare_values(2.0, report.class_count as f64, 0.0);
    rp.compare_values(1.0, report.paths.exists() as u8 as f64, 0.0);

    let predicted = predict(&[vec![0.05, 0.95], vec![0.95, 0.0]], &store).unwrap();
    rp.compare_slices(&[Some('Y' as u32), Some('X' as u32)], &predicted);

    assert!(rp.cleanup(), "store test 5 (train/predict) failed");
}

/// Test 6: exact weights
#[test]
fn test_6_exact_weights() {
    let mut rp = RegParams::new("store_6_exact_weights");
    let dir = tempfile::tempdir().unwrap();

    for run in 0..12_u32 {
        // Irregular coordinates so coefficients use every mantissa bit
        let descriptors: Vec<Vec<f64>> = (0..9_u32)
            .map(|i| {
                let t = (run * 9 + i) as f64;
                vec![(t * 1.618).sin(), (t * 2.718).cos(), (t * 0.577).sin() * 0.3]
            })
            .collect();
        let labels: Vec<u32> = (0..9).map(|i| 'A' as u32 + i % 3).collect();
        let options = ClassifierOptions::default().with_kernel(KernelOptions::Rbf { sigma: 0.7 });
        let original = Classifier::train(descriptors, &labels, &options).unwrap();

        let paths = ModelPaths::in_dir(dir.path(), &format!("run{run}"));
        save_classifier(&original, &paths).unwrap();
        let loaded = load_classifier(&paths).unwrap();
        rp.compare_values(1.0, (loaded.model() == original.model()) as u8 as f64, 0.0);
        rp.compare_values(1.0, (loaded == original) as u8 as f64, 0.0);
    }

    assert!(rp.cleanup(), "store test 6 (exact weights) failed");
}

fn sample(descriptor: Vec<f64>, label: char) -> mrz_recog::TrainingSample {
    mrz_recog::TrainingSample {
        descriptor,
        label: label as u32,
        card: "c".to_string(),
    }
}
