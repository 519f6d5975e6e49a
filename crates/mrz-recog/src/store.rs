//! Model artifact store
//!
//! A trained classifier persists as two co-located files:
//!
//! ```text
//! <name>.descriptors.bin   bincode { version, fingerprint, descriptors, kernel }
//! <name>.model.json        JSON    { version, fingerprint, model }
//! ```
//!
//! The fingerprint is the SHA-256 of the encoded `(descriptors, kernel)`
//! pair and is written into both files, so loading a descriptors file next
//! to a model from another training run fails instead of predicting
//! garbage.
//!
//! # Path resolution
//!
//! Candidate pairs come from an ordered list of resolvers:
//!
//! 1. `MRZ_DESCRIPTORS_PATH` + `MRZ_MODEL_PATH` (both must be set)
//! 2. paths injected with [`ModelPathConfig::with_paths`]
//! 3. deployment directories: serverless static directories, then the
//!    local `public/models`
//!
//! Reads take the first pair whose two files exist. Writes take the first
//! pair any resolver produces, so retraining into a custom location means
//! injecting paths.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::classifier::Classifier;
use crate::descriptor::Descriptor;
use crate::error::{RecogError, RecogResult};
use crate::kernel::KernelOptions;
use crate::svm::SvmModel;

/// Environment variable holding the descriptors file path
pub const DESCRIPTORS_PATH_ENV: &str = "MRZ_DESCRIPTORS_PATH";

/// Environment variable holding the model file path
pub const MODEL_PATH_ENV: &str = "MRZ_MODEL_PATH";

/// File stem used inside candidate directories
pub const DEFAULT_MODEL_NAME: &str = "mrz";

/// Artifact format version
const FORMAT_VERSION: u32 = 1;

/// Deployment directories searched after explicit paths
pub fn default_candidate_dirs() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/var/task/public/models"),
        PathBuf::from("/var/task/static/models"),
        PathBuf::from("public/models"),
    ]
}

/// Locations of one artifact pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelPaths {
    /// Training descriptors and kernel options
    pub descriptors_path: PathBuf,
    /// Serialized machine
    pub model_path: PathBuf,
}

impl ModelPaths {
    /// Create a pair from two paths
    pub fn new(descriptors_path: impl Into<PathBuf>, model_path: impl Into<PathBuf>) -> Self {
        Self {
            descriptors_path: descriptors_path.into(),
            model_path: model_path.into(),
        }
    }

    /// The conventional pair for `name` inside `dir`
    pub fn in_dir(dir: &Path, name: &str) -> Self {
        Self::new(
            dir.join(format!("{name}.descriptors.bin")),
            dir.join(format!("{name}.model.json")),
        )
    }

    /// Whether both files exist
    pub fn exists(&self) -> bool {
        self.descriptors_path.is_file() && self.model_path.is_file()
    }

    fn describe(&self) -> String {
        format!(
            "{} + {}",
            self.descriptors_path.display(),
            self.model_path.display()
        )
    }
}

/// Where model artifacts are looked up and written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPathConfig {
    /// Pair captured from the environment variables
    pub env_override: Option<ModelPaths>,
    /// Pair injected by the caller
    pub injected: Option<ModelPaths>,
    /// Directories searched last, in order
    pub candidate_dirs: Vec<PathBuf>,
    /// File stem used inside the directories
    pub model_name: String,
}

impl Default for ModelPathConfig {
    fn default() -> Self {
        Self {
            env_override: None,
            injected: None,
            candidate_dirs: default_candidate_dirs(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
        }
    }
}

/// Produces candidate pairs from one source
type Resolver = fn(&ModelPathConfig) -> Vec<ModelPaths>;

/// Resolution order, highest priority first
const RESOLVERS: [Resolver; 3] = [env_candidates, injected_candidates, directory_candidates];

fn env_candidates(config: &ModelPathConfig) -> Vec<ModelPaths> {
    config.env_override.iter().cloned().collect()
}

fn injected_candidates(config: &ModelPathConfig) -> Vec<ModelPaths> {
    config.injected.iter().cloned().collect()
}

fn directory_candidates(config: &ModelPathConfig) -> Vec<ModelPaths> {
    config
        .candidate_dirs
        .iter()
        .map(|dir| ModelPaths::in_dir(dir, &config.model_name))
        .collect()
}

impl ModelPathConfig {
    /// Default configuration with the environment override captured
    pub fn from_env() -> Self {
        Self::from_env_vars(|name| std::env::var_os(name))
    }

    /// Default configuration with the override read through `lookup`
    ///
    /// The override applies only when both variables are set and non-empty.
    pub fn from_env_vars(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v: &OsString| !v.is_empty());
        let env_override = match (non_empty(DESCRIPTORS_PATH_ENV), non_empty(MODEL_PATH_ENV)) {
            (Some(descriptors), Some(model)) => Some(ModelPaths::new(descriptors, model)),
            _ => None,
        };
        Self {
            env_override,
            ..Self::default()
        }
    }

    /// Inject an explicit artifact pair
    ///
    /// # Errors
    ///
    /// Returns [`RecogError::InvalidConfiguration`] if either path is empty.
    pub fn with_paths(
        mut self,
        descriptors_path: impl Into<PathBuf>,
        model_path: impl Into<PathBuf>,
    ) -> RecogResult<Self> {
        let paths = ModelPaths::new(descriptors_path, model_path);
        if paths.descriptors_path.as_os_str().is_empty() {
            return Err(RecogError::InvalidConfiguration(
                "descriptors path is required".to_string(),
            ));
        }
        if paths.model_path.as_os_str().is_empty() {
            return Err(RecogError::InvalidConfiguration(
                "model path is required".to_string(),
            ));
        }
        self.injected = Some(paths);
        Ok(self)
    }

    /// Replace the candidate directories
    pub fn with_candidate_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.candidate_dirs = dirs;
        self
    }

    /// Set the file stem used inside candidate directories
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }

    /// Every candidate pair in priority order
    pub fn candidates(&self) -> Vec<ModelPaths> {
        RESOLVERS.iter().flat_map(|resolve| resolve(self)).collect()
    }

    /// First candidate pair whose files both exist
    ///
    /// # Errors
    ///
    /// Returns [`RecogError::ArtifactNotFound`] listing every attempted pair.
    pub fn resolve(&self) -> RecogResult<ModelPaths> {
        let candidates = self.candidates();
        if let Some(found) = candidates.iter().find(|c| c.exists()) {
            log::debug!("resolved model artifacts: {}", found.describe());
            return Ok(found.clone());
        }
        Err(RecogError::ArtifactNotFound {
            attempted: candidates.iter().map(ModelPaths::describe).collect(),
        })
    }

    /// Pair a training run writes to: the first candidate
    pub fn write_target(&self) -> RecogResult<ModelPaths> {
        self.candidates()
            .into_iter()
            .next()
            .ok_or(RecogError::ArtifactNotFound {
                attempted: Vec::new(),
            })
    }
}

/// Loads and saves classifiers according to a path configuration
#[derive(Debug, Clone, Default)]
pub struct ModelStore {
    config: ModelPathConfig,
}

impl ModelStore {
    /// Create a store over a configuration
    pub fn new(config: ModelPathConfig) -> Self {
        Self { config }
    }

    /// Store configured from the environment and default directories
    pub fn from_env() -> Self {
        Self::new(ModelPathConfig::from_env())
    }

    /// Path configuration
    pub fn config(&self) -> &ModelPathConfig {
        &self.config
    }

    /// Resolve the artifact pair to read
    pub fn resolve(&self) -> RecogResult<ModelPaths> {
        self.config.resolve()
    }

    /// Load the classifier from the first existing pair
    pub fn load(&self) -> RecogResult<Classifier> {
        load_classifier(&self.resolve()?)
    }

    /// Save a classifier to the first candidate pair
    pub fn save(&self, classifier: &Classifier) -> RecogResult<ModelPaths> {
        let paths = self.config.write_target()?;
        save_classifier(classifier, &paths)?;
        Ok(paths)
    }
}

#[derive(Serialize, Deserialize)]
struct DescriptorArtifact {
    version: u32,
    fingerprint: String,
    descriptors: Vec<Descriptor>,
    kernel: KernelOptions,
}

#[derive(Serialize, Deserialize)]
struct ModelArtifact {
    version: u32,
    fingerprint: String,
    model: SvmModel,
}

/// Hex SHA-256 over the encoded training descriptors and kernel
fn fingerprint(descriptors: &[Descriptor], kernel: &KernelOptions) -> Result<String, String> {
    let bytes = bincode::serialize(&(descriptors, kernel)).map_err(|e| e.to_string())?;
    Ok(Sha256::digest(&bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect())
}

/// Write a classifier's artifact pair
///
/// Parent directories are created as needed; existing files are replaced.
pub fn save_classifier(classifier: &Classifier, paths: &ModelPaths) -> RecogResult<()> {
    let write_err = |path: &Path| {
        let path = path.to_path_buf();
        move |message: String| RecogError::ArtifactWrite { path, message }
    };

    let fingerprint = fingerprint(classifier.descriptors(), classifier.kernel())
        .map_err(write_err(&paths.descriptors_path))?;

    let descriptors = DescriptorArtifact {
        version: FORMAT_VERSION,
        fingerprint: fingerprint.clone(),
        descriptors: classifier.descriptors().to_vec(),
        kernel: *classifier.kernel(),
    };
    let model = ModelArtifact {
        version: FORMAT_VERSION,
        fingerprint,
        model: classifier.model().clone(),
    };

    let descriptor_bytes =
        bincode::serialize(&descriptors).map_err(|e| write_err(&paths.descriptors_path)(e.to_string()))?;
    let model_text = serde_json::to_string(&model)
        .map_err(|e| write_err(&paths.model_path)(e.to_string()))?;

    for (path, bytes) in [
        (&paths.descriptors_path, descriptor_bytes.as_slice()),
        (&paths.model_path, model_text.as_bytes()),
    ] {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| write_err(path)(e.to_string()))?;
        }
        fs::write(path, bytes).map_err(|e| write_err(path)(e.to_string()))?;
    }

    log::info!(
        "saved model ({} training descriptors) to {}",
        classifier.descriptors().len(),
        paths.describe()
    );
    Ok(())
}

/// Read a classifier's artifact pair
///
/// # Errors
///
/// - [`RecogError::ArtifactLoad`] if either file cannot be read or decoded,
///   or carries an unknown format version
/// - [`RecogError::ArtifactMismatch`] if the two files come from different
///   training runs
pub fn load_classifier(paths: &ModelPaths) -> RecogResult<Classifier> {
    let load_err = |path: &Path, paired_with: &Path, message: String| RecogError::ArtifactLoad {
        path: path.to_path_buf(),
        paired_with: paired_with.to_path_buf(),
        message,
    };
    let desc_err = |message: String| load_err(&paths.descriptors_path, &paths.model_path, message);
    let model_err = |message: String| load_err(&paths.model_path, &paths.descriptors_path, message);

    let bytes = fs::read(&paths.descriptors_path).map_err(|e| desc_err(e.to_string()))?;
    let descriptors: DescriptorArtifact =
        bincode::deserialize(&bytes).map_err(|e| desc_err(e.to_string()))?;
    if descriptors.version != FORMAT_VERSION {
        return Err(desc_err(format!(
            "unsupported format version {}",
            descriptors.version
        )));
    }
    let actual = fingerprint(&descriptors.descriptors, &descriptors.kernel).map_err(&desc_err)?;
    if actual != descriptors.fingerprint {
        return Err(desc_err("contents do not match the stored fingerprint".to_string()));
    }

    let text = fs::read_to_string(&paths.model_path).map_err(|e| model_err(e.to_string()))?;
    let model: ModelArtifact = serde_json::from_str(&text).map_err(|e| model_err(e.to_string()))?;
    if model.version != FORMAT_VERSION {
        return Err(model_err(format!(
            "unsupported format version {}",
            model.version
        )));
    }

    if model.fingerprint != descriptors.fingerprint {
        return Err(RecogError::ArtifactMismatch {
            descriptors_path: paths.descriptors_path.clone(),
            model_path: paths.model_path.clone(),
        });
    }

    log::debug!("loaded model from {}", paths.describe());
    Classifier::from_parts(descriptors.descriptors, descriptors.kernel, model.model)
}
