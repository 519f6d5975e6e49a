//! Glyph classifier
//!
//! Couples the training descriptors, the kernel they are compared with and
//! the trained SVM. Because the kernel is precomputed, prediction needs all
//! three: new descriptors are compared against the stored training set and
//! the resulting rows are fed to the machines.
//!
//! # Training modes
//!
//! The mode follows the label cardinality of the training set:
//!
//! - two or more distinct labels train a multi-class C-support machine
//! - a single label trains a one-class novelty detector instead; this is
//!   logged and reported through [`Classifier::mode`], never as an error

use crate::descriptor::{Descriptor, TrainingSample, common_length};
use crate::error::{RecogError, RecogResult};
use crate::kernel::{KernelOptions, precomputed_matrix};
use crate::store::{ModelPaths, ModelStore};
use crate::svm::{SvmModel, SvmParams, TrainingMode};

/// Options for classifier training
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifierOptions {
    /// Kernel used to build the precomputed matrices
    pub kernel: KernelOptions,
    /// Machine parameters (cost 1, gamma 1, nu 0.5 by default)
    pub svm: SvmParams,
}

impl ClassifierOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the kernel
    pub fn with_kernel(mut self, kernel: KernelOptions) -> Self {
        self.kernel = kernel;
        self
    }

    /// Set the C-support cost
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.svm.cost = cost;
        self
    }

    /// Set gamma
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.svm.gamma = gamma;
        self
    }

    /// Set the one-class nu
    pub fn with_nu(mut self, nu: f64) -> Self {
        self.svm.nu = nu;
        self
    }

    /// Set the solver tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.svm.tolerance = tolerance;
        self
    }

    /// Set the solver iteration cap
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.svm.max_iterations = max_iterations;
        self
    }

    /// Validate options
    pub fn validate(&self) -> RecogResult<()> {
        self.kernel.validate()?;
        if self.svm.tolerance.is_nan() || self.svm.tolerance <= 0.0 {
            return Err(RecogError::InvalidParameter(
                "tolerance must be positive".to_string(),
            ));
        }
        if self.svm.max_iterations == 0 {
            return Err(RecogError::InvalidParameter(
                "max_iterations must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Anything that turns a descriptor batch into labels, one per row, in
/// input order
pub trait GlyphPredictor {
    /// Predict a label (character code point) per descriptor
    fn predict(&self, descriptors: &[Descriptor]) -> RecogResult<Vec<Option<u32>>>;
}

/// A trained glyph classifier
#[derive(Debug, Clone, PartialEq)]
pub struct Classifier {
    descriptors: Vec<Descriptor>,
    kernel: KernelOptions,
    model: SvmModel,
}

impl Classifier {
    /// Train on descriptors and their labels
    pub fn train(
        descriptors: Vec<Descriptor>,
        labels: &[u32],
        options: &ClassifierOptions,
    ) -> RecogResult<Self> {
        options.validate()?;
        if descriptors.len() != labels.len() {
            return Err(RecogError::InvalidParameter(format!(
                "{} descriptors but {} labels",
                descriptors.len(),
                labels.len()
            )));
        }

        let matrix = precomputed_matrix(&options.kernel, &descriptors, &descriptors)?;
        let model = SvmModel::train(&matrix, labels, &options.svm)?;

        match model.mode {
            TrainingMode::OneClass => log::warn!(
                "only one distinct label ({}) in {} samples; trained a one-class model",
                model.labels[0],
                labels.len()
            ),
            TrainingMode::MultiClass => log::info!(
                "trained multi-class model: {} samples, {} classes, {} machines",
                labels.len(),
                model.labels.len(),
                model.machines.len()
            ),
        }

        Ok(Self {
            descriptors,
            kernel: options.kernel,
            model,
        })
    }

    /// Train on assembled samples
    pub fn train_samples(
        samples: &[TrainingSample],
        options: &ClassifierOptions,
    ) -> RecogResult<Self> {
        let descriptors = samples.iter().map(|s| s.descriptor.clone()).collect();
        let labels: Vec<u32> = samples.iter().map(|s| s.label).collect();
        Self::train(descriptors, &labels, options)
    }

    /// Reassemble a classifier from persisted parts
    pub fn from_parts(
        descriptors: Vec<Descriptor>,
        kernel: KernelOptions,
        model: SvmModel,
    ) -> RecogResult<Self> {
        common_length(&descriptors)?;
        if descriptors.len() != model.train_count {
            return Err(RecogError::InvalidParameter(format!(
                "model was trained on {} samples but {} descriptors were supplied",
                model.train_count,
                descriptors.len()
            )));
        }
        Ok(Self {
            descriptors,
            kernel,
            model,
        })
    }

    /// Training mode
    pub fn mode(&self) -> TrainingMode {
        self.model.mode
    }

    /// Kernel options
    pub fn kernel(&self) -> &KernelOptions {
        &self.kernel
    }

    /// Training descriptors
    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    /// Trained machine
    pub fn model(&self) -> &SvmModel {
        &self.model
    }

    /// Class labels in first-appearance order
    pub fn labels(&self) -> &[u32] {
        &self.model.labels
    }

    /// Predict a label per descriptor, in input order
    pub fn predict(&self, descriptors: &[Descriptor]) -> RecogResult<Vec<Option<u32>>> {
        if descriptors.is_empty() {
            return Ok(Vec::new());
        }
        let matrix = precomputed_matrix(&self.kernel, descriptors, &self.descriptors)?;
        self.model.predict(&matrix)
    }

    /// Predict characters; labels that are not valid code points map to `None`
    pub fn predict_chars(&self, descriptors: &[Descriptor]) -> RecogResult<Vec<Option<char>>> {
        Ok(self
            .predict(descriptors)?
            .into_iter()
            .map(|l| l.and_then(char::from_u32))
            .collect())
    }

    /// Score the classifier on labeled samples
    pub fn evaluate(&self, samples: &[TrainingSample]) -> RecogResult<Evaluation> {
        let descriptors: Vec<Descriptor> = samples.iter().map(|s| s.descriptor.clone()).collect();
        let predicted = self.predict(&descriptors)?;

        let misclassified: Vec<Misclassification> = samples
            .iter()
            .zip(predicted)
            .enumerate()
            .filter(|(_, (s, p))| *p != Some(s.label))
            .map(|(index, (s, p))| Misclassification {
                index,
                expected: s.label,
                predicted: p,
            })
            .collect();

        Ok(Evaluation {
            total: samples.len(),
            correct: samples.len() - misclassified.len(),
            misclassified,
        })
    }
}

impl GlyphPredictor for Classifier {
    fn predict(&self, descriptors: &[Descriptor]) -> RecogResult<Vec<Option<u32>>> {
        Classifier::predict(self, descriptors)
    }
}

/// One wrong prediction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Misclassification {
    /// Sample index
    pub index: usize,
    /// Expected label
    pub expected: u32,
    /// Predicted label (`None` when rejected)
    pub predicted: Option<u32>,
}

/// Accuracy report
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Evaluation {
    /// Number of samples scored
    pub total: usize,
    /// Number predicted correctly
    pub correct: usize,
    /// Every wrong prediction
    pub misclassified: Vec<Misclassification>,
}

impl Evaluation {
    /// Fraction of correct predictions (1 for an empty set)
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

/// Summary of a persisted training run
#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    /// Mode the label cardinality selected
    pub mode: TrainingMode,
    /// Where the artifact pair was written
    pub paths: ModelPaths,
    /// Number of training samples
    pub sample_count: usize,
    /// Number of distinct labels
    pub class_count: usize,
}

/// Train on samples and persist the artifact pair through a store
///
/// The pair is written to the store's first writable candidate, replacing
/// any previous model there.
pub fn train(
    samples: &[TrainingSample],
    options: &ClassifierOptions,
    store: &ModelStore,
) -> RecogResult<TrainReport> {
    let classifier = Classifier::train_samples(samples, options)?;
    let paths = store.save(&classifier)?;
    Ok(TrainReport {
        mode: classifier.mode(),
        paths,
        sample_count: samples.len(),
        class_count: classifier.labels().len(),
    })
}

/// Load the stored classifier and predict a batch of descriptors
pub fn predict(descriptors: &[Descriptor], store: &ModelStore) -> RecogResult<Vec<Option<u32>>> {
    store.load()?.predict(descriptors)
}
