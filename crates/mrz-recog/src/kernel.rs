//! Kernel functions and precomputed kernel matrices
//!
//! The classifier never sees raw descriptors: it is fed a matrix of
//! pairwise kernel values between the rows being classified and the stored
//! training descriptors. Column 0 of every row holds the 1-based row serial
//! number, which is how the precomputed-kernel input format identifies
//! training samples; it is not a feature.

use serde::{Deserialize, Serialize};

use crate::descriptor::{Descriptor, common_length};
use crate::error::{RecogError, RecogResult};

/// Kernel function and parameters
///
/// Persisted next to the training descriptors so inference always uses the
/// kernel the model was trained with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum KernelOptions {
    /// `<x, y>`
    Linear,
    /// `(scale * <x, y> + constant) ^ degree`
    Polynomial {
        degree: u32,
        constant: f64,
        scale: f64,
    },
    /// `exp(-|x - y|^2 / (2 sigma^2))`
    Rbf { sigma: f64 },
}

impl Default for KernelOptions {
    fn default() -> Self {
        KernelOptions::Polynomial {
            degree: 2,
            constant: 1.0,
            scale: 1.0,
        }
    }
}

impl KernelOptions {
    /// Validate kernel parameters
    pub fn validate(&self) -> RecogResult<()> {
        match *self {
            KernelOptions::Linear => Ok(()),
            KernelOptions::Polynomial { degree, .. } if degree == 0 => Err(
                RecogError::InvalidParameter("polynomial degree must be positive".to_string()),
            ),
            KernelOptions::Polynomial { .. } => Ok(()),
            KernelOptions::Rbf { sigma } if sigma.is_nan() || sigma <= 0.0 => Err(RecogError::InvalidParameter(
                "rbf sigma must be positive".to_string(),
            )),
            KernelOptions::Rbf { .. } => Ok(()),
        }
    }

    /// Evaluate the kernel on two vectors of equal length
    pub fn compute(&self, a: &[f64], b: &[f64]) -> f64 {
        match *self {
            KernelOptions::Linear => dot(a, b),
            KernelOptions::Polynomial {
                degree,
                constant,
                scale,
            } => (scale * dot(a, b) + constant).powi(degree as i32),
            KernelOptions::Rbf { sigma } => {
                let sq: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
                (-sq / (2.0 * sigma * sigma)).exp()
            }
        }
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Pairwise kernel values, one row per `rows` entry, one column per `cols`
pub fn kernel_matrix(
    kernel: &KernelOptions,
    rows: &[Descriptor],
    cols: &[Descriptor],
) -> Vec<Vec<f64>> {
    rows.iter()
        .map(|r| cols.iter().map(|c| kernel.compute(r, c)).collect())
        .collect()
}

/// Insert the 1-based row serial number as column 0
pub fn add_row_index(matrix: &mut [Vec<f64>]) {
    for (i, row) in matrix.iter_mut().enumerate() {
        row.insert(0, (i + 1) as f64);
    }
}

/// Build the precomputed kernel input for `test` against `train`
///
/// Row `i` is `[i + 1, K(test_i, train_0), K(test_i, train_1), ...]`.
///
/// # Errors
///
/// Fails if either set is empty or any descriptor length differs from the
/// training length.
pub fn precomputed_matrix(
    kernel: &KernelOptions,
    test: &[Descriptor],
    train: &[Descriptor],
) -> RecogResult<Vec<Vec<f64>>> {
    kernel.validate()?;
    let train_len = common_length(train)?;
    let test_len = common_length(test)?;
    if test_len != train_len {
        return Err(RecogError::DescriptorLength {
            index: 0,
            expected: train_len,
            actual: test_len,
        });
    }

    let mut matrix = kernel_matrix(kernel, test, train);
    add_row_index(&mut matrix);
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernels() {
        let a = [1.0, 2.0];
        let b = [3.0, -1.0];
        assert_eq!(KernelOptions::Linear.compute(&a, &b), 1.0);
        assert_eq!(KernelOptions::default().compute(&a, &b), 4.0);
        let rbf = KernelOptions::Rbf { sigma: 1.0 };
        assert_eq!(rbf.compute(&a, &a), 1.0);
        assert!((rbf.compute(&a, &b) - (-6.5_f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_kernel_validation() {
        assert!(KernelOptions::Rbf { sigma: 0.0 }.validate().is_err());
        assert!(
            KernelOptions::Polynomial {
                degree: 0,
                constant: 1.0,
                scale: 1.0
            }
            .validate()
            .is_err()
        );
        assert!(KernelOptions::default().validate().is_ok());
    }

    #[test]
    fn test_precomputed_matrix_layout() {
        let train = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]];
        let test = vec![vec![2.0, 0.0], vec![0.0, 3.0]];
        let m = precomputed_matrix(&KernelOptions::Linear, &test, &train).unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(m[0], vec![1.0, 2.0, 0.0, 2.0]);
        assert_eq!(m[1], vec![2.0, 0.0, 3.0, 3.0]);
    }

    #[test]
    fn test_precomputed_matrix_length_mismatch() {
        let train = vec![vec![1.0, 0.0]];
        let test = vec![vec![1.0, 0.0, 0.0]];
        assert!(precomputed_matrix(&KernelOptions::Linear, &test, &train).is_err());
    }
}
