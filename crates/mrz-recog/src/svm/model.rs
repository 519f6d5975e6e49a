//! SVM model training, prediction and serializable state

use serde::{Deserialize, Serialize};

use super::solver::{DualProblem, SolverParams};
use crate::error::{RecogError, RecogResult};

/// Training mode chosen from the label cardinality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingMode {
    /// Exactly one distinct label: novelty detection
    OneClass,
    /// Two or more distinct labels: C-support classification
    MultiClass,
}

/// Solver and machine parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SvmParams {
    /// Misclassification cost of the C-support machines
    pub cost: f64,
    /// Kernel coefficient; recorded with the model but not used by a
    /// precomputed kernel
    pub gamma: f64,
    /// Upper bound on the outlier fraction in one-class mode
    pub nu: f64,
    /// Stopping tolerance on the violation gap
    pub tolerance: f64,
    /// Iteration cap per binary problem
    pub max_iterations: usize,
}

impl Default for SvmParams {
    fn default() -> Self {
        Self {
            cost: 1.0,
            gamma: 1.0,
            nu: 0.5,
            tolerance: 1e-3,
            max_iterations: 10_000_000,
        }
    }
}

/// A training sample with a non-zero dual coefficient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupportVector {
    /// 1-based serial number of the training sample
    pub index: usize,
    /// Signed dual coefficient (`y * alpha`)
    pub coef: f64,
}

/// Decision function between two classes
///
/// `f(x) = sum(coef * K(sv, x)) - rho`; positive votes for `positive`.
/// In one-class mode both indices are 0 and positive means inlier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryMachine {
    /// Class index voted for by a positive decision value
    pub positive: usize,
    /// Class index voted for otherwise
    pub negative: usize,
    /// Support vectors
    pub support: Vec<SupportVector>,
    /// Decision offset
    pub rho: f64,
}

impl BinaryMachine {
    /// Decision value for one kernel row (column 0 is the serial number)
    pub fn decision(&self, row: &[f64]) -> RecogResult<f64> {
        let mut sum = 0.0;
        for sv in &self.support {
            let k = row.get(sv.index).ok_or_else(|| {
                RecogError::InvalidParameter(format!(
                    "kernel row has {} columns, support vector {} is out of range",
                    row.len(),
                    sv.index
                ))
            })?;
            sum += sv.coef * k;
        }
        Ok(sum - self.rho)
    }
}

/// A trained precomputed-kernel SVM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvmModel {
    /// Training mode
    pub mode: TrainingMode,
    /// Parameters used for training
    pub params: SvmParams,
    /// Class labels in first-appearance order
    pub labels: Vec<u32>,
    /// Number of training samples (kernel columns after the serial)
    pub train_count: usize,
    /// Binary machines, one per class pair (one in one-class mode)
    pub machines: Vec<BinaryMachine>,
}

/// Distinct labels in first-appearance order
fn distinct_labels(labels: &[u32]) -> Vec<u32> {
    let mut classes = Vec::new();
    for &l in labels {
        if !classes.contains(&l) {
            classes.push(l);
        }
    }
    classes
}

impl SvmModel {
    /// Train on a precomputed kernel matrix
    ///
    /// `matrix` must be `n` rows of `n + 1` values (serial number, then the
    /// kernel against every training sample) and `labels` must hold `n`
    /// entries. The mode follows the number of distinct labels.
    pub fn train(matrix: &[Vec<f64>], labels: &[u32], params: &SvmParams) -> RecogResult<Self> {
        let n = labels.len();
        if n == 0 {
            return Err(RecogError::EmptyInput("no training labels"));
        }
        if matrix.len() != n {
            return Err(RecogError::InvalidParameter(format!(
                "kernel matrix has {} rows for {} labels",
                matrix.len(),
                n
            )));
        }
        if let Some((i, row)) = matrix.iter().enumerate().find(|(_, r)| r.len() != n + 1) {
            return Err(RecogError::InvalidParameter(format!(
                "kernel row {} has {} columns, expected {}",
                i,
                row.len(),
                n + 1
            )));
        }

        let kernel = |i: usize, j: usize| matrix[i][j + 1];
        let classes = distinct_labels(labels);
        let solver = SolverParams {
            tolerance: params.tolerance,
            max_iterations: params.max_iterations,
        };

        if classes.len() == 1 {
            if params.nu.is_nan() || params.nu <= 0.0 || params.nu > 1.0 {
                return Err(RecogError::InvalidParameter(
                    "nu must be in (0, 1]".to_string(),
                ));
            }
            let machine = train_one_class(n, &kernel, params.nu, solver)?;
            return Ok(Self {
                mode: TrainingMode::OneClass,
                params: *params,
                labels: classes,
                train_count: n,
                machines: vec![machine],
            });
        }

        if params.cost.is_nan() || params.cost <= 0.0 {
            return Err(RecogError::InvalidParameter(
                "cost must be positive".to_string(),
            ));
        }

        let members: Vec<Vec<usize>> = classes
            .iter()
            .map(|c| (0..n).filter(|&i| labels[i] == *c).collect())
            .collect();

        let mut machines = Vec::with_capacity(classes.len() * (classes.len() - 1) / 2);
        for a in 0..classes.len() {
            for b in a + 1..classes.len() {
                let mut machine =
                    train_binary(&members[a], &members[b], &kernel, params.cost, solver)?;
                machine.positive = a;
                machine.negative = b;
                machines.push(machine);
            }
        }

        Ok(Self {
            mode: TrainingMode::MultiClass,
            params: *params,
            labels: classes,
            train_count: n,
            machines,
        })
    }

    /// Predict one label per kernel row
    ///
    /// Rows must have `train_count + 1` columns. In one-class mode rejected
    /// rows yield `None`; multi-class rows always yield a label, ties going
    /// to the class that appeared first in training.
    pub fn predict(&self, matrix: &[Vec<f64>]) -> RecogResult<Vec<Option<u32>>> {
        matrix
            .iter()
            .enumerate()
            .map(|(i, row)| {
                if row.len() != self.train_count + 1 {
                    return Err(RecogError::InvalidParameter(format!(
                        "kernel row {} has {} columns, model expects {}",
                        i,
                        row.len(),
                        self.train_count + 1
                    )));
                }
                self.predict_row(row)
            })
            .collect()
    }

    fn predict_row(&self, row: &[f64]) -> RecogResult<Option<u32>> {
        match self.mode {
            TrainingMode::OneClass => {
                let machine = self
                    .machines
                    .first()
                    .ok_or_else(|| RecogError::TrainingError("model has no machine".into()))?;
                Ok((machine.decision(row)? > 0.0).then(|| self.labels[0]))
            }
            TrainingMode::MultiClass => {
                let mut votes = vec![0usize; self.labels.len()];
                for machine in &self.machines {
                    let winner = if machine.decision(row)? > 0.0 {
                        machine.positive
                    } else {
                        machine.negative
                    };
                    if let Some(v) = votes.get_mut(winner) {
                        *v += 1;
                    }
                }
                let best = votes
                    .iter()
                    .enumerate()
                    .fold(0, |best, (i, &v)| if v > votes[best] { i } else { best });
                Ok(self.labels.get(best).copied())
            }
        }
    }
}

fn train_binary(
    pos: &[usize],
    neg: &[usize],
    kernel: &impl Fn(usize, usize) -> f64,
    cost: f64,
    solver: SolverParams,
) -> RecogResult<BinaryMachine> {
    let index: Vec<usize> = pos.iter().chain(neg).copied().collect();
    let y: Vec<f64> = (0..index.len())
        .map(|t| if t < pos.len() { 1.0 } else { -1.0 })
        .collect();
    let q: Vec<Vec<f64>> = (0..index.len())
        .map(|i| {
            (0..index.len())
                .map(|j| y[i] * y[j] * kernel(index[i], index[j]))
                .collect()
        })
        .collect();
    let p = vec![-1.0; index.len()];
    let c = vec![cost; index.len()];

    let problem = DualProblem {
        q: &q,
        p: &p,
        y: &y,
        c: &c,
    };
    let solution = problem.solve(vec![0.0; index.len()], solver);
    log_solution("c-svc", solution.iterations, solution.converged);

    let support = solution
        .alpha
        .iter()
        .enumerate()
        .filter(|(_, a)| **a > 0.0)
        .map(|(t, a)| SupportVector {
            index: index[t] + 1,
            coef: y[t] * a,
        })
        .collect();

    Ok(BinaryMachine {
        positive: 0,
        negative: 0,
        support,
        rho: solution.rho,
    })
}

fn train_one_class(
    n: usize,
    kernel: &impl Fn(usize, usize) -> f64,
    nu: f64,
    solver: SolverParams,
) -> RecogResult<BinaryMachine> {
    let q: Vec<Vec<f64>> = (0..n).map(|i| (0..n).map(|j| kernel(i, j)).collect()).collect();
    let p = vec![0.0; n];
    let y = vec![1.0; n];
    let c = vec![1.0; n];

    // Feasible start with sum(alpha) = nu * n
    let total = nu * n as f64;
    let whole = (total.floor() as usize).min(n);
    let mut alpha = vec![0.0; n];
    for a in alpha.iter_mut().take(whole) {
        *a = 1.0;
    }
    if whole < n {
        alpha[whole] = total - whole as f64;
    }

    let problem = DualProblem {
        q: &q,
        p: &p,
        y: &y,
        c: &c,
    };
    let solution = problem.solve(alpha, solver);
    log_solution("one-class", solution.iterations, solution.converged);

    let support = solution
        .alpha
        .iter()
        .enumerate()
        .filter(|(_, a)| **a > 0.0)
        .map(|(t, a)| SupportVector {
            index: t + 1,
            coef: *a,
        })
        .collect();

    Ok(BinaryMachine {
        positive: 0,
        negative: 0,
        support,
        rho: solution.rho,
    })
}

fn log_solution(kind: &str, iterations: usize, converged: bool) {
    if converged {
        log::debug!("{} solver converged after {} iterations", kind, iterations);
    } else {
        log::warn!(
            "{} solver stopped at the iteration cap ({}) before converging",
            kind,
            iterations
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{KernelOptions, precomputed_matrix};

    fn points() -> (Vec<Vec<f64>>, Vec<u32>) {
        let descriptors = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.9, 0.1, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.1, 0.9, 0.0],
            vec![0.0, 0.0, 1.0],
            vec![0.0, 0.1, 0.9],
        ];
        (descriptors, vec![65, 65, 66, 66, 67, 67])
    }

    #[test]
    fn test_multiclass_recall() {
        let (d, labels) = points();
        let kernel = KernelOptions::default();
        let m = precomputed_matrix(&kernel, &d, &d).unwrap();
        let model = SvmModel::train(&m, &labels, &SvmParams::default()).unwrap();
        assert_eq!(model.mode, TrainingMode::MultiClass);
        assert_eq!(model.labels, vec![65, 66, 67]);
        assert_eq!(model.machines.len(), 3);

        let predicted = model.predict(&m).unwrap();
        let expected: Vec<Option<u32>> = labels.iter().map(|&l| Some(l)).collect();
        assert_eq!(predicted, expected);
    }

    #[test]
    fn test_one_class_mode() {
        let d = vec![vec![1.0, 0.0], vec![0.9, 0.1], vec![0.95, 0.05]];
        let m = precomputed_matrix(&KernelOptions::Rbf { sigma: 0.5 }, &d, &d).unwrap();
        let model = SvmModel::train(&m, &[7, 7, 7], &SvmParams::default()).unwrap();
        assert_eq!(model.mode, TrainingMode::OneClass);
        assert_eq!(model.machines.len(), 1);
        let sum: f64 = model.machines[0].support.iter().map(|s| s.coef).sum();
        assert!((sum - 1.5).abs() < 1e-9);

        // A far-away point is rejected
        let far = precomputed_matrix(&KernelOptions::Rbf { sigma: 0.5 }, &[vec![-5.0, 5.0]], &d)
            .unwrap();
        assert_eq!(model.predict(&far).unwrap(), vec![None]);
    }

    #[test]
    fn test_train_shape_errors() {
        assert!(SvmModel::train(&[], &[], &SvmParams::default()).is_err());
        let bad = vec![vec![1.0, 1.0]];
        assert!(SvmModel::train(&bad, &[1, 2], &SvmParams::default()).is_err());
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let (d, labels) = points();
        let m = precomputed_matrix(&KernelOptions::Linear, &d, &d).unwrap();
        let model = SvmModel::train(&m, &labels, &SvmParams::default()).unwrap();
        assert!(model.predict(&[vec![1.0, 0.5]]).is_err());
    }
}
