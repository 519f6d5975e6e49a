//! Sequential minimal optimization
//!
//! Solves the dual problem shared by C-support and one-class machines:
//!
//! ```text
//! min  0.5 a'Qa + p'a
//! s.t. y'a = const,  0 <= a_i <= c_i
//! ```
//!
//! Each iteration picks the maximal violating pair (first-order working
//! set selection), solves the two-variable subproblem analytically with the
//! box constraints, and updates the gradient. The loop stops once the
//! violation gap falls below the tolerance.

/// Lower bound for a degenerate curvature term
const TAU: f64 = 1e-12;

/// Stopping parameters
#[derive(Debug, Clone, Copy)]
pub(crate) struct SolverParams {
    pub tolerance: f64,
    pub max_iterations: usize,
}

/// Solver output
#[derive(Debug, Clone)]
pub(crate) struct Solution {
    pub alpha: Vec<f64>,
    pub rho: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// A dual problem over `n` variables
///
/// `q` is the full `n x n` matrix with the label signs already folded in.
pub(crate) struct DualProblem<'a> {
    pub q: &'a [Vec<f64>],
    pub p: &'a [f64],
    pub y: &'a [f64],
    pub c: &'a [f64],
}

impl DualProblem<'_> {
    fn is_upper(&self, alpha: &[f64], t: usize) -> bool {
        alpha[t] >= self.c[t]
    }

    fn is_lower(&self, alpha: &[f64], t: usize) -> bool {
        alpha[t] <= 0.0
    }

    /// Variable may move in the direction that decreases the objective
    fn in_up_set(&self, alpha: &[f64], t: usize) -> bool {
        if self.y[t] > 0.0 {
            !self.is_upper(alpha, t)
        } else {
            !self.is_lower(alpha, t)
        }
    }

    fn in_low_set(&self, alpha: &[f64], t: usize) -> bool {
        if self.y[t] > 0.0 {
            !self.is_lower(alpha, t)
        } else {
            !self.is_upper(alpha, t)
        }
    }

    /// Run SMO from a feasible starting point
    pub fn solve(&self, alpha0: Vec<f64>, params: SolverParams) -> Solution {
        let n = self.p.len();
        let mut alpha = alpha0;
        let mut grad: Vec<f64> = (0..n)
            .map(|i| self.p[i] + (0..n).map(|j| self.q[i][j] * alpha[j]).sum::<f64>())
            .collect();

        let mut iterations = 0;
        let mut converged = false;

        while iterations < params.max_iterations {
            let mut gmax = f64::NEG_INFINITY;
            let mut gmin = f64::INFINITY;
            let mut pick_i = None;
            let mut pick_j = None;
            for t in 0..n {
                let v = -self.y[t] * grad[t];
                if self.in_up_set(&alpha, t) && v > gmax {
                    gmax = v;
                    pick_i = Some(t);
                }
                if self.in_low_set(&alpha, t) && v < gmin {
                    gmin = v;
                    pick_j = Some(t);
                }
            }

            let (Some(i), Some(j)) = (pick_i, pick_j) else {
                converged = true;
                break;
            };
            if gmax - gmin < params.tolerance {
                converged = true;
                break;
            }
            iterations += 1;

            let (old_i, old_j) = (alpha[i], alpha[j]);
            self.update_pair(&mut alpha, &grad, i, j);

            let delta_i = alpha[i] - old_i;
            let delta_j = alpha[j] - old_j;
            for (k, g) in grad.iter_mut().enumerate() {
                *g += self.q[k][i] * delta_i + self.q[k][j] * delta_j;
            }
        }

        let rho = self.rho(&alpha, &grad);
        Solution {
            alpha,
            rho,
            iterations,
            converged,
        }
    }

    /// Analytic two-variable step, clipped to the box
    fn update_pair(&self, alpha: &mut [f64], grad: &[f64], i: usize, j: usize) {
        let (ci, cj) = (self.c[i], self.c[j]);
        let qii = self.q[i][i];
        let qjj = self.q[j][j];
        let qij = self.q[i][j];

        if self.y[i] != self.y[j] {
            let mut quad = qii + qjj + 2.0 * qij;
            if quad <= 0.0 {
                quad = TAU;
            }
            let delta = (-grad[i] - grad[j]) / quad;
            let diff = alpha[i] - alpha[j];
            alpha[i] += delta;
            alpha[j] += delta;

            if diff > 0.0 {
                if alpha[j] < 0.0 {
                    alpha[j] = 0.0;
                    alpha[i] = diff;
                }
            } else if alpha[i] < 0.0 {
                alpha[i] = 0.0;
                alpha[j] = -diff;
            }
            if diff > ci - cj {
                if alpha[i] > ci {
                    alpha[i] = ci;
                    alpha[j] = ci - diff;
                }
            } else if alpha[j] > cj {
                alpha[j] = cj;
                alpha[i] = cj + diff;
            }
        } else {
            let mut quad = qii + qjj - 2.0 * qij;
            if quad <= 0.0 {
                quad = TAU;
            }
            let delta = (grad[i] - grad[j]) / quad;
            let sum = alpha[i] + alpha[j];
            alpha[i] -= delta;
            alpha[j] += delta;

            if sum > ci {
                if alpha[i] > ci {
                    alpha[i] = ci;
                    alpha[j] = sum - ci;
                }
            } else if alpha[j] < 0.0 {
                alpha[j] = 0.0;
                alpha[i] = sum;
            }
            if sum > cj {
                if alpha[j] > cj {
                    alpha[j] = cj;
                    alpha[i] = sum - cj;
                }
            } else if alpha[i] < 0.0 {
                alpha[i] = 0.0;
                alpha[j] = sum;
            }
        }
    }

    /// Offset from free variables, or the midpoint of the feasible interval
    fn rho(&self, alpha: &[f64], grad: &[f64]) -> f64 {
        let mut ub = f64::INFINITY;
        let mut lb = f64::NEG_INFINITY;
        let mut sum_free = 0.0;
        let mut nr_free = 0usize;

        for t in 0..alpha.len() {
            let yg = self.y[t] * grad[t];
            if self.is_upper(alpha, t) {
                if self.y[t] < 0.0 {
                    ub = ub.min(yg);
                } else {
                    lb = lb.max(yg);
                }
            } else if self.is_lower(alpha, t) {
                if self.y[t] > 0.0 {
                    ub = ub.min(yg);
                } else {
                    lb = lb.max(yg);
                }
            } else {
                nr_free += 1;
                sum_free += yg;
            }
        }

        if nr_free > 0 {
            sum_free / nr_free as f64
        } else if ub.is_finite() && lb.is_finite() {
            (ub + lb) / 2.0
        } else if ub.is_finite() {
            ub
        } else if lb.is_finite() {
            lb
        } else {
            0.0
        }
    }
}
