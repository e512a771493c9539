// Exact t-SNE.
//
// Pairwise affinities in the input space are Gaussian, with a per-point
// bandwidth chosen by binary search so that each conditional distribution
// has the requested perplexity. Affinities in the embedding use a Student-t
// kernel with one degree of freedom. The KL divergence between the two is
// minimised by gradient descent with momentum and per-parameter gains, with
// the input affinities exaggerated for the first iterations.
//
// The embedding starts from the PCA projection scaled to a tiny spread, so
// the result depends on the input only.

use anyhow::Result;
use ndarray::{Array2, Axis};
use tracing::{debug, info, warn};

use crate::cluster::eigen::symmetric_eigen;

const PERPLEXITY_TOLERANCE: f64 = 1e-5;
const PERPLEXITY_STEPS: usize = 100;
const MACHINE_EPSILON: f64 = 1e-12;
const MIN_GRAD_NORM: f64 = 1e-7;
/// Standard deviation of the first initial coordinate.
const INIT_SPREAD: f64 = 1e-4;

/// t-SNE configuration.
#[derive(Debug, Clone)]
pub struct Tsne {
    pub n_components: usize,
    pub perplexity: f64,
    pub early_exaggeration: f64,
    /// `None` picks `max(n / early_exaggeration / 4, 50)`
    pub learning_rate: Option<f64>,
    pub max_iter: usize,
    /// Iterations run with exaggerated affinities and low momentum
    pub exaggeration_iter: usize,
    pub min_gain: f64,
}

impl Default for Tsne {
    fn default() -> Self {
        Self {
            n_components: 2,
            perplexity: 30.0,
            early_exaggeration: 12.0,
            learning_rate: None,
            max_iter: 1000,
            exaggeration_iter: 250,
            min_gain: 0.01,
        }
    }
}

impl Tsne {
    /// Project the rows of `data` to `n_components` dimensions.
    pub fn fit_transform(&self, data: &Array2<f64>) -> Result<Array2<f64>> {
        let n = data.nrows();
        if n < 2 {
            anyhow::bail!("t-SNE needs at least 2 points, got {n}");
        }
        if self.n_components == 0 {
            anyhow::bail!("t-SNE needs at least one output dimension");
        }

        let perplexity = self.effective_perplexity(n);
        let distances = squared_distances(data);
        let p = joint_probabilities(&distances, perplexity);
        let init = pca_init(data, self.n_components)?;

        let learning_rate = self
            .learning_rate
            .unwrap_or_else(|| (n as f64 / self.early_exaggeration / 4.0).max(50.0));

        info!(
            points = n,
            perplexity,
            learning_rate,
            iterations = self.max_iter,
            "Running t-SNE"
        );

        Ok(self.optimize(&p, init, learning_rate))
    }

    /// Perplexity must stay well below the number of neighbours available.
    fn effective_perplexity(&self, n: usize) -> f64 {
        let max = ((n - 1) as f64 / 3.0).max(1.0);
        if self.perplexity > max {
            warn!(
                requested = self.perplexity,
                used = max,
                points = n,
                "Perplexity too large for the number of points, clamping"
            );
            max
        } else {
            self.perplexity.max(1.0)
        }
    }

    fn optimize(&self, p: &Array2<f64>, mut y: Array2<f64>, learning_rate: f64) -> Array2<f64> {
        let n = y.nrows();
        let dims = y.ncols();
        let mut update = Array2::<f64>::zeros(y.dim());
        let mut gains = Array2::<f64>::ones(y.dim());
        let mut grad = Array2::<f64>::zeros(y.dim());
        let mut num = Array2::<f64>::zeros((n, n));

        for it in 0..self.max_iter {
            let exaggerating = it < self.exaggeration_iter;
            let exaggeration = if exaggerating {
                self.early_exaggeration
            } else {
                1.0
            };
            let momentum = if exaggerating { 0.5 } else { 0.8 };

            // Student-t kernel in the embedding
            let mut sum_q = 0.0;
            for i in 0..n {
                for j in i + 1..n {
                    let d2: f64 = (0..dims).map(|k| (y[[i, k]] - y[[j, k]]).powi(2)).sum();
                    let w = 1.0 / (1.0 + d2);
                    num[[i, j]] = w;
                    num[[j, i]] = w;
                    sum_q += 2.0 * w;
                }
            }
            let sum_q = sum_q.max(MACHINE_EPSILON);

            grad.fill(0.0);
            for i in 0..n {
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let q = (num[[i, j]] / sum_q).max(MACHINE_EPSILON);
                    let coeff = 4.0 * (exaggeration * p[[i, j]] - q) * num[[i, j]];
                    for k in 0..dims {
                        grad[[i, k]] += coeff * (y[[i, k]] - y[[j, k]]);
                    }
                }
            }

            let grad_norm = grad.iter().map(|g| g * g).sum::<f64>().sqrt();

            for ((g, u), gain) in grad.iter().zip(update.iter_mut()).zip(gains.iter_mut()) {
                *gain = if *u * *g < 0.0 {
                    *gain + 0.2
                } else {
                    *gain * 0.8
                };
                *gain = gain.max(self.min_gain);
                *u = momentum * *u - learning_rate * *gain * *g;
            }
            y += &update;

            if (it + 1) % 50 == 0 {
                debug!(
                    iteration = it + 1,
                    kl = kl_divergence(p, &num, sum_q, exaggeration),
                    grad_norm,
                    "t-SNE progress"
                );
            }

            if grad_norm < MIN_GRAD_NORM {
                debug!(iteration = it + 1, grad_norm, "t-SNE converged");
                break;
            }
        }

        y
    }
}

/// Squared Euclidean distances between all pairs of rows.
pub fn squared_distances(data: &Array2<f64>) -> Array2<f64> {
    let n = data.nrows();
    let mut d = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in i + 1..n {
            let v: f64 = data
                .row(i)
                .iter()
                .zip(data.row(j).iter())
                .map(|(a, b)| (a - b) * (a - b))
                .sum();
            d[[i, j]] = v;
            d[[j, i]] = v;
        }
    }
    d
}

/// Symmetric joint probabilities P from squared distances.
///
/// Each row's Gaussian bandwidth is found by binary search on the precision
/// so that the row's entropy equals `ln(perplexity)`. The conditionals are
/// then symmetrised and normalised to sum to one.
pub fn joint_probabilities(distances: &Array2<f64>, perplexity: f64) -> Array2<f64> {
    let n = distances.nrows();
    let target = perplexity.ln();
    let mut conditional = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        // Shift by the nearest neighbour distance so exp() cannot underflow
        // for every neighbour at once; the shift cancels in the normalisation.
        let d_min = (0..n)
            .filter(|&j| j != i)
            .map(|j| distances[[i, j]])
            .fold(f64::INFINITY, f64::min);

        let mut beta = 1.0;
        let mut beta_min = f64::NEG_INFINITY;
        let mut beta_max = f64::INFINITY;
        let mut row = vec![0.0; n];

        for _ in 0..PERPLEXITY_STEPS {
            let mut sum_p = 0.0;
            let mut sum_dp = 0.0;
            for j in 0..n {
                if j == i {
                    row[j] = 0.0;
                    continue;
                }
                let shifted = distances[[i, j]] - d_min;
                row[j] = (-shifted * beta).exp();
                sum_p += row[j];
                sum_dp += shifted * row[j];
            }
            let sum_p = sum_p.max(MACHINE_EPSILON);
            for v in row.iter_mut() {
                *v /= sum_p;
            }

            let entropy = sum_p.ln() + beta * sum_dp / sum_p;
            let diff = entropy - target;
            if diff.abs() <= PERPLEXITY_TOLERANCE {
                break;
            }

            if diff > 0.0 {
                beta_min = beta;
                beta = if beta_max.is_infinite() {
                    beta * 2.0
                } else {
                    (beta + beta_max) / 2.0
                };
            } else {
                beta_max = beta;
                beta = if beta_min.is_infinite() {
                    beta / 2.0
                } else {
                    (beta + beta_min) / 2.0
                };
            }
        }

        for (j, &v) in row.iter().enumerate() {
            conditional[[i, j]] = v;
        }
    }

    let mut joint = &conditional + &conditional.t();
    let total = joint.sum().max(MACHINE_EPSILON);
    joint.mapv_inplace(|v| (v / total).max(MACHINE_EPSILON));
    for i in 0..n {
        joint[[i, i]] = 0.0;
    }
    joint
}

/// Project onto the top principal components and shrink so the first
/// coordinate has standard deviation `INIT_SPREAD`.
fn pca_init(data: &Array2<f64>, n_components: usize) -> Result<Array2<f64>> {
    let n = data.nrows();
    let mean = data.mean_axis(Axis(0)).unwrap_or_else(|| ndarray::Array1::zeros(data.ncols()));
    let centred = data - &mean;
    let covariance = centred.t().dot(&centred) / (n.max(2) - 1) as f64;

    let eig = symmetric_eigen(&covariance)?;
    let features = covariance.nrows();
    let mut components = Array2::<f64>::zeros((features, n_components));
    for c in 0..n_components.min(features) {
        // Eigenvalues are ascending; principal components come from the end
        let column = eig.vectors.column(features - 1 - c);
        let pivot = column
            .iter()
            .copied()
            .max_by(|a, b| a.abs().total_cmp(&b.abs()))
            .unwrap_or(0.0);
        let sign = if pivot < 0.0 { -1.0 } else { 1.0 };
        components.column_mut(c).assign(&column.mapv(|v| v * sign));
    }

    let projected = centred.dot(&components);
    let first = projected.column(0);
    let first_mean = first.sum() / n as f64;
    let std = (first.iter().map(|v| (v - first_mean).powi(2)).sum::<f64>() / n as f64).sqrt();

    if std > 0.0 {
        Ok(projected * (INIT_SPREAD / std))
    } else {
        Ok(projected)
    }
}

fn kl_divergence(p: &Array2<f64>, num: &Array2<f64>, sum_q: f64, exaggeration: f64) -> f64 {
    let n = p.nrows();
    let mut kl = 0.0;
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let pij = exaggeration * p[[i, j]];
            let qij = (num[[i, j]] / sum_q).max(MACHINE_EPSILON);
            if pij > 0.0 {
                kl += pij * (pij / qij).ln();
            }
        }
    }
    kl
}
