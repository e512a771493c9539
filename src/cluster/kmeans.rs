// K-means with k-means++ seeding.
//
// Several independent runs are made and the one with the lowest inertia
// (sum of squared distances to the assigned centroid) wins. Convergence is
// declared when the centroids move less than `tol` scaled by the mean
// per-feature variance of the data.

use anyhow::Result;
use ndarray::{Array2, ArrayView1, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// K-means configuration.
#[derive(Debug, Clone)]
pub struct KMeans {
    pub k: usize,
    /// Independent restarts; the best by inertia is returned
    pub n_init: usize,
    pub max_iter: usize,
    /// Relative tolerance on centroid movement
    pub tol: f64,
    pub seed: u64,
}

/// Result of a k-means fit.
#[derive(Debug, Clone)]
pub struct KMeansFit {
    pub labels: Vec<usize>,
    pub centroids: Array2<f64>,
    pub inertia: f64,
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            n_init: 10,
            max_iter: 300,
            tol: 1e-4,
            seed: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Cluster the rows of `data`.
    pub fn fit(&self, data: &Array2<f64>) -> Result<KMeansFit> {
        let n = data.nrows();
        if self.k == 0 {
            anyhow::bail!("k-means needs at least one cluster");
        }
        if n < self.k {
            anyhow::bail!("Cannot form {} clusters from {} points", self.k, n);
        }

        let tol = self.tol * mean_variance(data);
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut best: Option<KMeansFit> = None;
        for run in 0..self.n_init.max(1) {
            let fit = self.single_run(data, tol, &mut rng);
            debug!(run, inertia = fit.inertia, "k-means run finished");
            let better = match &best {
                Some(b) => fit.inertia < b.inertia,
                None => true,
            };
            if better {
                best = Some(fit);
            }
        }

        best.ok_or_else(|| anyhow::anyhow!("k-means produced no result"))
    }

    fn single_run(&self, data: &Array2<f64>, tol: f64, rng: &mut StdRng) -> KMeansFit {
        let mut centroids = plus_plus_init(data, self.k, rng);
        let mut labels = vec![0usize; data.nrows()];

        for _ in 0..self.max_iter {
            assign(data, &centroids, &mut labels);
            let updated = update_centroids(data, &labels, &centroids);
            let shift: f64 = (&updated - &centroids).iter().map(|x| x * x).sum();
            centroids = updated;
            if shift <= tol {
                break;
            }
        }

        let inertia = assign(data, &centroids, &mut labels);
        KMeansFit {
            labels,
            centroids,
            inertia,
        }
    }
}

/// k-means++: each new centroid is drawn with probability proportional to
/// the squared distance to the nearest centroid chosen so far.
fn plus_plus_init(data: &Array2<f64>, k: usize, rng: &mut StdRng) -> Array2<f64> {
    let n = data.nrows();
    let mut centroids = Array2::<f64>::zeros((k, data.ncols()));
    centroids
        .row_mut(0)
        .assign(&data.row(rng.random_range(0..n)));

    let mut closest: Vec<f64> = (0..n)
        .map(|i| sq_dist(data.row(i), centroids.row(0)))
        .collect();

    for c in 1..k {
        let total: f64 = closest.iter().sum();
        let chosen = if total > 0.0 {
            let mut r = rng.random::<f64>() * total;
            let mut pick = n - 1;
            for (i, &d) in closest.iter().enumerate() {
                if r < d {
                    pick = i;
                    break;
                }
                r -= d;
            }
            pick
        } else {
            rng.random_range(0..n)
        };

        centroids.row_mut(c).assign(&data.row(chosen));
        for (i, d) in closest.iter_mut().enumerate() {
            *d = d.min(sq_dist(data.row(i), centroids.row(c)));
        }
    }

    centroids
}

/// Assign every row to its nearest centroid; returns the inertia.
fn assign(data: &Array2<f64>, centroids: &Array2<f64>, labels: &mut [usize]) -> f64 {
    let mut inertia = 0.0;
    for (i, row) in data.axis_iter(Axis(0)).enumerate() {
        let (best, dist) = centroids
            .axis_iter(Axis(0))
            .map(|c| sq_dist(row, c))
            .enumerate()
            .fold((0, f64::INFINITY), |acc, (j, d)| if d < acc.1 { (j, d) } else { acc });
        labels[i] = best;
        inertia += dist;
    }
    inertia
}

/// Recompute centroids as cluster means. An empty cluster is moved onto the
/// point farthest from its current centroid.
fn update_centroids(data: &Array2<f64>, labels: &[usize], previous: &Array2<f64>) -> Array2<f64> {
    let k = previous.nrows();
    let mut sums = Array2::<f64>::zeros(previous.dim());
    let mut counts = vec![0usize; k];

    for (row, &label) in data.axis_iter(Axis(0)).zip(labels) {
        let mut target = sums.row_mut(label);
        target += &row;
        counts[label] += 1;
    }

    for (c, &count) in counts.iter().enumerate() {
        if count > 0 {
            sums.row_mut(c).mapv_inplace(|x| x / count as f64);
        } else {
            let farthest = (0..data.nrows())
                .max_by(|&a, &b| {
                    let da = sq_dist(data.row(a), previous.row(labels[a]));
                    let db = sq_dist(data.row(b), previous.row(labels[b]));
                    da.total_cmp(&db)
                })
                .unwrap_or(0);
            sums.row_mut(c).assign(&data.row(farthest));
        }
    }

    sums
}

fn sq_dist(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn mean_variance(data: &Array2<f64>) -> f64 {
    let n = data.nrows() as f64;
    if n == 0.0 || data.ncols() == 0 {
        return 0.0;
    }
    let total: f64 = data
        .axis_iter(Axis(1))
        .map(|col| {
            let mean = col.sum() / n;
            col.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n
        })
        .sum();
    total / data.ncols() as f64
}
