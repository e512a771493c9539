// Spectral clustering.
//
// 1. Affinity: A_ij = exp(-gamma * |x_i - x_j|^2), self-loops ignored.
// 2. Symmetric normalized Laplacian L = I - D^-1/2 A D^-1/2. Nodes with no
//    edges get degree 1 and a zero diagonal.
// 3. Embedding: the `n_clusters` eigenvectors of L with the smallest
//    eigenvalues, each row divided by sqrt(degree), each column sign-flipped
//    so its largest-magnitude entry is positive.
// 4. K-means on the embedded rows.

use anyhow::Result;
use ndarray::Array2;
use tracing::info;

use super::eigen::symmetric_eigen;
use super::kmeans::KMeans;

/// Spectral clustering configuration.
#[derive(Debug, Clone)]
pub struct SpectralClustering {
    pub n_clusters: usize,
    /// RBF kernel coefficient
    pub gamma: f64,
    pub seed: u64,
}

impl Default for SpectralClustering {
    fn default() -> Self {
        Self {
            n_clusters: 7,
            gamma: 1.0,
            seed: 0,
        }
    }
}

impl SpectralClustering {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            ..Self::default()
        }
    }

    /// Assign a cluster label in `0..n_clusters` to every row of `data`.
    pub fn fit_predict(&self, data: &Array2<f64>) -> Result<Vec<usize>> {
        let n = data.nrows();
        if self.n_clusters == 0 {
            anyhow::bail!("Spectral clustering needs at least one cluster");
        }
        if n < self.n_clusters {
            anyhow::bail!(
                "Cannot form {} clusters from {} word vectors. Lower --clusters or use a longer text.",
                self.n_clusters,
                n
            );
        }

        let affinity = self.affinity(data);
        let embedding = spectral_embedding(&affinity, self.n_clusters)?;
        let fit = KMeans::new(self.n_clusters)
            .with_seed(self.seed)
            .fit(&embedding)?;

        info!(
            points = n,
            clusters = self.n_clusters,
            inertia = fit.inertia,
            "Spectral clustering finished"
        );

        Ok(fit.labels)
    }

    /// RBF affinity matrix with a unit diagonal.
    pub fn affinity(&self, data: &Array2<f64>) -> Array2<f64> {
        let n = data.nrows();
        let mut affinity = Array2::<f64>::eye(n);
        for i in 0..n {
            for j in i + 1..n {
                let d2: f64 = data
                    .row(i)
                    .iter()
                    .zip(data.row(j).iter())
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum();
                let w = (-self.gamma * d2).exp();
                affinity[[i, j]] = w;
                affinity[[j, i]] = w;
            }
        }
        affinity
    }
}

/// Embed graph nodes with the leading eigenvectors of the normalized Laplacian.
pub fn spectral_embedding(affinity: &Array2<f64>, n_components: usize) -> Result<Array2<f64>> {
    let n = affinity.nrows();

    let mut isolated = vec![false; n];
    let degree_sqrt: Vec<f64> = (0..n)
        .map(|i| {
            let d: f64 = (0..n).filter(|&j| j != i).map(|j| affinity[[i, j]]).sum();
            if d > 0.0 {
                d.sqrt()
            } else {
                isolated[i] = true;
                1.0
            }
        })
        .collect();

    let mut laplacian = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            laplacian[[i, j]] = if i == j {
                if isolated[i] {
                    0.0
                } else {
                    1.0
                }
            } else {
                -affinity[[i, j]] / (degree_sqrt[i] * degree_sqrt[j])
            };
        }
    }

    let eig = symmetric_eigen(&laplacian)?;
    let k = n_components.min(n);
    let mut embedding = Array2::<f64>::zeros((n, k));
    for c in 0..k {
        let column = eig.vectors.column(c);
        let pivot = column
            .iter()
            .copied()
            .max_by(|a, b| a.abs().total_cmp(&b.abs()))
            .unwrap_or(0.0);
        let sign = if pivot < 0.0 { -1.0 } else { 1.0 };
        for i in 0..n {
            embedding[[i, c]] = sign * column[i] / degree_sqrt[i];
        }
    }

    Ok(embedding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn blobs() -> Array2<f64> {
        array![
            [0.0, 0.0],
            [0.1, 0.0],
            [0.0, 0.1],
            [5.0, 5.0],
            [5.1, 5.0],
            [5.0, 5.1]
        ]
    }

    #[test]
    fn test_separates_blobs() {
        let labels = SpectralClustering::new(2).fit_predict(&blobs()).unwrap();
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_eq!(labels[4], labels[5]);
        assert_ne!(labels[0], labels[3]);
    }

    #[test]
    fn test_affinity_is_symmetric_with_unit_diagonal() {
        let a = SpectralClustering::default().affinity(&blobs());
        for i in 0..6 {
            assert_eq!(a[[i, i]], 1.0);
            for j in 0..6 {
                assert_eq!(a[[i, j]], a[[j, i]]);
                assert!(a[[i, j]] > 0.0 || i / 3 != j / 3);
            }
        }
    }

    #[test]
    fn test_too_few_points() {
        let data = array![[0.0], [1.0]];
        assert!(SpectralClustering::default().fit_predict(&data).is_err());
    }

    #[test]
    fn test_isolated_points_still_embed() {
        let data = array![[0.0], [100.0], [200.0]];
        let embedding = spectral_embedding(&SpectralClustering::default().affinity(&data), 2).unwrap();
        assert_eq!(embedding.dim(), (3, 2));
        assert!(embedding.iter().all(|x| x.is_finite()));
    }
}
