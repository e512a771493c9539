// Unit tests for the clustering stack: Jacobi eigen-decomposition, k-means,
// and spectral clustering on well-separated synthetic data.

use ndarray::{array, Array2};

use inkstone::cluster::eigen::symmetric_eigen;
use inkstone::cluster::kmeans::KMeans;
use inkstone::cluster::spectral::{spectral_embedding, SpectralClustering};

/// `per_blob` points around each of `centres`, jittered deterministically.
fn blobs(centres: &[(f64, f64)], per_blob: usize) -> Array2<f64> {
    let mut flat = Vec::new();
    for &(cx, cy) in centres {
        for i in 0..per_blob {
            let dx = (i as f64 * 0.37).sin() * 0.1;
            let dy = (i as f64 * 0.71).cos() * 0.1;
            flat.push(cx + dx);
            flat.push(cy + dy);
        }
    }
    Array2::from_shape_vec((centres.len() * per_blob, 2), flat).unwrap()
}

fn same_partition(labels: &[usize], per_blob: usize) {
    for block in labels.chunks(per_blob) {
        assert!(block.iter().all(|&l| l == block[0]), "split blob: {labels:?}");
    }
    let firsts: Vec<usize> = labels.chunks(per_blob).map(|b| b[0]).collect();
    for (i, a) in firsts.iter().enumerate() {
        for b in &firsts[i + 1..] {
            assert_ne!(a, b, "merged blobs: {labels:?}");
        }
    }
}

// ============================================================
// symmetric_eigen
// ============================================================

#[test]
fn eigen_reconstructs_matrix() {
    let m = array![[4.0, 1.0, 2.0], [1.0, 3.0, 0.5], [2.0, 0.5, 5.0]];
    let eig = symmetric_eigen(&m).unwrap();

    let lambda = Array2::from_diag(&eig.values);
    let rebuilt = eig.vectors.dot(&lambda).dot(&eig.vectors.t());
    for (a, b) in rebuilt.iter().zip(m.iter()) {
        assert!((a - b).abs() < 1e-9);
    }
}

#[test]
fn eigen_vectors_are_orthonormal() {
    let m = array![[2.0, -1.0, 0.0], [-1.0, 2.0, -1.0], [0.0, -1.0, 2.0]];
    let eig = symmetric_eigen(&m).unwrap();
    let gram = eig.vectors.t().dot(&eig.vectors);
    for i in 0..3 {
        for j in 0..3 {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert!((gram[[i, j]] - expected).abs() < 1e-9);
        }
    }
}

#[test]
fn eigen_of_diagonal_is_sorted_diagonal() {
    let m = array![[3.0, 0.0], [0.0, -1.0]];
    let eig = symmetric_eigen(&m).unwrap();
    assert_eq!(eig.values.to_vec(), vec![-1.0, 3.0]);
}

#[test]
fn eigen_rejects_non_square() {
    let m = Array2::<f64>::zeros((2, 3));
    assert!(symmetric_eigen(&m).is_err());
}

// ============================================================
// KMeans
// ============================================================

#[test]
fn kmeans_finds_three_blobs() {
    let data = blobs(&[(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)], 8);
    let fit = KMeans::new(3).fit(&data).unwrap();
    same_partition(&fit.labels, 8);
    assert_eq!(fit.centroids.dim(), (3, 2));
    assert!(fit.inertia < 1.0);
}

#[test]
fn kmeans_is_deterministic_for_a_seed() {
    let data = blobs(&[(0.0, 0.0), (3.0, 3.0)], 10);
    let a = KMeans::new(2).with_seed(5).fit(&data).unwrap();
    let b = KMeans::new(2).with_seed(5).fit(&data).unwrap();
    assert_eq!(a.labels, b.labels);
}

#[test]
fn kmeans_k_equals_n() {
    let data = array![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]];
    let fit = KMeans::new(3).fit(&data).unwrap();
    let mut labels = fit.labels.clone();
    labels.sort();
    assert_eq!(labels, vec![0, 1, 2]);
    assert!(fit.inertia.abs() < 1e-12);
}

#[test]
fn kmeans_rejects_bad_k() {
    let data = array![[0.0], [1.0]];
    assert!(KMeans::new(0).fit(&data).is_err());
    assert!(KMeans::new(3).fit(&data).is_err());
}

// ============================================================
// SpectralClustering
// ============================================================

#[test]
fn spectral_separates_four_blobs() {
    let data = blobs(&[(0.0, 0.0), (6.0, 0.0), (0.0, 6.0), (6.0, 6.0)], 5);
    let labels = SpectralClustering::new(4).fit_predict(&data).unwrap();
    assert_eq!(labels.len(), 20);
    assert!(labels.iter().all(|&l| l < 4));
    same_partition(&labels, 5);
}

#[test]
fn spectral_labels_within_range_for_default_clusters() {
    let centres: Vec<(f64, f64)> = (0..7).map(|i| (i as f64 * 5.0, 0.0)).collect();
    let data = blobs(&centres, 3);
    let labels = SpectralClustering::default().fit_predict(&data).unwrap();
    assert!(labels.iter().all(|&l| l < 7));
    same_partition(&labels, 3);
}

#[test]
fn spectral_rejects_zero_clusters() {
    let data = blobs(&[(0.0, 0.0)], 4);
    assert!(SpectralClustering::new(0).fit_predict(&data).is_err());
}

#[test]
fn spectral_embedding_caps_components_at_n() {
    let affinity = array![[1.0, 0.5], [0.5, 1.0]];
    let embedding = spectral_embedding(&affinity, 5).unwrap();
    assert_eq!(embedding.dim(), (2, 2));
}
