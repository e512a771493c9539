// Unit tests for standardization and t-SNE.
//
// t-SNE is checked for shape, determinism, and that well-separated groups in
// the input stay separated in the output.

use ndarray::{array, Array2, Axis};

use inkstone::projection::scaler::StandardScaler;
use inkstone::projection::tsne::{joint_probabilities, squared_distances, Tsne};

fn groups() -> Array2<f64> {
    let mut flat = Vec::new();
    for g in 0..3 {
        for i in 0..6 {
            let base = g as f64 * 20.0;
            flat.extend_from_slice(&[
                base + (i as f64 * 0.3).sin(),
                base + (i as f64 * 0.5).cos(),
                (i as f64 * 0.7).sin(),
            ]);
        }
    }
    Array2::from_shape_vec((18, 3), flat).unwrap()
}

fn quick_tsne() -> Tsne {
    Tsne {
        perplexity: 5.0,
        max_iter: 500,
        ..Tsne::default()
    }
}

// ============================================================
// StandardScaler
// ============================================================

#[test]
fn scaler_columns_have_zero_mean_unit_variance() {
    let data = array![[1.0, 100.0], [2.0, 300.0], [3.0, 200.0], [6.0, 400.0]];
    let out = StandardScaler::fit_transform(&data);
    for col in out.axis_iter(Axis(1)) {
        let mean = col.sum() / 4.0;
        let var = col.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / 4.0;
        assert!(mean.abs() < 1e-12);
        assert!((var - 1.0).abs() < 1e-12);
    }
}

#[test]
fn scaler_transform_reuses_fitted_statistics() {
    let train = array![[0.0], [2.0]];
    let scaler = StandardScaler::fit(&train);
    let out = scaler.transform(&array![[4.0]]);
    assert!((out[[0, 0]] - 3.0).abs() < 1e-12);
}

// ============================================================
// Affinities
// ============================================================

#[test]
fn squared_distances_symmetric_zero_diagonal() {
    let d = squared_distances(&array![[0.0, 0.0], [3.0, 4.0]]);
    assert_eq!(d, array![[0.0, 25.0], [25.0, 0.0]]);
}

#[test]
fn joint_probabilities_uniform_for_equidistant_points() {
    // Unit basis vectors: every pair is exactly sqrt(2) apart
    let data = array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
    let p = joint_probabilities(&squared_distances(&data), 1.5);
    let off = p[[0, 1]];
    assert!((off - 1.0 / 6.0).abs() < 1e-6);
    assert!((p[[1, 2]] - off).abs() < 1e-6);
}

// ============================================================
// Tsne
// ============================================================

#[test]
fn tsne_output_shape_and_finite() {
    let y = quick_tsne().fit_transform(&groups()).unwrap();
    assert_eq!(y.dim(), (18, 2));
    assert!(y.iter().all(|v| v.is_finite()));
}

#[test]
fn tsne_is_deterministic() {
    let a = quick_tsne().fit_transform(&groups()).unwrap();
    let b = quick_tsne().fit_transform(&groups()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn tsne_keeps_groups_apart() {
    let y = quick_tsne().fit_transform(&groups()).unwrap();

    let centroid = |g: usize| -> (f64, f64) {
        let rows = y.slice(ndarray::s![g * 6..(g + 1) * 6, ..]);
        (rows.column(0).sum() / 6.0, rows.column(1).sum() / 6.0)
    };
    let spread = |g: usize| -> f64 {
        let (cx, cy) = centroid(g);
        (g * 6..(g + 1) * 6)
            .map(|i| ((y[[i, 0]] - cx).powi(2) + (y[[i, 1]] - cy).powi(2)).sqrt())
            .fold(0.0, f64::max)
    };

    for a in 0..3 {
        for b in a + 1..3 {
            let (ax, ay) = centroid(a);
            let (bx, by) = centroid(b);
            let gap = ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt();
            assert!(gap > spread(a) && gap > spread(b), "groups {a} and {b} overlap");
        }
    }
}

#[test]
fn tsne_clamps_large_perplexity() {
    let data = array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
    let y = Tsne::default().fit_transform(&data).unwrap();
    assert_eq!(y.dim(), (4, 2));
}

#[test]
fn tsne_needs_two_points() {
    assert!(Tsne::default().fit_transform(&array![[1.0, 2.0]]).is_err());
}

#[test]
fn tsne_fixed_learning_rate() {
    let tsne = Tsne {
        learning_rate: Some(100.0),
        max_iter: 300,
        ..quick_tsne()
    };
    let y = tsne.fit_transform(&groups()).unwrap();
    assert!(y.iter().all(|v| v.is_finite()));
}
