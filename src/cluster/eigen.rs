// Cyclic Jacobi eigen-decomposition for dense symmetric matrices.
//
// Matrices here are at most a few hundred rows (one per vocabulary word that
// passed the minimum count), where Jacobi is accurate and simple enough.

use anyhow::Result;
use ndarray::{Array1, Array2};
use tracing::debug;

const MAX_SWEEPS: usize = 100;
const TOLERANCE: f64 = 1e-12;

/// Eigenvalues in ascending order with matching unit eigenvectors as columns.
#[derive(Debug, Clone)]
pub struct SymmetricEigen {
    pub values: Array1<f64>,
    pub vectors: Array2<f64>,
}

/// Decompose a symmetric matrix. Only the symmetric part is meaningful; the
/// caller is responsible for passing a symmetric matrix.
pub fn symmetric_eigen(matrix: &Array2<f64>) -> Result<SymmetricEigen> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        anyhow::bail!("Eigen-decomposition needs a square matrix, got {:?}", matrix.dim());
    }

    let mut a = matrix.clone();
    let mut v = Array2::<f64>::eye(n);
    let scale = a.iter().map(|x| x * x).sum::<f64>().max(f64::MIN_POSITIVE);

    let mut sweeps = 0;
    while sweeps < MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .map(|(i, j)| a[[i, j]] * a[[i, j]])
            .sum();
        if off <= TOLERANCE * TOLERANCE * scale {
            break;
        }

        for p in 0..n {
            for q in p + 1..n {
                let apq = a[[p, q]];
                if apq == 0.0 {
                    continue;
                }
                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;
                rotate(&mut a, &mut v, p, q, c, s);
            }
        }
        sweeps += 1;
    }
    debug!(n, sweeps, "Jacobi eigen-decomposition finished");

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| a[[i, i]].total_cmp(&a[[j, j]]));

    let values = order.iter().map(|&i| a[[i, i]]).collect();
    let mut vectors = Array2::<f64>::zeros((n, n));
    for (dst, &src) in order.iter().enumerate() {
        vectors.column_mut(dst).assign(&v.column(src));
    }

    Ok(SymmetricEigen { values, vectors })
}

/// Apply the rotation `A ← Jᵀ A J`, `V ← V J` in the (p, q) plane.
fn rotate(a: &mut Array2<f64>, v: &mut Array2<f64>, p: usize, q: usize, c: f64, s: f64) {
    let n = a.nrows();
    for k in 0..n {
        let (akp, akq) = (a[[k, p]], a[[k, q]]);
        a[[k, p]] = c * akp - s * akq;
        a[[k, q]] = s * akp + c * akq;
    }
    for k in 0..n {
        let (apk, aqk) = (a[[p, k]], a[[q, k]]);
        a[[p, k]] = c * apk - s * aqk;
        a[[q, k]] = s * apk + c * aqk;
    }
    for k in 0..n {
        let (vkp, vkq) = (v[[k, p]], v[[k, q]]);
        v[[k, p]] = c * vkp - s * vkq;
        v[[k, q]] = s * vkp + c * vkq;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_two_by_two() {
        let m = array![[2.0, 1.0], [1.0, 2.0]];
        let eig = symmetric_eigen(&m).unwrap();
        assert!((eig.values[0] - 1.0).abs() < 1e-10);
        assert!((eig.values[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_reconstructs_matrix() {
        let m = array![
            [4.0, 1.0, -2.0, 0.5],
            [1.0, 3.0, 0.0, 1.5],
            [-2.0, 0.0, 5.0, -1.0],
            [0.5, 1.5, -1.0, 2.0]
        ];
        let eig = symmetric_eigen(&m).unwrap();
        for k in 0..4 {
            let col = eig.vectors.column(k);
            let av = m.dot(&col);
            for i in 0..4 {
                assert!((av[i] - eig.values[k] * col[i]).abs() < 1e-8);
            }
            assert!((col.dot(&col) - 1.0).abs() < 1e-10);
        }
        for w in eig.values.to_vec().windows(2) {
            assert!(w[0] <= w[1]);
        }
    }

    #[test]
    fn test_diagonal_input() {
        let m = array![[3.0, 0.0], [0.0, -1.0]];
        let eig = symmetric_eigen(&m).unwrap();
        assert_eq!(eig.values.to_vec(), vec![-1.0, 3.0]);
        assert_eq!(eig.vectors[[1, 0]].abs(), 1.0);
    }

    #[test]
    fn test_non_square_rejected() {
        assert!(symmetric_eigen(&Array2::zeros((2, 3))).is_err());
    }
}
