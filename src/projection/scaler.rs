// Per-feature standardization: zero mean and unit variance.

use ndarray::{Array1, Array2, Axis};

/// Column means and standard deviations learned from a matrix.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    pub mean: Array1<f64>,
    /// Population standard deviation; 1.0 for constant columns so they are
    /// only centred
    pub scale: Array1<f64>,
}

impl StandardScaler {
    pub fn fit(data: &Array2<f64>) -> Self {
        let n = data.nrows().max(1) as f64;
        let mean: Array1<f64> = data
            .axis_iter(Axis(1))
            .map(|col| col.sum() / n)
            .collect();
        let scale: Array1<f64> = data
            .axis_iter(Axis(1))
            .zip(mean.iter())
            .map(|(col, &m)| {
                let var = col.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / n;
                let std = var.sqrt();
                if std > f64::EPSILON {
                    std
                } else {
                    1.0
                }
            })
            .collect();
        Self { mean, scale }
    }

    pub fn transform(&self, data: &Array2<f64>) -> Array2<f64> {
        let mut out = data.clone();
        for mut row in out.axis_iter_mut(Axis(0)) {
            row -= &self.mean;
            row /= &self.scale;
        }
        out
    }

    pub fn fit_transform(data: &Array2<f64>) -> Array2<f64> {
        Self::fit(data).transform(data)
    }
}
