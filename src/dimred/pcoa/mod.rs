//! # Principal Coordinate Analysis
//!
//! Classical metric ordination of a distance matrix. The distance matrix is
//! Gower-centered and then decomposed either exactly ([`PcoaMethod::Eigh`]) or
//! with a fast randomized SVD restricted to a fixed number of axes
//! ([`PcoaMethod::Fsvd`]).

mod biplot;

pub use biplot::biplot;

use crate::dense::double_center;
use crate::svd::{fsvd, svd_flip, SymmetricEigen};
use crate::utils::seeded_rng;
use anyhow::bail;
use log::{debug, warn};
use ndarray::{s, Array1, Array2, Axis};

/// Eigenvalues closer to zero than this are treated as zero.
const EIGVAL_ZERO_TOLERANCE: f64 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PcoaMethod {
    /// Full symmetric eigendecomposition; every non-null axis is returned.
    Eigh,
    /// Randomized SVD computing only the leading `number_of_dimensions` axes.
    Fsvd {
        number_of_dimensions: usize,
        random_seed: u64,
    },
}

impl Default for PcoaMethod {
    fn default() -> Self {
        Self::Eigh
    }
}

impl PcoaMethod {
    pub fn fsvd(number_of_dimensions: usize) -> Self {
        Self::Fsvd {
            number_of_dimensions,
            random_seed: 42,
        }
    }
}

/// Output of [`run`], before any labelling.
#[derive(Debug, Clone)]
pub struct Pcoa {
    pub eigvals: Array1<f64>,
    pub proportion_explained: Array1<f64>,
    /// Samples × axes, rows in input order.
    pub coordinates: Array2<f64>,
}

/// Runs PCoA on a distance matrix, reusing its buffer for the centered matrix.
pub fn run(mut distances: Array2<f64>, method: PcoaMethod) -> anyhow::Result<Pcoa> {
    let n = distances.nrows();
    if n == 0 || !distances.is_square() {
        bail!(
            "PCoA requires a non-empty square distance matrix, got {:?}",
            distances.dim()
        );
    }

    double_center(&mut distances);
    let centered = distances;

    match method {
        PcoaMethod::Eigh => {
            debug!("PCoA: full eigendecomposition of {} x {} matrix", n, n);
            let (mut eigvals, mut eigvecs) = SymmetricEigen::new(centered)?.into_parts();

            eigvals.mapv_inplace(|v| if v.abs() < EIGVAL_ZERO_TOLERANCE { 0.0 } else { v });
            warn_negative(&eigvals);
            zero_negative_axes(&mut eigvals, &mut eigvecs);

            // centering leaves a null direction, so at most n - 1 axes carry information
            let n_axes = n.saturating_sub(1).max(1);
            let total: f64 = eigvals.sum();
            let eigvals = eigvals.slice(s![..n_axes]).to_owned();
            let mut eigvecs = eigvecs.slice(s![.., ..n_axes]).to_owned();

            svd_flip(&mut eigvecs);
            Ok(Pcoa {
                proportion_explained: proportion(&eigvals, total),
                coordinates: scale_by_sqrt(eigvecs, &eigvals),
                eigvals,
            })
        }
        PcoaMethod::Fsvd {
            number_of_dimensions,
            random_seed,
        } => {
            if number_of_dimensions == 0 || number_of_dimensions > n {
                bail!(
                    "Invalid operation: cannot reduce a distance matrix of {} samples to {} dimensions",
                    n,
                    number_of_dimensions
                );
            }
            debug!(
                "PCoA: randomized SVD of {} x {} matrix to {} axes",
                n, n, number_of_dimensions
            );

            // eigenvalues beyond the computed axes are unknown, the trace gives their total
            let total = centered.diag().sum();
            let mut rng = seeded_rng(random_seed);
            let (mut eigvecs, mut eigvals) =
                fsvd(centered.view(), number_of_dimensions, &mut rng)?;

            eigvals.mapv_inplace(|v| if v.abs() < EIGVAL_ZERO_TOLERANCE { 0.0 } else { v });
            warn_negative(&eigvals);
            zero_negative_axes(&mut eigvals, &mut eigvecs);

            svd_flip(&mut eigvecs);
            Ok(Pcoa {
                proportion_explained: proportion(&eigvals, total),
                coordinates: scale_by_sqrt(eigvecs, &eigvals),
                eigvals,
            })
        }
    }
}

fn warn_negative(eigvals: &Array1<f64>) {
    let min = eigvals.iter().copied().fold(f64::INFINITY, f64::min);
    if min < 0.0 {
        let max = eigvals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        warn!(
            "The result contains negative eigenvalues. The largest negative eigenvalue is {} \
             and the largest positive eigenvalue is {}; negative axes are set to zero",
            min, max
        );
    }
}

fn zero_negative_axes(eigvals: &mut Array1<f64>, eigvecs: &mut Array2<f64>) {
    for (j, v) in eigvals.iter_mut().enumerate() {
        if *v < 0.0 {
            *v = 0.0;
            eigvecs.column_mut(j).fill(0.0);
        }
    }
}

fn proportion(eigvals: &Array1<f64>, total: f64) -> Array1<f64> {
    if total > 0.0 {
        eigvals / total
    } else {
        Array1::zeros(eigvals.len())
    }
}

fn scale_by_sqrt(mut eigvecs: Array2<f64>, eigvals: &Array1<f64>) -> Array2<f64> {
    for (mut col, &v) in eigvecs.axis_iter_mut(Axis(1)).zip(eigvals.iter()) {
        col *= v.max(0.0).sqrt();
    }
    eigvecs
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::dense::squared_euclidean;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    pub(crate) fn euclidean_distances(points: &Array2<f64>) -> Array2<f64> {
        squared_euclidean(points.view()).mapv(f64::sqrt)
    }

    pub(crate) fn points() -> Array2<f64> {
        array![
            [0.0, 0.0, 0.0],
            [1.0, 0.2, 0.0],
            [0.3, 2.0, 0.1],
            [0.1, 0.4, 3.0],
            [2.5, 1.5, 0.7],
            [1.2, 3.1, 2.2]
        ]
    }

    #[test]
    fn test_eigh_rank_limited_axes() {
        let d = euclidean_distances(&points().slice(s![..4, ..]).to_owned());
        let res = run(d, PcoaMethod::Eigh).unwrap();
        assert_eq!(res.eigvals.len(), 3);
        assert_eq!(res.coordinates.dim(), (4, 3));
        assert_eq!(res.proportion_explained.len(), 3);
        assert_abs_diff_eq!(res.proportion_explained.sum(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_eigh_eigenvalues_sum_to_total_variance() {
        let p = points();
        let mean = p.mean_axis(Axis(0)).unwrap();
        let total_variance: f64 = p
            .rows()
            .into_iter()
            .map(|r| (&r - &mean).mapv(|v| v * v).sum())
            .sum();

        let res = run(euclidean_distances(&p), PcoaMethod::Eigh).unwrap();
        assert_abs_diff_eq!(res.eigvals.sum(), total_variance, epsilon = 1e-8);
        // points live in 3 dimensions
        assert!(res.eigvals[2] > 0.0);
        assert_abs_diff_eq!(res.eigvals[3], 0.0, epsilon = 1e-8);
        assert_abs_diff_eq!(res.eigvals[4], 0.0, epsilon = 1e-8);
    }

    #[test]
    fn test_eigh_coordinates_reproduce_distances() {
        let p = points();
        let d = euclidean_distances(&p);
        let res = run(d.clone(), PcoaMethod::Eigh).unwrap();
        let recovered = euclidean_distances(&res.coordinates);
        for i in 0..p.nrows() {
            for j in 0..p.nrows() {
                assert_abs_diff_eq!(recovered[[i, j]], d[[i, j]], epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn test_fsvd_agrees_with_eigh() {
        let d = euclidean_distances(&points());
        let exact = run(d.clone(), PcoaMethod::Eigh).unwrap();
        let approx = run(d, PcoaMethod::fsvd(2)).unwrap();

        assert_eq!(approx.coordinates.dim(), (6, 2));
        for j in 0..2 {
            assert_abs_diff_eq!(approx.eigvals[j], exact.eigvals[j], epsilon = 1e-6);
            for i in 0..6 {
                assert_abs_diff_eq!(
                    approx.coordinates[[i, j]],
                    exact.coordinates[[i, j]],
                    epsilon = 1e-6
                );
            }
        }
        // proportions are relative to the full trace, not the two computed axes
        assert!(approx.proportion_explained.sum() < 1.0);
        assert_abs_diff_eq!(
            approx.proportion_explained[0],
            exact.proportion_explained[0],
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_fsvd_rejects_invalid_dimensions() {
        let d = euclidean_distances(&points());
        assert!(run(d.clone(), PcoaMethod::fsvd(0)).is_err());
        assert!(run(d, PcoaMethod::fsvd(7)).is_err());
    }

    #[test]
    fn test_non_euclidean_input_zeroes_negative_axes() {
        // violates the triangle inequality, so the centered matrix is indefinite
        let d = array![
            [0.0, 1.0, 1.0, 5.0],
            [1.0, 0.0, 1.0, 1.0],
            [1.0, 1.0, 0.0, 1.0],
            [5.0, 1.0, 1.0, 0.0]
        ];
        let res = run(d, PcoaMethod::Eigh).unwrap();
        assert!(res.eigvals.iter().all(|&v| v >= 0.0));
        assert!(res.coordinates.iter().all(|v| v.is_finite()));
    }
}
