use ndarray::{Array1, Array2, ArrayView2, Axis, Zip};
use rayon::prelude::*;

/// Gower double centering of a distance matrix, in place.
///
/// Turns `D` into `F = (I - 1/n) (-0.5 D∘D) (I - 1/n)`, the matrix whose
/// eigendecomposition yields the principal coordinates. The input buffer is
/// reused so callers that own their distance matrix avoid an extra allocation.
pub fn double_center(d: &mut Array2<f64>) {
    d.mapv_inplace(|v| -0.5 * v * v);

    let row_means = d.mean_axis(Axis(1)).unwrap_or_else(|| Array1::zeros(d.nrows()));
    let col_means = d.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(d.ncols()));
    let grand_mean = row_means.mean().unwrap_or(0.0);

    d.axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(row_means.as_slice().unwrap_or(&[]).par_iter())
        .for_each(|(mut row, &rm)| {
            Zip::from(&mut row)
                .and(&col_means)
                .for_each(|v, &cm| *v = *v - rm - cm + grand_mean);
        });
}

/// Squared Euclidean distances between the rows of `x`.
pub fn squared_euclidean(x: ArrayView2<f64>) -> Array2<f64> {
    let n = x.nrows();
    let mut out = Array2::zeros((n, n));
    out.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(i, mut row)| {
            let xi = x.row(i);
            for j in 0..n {
                if i != j {
                    row[j] = Zip::from(&xi)
                        .and(&x.row(j))
                        .fold(0.0, |acc, &a, &b| acc + (a - b) * (a - b));
                }
            }
        });
    out
}

/// Subtracts the column means.
pub fn center_columns(x: &mut Array2<f64>) {
    if let Some(mean) = x.mean_axis(Axis(0)) {
        x.axis_iter_mut(Axis(0)).for_each(|mut row| row -= &mean);
    }
}

/// Centers the columns and scales them to unit population standard deviation.
/// Columns with zero variance are left at zero.
pub fn standardize_columns(x: &mut Array2<f64>) {
    center_columns(x);
    let std = x.std_axis(Axis(0), 0.0);
    for (mut col, &s) in x.columns_mut().into_iter().zip(std.iter()) {
        if s > f64::EPSILON {
            col /= s;
        } else {
            col.fill(0.0);
        }
    }
}
