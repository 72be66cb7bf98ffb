//! Dense decompositions used by the ordination methods.
//!
//! - [`SymmetricEigen`]: exact eigendecomposition of a symmetric matrix, sorted descending
//! - [`fsvd`]: fast randomized (Krylov) SVD restricted to the leading `k` triplets
//! - [`svd_flip`]: deterministic sign convention for singular/eigen vectors

use crate::utils::{to_nalgebra, to_ndarray};
use anyhow::anyhow;
use nalgebra::DMatrix;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::Rng;
use rand_distr::StandardNormal;

pub struct SymmetricEigen {
    values: Array1<f64>,
    vectors: Array2<f64>,
}

impl SymmetricEigen {
    /// Decomposes `matrix`, consuming it. Eigenpairs are returned in descending
    /// order of eigenvalue; eigenvectors are the columns of [`vectors`](Self::vectors).
    pub fn new(matrix: Array2<f64>) -> anyhow::Result<Self> {
        if !matrix.is_square() {
            return Err(anyhow!(
                "Symmetric eigendecomposition requires a square matrix, got {:?}",
                matrix.dim()
            ));
        }
        let eig = nalgebra::SymmetricEigen::try_new(to_nalgebra(matrix), f64::EPSILON, 0)
            .ok_or_else(|| anyhow!("Symmetric eigendecomposition did not converge"))?;

        let values = Array1::from(eig.eigenvalues.as_slice().to_vec());
        let vectors = to_ndarray(eig.eigenvectors);

        let order = descending_order(&values);
        Ok(Self {
            values: order.iter().map(|&i| values[i]).collect(),
            vectors: vectors.select(Axis(1), &order),
        })
    }

    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    pub fn vectors(&self) -> &Array2<f64> {
        &self.vectors
    }

    pub fn into_parts(self) -> (Array1<f64>, Array2<f64>) {
        (self.values, self.vectors)
    }
}

/// Fast randomized SVD of `a` limited to the leading `k` singular triplets.
///
/// Uses `k + 2` Gaussian test vectors and a single Krylov level: the sketch
/// `[A G, A Aᵀ A G]` is orthonormalised by QR, `Aᵀ Q` is decomposed exactly and
/// the left vectors are lifted back through `Q`. Returns `(U_k, S_k)` with the
/// singular values sorted descending.
pub fn fsvd<R: Rng>(
    a: ArrayView2<f64>,
    k: usize,
    rng: &mut R,
) -> anyhow::Result<(Array2<f64>, Array1<f64>)> {
    let (m, n) = a.dim();
    if k == 0 || k > m.min(n) {
        return Err(anyhow!(
            "Cannot compute {} singular triplets of a {} x {} matrix",
            k,
            m,
            n
        ));
    }
    let l = k + 2;

    let a = to_nalgebra(a.to_owned());
    let g = DMatrix::from_fn(n, l, |_, _| rng.sample::<f64, _>(StandardNormal));

    let h1 = &a * &g;
    let h2 = &a * (a.transpose() * &h1);
    let h = DMatrix::from_fn(m, 2 * l, |i, j| if j < l { h1[(i, j)] } else { h2[(i, j - l)] });

    let q = h.qr().q();
    let t = a.transpose() * &q;

    let svd = t
        .try_svd(false, true, f64::EPSILON, 0)
        .ok_or_else(|| anyhow!("SVD of the projected matrix did not converge"))?;
    let v_t = svd
        .v_t
        .ok_or_else(|| anyhow!("SVD did not return right singular vectors"))?;

    // T = V S Wᵀ, so the left singular vectors of A are Q W
    let u = to_ndarray(&q * v_t.transpose());
    let s = Array1::from(svd.singular_values.as_slice().to_vec());

    let order: Vec<usize> = descending_order(&s).into_iter().take(k).collect();
    Ok((
        u.select(Axis(1), &order),
        order.iter().map(|&i| s[i]).collect(),
    ))
}

/// Flips the sign of each column so that its largest-magnitude entry is positive.
pub fn svd_flip(u: &mut Array2<f64>) {
    for mut col in u.columns_mut() {
        let pivot = col
            .iter()
            .copied()
            .fold(0.0_f64, |best, v| if v.abs() > best.abs() { v } else { best });
        if pivot < 0.0 {
            col.mapv_inplace(|v| -v);
        }
    }
}

fn descending_order(values: &Array1<f64>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&i, &j| values[j].total_cmp(&values[i]));
    order
}
