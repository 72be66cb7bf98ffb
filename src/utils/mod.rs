use nalgebra::DMatrix;
use ndarray::Array2;
use nshare::{IntoNalgebra, IntoNdarray2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Builds `"{prefix}1" ..= "{prefix}{n}"`, the axis naming shared by every ordination method.
pub fn axis_labels(prefix: &str, n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("{}{}", prefix, i)).collect()
}

pub(crate) fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

pub(crate) fn to_nalgebra(x: Array2<f64>) -> DMatrix<f64> {
    // nshare expects standard layout
    let x = if x.is_standard_layout() {
        x
    } else {
        x.as_standard_layout().into_owned()
    };
    x.into_nalgebra()
}

pub(crate) fn to_ndarray(x: DMatrix<f64>) -> Array2<f64> {
    x.into_ndarray2().into_owned()
}
