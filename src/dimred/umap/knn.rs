//! Exact k-nearest neighbours over a dense distance matrix.

use ndarray::Array2;
use rayon::prelude::*;

/// Indices and distances of the `k` nearest rows of each row, self included
/// as the first neighbour. Ties are broken by index.
pub(crate) fn nearest_neighbors(distances: &Array2<f64>, k: usize) -> (Array2<u32>, Array2<f32>) {
    let n = distances.nrows();
    let k = k.min(n);

    let rows: Vec<Vec<(usize, f64)>> = (0..n)
        .into_par_iter()
        .map(|i| {
            let row = distances.row(i);
            let mut order: Vec<usize> = (0..n).collect();
            order.sort_by(|&a, &b| {
                row[a]
                    .total_cmp(&row[b])
                    .then_with(|| (a != i).cmp(&(b != i)))
                    .then_with(|| a.cmp(&b))
            });
            order.into_iter().take(k).map(|j| (j, row[j])).collect()
        })
        .collect();

    let mut indices = Array2::zeros((n, k));
    let mut dists = Array2::zeros((n, k));
    for (i, row) in rows.into_iter().enumerate() {
        for (pos, (j, d)) in row.into_iter().enumerate() {
            indices[[i, pos]] = j as u32;
            dists[[i, pos]] = d as f32;
        }
    }
    (indices, dists)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn line_distances() -> Array2<f64> {
        // points at 0, 1, 3, 6 on a line
        let p = [0.0_f64, 1.0, 3.0, 6.0];
        Array2::from_shape_fn((4, 4), |(i, j)| (p[i] - p[j]).abs())
    }

    #[test]
    fn test_nearest_neighbors_self_first() {
        let (idx, dist) = nearest_neighbors(&line_distances(), 3);
        assert_eq!(idx.row(0).to_vec(), vec![0, 1, 2]);
        assert_eq!(idx.row(3).to_vec(), vec![3, 2, 1]);
        assert_eq!(dist.row(2).to_vec(), vec![0.0, 2.0, 3.0]);
    }

    #[test]
    fn test_nearest_neighbors_duplicates_keep_self_first() {
        let d = array![[0.0, 0.0, 1.0], [0.0, 0.0, 1.0], [1.0, 1.0, 0.0]];
        let (idx, _) = nearest_neighbors(&d, 2);
        assert_eq!(idx[[0, 0]], 0);
        assert_eq!(idx[[1, 0]], 1);
    }

    #[test]
    fn test_nearest_neighbors_caps_k() {
        let (idx, dist) = nearest_neighbors(&line_distances(), 10);
        assert_eq!(idx.dim(), (4, 4));
        assert_eq!(dist.dim(), (4, 4));
    }
}
