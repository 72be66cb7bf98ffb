//! # Distance Matrix
//!
//! A validated, square, symmetric and hollow matrix of pairwise dissimilarities
//! between uniquely identified samples. This is the input of every ordination
//! method in the crate.

use anyhow::bail;
use ndarray::{Array2, ArrayView2};
use std::collections::HashSet;

const SYMMETRY_TOLERANCE: f64 = 1e-8;

#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    ids: Vec<String>,
    data: Array2<f64>,
}

impl DistanceMatrix {
    /// Creates a distance matrix over `ids`.
    ///
    /// # Errors
    /// - the matrix is empty or not square
    /// - the number of ids does not match the matrix size, or ids repeat
    /// - a value is not finite
    /// - the matrix is not symmetric or its diagonal is not zero
    pub fn new<S: Into<String>>(data: Array2<f64>, ids: Vec<S>) -> anyhow::Result<Self> {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        let (nrows, ncols) = data.dim();

        if nrows == 0 {
            bail!("Distance matrix must contain at least one sample");
        }
        if nrows != ncols {
            bail!("Distance matrix must be square, got {} x {}", nrows, ncols);
        }
        if ids.len() != nrows {
            bail!(
                "Number of ids ({}) does not match the matrix size ({})",
                ids.len(),
                nrows
            );
        }

        let mut seen = HashSet::with_capacity(ids.len());
        for id in &ids {
            if !seen.insert(id.as_str()) {
                bail!("Duplicate sample id '{}'", id);
            }
        }

        if data.iter().any(|v| !v.is_finite()) {
            bail!("Distance matrix contains non-finite values");
        }
        for i in 0..nrows {
            if data[[i, i]] != 0.0 {
                bail!(
                    "Distance matrix must be hollow, found {} on the diagonal for '{}'",
                    data[[i, i]],
                    ids[i]
                );
            }
            for j in (i + 1)..nrows {
                if (data[[i, j]] - data[[j, i]]).abs() > SYMMETRY_TOLERANCE {
                    bail!(
                        "Distance matrix is not symmetric at ('{}', '{}'): {} != {}",
                        ids[i],
                        ids[j],
                        data[[i, j]],
                        data[[j, i]]
                    );
                }
            }
        }

        Ok(Self { ids, data })
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn data(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|x| x == id)
    }

    pub fn into_parts(self) -> (Vec<String>, Array2<f64>) {
        (self.ids, self.data)
    }
}
