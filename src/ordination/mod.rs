//! # Ordination Results
//!
//! The uniform output of every ordination method: method names, per-axis
//! eigenvalues and proportion explained, and axis-labelled sample (and
//! optionally feature) coordinates.

use anyhow::{anyhow, bail};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use std::collections::HashMap;

/// A dense matrix with labelled rows and columns.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledMatrix {
    index: Vec<String>,
    columns: Vec<String>,
    values: Array2<f64>,
}

impl LabeledMatrix {
    pub fn new<S: Into<String>, C: Into<String>>(
        values: Array2<f64>,
        index: Vec<S>,
        columns: Vec<C>,
    ) -> anyhow::Result<Self> {
        let index: Vec<String> = index.into_iter().map(Into::into).collect();
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();

        if values.nrows() != index.len() {
            bail!(
                "Number of rows ({}) does not match index length ({})",
                values.nrows(),
                index.len()
            );
        }
        if values.ncols() != columns.len() {
            bail!(
                "Number of columns ({}) does not match column labels ({})",
                values.ncols(),
                columns.len()
            );
        }
        Ok(Self {
            index,
            columns,
            values,
        })
    }

    pub fn index(&self) -> &[String] {
        &self.index
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn row(&self, id: &str) -> Option<ArrayView1<'_, f64>> {
        self.index
            .iter()
            .position(|x| x == id)
            .map(|i| self.values.row(i))
    }

    pub fn column(&self, label: &str) -> Option<ArrayView1<'_, f64>> {
        self.columns
            .iter()
            .position(|x| x == label)
            .map(|j| self.values.column(j))
    }

    /// Returns a copy with rows reordered to `order`.
    ///
    /// `order` must name every row exactly once.
    pub fn reindex(&self, order: &[String]) -> anyhow::Result<Self> {
        if order.len() != self.index.len() {
            bail!(
                "Cannot reindex {} rows to {} labels",
                self.index.len(),
                order.len()
            );
        }
        let positions: HashMap<&str, usize> = self
            .index
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        let rows = order
            .iter()
            .map(|id| {
                positions
                    .get(id.as_str())
                    .copied()
                    .ok_or_else(|| anyhow!("Label '{}' not found in index", id))
            })
            .collect::<anyhow::Result<Vec<usize>>>()?;

        let mut used = vec![false; rows.len()];
        for &r in &rows {
            if std::mem::replace(&mut used[r], true) {
                bail!("Label '{}' appears more than once", self.index[r]);
            }
        }

        Ok(Self {
            index: order.to_vec(),
            columns: self.columns.clone(),
            values: self.values.select(Axis(0), &rows),
        })
    }

    pub fn into_values(self) -> Array2<f64> {
        self.values
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrdinationResults {
    pub short_method_name: String,
    pub long_method_name: String,
    /// One value per axis; zero for methods without an eigen-analysis.
    pub eigvals: Array1<f64>,
    /// `None` for methods without an eigen-analysis.
    pub proportion_explained: Option<Array1<f64>>,
    pub samples: LabeledMatrix,
    pub features: Option<LabeledMatrix>,
}

impl OrdinationResults {
    pub fn new(
        short_method_name: impl Into<String>,
        long_method_name: impl Into<String>,
        eigvals: Array1<f64>,
        proportion_explained: Option<Array1<f64>>,
        samples: LabeledMatrix,
    ) -> anyhow::Result<Self> {
        let n_axes = samples.columns().len();
        if eigvals.len() != n_axes {
            bail!(
                "Got {} eigenvalues for {} axes",
                eigvals.len(),
                n_axes
            );
        }
        if let Some(p) = &proportion_explained {
            if p.len() != n_axes {
                bail!(
                    "Got {} proportion explained values for {} axes",
                    p.len(),
                    n_axes
                );
            }
        }
        Ok(Self {
            short_method_name: short_method_name.into(),
            long_method_name: long_method_name.into(),
            eigvals,
            proportion_explained,
            samples,
            features: None,
        })
    }

    pub fn axis_labels(&self) -> &[String] {
        self.samples.columns()
    }

    pub fn n_axes(&self) -> usize {
        self.samples.columns().len()
    }

    pub fn sample_ids(&self) -> &[String] {
        self.samples.index()
    }
}
