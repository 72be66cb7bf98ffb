//! # Ordination Adapter
//!
//! One calling convention over every ordination engine in [`crate::dimred`]:
//! each function takes a [`DistanceMatrix`], forwards its parameters to the
//! engine and repackages the coordinates as [`OrdinationResults`] with axis
//! labels, eigenvalues and proportion explained.
//!
//! t-SNE and UMAP report a third, all-zero axis when two dimensions are
//! requested. They have no eigen-analysis, so their eigenvalues are zero and
//! proportion explained is absent.

use crate::dimred::{pcoa as pcoa_engine, tsne as tsne_engine, umap as umap_engine};
use crate::distance::DistanceMatrix;
use crate::ordination::{LabeledMatrix, OrdinationResults};
use crate::utils::axis_labels;
use ndarray::{concatenate, Array1, Array2, Axis};

/// Parameters of [`tsne`].
///
/// `early_exaggeration` accepts the engine's fixed factor of 12 or 1 to disable it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TsneParams {
    pub number_of_dimensions: usize,
    pub perplexity: f64,
    pub n_iter: usize,
    pub learning_rate: f64,
    pub early_exaggeration: f64,
}

impl Default for TsneParams {
    fn default() -> Self {
        Self {
            number_of_dimensions: 2,
            perplexity: 25.0,
            n_iter: 1000,
            learning_rate: 200.0,
            early_exaggeration: 12.0,
        }
    }
}

impl TsneParams {
    pub fn number_of_dimensions(mut self, number_of_dimensions: usize) -> Self {
        self.number_of_dimensions = number_of_dimensions;
        self
    }

    pub fn perplexity(mut self, perplexity: f64) -> Self {
        self.perplexity = perplexity;
        self
    }

    pub fn n_iter(mut self, n_iter: usize) -> Self {
        self.n_iter = n_iter;
        self
    }

    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn early_exaggeration(mut self, early_exaggeration: f64) -> Self {
        self.early_exaggeration = early_exaggeration;
        self
    }
}

/// Parameters of [`umap`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UmapParams {
    pub number_of_dimensions: usize,
    pub n_neighbors: usize,
    pub min_dist: f64,
}

impl Default for UmapParams {
    fn default() -> Self {
        Self {
            number_of_dimensions: 2,
            n_neighbors: 15,
            min_dist: 0.4,
        }
    }
}

impl UmapParams {
    pub fn number_of_dimensions(mut self, number_of_dimensions: usize) -> Self {
        self.number_of_dimensions = number_of_dimensions;
        self
    }

    pub fn n_neighbors(mut self, n_neighbors: usize) -> Self {
        self.n_neighbors = n_neighbors;
        self
    }

    pub fn min_dist(mut self, min_dist: f64) -> Self {
        self.min_dist = min_dist;
        self
    }
}

/// Principal Coordinate Analysis.
///
/// With `number_of_dimensions = None` the centered matrix is fully
/// eigendecomposed and every informative axis (`n - 1` for `n` samples) is
/// returned. With `Some(k)` only the leading `k` axes are computed by a fast
/// randomized SVD, which is cheaper and slightly less accurate on large input;
/// proportion explained stays relative to the total variance.
pub fn pcoa(
    distance_matrix: &DistanceMatrix,
    number_of_dimensions: Option<usize>,
) -> anyhow::Result<OrdinationResults> {
    pcoa_owned(distance_matrix.clone(), number_of_dimensions)
}

/// Same as [`pcoa`], but consumes the distance matrix and centers it in place.
pub fn pcoa_owned(
    distance_matrix: DistanceMatrix,
    number_of_dimensions: Option<usize>,
) -> anyhow::Result<OrdinationResults> {
    let method = match number_of_dimensions {
        None => pcoa_engine::PcoaMethod::Eigh,
        Some(k) => pcoa_engine::PcoaMethod::fsvd(k),
    };
    let (ids, data) = distance_matrix.into_parts();
    let res = pcoa_engine::run(data, method)?;

    let labels = axis_labels("PC", res.eigvals.len());
    OrdinationResults::new(
        "PCoA",
        "Principal Coordinate Analysis",
        res.eigvals,
        Some(res.proportion_explained),
        LabeledMatrix::new(res.coordinates, ids, labels)?,
    )
}

/// Projects `features` (samples × features) onto a PCoA result.
pub fn pcoa_biplot(
    pcoa: &OrdinationResults,
    features: &LabeledMatrix,
) -> anyhow::Result<OrdinationResults> {
    pcoa_engine::biplot(pcoa, features)
}

/// t-distributed stochastic neighbor embedding of the distance matrix rows.
pub fn tsne(
    distance_matrix: &DistanceMatrix,
    params: &TsneParams,
) -> anyhow::Result<OrdinationResults> {
    let config = tsne_engine::TsneConfigBuilder::new()
        .output_dim(params.number_of_dimensions)
        .perplexity(params.perplexity)
        .n_iter(params.n_iter)
        .learning_rate(params.learning_rate)
        .early_exaggeration(params.early_exaggeration)
        .build();
    let embedding = tsne_engine::run(distance_matrix.data(), &config)?;

    embedding_results(
        "T-SNE",
        "t-distributed stochastic neighbor embedding",
        "TSNE",
        distance_matrix,
        embedding,
    )
}

/// Uniform Manifold Approximation and Projection of the distance matrix rows.
pub fn umap(
    distance_matrix: &DistanceMatrix,
    params: &UmapParams,
) -> anyhow::Result<OrdinationResults> {
    let config = umap_engine::UmapConfigBuilder::new()
        .n_components(params.number_of_dimensions)
        .n_neighbors(params.n_neighbors)
        .min_dist(params.min_dist)
        .build();
    let embedding = umap_engine::run(distance_matrix.data(), &config)?;

    embedding_results(
        "UMAP",
        "Uniform Manifold Approximation and Projection",
        "UMAP",
        distance_matrix,
        embedding,
    )
}

fn embedding_results(
    short_method_name: &str,
    long_method_name: &str,
    axis_prefix: &str,
    distance_matrix: &DistanceMatrix,
    embedding: Array2<f64>,
) -> anyhow::Result<OrdinationResults> {
    let embedding = if embedding.ncols() == 2 {
        let zeros = Array2::<f64>::zeros((embedding.nrows(), 1));
        concatenate(Axis(1), &[embedding.view(), zeros.view()])?
    } else {
        embedding
    };

    let n_axes = embedding.ncols();
    OrdinationResults::new(
        short_method_name,
        long_method_name,
        Array1::zeros(n_axes),
        None,
        LabeledMatrix::new(
            embedding,
            distance_matrix.ids().to_vec(),
            axis_labels(axis_prefix, n_axes),
        )?,
    )
}
