//! # UMAP
//!
//! Uniform Manifold Approximation and Projection over the rows of a dense
//! matrix, fitted with `umap-rs`. That crate expects the neighbour graph and
//! the initial layout from the caller, so this module supplies:
//! 1. an exact kNN over Euclidean row distances, self first
//! 2. a seeded uniform initialisation in `[-10, 10]`
//!
//! The fuzzy simplicial set, the curve fit and the SGD layout run inside
//! `umap-rs` in `f32`.

mod knn;

use crate::dense::squared_euclidean;
use crate::utils::seeded_rng;
use anyhow::bail;
use knn::nearest_neighbors;
use log::{debug, warn};
use ndarray::{Array2, ArrayView2};
use rand::Rng;
use umap_rs::{GraphParams, ManifoldParams, OptimizationParams};

#[derive(Debug, Clone, PartialEq)]
pub struct UmapConfig {
    n_components: usize,
    n_neighbors: usize,
    min_dist: f64,
    spread: f64,
    local_connectivity: f64,
    set_op_mix_ratio: f64,
    n_epochs: Option<usize>,
    learning_rate: f64,
    negative_sample_rate: usize,
    repulsion_strength: f64,
    ab: Option<(f64, f64)>,
    random_seed: u64,
}

impl Default for UmapConfig {
    fn default() -> Self {
        UmapConfigBuilder::new().build()
    }
}

impl UmapConfig {
    pub fn n_components(&self) -> usize {
        self.n_components
    }

    pub fn n_neighbors(&self) -> usize {
        self.n_neighbors
    }

    fn to_umap_rs(&self, n_neighbors: usize) -> umap_rs::UmapConfig {
        umap_rs::UmapConfig {
            n_components: self.n_components,
            manifold: ManifoldParams {
                min_dist: self.min_dist as f32,
                spread: self.spread as f32,
                a: self.ab.map(|(a, _)| a as f32),
                b: self.ab.map(|(_, b)| b as f32),
                ..Default::default()
            },
            graph: GraphParams {
                n_neighbors,
                local_connectivity: self.local_connectivity as f32,
                set_op_mix_ratio: self.set_op_mix_ratio as f32,
                ..Default::default()
            },
            optimization: OptimizationParams {
                n_epochs: self.n_epochs,
                learning_rate: self.learning_rate as f32,
                negative_sample_rate: self.negative_sample_rate,
                repulsion_strength: self.repulsion_strength as f32,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Builder for [`UmapConfig`].
///
/// Default values:
/// - `n_components`: 2
/// - `n_neighbors`: 15
/// - `min_dist`: 0.1, `spread`: 1.0
/// - `local_connectivity`: 1.0
/// - `set_op_mix_ratio`: 1.0 (pure fuzzy union)
/// - `n_epochs`: chosen by `umap-rs` from the sample count
/// - `learning_rate`: 1.0
/// - `negative_sample_rate`: 5
/// - `repulsion_strength`: 1.0
/// - `random_seed`: 42, used for the initial layout
pub struct UmapConfigBuilder {
    config: UmapConfig,
}

impl Default for UmapConfigBuilder {
    fn default() -> Self {
        Self {
            config: UmapConfig {
                n_components: 2,
                n_neighbors: 15,
                min_dist: 0.1,
                spread: 1.0,
                local_connectivity: 1.0,
                set_op_mix_ratio: 1.0,
                n_epochs: None,
                learning_rate: 1.0,
                negative_sample_rate: 5,
                repulsion_strength: 1.0,
                ab: None,
                random_seed: 42,
            },
        }
    }
}

impl UmapConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn n_components(mut self, n_components: usize) -> Self {
        self.config.n_components = n_components;
        self
    }

    /// Size of the local neighbourhood. Larger values favour global structure.
    pub fn n_neighbors(mut self, n_neighbors: usize) -> Self {
        self.config.n_neighbors = n_neighbors;
        self
    }

    /// Minimum distance between embedded points; must not exceed `spread`.
    pub fn min_dist(mut self, min_dist: f64) -> Self {
        self.config.min_dist = min_dist;
        self
    }

    pub fn spread(mut self, spread: f64) -> Self {
        self.config.spread = spread;
        self
    }

    pub fn local_connectivity(mut self, local_connectivity: f64) -> Self {
        self.config.local_connectivity = local_connectivity;
        self
    }

    pub fn set_op_mix_ratio(mut self, set_op_mix_ratio: f64) -> Self {
        self.config.set_op_mix_ratio = set_op_mix_ratio;
        self
    }

    pub fn n_epochs(mut self, n_epochs: usize) -> Self {
        self.config.n_epochs = Some(n_epochs);
        self
    }

    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.config.learning_rate = learning_rate;
        self
    }

    pub fn negative_sample_rate(mut self, negative_sample_rate: usize) -> Self {
        self.config.negative_sample_rate = negative_sample_rate;
        self
    }

    pub fn repulsion_strength(mut self, repulsion_strength: f64) -> Self {
        self.config.repulsion_strength = repulsion_strength;
        self
    }

    /// Overrides the curve parameters otherwise fitted from `min_dist` and `spread`.
    pub fn ab(mut self, a: f64, b: f64) -> Self {
        self.config.ab = Some((a, b));
        self
    }

    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = seed;
        self
    }

    pub fn build(self) -> UmapConfig {
        self.config
    }
}

/// Embeds the rows of `x` into `config.n_components` dimensions.
///
/// When `n_neighbors` is not below the number of rows it is truncated to
/// `n_samples - 1` with a warning. With two rows no neighbour graph can be
/// built and the initial layout is returned, also with a warning.
///
/// # Errors
/// - fewer than two rows, or zero output components
/// - `n_neighbors < 2`
/// - `min_dist` negative or larger than `spread`
/// - `set_op_mix_ratio` outside `[0, 1]`
pub fn run(x: ArrayView2<f64>, config: &UmapConfig) -> anyhow::Result<Array2<f64>> {
    let n = x.nrows();
    if n < 2 {
        bail!("UMAP requires at least two samples, got {}", n);
    }
    if config.n_components == 0 {
        bail!("n_components must be at least 1");
    }
    if config.n_neighbors < 2 {
        bail!("n_neighbors must be greater than 1, got {}", config.n_neighbors);
    }
    if config.min_dist < 0.0 {
        bail!("min_dist cannot be negative, got {}", config.min_dist);
    }
    if config.min_dist > config.spread {
        bail!(
            "min_dist ({}) must be less than or equal to spread ({})",
            config.min_dist,
            config.spread
        );
    }
    if !(0.0..=1.0).contains(&config.set_op_mix_ratio) {
        bail!(
            "set_op_mix_ratio must be between 0.0 and 1.0, got {}",
            config.set_op_mix_ratio
        );
    }

    let n_neighbors = if config.n_neighbors >= n {
        warn!(
            "n_neighbors ({}) is larger than the dataset size; truncating to {}",
            config.n_neighbors,
            n - 1
        );
        n - 1
    } else {
        config.n_neighbors
    };

    let init = random_init(n, config.n_components, config.random_seed);
    if n_neighbors < 2 {
        warn!(
            "UMAP: {} samples leave no neighbours to connect; returning the initial layout",
            n
        );
        return Ok(init.mapv(f64::from));
    }
    debug!(
        "UMAP: {} samples x {} features -> {} dimensions, {} neighbours",
        n,
        x.ncols(),
        config.n_components,
        n_neighbors
    );

    let distances = squared_euclidean(x).mapv(f64::sqrt);
    let (knn_indices, knn_dists) = nearest_neighbors(&distances, n_neighbors);
    let data = x.mapv(|v| v as f32);

    let model = umap_rs::Umap::new(config.to_umap_rs(n_neighbors)).fit(
        data.view(),
        knn_indices.view(),
        knn_dists.view(),
        init.view(),
    );
    let embedding = model.embedding().mapv(f64::from);

    if embedding.dim() != (n, config.n_components) {
        bail!(
            "UMAP returned a {:?} embedding, expected {:?}",
            embedding.dim(),
            (n, config.n_components)
        );
    }
    if embedding.iter().any(|v| !v.is_finite()) {
        bail!("UMAP produced non-finite coordinates");
    }
    Ok(embedding)
}

fn random_init(n: usize, n_components: usize, seed: u64) -> Array2<f32> {
    let mut rng = seeded_rng(seed);
    Array2::from_shape_simple_fn((n, n_components), || rng.random_range(-10.0..10.0))
}
