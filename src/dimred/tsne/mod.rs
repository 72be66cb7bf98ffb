//! # t-SNE
//!
//! t-distributed stochastic neighbor embedding over the rows of a dense
//! matrix, computed with the exact (non Barnes-Hut) gradient of `bhtsne`. Each
//! row is treated as a feature vector and compared with Euclidean distance.
//!
//! `bhtsne` exaggerates the input affinities by a fixed factor of 12 until
//! `exaggeration_iter`. An `early_exaggeration` of 1 is honoured by ending
//! the exaggeration phase after the first iteration; other factors are
//! rejected.

use anyhow::{anyhow, bail};
use log::debug;
use ndarray::{Array2, ArrayView2};

/// The affinity exaggeration `bhtsne` applies during its early phase.
pub const EARLY_EXAGGERATION: f64 = 12.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TsneConfig {
    output_dim: usize,
    perplexity: f64,
    n_iter: usize,
    learning_rate: f64,
    early_exaggeration: f64,
    exaggeration_iter: usize,
    momentum: f64,
    final_momentum: f64,
    momentum_switch_iter: usize,
}

impl Default for TsneConfig {
    fn default() -> Self {
        TsneConfigBuilder::new().build()
    }
}

impl TsneConfig {
    pub fn output_dim(&self) -> usize {
        self.output_dim
    }

    pub fn perplexity(&self) -> f64 {
        self.perplexity
    }

    /// Iteration at which the exaggeration phase ends, or 0 when the
    /// affinities are not exaggerated.
    fn stop_exaggeration_iter(&self) -> usize {
        if self.early_exaggeration == 1.0 {
            0
        } else {
            self.exaggeration_iter
        }
    }
}

/// Builder for [`TsneConfig`].
///
/// Default values:
/// - `output_dim`: 2
/// - `perplexity`: 30.0
/// - `n_iter`: 1000
/// - `learning_rate`: 200.0
/// - `early_exaggeration`: 12.0, applied for the first 250 iterations
/// - `momentum`: 0.5, then `final_momentum` 0.8 from iteration 250
pub struct TsneConfigBuilder {
    config: TsneConfig,
}

impl Default for TsneConfigBuilder {
    fn default() -> Self {
        Self {
            config: TsneConfig {
                output_dim: 2,
                perplexity: 30.0,
                n_iter: 1000,
                learning_rate: 200.0,
                early_exaggeration: EARLY_EXAGGERATION,
                exaggeration_iter: 250,
                momentum: 0.5,
                final_momentum: 0.8,
                momentum_switch_iter: 250,
            },
        }
    }
}

impl TsneConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output_dim(mut self, output_dim: usize) -> Self {
        self.config.output_dim = output_dim;
        self
    }

    /// Effective number of neighbours each point considers.
    pub fn perplexity(mut self, perplexity: f64) -> Self {
        self.config.perplexity = perplexity;
        self
    }

    pub fn n_iter(mut self, n_iter: usize) -> Self {
        self.config.n_iter = n_iter;
        self
    }

    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.config.learning_rate = learning_rate;
        self
    }

    /// Either [`EARLY_EXAGGERATION`] or 1.0 (no exaggeration).
    pub fn early_exaggeration(mut self, early_exaggeration: f64) -> Self {
        self.config.early_exaggeration = early_exaggeration;
        self
    }

    pub fn exaggeration_iter(mut self, exaggeration_iter: usize) -> Self {
        self.config.exaggeration_iter = exaggeration_iter;
        self
    }

    /// Momentum before and after `momentum_switch_iter`.
    pub fn momentum(mut self, momentum: f64, final_momentum: f64) -> Self {
        self.config.momentum = momentum;
        self.config.final_momentum = final_momentum;
        self
    }

    pub fn momentum_switch_iter(mut self, momentum_switch_iter: usize) -> Self {
        self.config.momentum_switch_iter = momentum_switch_iter;
        self
    }

    pub fn build(self) -> TsneConfig {
        self.config
    }
}

/// Embeds the rows of `x` into `config.output_dim` dimensions.
///
/// # Errors
/// - fewer than two rows
/// - an output dimension of zero or above 255
/// - a perplexity that is not positive, or larger than `(n_samples - 1) / 3`
/// - an `early_exaggeration` other than 12 or 1
pub fn run(x: ArrayView2<f64>, config: &TsneConfig) -> anyhow::Result<Array2<f64>> {
    let (n, n_features) = x.dim();
    if n < 2 {
        bail!("t-SNE requires at least two samples, got {}", n);
    }
    if config.output_dim == 0 {
        bail!("t-SNE output dimension must be at least 1");
    }
    let embedding_dim = u8::try_from(config.output_dim).map_err(|_| {
        anyhow!(
            "t-SNE output dimension must be at most {}, got {}",
            u8::MAX,
            config.output_dim
        )
    })?;
    if !(config.perplexity > 0.0) {
        bail!("perplexity must be positive, got {}", config.perplexity);
    }
    if 3.0 * config.perplexity > (n - 1) as f64 {
        bail!(
            "perplexity ({}) is too large for {} samples, it must be at most {:.2}",
            config.perplexity,
            n,
            (n - 1) as f64 / 3.0
        );
    }
    if config.early_exaggeration != EARLY_EXAGGERATION && config.early_exaggeration != 1.0 {
        bail!(
            "early_exaggeration must be {} or 1.0, got {}",
            EARLY_EXAGGERATION,
            config.early_exaggeration
        );
    }
    debug!(
        "t-SNE: {} samples x {} features -> {} dimensions, perplexity {}, {} iterations",
        n, n_features, config.output_dim, config.perplexity, config.n_iter
    );

    let x = x.as_standard_layout();
    let x_slice = x
        .as_slice()
        .ok_or_else(|| anyhow!("t-SNE input is not contiguous"))?;
    let samples: Vec<&[f64]> = x_slice.chunks(n_features).collect();

    let embedding = bhtsne::tSNE::new(&samples)
        .embedding_dim(embedding_dim)
        .perplexity(config.perplexity)
        .epochs(config.n_iter)
        .learning_rate(config.learning_rate)
        .momentum(config.momentum)
        .final_momentum(config.final_momentum)
        .momentum_switch_epoch(config.momentum_switch_iter)
        .stop_lying_epoch(config.stop_exaggeration_iter())
        .exact(|sample_a, sample_b| euclidean(sample_a, sample_b))
        .embedding();

    let y = Array2::from_shape_vec((n, config.output_dim), embedding)?;
    if y.iter().any(|v| !v.is_finite()) {
        bail!("t-SNE produced non-finite coordinates");
    }
    Ok(y)
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&a, &b)| (a - b).powi(2))
        .sum::<f64>()
        .sqrt()
}
