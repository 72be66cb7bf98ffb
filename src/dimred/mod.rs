//! # Dimensionality Reduction
//!
//! Ordination engines that take a samples × samples (or samples × features)
//! matrix and produce low-dimensional coordinates.
//!
//! ## Available
//! - **PCoA** ([`pcoa`]): Principal Coordinate Analysis, exact or randomized, plus biplot projection
//! - **t-SNE** ([`tsne`]): exact t-Distributed Stochastic Neighbor Embedding via `bhtsne`
//! - **UMAP** ([`umap`]): Uniform Manifold Approximation and Projection via `umap-rs`
//!
//! ## Algorithm Selection Guide
//! - Use **PCoA** when distances should be preserved and axes need an explained-variance reading
//! - Use **t-SNE** for non-linear visualization of clusters and local structure
//! - Use **UMAP** for preserving both local and global structure in embeddings

pub mod pcoa;
pub mod tsne;
pub mod umap;
