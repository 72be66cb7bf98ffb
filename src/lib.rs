pub mod adapter;
pub mod dense;
pub mod dimred;
pub mod distance;
pub mod ordination;
pub mod svd;
mod utils;

pub use adapter::{pcoa, pcoa_biplot, pcoa_owned, tsne, umap, TsneParams, UmapParams};
pub use distance::DistanceMatrix;
pub use ordination::{LabeledMatrix, OrdinationResults};
pub use utils::axis_labels;
