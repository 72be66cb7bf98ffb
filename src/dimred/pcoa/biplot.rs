use crate::dense::{center_columns, standardize_columns};
use crate::ordination::{LabeledMatrix, OrdinationResults};
use anyhow::bail;
use ndarray::Array2;
use std::collections::HashSet;

/// Projects descriptors onto an existing PCoA ordination.
///
/// `features` is samples × descriptors and must describe exactly the samples of
/// `ordination`, in any order. The projected loadings (descriptors × axes) are
/// stored in the `features` table of the returned copy; samples, eigenvalues and
/// proportion explained are left untouched.
///
/// Loadings follow Legendre & Legendre (1998), eq. 9.44 and 9.45:
/// `S = Y_cᵀ U_std / (n - 1)` and `U_proj = sqrt(n - 1) S Λ^(-1/2)`.
pub fn biplot(
    ordination: &OrdinationResults,
    features: &LabeledMatrix,
) -> anyhow::Result<OrdinationResults> {
    if !ordination.short_method_name.is_empty() && ordination.short_method_name != "PCoA" {
        bail!("This biplot computation can only be performed in a PCoA matrix.");
    }

    let samples: HashSet<&String> = ordination.sample_ids().iter().collect();
    let descriptors: HashSet<&String> = features.index().iter().collect();
    if samples != descriptors || features.index().len() != ordination.sample_ids().len() {
        bail!("The eigenvectors and the descriptors must describe the same samples.");
    }

    let n = ordination.sample_ids().len();
    if n < 2 {
        bail!("A biplot requires at least two samples, got {}", n);
    }
    let n_minus_1 = (n - 1) as f64;

    let mut y = features.reindex(ordination.sample_ids())?.into_values();
    center_columns(&mut y);

    let mut u_std = ordination.samples.values().to_owned();
    standardize_columns(&mut u_std);

    let s_pc = y.t().dot(&u_std) / n_minus_1;

    let inv_sqrt_eig = ordination
        .eigvals
        .mapv(|v| if v > 0.0 { v.powf(-0.5) } else { 0.0 });
    let mut u_proj: Array2<f64> = s_pc * n_minus_1.sqrt();
    for (mut col, &w) in u_proj.columns_mut().into_iter().zip(inv_sqrt_eig.iter()) {
        col *= w;
    }

    let mut result = ordination.clone();
    result.features = Some(LabeledMatrix::new(
        u_proj,
        features.columns().to_vec(),
        ordination.axis_labels().to_vec(),
    )?);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimred::pcoa::tests::{euclidean_distances, points};
    use crate::dimred::pcoa::{run, PcoaMethod};
    use crate::utils::axis_labels;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, s, Axis};

    fn ordination() -> OrdinationResults {
        let p = points().slice(s![..4, ..]).to_owned();
        let res = run(euclidean_distances(&p), PcoaMethod::Eigh).unwrap();
        let samples = LabeledMatrix::new(
            res.coordinates,
            vec!["s1", "s2", "s3", "s4"],
            axis_labels("PC", 3),
        )
        .unwrap();
        OrdinationResults::new(
            "PCoA",
            "Principal Coordinate Analysis",
            res.eigvals,
            Some(res.proportion_explained),
            samples,
        )
        .unwrap()
    }

    #[test]
    fn test_biplot_adds_features_and_keeps_samples() {
        let ord = ordination();
        let features = LabeledMatrix::new(
            array![[1.0, 0.0], [2.0, 1.0], [0.0, 3.0], [4.0, 1.0]],
            vec!["s1", "s2", "s3", "s4"],
            vec!["otu_a", "otu_b"],
        )
        .unwrap();

        let bp = biplot(&ord, &features).unwrap();
        assert_eq!(bp.samples, ord.samples);
        assert_eq!(bp.eigvals, ord.eigvals);
        assert_eq!(bp.proportion_explained, ord.proportion_explained);

        let f = bp.features.unwrap();
        assert_eq!(f.index(), &["otu_a", "otu_b"]);
        assert_eq!(f.columns(), ord.axis_labels());
        assert!(f.values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_biplot_is_independent_of_feature_row_order() {
        let ord = ordination();
        let a = LabeledMatrix::new(
            array![[1.0, 0.0], [2.0, 1.0], [0.0, 3.0], [4.0, 1.0]],
            vec!["s1", "s2", "s3", "s4"],
            vec!["x", "y"],
        )
        .unwrap();
        let b = LabeledMatrix::new(
            array![[4.0, 1.0], [0.0, 3.0], [1.0, 0.0], [2.0, 1.0]],
            vec!["s4", "s3", "s1", "s2"],
            vec!["x", "y"],
        )
        .unwrap();
        assert_eq!(
            biplot(&ord, &a).unwrap().features,
            biplot(&ord, &b).unwrap().features
        );
    }

    #[test]
    fn test_axis_descriptor_projects_onto_its_axis() {
        let ord = ordination();
        let pc1 = ord.samples.values().column(0).to_owned().insert_axis(Axis(1));
        let features =
            LabeledMatrix::new(pc1, ord.sample_ids().to_vec(), vec!["pc1_copy"]).unwrap();

        let f = biplot(&ord, &features).unwrap().features.unwrap();
        let n = 4.0_f64;
        assert_abs_diff_eq!(f.values()[[0, 0]], (n / (n - 1.0)).sqrt(), epsilon = 1e-8);
        assert_abs_diff_eq!(f.values()[[0, 1]], 0.0, epsilon = 1e-8);
        assert_abs_diff_eq!(f.values()[[0, 2]], 0.0, epsilon = 1e-8);
    }

    #[test]
    fn test_biplot_errors() {
        let ord = ordination();
        let mismatched = LabeledMatrix::new(
            array![[1.0], [2.0], [3.0], [4.0]],
            vec!["s1", "s2", "s3", "other"],
            vec!["x"],
        )
        .unwrap();
        assert!(biplot(&ord, &mismatched).is_err());

        let mut not_pcoa = ord.clone();
        not_pcoa.short_method_name = "UMAP".to_string();
        let features = LabeledMatrix::new(
            array![[1.0], [2.0], [3.0], [4.0]],
            vec!["s1", "s2", "s3", "s4"],
            vec!["x"],
        )
        .unwrap();
        assert!(biplot(&not_pcoa, &features).is_err());

        let mut unnamed = ord.clone();
        unnamed.short_method_name.clear();
        assert!(biplot(&unnamed, &features).is_ok());
    }
}
