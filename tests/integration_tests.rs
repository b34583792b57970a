// End-to-end annotation runs on small, hand-built datasets.

#[cfg(feature = "point-annotator")]
mod integration_tests {
    use approx::assert_relative_eq;
    use nalgebra_sparse::{CooMatrix, CsrMatrix};
    use ndarray::{Array2, array};
    use single_annotation::data::ObsColumn;
    use single_annotation::{
        AnnotatedData, AnnotationError, Annotator, AnnotatorConfig, ExpressionMatrix,
        MarkerTable, PValueMethod, ScoringMethod,
    };

    const GENES: [&str; 13] = [
        "CD3E", "CD3D", "CD2", "MS4A1", "CD79A", "CD19", "LYZ", "CD14", "FCGR3A", "ACTB",
        "GAPDH", "MALAT1", "HBB",
    ];

    fn pbmc_markers() -> MarkerTable {
        MarkerTable::from_pairs([
            ("CD3E", "T cells"),
            ("CD3D", "T cells"),
            ("CD2", "T cells"),
            ("MS4A1", "B cells"),
            ("CD79A", "B cells"),
            ("CD19", "B cells"),
            ("LYZ", "Monocytes"),
            ("CD14", "Monocytes"),
            ("FCGR3A", "Monocytes"),
            ("HBB", "Erythrocytes"),
            ("PPBP", "Platelets"),
        ])
    }

    /// Six cells, two per type, each expressing the three markers of its own type highest.
    fn pbmc_expression() -> ExpressionMatrix {
        let cells = ["t1", "t2", "b1", "b2", "m1", "m2"];
        let mut values = Array2::<f64>::zeros((cells.len(), GENES.len()));
        for (row, cell) in cells.iter().enumerate() {
            values[[row, 9]] = 5.0;
            values[[row, 10]] = 4.0;
            values[[row, 11]] = 3.0;
            values[[row, 12]] = 0.5;

            let first_marker = match cell.as_bytes()[0] {
                b't' => 0,
                b'b' => 3,
                _ => 6,
            };
            let depth = if row % 2 == 0 { 1.0 } else { 7.0 };
            values[[row, first_marker]] = 50.0 * depth;
            values[[row, first_marker + 1]] = 40.0 * depth;
            values[[row, first_marker + 2]] = 30.0 * depth;
        }

        ExpressionMatrix::new(
            values,
            cells.iter().map(|c| c.to_string()).collect(),
            GENES.iter().map(|g| g.to_string()).collect(),
        )
        .unwrap()
    }

    fn organism_config() -> AnnotatorConfig {
        AnnotatorConfig::default().with_num_genes(20_000)
    }

    #[test]
    fn test_pbmc_annotation() {
        let expression = pbmc_expression();
        let scores = Annotator::default()
            .annotate(&expression, &pbmc_markers(), &organism_config())
            .unwrap();

        assert_eq!(scores.cells(), expression.cells());
        assert_eq!(
            scores.cell_types(),
            &["B cells".to_string(), "Monocytes".to_string(), "T cells".to_string()]
        );
        assert_eq!(
            scores.top_cell_types(),
            vec![
                Some("T cells"),
                Some("T cells"),
                Some("B cells"),
                Some("B cells"),
                Some("Monocytes"),
                Some("Monocytes"),
            ]
        );
        assert_relative_eq!(scores.get("b1", "B cells").unwrap(), 1.0, epsilon = 1e-12);
        assert_eq!(scores.get("b1", "T cells"), Some(0.0));
    }

    #[test]
    fn test_nonzero_filtering_controls_columns() {
        let expression = pbmc_expression();
        let annotator = Annotator::default();

        let filtered = annotator
            .annotate(&expression, &pbmc_markers(), &organism_config())
            .unwrap();
        for column in filtered.values().columns() {
            assert!(column.iter().any(|&v| v != 0.0));
        }

        let unfiltered = annotator
            .annotate(
                &expression,
                &pbmc_markers(),
                &organism_config().with_filter_nonzero(false),
            )
            .unwrap();
        // Platelets has no marker among the measured genes
        assert_eq!(
            unfiltered.cell_types(),
            &[
                "B cells".to_string(),
                "Erythrocytes".to_string(),
                "Monocytes".to_string(),
                "T cells".to_string(),
            ]
        );
        assert!(unfiltered.column("Erythrocytes").unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_disjoint_genes_give_zero_scores() {
        let expression = pbmc_expression();
        let markers = MarkerTable::from_pairs([("PPBP", "Platelets"), ("GNLY", "NK cells")]);
        let annotator = Annotator::default();

        let scores = annotator
            .annotate(&expression, &markers, &organism_config().with_filter_nonzero(false))
            .unwrap();
        assert_eq!(scores.n_cells(), 6);
        assert!(scores.values().iter().all(|&v| v == 0.0));

        let scores = annotator
            .annotate(&expression, &markers, &organism_config())
            .unwrap();
        assert_eq!(scores.n_cell_types(), 0);
        assert_eq!(scores.cells(), expression.cells());
    }

    #[test]
    fn test_scoring_methods() {
        let expression = pbmc_expression();
        let annotator = Annotator::default();

        let sums = annotator
            .annotate(
                &expression,
                &pbmc_markers(),
                &organism_config().with_scoring_method(ScoringMethod::SumOfExpressedMarkers),
            )
            .unwrap();
        assert_relative_eq!(sums.get("t1", "T cells").unwrap(), 120.0, epsilon = 1e-9);
        assert_relative_eq!(sums.get("t2", "T cells").unwrap(), 840.0, epsilon = 1e-9);

        for scoring in [ScoringMethod::LogFdr, ScoringMethod::LogPValue] {
            for method in [PValueMethod::Binom, PValueMethod::Hypergeom] {
                let config = organism_config()
                    .with_scoring_method(scoring)
                    .with_p_value_method(method);
                let scores = annotator
                    .annotate(&expression, &pbmc_markers(), &config)
                    .unwrap();
                let own = scores.get("m1", "Monocytes").unwrap();
                assert!(own.is_finite() && own > 10.0, "{} {}: {}", scoring, method, own);
                assert_eq!(scores.get("m1", "B cells"), Some(0.0));
            }
        }
    }

    #[test]
    fn test_normalization_keeps_within_cell_ranking() {
        let expression = pbmc_expression();
        let annotator = Annotator::default();
        let raw = annotator
            .annotate(&expression, &pbmc_markers(), &organism_config())
            .unwrap();
        let normalized = annotator
            .annotate(&expression, &pbmc_markers(), &organism_config().with_normalize(true))
            .unwrap();
        assert_eq!(raw, normalized);
    }

    #[test]
    fn test_sparse_input_matches_dense() {
        let dense = pbmc_expression();
        let mut coo = CooMatrix::<f64>::new(dense.n_cells(), dense.n_genes());
        for row in 0..dense.n_cells() {
            for (col, value) in dense.row(row).into_iter().enumerate() {
                if value != 0.0 {
                    coo.push(row, col, value);
                }
            }
        }
        let sparse = ExpressionMatrix::from_csr(
            &CsrMatrix::from(&coo),
            dense.cells().to_vec(),
            dense.genes().to_vec(),
        )
        .unwrap();
        assert!(sparse.is_sparse());

        let annotator = Annotator::default();
        let a = annotator.annotate(&dense, &pbmc_markers(), &organism_config()).unwrap();
        let b = annotator.annotate(&sparse, &pbmc_markers(), &organism_config()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_marker_overlap_scenario() {
        // genes A..D, markers A,B -> T1 and C -> T2, population of four genes
        let expression = ExpressionMatrix::new(
            array![[9.0, 3.0, 1.0, 0.0], [0.0, 1.0, 9.0, 3.0], [1.0, 1.0, 1.0, 1.0]],
            vec!["cell1".into(), "cell2".into(), "cell3".into()],
            vec!["A".into(), "B".into(), "C".into(), "D".into()],
        )
        .unwrap();
        let markers = MarkerTable::from_pairs([("A", "T1"), ("B", "T1"), ("C", "T2")]);
        let config = AnnotatorConfig::default()
            .with_num_genes(4)
            .with_p_threshold(1.0)
            .with_filter_nonzero(false)
            .with_p_value_method(PValueMethod::Binom);
        let annotator = Annotator::default();

        let ratios = annotator.annotate(&expression, &markers, &config).unwrap();
        assert_relative_eq!(ratios.get("cell1", "T1").unwrap(), 0.5, epsilon = 1e-12);
        assert_eq!(ratios.get("cell1", "T2"), Some(0.0));
        assert_relative_eq!(ratios.get("cell2", "T2").unwrap(), 1.0, epsilon = 1e-12);
        assert!(ratios.values().row(2).iter().all(|&v| v == 0.0));

        // binom.sf(0, 1, 2/4) = 0.5
        let p_scores = annotator
            .annotate(
                &expression,
                &markers,
                &config.clone().with_scoring_method(ScoringMethod::LogPValue),
            )
            .unwrap();
        assert_relative_eq!(p_scores.get("cell1", "T1").unwrap(), 2.0_f64.ln(), epsilon = 1e-10);
        // binom.sf(0, 1, 1/4) = 0.25
        assert_relative_eq!(p_scores.get("cell2", "T2").unwrap(), 4.0_f64.ln(), epsilon = 1e-10);
    }

    #[test]
    fn test_default_threshold_suppresses_weak_evidence() {
        let expression = ExpressionMatrix::new(
            array![[9.0, 3.0, 1.0, 0.0]],
            vec!["cell1".into()],
            vec!["A".into(), "B".into(), "C".into(), "D".into()],
        )
        .unwrap();
        let markers = MarkerTable::from_pairs([("A", "T1"), ("B", "T1"), ("C", "T2")]);

        // without num_genes the population falls back to the four measured genes
        let scores = Annotator::default()
            .annotate(&expression, &markers, &AnnotatorConfig::default())
            .unwrap();
        assert_eq!(scores.n_cell_types(), 0);
        assert_eq!(scores.n_cells(), 1);
    }

    #[test]
    fn test_annotate_into_extends_obs() {
        let mut data = AnnotatedData::new(pbmc_expression());
        data.obs_mut()
            .insert(
                "sample",
                ObsColumn::Categorical(vec!["donor_a".to_string(); 6]),
            )
            .unwrap();

        Annotator::default()
            .annotate_into(&mut data, &pbmc_markers(), &organism_config())
            .unwrap();

        assert_eq!(
            data.obs().column_names(),
            vec!["sample", "B cells", "Monocytes", "T cells"]
        );
        let t_scores = data.obs().get("T cells").unwrap().as_numeric().unwrap();
        assert_eq!(t_scores.len(), 6);
        assert_relative_eq!(t_scores[0], 1.0, epsilon = 1e-12);
        assert_eq!(t_scores[2], 0.0);
    }

    #[test]
    fn test_sparse_input_with_normalization() {
        let dense = pbmc_expression();
        let mut coo = CooMatrix::<f64>::new(dense.n_cells(), dense.n_genes());
        for row in 0..dense.n_cells() {
            for (col, value) in dense.row(row).into_iter().enumerate() {
                if value != 0.0 {
                    coo.push(row, col, value);
                }
            }
        }
        let sparse = ExpressionMatrix::from_csr(
            &CsrMatrix::from(&coo),
            dense.cells().to_vec(),
            dense.genes().to_vec(),
        )
        .unwrap();

        let config = organism_config()
            .with_normalize(true)
            .with_scoring_method(ScoringMethod::SumOfExpressedMarkers);
        let annotator = Annotator::default();
        let a = annotator.annotate(&dense, &pbmc_markers(), &config).unwrap();
        let b = annotator.annotate(&sparse, &pbmc_markers(), &config).unwrap();
        for (x, y) in a.values().iter().zip(b.values().iter()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-9);
        }
        assert!(a.get("b2", "B cells").unwrap() > 0.0);
    }

    #[test]
    fn test_nan_expression_rejected() {
        let result = ExpressionMatrix::new(
            array![[1.0, f64::NAN, 0.0]],
            vec!["cell1".into()],
            vec!["A".into(), "B".into(), "C".into()],
        );
        assert!(matches!(result, Err(AnnotationError::InvalidArgument(_))));
    }

    #[test]
    fn test_invalid_num_genes() {
        let result = Annotator::default().annotate(
            &pbmc_expression(),
            &pbmc_markers(),
            &AnnotatorConfig::default().with_num_genes(5),
        );
        assert!(matches!(result, Err(AnnotationError::InvalidArgument(_))));
    }

    #[test]
    fn test_unsupported_method_names() {
        assert!(matches!(
            "chi2".parse::<PValueMethod>(),
            Err(AnnotationError::InvalidArgument(_))
        ));
        assert!(matches!(
            AnnotatorConfig::from_json(r#"{"scoring_method": "rank"}"#),
            Err(AnnotationError::InvalidArgument(_))
        ));
    }
}

#[cfg(not(feature = "point-annotator"))]
mod without_backend {
    use ndarray::array;
    use single_annotation::{AnnotationError, Annotator, AnnotatorConfig, ExpressionMatrix, MarkerTable};

    #[test]
    fn test_default_annotator_without_backend() {
        let expression = ExpressionMatrix::new(
            array![[9.0, 3.0], [0.0, 1.0]],
            vec!["cell1".into(), "cell2".into()],
            vec!["CD3E".into(), "LYZ".into()],
        )
        .unwrap();
        let markers = MarkerTable::from_pairs([("CD3E", "T cells")]);

        let err = Annotator::default()
            .annotate(&expression, &markers, &AnnotatorConfig::default())
            .unwrap_err();
        assert!(matches!(err, AnnotationError::DependencyMissing { .. }));
        assert!(err.to_string().contains("point-annotator"));
    }
}
