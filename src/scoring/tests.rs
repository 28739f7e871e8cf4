use super::*;

fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

mod cosine_tests {
    use super::*;

    #[test]
    fn test_orthogonal_vectors() {
        let score = cosine_similarity(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]).unwrap();
        assert!(approx_eq(score, 0.0, 1e-12));
    }

    #[test]
    fn test_identical_vectors() {
        let v = [0.3f32, -1.2, 5.0, 0.0, 42.5];
        let score = cosine_similarity(&v, &v).unwrap();
        assert!(approx_eq(score, 1.0, 1e-12));

        assert_eq!(cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0, 0.0]).unwrap(), 1.0);
    }

    #[test]
    fn test_opposite_vectors() {
        let score = cosine_similarity(&[1.0, 2.0, 3.0], &[-1.0, -2.0, -3.0]).unwrap();
        assert!(approx_eq(score, -1.0, 1e-12));
    }

    #[test]
    fn test_magnitude_independent() {
        let a = cosine_similarity(&[1.0, 2.0], &[2.0, 1.0]).unwrap();
        let b = cosine_similarity(&[10.0, 20.0], &[0.2, 0.1]).unwrap();
        assert!(approx_eq(a, b, 1e-12));
    }

    #[test]
    fn test_symmetry() {
        let pairs: [(&[f32], &[f32]); 3] = [
            (&[0.1, 0.7, -0.3], &[0.9, -0.2, 0.4]),
            (&[1e-20, 3.0, 7.5], &[2.0, 1e20, -4.0]),
            (&[5.0, 5.0, 5.0], &[0.0, 0.0, 1.0]),
        ];
        for (a, b) in pairs {
            assert_eq!(
                cosine_similarity(a, b).unwrap(),
                cosine_similarity(b, a).unwrap()
            );
        }
    }

    #[test]
    fn test_range_under_huge_magnitudes() {
        let huge = [f32::MAX, f32::MAX, -f32::MAX];
        let other = [f32::MAX, -f32::MAX, f32::MAX];

        let score = cosine_similarity(&huge, &other).unwrap();
        assert!(score.is_finite());
        assert!((-1.0..=1.0).contains(&score));

        let self_score = cosine_similarity(&huge, &huge).unwrap();
        assert!(approx_eq(self_score, 1.0, 1e-12));
    }

    #[test]
    fn test_range_under_tiny_magnitudes() {
        let tiny = [1e-40f32, 1e-40, 0.0];
        let other = [1e-40f32, 0.0, 1e-40];

        let score = cosine_similarity(&tiny, &other).unwrap();
        assert!(score.is_finite());
        assert!(approx_eq(score, 0.5, 1e-6));
    }

    #[test]
    fn test_dimension_mismatch_767_vs_768() {
        let a = vec![0.5f32; 767];
        let b = vec![0.5f32; 768];

        assert_eq!(
            cosine_similarity(&a, &b),
            Err(ScoringError::DimensionMismatch {
                expected: 767,
                actual: 768
            })
        );
    }

    #[test]
    fn test_empty_vector_is_invalid() {
        assert!(matches!(
            cosine_similarity(&[], &[]),
            Err(ScoringError::InvalidVector { .. })
        ));
        assert!(matches!(
            cosine_similarity(&[1.0], &[]),
            Err(ScoringError::InvalidVector { .. })
        ));
    }

    #[test]
    fn test_non_finite_elements_are_invalid() {
        assert!(matches!(
            cosine_similarity(&[1.0, f32::NAN], &[1.0, 1.0]),
            Err(ScoringError::InvalidVector { .. })
        ));
        assert!(matches!(
            cosine_similarity(&[1.0, 1.0], &[f32::INFINITY, 1.0]),
            Err(ScoringError::InvalidVector { .. })
        ));
    }

    #[test]
    fn test_zero_vector() {
        assert_eq!(
            cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]),
            Err(ScoringError::ZeroVector)
        );
        assert_eq!(
            cosine_similarity(&[1.0, 1.0], &[0.0, 0.0]),
            Err(ScoringError::ZeroVector)
        );
    }
}

mod ranking_tests {
    use super::*;

    #[test]
    fn test_rank_high_medium_low() {
        let candidates = vec![
            SimilarityCandidate::new("low", "low", vec![0.0, 0.0, 1.0]),
            SimilarityCandidate::new("high", "high", vec![0.9, 0.1, 0.0]),
            SimilarityCandidate::new("medium", "medium", vec![0.5, 0.5, 0.0]),
        ];

        let ranked = rank_by_similarity(&[1.0, 0.0, 0.0], candidates).unwrap();
        let order: Vec<_> = ranked.iter().map(|r| r.item).collect();

        assert_eq!(order, vec!["high", "medium", "low"]);
        assert!(ranked[0].semantic_score > ranked[1].semantic_score);
        assert!(ranked[1].semantic_score > ranked[2].semantic_score);
    }

    #[test]
    fn test_orthogonal_normalizes_to_fifty() {
        let candidates = vec![SimilarityCandidate::new("b", (), vec![0.0, 1.0, 0.0])];

        let ranked = rank_by_similarity(&[1.0, 0.0, 0.0], candidates).unwrap();

        assert!(approx_eq(ranked[0].semantic_score, 0.0, 1e-12));
        assert!(approx_eq(ranked[0].normalized_score, 50.0, 1e-9));
        assert!(ranked[0].keyword_score.is_none());
        assert!(ranked[0].combined_score.is_none());
    }

    #[test]
    fn test_normalized_score_bounds() {
        let candidates = vec![
            SimilarityCandidate::new("same", (), vec![1.0, 0.0]),
            SimilarityCandidate::new("opposite", (), vec![-1.0, 0.0]),
        ];

        let ranked = rank_by_similarity(&[1.0, 0.0], candidates).unwrap();

        assert!(approx_eq(ranked[0].normalized_score, 100.0, 1e-9));
        assert!(approx_eq(ranked[1].normalized_score, 0.0, 1e-9));
    }

    #[test]
    fn test_empty_candidates_returns_empty() {
        let ranked = rank_by_similarity::<()>(&[1.0, 0.0], Vec::new()).unwrap();
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_empty_query_is_invalid_input() {
        let candidates = vec![SimilarityCandidate::new("a", (), vec![1.0])];
        assert!(matches!(
            rank_by_similarity(&[], candidates),
            Err(ScoringError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_ties_keep_input_order() {
        let candidates = vec![
            SimilarityCandidate::new("first", 1, vec![0.0, 1.0]),
            SimilarityCandidate::new("second", 2, vec![0.0, 2.0]),
            SimilarityCandidate::new("best", 3, vec![1.0, 0.0]),
            SimilarityCandidate::new("third", 4, vec![0.0, 3.0]),
        ];

        let ranked = rank_by_similarity(&[1.0, 0.0], candidates).unwrap();
        let ids: Vec<_> = ranked.iter().map(|r| r.id.as_str()).collect();

        assert_eq!(ids, vec!["best", "first", "second", "third"]);
    }

    #[test]
    fn test_mismatched_candidate_fails_fast_with_identity() {
        let candidates = vec![
            SimilarityCandidate::new("ok", (), vec![1.0, 0.0, 0.0]),
            SimilarityCandidate::new("broken", (), vec![1.0, 0.0]),
        ];

        let err = rank_by_similarity(&[1.0, 0.0, 0.0], candidates).unwrap_err();
        match err {
            ScoringError::Candidate { id, source } => {
                assert_eq!(id, "broken");
                assert!(matches!(*source, ScoringError::DimensionMismatch { .. }));
            }
            other => panic!("expected candidate error, got {other:?}"),
        }
    }

    #[test]
    fn test_candidate_error_is_data_integrity() {
        let err = ScoringError::Candidate {
            id: "x".to_string(),
            source: Box::new(ScoringError::ZeroVector),
        };
        assert!(err.is_data_integrity());
        assert!(
            !ScoringError::InvalidInput {
                reason: "x".to_string()
            }
            .is_data_integrity()
        );
    }

    #[test]
    fn test_zero_query_vector_rejected() {
        let candidates = vec![SimilarityCandidate::new("a", (), vec![1.0, 0.0])];
        assert_eq!(
            rank_by_similarity(&[0.0, 0.0], candidates),
            Err(ScoringError::ZeroVector)
        );
    }

    #[test]
    fn test_ranked_result_with_keyword_score() {
        let candidates = vec![SimilarityCandidate::new("a", (), vec![1.0, 0.0])];
        let ranked = rank_by_similarity(&[1.0, 0.0], candidates).unwrap();

        let blended = ranked
            .into_iter()
            .next()
            .unwrap()
            .with_keyword_score(0.0)
            .unwrap();

        assert_eq!(blended.keyword_score, Some(0.0));
        assert_eq!(blended.combined_score, Some(70.0));
        assert_eq!(blended.display_score(), 70.0);
    }
}

mod hybrid_tests {
    use super::*;

    #[test]
    fn test_pure_semantic() {
        assert_eq!(hybrid_score(1.0, 0.0).unwrap(), 70.0);
    }

    #[test]
    fn test_pure_keyword() {
        assert_eq!(hybrid_score(0.0, 100.0).unwrap(), 30.0);
    }

    #[test]
    fn test_extremes() {
        assert_eq!(hybrid_score(1.0, 100.0).unwrap(), 100.0);
        assert_eq!(hybrid_score(0.0, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_rounds_to_two_decimals() {
        let score = hybrid_score(0.123456, 45.6789).unwrap();
        assert_eq!(score, 22.35);
    }

    #[test]
    fn test_out_of_range_inputs() {
        assert!(matches!(
            hybrid_score(1.01, 0.0),
            Err(ScoringError::OutOfRange { .. })
        ));
        assert!(matches!(
            hybrid_score(-0.01, 0.0),
            Err(ScoringError::OutOfRange { .. })
        ));
        assert!(matches!(
            hybrid_score(0.5, 100.5),
            Err(ScoringError::OutOfRange { .. })
        ));
        assert!(matches!(
            hybrid_score(f64::NAN, 10.0),
            Err(ScoringError::OutOfRange { .. })
        ));
        assert!(matches!(
            hybrid_score(0.5, f64::INFINITY),
            Err(ScoringError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_range_over_grid() {
        for s in 0..=10 {
            for k in 0..=10 {
                let score = hybrid_score(s as f64 / 10.0, k as f64 * 10.0).unwrap();
                assert!((0.0..=100.0).contains(&score));
            }
        }
    }

    #[test]
    fn test_weighted_variant() {
        let even = HybridWeights::new(0.5, 0.5).unwrap();
        assert_eq!(hybrid_score_weighted(1.0, 0.0, even).unwrap(), 50.0);
        assert_eq!(hybrid_score_weighted(0.0, 100.0, even).unwrap(), 50.0);

        let keyword_only = HybridWeights::new(0.0, 1.0).unwrap();
        assert_eq!(hybrid_score_weighted(1.0, 42.0, keyword_only).unwrap(), 42.0);
    }

    #[test]
    fn test_weights_validation() {
        assert!(HybridWeights::default().validate().is_ok());
        assert!(HybridWeights::new(0.8, 0.3).is_err());
        assert!(HybridWeights::new(-0.1, 1.1).is_err());
        assert!(HybridWeights::new(f64::NAN, 0.5).is_err());
    }

    #[test]
    fn test_default_weights_match_fixed_constants() {
        let weights = HybridWeights::default();
        assert_eq!(weights.semantic, 0.7);
        assert_eq!(weights.keyword, 0.3);
        assert_eq!(
            hybrid_score(0.42, 17.0).unwrap(),
            hybrid_score_weighted(0.42, 17.0, weights).unwrap()
        );
    }
}
