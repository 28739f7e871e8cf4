use super::*;
use crate::constants::{EMBEDDING_DIM, EMBEDDING_F32_BYTES};
use crate::model::{CandidateProfile, JobRecord, JobSource, WorkExperience};

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;

fn fast_config() -> GeneratorConfig {
    GeneratorConfig::default().with_retry_base(Duration::from_millis(1))
}

fn generator_with(provider: Arc<MockEmbeddingProvider>) -> EmbeddingGenerator<Arc<MockEmbeddingProvider>> {
    EmbeddingGenerator::new(provider, fast_config()).unwrap()
}

mod vector_tests {
    use super::*;

    #[test]
    fn test_try_new_accepts_expected_dimension() {
        let v = EmbeddingVector::try_new(MockEmbeddingProvider::vector_for("rust")).unwrap();
        assert_eq!(v.len(), EMBEDDING_DIM);
        assert!(!v.is_empty());
    }

    #[test]
    fn test_try_new_rejects_wrong_dimension() {
        let err = EmbeddingVector::try_new(vec![0.1; 767]).unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::DimensionMismatch {
                expected: 768,
                actual: 767
            }
        ));
        assert!(err.is_data_integrity());
    }

    #[test]
    fn test_try_new_rejects_non_finite_and_zero() {
        let mut values = vec![0.1; EMBEDDING_DIM];
        values[10] = f32::NAN;
        assert!(matches!(
            EmbeddingVector::try_new(values),
            Err(EmbeddingError::InvalidVector { .. })
        ));

        assert!(matches!(
            EmbeddingVector::try_new(vec![0.0; EMBEDDING_DIM]),
            Err(EmbeddingError::InvalidVector { .. })
        ));
    }

    #[test]
    fn test_le_bytes_layout() {
        let mut values = vec![0.0; EMBEDDING_DIM];
        values[0] = 1.0;
        values[EMBEDDING_DIM - 1] = -2.5;
        let v = EmbeddingVector::try_new(values).unwrap();

        let bytes = v.to_le_bytes();
        assert_eq!(bytes.len(), EMBEDDING_F32_BYTES);
        assert_eq!(&bytes[0..4], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[EMBEDDING_F32_BYTES - 4..], &(-2.5f32).to_le_bytes());

        assert_eq!(EmbeddingVector::from_le_bytes(&bytes).unwrap(), v);
    }

    #[test]
    fn test_from_le_bytes_rejects_bad_length() {
        let err = EmbeddingVector::from_le_bytes(&[0u8; 12]).unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::InvalidBytes {
                expected: EMBEDDING_F32_BYTES,
                actual: 12
            }
        ));
    }

    #[test]
    fn test_deserialize_validates_length() {
        let short = serde_json::to_string(&vec![0.5f32; 4]).unwrap();
        assert!(serde_json::from_str::<EmbeddingVector>(&short).is_err());

        let ok = serde_json::to_string(&MockEmbeddingProvider::vector_for("x")).unwrap();
        let v: EmbeddingVector = serde_json::from_str(&ok).unwrap();
        assert_eq!(v.len(), EMBEDDING_DIM);
    }
}

mod generator_tests {
    use super::*;

    #[tokio::test]
    async fn test_generate_success_is_deterministic() {
        let provider = Arc::new(MockEmbeddingProvider::new());
        let generator = generator_with(provider.clone());

        let a = generator.generate("Senior Rust Engineer").await.unwrap();
        let b = generator.generate("Senior Rust Engineer").await.unwrap();

        assert_eq!(a.len(), EMBEDDING_DIM);
        assert_eq!(a, b);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_input_rejected_without_calling_provider() {
        let provider = Arc::new(MockEmbeddingProvider::new());
        let generator = generator_with(provider.clone());

        assert!(matches!(
            generator.generate("").await,
            Err(EmbeddingError::EmptyInput)
        ));
        assert!(matches!(
            generator.generate("  \n\t ").await,
            Err(EmbeddingError::EmptyInput)
        ));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_retries_then_succeeds() {
        let provider = Arc::new(MockEmbeddingProvider::new());
        provider.fail_first(2);
        let generator = generator_with(provider.clone());

        let v = generator.generate("backend engineer").await.unwrap();

        assert_eq!(v.len(), EMBEDDING_DIM);
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries_carry_last_error() {
        let provider = Arc::new(MockEmbeddingProvider::new());
        provider.fail_always();
        let generator = generator_with(provider.clone());

        let err = generator.generate("backend engineer").await.unwrap_err();

        match err {
            EmbeddingError::GenerationFailed { attempts, source } => {
                assert_eq!(attempts, 3);
                assert!(matches!(source, ProviderError::Unavailable { .. }));
            }
            other => panic!("expected GenerationFailed, got {other:?}"),
        }
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let provider = Arc::new(MockEmbeddingProvider::new());
        provider.fail_with(
            5,
            ProviderError::Status {
                status: 401,
                body: "bad key".to_string(),
            },
        );
        let generator = generator_with(provider.clone());

        let err = generator.generate("backend engineer").await.unwrap_err();

        assert!(matches!(
            err,
            EmbeddingError::GenerationFailed { attempts: 1, .. }
        ));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried() {
        let provider = Arc::new(MockEmbeddingProvider::new());
        provider.fail_with(
            1,
            ProviderError::Status {
                status: 429,
                body: "slow down".to_string(),
            },
        );
        let generator = generator_with(provider.clone());

        assert!(generator.generate("backend engineer").await.is_ok());
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_hard_failure() {
        let provider = Arc::new(MockEmbeddingProvider::new());
        provider.set_dimension(767);
        let generator = generator_with(provider.clone());

        let err = generator.generate("backend engineer").await.unwrap_err();

        assert!(matches!(
            err,
            EmbeddingError::DimensionMismatch {
                expected: 768,
                actual: 767
            }
        ));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_non_finite_output_rejected() {
        let provider = Arc::new(MockEmbeddingProvider::new());
        let mut bad = vec![0.1; EMBEDDING_DIM];
        bad[3] = f32::INFINITY;
        provider.set_fixed("poisoned", bad);
        let generator = generator_with(provider);

        assert!(matches!(
            generator.generate("poisoned").await,
            Err(EmbeddingError::InvalidVector { .. })
        ));
    }

    #[tokio::test]
    async fn test_input_truncated_at_char_ceiling() {
        let provider = Arc::new(MockEmbeddingProvider::new());
        let generator = EmbeddingGenerator::new(
            provider.clone(),
            fast_config().with_max_input_chars(10),
        )
        .unwrap();

        let text = "é".repeat(50);
        generator.generate(&text).await.unwrap();

        assert_eq!(provider.last_input_chars(), Some(10));
    }

    #[tokio::test]
    async fn test_short_input_not_truncated() {
        let provider = Arc::new(MockEmbeddingProvider::new());
        let generator = generator_with(provider.clone());

        generator.generate("short").await.unwrap();

        assert_eq!(provider.last_input_chars(), Some(5));
    }

    #[tokio::test]
    async fn test_cancelled_token_skips_provider() {
        let provider = Arc::new(MockEmbeddingProvider::new());
        let generator = generator_with(provider.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = generator.generate_cancellable("engineer", &cancel).await;

        assert!(matches!(result, Err(EmbeddingError::Cancelled)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_aborts_in_flight_call() {
        let provider = Arc::new(MockEmbeddingProvider::new());
        provider.set_delay(Duration::from_secs(60));
        let generator = generator_with(provider.clone());
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result = generator.generate_cancellable("engineer", &cancel).await;

        assert!(matches!(result, Err(EmbeddingError::Cancelled)));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_cancel_aborts_backoff() {
        let provider = Arc::new(MockEmbeddingProvider::new());
        provider.fail_always();
        let generator = EmbeddingGenerator::new(
            provider.clone(),
            GeneratorConfig::default().with_retry_base(Duration::from_secs(60)),
        )
        .unwrap();
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result = generator.generate_cancellable("engineer", &cancel).await;

        assert!(matches!(result, Err(EmbeddingError::Cancelled)));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_caller_deadline_bounds_generation() {
        let provider = Arc::new(MockEmbeddingProvider::new());
        provider.set_delay(Duration::from_secs(60));
        let generator = generator_with(provider);

        let result =
            tokio::time::timeout(Duration::from_millis(20), generator.generate("engineer")).await;

        assert!(result.is_err());
    }

    #[test]
    fn test_backoff_doubles() {
        let generator = EmbeddingGenerator::new(
            MockEmbeddingProvider::new(),
            GeneratorConfig::default(),
        )
        .unwrap();

        assert_eq!(generator.backoff(1), Duration::from_millis(500));
        assert_eq!(generator.backoff(2), Duration::from_millis(1000));
        assert_eq!(generator.backoff(3), Duration::from_millis(2000));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = EmbeddingGenerator::new(
            MockEmbeddingProvider::new(),
            GeneratorConfig::default().with_max_attempts(0),
        );
        assert!(matches!(result, Err(EmbeddingError::InvalidConfig { .. })));

        let result = EmbeddingGenerator::new(
            MockEmbeddingProvider::new(),
            GeneratorConfig::default().with_max_input_chars(0),
        );
        assert!(matches!(result, Err(EmbeddingError::InvalidConfig { .. })));
    }
}

mod provider_tests {
    use super::*;

    #[test]
    fn test_provider_config_endpoint() {
        let config = ProviderConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.endpoint(), "http://localhost:8080/v1/embeddings");
    }

    #[test]
    fn test_provider_config_debug_redacts_key() {
        let config = ProviderConfig {
            api_key: Some("sk-secret".to_string()),
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_http_provider_requires_model() {
        let config = ProviderConfig {
            model: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            HttpEmbeddingProvider::new(&config),
            Err(EmbeddingError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_http_provider_builds_without_key() {
        let provider = HttpEmbeddingProvider::new(&ProviderConfig::default()).unwrap();
        assert_eq!(provider.endpoint(), "https://api.openai.com/v1/embeddings");
    }

    #[test]
    fn test_retryable_classification() {
        let status = |status| ProviderError::Status {
            status,
            body: String::new(),
        };
        assert!(status(500).is_retryable());
        assert!(status(503).is_retryable());
        assert!(status(429).is_retryable());
        assert!(status(408).is_retryable());
        assert!(!status(400).is_retryable());
        assert!(!status(401).is_retryable());
        assert!(ProviderError::EmptyResponse.is_retryable());
    }
}

mod text_tests {
    use super::*;

    fn job() -> JobRecord {
        JobRecord::new(
            "job-1",
            "user-1",
            "Senior Rust Engineer",
            "Acme Inc",
            "Remote",
            JobSource::Linkedin,
        )
        .with_description("Build async services.")
        .with_skills(["Rust", "Tokio"], ["Kubernetes"])
    }

    fn date(y: i32, m: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, 1)
    }

    #[test]
    fn test_job_text_field_order() {
        let text = build_job_text(&job()).unwrap();
        assert_eq!(
            text,
            "Senior Rust Engineer\nAcme Inc\nBuild async services.\n\
             Required skills: Rust, Tokio\nPreferred skills: Kubernetes"
        );
    }

    #[test]
    fn test_job_text_skips_empty_fields() {
        let mut job = job();
        job.company = "   ".to_string();
        job.description.clear();
        job.preferred_skills = vec!["".to_string()];

        let text = build_job_text(&job).unwrap();
        assert_eq!(text, "Senior Rust Engineer\nRequired skills: Rust, Tokio");
    }

    #[test]
    fn test_job_text_is_deterministic() {
        assert_eq!(build_job_text(&job()).unwrap(), build_job_text(&job()).unwrap());
    }

    #[test]
    fn test_empty_job_is_insufficient() {
        let job = JobRecord::new("j", "u", " ", "", "Remote", JobSource::Manual);
        assert!(matches!(
            build_job_text(&job),
            Err(EmbeddingError::InsufficientData { subject: "job" })
        ));
    }

    #[test]
    fn test_profile_text_orders_experience_by_recency() {
        let profile = CandidateProfile::new("user-1")
            .with_headline("Backend engineer")
            .with_experience(
                WorkExperience::new("Junior Dev", "Initech").with_dates(date(2015, 1), date(2017, 6)),
            )
            .with_experience(
                WorkExperience::new("Staff Engineer", "Globex")
                    .with_description("Led the platform team")
                    .with_dates(date(2021, 3), None),
            )
            .with_experience(
                WorkExperience::new("Engineer", "Hooli").with_dates(date(2017, 7), date(2021, 2)),
            )
            .with_skills(["Rust", "SQL"]);

        let text = build_profile_text(&profile).unwrap();
        assert_eq!(
            text,
            "Backend engineer\n\
             Staff Engineer at Globex: Led the platform team\n\
             Engineer at Hooli\n\
             Junior Dev at Initech\n\
             Skills: Rust, SQL"
        );
    }

    #[test]
    fn test_profile_with_only_skills_is_enough() {
        let profile = CandidateProfile::new("user-1").with_skills(["Go"]);
        assert_eq!(build_profile_text(&profile).unwrap(), "Skills: Go");
    }

    #[test]
    fn test_empty_profile_is_insufficient() {
        let profile = CandidateProfile::new("user-1")
            .with_summary("  ")
            .with_experience(WorkExperience::default());

        assert!(matches!(
            build_profile_text(&profile),
            Err(EmbeddingError::InsufficientData { subject: "profile" })
        ));
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        use super::super::generator::truncate_chars;

        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 3), "abc");
    }
}
