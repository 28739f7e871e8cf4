//! End-to-end engine tests against a real SQLite database.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use jobmatch::{
    BuildError, Config, ConfigError, ErrorKind, HybridWeights, MockVectorIndex, ProfileChange,
    SkillGapAnalyzer, build_engine, identify,
};

use common::fixtures::{UnreachableAnalyzer, job, open_engine, profile, provider};

#[tokio::test]
async fn test_ingest_then_hybrid_search() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let engine = open_engine(&dir.path().join("jm.db"), Arc::new(MockVectorIndex::default()))?;

    for record in [
        job("a1", "alice", "Rust Engineer", "Acme"),
        job("a2", "alice", "Frontend Developer", "Globex"),
        job("a3", "alice", "rust engineer", "ACME"),
        job("b1", "bob", "Rust Engineer", "Initech"),
    ] {
        engine.ingest_job(record).await?.wait_indexed().await?;
    }

    // a3 duplicates a1, so only three jobs were embedded.
    assert_eq!(provider(&engine).call_count(), 3);
    assert_eq!(engine.vector_index().point_count(), 3);

    let response = engine
        .hybrid_search("rust engineer", "alice", 10, HybridWeights::default())
        .await?;

    assert!(!response.is_degraded());
    let ids: HashSet<&str> = response.job_ids().into_iter().collect();
    assert!(ids.contains("a1"));
    assert!(ids.contains("a3"), "duplicates stay keyword-searchable");
    assert!(!ids.contains("b1"));
    Ok(())
}

#[tokio::test]
async fn test_state_survives_restart() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("jm.db");
    let vectors = Arc::new(MockVectorIndex::default());
    let alice = profile("alice");
    let first_job = job("job-1", "alice", "Rust Engineer", "Acme");

    {
        let engine = open_engine(&path, Arc::clone(&vectors))?;
        engine.ingest_job(first_job.clone()).await?.wait_indexed().await?;
        engine.profile_embedding(&alice).await?;
        engine
            .compatibility(&alice, &first_job, &SkillGapAnalyzer::new())
            .await?;
    }

    let engine = open_engine(&path, Arc::clone(&vectors))?;

    let report = engine
        .ingest_job(job("job-2", "alice", " Rust  Engineer ", "acme"))
        .await?;
    assert!(!report.outcome.is_new_canonical);
    assert_eq!(report.outcome.duplicate_count, 2);
    assert_eq!(report.job.canonical_id.as_deref(), Some("job-1"));
    assert_eq!(report.job.canonical_or_self(), "job-1");

    engine.profile_embedding(&alice).await?;
    assert_eq!(provider(&engine).call_count(), 0, "embedding came from tier 2");

    let analysis = engine
        .compatibility(&alice, &first_job, &UnreachableAnalyzer)
        .await?;
    assert_eq!(analysis.job_id, "job-1");

    let identity = identify("Acme", "Rust Engineer", "Berlin, DE")?;
    let metadata = engine
        .dedup()
        .metadata(&identity)
        .await?
        .expect("canonical row persisted");
    assert_eq!(metadata.canonical_job_id, "job-1");
    assert_eq!(metadata.duplicate_count, 2);
    Ok(())
}

#[tokio::test]
async fn test_material_change_forces_reanalysis() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let engine = open_engine(&dir.path().join("jm.db"), Arc::new(MockVectorIndex::default()))?;
    let alice = profile("alice");
    let target = job("job-1", "alice", "Rust Engineer", "Acme");

    engine
        .compatibility(&alice, &target, &SkillGapAnalyzer::new())
        .await?;

    assert!(
        engine
            .on_profile_changed("alice", ProfileChange::ContactInfo)
            .await?
            .is_none()
    );
    engine
        .compatibility(&alice, &target, &UnreachableAnalyzer)
        .await?;

    let report = engine
        .on_profile_changed("alice", ProfileChange::ResumeUpload)
        .await?
        .expect("material change invalidates");
    assert_eq!(report.tier2_deleted, 1);

    let err = engine
        .compatibility(&alice, &target, &UnreachableAnalyzer)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AnalysisUnavailable);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_ingest_embeds_once() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let engine = open_engine(&dir.path().join("jm.db"), Arc::new(MockVectorIndex::default()))?;

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let engine = engine.clone();
            tokio::spawn(async move {
                engine
                    .ingest_job(job(&format!("job-{}", i), "alice", "Rust Engineer", "Acme"))
                    .await
            })
        })
        .collect();

    let mut new_canonicals = 0;
    for task in tasks {
        let report = task.await??;
        if report.outcome.is_new_canonical {
            new_canonicals += 1;
        }
        report.wait_indexed().await?;
    }

    assert_eq!(new_canonicals, 1);
    assert_eq!(provider(&engine).call_count(), 1);
    assert_eq!(engine.vector_index().point_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_build_engine_from_config() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = Config {
        database_path: dir.path().join("data").join("jobmatch.db"),
        ..Default::default()
    };

    let engine = build_engine(&config)?;
    assert!(config.database_path.exists());
    assert_eq!(engine.vector_index().collection(), "job_embeddings");

    let bad = Config {
        database_path: dir.path().to_path_buf(),
        ..Default::default()
    };
    assert!(matches!(
        build_engine(&bad),
        Err(BuildError::Config(ConfigError::NotAFile { .. }))
    ));
    Ok(())
}
