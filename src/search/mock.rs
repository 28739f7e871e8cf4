use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::model::JobRecord;

use super::error::{SearchError, SearchResult};
use super::keyword::{KeywordIndex, query_terms};
use super::types::KeywordHit;

#[derive(Debug, Clone)]
struct IndexedJob {
    user_id: String,
    terms: HashSet<String>,
}

/// In-memory [`KeywordIndex`]. Relevance is the number of distinct query terms a job
/// contains; ties break on job id.
#[derive(Debug, Default)]
pub struct MockKeywordIndex {
    jobs: Mutex<BTreeMap<String, IndexedJob>>,
    fail_searches: AtomicBool,
    fail_writes: AtomicBool,
    search_calls: AtomicUsize,
}

impl MockKeywordIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_searches(&self, fail: bool) {
        self.fail_searches.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, job_id: &str) -> bool {
        self.jobs.lock().contains_key(job_id)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

impl KeywordIndex for MockKeywordIndex {
    async fn index_job(&self, job: &JobRecord) -> SearchResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SearchError::Keyword {
                reason: "injected write failure".to_string(),
            });
        }
        let text = [
            job.title.as_str(),
            job.company.as_str(),
            job.location.as_str(),
            job.description.as_str(),
        ]
        .into_iter()
        .chain(job.required_skills.iter().map(String::as_str))
        .chain(job.preferred_skills.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ");

        self.jobs.lock().insert(
            job.id.clone(),
            IndexedJob {
                user_id: job.user_id.clone(),
                terms: query_terms(&text).into_iter().collect(),
            },
        );
        Ok(())
    }

    async fn remove_job(&self, job_id: &str) -> SearchResult<bool> {
        Ok(self.jobs.lock().remove(job_id).is_some())
    }

    async fn search(
        &self,
        query: &str,
        user_id: &str,
        limit: usize,
    ) -> SearchResult<Vec<KeywordHit>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_searches.load(Ordering::SeqCst) {
            return Err(SearchError::Keyword {
                reason: "injected failure".to_string(),
            });
        }

        let terms: HashSet<String> = query_terms(query).into_iter().collect();
        let jobs = self.jobs.lock();
        let mut scored: Vec<(usize, &String)> = jobs
            .iter()
            .filter(|(_, job)| job.user_id == user_id)
            .map(|(id, job)| (terms.intersection(&job.terms).count(), id))
            .filter(|(matches, _)| *matches > 0)
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));

        Ok(scored
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(rank, (_, id))| KeywordHit {
                job_id: id.clone(),
                rank,
            })
            .collect())
    }
}
