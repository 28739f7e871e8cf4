//! Full-text keyword index over job records.

use std::future::Future;

use rusqlite::params;
use tracing::{debug, instrument};

use crate::model::JobRecord;
use crate::storage::Database;

use super::error::SearchResult;
use super::types::KeywordHit;

/// Keyword index scoped by user. Upserts are per job id; last write wins.
pub trait KeywordIndex: Send + Sync + 'static {
    fn index_job(&self, job: &JobRecord) -> impl Future<Output = SearchResult<()>> + Send;

    fn remove_job(&self, job_id: &str) -> impl Future<Output = SearchResult<bool>> + Send;

    /// Jobs owned by `user_id` matching any term of `query`, best first.
    fn search(
        &self,
        query: &str,
        user_id: &str,
        limit: usize,
    ) -> impl Future<Output = SearchResult<Vec<KeywordHit>>> + Send;
}

/// Splits free text into terms for matching.
pub fn query_terms(query: &str) -> Vec<String> {
    query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Builds an FTS5 query of quoted terms joined with `OR`.
///
/// Terms only ever contain alphanumerics, so user input cannot reach FTS5 syntax.
/// Returns `None` when `query` has no terms.
pub fn fts_query(query: &str) -> Option<String> {
    let terms = query_terms(query);
    if terms.is_empty() {
        return None;
    }
    Some(
        terms
            .iter()
            .map(|t| format!("\"{}\"", t))
            .collect::<Vec<_>>()
            .join(" OR "),
    )
}

/// FTS5 index in the shared SQLite database, ranked by `bm25`.
#[derive(Debug, Clone)]
pub struct SqliteKeywordIndex {
    db: Database,
}

impl SqliteKeywordIndex {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl KeywordIndex for SqliteKeywordIndex {
    #[instrument(skip(self, job), fields(job_id = %job.id))]
    async fn index_job(&self, job: &JobRecord) -> SearchResult<()> {
        let job_id = job.id.clone();
        let user_id = job.user_id.clone();
        let title = job.title.clone();
        let company = job.company.clone();
        let location = job.location.clone();
        let description = job.description.clone();
        let skills = job
            .required_skills
            .iter()
            .chain(job.preferred_skills.iter())
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");

        self.db
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM job_keywords WHERE job_id = ?1", [&job_id])?;
                tx.execute(
                    "INSERT INTO job_keywords (job_id, user_id, title, company, location, description, skills)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![job_id, user_id, title, company, location, description, skills],
                )?;
                tx.commit()
            })
            .await?;
        debug!("Indexed job keywords");
        Ok(())
    }

    async fn remove_job(&self, job_id: &str) -> SearchResult<bool> {
        let job_id = job_id.to_string();
        let removed = self
            .db
            .call(move |conn| conn.execute("DELETE FROM job_keywords WHERE job_id = ?1", [&job_id]))
            .await?;
        Ok(removed > 0)
    }

    #[instrument(skip(self, query))]
    async fn search(
        &self,
        query: &str,
        user_id: &str,
        limit: usize,
    ) -> SearchResult<Vec<KeywordHit>> {
        let Some(fts) = fts_query(query) else {
            return Ok(Vec::new());
        };
        if limit == 0 {
            return Ok(Vec::new());
        }

        let user_id = user_id.to_string();
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let job_ids = self
            .db
            .call(move |conn| {
                let mut stmt = conn.prepare_cached(
                    "SELECT job_id FROM job_keywords
                     WHERE job_keywords MATCH ?1 AND user_id = ?2
                     ORDER BY bm25(job_keywords), job_id
                     LIMIT ?3",
                )?;
                let rows = stmt.query_map(params![fts, user_id, limit], |row| {
                    row.get::<_, String>(0)
                })?;
                rows.collect::<Result<Vec<_>, _>>()
            })
            .await?;

        Ok(job_ids
            .into_iter()
            .enumerate()
            .map(|(rank, job_id)| KeywordHit { job_id, rank })
            .collect())
    }
}
