use serde::{Deserialize, Serialize};

/// One keyword match. `rank` is the 0-based position in the index's relevance order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordHit {
    pub job_id: String,
    pub rank: usize,
}

impl KeywordHit {
    /// `1 / (1 + rank)`: the best match scores 1.0.
    pub fn normalized_score(&self) -> f64 {
        1.0 / (1.0 + self.rank as f64)
    }
}

/// Which result sets a merged hit appeared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSources {
    Keyword,
    Semantic,
    Both,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridHit {
    pub job_id: String,
    /// `[0, 1]`; zero when the job was not a keyword match.
    pub keyword_score: f64,
    /// Cosine similarity mapped to `[0, 1]`; zero when the job was not a semantic match.
    pub semantic_score: f64,
    pub combined_score: f64,
    pub sources: MatchSources,
}

/// The source that failed when a search ran in degraded mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradedSource {
    Keyword,
    Semantic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridSearchResponse {
    pub hits: Vec<HybridHit>,
    /// Set when one source failed and `hits` come from the other alone.
    pub degraded: Option<DegradedSource>,
}

impl HybridSearchResponse {
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }

    pub fn job_ids(&self) -> Vec<&str> {
        self.hits.iter().map(|h| h.job_id.as_str()).collect()
    }
}
