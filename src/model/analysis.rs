use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisScores {
    /// Overall fit in `[0, 100]`.
    pub overall: f64,
    pub skills: f64,
    pub experience: f64,
    /// Normalized semantic similarity in `[0, 100]`, when an embedding comparison was made.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic: Option<f64>,
}

/// A compatibility report for one (user, job) pair.
///
/// Overwritten on re-analysis and dropped when the user's profile changes materially.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityAnalysis {
    pub user_id: String,
    pub job_id: String,
    pub scores: AnalysisScores,
    #[serde(default)]
    pub matched_skills: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
    pub reasoning: String,
    pub analyzed_at: DateTime<Utc>,
}
