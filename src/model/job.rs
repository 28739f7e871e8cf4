use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a job listing was scraped or entered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobSource {
    Linkedin,
    Indeed,
    Manual,
}

impl JobSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobSource::Linkedin => "linkedin",
            JobSource::Indeed => "indeed",
            JobSource::Manual => "manual",
        }
    }
}

impl std::fmt::Display for JobSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: Option<u64>,
    pub max: Option<u64>,
    pub currency: String,
}

/// A single ingested job listing, scoped to the user who saved or scraped it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub source: JobSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<SalaryRange>,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub preferred_skills: Vec<String>,
    /// `None` while the record is itself canonical; otherwise the id of the first-seen
    /// record for the same real-world job.
    #[serde(default)]
    pub canonical_id: Option<String>,
}

impl JobRecord {
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        title: impl Into<String>,
        company: impl Into<String>,
        location: impl Into<String>,
        source: JobSource,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            title: title.into(),
            company: company.into(),
            location: location.into(),
            description: String::new(),
            source,
            salary: None,
            required_skills: Vec::new(),
            preferred_skills: Vec::new(),
            canonical_id: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_skills<R, P>(mut self, required: R, preferred: P) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        self.required_skills = required.into_iter().map(Into::into).collect();
        self.preferred_skills = preferred.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_salary(mut self, salary: SalaryRange) -> Self {
        self.salary = Some(salary);
        self
    }

    /// Id of the canonical record this job resolves to (itself when canonical).
    pub fn canonical_or_self(&self) -> &str {
        self.canonical_id.as_deref().unwrap_or(&self.id)
    }

    pub fn is_canonical(&self) -> bool {
        self.canonical_id.is_none()
    }
}

/// One row per distinct real-world job, keyed by its identity hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalJobMetadata {
    pub identity_hash: String,
    pub canonical_job_id: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    /// Number of ingested records (the canonical one included) linked to this job.
    pub duplicate_count: u64,
}
