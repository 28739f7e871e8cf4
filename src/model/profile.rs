use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkExperience {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_current: bool,
}

impl WorkExperience {
    pub fn new(title: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self.is_current = end.is_none() && start.is_some();
        self
    }

    /// True for the role the candidate still holds.
    pub fn is_ongoing(&self) -> bool {
        self.is_current || (self.start_date.is_some() && self.end_date.is_none())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub user_id: String,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub experiences: Vec<WorkExperience>,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl CandidateProfile {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    pub fn with_headline(mut self, headline: impl Into<String>) -> Self {
        self.headline = headline.into();
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_experience(mut self, experience: WorkExperience) -> Self {
        self.experiences.push(experience);
        self
    }

    pub fn with_skills<I>(mut self, skills: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }
}

/// Kind of profile edit reported by the surrounding product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileChange {
    WorkExperience,
    Skills,
    Education,
    ResumeUpload,
    Headline,
    Summary,
    ContactInfo,
}

impl ProfileChange {
    /// Material changes invalidate every cached compatibility analysis for the user.
    pub fn is_material(&self) -> bool {
        matches!(
            self,
            ProfileChange::WorkExperience
                | ProfileChange::Skills
                | ProfileChange::Education
                | ProfileChange::ResumeUpload
        )
    }
}
