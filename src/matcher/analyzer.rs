//! Compatibility analysis between a candidate profile and one job.

use std::collections::HashSet;
use std::future::Future;

use chrono::Utc;
use thiserror::Error;
use tracing::debug;

use crate::model::{AnalysisScores, CandidateProfile, CompatibilityAnalysis, JobRecord};
use crate::scoring::hybrid::round2;
use crate::search::keyword::query_terms;

/// The analyzer could not produce a report (model outage, malformed reply, ...).
#[derive(Debug, Error)]
#[error("compatibility analysis failed: {reason}")]
pub struct AnalysisError {
    pub reason: String,
}

impl AnalysisError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Produces a [`CompatibilityAnalysis`] for a (profile, job) pair.
///
/// An LLM-backed implementation lives outside this crate; [`SkillGapAnalyzer`] is the
/// deterministic fallback.
pub trait CompatibilityAnalyzer: Send + Sync {
    fn analyze(
        &self,
        profile: &CandidateProfile,
        job: &JobRecord,
    ) -> impl Future<Output = Result<CompatibilityAnalysis, AnalysisError>> + Send;
}

const SKILLS_WEIGHT: f64 = 0.6;
const EXPERIENCE_WEIGHT: f64 = 0.4;
/// Skill score when the job lists no skills at all.
const NEUTRAL_SKILL_SCORE: f64 = 50.0;

/// Scores skill coverage and title overlap without calling a model.
///
/// Required skills count twice as much as preferred ones. Matching ignores case and
/// surrounding whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkillGapAnalyzer;

impl SkillGapAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, profile: &CandidateProfile, job: &JobRecord) -> CompatibilityAnalysis {
        let owned: HashSet<String> = profile
            .skills
            .iter()
            .map(|s| normalize_skill(s))
            .filter(|s| !s.is_empty())
            .collect();

        let (required_matched, missing_skills) = partition_skills(&job.required_skills, &owned);
        let (preferred_matched, _) = partition_skills(&job.preferred_skills, &owned);

        let required_total = count_listed(&job.required_skills);
        let preferred_total = count_listed(&job.preferred_skills);
        let skills = skill_score(
            required_matched.len(),
            required_total,
            preferred_matched.len(),
            preferred_total,
        );
        let experience = experience_score(profile, job);
        let overall = round2(SKILLS_WEIGHT * skills + EXPERIENCE_WEIGHT * experience);

        let reasoning = format!(
            "Matches {} of {} required and {} of {} preferred skills; title overlap {:.0}%.",
            required_matched.len(),
            required_total,
            preferred_matched.len(),
            preferred_total,
            experience,
        );

        let mut matched_skills = required_matched;
        matched_skills.extend(preferred_matched);

        debug!(
            user_id = %profile.user_id,
            job_id = %job.id,
            overall,
            missing = missing_skills.len(),
            "Skill gap analysis"
        );

        CompatibilityAnalysis {
            user_id: profile.user_id.clone(),
            job_id: job.id.clone(),
            scores: AnalysisScores {
                overall,
                skills: round2(skills),
                experience: round2(experience),
                semantic: None,
            },
            matched_skills,
            missing_skills,
            reasoning,
            analyzed_at: Utc::now(),
        }
    }
}

impl CompatibilityAnalyzer for SkillGapAnalyzer {
    async fn analyze(
        &self,
        profile: &CandidateProfile,
        job: &JobRecord,
    ) -> Result<CompatibilityAnalysis, AnalysisError> {
        Ok(self.evaluate(profile, job))
    }
}

fn normalize_skill(skill: &str) -> String {
    skill.trim().to_lowercase()
}

fn count_listed(skills: &[String]) -> usize {
    skills.iter().filter(|s| !s.trim().is_empty()).count()
}

/// Splits the job's listed skills into (matched, missing), keeping the job's spelling.
fn partition_skills(listed: &[String], owned: &HashSet<String>) -> (Vec<String>, Vec<String>) {
    listed
        .iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().to_string())
        .partition(|s| owned.contains(&normalize_skill(s)))
}

fn skill_score(
    required_matched: usize,
    required_total: usize,
    preferred_matched: usize,
    preferred_total: usize,
) -> f64 {
    let denominator = 2 * required_total + preferred_total;
    if denominator == 0 {
        return NEUTRAL_SKILL_SCORE;
    }
    let numerator = 2 * required_matched + preferred_matched;
    numerator as f64 / denominator as f64 * 100.0
}

/// Share of the job title's terms that appear in the candidate's headline or past titles.
fn experience_score(profile: &CandidateProfile, job: &JobRecord) -> f64 {
    let title_terms: HashSet<String> = query_terms(&job.title).into_iter().collect();
    if title_terms.is_empty() {
        return 0.0;
    }

    let mut known: HashSet<String> = query_terms(&profile.headline).into_iter().collect();
    for experience in &profile.experiences {
        known.extend(query_terms(&experience.title));
    }

    let overlap = title_terms.iter().filter(|t| known.contains(*t)).count();
    overlap as f64 / title_terms.len() as f64 * 100.0
}
