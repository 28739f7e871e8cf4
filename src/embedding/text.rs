//! Canonical text representations fed to the embedding model.
//!
//! Both builders are deterministic and order-preserving: the same record always yields
//! the same string, so the content-addressed embedding cache can deduplicate model calls.

use std::cmp::Ordering;

use crate::model::{CandidateProfile, JobRecord, WorkExperience};

use super::error::{EmbeddingError, EmbeddingResult};

/// Title, company, description, required skills and preferred skills, one per line.
pub fn build_job_text(job: &JobRecord) -> EmbeddingResult<String> {
    let mut parts: Vec<String> = Vec::with_capacity(5);
    push_trimmed(&mut parts, &job.title);
    push_trimmed(&mut parts, &job.company);
    push_trimmed(&mut parts, &job.description);
    push_list(&mut parts, "Required skills", &job.required_skills);
    push_list(&mut parts, "Preferred skills", &job.preferred_skills);

    finish(parts, "job")
}

/// Headline, summary, work history (most recent first) and skills, one per line.
pub fn build_profile_text(profile: &CandidateProfile) -> EmbeddingResult<String> {
    let mut parts: Vec<String> = Vec::new();
    push_trimmed(&mut parts, &profile.headline);
    push_trimmed(&mut parts, &profile.summary);

    for experience in by_recency(&profile.experiences) {
        if let Some(line) = experience_line(experience) {
            parts.push(line);
        }
    }

    push_list(&mut parts, "Skills", &profile.skills);

    finish(parts, "profile")
}

/// Ongoing roles first, then by end date and start date, newest first. Stable for ties.
fn by_recency(experiences: &[WorkExperience]) -> Vec<&WorkExperience> {
    let mut ordered: Vec<&WorkExperience> = experiences.iter().collect();
    ordered.sort_by(|a, b| match (a.is_ongoing(), b.is_ongoing()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => b
            .end_date
            .cmp(&a.end_date)
            .then_with(|| b.start_date.cmp(&a.start_date)),
    });
    ordered
}

fn experience_line(experience: &WorkExperience) -> Option<String> {
    let heading = [experience.title.trim(), experience.company.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" at ");
    let description = experience.description.trim();

    match (heading.is_empty(), description.is_empty()) {
        (true, true) => None,
        (false, true) => Some(heading),
        (true, false) => Some(description.to_string()),
        (false, false) => Some(format!("{}: {}", heading, description)),
    }
}

fn push_trimmed(parts: &mut Vec<String>, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        parts.push(value.to_string());
    }
}

fn push_list(parts: &mut Vec<String>, label: &str, items: &[String]) {
    let items: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if !items.is_empty() {
        parts.push(format!("{}: {}", label, items.join(", ")));
    }
}

fn finish(parts: Vec<String>, subject: &'static str) -> EmbeddingResult<String> {
    if parts.is_empty() {
        return Err(EmbeddingError::InsufficientData { subject });
    }
    Ok(parts.join("\n"))
}
