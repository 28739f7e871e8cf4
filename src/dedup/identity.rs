use serde::{Deserialize, Serialize};

use crate::hashing::hash_parts;

use super::error::{DedupError, DedupResult};

/// Hex BLAKE3 digest of a job's normalized `(company, title, location)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityHash(String);

impl IdentityHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IdentityHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercases, then collapses every run of non-alphanumeric characters into one `-`
/// and strips leading and trailing separators.
pub fn normalize_field(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_sep = false;

    for c in value.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('-');
            }
            pending_sep = false;
            out.push(c);
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Identity of a real-world job. Pure; equal normalized inputs give equal hashes.
///
/// Company and title must contain at least one alphanumeric character. Location may
/// be empty (unspecified locations all normalize to the same value).
pub fn identify(company: &str, title: &str, location: &str) -> DedupResult<IdentityHash> {
    let company = normalize_field(company);
    let title = normalize_field(title);
    let location = normalize_field(location);

    if company.is_empty() {
        return Err(DedupError::InvalidInput {
            reason: "company is empty after normalization".to_string(),
        });
    }
    if title.is_empty() {
        return Err(DedupError::InvalidInput {
            reason: "title is empty after normalization".to_string(),
        });
    }

    Ok(IdentityHash(hash_parts(&[&company, &title, &location])))
}
