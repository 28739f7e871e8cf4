//! Merging keyword and semantic result sets.

use std::collections::HashMap;

use crate::scoring::{HybridWeights, to_unit_interval};
use crate::vectordb::VectorMatch;

use super::types::{HybridHit, KeywordHit, MatchSources};

#[derive(Default)]
struct Partial {
    keyword: Option<f64>,
    semantic: Option<f64>,
}

/// Merges both result sets by job id and returns the `top_k` best.
///
/// Keyword scores are `1 / (1 + rank)`. Semantic scores are the index's cosine similarity
/// mapped to `[0, 1]`. A job missing from one set scores zero in that dimension. Ties on
/// the combined score break on job id, so the output depends only on the inputs.
pub fn merge_results(
    keyword: &[KeywordHit],
    semantic: &[VectorMatch],
    weights: HybridWeights,
    top_k: usize,
) -> Vec<HybridHit> {
    let mut merged: HashMap<&str, Partial> = HashMap::new();

    for hit in keyword {
        let entry = merged.entry(hit.job_id.as_str()).or_default();
        let score = hit.normalized_score();
        entry.keyword = Some(entry.keyword.map_or(score, |s| s.max(score)));
    }
    for hit in semantic {
        let entry = merged.entry(hit.job_id.as_str()).or_default();
        let score = to_unit_interval(f64::from(hit.score));
        entry.semantic = Some(entry.semantic.map_or(score, |s| s.max(score)));
    }

    let mut hits: Vec<HybridHit> = merged
        .into_iter()
        .map(|(job_id, partial)| {
            let sources = match (partial.keyword.is_some(), partial.semantic.is_some()) {
                (true, true) => MatchSources::Both,
                (true, false) => MatchSources::Keyword,
                _ => MatchSources::Semantic,
            };
            let keyword_score = partial.keyword.unwrap_or(0.0);
            let semantic_score = partial.semantic.unwrap_or(0.0);
            HybridHit {
                job_id: job_id.to_string(),
                keyword_score,
                semantic_score,
                combined_score: keyword_score * weights.keyword
                    + semantic_score * weights.semantic,
                sources,
            }
        })
        .collect();

    hits.sort_by(|a, b| {
        b.combined_score
            .total_cmp(&a.combined_score)
            .then_with(|| a.job_id.cmp(&b.job_id))
    });
    hits.truncate(top_k);
    hits
}
