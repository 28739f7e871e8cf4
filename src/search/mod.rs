//! Hybrid keyword + semantic job search.
//!
//! [`HybridSearcher`] queries a [`KeywordIndex`] and a [`VectorIndex`](crate::vectordb::VectorIndex)
//! concurrently, drops matches from other tenants and blends the two sets with
//! [`merge_results`].

mod error;
pub mod keyword;
mod merge;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod searcher;
mod types;


pub use error::{SearchError, SearchResult};
pub use keyword::{KeywordIndex, SqliteKeywordIndex, fts_query};
pub use merge::merge_results;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockKeywordIndex;
pub use searcher::{HybridSearcher, QueryEmbedder, filter_tenant};
pub use types::{DegradedSource, HybridHit, HybridSearchResponse, KeywordHit, MatchSources};
