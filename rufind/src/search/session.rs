use tracing::{debug, info};

use crate::config::SearchRequest;
use crate::errors::SearchResult;
use crate::results::MatchRecord;
use crate::search::engine::SearchEngine;

/// Maximum number of records shown per interactive query
pub const PREVIEW_LIMIT: usize = 10;

/// Maximum number of fuzzy suggestions offered for an input
pub const SUGGESTION_LIMIT: usize = 10;

/// Backs the interactive fuzzy mode: one engine, one request template, and
/// a path snapshot taken once at startup.
///
/// The snapshot is the name-only result of the template request (content
/// filter stripped) and seeds the completion suggestions; it is a bounded,
/// read-only list held for the lifetime of the session. Queries themselves
/// always run a fresh search, so previews reflect the live tree.
pub struct InteractiveSession {
    engine: SearchEngine,
    template: SearchRequest,
    index: Vec<String>,
}

impl InteractiveSession {
    /// Creates a session and pre-indexes the matching paths.
    ///
    /// Fails for the same reasons a search fails: bad root or bad pattern.
    pub fn new(engine: SearchEngine, template: SearchRequest) -> SearchResult<Self> {
        let mut name_only = template.clone();
        name_only.content_pattern = None;

        let index: Vec<String> = engine
            .search(&name_only)?
            .map(|record| record.path.display().to_string())
            .collect();
        info!("Pre-indexed {} paths for fuzzy completion", index.len());

        Ok(Self {
            engine,
            template,
            index,
        })
    }

    /// The paths captured at startup
    pub fn indexed_paths(&self) -> &[String] {
        &self.index
    }

    /// Substring-filtered completion suggestions for a partial input.
    ///
    /// Case-insensitive, unranked, capped at [`SUGGESTION_LIMIT`].
    pub fn suggestions(&self, input: &str) -> Vec<&str> {
        if input.is_empty() {
            return Vec::new();
        }
        let needle = input.to_lowercase();
        self.index
            .iter()
            .filter(|path| path.to_lowercase().contains(&needle))
            .take(SUGGESTION_LIMIT)
            .map(String::as_str)
            .collect()
    }

    /// Runs one query cycle: the query replaces the template's name
    /// pattern, the template's content filter (if any) still applies, and
    /// the result is truncated to [`PREVIEW_LIMIT`] records by abandoning
    /// the stream.
    pub fn run_query(&self, query: &str) -> SearchResult<Vec<MatchRecord>> {
        let mut request = self.template.clone();
        request.name_pattern = query.to_string();
        debug!("Interactive query: '{}'", query);

        let stream = self.engine.search(&request)?;
        Ok(stream.take(PREVIEW_LIMIT).collect())
    }
}
