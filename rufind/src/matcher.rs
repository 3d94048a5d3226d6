use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, trace};

use crate::config::SearchRequest;
use crate::errors::{SearchError, SearchResult};
use crate::results::MatchRecord;

const BUFFER_CAPACITY: usize = 8192;

/// Characters that mark a name pattern as a shell glob
const GLOB_METACHARS: &[char] = &['*', '?', '[', ']'];

/// Each cache is flushed wholesale once it reaches this many entries
const PATTERN_CACHE_CAPACITY: usize = 256;

static NAME_PATTERN_CACHE: Lazy<DashMap<String, NamePattern>> = Lazy::new(DashMap::new);
static CONTENT_PATTERN_CACHE: Lazy<DashMap<(String, bool), Regex>> = Lazy::new(DashMap::new);

/// Compiled interpretation of a name pattern.
///
/// The glob-or-regex decision is made exactly once, when the pattern is
/// compiled: a pattern containing any of `* ? [ ]` is a shell glob matched
/// against the file's base name, anything else is a regex applied as an
/// unanchored search. So the non-glob pattern `a.txt` matches any base name
/// containing `a`, any character, then `txt` — including `ba.txt2`.
#[derive(Debug, Clone)]
pub enum NamePattern {
    Glob(glob::Pattern),
    Regex(Regex),
}

impl NamePattern {
    /// Compiles a name pattern, reusing a previously compiled instance when
    /// the same pattern text was seen before. Interactive sessions re-issue
    /// compilation per query, so the cache keeps that cheap.
    pub fn compile(pattern: &str) -> SearchResult<Self> {
        if let Some(entry) = NAME_PATTERN_CACHE.get(pattern) {
            return Ok(entry.clone());
        }

        let compiled = if pattern.contains(GLOB_METACHARS) {
            debug!("Pattern '{}' compiled as glob", pattern);
            NamePattern::Glob(
                glob::Pattern::new(pattern)
                    .map_err(|e| SearchError::invalid_pattern(pattern, e.to_string()))?,
            )
        } else {
            debug!("Pattern '{}' compiled as regex", pattern);
            NamePattern::Regex(
                Regex::new(pattern)
                    .map_err(|e| SearchError::invalid_pattern(pattern, e.to_string()))?,
            )
        };

        if NAME_PATTERN_CACHE.len() >= PATTERN_CACHE_CAPACITY {
            NAME_PATTERN_CACHE.clear();
        }
        NAME_PATTERN_CACHE.insert(pattern.to_string(), compiled.clone());
        Ok(compiled)
    }

    /// Tests a file base name against the pattern
    pub fn matches(&self, name: &str) -> bool {
        match self {
            NamePattern::Glob(pattern) => pattern.matches(name),
            NamePattern::Regex(regex) => regex.is_match(name),
        }
    }
}

fn compile_content_pattern(pattern: &str, case_insensitive: bool) -> SearchResult<Regex> {
    let key = (pattern.to_string(), case_insensitive);
    if let Some(entry) = CONTENT_PATTERN_CACHE.get(&key) {
        return Ok(entry.clone());
    }

    let regex = RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| SearchError::invalid_pattern(pattern, e.to_string()))?;

    if CONTENT_PATTERN_CACHE.len() >= PATTERN_CACHE_CAPACITY {
        CONTENT_PATTERN_CACHE.clear();
    }
    CONTENT_PATTERN_CACHE.insert(key, regex.clone());
    Ok(regex)
}

/// Evaluates candidates against a request's name and content patterns.
///
/// Both patterns are compiled once per request. `match_file` never fails:
/// any I/O or decode problem on a candidate is treated as "no match".
#[derive(Debug, Clone)]
pub struct Matcher {
    name: NamePattern,
    content: Option<Regex>,
}

impl Matcher {
    /// Compiles the request's patterns. The only errors are pattern
    /// compilation failures, surfaced before any file is touched.
    pub fn new(request: &SearchRequest) -> SearchResult<Self> {
        let name = NamePattern::compile(&request.name_pattern)?;
        let content = match &request.content_pattern {
            Some(pattern) => Some(compile_content_pattern(pattern, request.case_insensitive)?),
            None => None,
        };
        Ok(Self { name, content })
    }

    /// Evaluates one candidate path, returning a record if it qualifies.
    ///
    /// The name filter runs first against the base name; the content scan
    /// only runs when the name matched and a content pattern exists. A file
    /// that cannot be opened or read is a non-match, not an error.
    pub fn match_file(&self, path: &Path) -> Option<MatchRecord> {
        let name = path.file_name()?.to_string_lossy();
        if !self.name.matches(&name) {
            return None;
        }

        match &self.content {
            None => Some(MatchRecord::name_only(path.to_path_buf())),
            Some(regex) => self.scan_content(path, regex),
        }
    }

    /// Scans a file line by line for the first content match.
    ///
    /// Lines are read as raw bytes and decoded lossily, so invalid UTF-8
    /// never aborts the scan. The handle is released on every exit path.
    fn scan_content(&self, path: &Path, regex: &Regex) -> Option<MatchRecord> {
        let file = File::open(path).ok()?;
        let mut reader = BufReader::with_capacity(BUFFER_CAPACITY, file);
        let mut buffer = Vec::with_capacity(256);
        let mut line_number = 0;

        loop {
            buffer.clear();
            match reader.read_until(b'\n', &mut buffer) {
                Ok(0) => return None,
                Ok(_) => {
                    line_number += 1;
                    let decoded = String::from_utf8_lossy(&buffer);
                    let line = decoded.strip_suffix('\n').unwrap_or(&decoded);
                    let line = line.strip_suffix('\r').unwrap_or(line);
                    if regex.is_match(line) {
                        trace!(
                            "Content match at {}:{}: {}",
                            path.display(),
                            line_number,
                            line
                        );
                        return Some(MatchRecord::with_line(
                            path.to_path_buf(),
                            line_number,
                            line.to_string(),
                        ));
                    }
                }
                // MatchSkip: a read failure mid-scan means no match
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn request(name: &str) -> SearchRequest {
        SearchRequest::new(".", name)
    }

    #[test]
    fn test_glob_matches_base_name() {
        // Name-only matching never touches the filesystem
        let matcher = Matcher::new(&request("*.txt")).unwrap();
        let record = matcher.match_file(Path::new("dir/a.txt"));
        assert_eq!(
            record,
            Some(MatchRecord::name_only(PathBuf::from("dir/a.txt")))
        );
    }

    #[test]
    fn test_glob_rejects_non_matching_name() {
        let matcher = Matcher::new(&request("*.txt")).unwrap();
        assert!(matcher.match_file(Path::new("dir/a.log")).is_none());
    }

    #[test]
    fn test_glob_character_class() {
        let matcher = Matcher::new(&request("log[0-9].txt")).unwrap();
        assert!(matcher.match_file(Path::new("log5.txt")).is_some());
        assert!(matcher.match_file(Path::new("logx.txt")).is_none());
    }

    #[test]
    fn test_regex_is_unanchored_substring_search() {
        // "a.txt" has no glob metacharacters, so it is a regex searched
        // anywhere in the base name: it also matches "ba.txt2".
        let matcher = Matcher::new(&request("a.txt")).unwrap();
        assert!(matcher.match_file(Path::new("a.txt")).is_some());
        assert!(matcher.match_file(Path::new("ba.txt2")).is_some());
        assert!(matcher.match_file(Path::new("notes.md")).is_none());
    }

    #[test]
    fn test_regex_dot_matches_any_character() {
        let matcher = Matcher::new(&request("a.txt")).unwrap();
        // '.' is a regex wildcard, not a literal dot
        assert!(matcher.match_file(Path::new("abtxt")).is_some());
    }

    #[test]
    fn test_invalid_regex_is_an_error() {
        let err = Matcher::new(&request("f(oo")).unwrap_err();
        assert!(matches!(err, SearchError::InvalidPattern { .. }));
    }

    #[test]
    fn test_invalid_glob_is_an_error() {
        let err = Matcher::new(&request("foo[")).unwrap_err();
        assert!(matches!(err, SearchError::InvalidPattern { .. }));
    }

    #[test]
    fn test_content_returns_first_matching_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "hello\nworld\nworld again\n").unwrap();

        let matcher = Matcher::new(&request("*.txt").with_content_pattern("wor")).unwrap();
        let record = matcher.match_file(&path).unwrap();
        let line = record.line.unwrap();
        assert_eq!(line.number, 2);
        assert_eq!(line.text, "world");
    }

    #[test]
    fn test_content_strips_crlf() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "first\r\nsecond\r\n").unwrap();

        let matcher = Matcher::new(&request("*.txt").with_content_pattern("second")).unwrap();
        let line = matcher.match_file(&path).unwrap().line.unwrap();
        assert_eq!(line.number, 2);
        assert_eq!(line.text, "second");
    }

    #[test]
    fn test_content_no_match_yields_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "nothing interesting\n").unwrap();

        let matcher = Matcher::new(&request("*.txt").with_content_pattern("absent")).unwrap();
        assert!(matcher.match_file(&path).is_none());
    }

    #[test]
    fn test_content_case_sensitive_by_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "Hello World\n").unwrap();

        let sensitive = Matcher::new(&request("*.txt").with_content_pattern("world")).unwrap();
        assert!(sensitive.match_file(&path).is_none());

        let insensitive = Matcher::new(
            &request("*.txt")
                .with_content_pattern("world")
                .case_insensitive(true),
        )
        .unwrap();
        let line = insensitive.match_file(&path).unwrap().line.unwrap();
        assert_eq!(line.number, 1);
        assert_eq!(line.text, "Hello World");
    }

    #[test]
    fn test_content_tolerates_invalid_utf8() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"\xFF\xFE garbage\nneedle here\n").unwrap();
        drop(file);

        let matcher = Matcher::new(&request("*.txt").with_content_pattern("needle")).unwrap();
        let line = matcher.match_file(&path).unwrap().line.unwrap();
        assert_eq!(line.number, 2);
        assert_eq!(line.text, "needle here");
    }

    #[test]
    fn test_unreadable_file_is_a_non_match() {
        let matcher = Matcher::new(&request("*.txt").with_content_pattern("x")).unwrap();
        assert!(matcher
            .match_file(Path::new("no/such/dir/vanished.txt"))
            .is_none());
    }

    #[test]
    fn test_pattern_cache_reuse() {
        let first = NamePattern::compile("cache_reuse_sample").unwrap();
        let second = NamePattern::compile("cache_reuse_sample").unwrap();
        assert!(matches!(first, NamePattern::Regex(_)));
        assert!(matches!(second, NamePattern::Regex(_)));
    }

    #[test]
    fn test_pattern_cache_is_bounded() {
        for i in 0..(3 * PATTERN_CACHE_CAPACITY) {
            NamePattern::compile(&format!("cache_fill_{}", i)).unwrap();
        }
        // Concurrent tests may slip a few entries in between a flush and
        // this check
        assert!(NAME_PATTERN_CACHE.len() <= PATTERN_CACHE_CAPACITY + 16);
    }
}
