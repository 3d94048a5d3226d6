use std::fmt;
use std::path::PathBuf;

/// The first content line of a file that satisfied the content pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineMatch {
    /// 1-indexed line number
    pub number: usize,
    /// Line text with the trailing newline stripped
    pub text: String,
}

/// A single search result: a file whose name matched, optionally carrying
/// the first content line that matched.
///
/// `line` is `None` when no content search was requested; when a content
/// pattern was supplied, a record is only emitted if some line matched, and
/// `line` holds that line. Records are terminal output and are never
/// mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchRecord {
    /// The path of the matched file
    pub path: PathBuf,
    /// The first matching content line, if a content search was requested
    pub line: Option<LineMatch>,
}

impl MatchRecord {
    /// Creates a record for a name-only match
    pub fn name_only(path: PathBuf) -> Self {
        Self { path, line: None }
    }

    /// Creates a record carrying the first matching content line
    pub fn with_line(path: PathBuf, number: usize, text: String) -> Self {
        Self {
            path,
            line: Some(LineMatch { number, text }),
        }
    }
}

impl fmt::Display for MatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.line {
            Some(line) => write!(f, "{}:{}: {}", self.path.display(), line.number, line.text),
            None => write!(f, "{}", self.path.display()),
        }
    }
}
