use colored::Colorize;
use rufind::MatchRecord;

/// Formats a record for batch output: `path` alone, or
/// `path:lineNumber: lineContent` when a content line is present.
///
/// Color is a pure function of the record and the flag passed in; nothing
/// here mutates process-wide color state.
pub fn render_batch(record: &MatchRecord, use_color: bool) -> String {
    let path = record.path.display().to_string();
    let path = if use_color {
        path.green().to_string()
    } else {
        path
    };
    render_with_path(record, path)
}

/// Formats a record for interactive previews (yellow path)
pub fn render_preview(record: &MatchRecord, use_color: bool) -> String {
    let path = record.path.display().to_string();
    let path = if use_color {
        path.yellow().to_string()
    } else {
        path
    };
    render_with_path(record, path)
}

fn render_with_path(record: &MatchRecord, path: String) -> String {
    match &record.line {
        Some(line) => format!("{}:{}: {}", path, line.number, line.text),
        None => path,
    }
}
