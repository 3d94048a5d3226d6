use ignore::{DirEntry, WalkBuilder};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Lazily yields every file path under `root`, pruning ignored directories.
///
/// Pruning applies to directory base names and happens before descent, so
/// an ignored subtree is never listed at all. The root itself is exempt:
/// searching a directory whose own name is in the ignore set still works.
/// Unreadable directories are skipped silently and symlinks are not
/// followed. Directories themselves are never yielded, only files.
///
/// Each call starts a fresh traversal; the iterator is finite and stops
/// producing work as soon as the consumer stops pulling.
pub fn walk(root: &Path, ignore_dirs: &[String]) -> impl Iterator<Item = PathBuf> {
    let ignore: HashSet<String> = ignore_dirs.iter().cloned().collect();

    let mut builder = WalkBuilder::new(root);
    builder.standard_filters(false).follow_links(false);
    builder.filter_entry(move |entry| {
        if entry.depth() == 0 {
            return true;
        }
        if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
            return true;
        }
        match entry.file_name().to_str() {
            Some(name) => !ignore.contains(name),
            None => true,
        }
    });

    builder
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                // TraversalSkip: unreadable entries are not fatal
                debug!("Skipping unreadable entry: {}", err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .map(DirEntry::into_path)
}
