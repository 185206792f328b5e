use anyhow::Result;
use colored::Colorize;
use fs_err as fs;
use humansize::{format_size, DECIMAL};
use std::path::{Path, PathBuf};

use crate::apply::WriteTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Update,
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct Preview {
    pub kind: ChangeKind,
    pub key: String,
    pub path: PathBuf,
    pub bytes_before: Option<u64>,
    pub bytes_after: u64,
    pub diff_snippet: Option<String>,
}

fn read_to_string_if_exists(path: &Path) -> Result<Option<String>> {
    if path.is_file() {
        Ok(Some(fs::read_to_string(path)?))
    } else {
        Ok(None)
    }
}

/// Unified diff of `old` against `new`, colored and cut at `max_lines`.
fn short_diff(old: &str, new: &str, max_lines: usize) -> String {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();
    let diff = difflib::unified_diff(&old_lines, &new_lines, "current", "generated", "", "", 2);

    let mut out: Vec<String> = diff
        .iter()
        .skip(2) // file headers
        .take(max_lines)
        .map(|l| {
            let l = l.trim_end_matches('\n');
            if l.starts_with('+') {
                l.green().to_string()
            } else if l.starts_with('-') {
                l.red().to_string()
            } else if l.starts_with("@@") {
                l.cyan().to_string()
            } else {
                l.to_string()
            }
        })
        .collect();

    if diff.len().saturating_sub(2) > max_lines {
        out.push("... (diff truncated)".dimmed().to_string());
    }
    out.join("\n")
}

pub fn preview(targets: &[WriteTarget]) -> Result<Vec<Preview>> {
    let mut previews = Vec::with_capacity(targets.len());
    for t in targets {
        let existing = read_to_string_if_exists(&t.path)?;
        let bytes_after = t.content.len() as u64;
        let (kind, bytes_before, diff_snippet) = match existing {
            None => (ChangeKind::Create, None, None),
            Some(old) if old == t.content => (ChangeKind::Unchanged, Some(old.len() as u64), None),
            Some(old) => (ChangeKind::Update, Some(old.len() as u64), Some(short_diff(&old, &t.content, 80))),
        };
        previews.push(Preview {
            kind,
            key: t.key.clone(),
            path: t.path.clone(),
            bytes_before,
            bytes_after,
            diff_snippet,
        });
    }
    Ok(previews)
}

pub fn colorize_preview(p: &Preview) -> String {
    let tag = match p.kind {
        ChangeKind::Create => "[CREATE]".green().bold(),
        ChangeKind::Update => "[UPDATE]".yellow().bold(),
        ChangeKind::Unchanged => "[SAME]".dimmed(),
    };
    let before = p
        .bytes_before
        .map(|b| format_size(b, DECIMAL))
        .unwrap_or_else(|| "-".into());
    let mut out = format!(
        "{} {}  {}  ({} -> {})",
        tag,
        p.path.display(),
        p.key.dimmed(),
        before,
        format_size(p.bytes_after, DECIMAL)
    );
    if let Some(d) = p.diff_snippet.as_deref().filter(|d| !d.is_empty()) {
        out.push('\n');
        out.push_str(d);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(path: PathBuf, content: &str) -> WriteTarget {
        WriteTarget {
            key: "cursorRules".into(),
            path,
            content: content.into(),
        }
    }

    #[test]
    fn classifies_create_update_and_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("a.md");
        let same = dir.path().join("b.md");
        std::fs::write(&existing, "old line\nkept\n").unwrap();
        std::fs::write(&same, "same\n").unwrap();

        let previews = preview(&[
            target(dir.path().join("new.md"), "fresh\n"),
            target(existing, "new line\nkept\n"),
            target(same, "same\n"),
        ])
        .unwrap();

        let kinds: Vec<_> = previews.iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![ChangeKind::Create, ChangeKind::Update, ChangeKind::Unchanged]);
        assert_eq!(previews[1].bytes_before, Some(14));
        let diff = previews[1].diff_snippet.as_deref().unwrap();
        assert!(diff.contains("-old line"), "got: {diff}");
        assert!(diff.contains("+new line"), "got: {diff}");
    }

    #[test]
    fn long_diffs_are_truncated() {
        colored::control::set_override(false);
        let old: String = (0..50).map(|i| format!("a{i}\n")).collect();
        let new: String = (0..50).map(|i| format!("b{i}\n")).collect();
        let d = short_diff(&old, &new, 10);
        assert_eq!(d.lines().count(), 11);
        assert!(d.ends_with("... (diff truncated)"));
    }
}
