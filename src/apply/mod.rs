use anyhow::Result;
use fs_err as fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::errors::PromptGenError;
use crate::profile::ToolProfile;
use crate::safety;
use crate::segment::DocumentSet;

/// One document bound to the file its tool reads it from.
#[derive(Debug, Clone)]
pub struct WriteTarget {
    pub key: String,
    pub path: PathBuf,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyKind {
    Created,
    Updated,
    Skipped,
}

#[derive(Debug, Clone)]
pub struct FileResult {
    pub kind: ApplyKind,
    pub path: PathBuf,
    pub bytes_after: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ApplySummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub bytes_written: u64,
    pub details: Vec<FileResult>,
}

/// Map each non-empty document with a suggested path to a target under `out_root`.
pub fn targets(out_root: &Path, profile: &ToolProfile, docs: &DocumentSet) -> Result<Vec<WriteTarget>> {
    let mut out = Vec::new();
    for spec in profile.sections {
        let Some(rel) = spec.file_path else { continue };
        let Some(content) = docs.get(spec.key).map(str::trim).filter(|c| !c.is_empty()) else {
            continue;
        };
        let path = safety::resolve_within(out_root, rel)?;
        if out_root.exists() && !safety::stays_within(out_root, &path) {
            return Err(PromptGenError::UnsafePath(rel.to_string()).into());
        }
        out.push(WriteTarget {
            key: spec.key.to_string(),
            path,
            content: format!("{content}\n"),
        });
    }
    Ok(out)
}

/// Write every target atomically (temp file in the same directory, then
/// rename). Identical files are left alone. `dry` only tallies.
pub fn apply_targets(out_root: &Path, targets: &[WriteTarget], dry: bool) -> Result<ApplySummary> {
    let mut sum = ApplySummary::default();

    for t in targets {
        let existing = if t.path.is_file() { Some(fs::read_to_string(&t.path)?) } else { None };
        let after = t.content.len() as u64;

        if existing.as_deref() == Some(t.content.as_str()) {
            sum.skipped += 1;
            sum.details.push(FileResult { kind: ApplyKind::Skipped, path: t.path.clone(), bytes_after: after });
            continue;
        }

        if !dry {
            let parent = t.path.parent().unwrap_or(out_root);
            fs::create_dir_all(parent)?;
            let tmp = NamedTempFile::new_in(parent)?;
            fs::write(tmp.path(), &t.content)?;
            tmp.persist(&t.path)?;
            tracing::debug!(key = %t.key, path = %t.path.display(), bytes = after, "document written");
        }

        let kind = if existing.is_some() { ApplyKind::Updated } else { ApplyKind::Created };
        match kind {
            ApplyKind::Created => sum.created += 1,
            _ => sum.updated += 1,
        }
        sum.bytes_written += after;
        sum.details.push(FileResult { kind, path: t.path.clone(), bytes_after: after });
    }

    Ok(sum)
}
