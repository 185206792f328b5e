//! Last form state and result, mirrored to a JSON file between runs.

use anyhow::Result;
use chrono::{DateTime, Utc};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::errors::PromptGenError;
use crate::segment::DocumentSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Session {
    pub title: String,
    pub stack: Vec<String>,
    pub requirements: String,
    pub selected_ai_tool: String,
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<DocumentSet>,
    pub saved_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Only sessions with something the user typed or received are restored.
    pub fn has_content(&self) -> bool {
        !self.title.trim().is_empty()
            || !self.requirements.trim().is_empty()
            || !self.stack.is_empty()
            || !self.result.trim().is_empty()
    }
}

pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or empty sessions yield `None`. A corrupt file is removed so the
    /// next run starts clean.
    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.is_file() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path)?;
        match serde_json::from_slice::<Session>(&bytes) {
            Ok(s) if s.has_content() => {
                debug!(path = %self.path.display(), "session restored");
                Ok(Some(s))
            }
            Ok(_) => Ok(None),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "discarding unreadable session");
                fs::remove_file(&self.path)?;
                Ok(None)
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        let mut stamped = session.clone();
        stamped.saved_at = Some(Utc::now());
        let json = serde_json::to_string_pretty(&stamped)?;

        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let write = || -> std::io::Result<()> {
            fs::create_dir_all(parent)?;
            let tmp = NamedTempFile::new_in(parent)?;
            fs::write(tmp.path(), &json)?;
            tmp.persist(&self.path).map_err(|e| e.error)?;
            Ok(())
        };
        write().map_err(|e| PromptGenError::Session { path: self.path.clone(), detail: e.to_string() })?;
        debug!(path = %self.path.display(), bytes = json.len(), "session saved");
        Ok(())
    }

    /// Returns whether a file was removed.
    pub fn clear(&self) -> Result<bool> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
