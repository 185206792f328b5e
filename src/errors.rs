use std::path::PathBuf;

use thiserror::Error;

/// The only failure text a user ever sees for the generation path.
pub const GENERATION_FAILED: &str = "Failed to generate prompt";

#[derive(Error, Debug)]
pub enum PromptGenError {
    #[error("provider error: {0}")] Provider(String),
    #[error("{provider} returned an empty completion")] EmptyCompletion { provider: String },
    #[error("invalid request: {0}")] InvalidRequest(String),
    #[error("session file {path}: {detail}")] Session { path: PathBuf, detail: String },
    #[error("refusing to write outside output root: {0}")] UnsafePath(String),
    #[error("failed to parse environment variable '{var}': {detail}")] ConfigEnv { var: String, detail: String },
}
