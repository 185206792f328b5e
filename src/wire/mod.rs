use serde::{Deserialize, Serialize};

use crate::errors::{PromptGenError, GENERATION_FAILED};
use crate::segment::DocumentSet;

// Request/response bodies of a generate call.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[default]
    Generate,
    /// Re-submit the previous output for improvement.
    Enhance,
}

/// Body of a generate/enhance call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub stack: Vec<String>,
    /// Free-text requirements, or the previous output when enhancing.
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub selected_ai_tool: String,
    #[serde(default)]
    pub action: Action,
}

impl GenerateRequest {
    /// Reject requests that would only waste a provider call.
    pub fn validate(&self) -> Result<(), PromptGenError> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.stack.iter().all(|s| s.trim().is_empty()) {
            missing.push("at least one technology");
        }
        if self.requirements.trim().is_empty() {
            missing.push(match self.action {
                Action::Generate => "requirements",
                Action::Enhance => "a previous result to enhance",
            });
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PromptGenError::InvalidRequest(format!("missing {}", missing.join(", "))))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Raw completion text.
    pub result: String,
    /// Segmented documents, present for multi-document tools only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<DocumentSet>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn generation_failed() -> Self {
        Self { error: GENERATION_FAILED.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_uses_camel_case_field_names() {
        let req: GenerateRequest = serde_json::from_value(json!({
            "title": "Todo",
            "stack": ["react", "typescript"],
            "requirements": "CRUD todos",
            "selectedAiTool": "cursor",
            "action": "enhance"
        }))
        .unwrap();
        assert_eq!(req.selected_ai_tool, "cursor");
        assert_eq!(req.action, Action::Enhance);
        assert_eq!(req.stack, vec!["react", "typescript"]);
    }

    #[test]
    fn missing_fields_default_and_fail_validation() {
        let req: GenerateRequest = serde_json::from_value(json!({ "title": "Todo" })).unwrap();
        assert_eq!(req.action, Action::Generate);
        let err = req.validate().unwrap_err().to_string();
        assert!(err.contains("at least one technology"), "got: {err}");
        assert!(err.contains("requirements"), "got: {err}");
        assert!(!err.contains("title"), "got: {err}");
    }

    #[test]
    fn response_omits_files_when_absent() {
        let resp = GenerateResponse { result: "text".into(), files: None };
        assert_eq!(serde_json::to_value(&resp).unwrap(), json!({ "result": "text" }));

        let mut files = DocumentSet::default();
        files.insert("mainPrompt", "m");
        let resp = GenerateResponse { result: "text".into(), files: Some(files) };
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({ "result": "text", "files": { "mainPrompt": "m" } })
        );
    }

    #[test]
    fn error_response_is_generic() {
        let v = serde_json::to_value(ErrorResponse::generation_failed()).unwrap();
        assert_eq!(v, json!({ "error": "Failed to generate prompt" }));
    }
}
