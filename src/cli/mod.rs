use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::wire::Action;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[value(alias = "groq-cloud")]
    Groq,
    #[value(name = "openai", alias = "open-ai")]
    #[serde(alias = "open-ai")]
    OpenAI,
    Anthropic,
    Ollama,
}

impl ProviderKind {
    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::Groq => "llama-3.3-70b-versatile",
            ProviderKind::OpenAI => "gpt-4.1-mini",
            ProviderKind::Anthropic => "claude-sonnet-4-20250514",
            ProviderKind::Ollama => "llama3.1",
        }
    }
}

#[derive(Parser, Debug, Default)]
#[command(name="vibe_promptGen", version, about="Generate tool-specific prompts and instruction files for AI coding assistants")]
pub struct Args {
    /// Project title.
    #[arg(long)]
    pub title: Option<String>,

    /// Technology, repeatable or comma-separated (e.g. --stack react,typescript).
    #[arg(long)]
    pub stack: Vec<String>,

    /// Free-text requirements.
    #[arg(long)]
    pub requirements: Option<String>,

    /// Target assistant (github-copilot, cursor, windsurf, v0, claude, chatgpt, general).
    #[arg(long)]
    pub tool: Option<String>,

    #[arg(long, value_enum)]
    pub action: Option<Action>,

    /// Read a JSON request body from a file, or `-` for stdin.
    #[arg(long)]
    pub request: Option<PathBuf>,

    /// Print the JSON response instead of the formatted documents.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Write the documents to their file paths under --out-root.
    #[arg(long, default_value_t = false)]
    pub write: bool,

    #[arg(long)]
    pub out_root: Option<PathBuf>,

    /// Preview writes without touching the filesystem.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Skip confirmation prompts.
    #[arg(long, default_value_t = false)]
    pub yes: bool,

    #[arg(long)]
    pub session: Option<PathBuf>,

    /// Neither restore nor save the session.
    #[arg(long, default_value_t = false)]
    pub no_session: bool,

    /// Delete the saved session and exit.
    #[arg(long, default_value_t = false)]
    pub clear: bool,

    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub api_base: Option<String>,

    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub save_request: bool,

    #[arg(long, default_value_t = false)]
    pub save_response: bool,

    /// List supported tools and exit.
    #[arg(long, default_value_t = false)]
    pub list_tools: bool,

    #[arg(long, default_value_t = false)]
    pub debug: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub progress: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generation_flags() {
        let args = Args::try_parse_from([
            "vibe_promptGen",
            "--title", "Todo",
            "--stack", "react,typescript",
            "--stack", "tailwind",
            "--requirements", "CRUD",
            "--tool", "cursor",
            "--action", "enhance",
            "--provider", "open-ai",
        ])
        .unwrap();
        assert_eq!(args.title.as_deref(), Some("Todo"));
        assert_eq!(args.stack, vec!["react,typescript", "tailwind"]);
        assert_eq!(args.action, Some(Action::Enhance));
        assert_eq!(args.provider, Some(ProviderKind::OpenAI));
        assert!(args.progress);
    }

    #[test]
    fn progress_can_be_turned_off() {
        let args = Args::try_parse_from(["vibe_promptGen", "--progress", "false"]).unwrap();
        assert!(!args.progress);
    }
}
