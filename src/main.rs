use anyhow::Context;
use clap::Parser;
use fs_err as fs;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::io::Read;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;
use uuid::Uuid;

mod apply;
mod cli;
mod config;
mod errors;
mod log;
mod patch;
mod profile;
mod prompt;
mod provider;
mod safety;
mod segment;
mod session;
mod stack;
mod ux;
mod wire;

use errors::{PromptGenError, GENERATION_FAILED};
use profile::ToolProfile;
use segment::Segmentation;
use session::Session;
use wire::{Action, ErrorResponse, GenerateRequest, GenerateResponse};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = cli::Args::parse();
    let cfg = config::Config::load(&args)?;
    log::init(cfg.log_level.as_deref(), cfg.log_file.as_deref())?;

    if args.list_tools {
        ux::list_tools();
        return Ok(ExitCode::SUCCESS);
    }

    let store = session::SessionStore::new(&cfg.session_path);
    if args.clear {
        if store.clear()? {
            println!("Session cleared: {}", store.path().display());
        } else {
            println!("No saved session at {}", store.path().display());
        }
        return Ok(ExitCode::SUCCESS);
    }

    let previous = if args.no_session { None } else { store.load()? };

    let mut req = match &args.request {
        Some(path) => read_request(path)?,
        None => request_from_args(&args, previous.as_ref()),
    };
    req.stack = stack::normalize(&req.stack);
    if !args.json {
        ux::show_stack_hints(&stack::hints(&req.stack));
    }
    let profile = profile::resolve(&req.selected_ai_tool);

    if let Err(e) = req.validate() {
        if args.json {
            println!("{}", json!({ "error": e.to_string() }));
        } else {
            ux::print_failure(&e.to_string());
        }
        return Ok(ExitCode::from(2));
    }

    let tx = Uuid::new_v4();
    tracing::info!(%tx, tool = profile.id, action = ?req.action, provider = ?cfg.provider, model = %cfg.model, "request accepted");

    let (completion, seg) = match generate(&cfg, &args, &req, profile, tx).await {
        Ok(out) => out,
        Err(e) => {
            tracing::error!(%tx, error = %format!("{e:#}"), "generation failed");
            if args.json {
                println!("{}", serde_json::to_string(&ErrorResponse::generation_failed())?);
            } else {
                ux::print_failure(GENERATION_FAILED);
            }
            return Ok(ExitCode::FAILURE);
        }
    };

    let files = profile.is_multi_document().then(|| seg.documents.clone());

    if !args.no_session {
        let saved = session_after(&req, previous.as_ref(), &completion, files.clone());
        if let Err(e) = store.save(&saved) {
            tracing::warn!(error = %format!("{e:#}"), "session not saved");
        }
    }

    if args.json {
        let response = GenerateResponse { result: completion, files };
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else if profile.is_multi_document() {
        ux::show_documents(profile, &seg);
    } else {
        ux::show_result(&completion);
    }

    if args.write {
        write_documents(&cfg.out_root, profile, &seg, &args)?;
    }

    Ok(ExitCode::SUCCESS)
}

/// One provider round trip. Any error here is reported to the user as the
/// generic failure; the detail only reaches the log.
async fn generate(
    cfg: &config::Config,
    args: &cli::Args,
    req: &GenerateRequest,
    profile: &'static ToolProfile,
    tx: Uuid,
) -> anyhow::Result<(String, Segmentation)> {
    let prompt_text = prompt::compose(req, profile);
    let prov = provider::make_provider(cfg.provider, cfg.model.clone(), cfg.timeout_secs, cfg.api_base.clone())?;

    let spinner = args.progress.then(|| {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]") {
            pb.set_style(style);
        }
        pb.set_message(format!("{} via {}", profile.display_name, prov.name()));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let result = prov.complete(&prompt_text).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let completion = result?;

    let seg = segment::segment_detailed(&completion, profile);
    tracing::debug!(%tx, completion_bytes = completion.len(), documents = seg.documents.len(), "completion segmented");

    if args.save_request || args.save_response {
        let stage = match req.action {
            Action::Generate => "generate",
            Action::Enhance => "enhance",
        };
        let request = json!({ "provider": prov.name(), "model": cfg.model, "tool": profile.id, "prompt": prompt_text });
        let response = json!({ "completion": completion, "documents": seg.documents });
        match log::save_stage(stage, &request, &response, tx, &cfg.artifacts_dir, args.save_request, args.save_response) {
            Ok(saved) => log::log_saved_paths(stage, &saved),
            Err(e) => tracing::warn!(error = %format!("{e:#}"), "artifacts not saved"),
        }
    }

    Ok((completion, seg))
}

fn read_request(path: &Path) -> anyhow::Result<GenerateRequest> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).context("failed to read request from stdin")?;
        buf
    } else {
        fs::read_to_string(path)?
    };
    serde_json::from_str(&text).map_err(|e| PromptGenError::InvalidRequest(format!("malformed JSON body: {e}")).into())
}

/// Flags win over the restored session, field by field. Enhancing without
/// explicit text resubmits the previous output in its structured form.
fn request_from_args(args: &cli::Args, previous: Option<&Session>) -> GenerateRequest {
    let prev = previous.cloned().unwrap_or_default();
    let selected_ai_tool = args.tool.clone().unwrap_or(prev.selected_ai_tool.clone());
    let action = args.action.unwrap_or_default();

    let requirements = match (action, &args.requirements) {
        (_, Some(r)) => r.clone(),
        (Action::Generate, None) => prev.requirements.clone(),
        (Action::Enhance, None) => previous_output(&prev, profile::resolve(&selected_ai_tool)),
    };

    GenerateRequest {
        title: args.title.clone().unwrap_or(prev.title),
        stack: if args.stack.is_empty() { prev.stack } else { args.stack.clone() },
        requirements,
        selected_ai_tool,
        action,
    }
}

fn previous_output(prev: &Session, profile: &ToolProfile) -> String {
    let same_tool = profile::resolve(&prev.selected_ai_tool).id == profile.id;
    match &prev.files {
        Some(files) if same_tool && profile.is_multi_document() => prompt::render_documents(profile, files),
        _ => prev.result.clone(),
    }
}

/// Enhance keeps the original requirements in the session, not the
/// resubmitted output.
fn session_after(
    req: &GenerateRequest,
    previous: Option<&Session>,
    completion: &str,
    files: Option<segment::DocumentSet>,
) -> Session {
    let requirements = match (req.action, previous) {
        (Action::Enhance, Some(p)) if !p.requirements.trim().is_empty() => p.requirements.clone(),
        _ => req.requirements.clone(),
    };
    Session {
        title: req.title.clone(),
        stack: req.stack.clone(),
        requirements,
        selected_ai_tool: req.selected_ai_tool.clone(),
        result: completion.to_string(),
        files,
        saved_at: None,
    }
}

fn write_documents(out_root: &Path, profile: &ToolProfile, seg: &Segmentation, args: &cli::Args) -> anyhow::Result<()> {
    let targets = apply::targets(out_root, profile, &seg.documents)?;
    if targets.is_empty() {
        println!("{} has no instruction files to write.", profile.display_name);
        return Ok(());
    }

    if args.json && !args.yes && !args.dry_run {
        tracing::warn!("--write with --json needs --yes; nothing written");
        return Ok(());
    }

    if !args.json {
        ux::print_preview_dashboard(&patch::preview(&targets)?);
    }

    if !args.dry_run && !args.yes && !ux::confirm("Write these files?") {
        println!("Aborted by user.");
        return Ok(());
    }

    let summary = apply::apply_targets(out_root, &targets, args.dry_run)?;
    if !args.json {
        ux::print_apply_dashboard(&summary, args.dry_run);
    }
    tracing::info!(created = summary.created, updated = summary.updated, skipped = summary.skipped, dry_run = args.dry_run, "documents applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::DocumentSet;
    use pretty_assertions::assert_eq;

    fn saved_cursor_session() -> Session {
        let mut files = DocumentSet::default();
        files.insert("mainPrompt", "Build a recipe box");
        files.insert("cursorRules", "Use strict TS");
        files.insert("codeGenerationRules", "Small functions");
        Session {
            title: "Recipes".into(),
            stack: vec!["nextjs".into()],
            requirements: "Save recipes".into(),
            selected_ai_tool: "cursor".into(),
            result: "raw completion".into(),
            files: Some(files),
            saved_at: None,
        }
    }

    #[test]
    fn flags_override_session_fields() {
        let args = cli::Args {
            title: Some("New title".into()),
            stack: vec!["react".into()],
            ..Default::default()
        };
        let req = request_from_args(&args, Some(&saved_cursor_session()));
        assert_eq!(req.title, "New title");
        assert_eq!(req.stack, vec!["react"]);
        assert_eq!(req.requirements, "Save recipes");
        assert_eq!(req.selected_ai_tool, "cursor");
        assert_eq!(req.action, Action::Generate);
    }

    #[test]
    fn enhance_resubmits_structured_documents() {
        let args = cli::Args { action: Some(Action::Enhance), ..Default::default() };
        let req = request_from_args(&args, Some(&saved_cursor_session()));
        assert!(req.requirements.starts_with("## Main Prompt\nBuild a recipe box"), "got: {}", req.requirements);
        assert!(req.requirements.contains("Use strict TS"));

        let again = segment::segment(&req.requirements, profile::resolve("cursor"));
        assert_eq!(again.get("codeGenerationRules"), Some("Small functions"));
    }

    #[test]
    fn enhance_for_another_tool_uses_raw_result() {
        let args = cli::Args {
            action: Some(Action::Enhance),
            tool: Some("chatgpt".into()),
            ..Default::default()
        };
        let req = request_from_args(&args, Some(&saved_cursor_session()));
        assert_eq!(req.requirements, "raw completion");
    }

    #[test]
    fn enhance_without_history_fails_validation() {
        let args = cli::Args {
            action: Some(Action::Enhance),
            title: Some("T".into()),
            stack: vec!["rust".into()],
            ..Default::default()
        };
        let req = request_from_args(&args, None);
        assert!(req.validate().is_err());
    }

    #[test]
    fn session_after_enhance_keeps_original_requirements() {
        let prev = saved_cursor_session();
        let args = cli::Args { action: Some(Action::Enhance), ..Default::default() };
        let req = request_from_args(&args, Some(&prev));
        let s = session_after(&req, Some(&prev), "better", None);
        assert_eq!(s.requirements, "Save recipes");
        assert_eq!(s.result, "better");
    }

    #[test]
    fn request_file_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("req.json");
        std::fs::write(
            &path,
            r#"{"title":"T","stack":["rust"],"requirements":"R","selectedAiTool":"claude","action":"generate"}"#,
        )
        .unwrap();
        let req = read_request(&path).unwrap();
        assert_eq!(req.selected_ai_tool, "claude");

        std::fs::write(&path, "{").unwrap();
        let err = read_request(&path).unwrap_err();
        assert!(err.to_string().contains("invalid request"), "got: {err}");
    }
}
