use fs_err as fs;
use serde::Serialize;
use serde_json::to_string_pretty;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};
use uuid::Uuid;

const DEFAULT_LOG_LEVEL: &str = "info";
const ENV_VAR_NAME: &str = "VIBE_PROMPT_LOG";

static INIT: Once = Once::new();

/// Install the global subscriber: compact lines on stderr, plus JSON lines
/// appended to `log_file` when given. Filter: `VIBE_PROMPT_LOG` > `log_level` > info.
pub fn init(log_level: Option<&str>, log_file: Option<&Path>) -> anyhow::Result<()> {
    let mut result = Ok(());
    INIT.call_once(|| result = try_init(log_level, log_file));
    result
}

fn try_init(log_level: Option<&str>, log_file: Option<&Path>) -> anyhow::Result<()> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_filter(build_filter(log_level));

    let registry = tracing_subscriber::registry().with(stderr_layer);
    let installed = match log_file {
        Some(path) => {
            let file = open_log_file(path)?;
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file).with_max_level(Level::DEBUG))
                .with_ansi(false)
                .json();
            registry.with(file_layer).try_init()
        }
        None => registry.try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))
}

fn build_filter(log_level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_env(ENV_VAR_NAME)
        .unwrap_or_else(|_| EnvFilter::new(log_level.unwrap_or(DEFAULT_LOG_LEVEL)))
}

fn open_log_file(path: &Path) -> anyhow::Result<std::fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    Ok(file.into_parts().0)
}

pub struct SavedPaths {
    pub dir: PathBuf,
    pub request: Option<PathBuf>,
    pub response: Option<PathBuf>,
}

fn tx_dir(artifacts_dir: &Path, tx: Uuid) -> PathBuf {
    artifacts_dir.join("tx").join(tx.to_string())
}

/// Persist one provider exchange as pretty JSON under `<artifacts_dir>/tx/<tx>/`.
pub fn save_stage<Q: Serialize, R: Serialize>(
    stage: &str,
    request: &Q,
    response: &R,
    tx: Uuid,
    artifacts_dir: &Path,
    save_request: bool,
    save_response: bool,
) -> anyhow::Result<SavedPaths> {
    let dir = tx_dir(artifacts_dir, tx);
    fs::create_dir_all(&dir)?;

    let request = if save_request {
        let p = dir.join(format!("{stage}.request.json"));
        fs::write(&p, to_string_pretty(request)?)?;
        Some(p)
    } else {
        None
    };

    let response = if save_response {
        let p = dir.join(format!("{stage}.response.json"));
        fs::write(&p, to_string_pretty(response)?)?;
        Some(p)
    } else {
        None
    };

    Ok(SavedPaths { dir, request, response })
}

pub fn log_saved_paths(stage: &str, saved: &SavedPaths) {
    tracing::info!(
        stage,
        dir = %saved.dir.display(),
        request = saved.request.as_ref().map(|p| p.display().to_string()),
        response = saved.response.as_ref().map(|p| p.display().to_string()),
        "artifacts saved"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn explicit_level_is_used_without_env() {
        if std::env::var(ENV_VAR_NAME).is_ok() {
            return;
        }
        assert!(build_filter(Some("debug")).to_string().contains("debug"));
        assert!(build_filter(None).to_string().contains("info"));
    }

    #[test]
    fn saves_only_requested_sides() {
        let dir = tempfile::tempdir().unwrap();
        let tx = Uuid::new_v4();
        let saved = save_stage(
            "generate",
            &json!({ "prompt": "p" }),
            &json!({ "completion": "c" }),
            tx,
            dir.path(),
            true,
            false,
        )
        .unwrap();

        assert_eq!(saved.dir, dir.path().join("tx").join(tx.to_string()));
        let req = saved.request.expect("request saved");
        assert!(req.ends_with("generate.request.json"));
        assert!(std::fs::read_to_string(req).unwrap().contains("\"prompt\": \"p\""));
        assert!(saved.response.is_none());
    }

    #[test]
    fn log_file_parent_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("vibe.log");
        open_log_file(&path).unwrap();
        assert!(path.exists());
    }
}
