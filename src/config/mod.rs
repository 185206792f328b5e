use anyhow::Context;
use clap::ValueEnum;
use fs_err as fs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cli::{Args, ProviderKind};
use crate::errors::PromptGenError;

// Precedence: CLI > env > file > defaults.

pub const DEFAULT_CONFIG_FILE: &str = "vibe_prompt.toml";
const ENV_PREFIX: &str = "VIBE_PROMPT_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub provider: ProviderKind,
    pub model: String,
    /// Overrides the provider's default endpoint (Ollama: server URL).
    pub api_base: Option<String>,
    pub timeout_secs: u64,
    pub session_path: PathBuf,
    pub out_root: PathBuf,
    pub artifacts_dir: PathBuf,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Groq,
            model: ProviderKind::Groq.default_model().into(),
            api_base: None,
            timeout_secs: 120,
            session_path: PathBuf::from(".vibe/session.json"),
            out_root: PathBuf::from("."),
            artifacts_dir: PathBuf::from(".vibe"),
            log_level: None,
            log_file: None,
        }
    }
}

/// One configuration source; unset fields defer to lower layers.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Layer {
    provider: Option<ProviderKind>,
    model: Option<String>,
    api_base: Option<String>,
    timeout_secs: Option<u64>,
    session_path: Option<PathBuf>,
    out_root: Option<PathBuf>,
    artifacts_dir: Option<PathBuf>,
    log_level: Option<String>,
    log_file: Option<PathBuf>,
}

impl Layer {
    /// Fields set in `upper` win.
    fn under(self, upper: Layer) -> Layer {
        Layer {
            provider: upper.provider.or(self.provider),
            model: upper.model.or(self.model),
            api_base: upper.api_base.or(self.api_base),
            timeout_secs: upper.timeout_secs.or(self.timeout_secs),
            session_path: upper.session_path.or(self.session_path),
            out_root: upper.out_root.or(self.out_root),
            artifacts_dir: upper.artifacts_dir.or(self.artifacts_dir),
            log_level: upper.log_level.or(self.log_level),
            log_file: upper.log_file.or(self.log_file),
        }
    }
}

impl Config {
    /// Resolve configuration from `args`, the process environment, and the
    /// config file (`--config`, else `vibe_prompt.toml` when present).
    pub fn load(args: &Args) -> anyhow::Result<Self> {
        Self::load_with_env(args, |suffix| {
            std::env::var(format!("{ENV_PREFIX}{suffix}")).ok().filter(|v| !v.is_empty())
        })
    }

    fn load_with_env(args: &Args, env: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let file = match &args.config {
            Some(path) => load_file_layer(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => load_file_layer(Path::new(DEFAULT_CONFIG_FILE))?,
            None => Layer::default(),
        };
        let merged = file.under(env_layer(&env)?).under(cli_layer(args));
        Ok(Self::from_layer(merged))
    }

    fn from_layer(layer: Layer) -> Self {
        let d = Config::default();
        let provider = layer.provider.unwrap_or(d.provider);
        Self {
            provider,
            model: layer.model.unwrap_or_else(|| provider.default_model().to_string()),
            api_base: layer.api_base,
            timeout_secs: layer.timeout_secs.unwrap_or(d.timeout_secs),
            session_path: layer.session_path.unwrap_or(d.session_path),
            out_root: layer.out_root.unwrap_or(d.out_root),
            artifacts_dir: layer.artifacts_dir.unwrap_or(d.artifacts_dir),
            log_level: layer.log_level,
            log_file: layer.log_file,
        }
    }
}

fn load_file_layer(path: &Path) -> anyhow::Result<Layer> {
    let text = fs::read_to_string(path)?;
    toml::from_str(&text).with_context(|| format!("invalid config file {}", path.display()))
}

fn env_layer(env: &impl Fn(&str) -> Option<String>) -> Result<Layer, PromptGenError> {
    let provider = match env("PROVIDER") {
        Some(v) => Some(ProviderKind::from_str(&v, true).map_err(|detail| PromptGenError::ConfigEnv {
            var: format!("{ENV_PREFIX}PROVIDER"),
            detail,
        })?),
        None => None,
    };
    let timeout_secs = match env("TIMEOUT_SECS") {
        Some(v) => Some(v.trim().parse::<u64>().map_err(|e| PromptGenError::ConfigEnv {
            var: format!("{ENV_PREFIX}TIMEOUT_SECS"),
            detail: e.to_string(),
        })?),
        None => None,
    };
    Ok(Layer {
        provider,
        model: env("MODEL"),
        api_base: env("API_BASE"),
        timeout_secs,
        session_path: env("SESSION").map(PathBuf::from),
        out_root: env("OUT_ROOT").map(PathBuf::from),
        artifacts_dir: env("ARTIFACTS_DIR").map(PathBuf::from),
        log_level: env("LOG_LEVEL"),
        log_file: env("LOG_FILE").map(PathBuf::from),
    })
}

fn cli_layer(args: &Args) -> Layer {
    Layer {
        provider: args.provider,
        model: args.model.clone(),
        api_base: args.api_base.clone(),
        timeout_secs: args.timeout_secs,
        session_path: args.session.clone(),
        out_root: args.out_root.clone(),
        artifacts_dir: None,
        log_level: args.debug.then(|| "debug".to_string()),
        log_file: None,
    }
}
