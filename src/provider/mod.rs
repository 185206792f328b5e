use anyhow::Result;
use async_trait::async_trait;

use crate::cli::ProviderKind;

pub mod openai;
pub mod anthropic;
pub mod ollama;

/// A text-generation service: one prompt in, one completion out.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Errors on transport failure, non-success status, unparseable body,
    /// or an empty completion.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

pub type DynProvider = Box<dyn Provider + Send + Sync>;

pub fn make_provider(
    kind: ProviderKind,
    model: String,
    timeout_secs: u64,
    api_base: Option<String>,
) -> Result<DynProvider> {
    let prov: DynProvider = match kind {
        ProviderKind::Groq => {
            let p = openai::OpenAIProvider::groq(model, timeout_secs);
            Box::new(match api_base {
                Some(base) => p.with_api_base(base),
                None => p,
            })
        }
        ProviderKind::OpenAI => {
            let p = openai::OpenAIProvider::new(model, timeout_secs);
            Box::new(match api_base {
                Some(base) => p.with_api_base(base),
                None => p,
            })
        }
        ProviderKind::Anthropic => {
            let p = anthropic::Anthropic::new(model, timeout_secs)?;
            Box::new(match api_base {
                Some(base) => p.with_api_base(base),
                None => p,
            })
        }
        ProviderKind::Ollama => Box::new(ollama::Ollama::new(model, api_base, timeout_secs)?),
    };
    Ok(prov)
}

/// Reject blank completions; the caller treats them like any other failure.
pub(crate) fn non_empty(provider: &str, content: Option<String>) -> Result<String> {
    match content {
        Some(c) if !c.trim().is_empty() => Ok(c),
        _ => Err(crate::errors::PromptGenError::EmptyCompletion { provider: provider.to_string() }.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_rejects_blank_and_missing() {
        assert!(non_empty("groq", None).is_err());
        let err = non_empty("groq", Some("  \n".into())).unwrap_err();
        assert_eq!(err.to_string(), "groq returned an empty completion");
        assert_eq!(non_empty("groq", Some("ok".into())).unwrap(), "ok");
    }

    #[test]
    fn make_provider_builds_every_kind() {
        for (kind, name) in [
            (ProviderKind::Groq, "groq"),
            (ProviderKind::OpenAI, "openai"),
            (ProviderKind::Anthropic, "anthropic"),
            (ProviderKind::Ollama, "ollama"),
        ] {
            let p = make_provider(kind, "m".into(), 5, None).unwrap();
            assert_eq!(p.name(), name);
        }
    }
}
