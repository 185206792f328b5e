use std::fmt::Write as _;

use crate::profile::ToolProfile;
use crate::segment::DocumentSet;
use crate::wire::{Action, GenerateRequest};

fn prompt_goals() -> &'static str {
r#"Please create a clear, actionable prompt that:
1. Clearly states the objective
2. Specifies the tech stack and tools to use
3. Outlines specific requirements and features
4. Includes any constraints or best practices
5. Is optimized for the selected AI tool
6. Uses the latest versions of mentioned technologies"#
}

fn enhance_goals(tool: &str, sections: bool) -> String {
    let target = if sections { "all sections" } else { "this prompt" };
    format!(r#"Please improve {target} by:
1. Making it more specific and actionable
2. Adding missing technical details that would be helpful
3. Structuring it better for AI comprehension
4. Including relevant best practices or constraints
5. Following prompt engineering best practices
6. Optimizing it for {tool}
7. Ensuring the latest versions of the mentioned technologies are used"#)
}

/// Instruction for a first generation.
pub fn generate_prompt(req: &GenerateRequest, profile: &ToolProfile) -> String {
    let tool = profile.display_name;
    format!(
        r#"You are an expert at creating high-quality prompts for AI coding assistants.

Create a comprehensive prompt for the following developer request, optimized for {tool}:

Title: {title}
AI Tool: {tool}
Technology Stack: {stack}
Requirements: {requirements}

{instructions}

{goals}

{format}"#,
        title = req.title.trim(),
        stack = req.stack.join(", "),
        requirements = req.requirements.trim(),
        instructions = profile.instructions,
        goals = prompt_goals(),
        format = profile.output_format(),
    )
}

/// Instruction asking the model to improve `previous` while keeping the
/// profile's section layout.
pub fn enhance_prompt(previous: &str, profile: &ToolProfile) -> String {
    let tool = profile.display_name;
    if !profile.is_multi_document() {
        return format!(
            "You are an expert at improving prompts for AI coding assistants. Please enhance the following prompt to make it more effective for {tool}:\n\n{previous}\n\n{goals}",
            previous = previous.trim(),
            goals = enhance_goals(tool, false),
        );
    }

    let mut structure = String::new();
    for s in profile.sections {
        let _ = write!(structure, "\n- ## {} section", s.heading);
        if s.fence.is_some() {
            structure.push_str(" (in markdown code block)");
        }
    }
    format!(
        "You are an expert at improving prompts for AI coding assistants, specifically {tool}. Please enhance the following {count}-part prompt structure to make it more effective:\n\n{previous}\n\n{goals}\n\nMaintain the exact same structure with:{structure}\n\nEnhance the content while keeping the format identical.",
        count = profile.sections.len(),
        previous = previous.trim(),
        goals = enhance_goals(tool, true),
    )
}

/// Compose the provider prompt for `req`.
pub fn compose(req: &GenerateRequest, profile: &ToolProfile) -> String {
    match req.action {
        Action::Generate => generate_prompt(req, profile),
        Action::Enhance => enhance_prompt(&req.requirements, profile),
    }
}

/// Lay previous documents out the way the model was asked to produce them,
/// so an enhance round trip can be segmented again.
pub fn render_documents(profile: &ToolProfile, docs: &DocumentSet) -> String {
    let mut parts = Vec::with_capacity(profile.sections.len());
    for s in profile.sections {
        let body = docs.get(s.key).unwrap_or(s.default).trim();
        let part = match s.fence {
            Some(lang) => format!("## {}\n```{lang}\n{body}\n```", s.heading),
            None => format!("## {}\n{body}", s.heading),
        };
        parts.push(part);
    }
    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{CURSOR, GENERAL, GITHUB_COPILOT};
    use crate::segment::segment;
    use pretty_assertions::assert_eq;

    fn request(action: Action) -> GenerateRequest {
        GenerateRequest {
            title: "Recipe box".into(),
            stack: vec!["nextjs".into(), "prisma".into()],
            requirements: "Users save and tag recipes.".into(),
            selected_ai_tool: "cursor".into(),
            action,
        }
    }

    #[test]
    fn generate_prompt_carries_fields_and_format() {
        let p = compose(&request(Action::Generate), &CURSOR);
        assert!(p.contains("Title: Recipe box"));
        assert!(p.contains("Technology Stack: nextjs, prisma"));
        assert!(p.contains("Requirements: Users save and tag recipes."));
        assert!(p.contains("optimized for Cursor AI"));
        assert!(p.contains("## Cursor Rules (.cursor/rules)"));
    }

    #[test]
    fn enhance_lists_sections_to_keep() {
        let p = enhance_prompt("## Main Prompt\nold", &GITHUB_COPILOT);
        assert!(p.contains("3-part prompt structure"));
        assert!(p.contains("- ## Main Prompt section\n"));
        assert!(p.contains("- ## Workspace Instructions (.instructions.md) section (in markdown code block)"));
        assert!(p.contains("## Main Prompt\nold"));
    }

    #[test]
    fn enhance_single_document_tool() {
        let p = enhance_prompt("  build a blog  ", &GENERAL);
        assert!(p.contains("more effective for General AI Assistant:\n\nbuild a blog\n"));
        assert!(!p.contains("Maintain the exact same structure"));
    }

    #[test]
    fn rendered_documents_segment_back_to_themselves() {
        let mut docs = DocumentSet::default();
        docs.insert("mainPrompt", "Build it.");
        docs.insert("cursorRules", "# Rules\n- be strict");
        docs.insert("codeGenerationRules", "# Gen\n```ts\nlet x = 1;\n```");
        let text = render_documents(&CURSOR, &docs);
        assert_eq!(segment(&text, &CURSOR), docs);
    }

    #[test]
    fn main_prompt_with_trailing_code_block_survives_round_trip() {
        let mut docs = DocumentSet::default();
        docs.insert("mainPrompt", "Run:\n```sh\ncargo run\n```");
        docs.insert("cursorRules", "strict");
        docs.insert("codeGenerationRules", "small");
        let text = render_documents(&CURSOR, &docs);
        assert_eq!(segment(&text, &CURSOR), docs);
    }
}
