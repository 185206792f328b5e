use std::fmt::Write as _;

mod defaults;

/// Document key of the primary document every profile produces.
pub const MAIN_PROMPT_KEY: &str = "mainPrompt";

/// One named document a tool profile expects in the model output.
#[derive(Debug)]
pub struct SectionSpec {
    /// Wire name of the document (`files` key in the response).
    pub key: &'static str,
    /// Heading used when asking the model for this section.
    pub heading: &'static str,
    /// Header labels recognised in model output, matched case-insensitively.
    pub labels: &'static [&'static str],
    /// Content type of the fenced block wrapping the section, if any.
    pub fence: Option<&'static str>,
    /// Where the document lives in a project, relative to its root.
    pub file_path: Option<&'static str>,
    pub guidance: &'static str,
    pub default: &'static str,
}

#[derive(Debug)]
pub struct ToolProfile {
    pub id: &'static str,
    pub aliases: &'static [&'static str],
    pub display_name: &'static str,
    pub instructions: &'static str,
    /// The first section is always the primary document.
    pub sections: &'static [SectionSpec],
}

const MAIN_PROMPT: SectionSpec = SectionSpec {
    key: MAIN_PROMPT_KEY,
    heading: "Main Prompt",
    labels: &["Main Prompt"],
    fence: None,
    file_path: None,
    guidance: "A complete prompt covering the project overview, the requirements, and the technology stack.",
    default: defaults::MAIN_PROMPT,
};

const RULES_GUIDANCE: &str = "Project overview, technology stack (latest stable versions unless pinned), coding guidelines, project structure, code style, dependencies, testing requirements, performance and security guidelines.";

const WORKFLOW_GUIDANCE: &str = "Development workflow, file templates, common patterns, error handling, API and database guidelines where applicable, deployment, and troubleshooting.";

pub static GITHUB_COPILOT: ToolProfile = ToolProfile {
    id: "github-copilot",
    aliases: &["copilot", "github_copilot", "vscode"],
    display_name: "GitHub Copilot (VS Code)",
    instructions: "For GitHub Copilot in VS Code, create instructions that work well with:
- Inline code suggestions and completions
- Chat-based code generation
- Context-aware suggestions
- VS Code workspace integration",
    sections: &[
        MAIN_PROMPT,
        SectionSpec {
            key: "copilotInstructions",
            heading: "Custom Instructions (.github/copilot-instructions.md)",
            labels: &["Custom Instructions", "GitHub Copilot Instructions"],
            fence: Some("markdown"),
            file_path: Some(".github/copilot-instructions.md"),
            guidance: RULES_GUIDANCE,
            default: defaults::COPILOT_INSTRUCTIONS,
        },
        SectionSpec {
            key: "workspaceInstructions",
            heading: "Workspace Instructions (.instructions.md)",
            labels: &["Workspace Instructions"],
            fence: Some("markdown"),
            file_path: Some(".github/instructions/project.instructions.md"),
            guidance: WORKFLOW_GUIDANCE,
            default: defaults::COPILOT_WORKSPACE,
        },
    ],
};

pub static CURSOR: ToolProfile = ToolProfile {
    id: "cursor",
    aliases: &["cursor-ai"],
    display_name: "Cursor AI",
    instructions: "For Cursor AI, optimize for:
- Multi-file editing capabilities
- AI-assisted refactoring
- Code generation with context awareness
- Intelligent code suggestions",
    sections: &[
        MAIN_PROMPT,
        SectionSpec {
            key: "cursorRules",
            heading: "Cursor Rules (.cursor/rules)",
            labels: &["Cursor Rules"],
            fence: Some("markdown"),
            file_path: Some(".cursor/rules/project.mdc"),
            guidance: RULES_GUIDANCE,
            default: defaults::CURSOR_RULES,
        },
        SectionSpec {
            key: "codeGenerationRules",
            heading: "Code Generation Rules (.cursor/rules/code-generation.mdc)",
            labels: &["Code Generation Rules"],
            fence: Some("markdown"),
            file_path: Some(".cursor/rules/code-generation.mdc"),
            guidance: WORKFLOW_GUIDANCE,
            default: defaults::CURSOR_CODE_GENERATION,
        },
    ],
};

pub static WINDSURF: ToolProfile = ToolProfile {
    id: "windsurf",
    aliases: &[],
    display_name: "Windsurf",
    instructions: "For Windsurf, focus on:
- Collaborative AI coding
- Project-wide understanding
- Advanced code generation
- Multi-language support",
    sections: &[
        MAIN_PROMPT,
        SectionSpec {
            key: "windsurfConfig",
            heading: "Windsurf-Specific Configuration",
            labels: &["Windsurf-Specific Configuration", "Windsurf Configuration"],
            fence: Some("markdown"),
            file_path: Some(".windsurfrules"),
            guidance: "Instructions tailored to Windsurf's collaborative, project-wide features.",
            default: defaults::WINDSURF_CONFIG,
        },
    ],
};

pub static V0: ToolProfile = ToolProfile {
    id: "v0",
    aliases: &["v0-vercel"],
    display_name: "v0 by Vercel",
    instructions: "For v0 by Vercel, emphasize:
- React component generation
- Next.js integration
- UI/UX focused development
- Modern web development practices",
    sections: &[
        MAIN_PROMPT,
        SectionSpec {
            key: "componentGuidelines",
            heading: "Component Guidelines",
            labels: &["Component Guidelines"],
            fence: Some("markdown"),
            file_path: None,
            guidance: "Guidelines for generating React components with v0.",
            default: defaults::V0_COMPONENT_GUIDELINES,
        },
    ],
};

pub static CLAUDE: ToolProfile = ToolProfile {
    id: "claude",
    aliases: &["anthropic"],
    display_name: "Claude (Anthropic)",
    instructions: "For Claude (Anthropic), structure for:
- Detailed reasoning and explanation
- Step-by-step code generation
- Best practices and documentation
- Thorough analysis and planning",
    sections: &[
        MAIN_PROMPT,
        SectionSpec {
            key: "additionalContext",
            heading: "Additional Context",
            labels: &["Additional Context"],
            fence: Some("markdown"),
            file_path: Some("CLAUDE.md"),
            guidance: "Background, constraints, and reasoning Claude should keep in mind.",
            default: defaults::CLAUDE_CONTEXT,
        },
    ],
};

pub static CHATGPT: ToolProfile = ToolProfile {
    id: "chatgpt",
    aliases: &["openai", "gpt"],
    display_name: "ChatGPT",
    instructions: "For ChatGPT, optimize for:
- Conversational code generation
- Iterative development approach
- Clear explanations and examples
- Multi-step problem solving",
    sections: &[
        MAIN_PROMPT,
        SectionSpec {
            key: "followUpInstructions",
            heading: "Follow-up Instructions",
            labels: &["Follow-up Instructions", "Follow up Instructions"],
            fence: Some("markdown"),
            file_path: None,
            guidance: "Guidelines for iterating on the result over several turns.",
            default: defaults::CHATGPT_FOLLOW_UP,
        },
    ],
};

pub static GENERAL: ToolProfile = ToolProfile {
    id: "general",
    aliases: &["generic"],
    display_name: "General AI Assistant",
    instructions: "For general AI assistants, ensure:
- Clear, detailed instructions
- Technology-specific guidance
- Best practices inclusion
- Comprehensive context",
    sections: &[MAIN_PROMPT],
};

static PROFILES: [&ToolProfile; 7] = [
    &GITHUB_COPILOT,
    &CURSOR,
    &WINDSURF,
    &V0,
    &CLAUDE,
    &CHATGPT,
    &GENERAL,
];

/// Every registered profile, in display order.
pub fn all() -> &'static [&'static ToolProfile] {
    &PROFILES
}

/// Look up a profile by id or alias. Unknown ids fall back to [`GENERAL`].
pub fn resolve(tool_id: &str) -> &'static ToolProfile {
    let wanted = tool_id.trim().to_lowercase();
    PROFILES
        .iter()
        .copied()
        .find(|p| p.id == wanted || p.aliases.iter().any(|a| *a == wanted))
        .unwrap_or_else(|| {
            if !wanted.is_empty() {
                tracing::debug!(tool_id = %tool_id, "unknown tool id, using general profile");
            }
            &GENERAL
        })
}

impl ToolProfile {
    pub fn primary(&self) -> &SectionSpec {
        &self.sections[0]
    }

    pub fn section(&self, key: &str) -> Option<&SectionSpec> {
        self.sections.iter().find(|s| s.key == key)
    }

    /// Profiles with more than one section return a `files` map.
    pub fn is_multi_document(&self) -> bool {
        self.sections.len() > 1
    }

    /// The output layout the model is asked to follow.
    pub fn output_format(&self) -> String {
        let mut out = format!(
            "Generate the output in this EXACT format for {}. Replace every description with actual, project-specific content:\n",
            self.display_name
        );
        for s in self.sections {
            let _ = write!(out, "\n## {}\n", s.heading);
            match s.fence {
                Some(lang) => {
                    let _ = write!(out, "```{lang}\n{}\n```\n", s.guidance);
                }
                None => {
                    let _ = writeln!(out, "{}", s.guidance);
                }
            }
        }
        out.push_str("\nCRITICAL: Do not leave placeholder text like [brackets] or generic descriptions in the output.");
        out
    }
}
