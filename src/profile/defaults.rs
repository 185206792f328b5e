//! Static boilerplate used when a model response is missing a section.

pub const MAIN_PROMPT: &str = r#"# Project Prompt

Describe the objective of the project and who it serves. Build it with the
technology stack listed below, using the latest stable version of every
technology that is not pinned to a version.

- Implement the requested features incrementally and keep each change small.
- Follow the conventions of the chosen frameworks.
- Ask clarifying questions before writing code when a requirement is ambiguous."#;

pub const COPILOT_INSTRUCTIONS: &str = r#"# GitHub Copilot (VS Code) Custom Instructions

## Project Overview
A software project built with modern development practices.

## Technology Stack
- Use the latest stable versions of the specified technologies
- Follow the idiomatic patterns of each framework
- Keep the dependency list small and intentional

## Coding Guidelines
- Write clean, maintainable, documented code
- Handle errors explicitly and close to their source
- Prefer type-safe APIs where the language offers them

## Code Style Preferences
- Keep formatting consistent and enforce it with the project formatter
- Use descriptive names for variables, functions, and files
- Group imports logically

## Testing Requirements
- Cover business logic with unit tests
- Add integration tests for critical paths

## Performance Considerations
- Measure before optimizing
- Cache expensive work where it is safe to do so"#;

pub const COPILOT_WORKSPACE: &str = r#"---
applyTo: "**"
description: "Project-specific coding instructions"
---

# Workspace Instructions

## Development Workflow
1. Work on feature branches and open a pull request for every change
2. Write descriptive commit messages
3. Request a review before merging

## Common Patterns
- Keep modules small with a single responsibility
- Reuse shared utilities instead of duplicating logic

## Error Handling
- Log failures with enough context to reproduce them
- Surface user-facing errors with clear, actionable messages

## Troubleshooting
- Check the logs first
- Verify dependencies and environment variables are configured"#;

pub const CURSOR_RULES: &str = r#"---
description: "Project-specific AI coding rules"
globs:
alwaysApply: true
---

# Project Rules

## Project Overview
A software project built with modern development practices.

## Technology Stack
- Use the latest stable versions of the specified technologies
- Follow the idiomatic patterns of each framework

## Coding Guidelines
- Write clean, maintainable, documented code
- Handle errors explicitly
- Keep functions focused and short

## Testing Requirements
- Cover business logic with unit tests
- Add integration tests for critical paths"#;

pub const CURSOR_CODE_GENERATION: &str = r#"---
description: "Code generation and modification guidelines"
globs: "**/*.{js,ts,jsx,tsx,py,java,cpp,go,rs}"
alwaysApply: false
---

# Code Generation Guidelines

## Development Workflow
1. Make the smallest change that satisfies the request
2. Keep existing behavior intact unless asked to change it
3. Update tests alongside the code they cover

## Common Patterns
- Match the naming and structure of neighbouring files
- Separate I/O from pure logic

## Error Handling
- Never swallow errors silently
- Provide meaningful error messages"#;

pub const WINDSURF_CONFIG: &str = r#"# Windsurf Configuration

- Index the whole workspace before proposing multi-file changes
- Explain the plan before editing more than one file
- Keep generated code consistent with the existing project structure
- Run the project's tests after each change"#;

pub const V0_COMPONENT_GUIDELINES: &str = r#"# Component Guidelines

- Generate React components with TypeScript props
- Style with Tailwind CSS utility classes
- Keep components accessible: semantic HTML, labels, keyboard support
- Integrate with the Next.js App Router conventions"#;

pub const CLAUDE_CONTEXT: &str = r#"# Additional Context

- Reason step by step before writing code and state assumptions explicitly
- Prefer complete, runnable examples over fragments
- Document public interfaces and non-obvious decisions
- Point out trade-offs when several approaches are viable"#;

pub const CHATGPT_FOLLOW_UP: &str = r#"# Follow-up Instructions

1. Start with a minimal working version
2. Review it together and list what is missing
3. Add features one at a time, testing each before moving on
4. Refactor once the behavior is settled"#;
