use colored::Colorize;
use humansize::{format_size, DECIMAL};
use std::io::{self, Write};

use crate::apply::{ApplyKind, ApplySummary};
use crate::patch;
use crate::profile::{self, ToolProfile};
use crate::segment::{Segmentation, Source};

fn source_tag(source: Source) -> colored::ColoredString {
    let tag = format!("[{}]", source.as_str().to_uppercase());
    match source {
        Source::Fenced | Source::Section => tag.green().bold(),
        Source::Preamble | Source::WholeResponse => tag.yellow().bold(),
        Source::Default => tag.red().bold(),
    }
}

/// Print each document under its heading, tagged with where it came from.
pub fn show_documents(profile: &ToolProfile, seg: &Segmentation) {
    println!("\n=== {} ===", profile.display_name.bold());
    for spec in profile.sections {
        let body = seg.documents.get(spec.key).unwrap_or_default();
        let source = seg.sources.get(spec.key).copied().unwrap_or(Source::Default);
        let target = spec.file_path.map(|p| format!("  -> {p}")).unwrap_or_default();
        println!(
            "\n{} {}  {}{}",
            source_tag(source),
            spec.heading.bold(),
            format_size(body.len() as u64, DECIMAL).dimmed(),
            target.dimmed()
        );
        println!("{}", body);
    }
    println!();
}

pub fn show_result(result: &str) {
    println!("\n{}\n", result);
}

pub fn list_tools() {
    println!("{}", "Supported tools:".bold());
    for p in profile::all() {
        let docs = p.sections.iter().map(|s| s.heading).collect::<Vec<_>>().join(", ");
        println!("  {:<16} {}", p.id.cyan().bold(), p.display_name);
        println!("  {:<16} {}", "", docs.dimmed());
    }
}

pub fn show_stack_hints(hints: &[(String, &'static str)]) {
    for (typed, suggestion) in hints {
        eprintln!("{} '{}' looks like '{}'", "hint:".cyan().bold(), typed, suggestion);
    }
}

pub fn confirm(prompt: &str) -> bool {
    print!("{} [y/N]: ", prompt);
    let _ = io::stdout().flush();
    let mut s = String::new();
    if io::stdin().read_line(&mut s).is_ok() {
        let ans = s.trim().to_lowercase();
        ans == "y" || ans == "yes"
    } else {
        false
    }
}

pub fn print_preview_dashboard(previews: &[patch::Preview]) {
    let count = |k: patch::ChangeKind| previews.iter().filter(|p| p.kind == k).count();

    println!("\n{}", "┏━━━━━━━━━━━━━━━━━━━━━━━━ Preview ━━━━━━━━━━━━━━━━━━━━━━━━┓".bold());
    println!(
        "  {}: {}   {}: {}   {}: {}",
        "Create".green().bold(),
        count(patch::ChangeKind::Create),
        "Update".yellow().bold(),
        count(patch::ChangeKind::Update),
        "Unchanged".dimmed(),
        count(patch::ChangeKind::Unchanged)
    );
    println!("{}", "┗━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┛".bold());

    for p in previews {
        println!("{}\n", patch::colorize_preview(p));
    }
}

pub fn print_apply_dashboard(sum: &ApplySummary, dry: bool) {
    let title = if dry { "Dry Run" } else { "Written" };
    println!("\n{}", format!("━━━━━━━━━━━━━━━━━━━━━━━━ {title} ━━━━━━━━━━━━━━━━━━━━━━━━").bold());
    println!(
        "  {}: {}   {}: {}   {}: {}   {}: {}",
        "Created".green().bold(),
        sum.created,
        "Updated".yellow().bold(),
        sum.updated,
        "Skipped".bold(),
        sum.skipped,
        "Size".bold(),
        format_size(sum.bytes_written, DECIMAL)
    );
    for d in &sum.details {
        let tag = match d.kind {
            ApplyKind::Created => "created".green(),
            ApplyKind::Updated => "updated".yellow(),
            ApplyKind::Skipped => "unchanged".dimmed(),
        };
        println!("  {:>9}  {}", tag, d.path.display());
    }
}

pub fn print_failure(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message);
}
