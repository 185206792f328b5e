//! Splits one model completion into the named documents of a tool profile.
//!
//! Every code path ends in a complete [`DocumentSet`]: a key is filled from a
//! fenced block, from its free-text section, from a heuristic, or from the
//! profile's static default.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::profile::{SectionSpec, ToolProfile};

/// Document key -> content. Holds every key of the profile it was built for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentSet(BTreeMap<String, String>);

impl DocumentSet {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, content: impl Into<String>) {
        self.0.insert(key.into(), content.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// True when every section of `profile` has an entry.
    pub fn covers(&self, profile: &ToolProfile) -> bool {
        profile.sections.iter().all(|s| self.0.contains_key(s.key))
    }
}

/// Where a document's content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    Fenced,
    Section,
    Preamble,
    WholeResponse,
    Default,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Fenced => "fenced",
            Source::Section => "section",
            Source::Preamble => "preamble",
            Source::WholeResponse => "whole-response",
            Source::Default => "default",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    pub documents: DocumentSet,
    pub sources: BTreeMap<String, Source>,
}

/// A header line recognised in the response.
#[derive(Debug, Clone, Copy)]
struct HeaderHit {
    section: usize,
    start: usize,
    /// Offset just past the header line (and its newline).
    body_start: usize,
}

/// Response text plus every recognised header, sorted by position.
struct Scan<'a> {
    text: &'a str,
    headers: Vec<HeaderHit>,
}

impl<'a> Scan<'a> {
    fn new(text: &'a str, profile: &ToolProfile) -> Self {
        let mut headers = Vec::new();
        for (idx, spec) in profile.sections.iter().enumerate() {
            let Some(re) = header_regex(spec) else { continue };
            for m in re.find_iter(text) {
                let body_start = match text[m.end()..].find('\n') {
                    Some(nl) => m.end() + nl + 1,
                    None => text.len(),
                };
                headers.push(HeaderHit { section: idx, start: m.start(), body_start });
            }
        }
        headers.sort_by_key(|h| (h.start, h.section));
        Self { text, headers }
    }

    /// First occurrence of a header for `section`.
    fn first_header(&self, section: usize) -> Option<HeaderHit> {
        self.headers.iter().copied().find(|h| h.section == section)
    }

    /// Offset of the next recognised header of any section at or after `from`.
    fn next_boundary(&self, from: usize) -> usize {
        self.headers
            .iter()
            .find(|h| h.start >= from)
            .map(|h| h.start)
            .unwrap_or(self.text.len())
    }
}

fn header_regex(spec: &SectionSpec) -> Option<Regex> {
    let labels: Vec<String> = spec.labels.iter().map(|l| regex::escape(l)).collect();
    let pattern = format!(r"(?im)^[ \t]*#{{1,6}}[ \t]*(?:{})\b[^\n]*$", labels.join("|"));
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(key = spec.key, error = %e, "header pattern rejected; section will use its default");
            None
        }
    }
}

/// What one strategy found for one section.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Extraction {
    content: String,
    source: Source,
}

type Strategy = fn(&Scan<'_>, usize, &SectionSpec) -> Option<Extraction>;

/// Tried in order; the first non-empty extraction wins.
const SECTION_STRATEGIES: &[Strategy] = &[fenced_block, section_text];
const PRIMARY_STRATEGIES: &[Strategy] = &[fenced_block, section_text, preamble];

/// Header, then a fence of the declared content type, captured up to its close.
fn fenced_block(scan: &Scan<'_>, section: usize, spec: &SectionSpec) -> Option<Extraction> {
    let lang = spec.fence?;
    let hit = scan.first_header(section)?;
    let content = fenced_body(&scan.text[hit.body_start..], lang)?;
    Some(Extraction { content: content.trim().to_string(), source: Source::Fenced })
}

/// Header, then everything up to the next recognised header or end of input.
fn section_text(scan: &Scan<'_>, section: usize, _spec: &SectionSpec) -> Option<Extraction> {
    let hit = scan.first_header(section)?;
    let end = scan.next_boundary(hit.body_start);
    let raw = &scan.text[hit.body_start..end.max(hit.body_start)];
    Some(Extraction { content: unwrap_fence(raw.trim()), source: Source::Section })
}

/// Text in front of the first recognised header, when there is one.
fn preamble(scan: &Scan<'_>, _section: usize, _spec: &SectionSpec) -> Option<Extraction> {
    if scan.headers.is_empty() {
        return None;
    }
    let end = scan.next_boundary(0);
    let content = unwrap_fence(scan.text[..end].trim());
    Some(Extraction { content, source: Source::Preamble })
}

fn fence_info(line: &str) -> Option<&str> {
    line.trim_start().strip_prefix("```").map(str::trim)
}

/// Body of a fenced block opening on the first non-blank line of `text`.
///
/// Fences opened with an info string nest; a bare fence closes the innermost
/// one. Returns `None` when the opening fence is missing or never closed.
fn fenced_body(text: &str, lang: &str) -> Option<String> {
    let mut lines = text.split('\n').skip_while(|l| l.trim().is_empty());
    let info = fence_info(lines.next()?)?;
    if !info.eq_ignore_ascii_case(lang) {
        return None;
    }

    let mut depth = 1usize;
    let mut body: Vec<&str> = Vec::new();
    for line in lines {
        if let Some(info) = fence_info(line) {
            if info.is_empty() {
                depth -= 1;
                if depth == 0 {
                    return Some(body.join("\n"));
                }
            } else {
                depth += 1;
            }
        }
        body.push(line);
    }
    None
}

/// Drop a fence wrapping the whole of `text`.
///
/// A leading fence line goes together with the bare fence that closes it on
/// the last line, or alone when it is never closed. Without a leading fence
/// only a stray trailing bare fence is dropped; balanced code blocks are
/// kept as written.
fn unwrap_fence(text: &str) -> String {
    let text = text.trim();
    let lines: Vec<&str> = text.lines().collect();
    let opened = lines.first().is_some_and(|l| fence_info(l).is_some());
    let body = if opened { &lines[1..] } else { &lines[..] };

    let mut depth = usize::from(opened);
    let mut outer_closed_at = None;
    for (i, line) in body.iter().enumerate() {
        match fence_info(line) {
            Some("") if depth > 0 => {
                depth -= 1;
                if depth == 0 && outer_closed_at.is_none() {
                    outer_closed_at = Some(i);
                }
            }
            Some(_) => depth += 1,
            None => {}
        }
    }

    let last_is_bare = body.last().is_some_and(|l| fence_info(l) == Some(""));
    let kept = match (opened, outer_closed_at) {
        (true, Some(i)) if i + 1 == body.len() => &body[..i],
        // Wrapped block followed by more text: not a wrapper.
        (true, Some(_)) => return text.to_string(),
        (true, None) => body,
        (false, _) if depth != 0 && last_is_bare => &body[..body.len() - 1],
        (false, _) => return text.to_string(),
    };
    kept.join("\n").trim().to_string()
}

/// Run the strategy chain for one section.
///
/// `Some` with empty content means a header was found but the section was
/// empty; `None` means nothing was found at all.
fn extract(scan: &Scan<'_>, section: usize, spec: &SectionSpec, strategies: &[Strategy]) -> Option<Extraction> {
    let mut explicit_empty = None;
    for strategy in strategies {
        match strategy(scan, section, spec) {
            Some(found) if !found.content.is_empty() => return Some(found),
            Some(found) if found.source != Source::Preamble => {
                explicit_empty.get_or_insert(found);
            }
            _ => {}
        }
    }
    explicit_empty
}

/// Split `raw` into the documents of `profile`.
pub fn segment(raw: &str, profile: &ToolProfile) -> DocumentSet {
    segment_detailed(raw, profile).documents
}

pub fn segment_detailed(raw: &str, profile: &ToolProfile) -> Segmentation {
    let text = raw.replace("\r\n", "\n");
    let scan = Scan::new(&text, profile);
    trace!(profile = profile.id, headers = scan.headers.len(), bytes = text.len(), "scanned response");

    let extractions: Vec<Option<Extraction>> = profile
        .sections
        .iter()
        .enumerate()
        .map(|(idx, spec)| {
            let strategies = if idx == 0 { PRIMARY_STRATEGIES } else { SECTION_STRATEGIES };
            extract(&scan, idx, spec, strategies)
        })
        .collect();

    let structured = extractions
        .iter()
        .any(|e| e.as_ref().is_some_and(|x| !x.content.is_empty()));

    let mut documents = DocumentSet::default();
    let mut sources = BTreeMap::new();

    if !structured {
        let whole = text.trim();
        debug!(profile = profile.id, bytes = whole.len(), "no structured sections found, using defaults");
        for (idx, spec) in profile.sections.iter().enumerate() {
            let (content, source) = if idx == 0 && !whole.is_empty() {
                (whole.to_string(), Source::WholeResponse)
            } else {
                (spec.default.to_string(), Source::Default)
            };
            documents.insert(spec.key, content);
            sources.insert(spec.key.to_string(), source);
        }
        return Segmentation { documents, sources };
    }

    for (spec, found) in profile.sections.iter().zip(extractions) {
        let (content, source) = match found {
            Some(x) => (x.content, x.source),
            None => (spec.default.to_string(), Source::Default),
        };
        debug!(key = spec.key, source = source.as_str(), bytes = content.len(), "section resolved");
        documents.insert(spec.key, content);
        sources.insert(spec.key.to_string(), source);
    }

    Segmentation { documents, sources }
}
