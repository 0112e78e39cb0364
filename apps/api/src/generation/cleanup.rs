//! Post-processing for generated text before it is rendered.
//!
//! Small instruction-tuned models often wrap the document in code fences,
//! open with "Here is your resume:" or append notes about what they wrote.
//! None of that belongs in the PDF.

const CLOSING_PHRASES: &[&str] = &[
    "sincerely",
    "best regards",
    "kind regards",
    "warm regards",
    "regards",
    "yours truly",
    "yours sincerely",
    "respectfully",
];

const PREAMBLE_PREFIXES: &[&str] = &["here is", "here's", "sure", "certainly", "below is"];

/// Lines that only ever open a note about the generated document.
const COMMENTARY_PREFIXES: &[&str] = &[
    "note:",
    "note that",
    "nb:",
    "this resume",
    "this cover letter",
    "this code",
    "the above",
];

/// Sign-off chatter. Letters legitimately use these phrases, so only resumes
/// are cut on them.
const CONVERSATIONAL_PREFIXES: &[&str] = &["i hope", "let me know", "feel free"];

/// Markers that identify a fenced block as code rather than prose.
const CODE_MARKERS: &[&str] = &["def ", "print(", "class ", "fn ", "return ", "import "];

/// Tidies a generated resume.
pub fn clean_resume(text: &str) -> String {
    let mut lines = common_pass(text);
    cut_commentary(&mut lines, &[COMMENTARY_PREFIXES, CONVERSATIONAL_PREFIXES]);
    finish(lines)
}

/// Tidies a generated cover letter and cuts everything after the signature.
pub fn clean_cover_letter(text: &str) -> String {
    let mut lines = common_pass(text);

    if let Some(closing) = lines.iter().position(|l| is_closing_phrase(l)) {
        // Keep the closing phrase and the first non-empty line after it (the name).
        let end = lines[closing + 1..]
            .iter()
            .position(|l| !l.trim().is_empty())
            .map(|offset| closing + 1 + offset + 1)
            .unwrap_or(closing + 1);
        lines.truncate(end);
    } else {
        cut_commentary(&mut lines, &[COMMENTARY_PREFIXES]);
    }

    finish(lines)
}

fn common_pass(text: &str) -> Vec<String> {
    let text = strip_comment_wrapper(text.trim());
    let text = unfence(text);

    let mut lines: Vec<String> = text
        .lines()
        .filter(|l| !is_separator(l))
        .map(strip_markdown)
        .collect();

    // Drop chatty preamble lines before the document starts.
    while let Some(first) = lines.iter().position(|l| !l.trim().is_empty()) {
        let lower = lines[first].trim().to_lowercase();
        if PREAMBLE_PREFIXES.iter().any(|p| lower.starts_with(p)) && lower.ends_with(':') {
            lines.drain(..=first);
        } else {
            break;
        }
    }

    lines
}

/// Cuts everything from the first commentary line on. The first line is
/// never commentary.
fn cut_commentary(lines: &mut Vec<String>, prefix_sets: &[&[&str]]) {
    if let Some(cut) = lines.iter().skip(1).position(|l| {
        let lower = l.trim().to_lowercase();
        prefix_sets
            .iter()
            .flat_map(|set| set.iter())
            .any(|p| lower.starts_with(p))
    }) {
        lines.truncate(cut + 1);
    }
}

/// Collapses runs of blank lines and trims the ends.
fn finish(lines: Vec<String>) -> String {
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        let line = line.trim_end().to_string();
        if line.is_empty() && out.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        out.push(line);
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

fn strip_comment_wrapper(text: &str) -> &str {
    let text = text.strip_prefix("/*").map(str::trim_start).unwrap_or(text);
    text.strip_suffix("*/").map(str::trim_end).unwrap_or(text)
}

/// If the text contains code fences, keeps the longest fenced or unfenced
/// segment that does not look like source code.
fn unfence(text: &str) -> String {
    if !text.contains("```") {
        return text.to_string();
    }

    let parts: Vec<&str> = text
        .split("```")
        .map(drop_language_tag)
        .filter(|part| !part.trim().is_empty())
        .collect();

    parts
        .iter()
        .filter(|part| !looks_like_code(part))
        .max_by_key(|part| part.trim().len())
        .or_else(|| parts.iter().max_by_key(|part| part.trim().len()))
        .map(|part| part.trim().to_string())
        .unwrap_or_default()
}

fn looks_like_code(part: &str) -> bool {
    part.lines()
        .map(str::trim_start)
        .any(|line| CODE_MARKERS.iter().any(|m| line.starts_with(m)))
}

/// A fence opener like ```text leaves "text" as the first line of the segment.
fn drop_language_tag(part: &str) -> &str {
    match part.split_once('\n') {
        Some((first, rest)) => {
            let tag = first.trim();
            let is_tag = !tag.is_empty()
                && tag.len() <= 12
                && tag.chars().all(|c| c.is_ascii_alphanumeric());
            if is_tag {
                rest
            } else {
                part
            }
        }
        None => part,
    }
}

fn is_separator(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| matches!(c, '|' | '-' | '=' | '_' | '*' | ' ' | '\t'))
        && (trimmed.contains(['|', '=']) || trimmed.matches('-').count() >= 3)
}

/// Removes markdown heading hashes and bold markers, keeping the words.
fn strip_markdown(line: &str) -> String {
    let trimmed = line.trim_start();
    let without_hashes = if trimmed.starts_with('#') {
        trimmed.trim_start_matches('#').trim_start()
    } else {
        line
    };
    without_hashes.replace("**", "").replace("__", "")
}

fn is_closing_phrase(line: &str) -> bool {
    let lower = line.trim().trim_end_matches(',').to_lowercase();
    CLOSING_PHRASES.contains(&lower.as_str())
}
