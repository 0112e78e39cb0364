//! ATS keyword alignment: picks the job-description terms the generated
//! document should echo back.

/// Terms that applicant tracking systems commonly screen for.
const ATS_VOCABULARY: &[&str] = &[
    "python",
    "javascript",
    "sql",
    "react",
    "node.js",
    "aws",
    "docker",
    "machine learning",
    "data analysis",
    "project management",
    "leadership",
    "communication",
    "problem solving",
    "teamwork",
    "agile",
    "scrum",
];

pub const MAX_KEYWORDS: usize = 10;

/// Returns up to [`MAX_KEYWORDS`] keywords present in the job description.
///
/// The applicant's own skills that the posting mentions come first, in the
/// applicant's spelling; vocabulary terms fill the remaining slots. Matching
/// is case-insensitive on whole words, so a skill like "Go" does not match
/// "good".
pub fn extract_job_keywords(job_description: &str, skills: &[&str]) -> Vec<String> {
    let haystack = job_description.to_lowercase();
    let mut keywords: Vec<String> = Vec::new();

    let mut push = |term: &str| {
        let lower = term.to_lowercase();
        if keywords.len() < MAX_KEYWORDS
            && contains_term(&haystack, &lower)
            && !keywords.iter().any(|k| k.to_lowercase() == lower)
        {
            keywords.push(term.to_string());
        }
    };

    for skill in skills {
        push(skill.trim());
    }
    for term in ATS_VOCABULARY {
        push(term);
    }

    keywords
}

/// Whole-word, already-lowercased containment check.
fn contains_term(haystack: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    haystack.match_indices(term).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
