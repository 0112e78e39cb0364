//! Template-based interview preparation. No LLM call is involved.

use crate::models::UserProfile;

pub const MAX_QUESTIONS: usize = 10;

/// Builds up to [`MAX_QUESTIONS`] practice questions for `job_title`.
///
/// General questions come first, then technical (one per leading skill),
/// behavioural, and finally position-specific ones.
pub fn interview_questions(profile: &UserProfile, job_title: &str) -> Vec<String> {
    let skills = profile.skill_list();
    let title = job_title.trim();
    let (role, team, career) = if title.is_empty() {
        ("this role".to_string(), "our team".to_string(), "this field".to_string())
    } else {
        (
            format!("this {title} role"),
            format!("our {title} team"),
            title.to_lowercase(),
        )
    };
    let field = match profile.current_title.trim() {
        "" => "your field",
        t => t,
    };

    let mut questions = vec![
        format!("Tell me about yourself and your background in {field}."),
        format!("Why are you interested in {role}?"),
    ];

    let technical = [
        "Explain your experience with {}.",
        "How would you approach {} implementation?",
        "Describe a challenging {} project you worked on.",
    ];
    for (template, skill) in technical.iter().zip(skills.iter()) {
        questions.push(template.replace("{}", skill));
    }

    let first_skill = skills.first().copied().unwrap_or("technology");
    questions.push(format!(
        "Describe a time when you had to learn a new {first_skill} quickly."
    ));
    questions.push("Tell me about a challenging project and how you overcame obstacles.".to_string());
    questions.push("How do you handle tight deadlines and pressure?".to_string());

    questions.push(format!("What interests you most about {role}?"));
    questions.push(format!("How do you see yourself contributing to {team}?"));
    questions.push(format!("What are your long-term career goals in {career}?"));

    questions.truncate(MAX_QUESTIONS);
    questions
}
