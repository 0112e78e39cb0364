// All LLM prompt constants for the Generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for resume drafting.
pub const RESUME_SYSTEM: &str = "You are a professional resume writer. \
    You write clean, concise, ATS-friendly resumes in plain text. \
    Your output is converted directly into a PDF.";

/// Resume prompt template. Filled by [`fill_template`].
pub const RESUME_PROMPT_TEMPLATE: &str = r#"Generate a clean, ATS-friendly resume from the applicant profile, tailored to the job description.

{plain_instruction}

{factual_instruction}

APPLICANT PROFILE:
Name: {name}
Email: {email}
Phone: {phone}
Location: {location}
Title: {current_title}
LinkedIn: {linkedin}
Skills: {skills}
Experience: {experience}
Education: {education}

ATS KEYWORDS from the job description to incorporate naturally (do NOT keyword-stuff):
{keywords}

JOB DESCRIPTION:
{job_description}

FORMAT:
- First line: the applicant's full name
- Second line: contact details, written as: {contact_line}
- Then these sections, each heading on its own line in capitals: PROFESSIONAL SUMMARY, TECHNICAL SKILLS, PROFESSIONAL EXPERIENCE, EDUCATION
- Use bullet points (•) for skills and experience
- Keep it to a single page"#;

/// System prompt for cover letters.
pub const COVER_LETTER_SYSTEM: &str = "You are a career coach who writes warm, \
    professional cover letters in plain text. \
    Your output is converted directly into a PDF.";

/// Cover letter prompt template. Filled by [`fill_template`].
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Write a professional cover letter for the {job_title} role at {company}.

{plain_instruction}

{factual_instruction}

APPLICANT:
Name: {name}
Title: {current_title}
Skills: {skills}
Experience: {experience}

ATS KEYWORDS from the job description to mention where the applicant's background supports them:
{keywords}

JOB DESCRIPTION:
{job_description}

INSTRUCTIONS:
- Write 3 to 4 paragraphs separated by blank lines
- Address the hiring manager professionally
- Show enthusiasm for the role and for {company}
- Connect the applicant's skills and experience to the job
- End with a closing phrase such as "Sincerely," followed by the applicant's name on the next line"#;

/// Replaces every `{key}` in `template` with its value in one pass.
///
/// Values are inserted verbatim and never re-scanned, so user text that
/// happens to contain `{name}` is left alone. Unknown keys stay as written.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let key = &after[..close];
                match values.iter().find(|(k, _)| *k == key) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
