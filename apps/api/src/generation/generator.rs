//! Document generation. Validates the request, builds the prompt from the
//! profile and job posting, and sends it through the LLM client.
//!
//! `generate` returns the provider's text verbatim. Tidying it up for the
//! PDF is a separate step (see `cleanup`).

use tracing::info;

use crate::errors::AppError;
use crate::generation::keywords::extract_job_keywords;
use crate::generation::prompts::{
    fill_template, COVER_LETTER_PROMPT_TEMPLATE, COVER_LETTER_SYSTEM, RESUME_PROMPT_TEMPLATE,
    RESUME_SYSTEM,
};
use crate::llm_client::prompts::{FACTUAL_INSTRUCTION, PLAIN_DOCUMENT_INSTRUCTION};
use crate::llm_client::{CompletionRequest, LlmClient};
use crate::models::{DocumentKind, JobPosting, UserProfile};

const NOT_SPECIFIED: &str = "Not specified";
const NO_JOB_DESCRIPTION: &str = "No specific job description provided.";

/// Token budget and temperature for one document kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub max_tokens: u32,
    pub temperature: f32,
}

pub fn sampling_for(kind: DocumentKind) -> Sampling {
    match kind {
        DocumentKind::Resume => Sampling {
            max_tokens: 1000,
            temperature: 0.7,
        },
        DocumentKind::CoverLetter => Sampling {
            max_tokens: 600,
            temperature: 0.8,
        },
    }
}

/// Checks the inputs a document kind needs before anything is sent.
pub fn validate_request(
    profile: &UserProfile,
    job: &JobPosting,
    kind: DocumentKind,
) -> Result<(), AppError> {
    if profile.is_empty() {
        return Err(AppError::Validation(
            "No profile found. Create your profile before generating documents.".to_string(),
        ));
    }
    profile.validate().map_err(AppError::Validation)?;

    match kind {
        DocumentKind::Resume => {
            if job.job_description.trim().is_empty() {
                return Err(AppError::Validation(
                    "job_description cannot be empty".to_string(),
                ));
            }
        }
        DocumentKind::CoverLetter => {
            if job.company.trim().is_empty() || job.job_title.trim().is_empty() {
                return Err(AppError::Validation(
                    "company and job_title are required for a cover letter".to_string(),
                ));
            }
        }
    }
    Ok(())
}

/// Builds the user prompt for `kind` from the profile and job posting.
pub fn build_prompt(profile: &UserProfile, job: &JobPosting, kind: DocumentKind) -> String {
    let skill_list = profile.skill_list();
    let keywords = extract_job_keywords(&job.job_description, &skill_list);
    let keywords = if keywords.is_empty() {
        "None detected; emphasise the applicant's listed skills".to_string()
    } else {
        keywords.join(", ")
    };
    let skills = if skill_list.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        skill_list.join(", ")
    };
    let contact_line = profile.contact_line();
    let job_description = match job.job_description.trim() {
        "" => NO_JOB_DESCRIPTION,
        jd => jd,
    };

    let template = match kind {
        DocumentKind::Resume => RESUME_PROMPT_TEMPLATE,
        DocumentKind::CoverLetter => COVER_LETTER_PROMPT_TEMPLATE,
    };

    fill_template(
        template,
        &[
            ("plain_instruction", PLAIN_DOCUMENT_INSTRUCTION),
            ("factual_instruction", FACTUAL_INSTRUCTION),
            ("name", or_not_specified(&profile.name)),
            ("email", or_not_specified(&profile.email)),
            ("phone", or_not_specified(&profile.phone)),
            ("location", or_not_specified(&profile.location)),
            ("current_title", or_not_specified(&profile.current_title)),
            ("linkedin", or_not_specified(&profile.linkedin)),
            ("contact_line", or_not_specified(&contact_line)),
            ("skills", skills.as_str()),
            ("experience", or_not_specified(&profile.experience)),
            ("education", or_not_specified(&profile.education)),
            ("keywords", keywords.as_str()),
            ("job_title", job.job_title.trim()),
            ("company", job.company.trim()),
            ("job_description", job_description),
        ],
    )
}

/// Drafts a resume or cover letter and returns the provider's text verbatim.
pub async fn generate(
    llm: &LlmClient,
    profile: &UserProfile,
    job: &JobPosting,
    kind: DocumentKind,
) -> Result<String, AppError> {
    validate_request(profile, job, kind)?;

    let prompt = build_prompt(profile, job, kind);
    let system = match kind {
        DocumentKind::Resume => RESUME_SYSTEM,
        DocumentKind::CoverLetter => COVER_LETTER_SYSTEM,
    };
    let sampling = sampling_for(kind);

    info!("Generating {kind} with model {}", llm.model());
    let completion = llm
        .complete(CompletionRequest {
            system,
            prompt: &prompt,
            max_tokens: sampling.max_tokens,
            temperature: sampling.temperature,
        })
        .await?;

    info!(
        "Generated {kind}: {} chars, {} completion tokens",
        completion.text.len(),
        completion
            .usage
            .as_ref()
            .map_or(0, |u| u.completion_tokens)
    );
    Ok(completion.text)
}

fn or_not_specified(value: &str) -> &str {
    match value.trim() {
        "" => NOT_SPECIFIED,
        v => v,
    }
}
