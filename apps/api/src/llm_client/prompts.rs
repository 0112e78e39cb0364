// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it;
// this file holds the instructions every generated document shares.

/// Generated text goes straight into a PDF, so the model must return only
/// the document itself.
pub const PLAIN_DOCUMENT_INSTRUCTION: &str = "\
    Return ONLY the document text, nothing before or after it. \
    Do NOT return code, code blocks, variables or function definitions. \
    Do NOT add explanations, notes, evaluations or closing remarks about the document. \
    Do NOT use vertical bars (|), tables or decorative symbols other than the bullet character (•).";

/// Keeps the model inside the facts the user supplied.
pub const FACTUAL_INSTRUCTION: &str = "\
    Use ONLY facts present in the applicant profile. \
    Do NOT invent employers, dates, degrees or metrics.";
