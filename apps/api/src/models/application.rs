use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored job descriptions are cut to this many characters.
pub const JOB_DESCRIPTION_STORED_CHARS: usize = 500;

const UNKNOWN_COMPANY: &str = "Unknown Company";
const UNKNOWN_POSITION: &str = "Unknown Position";

/// The two documents the generator can draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Resume,
    CoverLetter,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Resume => "resume",
            DocumentKind::CoverLetter => "cover_letter",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Interview,
    Rejected,
    Offered,
    Accepted,
}

/// The job a document is being drafted for, as submitted by the form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobPosting {
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub job_description: String,
}

/// One recorded application. Appended after every successful generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: Uuid,
    pub job_title: String,
    pub company: String,
    pub job_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_letter_path: Option<String>,
    #[serde(default)]
    pub documents_generated: Vec<DocumentKind>,
    #[serde(default)]
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl JobApplication {
    /// Builds a fresh `pending` record for a generated document.
    ///
    /// Blank title/company fall back to placeholders and the job description
    /// is truncated for storage. The PDF path is set later with
    /// [`attach_document`](Self::attach_document) once the file exists.
    pub fn new(posting: &JobPosting, kind: DocumentKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_title: or_placeholder(&posting.job_title, UNKNOWN_POSITION),
            company: or_placeholder(&posting.company, UNKNOWN_COMPANY),
            job_description: truncate_description(&posting.job_description),
            resume_path: None,
            cover_letter_path: None,
            documents_generated: vec![kind],
            status: ApplicationStatus::Pending,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Records where the PDF for `kind` was written.
    pub fn attach_document(&mut self, kind: DocumentKind, pdf_path: String) {
        match kind {
            DocumentKind::Resume => self.resume_path = Some(pdf_path),
            DocumentKind::CoverLetter => self.cover_letter_path = Some(pdf_path),
        }
        if !self.documents_generated.contains(&kind) {
            self.documents_generated.push(kind);
        }
    }

    /// Case-insensitive substring match on company or job title.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.company.to_lowercase().contains(&term) || self.job_title.to_lowercase().contains(&term)
    }
}

/// Per-status counts over every recorded application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationStats {
    pub total_applications: usize,
    pub pending: usize,
    pub interview: usize,
    pub rejected: usize,
    pub offered: usize,
    pub accepted: usize,
}

impl ApplicationStats {
    pub fn from_applications(applications: &[JobApplication]) -> Self {
        let mut stats = ApplicationStats {
            total_applications: applications.len(),
            ..Default::default()
        };
        for app in applications {
            let slot = match app.status {
                ApplicationStatus::Pending => &mut stats.pending,
                ApplicationStatus::Interview => &mut stats.interview,
                ApplicationStatus::Rejected => &mut stats.rejected,
                ApplicationStatus::Offered => &mut stats.offered,
                ApplicationStatus::Accepted => &mut stats.accepted,
            };
            *slot += 1;
        }
        stats
    }
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

fn truncate_description(text: &str) -> String {
    if text.chars().count() > JOB_DESCRIPTION_STORED_CHARS {
        let head: String = text.chars().take(JOB_DESCRIPTION_STORED_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_application_uses_placeholders_for_blank_fields() {
        let posting = JobPosting {
            job_description: "Seeking a data analyst".to_string(),
            ..Default::default()
        };
        let app = JobApplication::new(&posting, DocumentKind::Resume);

        assert_eq!(app.company, "Unknown Company");
        assert_eq!(app.job_title, "Unknown Position");
        assert_eq!(app.status, ApplicationStatus::Pending);
        assert!(app.resume_path.is_none());
        assert!(app.cover_letter_path.is_none());
        assert_eq!(app.documents_generated, vec![DocumentKind::Resume]);
    }

    #[test]
    fn test_long_description_is_truncated_with_ellipsis() {
        let posting = JobPosting {
            job_description: "x".repeat(JOB_DESCRIPTION_STORED_CHARS + 20),
            ..Default::default()
        };
        let app = JobApplication::new(&posting, DocumentKind::CoverLetter);

        assert_eq!(app.job_description.len(), JOB_DESCRIPTION_STORED_CHARS + 3);
        assert!(app.job_description.ends_with("..."));
    }

    #[test]
    fn test_attach_document_sets_matching_path() {
        let mut app = JobApplication::new(&JobPosting::default(), DocumentKind::CoverLetter);
        app.attach_document(DocumentKind::CoverLetter, "out/letter.pdf".to_string());

        assert_eq!(app.cover_letter_path.as_deref(), Some("out/letter.pdf"));
        assert!(app.resume_path.is_none());
        assert_eq!(app.documents_generated, vec![DocumentKind::CoverLetter]);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&ApplicationStatus::Interview).unwrap();
        assert_eq!(json, r#""interview""#);
        let kind = serde_json::to_string(&DocumentKind::CoverLetter).unwrap();
        assert_eq!(kind, r#""cover_letter""#);
    }

    #[test]
    fn test_stats_count_each_status() {
        let posting = JobPosting::default();
        let mut apps: Vec<_> = (0..4)
            .map(|_| JobApplication::new(&posting, DocumentKind::Resume))
            .collect();
        apps[1].status = ApplicationStatus::Interview;
        apps[2].status = ApplicationStatus::Interview;
        apps[3].status = ApplicationStatus::Accepted;

        let stats = ApplicationStats::from_applications(&apps);
        assert_eq!(stats.total_applications, 4);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.interview, 2);
        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.rejected, 0);
    }

    #[test]
    fn test_matches_company_or_title_case_insensitively() {
        let posting = JobPosting {
            job_title: "Data Analyst".to_string(),
            company: "Acme Corp".to_string(),
            job_description: String::new(),
        };
        let app = JobApplication::new(&posting, DocumentKind::Resume);
        assert!(app.matches("acme"));
        assert!(app.matches("ANALYST"));
        assert!(!app.matches("globex"));
    }
}
