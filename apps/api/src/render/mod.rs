//! Document Renderer — plain text in, a paginated PDF on disk out.
//!
//! Layout and serialization are CPU-bound and the final write is blocking
//! file I/O, so async callers run [`DocumentRenderer::render`] inside
//! `tokio::task::spawn_blocking`.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::DocumentKind;
use crate::store::atomic::write_atomic;

pub mod layout;
pub mod metrics;
pub mod pdf;

use layout::{paginate, parse};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("PDF serialization failed: {0}")]
    Pdf(String),

    #[error("Nothing to render: the document text is empty")]
    EmptyDocument,
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct DocumentRenderer {
    output_dir: PathBuf,
}

impl DocumentRenderer {
    /// Creates the output directory if it does not exist yet.
    pub fn new(config: RenderConfig) -> Result<Self, RenderError> {
        std::fs::create_dir_all(&config.output_dir).map_err(|source| RenderError::Io {
            path: config.output_dir.clone(),
            source,
        })?;
        info!("Rendering documents into {}", config.output_dir.display());
        Ok(Self {
            output_dir: config.output_dir,
        })
    }

    /// Lays out `text` and writes it as a PDF to `output_path`.
    ///
    /// The file is written to a temporary sibling and renamed into place, so
    /// `output_path` either holds the complete document or does not exist.
    pub fn render(&self, text: &str, output_path: &Path) -> Result<(), RenderError> {
        let document = parse(text);
        if document.is_empty() {
            return Err(RenderError::EmptyDocument);
        }

        let title = match document.blocks.first() {
            Some(layout::Block::Title(title)) => title.clone(),
            _ => String::new(),
        };
        let pages = paginate(&document);
        let bytes = pdf::write_pdf(&pages, &title)?;

        write_atomic(output_path, &bytes).map_err(|source| RenderError::Io {
            path: output_path.to_path_buf(),
            source,
        })?;

        debug!("PDF layout: {} blocks", document.blocks.len());
        info!(
            "Rendered {} ({} pages, {} bytes)",
            output_path.display(),
            pages.len(),
            bytes.len()
        );
        Ok(())
    }

    /// Output path for a generated document, e.g.
    /// `jane_doe_acme_corp_resume_1a2b3c4d.pdf` inside the output directory.
    pub fn output_path_for(
        &self,
        kind: DocumentKind,
        profile_name: &str,
        company: &str,
        application_id: Uuid,
    ) -> PathBuf {
        let id = application_id.simple().to_string();
        let file_name = format!(
            "{}_{}_{}_{}.pdf",
            slug(profile_name, "applicant"),
            slug(company, "company"),
            kind.as_str(),
            &id[..8]
        );
        self.output_dir.join(file_name)
    }

    /// Resolves a download request to a path inside the output directory.
    /// Returns `None` for anything that could name a file elsewhere.
    pub fn resolve_download(&self, file_name: &str) -> Option<PathBuf> {
        let safe = !file_name.is_empty()
            && !file_name.contains(['/', '\\', '\0'])
            && !file_name.contains("..")
            && file_name.ends_with(".pdf");
        safe.then(|| self.output_dir.join(file_name))
    }
}

/// Lower-case ASCII, runs of anything else collapsed to a single `_`.
fn slug(value: &str, fallback: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
