//! Axum route handlers for the profile, application history, document
//! generation and download endpoints.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::cleanup::{clean_cover_letter, clean_resume};
use crate::generation::generator::generate;
use crate::generation::interview::interview_questions;
use crate::models::{
    ApplicationStats, ApplicationStatus, DocumentKind, JobApplication, JobPosting, UserProfile,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ApplicationsQuery {
    pub search: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationsResponse {
    pub applications: Vec<JobApplication>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: ApplicationStatus,
}

#[derive(Debug, Serialize)]
pub struct GeneratedDocumentResponse {
    pub application_id: Uuid,
    pub kind: DocumentKind,
    pub content: String,
    pub file_name: String,
    pub download_url: String,
}

#[derive(Debug, Deserialize)]
pub struct InterviewQuestionsRequest {
    #[serde(default)]
    pub job_title: String,
}

#[derive(Debug, Serialize)]
pub struct InterviewQuestionsResponse {
    pub job_title: String,
    pub questions: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Profile
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/profile
///
/// Soft read: a corrupt profile file shows up as an empty form.
pub async fn handle_get_profile(State(state): State<AppState>) -> Json<UserProfile> {
    Json(state.store.load_profile_or_default())
}

/// PUT /api/v1/profile
pub async fn handle_save_profile(
    State(state): State<AppState>,
    Json(mut profile): Json<UserProfile>,
) -> Result<Json<UserProfile>, AppError> {
    profile.validate().map_err(AppError::Validation)?;
    profile.updated_at = Some(Utc::now());
    state.store.save_profile(&profile)?;
    Ok(Json(profile))
}

// ────────────────────────────────────────────────────────────────────────────
// Applications
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/applications?search=&limit=
///
/// `search` filters on company or job title; `limit` returns the most recent
/// N instead. Without either, every application in append order.
pub async fn handle_list_applications(
    State(state): State<AppState>,
    Query(params): Query<ApplicationsQuery>,
) -> Result<Json<ApplicationsResponse>, AppError> {
    let search = params.search.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let applications = match (search, params.limit) {
        (Some(term), limit) => {
            let mut found = state.store.search_applications(term)?;
            if let Some(limit) = limit {
                found.truncate(limit);
            }
            found
        }
        (None, Some(limit)) => state.store.recent_applications(limit)?,
        (None, None) => state.store.load_applications()?,
    };

    Ok(Json(ApplicationsResponse {
        count: applications.len(),
        applications,
    }))
}

/// GET /api/v1/applications/stats
pub async fn handle_application_stats(State(state): State<AppState>) -> Json<ApplicationStats> {
    Json(state.store.application_stats())
}

/// PATCH /api/v1/applications/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<JobApplication>, AppError> {
    let updated = state.store.update_application_status(id, request.status)?;
    Ok(Json(updated))
}

// ────────────────────────────────────────────────────────────────────────────
// Generation
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes
pub async fn handle_generate_resume(
    State(state): State<AppState>,
    Json(job): Json<JobPosting>,
) -> Result<Json<GeneratedDocumentResponse>, AppError> {
    generate_document(state, job, DocumentKind::Resume).await.map(Json)
}

/// POST /api/v1/cover-letters
pub async fn handle_generate_cover_letter(
    State(state): State<AppState>,
    Json(job): Json<JobPosting>,
) -> Result<Json<GeneratedDocumentResponse>, AppError> {
    generate_document(state, job, DocumentKind::CoverLetter)
        .await
        .map(Json)
}

/// Full pipeline: profile → provider → cleanup → PDF → application record.
///
/// The application is only recorded once the PDF is on disk, so a failed
/// generation or render leaves the history untouched.
async fn generate_document(
    state: AppState,
    job: JobPosting,
    kind: DocumentKind,
) -> Result<GeneratedDocumentResponse, AppError> {
    let profile = state.store.load_profile()?;

    let raw = generate(&state.llm, &profile, &job, kind).await?;
    let cleaned = match kind {
        DocumentKind::Resume => clean_resume(&raw),
        DocumentKind::CoverLetter => clean_cover_letter(&raw),
    };
    let content = if cleaned.trim().is_empty() {
        warn!("Cleanup removed the entire {kind}; rendering the raw text");
        raw.trim().to_string()
    } else {
        cleaned
    };

    let mut application = JobApplication::new(&job, kind);
    let output_path =
        state
            .renderer
            .output_path_for(kind, &profile.name, &application.company, application.id);

    let renderer = state.renderer.clone();
    let text = content.clone();
    let path = output_path.clone();
    tokio::task::spawn_blocking(move || renderer.render(&text, &path))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("render task failed: {e}")))??;

    let file_name = output_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    application.attach_document(kind, output_path.display().to_string());
    let application_id = application.id;
    if let Err(e) = state.store.append_application(application) {
        // No record will point at the PDF, so it must not outlive the request.
        if let Err(remove_err) = tokio::fs::remove_file(&output_path).await {
            warn!(
                "Could not remove unrecorded {}: {remove_err}",
                output_path.display()
            );
        }
        return Err(e.into());
    }

    info!("Generated {kind} for application {application_id}: {file_name}");

    Ok(GeneratedDocumentResponse {
        application_id,
        kind,
        content,
        download_url: format!("/api/v1/documents/{file_name}"),
        file_name,
    })
}

/// POST /api/v1/interview-questions
///
/// Template questions from the saved profile; no provider call.
pub async fn handle_interview_questions(
    State(state): State<AppState>,
    Json(request): Json<InterviewQuestionsRequest>,
) -> Result<Json<InterviewQuestionsResponse>, AppError> {
    let job_title = request.job_title.trim();
    if job_title.is_empty() {
        return Err(AppError::Validation(
            "Please enter a position title".to_string(),
        ));
    }

    let profile = state.store.load_profile_or_default();
    let questions = interview_questions(&profile, job_title);
    Ok(Json(InterviewQuestionsResponse {
        job_title: job_title.to_string(),
        questions,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Downloads
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/documents/:file_name
pub async fn handle_download(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<Response, AppError> {
    let path = state
        .renderer
        .resolve_download(&file_name)
        .ok_or_else(|| AppError::Validation(format!("Invalid document name: {file_name}")))?;

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(format!("Document {file_name} not found")));
        }
        Err(e) => {
            return Err(AppError::Internal(
                anyhow::Error::new(e).context(format!("reading {}", path.display())),
            ));
        }
    };

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::llm_client::test_support::{spawn_stub, StubProvider, StubReply};
    use crate::llm_client::LlmClient;
    use crate::render::{DocumentRenderer, RenderConfig};
    use crate::routes::build_router;
    use crate::state::AppState;
    use crate::store::{RecordStore, StoreConfig};

    const RESUME_TEXT: &str = "JANE DOE\njane@example.com | Berlin\n\nPROFESSIONAL SUMMARY\nData analyst fluent in SQL and Python.\n\nSKILLS\n• SQL\n• Python";

    struct Harness {
        dir: tempfile::TempDir,
        router: Router,
        store: RecordStore,
        stub: StubProvider,
    }

    async fn harness(reply: StubReply) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let stub = spawn_stub(reply).await;
        let store = RecordStore::open(&StoreConfig {
            data_dir: dir.path().join("data"),
        })
        .unwrap();
        let renderer = DocumentRenderer::new(RenderConfig {
            output_dir: dir.path().join("output"),
        })
        .unwrap();
        let llm: LlmClient = stub.client("test-key");

        let router = build_router(AppState {
            store: store.clone(),
            llm,
            renderer,
        });
        Harness {
            dir,
            router,
            store,
            stub,
        }
    }

    async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, bytes) = send(router, method, uri, body).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn jane() -> Value {
        json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "location": "Berlin",
            "skills": "Python, SQL",
            "experience": "3 years as a data analyst"
        })
    }

    #[tokio::test]
    async fn test_profile_round_trip() {
        let h = harness(StubReply::EchoPrompt).await;

        let (status, body) = send_json(&h.router, "GET", "/api/v1/profile", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "");

        let (status, body) = send_json(&h.router, "PUT", "/api/v1/profile", Some(jane())).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["updated_at"].is_string());

        let (_, body) = send_json(&h.router, "GET", "/api/v1/profile", None).await;
        assert_eq!(body["name"], "Jane Doe");
        assert_eq!(body["skills"], "Python, SQL");
    }

    #[tokio::test]
    async fn test_save_profile_requires_name_and_email() {
        let h = harness(StubReply::EchoPrompt).await;
        let (status, body) =
            send_json(&h.router, "PUT", "/api/v1/profile", Some(json!({"name": "Jane"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(!h.store.profile_path().exists());
    }

    #[tokio::test]
    async fn test_generate_resume_renders_pdf_and_records_application() {
        let h = harness(StubReply::Text(RESUME_TEXT.to_string())).await;
        send_json(&h.router, "PUT", "/api/v1/profile", Some(jane())).await;

        let (status, body) = send_json(
            &h.router,
            "POST",
            "/api/v1/resumes",
            Some(json!({
                "job_title": "Data Analyst",
                "company": "Acme Corp",
                "job_description": "Seeking a data analyst with SQL experience"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["kind"], "resume");
        assert!(body["content"].as_str().unwrap().contains("SQL"));
        let file_name = body["file_name"].as_str().unwrap().to_string();
        assert!(file_name.starts_with("jane_doe_acme_corp_resume_"));
        assert_eq!(h.stub.hits(), 1);

        let applications = h.store.load_applications().unwrap();
        assert_eq!(applications.len(), 1);
        assert_eq!(applications[0].company, "Acme Corp");
        assert!(applications[0]
            .resume_path
            .as_deref()
            .unwrap()
            .ends_with(&file_name));

        let (status, pdf) = send(
            &h.router,
            "GET",
            body["download_url"].as_str().unwrap(),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(pdf.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_generate_without_profile_is_rejected() {
        let h = harness(StubReply::EchoPrompt).await;
        let (status, body) = send_json(
            &h.router,
            "POST",
            "/api/v1/cover-letters",
            Some(json!({"job_title": "Analyst", "company": "Acme"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"].as_str().unwrap().contains("profile"));
        assert_eq!(h.stub.hits(), 0);
        assert!(h.store.load_applications().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_provider_auth_failure_records_nothing() {
        let h = harness(StubReply::Status(401)).await;
        send_json(&h.router, "PUT", "/api/v1/profile", Some(jane())).await;

        let (status, body) = send_json(
            &h.router,
            "POST",
            "/api/v1/cover-letters",
            Some(json!({"job_title": "Analyst", "company": "Acme"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "AUTH_ERROR");
        assert!(h.store.load_applications().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_search_stats_and_status_update() {
        let h = harness(StubReply::Text(RESUME_TEXT.to_string())).await;
        send_json(&h.router, "PUT", "/api/v1/profile", Some(jane())).await;
        for company in ["Acme", "Globex"] {
            let (status, _) = send_json(
                &h.router,
                "POST",
                "/api/v1/resumes",
                Some(json!({
                    "job_title": "Analyst",
                    "company": company,
                    "job_description": "SQL reporting"
                })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, all) = send_json(&h.router, "GET", "/api/v1/applications", None).await;
        assert_eq!(all["count"], 2);

        let (_, found) =
            send_json(&h.router, "GET", "/api/v1/applications?search=glob", None).await;
        assert_eq!(found["count"], 1);
        assert_eq!(found["applications"][0]["company"], "Globex");

        let (_, recent) = send_json(&h.router, "GET", "/api/v1/applications?limit=1", None).await;
        assert_eq!(recent["count"], 1);

        let id = all["applications"][0]["id"].as_str().unwrap().to_string();
        let (status, updated) = send_json(
            &h.router,
            "PATCH",
            &format!("/api/v1/applications/{id}/status"),
            Some(json!({"status": "interview"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], "interview");

        let (_, stats) = send_json(&h.router, "GET", "/api/v1/applications/stats", None).await;
        assert_eq!(stats["total_applications"], 2);
        assert_eq!(stats["interview"], 1);
        assert_eq!(stats["pending"], 1);
    }

    #[tokio::test]
    async fn test_status_update_for_unknown_id_is_404() {
        let h = harness(StubReply::EchoPrompt).await;
        let (status, _) = send_json(
            &h.router,
            "PATCH",
            &format!("/api/v1/applications/{}/status", uuid::Uuid::new_v4()),
            Some(json!({"status": "rejected"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_interview_questions_use_saved_skills() {
        let h = harness(StubReply::EchoPrompt).await;
        send_json(&h.router, "PUT", "/api/v1/profile", Some(jane())).await;

        let (status, body) = send_json(
            &h.router,
            "POST",
            "/api/v1/interview-questions",
            Some(json!({"job_title": "Data Analyst"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let questions = body["questions"].as_array().unwrap();
        assert!(questions
            .iter()
            .any(|q| q == "Explain your experience with Python."));
        assert_eq!(h.stub.hits(), 0);
    }

    #[tokio::test]
    async fn test_interview_questions_require_job_title() {
        let h = harness(StubReply::EchoPrompt).await;
        let (status, body) = send_json(
            &h.router,
            "POST",
            "/api/v1/interview-questions",
            Some(json!({"job_title": "   "})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_failed_record_write_removes_rendered_pdf() {
        let h = harness(StubReply::Text(RESUME_TEXT.to_string())).await;
        send_json(&h.router, "PUT", "/api/v1/profile", Some(jane())).await;
        // A non-array history makes the append fail after the PDF is written.
        std::fs::write(h.store.applications_path(), r#"{"not": "an array"}"#).unwrap();

        let (status, body) = send_json(
            &h.router,
            "POST",
            "/api/v1/resumes",
            Some(json!({"job_title": "Analyst", "company": "Acme"})),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{body}");
        assert_eq!(h.stub.hits(), 1);
        let output_dir = h.dir.path().join("output");
        assert_eq!(std::fs::read_dir(&output_dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_download_rejects_traversal_and_missing_files() {
        let h = harness(StubReply::EchoPrompt).await;

        let (status, _) =
            send_json(&h.router, "GET", "/api/v1/documents/..%2Fdata%2Fx.pdf", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send_json(&h.router, "GET", "/api/v1/documents/missing.pdf", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
