use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::render::RenderError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::MissingApiKey | LlmError::Auth { .. } => AppError::Auth(err.to_string()),
            LlmError::Network(_) => AppError::Network(err.to_string()),
            LlmError::Api { .. }
            | LlmError::Parse(_)
            | LlmError::EmptyContent
            | LlmError::Client(_) => AppError::Llm(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Storage(StoreError::NotFound(id)) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("Application {id} not found"),
            ),
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "Stored data could not be read or written".to_string(),
                )
            }
            AppError::Network(msg) => {
                tracing::error!("Network error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "NETWORK_ERROR",
                    "The text-generation service could not be reached".to_string(),
                )
            }
            AppError::Auth(msg) => {
                tracing::error!("Auth error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "AUTH_ERROR",
                    "The text-generation service rejected the configured API key".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Render(e) => {
                tracing::error!("Render error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    "The PDF could not be created".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use uuid::Uuid;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_maps_to_400_with_message() {
        let (status, body) = body_json(AppError::Validation("name is required".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "name is required");
    }

    #[tokio::test]
    async fn test_storage_errors_hide_paths() {
        let err = AppError::from(StoreError::Corrupt {
            path: PathBuf::from("/srv/data/user_profile.json"),
            reason: "expected value".into(),
        });
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "STORAGE_ERROR");
        assert!(!body.to_string().contains("/srv/data"));
    }

    #[tokio::test]
    async fn test_unknown_application_is_404() {
        let (status, body) = body_json(StoreError::NotFound(Uuid::new_v4()).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[test]
    fn test_llm_error_mapping() {
        assert!(matches!(
            AppError::from(LlmError::MissingApiKey),
            AppError::Auth(_)
        ));
        assert!(matches!(
            AppError::from(LlmError::Auth {
                status: 401,
                message: "bad key".into()
            }),
            AppError::Auth(_)
        ));
        assert!(matches!(
            AppError::from(LlmError::EmptyContent),
            AppError::Llm(_)
        ));
    }

    #[tokio::test]
    async fn test_gateway_kinds_are_502() {
        for (err, code) in [
            (AppError::Network("refused".into()), "NETWORK_ERROR"),
            (AppError::Auth("401".into()), "AUTH_ERROR"),
            (AppError::Llm("empty".into()), "LLM_ERROR"),
        ] {
            let (status, body) = body_json(err).await;
            assert_eq!(status, StatusCode::BAD_GATEWAY);
            assert_eq!(body["error"]["code"], code);
        }
    }

    #[tokio::test]
    async fn test_render_error_is_500() {
        let (status, body) = body_json(RenderError::EmptyDocument.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "RENDER_ERROR");
    }
}
