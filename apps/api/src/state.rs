use crate::llm_client::LlmClient;
use crate::render::DocumentRenderer;
use crate::store::RecordStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: RecordStore,
    pub llm: LlmClient,
    /// PDF output. Rendering runs on the blocking pool, never on the async workers.
    pub renderer: DocumentRenderer,
}
