use std::sync::Arc;

use crate::generation::generator::ContentGenerator;
use crate::intake::store::SubmissionStore;
use crate::notify::Notifier;
use crate::render::DocumentFiller;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: SubmissionStore,
    /// Pluggable generator. Default: LlmContentGenerator over the chat completions API.
    pub generator: Arc<dyn ContentGenerator>,
    pub filler: DocumentFiller,
    pub notifier: Notifier,
}
