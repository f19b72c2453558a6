use crate::llm::LlmClient;
use crate::store::GuestStore;

use std::sync::Arc;

/// Process-wide handles, built once at startup and injected into every
/// handler.  Trait objects so tests can substitute doubles.
pub struct AppState {
    pub store: Arc<dyn GuestStore>,
    pub llm: Arc<dyn LlmClient>,
}
