//! Prompt-template modules.
//!
//! Each submodule builds instructional text around user input, hands the
//! result to a [`TextGenerator`], and reports generation failures as data:
//! the returned value carries an error message instead of an `Err`. Only
//! configuration problems abort; a dead backend never panics a session.

pub mod challenge;
pub mod code;
pub mod companion;
pub mod debug;
pub mod explain;
pub mod story;

use async_trait::async_trait;

use crate::api::OllamaClient;

/// Boxed error at the generator seam. Callers downcast to
/// [`InferenceError`] to distinguish backend failures from anything else.
pub type GenError = Box<dyn std::error::Error + Send + Sync>;

/// The seam between prompt templates and the inference backend. Production
/// code injects [`OllamaClient`]; tests inject stand-ins.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, GenError>;
}

#[async_trait]
impl TextGenerator for OllamaClient {
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, GenError> {
        OllamaClient::generate(self, prompt, model)
            .await
            .map_err(|e| Box::new(e) as GenError)
    }
}

/// Split on whitespace, ignoring leading and trailing runs.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
