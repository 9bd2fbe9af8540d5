//! Wire payloads and error types for the Ollama generate API.
//!
//! The backend is treated as an opaque collaborator: one `(model, prompt)`
//! request in, generated text out. Everything interesting happens on the
//! other side of the socket.

pub mod client;

pub use client::OllamaClient;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Request body for `POST /api/generate`.
#[derive(Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
}

/// A single NDJSON fragment of a streamed generate response.
///
/// Ollama sends one JSON object per line; `response` carries the text delta
/// and `done` marks the final fragment.
#[derive(Deserialize)]
pub struct GenerateChunk {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
}

/// Failure while talking to the inference backend.
///
/// Kept distinct from other errors so call sites can print a clean,
/// user-facing message instead of a raw trace.
#[derive(Debug)]
pub enum InferenceError {
    /// The request never produced a usable HTTP response.
    Transport(reqwest::Error),
    /// The server answered with a non-success status.
    Status { status: u16, body: String },
    /// The response body could not be decoded as a generate stream.
    Stream(String),
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferenceError::Transport(e) => {
                write!(f, "could not reach the Ollama server: {e}")
            }
            InferenceError::Status { status, body } => {
                write!(f, "Ollama returned HTTP {status}: {body}")
            }
            InferenceError::Stream(msg) => write!(f, "invalid response stream: {msg}"),
        }
    }
}

impl std::error::Error for InferenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InferenceError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for InferenceError {
    fn from(e: reqwest::Error) -> Self {
        InferenceError::Transport(e)
    }
}
