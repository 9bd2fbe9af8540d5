//! HTTP client for a local Ollama server.
//!
//! Every call is independent and blocking from the caller's point of view:
//! no retries, no pooling discipline beyond reqwest defaults, no timeout
//! enforcement. The streamed NDJSON body is accumulated into one string
//! before returning.

use futures_util::StreamExt;

use crate::api::{GenerateChunk, GenerateRequest, InferenceError};
use crate::core::config::Settings;

/// Default address of a locally running Ollama server.
pub const DEFAULT_HOST: &str = "http://localhost:11434";

/// Environment variable consulted for the backend address. Takes precedence
/// over the `ollama.host` setting.
pub const HOST_ENV_VAR: &str = "OLLAMA_HOST";

pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaClient {
    /// Build a client, resolving the backend address from `OLLAMA_HOST`,
    /// then the `ollama.host` setting, then the fixed local default.
    pub fn new(settings: &Settings) -> Self {
        let base_url = std::env::var(HOST_ENV_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| settings.ollama.host.clone())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        Self::with_base_url(base_url)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one prompt to the backend and return the full generated text.
    ///
    /// Ollama streams NDJSON fragments; the `response` fields are
    /// concatenated until the fragment flagged `done` arrives. A body that
    /// arrives in one piece decodes the same way, line by line.
    pub async fn generate(&self, prompt: &str, model: &str) -> Result<String, InferenceError> {
        let request = GenerateRequest {
            model: model.to_string(),
            prompt: prompt.to_string(),
            stream: true,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let mut stream = response.bytes_stream();
        let mut buffer = String::new();
        let mut output = String::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(InferenceError::Transport)?;
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(newline_pos) = buffer.find('\n') {
                let line = buffer[..newline_pos].trim().to_string();
                buffer.drain(..=newline_pos);
                if line.is_empty() {
                    continue;
                }
                if accumulate_line(&line, &mut output)? {
                    return Ok(output);
                }
            }
        }

        // Some proxies drop the trailing newline on the final fragment.
        let tail = buffer.trim();
        if !tail.is_empty() {
            accumulate_line(tail, &mut output)?;
        }

        Ok(output)
    }
}

/// Decode one NDJSON line into `output`. Returns `true` on the final chunk.
fn accumulate_line(line: &str, output: &mut String) -> Result<bool, InferenceError> {
    let chunk: GenerateChunk = serde_json::from_str(line)
        .map_err(|e| InferenceError::Stream(format!("{e} in line {line:?}")))?;
    output.push_str(&chunk.response);
    Ok(chunk.done)
}

/// Keep HTTP error bodies short enough for a one-line user-facing message.
fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        let truncated: String = body.chars().take(MAX).collect();
        format!("{truncated}…")
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_streamed_fragments() {
        let mut output = String::new();
        assert!(!accumulate_line(r#"{"response":"Once","done":false}"#, &mut output).unwrap());
        assert!(!accumulate_line(r#"{"response":" upon","done":false}"#, &mut output).unwrap());
        assert!(accumulate_line(r#"{"response":" a time","done":true}"#, &mut output).unwrap());
        assert_eq!(output, "Once upon a time");
    }

    #[test]
    fn final_chunk_may_omit_response() {
        let mut output = String::new();
        assert!(accumulate_line(r#"{"done":true}"#, &mut output).unwrap());
        assert_eq!(output, "");
    }

    #[test]
    fn malformed_line_is_a_stream_error() {
        let mut output = String::new();
        let err = accumulate_line("not json", &mut output).unwrap_err();
        assert!(matches!(err, InferenceError::Stream(_)));
    }

    #[test]
    fn trailing_slashes_are_stripped_from_base_url() {
        let client = OllamaClient::with_base_url("http://127.0.0.1:11434///");
        assert_eq!(client.base_url(), "http://127.0.0.1:11434");
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "x".repeat(500);
        let truncated = truncate_body(&body);
        assert!(truncated.chars().count() <= 201);
        assert!(truncated.ends_with('…'));
    }
}
