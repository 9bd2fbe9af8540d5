//! Coding-challenge retrieval.
//!
//! Small template: pick a difficulty bucket, ask the model for one
//! self-contained exercise. Same errors-as-data policy as the other
//! generation paths.

use crate::api::InferenceError;
use crate::assistant::TextGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Normalize free-form input; unrecognized falls back to
    /// [`Difficulty::Medium`] with a warning.
    pub fn from_input(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "medium" => Difficulty::Medium,
            "hard" => Difficulty::Hard,
            other => {
                tracing::warn!(input = other, "unrecognized difficulty, using medium");
                Difficulty::Medium
            }
        }
    }

    fn instruction(self) -> &'static str {
        match self {
            Difficulty::Easy => {
                "an easy warm-up exercise solvable in a few lines, suitable for a beginner"
            }
            Difficulty::Medium => {
                "a medium exercise that needs a small algorithm or data structure"
            }
            Difficulty::Hard => {
                "a hard exercise involving a non-obvious algorithm or careful edge-case handling"
            }
        }
    }
}

/// Fetch one coding challenge at the given difficulty.
pub async fn fetch_challenge(
    generator: &dyn TextGenerator,
    model: &str,
    difficulty: Difficulty,
) -> String {
    let prompt = format!(
        "Pose {} as a programming challenge. State the task, the input and output \
         format, and one worked example. Do not include the solution.",
        difficulty.instruction()
    );

    match generator.generate(&prompt, model).await {
        Ok(text) => text,
        Err(e) => match e.downcast_ref::<InferenceError>() {
            Some(inference) => format!("Error fetching challenge: {inference}"),
            None => format!("An unexpected error occurred while fetching a challenge: {e}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::test_support::{BackendDownGenerator, CannedGenerator};

    #[test]
    fn unrecognized_difficulty_defaults_to_medium() {
        assert_eq!(Difficulty::from_input("brutal"), Difficulty::Medium);
        assert_eq!(Difficulty::from_input(" Hard "), Difficulty::Hard);
    }

    #[tokio::test]
    async fn prompt_reflects_difficulty() {
        let generator = CannedGenerator::new("Reverse a linked list.");
        let challenge = fetch_challenge(&generator, "llama3.2", Difficulty::Hard).await;
        assert_eq!(challenge, "Reverse a linked list.");
        assert!(generator.last_prompt().contains("hard exercise"));
    }

    #[tokio::test]
    async fn backend_failure_is_reported_as_data() {
        let challenge = fetch_challenge(&BackendDownGenerator, "llama3.2", Difficulty::Easy).await;
        assert!(challenge.starts_with("Error fetching challenge: "));
    }
}
