//! Storytelling prompt template.
//!
//! Length and tone are closed enums with an explicit fallback: unrecognized
//! input becomes the documented default and is logged, never silently
//! swallowed. Backend failures come back as text in the result, so callers
//! need no error handling of their own on this path.

use crate::api::InferenceError;
use crate::assistant::{count_words, TextGenerator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryLength {
    Short,
    Medium,
    Long,
}

impl StoryLength {
    /// Normalize free-form input. Anything unrecognized falls back to
    /// [`StoryLength::Medium`] with a warning.
    pub fn from_input(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "short" => StoryLength::Short,
            "medium" => StoryLength::Medium,
            "long" => StoryLength::Long,
            other => {
                tracing::warn!(input = other, "unrecognized story length, using medium");
                StoryLength::Medium
            }
        }
    }

    fn instruction(self) -> &'static str {
        match self {
            StoryLength::Short => "a short story (100-200 words)",
            StoryLength::Medium => "a moderate-length story (300-500 words)",
            StoryLength::Long => "a long story (800-1200 words)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryTone {
    Happy,
    Sad,
    Mysterious,
    Exciting,
    Dark,
    Light,
    Neutral,
}

impl StoryTone {
    /// Normalize free-form input. Anything unrecognized falls back to
    /// [`StoryTone::Neutral`] with a warning.
    pub fn from_input(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "happy" => StoryTone::Happy,
            "sad" => StoryTone::Sad,
            "mysterious" => StoryTone::Mysterious,
            "exciting" => StoryTone::Exciting,
            "dark" => StoryTone::Dark,
            "light" => StoryTone::Light,
            "neutral" => StoryTone::Neutral,
            other => {
                tracing::warn!(input = other, "unrecognized story tone, using neutral");
                StoryTone::Neutral
            }
        }
    }

    fn instruction(self) -> &'static str {
        match self {
            StoryTone::Happy => "with an uplifting, joyful mood",
            StoryTone::Sad => "with a melancholic, sorrowful mood",
            StoryTone::Mysterious => "with an air of mystery and suspense",
            StoryTone::Exciting => "with a fast-paced, thrilling energy",
            StoryTone::Dark => "with a grim, unsettling atmosphere",
            StoryTone::Light => "with a gentle, lighthearted touch",
            StoryTone::Neutral => "with a balanced narrative",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StoryTone::Happy => "happy",
            StoryTone::Sad => "sad",
            StoryTone::Mysterious => "mysterious",
            StoryTone::Exciting => "exciting",
            StoryTone::Dark => "dark",
            StoryTone::Light => "light",
            StoryTone::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoryParameters {
    pub prompt: String,
    pub genre: String,
    pub length: StoryLength,
    pub tone: StoryTone,
}

#[derive(Debug, Clone)]
pub struct StoryResult {
    pub story: String,
    pub word_count: usize,
    pub genre: String,
    pub tone: StoryTone,
}

/// Build the story instruction deterministically from the normalized
/// parameters. Pure; exercised directly by tests.
pub fn build_prompt(params: &StoryParameters) -> String {
    format!(
        "Write {} in the {} genre, {}.\n\nStory premise: {}",
        params.length.instruction(),
        params.genre,
        params.tone.instruction(),
        params.prompt
    )
}

/// Generate a story. Never returns an error: a backend failure produces a
/// `story` of `"Error generating story: {message}"`, any other failure
/// produces `"An unexpected error occurred during story generation: ..."`.
pub async fn generate_story(
    generator: &dyn TextGenerator,
    model: &str,
    params: &StoryParameters,
) -> StoryResult {
    let prompt = build_prompt(params);

    let (story, word_count) = match generator.generate(&prompt, model).await {
        Ok(text) => {
            let words = count_words(&text);
            (text, words)
        }
        Err(e) => match e.downcast_ref::<InferenceError>() {
            Some(inference) => (format!("Error generating story: {inference}"), 0),
            None => (
                format!("An unexpected error occurred during story generation: {e}"),
                0,
            ),
        },
    };

    StoryResult {
        story,
        word_count,
        genre: params.genre.clone(),
        tone: params.tone,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::test_support::{BackendDownGenerator, BrokenGenerator, CannedGenerator};

    fn params() -> StoryParameters {
        StoryParameters {
            prompt: "a lighthouse keeper finds a message in a bottle".to_string(),
            genre: "fantasy".to_string(),
            length: StoryLength::Medium,
            tone: StoryTone::Neutral,
        }
    }

    #[test]
    fn unrecognized_length_defaults_to_medium() {
        for input in ["epic", "tiny", "", "  LONGISH "] {
            assert_eq!(StoryLength::from_input(input), StoryLength::Medium);
        }
        assert_eq!(
            StoryLength::Medium.instruction(),
            "a moderate-length story (300-500 words)"
        );
    }

    #[test]
    fn unrecognized_tone_defaults_to_neutral() {
        for input in ["gritty", "romantic", ""] {
            assert_eq!(StoryTone::from_input(input), StoryTone::Neutral);
        }
        assert_eq!(StoryTone::Neutral.instruction(), "with a balanced narrative");
    }

    #[test]
    fn recognized_inputs_are_case_insensitive() {
        assert_eq!(StoryLength::from_input(" Short "), StoryLength::Short);
        assert_eq!(StoryTone::from_input("MYSTERIOUS"), StoryTone::Mysterious);
    }

    #[test]
    fn prompt_interpolates_all_parameters() {
        let prompt = build_prompt(&params());
        assert!(prompt.contains("a moderate-length story (300-500 words)"));
        assert!(prompt.contains("fantasy genre"));
        assert!(prompt.contains("with a balanced narrative"));
        assert!(prompt.contains("lighthouse keeper"));
    }

    #[tokio::test]
    async fn returns_generated_text_and_word_count() {
        let generator = CannedGenerator::new("Once upon a time the sea was calm.");
        let result = generate_story(&generator, "llama3.2", &params()).await;
        assert_eq!(result.story, "Once upon a time the sea was calm.");
        assert_eq!(result.word_count, 8);
        assert_eq!(result.genre, "fantasy");
    }

    #[tokio::test]
    async fn backend_failure_is_reported_as_data() {
        let result = generate_story(&BackendDownGenerator, "llama3.2", &params()).await;
        assert_eq!(
            result.story,
            "Error generating story: invalid response stream: connection reset"
        );
        assert_eq!(result.word_count, 0);
    }

    #[tokio::test]
    async fn other_failures_use_the_generic_message() {
        let result = generate_story(&BrokenGenerator, "llama3.2", &params()).await;
        assert!(result
            .story
            .starts_with("An unexpected error occurred during story generation: "));
    }
}
