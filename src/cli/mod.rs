//! Command-line interface parsing and dispatch.
//!
//! One-shot subcommands cover chat, story generation, code analysis, code
//! explanation, and challenge retrieval; running with no subcommand opens
//! the interactive menu. The `--env` flag selects which configuration
//! overlay is applied before anything else happens.

pub mod menu;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::api::OllamaClient;
use crate::assistant::challenge::{self, Difficulty};
use crate::assistant::code;
use crate::assistant::explain::{self, DetailLevel};
use crate::assistant::story::{self, StoryLength, StoryParameters, StoryTone};
use crate::core::config::Settings;
use crate::ui::{self, spinner::with_spinner};

#[derive(Parser)]
#[command(name = "ember")]
#[command(about = "A terminal companion assistant powered by local Ollama models")]
#[command(
    long_about = "Ember forwards your prompts to a locally running Ollama server and \
renders the results in the terminal.\n\n\
Configuration:\n\
  Settings load from config/default.toml, optionally overlaid by a named\n\
  environment document selected with --env (e.g. --env development reads\n\
  config/development.toml on top of the defaults).\n\n\
Environment Variables:\n\
  OLLAMA_HOST   Backend address (optional, defaults to http://localhost:11434)\n\
  RUST_LOG      Log filter override (optional)"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration environment overlay to apply (e.g. "development")
    #[arg(short, long, global = true, value_name = "NAME")]
    pub env: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send one message and print the reply
    Chat {
        /// The message to send
        message: Vec<String>,
    },
    /// Generate a story from a premise
    Story {
        /// The story premise
        prompt: Vec<String>,
        /// Story genre
        #[arg(short, long, default_value = "fantasy")]
        genre: String,
        /// Story length: short, medium, long
        #[arg(short, long, default_value = "medium")]
        length: String,
        /// Story tone: happy, sad, mysterious, exciting, dark, light
        #[arg(short, long, default_value = "neutral")]
        tone: String,
    },
    /// Analyze a source file and print metrics and suggestions
    Analyze {
        /// Path to the file to analyze
        path: PathBuf,
    },
    /// Explain what a source file does
    Explain {
        /// Path to the file to explain
        path: PathBuf,
        /// Detail level: basic, medium, detailed
        #[arg(short, long, default_value = "medium")]
        detail: String,
    },
    /// Fetch a coding challenge
    Challenge {
        /// Challenge difficulty: easy, medium, hard
        #[arg(short, long, default_value = "medium")]
        difficulty: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    // The subscriber must exist before settings load, or warnings emitted
    // during configuration resolution are dropped.
    crate::logging::init();

    let settings = match Settings::load(args.env.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ Configuration error: {e}");
            std::process::exit(1);
        }
    };
    crate::logging::apply_level(settings.logging.level);

    let client = OllamaClient::new(&settings);
    let model = settings.ollama.model.clone();

    match args.command {
        Some(Commands::Chat { message }) => {
            let Some(message) = join_words(&message) else {
                eprintln!("❌ Nothing to send; give the message as an argument.");
                std::process::exit(1);
            };
            match with_spinner("waiting for the model", client.generate(&message, &model)).await {
                Ok(reply) => ui::print_panel("Reply", &reply),
                Err(e) => {
                    eprintln!("❌ Inference error: {e}");
                    std::process::exit(1);
                }
            }
            Ok(())
        }
        Some(Commands::Story {
            prompt,
            genre,
            length,
            tone,
        }) => {
            let Some(prompt) = join_words(&prompt) else {
                eprintln!("❌ Nothing to write about; give the premise as an argument.");
                std::process::exit(1);
            };
            let params = StoryParameters {
                prompt,
                genre,
                length: StoryLength::from_input(&length),
                tone: StoryTone::from_input(&tone),
            };
            let result =
                with_spinner("writing", story::generate_story(&client, &model, &params)).await;
            ui::print_panel("Story", &result.story);
            ui::print_table(
                &["words", "genre", "tone"],
                &[vec![
                    result.word_count.to_string(),
                    result.genre.clone(),
                    result.tone.label().to_string(),
                ]],
            );
            Ok(())
        }
        Some(Commands::Analyze { path }) => {
            let source = std::fs::read_to_string(&path)?;
            let analysis =
                with_spinner("analyzing", code::analyze_code(&client, &model, &source)).await;
            ui::print_header(&format!("Analysis of {}", path.display()));
            ui::print_table(
                &["lines", "words", "complexity"],
                &[vec![
                    analysis.line_count.to_string(),
                    analysis.word_count.to_string(),
                    analysis.complexity.to_string(),
                ]],
            );
            if analysis.suggestions.is_empty() {
                println!("No suggestions.");
            } else {
                for suggestion in &analysis.suggestions {
                    println!("• {suggestion}");
                }
            }
            Ok(())
        }
        Some(Commands::Explain { path, detail }) => {
            let source = std::fs::read_to_string(&path)?;
            let detail = DetailLevel::from_input(&detail);
            let result =
                with_spinner("explaining", explain::explain_code(&client, &model, &source, detail))
                    .await;
            ui::print_panel(&format!("Explanation of {}", path.display()), &result.explanation);
            if !result.concepts.is_empty() {
                println!("Key concepts: {}", result.concepts.join(", "));
            }
            for tip in &result.tips {
                println!("💡 {tip}");
            }
            Ok(())
        }
        Some(Commands::Challenge { difficulty }) => {
            let difficulty = Difficulty::from_input(&difficulty);
            let text = with_spinner(
                "fetching a challenge",
                challenge::fetch_challenge(&client, &model, difficulty),
            )
            .await;
            ui::print_panel("Challenge", &text);
            Ok(())
        }
        None => menu::run(&client, &settings).await,
    }
}

/// Join positional words into one prompt; `None` when nothing was given.
fn join_words(words: &[String]) -> Option<String> {
    let joined = words.join(" ");
    if joined.trim().is_empty() {
        None
    } else {
        Some(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_words_concatenates_arguments() {
        let words = vec!["a".to_string(), "dragon".to_string()];
        assert_eq!(join_words(&words).as_deref(), Some("a dragon"));
    }

    #[test]
    fn join_words_rejects_empty_and_whitespace_input() {
        assert_eq!(join_words(&[]), None);
        assert_eq!(join_words(&["   ".to_string()]), None);
    }
}
