//! Interactive menu mode.
//!
//! Runs when no subcommand is given. The companion option keeps one
//! [`ConversationMemory`] alive for the whole session; everything else is
//! stateless between choices.

use std::error::Error;

use crate::api::OllamaClient;
use crate::assistant::challenge::{self, Difficulty};
use crate::assistant::code;
use crate::assistant::companion;
use crate::assistant::debug;
use crate::assistant::explain::{self, DetailLevel};
use crate::assistant::story::{self, StoryLength, StoryParameters, StoryTone};
use crate::core::config::Settings;
use crate::core::memory::ConversationMemory;
use crate::ui::{self, spinner::with_spinner};

const MENU_ENTRIES: &[(&str, &str)] = &[
    ("chat", "send one message to the model"),
    ("story", "generate a story from a premise"),
    ("analyze", "analyze a source file"),
    ("explain", "explain a source file"),
    ("debug", "diagnose an error message"),
    ("companion", "have a conversation"),
    ("challenge", "fetch a coding challenge"),
    ("quit", "leave"),
];

pub async fn run(client: &OllamaClient, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let model = &settings.ollama.model;
    let mut memory = ConversationMemory::new();

    ui::print_header(&format!("ember — talking to {model}"));

    loop {
        ui::print_menu("What would you like to do?", MENU_ENTRIES);
        let Some(choice) = ui::read_line(">")? else {
            break;
        };

        match normalize_choice(&choice) {
            Some("chat") => {
                let Some(message) = ui::read_line("message:")? else {
                    break;
                };
                if message.is_empty() {
                    continue;
                }
                match with_spinner("waiting for the model", client.generate(&message, model)).await
                {
                    Ok(reply) => ui::print_panel("Reply", &reply),
                    Err(e) => eprintln!("❌ Inference error: {e}"),
                }
            }
            Some("story") => {
                let Some(prompt) = ui::read_line("premise:")? else {
                    break;
                };
                let genre = prompt_with_default("genre", "fantasy")?;
                let length = prompt_with_default("length (short/medium/long)", "medium")?;
                let tone = prompt_with_default("tone", "neutral")?;
                let params = StoryParameters {
                    prompt,
                    genre,
                    length: StoryLength::from_input(&length),
                    tone: StoryTone::from_input(&tone),
                };
                let result =
                    with_spinner("writing", story::generate_story(client, model, &params)).await;
                ui::print_panel("Story", &result.story);
                println!("({} words)", result.word_count);
            }
            Some("analyze") => {
                let Some(path) = ui::read_line("file path:")? else {
                    break;
                };
                match std::fs::read_to_string(&path) {
                    Ok(source) => {
                        let analysis =
                            with_spinner("analyzing", code::analyze_code(client, model, &source))
                                .await;
                        ui::print_table(
                            &["lines", "words", "complexity"],
                            &[vec![
                                analysis.line_count.to_string(),
                                analysis.word_count.to_string(),
                                analysis.complexity.to_string(),
                            ]],
                        );
                        for suggestion in &analysis.suggestions {
                            println!("• {suggestion}");
                        }
                    }
                    Err(e) => eprintln!("❌ Could not read {path}: {e}"),
                }
            }
            Some("explain") => {
                let Some(path) = ui::read_line("file path:")? else {
                    break;
                };
                let detail = prompt_with_default("detail (basic/medium/detailed)", "medium")?;
                match std::fs::read_to_string(&path) {
                    Ok(source) => {
                        let result = with_spinner(
                            "explaining",
                            explain::explain_code(
                                client,
                                model,
                                &source,
                                DetailLevel::from_input(&detail),
                            ),
                        )
                        .await;
                        ui::print_panel("Explanation", &result.explanation);
                        if !result.concepts.is_empty() {
                            println!("Key concepts: {}", result.concepts.join(", "));
                        }
                        for tip in &result.tips {
                            println!("💡 {tip}");
                        }
                    }
                    Err(e) => eprintln!("❌ Could not read {path}: {e}"),
                }
            }
            Some("debug") => {
                let Some(error_text) = ui::read_line("paste the error message:")? else {
                    break;
                };
                if error_text.is_empty() {
                    continue;
                }
                println!("(paste stack trace lines if you have them; empty line to finish)");
                let mut trace_lines = Vec::new();
                while let Some(line) = ui::read_line("|")? {
                    if line.is_empty() {
                        break;
                    }
                    trace_lines.push(line);
                }
                let diagnosis =
                    with_spinner("diagnosing", debug::diagnose(client, model, &error_text)).await;
                let location = diagnosis
                    .location
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "not found".to_string());
                ui::print_table(
                    &["category", "location"],
                    &[vec![diagnosis.category.to_string(), location]],
                );
                ui::print_panel("Suggested fix", diagnosis.remediation);
                if !trace_lines.is_empty() {
                    let split = debug::split_trace(&trace_lines.join("\n"));
                    println!(
                        "{} frames in your code, {} in libraries",
                        split.user_frames.len(),
                        split.library_frames.len()
                    );
                    for frame in &split.user_frames {
                        println!("→ {frame}");
                    }
                }
                if let Some(analysis) = diagnosis.ai_analysis {
                    ui::print_panel("Model analysis", &analysis);
                }
            }
            Some("companion") => {
                println!("(empty line returns to the menu)");
                loop {
                    let Some(message) = ui::read_line("you:")? else {
                        return Ok(());
                    };
                    if message.is_empty() {
                        break;
                    }
                    let reply = with_spinner(
                        "thinking",
                        companion::respond(client, model, &mut memory, &message),
                    )
                    .await;
                    ui::print_panel("Companion", &reply);
                }
            }
            Some("challenge") => {
                let difficulty = prompt_with_default("difficulty (easy/medium/hard)", "medium")?;
                let text = with_spinner(
                    "fetching a challenge",
                    challenge::fetch_challenge(client, model, Difficulty::from_input(&difficulty)),
                )
                .await;
                ui::print_panel("Challenge", &text);
            }
            Some("quit") => break,
            _ => println!("Unrecognized choice: {choice}"),
        }
    }

    Ok(())
}

/// Accept either the entry name or its 1-based menu number.
fn normalize_choice(input: &str) -> Option<&'static str> {
    let input = input.trim().to_lowercase();
    if let Ok(index) = input.parse::<usize>() {
        return MENU_ENTRIES.get(index.checked_sub(1)?).map(|(name, _)| *name);
    }
    MENU_ENTRIES
        .iter()
        .map(|(name, _)| *name)
        .find(|name| *name == input)
}

fn prompt_with_default(label: &str, default: &str) -> std::io::Result<String> {
    let answer = ui::read_line(&format!("{label} [{default}]:"))?.unwrap_or_default();
    if answer.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(answer)
    }
}
