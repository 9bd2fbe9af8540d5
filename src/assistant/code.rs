//! Code analysis prompt template.
//!
//! The local half is shallow on purpose: line/word metrics, a complexity
//! label bucketed by line count, and a handful of independent regex
//! heuristics. The real analysis is delegated to the model; its suggestions
//! are appended after the heuristic ones, capped, and any failure of that
//! call is swallowed so a dead backend never breaks the local report.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::assistant::{count_words, TextGenerator};

/// Upper bound on suggestions in one report, heuristic and AI combined.
pub const MAX_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Complexity {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl Complexity {
    /// Bucket by line count: <10 low, <50 medium, <100 high, else very high.
    pub fn from_line_count(lines: usize) -> Self {
        match lines {
            0..=9 => Complexity::Low,
            10..=49 => Complexity::Medium,
            50..=99 => Complexity::High,
            _ => Complexity::VeryHigh,
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Complexity::Low => "low",
            Complexity::Medium => "medium",
            Complexity::High => "high",
            Complexity::VeryHigh => "very high",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone)]
pub struct CodeAnalysis {
    pub line_count: usize,
    pub word_count: usize,
    pub complexity: Complexity,
    pub suggestions: Vec<String>,
}

static UNBOUNDED_LOOP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(loop\s*\{|while\s+true\b|while\s*\(\s*true\s*\))")
        .expect("unbounded loop pattern")
});

static PUSH_IN_LOOP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\bfor\b[^{]*\{[^}]*\.push\(").expect("push-in-loop pattern")
});

static DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(pub\s+)?(fn|struct|def|class|function)\s+\w")
        .expect("definition pattern")
});

static IMPORT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(use|import|from)\s+\S").expect("import pattern"));

static BOUNDS_NOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bbreak\b|\breturn\b").expect("bounds-note pattern"));

/// Run the independent heuristics over the raw code text. Each check stands
/// alone; none of them gate the others.
pub fn heuristic_suggestions(code: &str) -> Vec<String> {
    let mut suggestions = Vec::new();

    if UNBOUNDED_LOOP.is_match(code) && !BOUNDS_NOTE.is_match(code) {
        suggestions.push(
            "An unbounded loop with no visible exit was found; make sure it can terminate."
                .to_string(),
        );
    }

    if PUSH_IN_LOOP.is_match(code) {
        suggestions.push(
            "Building a collection by pushing inside a loop; consider pre-sizing it or \
             collecting from an iterator."
                .to_string(),
        );
    }

    if !DEFINITION.is_match(code) {
        suggestions.push(
            "No function or type definitions found; consider structuring the code into \
             named units."
                .to_string(),
        );
    }

    if has_midfile_import(code) {
        suggestions.push(
            "Imports appear after the first definition; group them at the top of the file."
                .to_string(),
        );
    }

    suggestions
}

/// An import line occurring after the first definition counts as mid-file.
fn has_midfile_import(code: &str) -> bool {
    let mut seen_definition = false;
    for line in code.lines() {
        if DEFINITION.is_match(line) {
            seen_definition = true;
        } else if seen_definition && IMPORT_LINE.is_match(line) {
            return true;
        }
    }
    false
}

/// Analyze a piece of code: local metrics and heuristics first, then model
/// suggestions appended up to [`MAX_SUGGESTIONS`] in total. A failing model
/// call is logged at debug level and otherwise ignored.
pub async fn analyze_code(
    generator: &dyn TextGenerator,
    model: &str,
    code: &str,
) -> CodeAnalysis {
    let line_count = code.lines().count();
    let mut suggestions = heuristic_suggestions(code);

    if suggestions.len() < MAX_SUGGESTIONS {
        let prompt = format!(
            "Review the following code and list your most important improvement \
             suggestions, one per line, without numbering:\n\n{code}"
        );
        match generator.generate(&prompt, model).await {
            Ok(reply) => {
                for line in reply.lines() {
                    if suggestions.len() >= MAX_SUGGESTIONS {
                        break;
                    }
                    let line = line.trim();
                    if !line.is_empty() {
                        suggestions.push(line.to_string());
                    }
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "model suggestions unavailable, keeping heuristics");
            }
        }
    }
    suggestions.truncate(MAX_SUGGESTIONS);

    CodeAnalysis {
        line_count,
        word_count: count_words(code),
        complexity: Complexity::from_line_count(line_count),
        suggestions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::test_support::{BackendDownGenerator, CannedGenerator};

    #[test]
    fn complexity_buckets_follow_line_thresholds() {
        assert_eq!(Complexity::from_line_count(0), Complexity::Low);
        assert_eq!(Complexity::from_line_count(9), Complexity::Low);
        assert_eq!(Complexity::from_line_count(10), Complexity::Medium);
        assert_eq!(Complexity::from_line_count(49), Complexity::Medium);
        assert_eq!(Complexity::from_line_count(50), Complexity::High);
        assert_eq!(Complexity::from_line_count(99), Complexity::High);
        assert_eq!(Complexity::from_line_count(100), Complexity::VeryHigh);
    }

    #[test]
    fn flags_unbounded_loop_without_exit() {
        let code = "fn main() {\n    loop {\n        println!(\"tick\");\n    }\n}";
        // `main` has no break or return, so the loop is flagged.
        let suggestions = heuristic_suggestions(code);
        assert!(suggestions.iter().any(|s| s.contains("unbounded loop")));
    }

    #[test]
    fn loop_with_break_is_not_flagged() {
        let code = "fn main() {\n    loop {\n        break;\n    }\n}";
        let suggestions = heuristic_suggestions(code);
        assert!(!suggestions.iter().any(|s| s.contains("unbounded loop")));
    }

    #[test]
    fn flags_push_inside_loop() {
        let code = "fn build() -> Vec<u32> {\n    let mut v = Vec::new();\n    for i in 0..10 {\n        v.push(i);\n    }\n    v\n}";
        let suggestions = heuristic_suggestions(code);
        assert!(suggestions.iter().any(|s| s.contains("pushing inside a loop")));
    }

    #[test]
    fn flags_missing_definitions() {
        let code = "let x = 1;\nprintln!(\"{x}\");";
        let suggestions = heuristic_suggestions(code);
        assert!(suggestions.iter().any(|s| s.contains("No function or type")));
    }

    #[test]
    fn flags_import_after_definition() {
        let code = "fn main() {}\nuse std::fmt;\n";
        assert!(has_midfile_import(code));
        let top = "use std::fmt;\nfn main() {}\n";
        assert!(!has_midfile_import(top));
    }

    #[tokio::test]
    async fn appends_model_suggestions_up_to_the_cap() {
        let generator = CannedGenerator::new("one\ntwo\nthree\nfour\nfive\nsix\nseven");
        let code = "use std::fmt;\nfn main() {}\n";
        let analysis = analyze_code(&generator, "llama3.2", code).await;
        assert_eq!(analysis.suggestions.len(), MAX_SUGGESTIONS);
        assert_eq!(analysis.suggestions[0], "one");
    }

    #[tokio::test]
    async fn model_failure_keeps_heuristic_report() {
        let code = "let x = 1;";
        let analysis = analyze_code(&BackendDownGenerator, "llama3.2", code).await;
        assert_eq!(analysis.line_count, 1);
        assert_eq!(analysis.word_count, 4);
        assert_eq!(analysis.complexity, Complexity::Low);
        assert!(analysis.suggestions.iter().any(|s| s.contains("No function or type")));
    }
}
