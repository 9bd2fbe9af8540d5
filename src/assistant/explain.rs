//! Code explanation prompt template.
//!
//! Three prompt variants by detail level, a fixed pattern table for key
//! concepts, and a small set of tips gated by regex presence checks. The
//! concept matches are independent; a snippet can hit every row at once.

use regex::Regex;
use std::sync::LazyLock;

use crate::api::InferenceError;
use crate::assistant::TextGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailLevel {
    Basic,
    Medium,
    Detailed,
}

impl DetailLevel {
    /// Normalize free-form input; unrecognized falls back to
    /// [`DetailLevel::Medium`] with a warning.
    pub fn from_input(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "basic" => DetailLevel::Basic,
            "medium" => DetailLevel::Medium,
            "detailed" => DetailLevel::Detailed,
            other => {
                tracing::warn!(input = other, "unrecognized detail level, using medium");
                DetailLevel::Medium
            }
        }
    }

    fn instruction(self) -> &'static str {
        match self {
            DetailLevel::Basic => {
                "Explain what this code does in two or three plain sentences, \
                 for someone new to programming"
            }
            DetailLevel::Medium => {
                "Explain what this code does and how its main parts work together"
            }
            DetailLevel::Detailed => {
                "Explain this code thoroughly: walk through it section by section, \
                 note the data flow, and point out anything subtle"
            }
        }
    }
}

/// Fixed (pattern, concept) table. Every matching row contributes a concept.
static CONCEPTS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?m)^\s*(pub\s+)?fn\s+\w", "function definitions"),
        (r"\bstruct\s+\w", "struct types"),
        (r"\btrait\s+\w", "trait definitions"),
        (r"\bimpl\b", "implementation blocks"),
        (r"\bmatch\b", "pattern matching"),
        (r"\bfor\b.*\bin\b", "iteration"),
        (r"Result<|Option<", "optional and fallible values"),
        (r"async\s+fn|\.await\b", "async/await"),
        (r"Vec<|vec!", "growable vectors"),
        (r"HashMap|BTreeMap", "key-value maps"),
        (r"\|[^|]*\|\s*\S", "closures"),
    ]
    .into_iter()
    .map(|(pattern, name)| (Regex::new(pattern).expect("concept pattern"), name))
    .collect()
});

static TIP_UNWRAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.unwrap\(\)").expect("unwrap pattern"));
static TIP_CLONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.clone\(\)").expect("clone pattern"));
static TIP_INDEXING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w\[\d+\]").expect("indexing pattern"));
static TIP_MUT_GLOBAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"static\s+mut\s").expect("static mut pattern"));

#[derive(Debug, Clone)]
pub struct Explanation {
    pub explanation: String,
    pub concepts: Vec<String>,
    pub tips: Vec<String>,
}

/// Extract the key concepts present in the snippet, in table order.
pub fn key_concepts(code: &str) -> Vec<String> {
    CONCEPTS
        .iter()
        .filter(|(pattern, _)| pattern.is_match(code))
        .map(|(_, name)| name.to_string())
        .collect()
}

/// Hard-coded tips, each gated by a presence check.
pub fn tips_for(code: &str) -> Vec<String> {
    let mut tips = Vec::new();
    if TIP_UNWRAP.is_match(code) {
        tips.push(
            "`.unwrap()` panics on failure; prefer `?` or a `match` on the error case."
                .to_string(),
        );
    }
    if TIP_CLONE.is_match(code) {
        tips.push(
            "Frequent `.clone()` calls can often be replaced by borrowing.".to_string(),
        );
    }
    if TIP_INDEXING.is_match(code) {
        tips.push(
            "Direct indexing panics when out of bounds; `.get()` returns an Option instead."
                .to_string(),
        );
    }
    if TIP_MUT_GLOBAL.is_match(code) {
        tips.push(
            "`static mut` is unsafe to touch; a lock or atomic is almost always better."
                .to_string(),
        );
    }
    tips
}

/// Explain a snippet at the requested detail level. Generation failures are
/// reported inside `explanation`, same policy as story generation; the
/// locally computed concepts and tips are returned either way.
pub async fn explain_code(
    generator: &dyn TextGenerator,
    model: &str,
    code: &str,
    detail: DetailLevel,
) -> Explanation {
    let prompt = format!("{}:\n\n{code}", detail.instruction());

    let explanation = match generator.generate(&prompt, model).await {
        Ok(text) => text,
        Err(e) => match e.downcast_ref::<InferenceError>() {
            Some(inference) => format!("Error explaining code: {inference}"),
            None => format!("An unexpected error occurred during code explanation: {e}"),
        },
    };

    Explanation {
        explanation,
        concepts: key_concepts(code),
        tips: tips_for(code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::test_support::{BackendDownGenerator, CannedGenerator};

    #[test]
    fn unrecognized_detail_defaults_to_medium() {
        assert_eq!(DetailLevel::from_input("exhaustive"), DetailLevel::Medium);
        assert_eq!(DetailLevel::from_input(""), DetailLevel::Medium);
        assert_eq!(DetailLevel::from_input(" Detailed "), DetailLevel::Detailed);
    }

    #[test]
    fn concepts_match_independently() {
        let code = "fn main() {\n    let v = vec![1, 2];\n    match v.first() {\n        Some(x) => println!(\"{x}\"),\n        None => {}\n    }\n}";
        let concepts = key_concepts(code);
        assert!(concepts.contains(&"function definitions".to_string()));
        assert!(concepts.contains(&"pattern matching".to_string()));
        assert!(concepts.contains(&"growable vectors".to_string()));
        assert!(!concepts.contains(&"trait definitions".to_string()));
    }

    #[test]
    fn tips_are_gated_by_presence() {
        let code = "let x = maybe().unwrap();";
        let tips = tips_for(code);
        assert_eq!(tips.len(), 1);
        assert!(tips[0].contains("unwrap"));
        assert!(tips_for("fn f() {}").is_empty());
    }

    #[tokio::test]
    async fn prompt_varies_with_detail_level() {
        let generator = CannedGenerator::new("it prints numbers");
        explain_code(&generator, "llama3.2", "fn main() {}", DetailLevel::Basic).await;
        assert!(generator.last_prompt().contains("new to programming"));
        explain_code(&generator, "llama3.2", "fn main() {}", DetailLevel::Detailed).await;
        assert!(generator.last_prompt().contains("section by section"));
    }

    #[tokio::test]
    async fn backend_failure_still_yields_local_results() {
        let code = "fn main() { let x = v.clone(); }";
        let result = explain_code(&BackendDownGenerator, "llama3.2", code, DetailLevel::Medium).await;
        assert!(result.explanation.starts_with("Error explaining code: "));
        assert!(result.concepts.contains(&"function definitions".to_string()));
        assert!(result.tips.iter().any(|t| t.contains("clone")));
    }
}
