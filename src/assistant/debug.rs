//! Debugging helper: error classification and stack-trace triage.
//!
//! Classification is ordered regex matching over the raw error text, first
//! match wins, with an explicit `Unknown` fallback. Everything canned lives
//! here; the optional model analysis rides on top and fails silently.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::assistant::TextGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    TypeMismatch,
    NullReference,
    IndexOutOfBounds,
    MissingKey,
    Syntax,
    ImportFailure,
    DivisionByZero,
    FileNotFound,
    PermissionDenied,
    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorCategory::TypeMismatch => "type mismatch",
            ErrorCategory::NullReference => "null or missing value",
            ErrorCategory::IndexOutOfBounds => "index out of bounds",
            ErrorCategory::MissingKey => "missing key or field",
            ErrorCategory::Syntax => "syntax error",
            ErrorCategory::ImportFailure => "import failure",
            ErrorCategory::DivisionByZero => "division by zero",
            ErrorCategory::FileNotFound => "file not found",
            ErrorCategory::PermissionDenied => "permission denied",
            ErrorCategory::Unknown => "unknown",
        };
        write!(f, "{label}")
    }
}

/// Ordered classification table; earlier rows shadow later ones.
static CATEGORIES: LazyLock<Vec<(Regex, ErrorCategory)>> = LazyLock::new(|| {
    [
        (
            r"(?i)mismatched types|type mismatch|expected .+, found|TypeError",
            ErrorCategory::TypeMismatch,
        ),
        (
            r"(?i)unwrap\(\)` on a `None|null pointer|NoneType|nil pointer|undefined is not",
            ErrorCategory::NullReference,
        ),
        (
            r"(?i)index out of (bounds|range)|array index|IndexError",
            ErrorCategory::IndexOutOfBounds,
        ),
        (
            r"(?i)KeyError|no such field|missing field|key not found",
            ErrorCategory::MissingKey,
        ),
        (
            r"(?i)syntax error|unexpected token|SyntaxError",
            ErrorCategory::Syntax,
        ),
        (
            r"(?i)unresolved import|cannot find crate|no module named|ModuleNotFoundError",
            ErrorCategory::ImportFailure,
        ),
        (
            r"(?i)divi(de|sion) by zero|ZeroDivisionError",
            ErrorCategory::DivisionByZero,
        ),
        (
            r"(?i)no such file|file not found|os error 2\b",
            ErrorCategory::FileNotFound,
        ),
        (
            r"(?i)permission denied|access is denied|os error 13\b",
            ErrorCategory::PermissionDenied,
        ),
    ]
    .into_iter()
    .map(|(pattern, category)| (Regex::new(pattern).expect("category pattern"), category))
    .collect()
});

/// Alternative `file:line` shapes, tried in order.
static LOCATIONS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // rustc / panic style: src/main.rs:42
        r"([A-Za-z0-9_./\\-]+\.[A-Za-z]{1,4}):(\d+)",
        // python traceback style: File "app.py", line 17
        r#"(?i)file "([^"]+)", line (\d+)"#,
        // generic: at somewhere/mod line 9
        r"(?i)\bat\s+([A-Za-z0-9_./\\-]+)\s+line\s+(\d+)",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("location pattern"))
    .collect()
});

/// Path fragments that mark a stack frame as library rather than user code.
const LIBRARY_FRAGMENTS: &[&str] = &[
    "/rustc/",
    ".cargo/registry",
    "site-packages",
    "node_modules",
    "/usr/lib",
    "goroot",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

#[derive(Debug, Clone)]
pub struct Diagnosis {
    pub category: ErrorCategory,
    pub location: Option<SourceLocation>,
    pub remediation: &'static str,
    pub ai_analysis: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TraceSplit {
    pub user_frames: Vec<String>,
    pub library_frames: Vec<String>,
}

/// Classify a raw error message. First matching row wins.
pub fn classify(error_text: &str) -> ErrorCategory {
    CATEGORIES
        .iter()
        .find(|(pattern, _)| pattern.is_match(error_text))
        .map(|(_, category)| *category)
        .unwrap_or(ErrorCategory::Unknown)
}

/// Extract a `file:line` location, trying each known shape in order.
pub fn extract_location(error_text: &str) -> Option<SourceLocation> {
    for pattern in LOCATIONS.iter() {
        if let Some(captures) = pattern.captures(error_text) {
            let file = captures.get(1)?.as_str().to_string();
            let line = captures.get(2)?.as_str().parse().ok()?;
            return Some(SourceLocation { file, line });
        }
    }
    None
}

/// Canned remediation text per category.
pub fn remediation(category: ErrorCategory) -> &'static str {
    match category {
        ErrorCategory::TypeMismatch => {
            "Check the expected and actual types at the reported site; a conversion or a \
             changed signature usually resolves this."
        }
        ErrorCategory::NullReference => {
            "Something expected to exist was absent. Handle the missing case explicitly \
             before using the value."
        }
        ErrorCategory::IndexOutOfBounds => {
            "An index walked past the end of a collection. Verify the bounds, or use a \
             checked accessor."
        }
        ErrorCategory::MissingKey => {
            "A lookup key or field was not present. Confirm the key exists, or fall back \
             to a default."
        }
        ErrorCategory::Syntax => {
            "The code does not parse. Look just before the reported position for an \
             unclosed delimiter or missing separator."
        }
        ErrorCategory::ImportFailure => {
            "A module or dependency could not be resolved. Check the name and that the \
             dependency is declared."
        }
        ErrorCategory::DivisionByZero => {
            "A divisor was zero. Guard the division or validate inputs earlier."
        }
        ErrorCategory::FileNotFound => {
            "The path does not exist from the process's working directory. Verify the \
             path and where the program runs."
        }
        ErrorCategory::PermissionDenied => {
            "The process lacks rights for this operation. Check file ownership and modes."
        }
        ErrorCategory::Unknown => {
            "No known pattern matched. Read the message bottom-up and find the first \
             frame inside your own code."
        }
    }
}

/// Split a stack trace into user frames and library frames by substring
/// checks against known library path fragments.
pub fn split_trace(trace: &str) -> TraceSplit {
    let mut user_frames = Vec::new();
    let mut library_frames = Vec::new();

    for line in trace.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if LIBRARY_FRAGMENTS.iter().any(|f| line.contains(f)) {
            library_frames.push(line.to_string());
        } else {
            user_frames.push(line.to_string());
        }
    }

    TraceSplit {
        user_frames,
        library_frames,
    }
}

/// Full diagnosis of an error message: category, location, canned
/// remediation, plus an optional model analysis that fails silently.
pub async fn diagnose(
    generator: &dyn TextGenerator,
    model: &str,
    error_text: &str,
) -> Diagnosis {
    let category = classify(error_text);

    let prompt = format!(
        "This error was reported while running a program. Explain the most likely \
         cause and a concrete fix, briefly:\n\n{error_text}"
    );
    let ai_analysis = match generator.generate(&prompt, model).await {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::debug!(error = %e, "model analysis unavailable");
            None
        }
    };

    Diagnosis {
        category,
        location: extract_location(error_text),
        remediation: remediation(category),
        ai_analysis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::test_support::{BackendDownGenerator, CannedGenerator};

    #[test]
    fn classification_is_first_match_wins() {
        // Mentions both a type mismatch and an index problem; the type row
        // comes first in the table.
        let text = "TypeError: expected str, found int (index out of range)";
        assert_eq!(classify(text), ErrorCategory::TypeMismatch);
    }

    #[test]
    fn classifies_common_error_shapes() {
        assert_eq!(
            classify("error[E0308]: mismatched types"),
            ErrorCategory::TypeMismatch
        );
        assert_eq!(
            classify("called `Option::unwrap()` on a `None` value"),
            ErrorCategory::NullReference
        );
        assert_eq!(
            classify("index out of bounds: the len is 3 but the index is 7"),
            ErrorCategory::IndexOutOfBounds
        );
        assert_eq!(classify("KeyError: 'user_id'"), ErrorCategory::MissingKey);
        assert_eq!(
            classify("ModuleNotFoundError: No module named 'requests'"),
            ErrorCategory::ImportFailure
        );
        assert_eq!(
            classify("attempt to divide by zero"),
            ErrorCategory::DivisionByZero
        );
        assert_eq!(
            classify("No such file or directory (os error 2)"),
            ErrorCategory::FileNotFound
        );
        assert_eq!(classify("something exploded"), ErrorCategory::Unknown);
    }

    #[test]
    fn extracts_rust_style_location() {
        let text = "thread 'main' panicked at src/main.rs:42:13";
        let location = extract_location(text).expect("location");
        assert_eq!(location.file, "src/main.rs");
        assert_eq!(location.line, 42);
    }

    #[test]
    fn extracts_python_style_location() {
        let text = r#"  File "app.py", line 17, in <module>"#;
        let location = extract_location(text).expect("location");
        assert_eq!(location.file, "app.py");
        assert_eq!(location.line, 17);
    }

    #[test]
    fn no_location_yields_none() {
        assert_eq!(extract_location("everything is on fire"), None);
    }

    #[test]
    fn trace_frames_split_by_library_fragments() {
        let trace = "\
at app::handler src/handler.rs:10
at core::result /rustc/abcd/library/core/src/result.rs:1073
at serde_json ~/.cargo/registry/src/serde_json/de.rs:55
at app::main src/main.rs:5";
        let split = split_trace(trace);
        assert_eq!(split.user_frames.len(), 2);
        assert_eq!(split.library_frames.len(), 2);
        assert!(split.user_frames[0].contains("src/handler.rs"));
    }

    #[tokio::test]
    async fn diagnosis_includes_model_analysis_when_available() {
        let generator = CannedGenerator::new("the index comes from user input");
        let diagnosis = diagnose(&generator, "llama3.2", "IndexError: list index out of range").await;
        assert_eq!(diagnosis.category, ErrorCategory::IndexOutOfBounds);
        assert_eq!(
            diagnosis.ai_analysis.as_deref(),
            Some("the index comes from user input")
        );
    }

    #[tokio::test]
    async fn diagnosis_survives_model_failure() {
        let diagnosis = diagnose(&BackendDownGenerator, "llama3.2", "KeyError: 'id'").await;
        assert_eq!(diagnosis.category, ErrorCategory::MissingKey);
        assert_eq!(diagnosis.ai_analysis, None);
        assert!(!diagnosis.remediation.is_empty());
    }
}
