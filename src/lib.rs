//! Ember is a terminal companion assistant backed by a local Ollama server.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the validated configuration and the in-session
//!   conversation memory.
//! - [`api`] talks to the inference backend: one generate request in,
//!   accumulated text out, typed failures.
//! - [`assistant`] holds the prompt-template modules (storytelling, code
//!   analysis, explanation, debugging, companionship, challenges) behind an
//!   injectable generator seam.
//! - [`ui`] renders headers, panels, tables, and menus, and animates the
//!   spinner shown during blocking backend calls.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which loads configuration, initializes
//! logging, and dispatches to a subcommand or the interactive menu.

pub mod api;
pub mod assistant;
pub mod cli;
pub mod core;
pub mod logging;
pub mod ui;
