//! Runtime state shared across the assistant: validated settings and the
//! in-session conversation memory.

pub mod config;
pub mod memory;
