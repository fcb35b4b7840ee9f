//! Interpreter adapters.
//!
//! The executor stays language-agnostic. Adapters stage the harness and
//! snippets in the workspace and build the interpreter command line.

pub mod adapter;
pub mod languages;
pub mod registry;
