//! gradebox: runs untrusted Python code against a test snippet and reports a verdict
//!
//! # Architecture
//!
//! ## Protocol ([`protocol`])
//! - [`protocol::request`]: The `{code, test}` request document
//! - [`protocol::response`]: Execution results and driver failures, one JSON line each
//!
//! ## Execution Control ([`exec`])
//! - [`exec::executor`]: Workspace, interpreter launch, collection, classification
//! - [`exec::watchdog`]: Wall-clock timer that kills the interpreter's process group
//!
//! ## Judge Adapters ([`judge`])
//! - [`judge::adapter`]: Interpreter adapter contract
//! - [`judge::languages`]: The Python harness
//! - [`judge::registry`]: Adapter lookup by language name
//!
//! ## Evidence & Verdict ([`verdict`])
//! - [`verdict::verdict`]: Priority-ordered classification of one run
//!
//! ## Kernel Primitives ([`kernel`])
//! - [`kernel::signal`]: Interrupt flag and process-group termination
//!
//! ## Safety ([`safety`])
//! - [`safety::workspace`]: Run-scoped, owner-only scratch directory
//!
//! ## Configuration ([`config`])
//! - [`config::settings`]: Defaults, config file, and overrides
//! - [`config::types`]: Error taxonomy and shared enums
//!
//! ## Utilities ([`utils`])
//! - [`utils::env_hygiene`]: Scrubbed interpreter environment
//! - [`utils::output`]: Bounded output collection

// Kernel Primitives
pub mod kernel;

// Execution Control
pub mod exec;

// Judge adapters
pub mod judge;

// Request/response documents
pub mod protocol;

// Evidence & Verdict
pub mod verdict;

// Safety
pub mod safety;

// Configuration
pub mod config;

// Utilities
pub mod utils;

// CLI entrypoint wiring for the gradebox binary
pub mod cli;

pub use config::settings::ExecutorConfig;
pub use config::types::{ErrorType, GradeError, Result};
pub use exec::executor::Executor;
pub use protocol::{DriverFailure, ExecutionRequest, ExecutionResult, Response};
