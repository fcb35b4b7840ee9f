//! Verdict
//!
//! Maps the evidence of one run onto the response taxonomy.

pub mod verdict;

pub use verdict::{Evidence, OutcomeRecord, Termination, VerdictClassifier};
