//! Request/response protocol
//!
//! One JSON object in on stdin, one JSON line out on stdout.

pub mod request;
pub mod response;

pub use request::ExecutionRequest;
pub use response::{DriverFailure, ExecutionResult, Response};
