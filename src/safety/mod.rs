//! Safety & cleanup
//!
//! Run-scoped workspace artifacts, removed on every exit path.

pub mod workspace;
