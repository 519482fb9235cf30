//! Internal utilities for ai-helper
//!
//! Implementation details shared by the HTTP collaborators and the file-backed
//! stores. `RetryPolicy` is re-exported through `lib.rs` because it is part of
//! provider configuration.

pub(crate) mod fs;
pub(crate) mod http;
pub mod retry;
