//! EmuELEC backup restore library.
//!
//! This library exposes the core functionality of the `eerestore` CLI for use
//! in tests and potentially other applications.
//!
//! # Modules
//!
//! - `plan`: The destination set (archive, working directory, copy steps)
//! - `archive`: Backup ZIP expansion
//! - `restore`: The restore operator and its per-step report
//! - `error`: Error types with user-recoverable hints
//! - `output`: Output mode abstraction (robot/human)
//! - `cli`: Argument definitions
#![forbid(unsafe_code)]

pub mod archive;
pub mod cli;
pub mod error;
pub mod logging;
pub mod output;
pub mod plan;
pub mod restore;
