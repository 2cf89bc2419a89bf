//! extpack library - command handlers exposed for the binary and for tests

pub mod commands;
pub mod common;

pub use common::GlobalOpts;
