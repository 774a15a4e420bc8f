// crates/utilmat-cli/src/commands/mod.rs
//
// Command module declarations for the utilmat CLI.

pub mod build;
pub mod catalog;
