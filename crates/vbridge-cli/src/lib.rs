//! # vbridge-cli — Validation Bridge Command-Line Interface
//!
//! Runs the bridge against files on disk.
//!
//! ## Subcommands
//!
//! - `check`: validate a configuration document against a backend JSON
//!   Schema and print per-attribute diagnostics
//! - `expressions`: print a schema's path expression table
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to the library crates.
//! - Diagnostics go to stdout; logs go to stderr.

pub mod check;
pub mod expressions;
