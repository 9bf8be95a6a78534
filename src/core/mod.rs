//! Core functionality module
//!
//! Shared plumbing for the whole tool: configuration, error types, and the
//! filesystem helpers every workflow leans on.
//!
//! # Submodules
//!
//! - `config` - Configuration loading, saving, and management
//! - `error` - Error types and result aliases
//! - `fsops` - Case-safe renames and cross-filesystem moves

pub mod config;
pub mod error;
pub mod fsops;
