//! # ProcureAI Common Library
//!
//! Shared code for the ProcureAI CPV client crates:
//! - Model service request/response types and boundary validation
//! - Configuration loading
//! - Common error type

pub mod api;
pub mod config;
pub mod error;

pub use error::{Error, Result};
