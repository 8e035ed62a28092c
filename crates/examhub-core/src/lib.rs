//! # examhub-core
//!
//! Core crate for ExamHub. Contains configuration schemas, typed
//! identifiers, the participant model, and the unified error system.
//!
//! This crate has **no** internal dependencies on other ExamHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
