//! Terminal output helpers for TalkOne build tooling
//!
//! Provides shared CLI functionality:
//! - Status and stage messages
//! - Size and duration formatting
//! - Spinners for steps that produce no output of their own

#![warn(missing_docs)]

pub mod output;
pub mod progress;
