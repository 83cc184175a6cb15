//! Shared utilities for marketbrief
//!
//! This crate provides common functionality used across the marketbrief
//! workspace: logging setup and environment-variable helpers.

pub mod env;
pub mod logging;

pub use env::{optional_env, require_env, EnvError};
pub use logging::init_tracing;
