//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the viewer:
//! - Math types and operations
//! - Time management and rate limiting
//! - Logging utilities

pub mod math;
pub mod time;
pub mod logging;
