//! Order-N Markov-chain text generation library.
//!
//! This crate provides a word-token Markov text generator including:
//! - A weighted token transition graph built from raw source text
//! - Snapshot persistence to skip re-parsing unchanged sources
//! - Weighted random-walk generation with sentence-aware termination
//!
//! Only the high-level API is exposed publicly. Low-level components
//! are kept internal to ensure consistency and prevent misuse.

/// Core token graph and generation logic.
///
/// This module exposes the high-level generator interface while keeping
/// internal vertex representations private.
pub mod model;

/// Error types shared across the crate.
pub mod error;

/// I/O utilities (file loading, path helpers).
///
/// Not exposed
pub(crate) mod io;
