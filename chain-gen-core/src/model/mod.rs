//! Top-level module for the Markov text generation system.
//!
//! This crate provides an order-N word-token Markov generator, including:
//! - A weighted token transition graph (`TokenGraph`)
//! - Internal successor-set vertices (`Node`)
//! - Snapshot persistence (`StateCache`)
//! - A high-level generation interface (`TextBuilder`)

/// High-level interface: builds (or reloads) a token graph from a source
/// text and generates pseudo-random sentences by weighted random walk.
pub mod text_builder;

/// Weighted token transition graph.
///
/// Handles source-text parsing, transition counting, weighted successor
/// sampling and sentence-start enumeration.
pub mod token_graph;

/// Snapshot persistence for built token graphs.
///
/// Keyed by source path, token depth and a fingerprint of the source
/// content, so an unchanged source is never re-parsed.
pub mod cache;

/// Internal representation of a single graph vertex (successor set).
///
/// Tracks outgoing transitions and supports weighted random sampling.
/// This module is not exposed publicly.
mod node;
