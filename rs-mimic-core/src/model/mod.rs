//! Top-level module for the word-level Markov model.
//!
//! This module provides:
//! - Tokens and whitespace tokenization (`token`)
//! - Successor multisets with weighted sampling (`State`)
//! - The fixed-order transition mapping (`Chain`)
//! - The per-sender model and its file encoding (`Corpus`)
//! - Generation parameters (`GenerationOptions`, `GenerationRequest`)
//! - Bounded rejection sampling (`Generator`)

/// Rejection-sampling message generation.
///
/// Exposes the `Generator` call boundary and the free `generate` function
/// working directly on a `Corpus`.
pub mod generator;

/// Per-sender model: chain, training messages and on-disk encoding.
pub mod corpus;

/// Fixed-order word chain (`state_size >= 1`).
///
/// Handles message ingestion with start padding and terminal marker,
/// next-token prediction and chain walks.
pub mod chain;

/// Successor multiset of a single state.
pub mod state;

/// Tokens, tokenization and joining.
pub mod token;

/// Generation options, start strategies and request type.
pub mod generation_request;
