//! Batched inference for paired-text ("siamese") classifiers.
//!
//! Powered by [Candle](https://github.com/huggingface/candle). Takes a tab-separated
//! file of `text_a`/`text_b` pairs, encodes both texts to fixed-length id/segment
//! sequences, feeds them to a two-tower classifier in fixed-size batches, and writes
//! one prediction row per input row, in input order.

#![deny(missing_docs)]

// ============ Internal API ============

pub(crate) mod models;
pub(crate) mod pipelines;

// ============ Public API ============

pub mod error;

pub use pipelines::pair_classification;
