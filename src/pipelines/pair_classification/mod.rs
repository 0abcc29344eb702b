//! Paired-text ("siamese") classification pipeline.
//!
//! Reads a tab-separated file with `text_a` and `text_b` columns, encodes both
//! texts of every row to fixed-length id/segment sequences, scores them with a
//! two-tower classifier in fixed-size batches, and writes one prediction row
//! per input row - in input order, always.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use siamese_pipelines::pair_classification::PairClassificationPipelineBuilder;
//!
//! # fn main() -> siamese_pipelines::error::Result<()> {
//! let pipeline = PairClassificationPipelineBuilder::bert("my-org/siamese-bert", 2)
//!     .seq_length(64)
//!     .batch_size(16)
//!     .output_prob(true)
//!     .build()?;
//!
//! let stats = pipeline.predict_file("pairs.tsv", "predictions.tsv")?;
//! println!("{} examples in {:?}", stats.items_processed, stats.total_time);
//! # Ok(())
//! # }
//! ```
//!
//! # File contracts
//!
//! Input: UTF-8, tab-separated, first line a header naming columns. `text_a`
//! and `text_b` are required (resolved by name, any order); extra columns are
//! ignored. Output: a `label` header (plus `logits`/`prob` columns when
//! enabled), then one tab-separated row per input row with space-joined values
//! inside multi-value fields.
//!
//! # Custom collaborators
//!
//! The tokenizer and classifier are capability traits ([`PairTokenizer`],
//! [`PairClassificationModel`]); assemble a pipeline around your own
//! implementations with [`PairClassificationPipeline::from_parts`].

// ============ Internal API ============

pub(crate) mod builder;
pub(crate) mod dataset;
pub(crate) mod encoding;
pub(crate) mod model;
pub(crate) mod pipeline;

#[cfg(test)]
pub(crate) mod testing;

// ============ Public API ============

pub use crate::models::{SiameseBertModel, SiameseBertOptions};
pub use crate::pipelines::stats::PipelineStats;
pub use builder::PairClassificationPipelineBuilder;
pub use dataset::{EncodedPair, PairDataset};
pub use encoding::{
    encode, PairTokenizer, CLS_TOKEN, PAD_TOKEN, SEP_TOKEN, UNK_TOKEN,
};
pub use model::PairClassificationModel;
pub use pipeline::{InferenceOptions, PairClassificationPipeline, PairPrediction};
