use candle_core::Device;
use tokenizers::Tokenizer;

use crate::error::Result;

use super::dataset::EncodedPair;

/// The classifier capability the inference driver needs.
///
/// A model scores a batch of encoded pairs in one atomic, blocking call and
/// returns one row of per-class scores per example. Model parameters are frozen;
/// nothing here touches training state. Any conforming implementation can be
/// substituted - the crate ships [`SiameseBertModel`](crate::pair_classification::SiameseBertModel),
/// and tests inject deterministic stubs.
pub trait PairClassificationModel {
    /// Model-specific construction options.
    type Options: std::fmt::Debug + Clone;

    /// Load the model onto the given device.
    fn new(options: Self::Options, device: Device) -> Result<Self>
    where
        Self: Sized;

    /// Score one batch. Must return exactly one row per example in `batch`,
    /// each with the model's fixed number of class columns.
    fn forward_batch(&self, batch: &[EncodedPair]) -> Result<Vec<Vec<f32>>>;

    /// Load the tokenizer that matches this model's vocabulary.
    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer>;

    /// The device the model runs on.
    fn device(&self) -> &Device;
}
