use super::model::PairClassificationModel;
use super::pipeline::{InferenceOptions, PairClassificationPipeline};
use crate::error::Result;
use crate::models::{SiameseBertModel, SiameseBertOptions};
use crate::pipelines::utils::DeviceRequest;

/// Builder for creating [`PairClassificationPipeline`] instances.
///
/// Use [`Self::bert`] as the entry point.
///
/// # Examples
///
/// ```rust,no_run
/// # use siamese_pipelines::pair_classification::PairClassificationPipelineBuilder;
/// # fn main() -> siamese_pipelines::error::Result<()> {
/// let pipeline = PairClassificationPipelineBuilder::bert("my-org/siamese-bert", 2)
///     .cuda(0)
///     .batch_size(64)
///     .output_logits(true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct PairClassificationPipelineBuilder<M: PairClassificationModel> {
    options: M::Options,
    inference: InferenceOptions,
    device_request: DeviceRequest,
}

impl<M: PairClassificationModel> PairClassificationPipelineBuilder<M> {
    pub(crate) fn new(options: M::Options, labels_num: usize) -> Self {
        Self {
            options,
            inference: InferenceOptions {
                labels_num,
                ..InferenceOptions::default()
            },
            device_request: DeviceRequest::default(),
        }
    }

    /// Use CPU for inference (default).
    pub fn cpu(mut self) -> Self {
        self.device_request = DeviceRequest::Cpu;
        self
    }

    /// Use a specific CUDA GPU for inference.
    pub fn cuda(mut self, index: usize) -> Self {
        self.device_request = DeviceRequest::Cuda(index);
        self
    }

    /// Fixed encoded sequence length (default 128).
    pub fn seq_length(mut self, seq_length: usize) -> Self {
        self.inference.seq_length = seq_length;
        self
    }

    /// Examples per classifier invocation (default 32).
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.inference.batch_size = batch_size;
        self
    }

    /// Also write raw score rows to the output (default off).
    pub fn output_logits(mut self, enabled: bool) -> Self {
        self.inference.output_logits = enabled;
        self
    }

    /// Also write softmax probabilities to the output (default off).
    pub fn output_prob(mut self, enabled: bool) -> Self {
        self.inference.output_prob = enabled;
        self
    }

    /// Builds the pipeline with configured settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the options are invalid, the device cannot be
    /// initialized, or model/tokenizer loading fails.
    pub fn build(self) -> Result<PairClassificationPipeline<M>> {
        self.inference.validate()?;
        let device = self.device_request.resolve()?;
        let tokenizer = M::get_tokenizer(self.options.clone())?;
        let model = M::new(self.options, device)?;
        PairClassificationPipeline::from_parts(model, tokenizer, self.inference)
    }
}

impl PairClassificationPipelineBuilder<SiameseBertModel> {
    /// Creates a builder for a siamese BERT classifier.
    ///
    /// `model` is a HuggingFace repo id or a local directory holding
    /// `config.json`, the weights, and `tokenizer.json`; `labels_num` is the
    /// width of the classifier head.
    pub fn bert(model: impl Into<String>, labels_num: usize) -> Self {
        Self::new(
            SiameseBertOptions {
                model: model.into(),
                labels_num,
            },
            labels_num,
        )
    }
}
