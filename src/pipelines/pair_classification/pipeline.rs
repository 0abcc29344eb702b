use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{PipelineError, Result};
use crate::pipelines::stats::PipelineStats;

use super::dataset::{EncodedPair, PairDataset};
use super::encoding::PairTokenizer;
use super::model::PairClassificationModel;

// ============ Options ============

/// Configuration consumed by the inference driver.
#[derive(Debug, Clone)]
pub struct InferenceOptions {
    /// Fixed length every encoded sequence is padded or truncated to.
    pub seq_length: usize,
    /// Number of examples per classifier invocation.
    pub batch_size: usize,
    /// Number of classes the classifier scores. Must match the score matrix width.
    pub labels_num: usize,
    /// Emit the raw score row alongside each label.
    pub output_logits: bool,
    /// Emit softmax probabilities alongside each label.
    pub output_prob: bool,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            seq_length: 128,
            batch_size: 32,
            labels_num: 2,
            output_logits: false,
            output_prob: false,
        }
    }
}

impl InferenceOptions {
    /// Reject invalid configuration before any batch is processed.
    pub fn validate(&self) -> Result<()> {
        if self.seq_length == 0 {
            return Err(PipelineError::Config(
                "seq_length must be a positive integer".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(PipelineError::Config(
                "batch_size must be a positive integer".to_string(),
            ));
        }
        if self.labels_num == 0 {
            return Err(PipelineError::Config(
                "labels_num must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

// ============ Output types ============

/// Prediction for one example.
#[derive(Debug, Clone)]
pub struct PairPrediction {
    /// Index of the highest score (ties broken by lowest index).
    pub label: usize,
    /// Raw per-class scores, one per label.
    pub logits: Vec<f32>,
    /// Softmax of `logits`: non-negative, sums to 1.
    pub probs: Vec<f32>,
}

// ============ Score post-processing ============

/// First occurrence of the maximum wins, so ties resolve to the lowest index.
fn argmax(row: &[f32]) -> usize {
    let mut best = 0;
    for (i, &score) in row.iter().enumerate().skip(1) {
        if score > row[best] {
            best = i;
        }
    }
    best
}

/// Numerically stable row-wise softmax.
fn softmax(row: &[f32]) -> Vec<f32> {
    let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = row.iter().map(|&score| (score - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

// ============ Pipeline ============

/// Batched inference driver for a paired-text classifier.
///
/// Construct with [`PairClassificationPipelineBuilder`](super::PairClassificationPipelineBuilder),
/// or with [`Self::from_parts`] to supply your own tokenizer and classifier.
///
/// # Examples
///
/// ```rust,no_run
/// # use siamese_pipelines::pair_classification::PairClassificationPipelineBuilder;
/// # fn main() -> siamese_pipelines::error::Result<()> {
/// let pipeline = PairClassificationPipelineBuilder::bert("my-org/siamese-bert", 2)
///     .seq_length(64)
///     .batch_size(16)
///     .output_prob(true)
///     .build()?;
///
/// let stats = pipeline.predict_file("pairs.tsv", "predictions.tsv")?;
/// println!("{} examples in {:?}", stats.items_processed, stats.total_time);
/// # Ok(())
/// # }
/// ```
pub struct PairClassificationPipeline<M: PairClassificationModel, T = tokenizers::Tokenizer> {
    pub(crate) model: M,
    pub(crate) tokenizer: T,
    pub(crate) options: InferenceOptions,
}

impl<M: PairClassificationModel, T: PairTokenizer> PairClassificationPipeline<M, T> {
    /// Assemble a pipeline from an already-built model and tokenizer.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any option is zero.
    pub fn from_parts(model: M, tokenizer: T, options: InferenceOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            model,
            tokenizer,
            options,
        })
    }

    /// The options this pipeline runs with.
    pub fn options(&self) -> &InferenceOptions {
        &self.options
    }

    /// Returns the device (CPU/GPU) the model is running on.
    pub fn device(&self) -> &candle_core::Device {
        self.model.device()
    }

    /// Read and encode a tab-separated input file with this pipeline's tokenizer.
    pub fn load_dataset(&self, path: impl AsRef<Path>) -> Result<PairDataset> {
        PairDataset::from_tsv(path, &self.tokenizer, self.options.seq_length)
    }

    /// Score one batch and post-process every row into a prediction.
    ///
    /// # Errors
    ///
    /// Returns a classifier contract error if the score matrix does not have
    /// exactly one row per example with `labels_num` columns each.
    pub fn classify_batch(&self, batch: &[EncodedPair]) -> Result<Vec<PairPrediction>> {
        let scores = self.model.forward_batch(batch)?;
        if scores.len() != batch.len() {
            return Err(PipelineError::Classifier(format!(
                "Classifier returned {} score rows for a batch of {}",
                scores.len(),
                batch.len()
            )));
        }

        scores
            .into_iter()
            .map(|row| {
                if row.len() != self.options.labels_num {
                    return Err(PipelineError::Classifier(format!(
                        "Classifier returned {} scores per example, expected labels_num = {}",
                        row.len(),
                        self.options.labels_num
                    )));
                }
                let probs = softmax(&row);
                Ok(PairPrediction {
                    label: argmax(&row),
                    logits: row,
                    probs,
                })
            })
            .collect()
    }

    /// Run inference over the whole dataset, writing one result row per example
    /// to `sink` in dataset order.
    ///
    /// The sink receives a header first (`label`, plus `logits`/`prob` columns
    /// when enabled), then tab-separated rows with space-joined values inside
    /// multi-value fields. The sink is flushed before returning. Any error
    /// aborts the run; rows already flushed remain but the run counts as failed.
    pub fn run<W: Write>(&self, dataset: &PairDataset, sink: W) -> Result<PipelineStats> {
        let stats = PipelineStats::start();
        let mut sink = BufWriter::new(sink);

        sink.write_all(b"label")?;
        if self.options.output_logits {
            sink.write_all(b"\tlogits")?;
        }
        if self.options.output_prob {
            sink.write_all(b"\tprob")?;
        }
        sink.write_all(b"\n")?;

        let mut batches_processed = 0;
        for batch in dataset.batches(self.options.batch_size) {
            for prediction in self.classify_batch(batch)? {
                write!(sink, "{}", prediction.label)?;
                if self.options.output_logits {
                    write!(sink, "\t{}", join_scores(&prediction.logits))?;
                }
                if self.options.output_prob {
                    write!(sink, "\t{}", join_scores(&prediction.probs))?;
                }
                sink.write_all(b"\n")?;
            }
            batches_processed += 1;
            tracing::debug!(batch = batches_processed, size = batch.len(), "batch scored");
        }

        sink.flush()?;
        Ok(stats.finish(dataset.len(), batches_processed))
    }

    /// Load `input`, run inference, and write predictions to `output`.
    pub fn predict_file(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<PipelineStats> {
        let dataset = self.load_dataset(input)?;
        let sink = File::create(output)?;
        self.run(&dataset, sink)
    }
}

fn join_scores(row: &[f32]) -> String {
    row.iter()
        .map(f32::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
