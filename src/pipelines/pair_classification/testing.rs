//! Deterministic stub collaborators for unit tests.

use candle_core::Device;

use super::dataset::EncodedPair;
use super::encoding::{PairTokenizer, CLS_TOKEN, PAD_TOKEN, SEP_TOKEN, UNK_TOKEN};
use super::model::PairClassificationModel;
use crate::error::{PipelineError, Result};

/// Splits on whitespace; ids are derived from token bytes so runs are repeatable.
pub struct WhitespaceTokenizer;

impl WhitespaceTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl PairTokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        Ok(text.split_whitespace().map(str::to_string).collect())
    }

    fn convert_tokens_to_ids(&self, tokens: &[String]) -> Result<Vec<u32>> {
        Ok(tokens
            .iter()
            .map(|token| match token.as_str() {
                PAD_TOKEN => 0,
                UNK_TOKEN => 1,
                CLS_TOKEN => 2,
                SEP_TOKEN => 3,
                other => 4 + other.bytes().map(u32::from).sum::<u32>() % 1000,
            })
            .collect())
    }
}

/// Stub classifier: score for class `j` of an example is a fixed function of the
/// example's first real token ids, so predictions are deterministic per input.
pub struct StubModel {
    pub labels_num: usize,
    device: Device,
}

impl StubModel {
    pub fn new(labels_num: usize) -> Self {
        Self {
            labels_num,
            device: Device::Cpu,
        }
    }
}

impl PairClassificationModel for StubModel {
    type Options = usize;

    fn new(options: Self::Options, device: Device) -> Result<Self> {
        Ok(Self {
            labels_num: options,
            device,
        })
    }

    fn forward_batch(&self, batch: &[EncodedPair]) -> Result<Vec<Vec<f32>>> {
        Ok(batch
            .iter()
            .map(|pair| {
                let seed = pair.ids_a[1].wrapping_add(pair.ids_b[1]);
                (0..self.labels_num)
                    .map(|j| ((seed as usize + j) % self.labels_num) as f32)
                    .collect()
            })
            .collect())
    }

    fn get_tokenizer(_options: Self::Options) -> Result<tokenizers::Tokenizer> {
        Err(PipelineError::Unexpected(
            "StubModel has no tokenizer".to_string(),
        ))
    }

    fn device(&self) -> &Device {
        &self.device
    }
}

/// Stub classifier that replays a fixed score matrix, batch after batch.
pub struct FixedScoreModel {
    pub rows: Vec<Vec<f32>>,
    device: Device,
}

impl FixedScoreModel {
    pub fn new(rows: Vec<Vec<f32>>) -> Self {
        Self {
            rows,
            device: Device::Cpu,
        }
    }
}

impl PairClassificationModel for FixedScoreModel {
    type Options = ();

    fn new(_options: Self::Options, device: Device) -> Result<Self> {
        Ok(Self {
            rows: Vec::new(),
            device,
        })
    }

    fn forward_batch(&self, batch: &[EncodedPair]) -> Result<Vec<Vec<f32>>> {
        Ok((0..batch.len())
            .map(|i| self.rows[i % self.rows.len()].clone())
            .collect())
    }

    fn get_tokenizer(_options: Self::Options) -> Result<tokenizers::Tokenizer> {
        Err(PipelineError::Unexpected(
            "FixedScoreModel has no tokenizer".to_string(),
        ))
    }

    fn device(&self) -> &Device {
        &self.device
    }
}
