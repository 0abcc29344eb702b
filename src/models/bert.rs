use std::collections::HashMap;
use std::path::{Path, PathBuf};

use candle_core::{Device, IndexOp, Tensor};
use candle_nn::{linear, Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config, DTYPE};
use hf_hub::{api::sync::Api, Repo, RepoType};
use serde::Deserialize;
use tokenizers::Tokenizer;

use crate::error::{PipelineError, Result};
use crate::pipelines::pair_classification::{EncodedPair, PairClassificationModel};

/// Options for loading a [`SiameseBertModel`].
#[derive(Debug, Clone)]
pub struct SiameseBertOptions {
    /// HuggingFace repo id, or a local directory with `config.json`, weights,
    /// and `tokenizer.json`.
    pub model: String,
    /// Width of the classifier head.
    pub labels_num: usize,
}

/// Two-tower BERT classifier for text pairs.
///
/// Both towers share one encoder. Each tower's first-token hidden state is the
/// pooled feature; the two features are concatenated and projected by a linear
/// head to `labels_num` scores. Segment masks gate attention; token type ids
/// are zeros.
pub struct SiameseBertModel {
    encoder: BertModel,
    classifier: Linear,
    device: Device,
}

impl SiameseBertModel {
    /// Load encoder and classifier head weights onto `device`.
    pub fn new(options: SiameseBertOptions, device: Device) -> Result<Self> {
        let files = locate_files(&options.model)?;

        let config_str = std::fs::read_to_string(&files.config)?;
        let config: Config = serde_json::from_str(&config_str)?;
        let class_cfg: ClassifierConfigJson = serde_json::from_str(&config_str)?;

        if !class_cfg.id2label.is_empty() && class_cfg.id2label.len() != options.labels_num {
            return Err(PipelineError::Config(format!(
                "Checkpoint declares {} labels but labels_num is {}",
                class_cfg.id2label.len(),
                options.labels_num
            )));
        }

        let vb = if files.weights.extension().is_some_and(|e| e == "safetensors") {
            unsafe { VarBuilder::from_mmaped_safetensors(&[files.weights], DTYPE, &device)? }
        } else {
            VarBuilder::from_pth(&files.weights, DTYPE, &device)?
        };

        let classifier = linear(
            2 * config.hidden_size,
            options.labels_num,
            vb.pp("classifier"),
        )?;
        let encoder = BertModel::load(vb, &config)?;

        Ok(Self {
            encoder,
            classifier,
            device,
        })
    }

    /// Load the tokenizer shipped with the checkpoint.
    pub fn get_tokenizer(options: SiameseBertOptions) -> Result<Tokenizer> {
        let files = locate_files(&options.model)?;
        let path_str = files.tokenizer.display().to_string();
        Tokenizer::from_file(&files.tokenizer).map_err(|e| {
            PipelineError::Tokenization(format!(
                "Failed to load tokenizer from '{}': {}",
                path_str, e
            ))
        })
    }

    /// Returns the device the model runs on.
    pub fn device(&self) -> &Device {
        &self.device
    }

    fn encode_tower(&self, ids: &Tensor, mask: &Tensor) -> Result<Tensor> {
        let token_type_ids = ids.zeros_like()?;
        let hidden = self.encoder.forward(ids, &token_type_ids, Some(mask))?;
        // First-token pooling
        Ok(hidden.i((.., 0, ..))?)
    }
}

impl PairClassificationModel for SiameseBertModel {
    type Options = SiameseBertOptions;

    fn new(options: Self::Options, device: Device) -> Result<Self> {
        SiameseBertModel::new(options, device)
    }

    fn forward_batch(&self, batch: &[EncodedPair]) -> Result<Vec<Vec<f32>>> {
        if batch.is_empty() {
            return Ok(vec![]);
        }

        let (ids_a, mask_a) = stack_tower(batch, |p| (&p.ids_a, &p.seg_a), &self.device)?;
        let (ids_b, mask_b) = stack_tower(batch, |p| (&p.ids_b, &p.seg_b), &self.device)?;

        let pooled_a = self.encode_tower(&ids_a, &mask_a)?;
        let pooled_b = self.encode_tower(&ids_b, &mask_b)?;

        let features = Tensor::cat(&[&pooled_a, &pooled_b], 1)?;
        let logits = self.classifier.forward(&features)?;
        Ok(logits.to_vec2::<f32>()?)
    }

    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer> {
        Self::get_tokenizer(options)
    }

    fn device(&self) -> &Device {
        &self.device
    }
}

/// Stack one tower's id and segment sequences into `[batch, seq_len]` tensors.
fn stack_tower<F>(batch: &[EncodedPair], select: F, device: &Device) -> Result<(Tensor, Tensor)>
where
    F: Fn(&EncodedPair) -> (&Vec<u32>, &Vec<u8>),
{
    let seq_len = select(&batch[0]).0.len();

    let mut flat_ids: Vec<u32> = Vec::with_capacity(batch.len() * seq_len);
    let mut flat_mask: Vec<u32> = Vec::with_capacity(batch.len() * seq_len);
    for pair in batch {
        let (ids, seg) = select(pair);
        flat_ids.extend_from_slice(ids);
        flat_mask.extend(seg.iter().map(|&s| u32::from(s)));
    }

    let ids = Tensor::from_vec(flat_ids, (batch.len(), seq_len), device)?;
    let mask = Tensor::from_vec(flat_mask, (batch.len(), seq_len), device)?;
    Ok((ids, mask))
}

struct ModelFiles {
    config: PathBuf,
    weights: PathBuf,
    tokenizer: PathBuf,
}

fn locate_files(model: &str) -> Result<ModelFiles> {
    let dir = Path::new(model);
    if dir.is_dir() {
        let weights = ["model.safetensors", "pytorch_model.bin"]
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
            .ok_or_else(|| {
                PipelineError::Unexpected(format!(
                    "No model.safetensors or pytorch_model.bin in '{}'",
                    dir.display()
                ))
            })?;
        return Ok(ModelFiles {
            config: dir.join("config.json"),
            weights,
            tokenizer: dir.join("tokenizer.json"),
        });
    }

    let api = Api::new()?;
    let repo = api.repo(Repo::new(model.to_string(), RepoType::Model));
    Ok(ModelFiles {
        config: repo.get("config.json")?,
        weights: repo
            .get("model.safetensors")
            .or_else(|_| repo.get("pytorch_model.bin"))?,
        tokenizer: repo.get("tokenizer.json")?,
    })
}

#[derive(Deserialize)]
struct ClassifierConfigJson {
    #[serde(default)]
    id2label: HashMap<String, String>,
}
