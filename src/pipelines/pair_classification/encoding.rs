use tokenizers::Tokenizer;

use crate::error::{PipelineError, Result};

/// Classification token prepended to every sequence.
pub const CLS_TOKEN: &str = "[CLS]";
/// Separator token appended after the text.
pub const SEP_TOKEN: &str = "[SEP]";
/// Padding token filling positions past the real content.
pub const PAD_TOKEN: &str = "[PAD]";
/// Fallback token for out-of-vocabulary input.
pub const UNK_TOKEN: &str = "[UNK]";

/// The tokenizer capability the encoder needs.
///
/// Any conforming implementation can be substituted - the crate ships an impl for
/// [`tokenizers::Tokenizer`], and tests use a deterministic whitespace stub.
pub trait PairTokenizer {
    /// Split raw text into token strings, without adding special tokens.
    fn tokenize(&self, text: &str) -> Result<Vec<String>>;

    /// Map token strings to vocabulary ids.
    fn convert_tokens_to_ids(&self, tokens: &[String]) -> Result<Vec<u32>>;

    /// Id of [`PAD_TOKEN`].
    fn pad_id(&self) -> Result<u32> {
        let ids = self.convert_tokens_to_ids(&[PAD_TOKEN.to_string()])?;
        ids.first().copied().ok_or_else(|| {
            PipelineError::Tokenization(format!("Tokenizer has no id for '{PAD_TOKEN}'"))
        })
    }
}

impl PairTokenizer for Tokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        let encoding = self.encode(text, false).map_err(|e| {
            PipelineError::Tokenization(format!(
                "Tokenization failed on '{}': {}",
                &text.chars().take(50).collect::<String>(),
                e
            ))
        })?;
        Ok(encoding.get_tokens().to_vec())
    }

    fn convert_tokens_to_ids(&self, tokens: &[String]) -> Result<Vec<u32>> {
        tokens
            .iter()
            .map(|token| {
                self.token_to_id(token)
                    .or_else(|| self.token_to_id(UNK_TOKEN))
                    .ok_or_else(|| {
                        PipelineError::Tokenization(format!(
                            "Token '{token}' not in vocabulary and no '{UNK_TOKEN}' fallback"
                        ))
                    })
            })
            .collect()
    }
}

/// Encode one text into fixed-length id and segment sequences.
///
/// The logical sequence is `[CLS] + tokens + [SEP]`; `seg` marks real positions
/// with 1 and padding with 0. Sequences at or above `seq_length` are truncated
/// to exactly `seq_length` (this can cut off the trailing `[SEP]`; that is
/// deliberate, silent policy, not an error), shorter ones are right-padded with
/// the pad id. Both returned sequences always have length `seq_length`.
pub fn encode<T: PairTokenizer + ?Sized>(
    tokenizer: &T,
    text: &str,
    seq_length: usize,
) -> Result<(Vec<u32>, Vec<u8>)> {
    let mut tokens = Vec::with_capacity(seq_length);
    tokens.push(CLS_TOKEN.to_string());
    tokens.extend(tokenizer.tokenize(text)?);
    tokens.push(SEP_TOKEN.to_string());

    let mut ids = tokenizer.convert_tokens_to_ids(&tokens)?;
    let mut seg = vec![1u8; ids.len()];

    if ids.len() >= seq_length {
        ids.truncate(seq_length);
        seg.truncate(seq_length);
    } else {
        let pad_id = tokenizer.pad_id()?;
        ids.resize(seq_length, pad_id);
        seg.resize(seq_length, 0);
    }

    Ok((ids, seg))
}
