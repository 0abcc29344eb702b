use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{PipelineError, Result};

use super::encoding::{encode, PairTokenizer};

/// One input row encoded to fixed-length id/segment sequences for both texts.
///
/// All four sequences have the same length (the configured `seq_length`);
/// `seg_a`/`seg_b` mark real positions with 1 and padding with 0.
#[derive(Debug, Clone)]
pub struct EncodedPair {
    /// Token ids for `text_a`, including `[CLS]`/`[SEP]`, padded or truncated.
    pub ids_a: Vec<u32>,
    /// Token ids for `text_b`.
    pub ids_b: Vec<u32>,
    /// Segment mask for `text_a`.
    pub seg_a: Vec<u8>,
    /// Segment mask for `text_b`.
    pub seg_b: Vec<u8>,
}

/// An ordered, in-memory table of encoded pairs.
///
/// Order is load-bearing: the Nth prediction in the output corresponds to the
/// Nth pair here, which corresponds to the Nth data row of the input file.
#[derive(Debug, Default)]
pub struct PairDataset {
    pairs: Vec<EncodedPair>,
}

impl PairDataset {
    /// Build a dataset from already-encoded pairs, preserving their order.
    pub fn from_pairs(pairs: Vec<EncodedPair>) -> Self {
        Self { pairs }
    }

    /// Read a tab-separated file and encode every row.
    ///
    /// The first line is a header naming columns; `text_a` and `text_b` are
    /// resolved by name, so column order is irrelevant and extra columns are
    /// ignored. A header missing a required column, or a data row too short to
    /// contain one, aborts the whole read - rows are never skipped.
    pub fn from_tsv<T: PairTokenizer + ?Sized>(
        path: impl AsRef<Path>,
        tokenizer: &T,
        seq_length: usize,
    ) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let mut lines = reader.lines();

        let header = lines.next().transpose()?.unwrap_or_default();
        let mut columns: HashMap<&str, usize> = HashMap::new();
        for (i, name) in header.trim_end_matches(['\r', '\n']).split('\t').enumerate() {
            columns.insert(name, i);
        }
        let required = |name: &str| -> Result<usize> {
            columns.get(name).copied().ok_or_else(|| {
                PipelineError::InputFormat(format!(
                    "{}: header is missing required column '{name}'",
                    path.display()
                ))
            })
        };
        let col_a = required("text_a")?;
        let col_b = required("text_b")?;

        let mut pairs = Vec::new();
        for (i, line) in lines.enumerate() {
            let line_id = i + 2; // 1-based, after the header
            let line = line?;
            let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();

            let field = |name: &str, idx: usize| {
                fields.get(idx).copied().ok_or_else(|| {
                    PipelineError::InputFormat(format!(
                        "{}: row {line_id} has {} fields, column '{name}' is at index {idx}",
                        path.display(),
                        fields.len()
                    ))
                })
            };

            let (ids_a, seg_a) = encode(tokenizer, field("text_a", col_a)?, seq_length)?;
            let (ids_b, seg_b) = encode(tokenizer, field("text_b", col_b)?, seq_length)?;
            pairs.push(EncodedPair {
                ids_a,
                ids_b,
                seg_a,
                seg_b,
            });
        }

        tracing::info!(instances = pairs.len(), path = %path.display(), "dataset loaded");
        Ok(Self { pairs })
    }

    /// Number of examples.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the dataset holds no examples.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over contiguous batches of at most `batch_size` examples, in order.
    ///
    /// Yields `floor(N / batch_size)` full batches, then one short batch of
    /// `N % batch_size` examples iff that remainder is nonzero. Never yields an
    /// empty batch. `batch_size` is validated once up front by
    /// [`InferenceOptions::validate`](super::InferenceOptions::validate), not here.
    pub fn batches(&self, batch_size: usize) -> impl Iterator<Item = &[EncodedPair]> {
        self.pairs.chunks(batch_size)
    }
}
