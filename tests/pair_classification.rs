use std::io::Write;

use candle_core::Device;
use siamese_pipelines::error::{PipelineError, Result};
use siamese_pipelines::pair_classification::{
    EncodedPair, InferenceOptions, PairClassificationModel, PairClassificationPipeline,
    PairTokenizer, CLS_TOKEN, PAD_TOKEN, SEP_TOKEN, UNK_TOKEN,
};

const TOLERANCE: f32 = 1e-6;

/// Whitespace tokenizer with byte-derived ids: deterministic, no model files.
struct WhitespaceTokenizer;

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

/// Scores derive from the first real token of each text, so every example gets
/// a repeatable prediction.
struct ByteSumClassifier {
    labels_num: usize,
    device: Device,
}

impl ByteSumClassifier {
    fn new(labels_num: usize) -> Self {
        Self {
            labels_num,
            device: Device::Cpu,
        }
    }
}

impl PairClassificationModel for ByteSumClassifier {
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
                let seed = pair.ids_a[1].wrapping_mul(31).wrapping_add(pair.ids_b[1]);
                (0..self.labels_num)
                    .map(|j| ((seed as usize).wrapping_add(j * 17) % 13) as f32)
                    .collect()
            })
            .collect())
    }

    fn get_tokenizer(_options: Self::Options) -> Result<tokenizers::Tokenizer> {
        Err(PipelineError::Unexpected("no tokenizer".to_string()))
    }

    fn device(&self) -> &Device {
        &self.device
    }
}

fn pipeline(options: InferenceOptions) -> PairClassificationPipeline<ByteSumClassifier, WhitespaceTokenizer> {
    PairClassificationPipeline::from_parts(
        ByteSumClassifier::new(options.labels_num),
        WhitespaceTokenizer,
        options,
    )
    .unwrap()
}

fn write_tsv(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn two_row_file_produces_two_predictions_in_order() -> Result<()> {
    let input = write_tsv("text_a\ttext_b\nhello world\thi there\nfoo\tbar\n");
    let output = tempfile::NamedTempFile::new().unwrap();

    let pipeline = pipeline(InferenceOptions {
        seq_length: 8,
        batch_size: 1,
        labels_num: 2,
        output_logits: false,
        output_prob: true,
    });
    let stats = pipeline.predict_file(input.path(), output.path())?;
    assert_eq!(stats.items_processed, 2);
    assert_eq!(stats.batches_processed, 2);

    let text = std::fs::read_to_string(output.path()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "label\tprob");

    for line in &lines[1..] {
        let fields: Vec<&str> = line.split('\t').collect();
        let label: usize = fields[0].parse().unwrap();
        assert!(label < 2);

        let probs: Vec<f32> = fields[1].split(' ').map(|v| v.parse().unwrap()).collect();
        assert_eq!(probs.len(), 2);
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < TOLERANCE);
    }
    Ok(())
}

#[test]
fn reruns_are_deterministic() -> Result<()> {
    let input = write_tsv("text_a\ttext_b\nhello world\thi there\nfoo\tbar\n");

    let pipeline = pipeline(InferenceOptions {
        seq_length: 8,
        batch_size: 2,
        labels_num: 2,
        output_logits: true,
        output_prob: true,
    });
    let dataset = pipeline.load_dataset(input.path())?;

    let mut first = Vec::new();
    let mut second = Vec::new();
    pipeline.run(&dataset, &mut first)?;
    pipeline.run(&dataset, &mut second)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn batch_size_does_not_change_results() -> Result<()> {
    let mut content = String::from("text_a\ttext_b\n");
    for i in 0..10 {
        content.push_str(&format!("left text {i}\tright text {i}\n"));
    }
    let input = write_tsv(&content);

    let mut outputs = Vec::new();
    for batch_size in [1, 4, 10, 32] {
        let pipeline = pipeline(InferenceOptions {
            seq_length: 16,
            batch_size,
            labels_num: 3,
            output_logits: true,
            output_prob: false,
        });
        let dataset = pipeline.load_dataset(input.path())?;
        assert_eq!(dataset.len(), 10);

        let mut out = Vec::new();
        pipeline.run(&dataset, &mut out)?;
        outputs.push(String::from_utf8(out).unwrap());
    }

    assert!(outputs.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(outputs[0].lines().count(), 11);
    Ok(())
}

#[test]
fn header_only_input_yields_header_only_output() -> Result<()> {
    let input = write_tsv("text_a\ttext_b\n");

    let pipeline = pipeline(InferenceOptions::default());
    let dataset = pipeline.load_dataset(input.path())?;
    assert!(dataset.is_empty());

    let mut out = Vec::new();
    let stats = pipeline.run(&dataset, &mut out)?;
    assert_eq!(String::from_utf8(out).unwrap(), "label\n");
    assert_eq!(stats.batches_processed, 0);
    Ok(())
}

#[test]
fn missing_column_surfaces_through_load_dataset() {
    let input = write_tsv("text_a\tother\nhello\tx\n");
    let pipeline = pipeline(InferenceOptions::default());
    let err = pipeline.load_dataset(input.path()).err().unwrap();
    assert!(matches!(err, PipelineError::InputFormat(_)));
}
