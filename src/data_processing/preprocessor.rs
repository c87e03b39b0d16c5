// Предобработка: кодирование меток, разбиение на обучающую и тестовую части, построение словаря
// только по обучающим документам и приведение обеих частей к последовательностям фиксированной длины.

use super::labels::LabelEncoder;
use super::split::{take, train_test_split};
use super::tokenizer::{pad_sequences, PadSide, Tokenizer, WordIndexTokenizer};
use crate::error::DataError;
use burn::config::Config;

#[derive(Config, Debug)]
pub struct PreprocessorConfig {
    #[config(default = 1000)]
    pub max_words: usize,
    #[config(default = 100)]
    pub max_sequence_length: usize,
    #[config(default = 0.2)]
    pub test_size: f64,
    #[config(default = 42)]
    pub seed: u64,
    #[config(default = "PadSide::Pre")]
    pub padding: PadSide,
    #[config(default = "PadSide::Pre")]
    pub truncating: PadSide,
}

/// Всё, что нужно для обучения и оценки модели.
pub struct PreparedData {
    pub training_tokens: Vec<Vec<usize>>,
    pub testing_tokens: Vec<Vec<usize>>,
    pub training_labels: Vec<usize>,
    pub testing_labels: Vec<usize>,
    pub tokenizer: WordIndexTokenizer,
    pub label_encoder: LabelEncoder,
}

impl PreparedData {
    pub fn num_classes(&self) -> usize {
        self.label_encoder.num_classes()
    }
}

pub struct Preprocessor {
    config: PreprocessorConfig,
}

impl Preprocessor {
    pub fn new(config: PreprocessorConfig) -> Self {
        Self { config }
    }

    pub fn preprocess(&self, documents: &[String], labels: &[i64]) -> crate::error::Result<PreparedData> {
        if self.config.max_sequence_length == 0 {
            return Err(DataError::ZeroParameter("max_sequence_length"));
        }
        if documents.len() != labels.len() {
            return Err(DataError::LengthMismatch {
                documents: documents.len(),
                labels: labels.len(),
            });
        }

        let (label_encoder, encoded) = LabelEncoder::fit_transform(labels)?;
        tracing::info!(
            "Encoded {} labels into {} classes: {:?}",
            encoded.len(),
            label_encoder.num_classes(),
            label_encoder.classes()
        );

        let split = train_test_split(documents.len(), self.config.test_size, self.config.seed)?;
        let training_texts = take(documents, &split.train);
        let testing_texts = take(documents, &split.test);

        let tokenizer = WordIndexTokenizer::fit(&training_texts, self.config.max_words)?;
        let training_tokens = self.to_padded_sequences(&tokenizer, &training_texts)?;
        let testing_tokens = self.to_padded_sequences(&tokenizer, &testing_texts)?;

        Ok(PreparedData {
            training_tokens,
            testing_tokens,
            training_labels: take(&encoded, &split.train),
            testing_labels: take(&encoded, &split.test),
            tokenizer,
            label_encoder,
        })
    }

    /// Кодирует тексты уже обученным словарём и выравнивает их по длине.
    pub fn to_padded_sequences<S: AsRef<str>>(
        &self,
        tokenizer: &WordIndexTokenizer,
        texts: &[S],
    ) -> crate::error::Result<Vec<Vec<usize>>> {
        let sequences = tokenizer.encode_batch(texts)?;
        Ok(pad_sequences(
            &sequences,
            self.config.max_sequence_length,
            self.config.padding,
            self.config.truncating,
            tokenizer.pad_token(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> (Vec<String>, Vec<i64>) {
        let documents = (0..20)
            .map(|i| format!("review number{i} with shared words and some more shared words"))
            .collect();
        let labels = (0..20).map(|i| (i % 4) as i64 + 1).collect();
        (documents, labels)
    }

    fn preprocessor(max_sequence_length: usize) -> Preprocessor {
        Preprocessor::new(
            PreprocessorConfig::new()
                .with_max_words(50)
                .with_max_sequence_length(max_sequence_length),
        )
    }

    #[test]
    fn test_partitions_have_expected_sizes() {
        let (documents, labels) = corpus();
        let data = preprocessor(8).preprocess(&documents, &labels).unwrap();

        assert_eq!(data.training_tokens.len(), 16);
        assert_eq!(data.testing_tokens.len(), 4);
        assert_eq!(data.training_labels.len(), 16);
        assert_eq!(data.testing_labels.len(), 4);
        assert_eq!(data.num_classes(), 4);
    }

    #[test]
    fn test_every_sequence_has_fixed_length() {
        let (documents, labels) = corpus();
        for max_len in [1, 5, 40] {
            let data = preprocessor(max_len).preprocess(&documents, &labels).unwrap();
            assert!(data
                .training_tokens
                .iter()
                .chain(&data.testing_tokens)
                .all(|s| s.len() == max_len));
        }
    }

    #[test]
    fn test_vocabulary_comes_from_training_documents_only() {
        let (documents, labels) = corpus();
        let data = preprocessor(8).preprocess(&documents, &labels).unwrap();
        let split = train_test_split(documents.len(), 0.2, 42).unwrap();

        for &i in &split.test {
            assert_eq!(data.tokenizer.word_index(&format!("number{i}")), None);
        }
        for &i in &split.train {
            assert!(data.tokenizer.word_index(&format!("number{i}")).is_some());
        }
    }

    #[test]
    fn test_labels_follow_documents_into_partitions() {
        let (documents, labels) = corpus();
        let data = preprocessor(8).preprocess(&documents, &labels).unwrap();
        let split = train_test_split(documents.len(), 0.2, 42).unwrap();

        let decoded = data.label_encoder.inverse_transform(&data.testing_labels).unwrap();
        let expected: Vec<i64> = split.test.iter().map(|&i| labels[i]).collect();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_preprocess_is_reproducible() {
        let (documents, labels) = corpus();
        let first = preprocessor(8).preprocess(&documents, &labels).unwrap();
        let second = preprocessor(8).preprocess(&documents, &labels).unwrap();

        assert_eq!(first.training_tokens, second.training_tokens);
        assert_eq!(first.testing_labels, second.testing_labels);
    }

    #[test]
    fn test_rejects_misaligned_or_tiny_inputs() {
        let docs = vec!["a".to_string(), "b".to_string()];
        assert!(matches!(
            preprocessor(4).preprocess(&docs, &[1]),
            Err(DataError::LengthMismatch { .. })
        ));
        assert!(matches!(
            preprocessor(4).preprocess(&docs[..1], &[1]),
            Err(DataError::InvalidSplit { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_sequence_length() {
        let (documents, labels) = corpus();
        assert!(matches!(
            preprocessor(0).preprocess(&documents, &labels),
            Err(DataError::ZeroParameter("max_sequence_length"))
        ));
    }
}
