// Данный модуль обучает модель классификации отзывов на подготовленных обучающей и тестовой частях
// с использованием предоставленной конфигурации. Сначала инициализируются батчеры и загрузчики данных,
// затем модель, размер словаря которой берётся из обученного токенизатора, а число классов из
// кодировщика меток. Обучение выполняет Learner фреймворка Burn. Обученная модель, конфигурация,
// словарь и метки затем сохраняются в указанный каталог, чтобы ими мог воспользоваться инференс.

use crate::{
    data_processing::{
        PreparedData, PreprocessorConfig, ReviewDataset, TextClassificationBatcher,
        TextClassificationTrainingBatch, Tokenizer,
    },
    error::DataError,
    model::{TextClassificationModel, TextClassificationModelConfig},
};
use burn::data::dataloader::{DataLoader, DataLoaderBuilder};
use burn::tensor::backend::Backend;
use burn::tensor::ElementConversion;
use burn::{
    config::Config,
    module::Module,
    optim::AdamConfig,
    record::{CompactRecorder, Recorder},
    tensor::backend::AutodiffBackend,
    train::{
        metric::{AccuracyMetric, LossMetric},
        LearnerBuilder,
    },
};
use std::path::Path;
use std::sync::Arc;

pub const CONFIG_FILE: &str = "config.json";
pub const MODEL_FILE: &str = "model";
pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const LABELS_FILE: &str = "labels.json";

#[derive(Config)]
pub struct ExperimentConfig {
    pub preprocessor: PreprocessorConfig,
    pub optimizer: AdamConfig,
    #[config(default = 128)]
    pub d_embedding: usize,
    #[config(default = 64)]
    pub d_hidden: usize,
    #[config(default = 0.2)]
    pub dropout: f64,
    #[config(default = 32)]
    pub batch_size: usize,
    #[config(default = 5)]
    pub num_epochs: usize,
    #[config(default = 1e-3)]
    pub learning_rate: f64,
    #[config(default = 42)]
    pub seed: u64,
}

impl ExperimentConfig {
    pub fn model_config(&self, n_classes: usize, vocab_size: usize) -> TextClassificationModelConfig {
        TextClassificationModelConfig::new(n_classes, vocab_size)
            .with_d_embedding(self.d_embedding)
            .with_d_hidden(self.d_hidden)
            .with_dropout(self.dropout)
    }

    /// Проверяет размеры, при нулевом значении которых обучение невозможно.
    pub fn validate(&self) -> crate::error::Result<()> {
        let sizes = [
            ("batch_size", self.batch_size),
            ("num_epochs", self.num_epochs),
            ("max_sequence_length", self.preprocessor.max_sequence_length),
        ];
        match sizes.into_iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(DataError::ZeroParameter(name)),
            None => Ok(()),
        }
    }
}

// Define train function
pub fn train<B: AutodiffBackend>(
    device: B::Device,         // Device on which to perform computation
    data: &PreparedData,       // Tokenized partitions, tokenizer and label encoder
    config: &ExperimentConfig, // Experiment configuration
    artifact_dir: &str,        // Directory to save model and config files
) -> crate::error::Result<TextClassificationModel<B>> {
    config.validate()?;
    std::fs::create_dir_all(artifact_dir)?;
    let n_classes = data.num_classes();

    // Initialize batchers for training and testing data
    let batcher_train = TextClassificationBatcher::<B>::new(device.clone());
    let batcher_test = TextClassificationBatcher::<B::InnerBackend>::new(device.clone());

    // Initialize model
    let model = config
        .model_config(n_classes, data.tokenizer.vocab_size())
        .init::<B>(&device);

    tracing::info!(
        "Training on {} documents, validating on {} ({} classes, vocab_size={})",
        data.training_tokens.len(),
        data.testing_tokens.len(),
        n_classes,
        data.tokenizer.vocab_size()
    );

    // Initialize data loaders for training and testing data
    let dataloader_train = DataLoaderBuilder::new(batcher_train)
        .batch_size(config.batch_size)
        .shuffle(config.seed)
        .num_workers(1)
        .build(ReviewDataset::new(&data.training_tokens, &data.training_labels));

    let dataloader_test = DataLoaderBuilder::new(batcher_test)
        .batch_size(config.batch_size)
        .num_workers(1)
        .build(ReviewDataset::new(&data.testing_tokens, &data.testing_labels));

    // Initialize learner
    let learner = LearnerBuilder::new(artifact_dir)
        .metric_train_numeric(AccuracyMetric::new())
        .metric_valid_numeric(AccuracyMetric::new())
        .metric_train_numeric(LossMetric::new())
        .metric_valid_numeric(LossMetric::new())
        .with_file_checkpointer(CompactRecorder::new())
        .devices(vec![device])
        .num_epochs(config.num_epochs)
        .build(model, config.optimizer.init(), config.learning_rate);

    // Train the model
    let model_trained = learner.fit(dataloader_train, dataloader_test);

    save_artifacts(&model_trained, data, config, artifact_dir)?;
    tracing::info!("Artifacts saved to '{}'", artifact_dir);

    Ok(model_trained)
}

/// Сохраняет конфигурацию, веса модели, словарь и метки.
pub fn save_artifacts<B: Backend>(
    model: &TextClassificationModel<B>,
    data: &PreparedData,
    config: &ExperimentConfig,
    artifact_dir: &str,
) -> crate::error::Result<()> {
    let dir = Path::new(artifact_dir);
    std::fs::create_dir_all(dir)?;

    config.save(dir.join(CONFIG_FILE))?;
    data.tokenizer.save(dir.join(TOKENIZER_FILE))?;
    data.label_encoder.save(dir.join(LABELS_FILE))?;
    CompactRecorder::new()
        .record(model.clone().into_record(), dir.join(MODEL_FILE))
        .map_err(|e| DataError::Artifact(format!("cannot save model: {e:?}")))?;

    Ok(())
}

/// Доля верных предсказаний (argmax) на наборе последовательностей.
pub fn accuracy<B: Backend>(
    model: &TextClassificationModel<B>,
    device: &B::Device,
    sequences: &[Vec<usize>],
    labels: &[usize],
    batch_size: usize,
) -> f64 {
    if sequences.is_empty() {
        return 0.0;
    }

    let dataloader: Arc<dyn DataLoader<TextClassificationTrainingBatch<B>>> =
        DataLoaderBuilder::new(TextClassificationBatcher::<B>::new(device.clone()))
            .batch_size(batch_size)
            .build(ReviewDataset::new(sequences, labels));

    let mut correct = 0usize;
    let mut total = 0usize;

    for batch in dataloader.iter() {
        let [rows, _] = batch.tokens.dims();
        let predictions = model.predict(batch.tokens);
        let targets = batch.labels.to_device(&predictions.device());

        let hits: i64 = predictions
            .equal(targets)
            .int()
            .sum()
            .into_scalar()
            .elem::<i64>();

        correct += hits as usize;
        total += rows;
    }

    tracing::debug!("Accuracy: {}/{} correct", correct, total);
    correct as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_processing::{Preprocessor, PreprocessorConfig, TextClassificationInferenceBatch};
    use burn::backend::NdArray;
    use burn::data::dataloader::batcher::Batcher;

    type TestBackend = NdArray<f32>;

    fn prepared() -> PreparedData {
        let documents: Vec<String> = (0..10)
            .map(|i| format!("great product {i} works fine"))
            .collect();
        let labels: Vec<i64> = (0..10).map(|i| if i % 2 == 0 { 5 } else { 2 }).collect();

        Preprocessor::new(PreprocessorConfig::new().with_max_sequence_length(6))
            .preprocess(&documents, &labels)
            .unwrap()
    }

    fn config() -> ExperimentConfig {
        ExperimentConfig::new(PreprocessorConfig::new().with_max_sequence_length(6), AdamConfig::new())
            .with_d_embedding(8)
            .with_d_hidden(4)
    }

    #[test]
    fn test_accuracy_of_single_class_model() {
        let device = Default::default();
        let data = prepared();
        // Единственный выход: argmax всегда равен 0
        let model = config()
            .model_config(1, data.tokenizer.vocab_size())
            .init::<TestBackend>(&device);
        let sequences = &data.training_tokens;

        let all_zero = vec![0; sequences.len()];
        assert_eq!(accuracy(&model, &device, sequences, &all_zero, 3), 1.0);

        let mut half = all_zero.clone();
        for label in half.iter_mut().step_by(2) {
            *label = 1;
        }
        let expected = (sequences.len() / 2) as f64 / sequences.len() as f64;
        assert_eq!(accuracy(&model, &device, sequences, &half, 3), expected);
    }

    #[test]
    fn test_accuracy_counts_matching_predictions() {
        let device = Default::default();
        let data = prepared();
        let model = config()
            .model_config(data.num_classes(), data.tokenizer.vocab_size())
            .init::<TestBackend>(&device);
        let sequences = &data.training_tokens;

        let batcher = TextClassificationBatcher::<TestBackend>::new(device.clone());
        let batch: TextClassificationInferenceBatch<TestBackend> = batcher.batch(sequences.clone());
        let predicted: Vec<usize> = model
            .predict(batch.tokens)
            .into_data()
            .value
            .into_iter()
            .map(|class| class as usize)
            .collect();

        // Метки совпадают с предсказаниями, затем все заведомо неверны
        assert_eq!(accuracy(&model, &device, sequences, &predicted, 3), 1.0);
        let wrong: Vec<usize> = predicted.iter().map(|&class| 1 - class).collect();
        assert_eq!(accuracy(&model, &device, sequences, &wrong, 4), 0.0);
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        assert!(config().validate().is_ok());
        assert!(matches!(
            config().with_batch_size(0).validate(),
            Err(DataError::ZeroParameter("batch_size"))
        ));
        assert!(matches!(
            config().with_num_epochs(0).validate(),
            Err(DataError::ZeroParameter("num_epochs"))
        ));
    }

    #[test]
    fn test_accuracy_of_empty_set_is_zero() {
        let device = Default::default();
        let model = TextClassificationModelConfig::new(2, 4)
            .with_d_embedding(4)
            .with_d_hidden(4)
            .init::<TestBackend>(&device);

        assert_eq!(accuracy(&model, &device, &[], &[], 8), 0.0);
    }

    #[test]
    fn test_save_artifacts_writes_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let artifact_dir = dir.path().to_str().unwrap();
        let device = Default::default();
        let data = prepared();
        let config = config();
        let model = config
            .model_config(data.num_classes(), data.tokenizer.vocab_size())
            .init::<TestBackend>(&device);

        save_artifacts(&model, &data, &config, artifact_dir).unwrap();

        for file in [CONFIG_FILE, TOKENIZER_FILE, LABELS_FILE] {
            assert!(dir.path().join(file).exists(), "{file} missing");
        }
        let loaded = ExperimentConfig::load(dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(loaded.d_hidden, 4);
        assert_eq!(loaded.preprocessor.max_sequence_length, 6);
    }
}
