// This module defines the inference process for the review classifier.
// It loads the experiment configuration, the model weights, the fitted word index and the label
// classes from an artifact directory, pads the input texts the same way as during training and
// predicts a score bucket for each of them.

use crate::{
    data_processing::{
        LabelEncoder, Preprocessor, TextClassificationBatcher, TextClassificationInferenceBatch,
        Tokenizer, WordIndexTokenizer,
    },
    error::{DataError, Result},
    model::TextClassificationModel,
    training::{ExperimentConfig, CONFIG_FILE, LABELS_FILE, MODEL_FILE, TOKENIZER_FILE},
};
use burn::{
    config::Config,
    data::dataloader::batcher::Batcher,
    record::{CompactRecorder, Recorder},
    tensor::backend::Backend,
};
use std::path::Path;

/// Предсказание для одного текста.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    pub text: String,
    pub class: usize,         // Индекс класса
    pub score: i64,           // Округлённая оценка, соответствующая классу
    pub probabilities: Vec<f32>,
}

/// Всё, что нужно для предсказаний, загруженное из каталога артефактов.
pub struct Classifier<B: Backend> {
    config: ExperimentConfig,
    tokenizer: WordIndexTokenizer,
    label_encoder: LabelEncoder,
    model: TextClassificationModel<B>,
    device: B::Device,
}

impl<B: Backend> Classifier<B> {
    pub fn load(device: B::Device, artifact_dir: &str) -> Result<Self> {
        let dir = Path::new(artifact_dir);

        // Load experiment configuration
        let config = ExperimentConfig::load(dir.join(CONFIG_FILE))
            .map_err(|e| DataError::Artifact(format!("cannot load config: {e:?}")))?;
        let tokenizer = WordIndexTokenizer::load(dir.join(TOKENIZER_FILE))?;
        let label_encoder = LabelEncoder::load(dir.join(LABELS_FILE))?;

        // Load pre-trained model weights
        tracing::info!("Loading weights from '{}'", dir.display());
        let record = CompactRecorder::new()
            .load(dir.join(MODEL_FILE), &device)
            .map_err(|e| DataError::Artifact(format!("cannot load model: {e:?}")))?;

        let model = config
            .model_config(label_encoder.num_classes(), tokenizer.vocab_size())
            .init_with::<B>(record, &device);

        Ok(Self {
            config,
            tokenizer,
            label_encoder,
            model,
            device,
        })
    }

    pub fn predict(&self, samples: &[String]) -> Result<Vec<Prediction>> {
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let preprocessor = Preprocessor::new(self.config.preprocessor.clone());
        let sequences = preprocessor.to_padded_sequences(&self.tokenizer, samples)?;

        let batcher = TextClassificationBatcher::<B>::new(self.device.clone());
        let item: TextClassificationInferenceBatch<B> = batcher.batch(sequences);
        let predictions = self.model.inference(item);

        samples
            .iter()
            .enumerate()
            .map(|(i, text)| -> Result<Prediction> {
                let prediction = predictions.clone().slice([i..i + 1]);
                let probabilities = prediction.clone().into_data().convert::<f32>().value;
                let class = prediction.argmax(1).into_data().convert::<i64>().value[0] as usize;

                Ok(Prediction {
                    text: text.clone(),
                    class,
                    score: self.label_encoder.decode(class)?,
                    probabilities,
                })
            })
            .collect()
    }
}

// Define inference function
pub fn infer<B: Backend>(
    device: B::Device,    // Device on which to perform computation
    artifact_dir: &str,   // Directory containing model, config, tokenizer and labels
    samples: Vec<String>, // Text samples for inference
) -> Result<Vec<Prediction>> {
    let classifier = Classifier::<B>::load(device, artifact_dir)?;

    tracing::info!("Running inference on {} samples", samples.len());
    let predictions = classifier.predict(&samples)?;

    // Print out predictions for each sample
    for (i, prediction) in predictions.iter().enumerate() {
        println!(
            "\n=== Item {i} ===\n- Text: {}\n- Probabilities: {:?}\n- Prediction: score {}\n================",
            prediction.text, prediction.probabilities, prediction.score
        );
    }

    Ok(predictions)
}
