// Это базовая модель классификации отзывов, реализованная на Rust с использованием фреймворка Burn:
// эмбеддинги слов, LSTM и линейный слой поверх последнего скрытого состояния.

use crate::data_processing::{TextClassificationInferenceBatch, TextClassificationTrainingBatch};
use burn::{
    config::Config,
    module::Module,
    nn::{
        loss::CrossEntropyLossConfig,
        lstm::{Lstm, LstmConfig},
        Dropout, DropoutConfig, Embedding, EmbeddingConfig, Linear, LinearConfig,
    },
    tensor::backend::{AutodiffBackend, Backend},
    tensor::{activation::softmax, Int, Tensor},
    train::{ClassificationOutput, TrainOutput, TrainStep, ValidStep},
};

// Структура модели
#[derive(Module, Debug)]
pub struct TextClassificationModel<B: Backend> {
    embedding_token: Embedding<B>,
    lstm: Lstm<B>,
    dropout: Dropout,
    output: Linear<B>,
    d_hidden: usize,
}

// Конфигурация модели
#[derive(Config, Debug)]
pub struct TextClassificationModelConfig {
    n_classes: usize,
    vocab_size: usize,
    #[config(default = 128)]
    d_embedding: usize,
    #[config(default = 64)]
    d_hidden: usize,
    #[config(default = 0.2)]
    dropout: f64,
}

impl TextClassificationModelConfig {
    /// Инициализация модели с пустыми весами
    pub fn init<B: Backend>(&self, device: &B::Device) -> TextClassificationModel<B> {
        TextClassificationModel {
            embedding_token: EmbeddingConfig::new(self.vocab_size, self.d_embedding).init(device),
            lstm: LstmConfig::new(self.d_embedding, self.d_hidden, true).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
            output: LinearConfig::new(self.d_hidden, self.n_classes).init(device),
            d_hidden: self.d_hidden,
        }
    }

    /// Инициализация модели с загруженными весами
    pub fn init_with<B: Backend>(
        &self,
        record: TextClassificationModelRecord<B>,
        device: &B::Device,
    ) -> TextClassificationModel<B> {
        self.init(device).load_record(record)
    }
}

/// Поведение модели
impl<B: Backend> TextClassificationModel<B> {
    // Логиты классов по последнему шагу LSTM: [batch, n_classes]
    fn logits(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let [batch_size, seq_length] = tokens.dims();
        let device = &self.embedding_token.devices()[0];
        let tokens = tokens.to_device(device);

        let embedding = self.embedding_token.forward(tokens);
        let (_, hidden) = self.lstm.forward(embedding, None);

        // Последовательности дополнены спереди, поэтому последний шаг видит весь текст
        let last = hidden
            .slice([0..batch_size, seq_length - 1..seq_length])
            .reshape([batch_size, self.d_hidden]);

        self.output.forward(self.dropout.forward(last))
    }

    // Forward pass для обучения
    pub fn forward(&self, item: TextClassificationTrainingBatch<B>) -> ClassificationOutput<B> {
        let output = self.logits(item.tokens);
        let labels = item.labels.to_device(&output.device());

        let loss = CrossEntropyLossConfig::new()
            .init(&output.device())
            .forward(output.clone(), labels.clone());

        // Возвращаем loss и выход
        ClassificationOutput {
            loss,
            output,
            targets: labels,
        }
    }

    /// Forward pass для инференса: вероятности классов
    pub fn inference(&self, item: TextClassificationInferenceBatch<B>) -> Tensor<B, 2> {
        softmax(self.logits(item.tokens), 1)
    }

    /// Номера предсказанных классов: [batch]
    pub fn predict(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 1, Int> {
        let [batch_size, _] = tokens.dims();
        self.logits(tokens).argmax(1).reshape([batch_size])
    }
}

/// Определение шага обучения
impl<B: AutodiffBackend> TrainStep<TextClassificationTrainingBatch<B>, ClassificationOutput<B>>
    for TextClassificationModel<B>
{
    fn step(&self, item: TextClassificationTrainingBatch<B>) -> TrainOutput<ClassificationOutput<B>> {
        // Выполняем прямой проход, вычисляем градиенты и возвращаем их вместе с выходом
        let item = self.forward(item);
        let grads = item.loss.backward();

        TrainOutput::new(self, grads, item)
    }
}

/// Определение шага валидации
impl<B: Backend> ValidStep<TextClassificationTrainingBatch<B>, ClassificationOutput<B>>
    for TextClassificationModel<B>
{
    fn step(&self, item: TextClassificationTrainingBatch<B>) -> ClassificationOutput<B> {
        self.forward(item)
    }
}
