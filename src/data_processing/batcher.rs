// Модуль определяет структуры TextClassificationTrainingBatch и TextClassificationInferenceBatch для
// обработки пакетов данных во время обучения и вывода соответственно. TextClassificationBatcher
// собирает из уже выровненных последовательностей индексов двумерный тензор токенов, а для
// обучения ещё и одномерный тензор меток. Он параметризован типом B: Backend для поддержки
// различных вычислительных бэкэндов (например, NdArray, Wgpu).

use super::dataset::TextClassificationItem;
use burn::{
    data::dataloader::batcher::Batcher,
    tensor::{backend::Backend, Data, ElementConversion, Int, Shape, Tensor},
};
use derive_new::new;

/// Структура для упаковки элементов классификации текста
#[derive(new, Clone)]
pub struct TextClassificationBatcher<B: Backend> {
    device: B::Device, // Вычислительное устройство для создания тензоров
}

/// Структура для обучающего пакета в задаче классификации текста
#[derive(Debug, Clone, new)]
pub struct TextClassificationTrainingBatch<B: Backend> {
    pub tokens: Tensor<B, 2, Int>, // Токенизированный текст [batch, seq]
    pub labels: Tensor<B, 1, Int>, // Метки классов [batch]
}

/// Структура для инференса в задаче классификации текста
#[derive(Debug, Clone, new)]
pub struct TextClassificationInferenceBatch<B: Backend> {
    pub tokens: Tensor<B, 2, Int>, // Tokenized text
}

impl<B: Backend> TextClassificationBatcher<B> {
    fn tokens_tensor(&self, sequences: Vec<&[usize]>) -> Tensor<B, 2, Int> {
        let batch_size = sequences.len();
        let seq_length = sequences.first().map_or(0, |s| s.len());

        let values: Vec<B::IntElem> = sequences
            .iter()
            .flat_map(|s| s.iter().map(|t| (*t as i64).elem()))
            .collect();

        Tensor::from_data(
            Data::new(values, Shape::new([batch_size, seq_length])),
            &self.device,
        )
    }
}

/// Реализация Batcher для TextClassificationBatcher для обучения
impl<B: Backend> Batcher<TextClassificationItem, TextClassificationTrainingBatch<B>>
    for TextClassificationBatcher<B>
{
    /// Создает пакет обучения из вектора элементов
    fn batch(&self, items: Vec<TextClassificationItem>) -> TextClassificationTrainingBatch<B> {
        let labels: Vec<B::IntElem> = items
            .iter()
            .map(|item| (item.label as i64).elem())
            .collect();
        let batch_size = labels.len();

        let tokens = self.tokens_tensor(items.iter().map(|item| item.tokens.as_slice()).collect());
        let labels = Tensor::from_data(Data::new(labels, Shape::new([batch_size])), &self.device);

        TextClassificationTrainingBatch { tokens, labels }
    }
}

/// Реализация Batcher для TextClassificationBatcher для инференса
impl<B: Backend> Batcher<Vec<usize>, TextClassificationInferenceBatch<B>>
    for TextClassificationBatcher<B>
{
    /// Создает пакет вывода из вектора выровненных последовательностей
    fn batch(&self, items: Vec<Vec<usize>>) -> TextClassificationInferenceBatch<B> {
        let tokens = self.tokens_tensor(items.iter().map(Vec::as_slice).collect());
        TextClassificationInferenceBatch { tokens }
    }
}
