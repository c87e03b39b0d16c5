// ReviewDataset хранит уже токенизированные и выровненные по длине отзывы вместе с закодированными
// метками и реализует трейт Dataset фреймворка Burn, чтобы его можно было подать в DataLoader.

use burn::data::dataset::{Dataset, InMemDataset};
use derive_new::new;

// Структура для элементов классификации отзывов
#[derive(new, Clone, Debug, PartialEq)]
pub struct TextClassificationItem {
    pub tokens: Vec<usize>, // Индексы слов фиксированной длины
    pub label: usize,       // Закодированная метка (класс оценки)
}

pub struct ReviewDataset {
    dataset: InMemDataset<TextClassificationItem>,
}

impl ReviewDataset {
    /// Собирает набор из выровненных последовательностей и меток.
    pub fn new(sequences: &[Vec<usize>], labels: &[usize]) -> Self {
        let items = sequences
            .iter()
            .zip(labels)
            .map(|(tokens, label)| TextClassificationItem::new(tokens.clone(), *label))
            .collect();

        Self {
            dataset: InMemDataset::new(items),
        }
    }
}

impl Dataset<TextClassificationItem> for ReviewDataset {
    /// Возвращает элемент набора данных по индексу
    fn get(&self, index: usize) -> Option<TextClassificationItem> {
        self.dataset.get(index)
    }

    /// Возвращает количество элементов в наборе данных
    fn len(&self) -> usize {
        self.dataset.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_pairs_sequences_with_labels() {
        let dataset = ReviewDataset::new(&[vec![0, 1], vec![2, 3]], &[1, 0]);

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.get(1), Some(TextClassificationItem::new(vec![2, 3], 0)));
        assert_eq!(dataset.get(2), None);
    }
}
