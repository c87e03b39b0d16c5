// Кодировщик меток переводит округлённые оценки в плотное пространство классов 0..k.
// Порядок классов задаётся сортировкой уникальных значений по возрастанию.

use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<i64>,
}

impl LabelEncoder {
    /// Строит кодировщик по всем встреченным меткам.
    pub fn fit(labels: &[i64]) -> Self {
        let mut classes = labels.to_vec();
        classes.sort_unstable();
        classes.dedup();
        Self { classes }
    }

    pub fn fit_transform(labels: &[i64]) -> Result<(Self, Vec<usize>)> {
        let encoder = Self::fit(labels);
        let encoded = encoder.transform(labels)?;
        Ok((encoder, encoded))
    }

    pub fn transform(&self, labels: &[i64]) -> Result<Vec<usize>> {
        labels.iter().map(|label| self.encode(*label)).collect()
    }

    pub fn encode(&self, label: i64) -> Result<usize> {
        self.classes
            .binary_search(&label)
            .map_err(|_| DataError::UnknownLabel(label))
    }

    pub fn inverse_transform(&self, classes: &[usize]) -> Result<Vec<i64>> {
        classes.iter().map(|class| self.decode(*class)).collect()
    }

    pub fn decode(&self, class: usize) -> Result<i64> {
        self.classes
            .get(class)
            .copied()
            .ok_or(DataError::UnknownClass(class))
    }

    /// Исходные значения меток в порядке их индексов
    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
