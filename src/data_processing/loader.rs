// Модуль читает CSV с отзывами и превращает его в два выровненных списка: документы и метки.
// Метка строки равна округлённой вверх оценке (score) и вычисляется для всех строк до удаления
// дубликатов. Заголовок и текст перевода склеиваются в один документ, после чего повторяющиеся
// документы удаляются с сохранением первого вхождения, а метки фильтруются по тем же индексам.

use crate::error::{DataError, Result};
use derive_new::new;
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// Значения, которые считаются пропущенными (как в NA-списке pandas.read_csv).
/// Обязательные столбцы CSV.
pub const REQUIRED_COLUMNS: [&str; 3] = ["score", "translation_title", "translation_text"];

const MISSING_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// Строка CSV в сыром виде; лишние столбцы игнорируются
#[derive(Debug, Deserialize)]
struct RawReview {
    score: Option<String>,
    translation_title: Option<String>,
    translation_text: Option<String>,
}

/// Одна запись отзыва после разбора.
#[derive(new, Clone, Debug, PartialEq)]
pub struct ReviewRecord {
    pub score: f64,
    pub translation_title: Option<String>,
    pub translation_text: Option<String>,
}

/// Результат загрузки: уникальные документы и их метки, индекс в индекс.
#[derive(new, Clone, Debug, Default, PartialEq)]
pub struct LoadedReviews {
    pub documents: Vec<String>,
    pub labels: Vec<i64>,
}

impl LoadedReviews {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Загружает отзывы из файла.
pub fn load_reviews<P: AsRef<Path>>(path: P) -> Result<LoadedReviews> {
    let path = path.as_ref();
    tracing::info!("Loading reviews from '{}'", path.display());
    let file = std::fs::File::open(path)?;
    read_reviews(file)
}

/// Загружает отзывы из произвольного источника CSV.
pub fn read_reviews<R: Read>(reader: R) -> Result<LoadedReviews> {
    let records = parse_records(reader)?;

    let labels: Vec<i64> = records.iter().map(|r| r.score.ceil() as i64).collect();
    let documents: Vec<String> = records
        .iter()
        .map(|r| merge_texts(r.translation_title.as_deref(), r.translation_text.as_deref()))
        .collect();

    let total = documents.len();
    let loaded = deduplicate(documents, labels);
    tracing::info!(
        "Loaded {} rows, {} unique documents ({} duplicates removed)",
        total,
        loaded.len(),
        total - loaded.len()
    );

    Ok(loaded)
}

fn parse_records<R: Read>(reader: R) -> Result<Vec<ReviewRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = reader.headers()?;
    if let Some(column) = REQUIRED_COLUMNS
        .into_iter()
        .find(|column| !headers.iter().any(|h| h == *column))
    {
        return Err(DataError::MissingColumn(column));
    }

    let mut records = Vec::new();
    for (index, raw) in reader.deserialize::<RawReview>().enumerate() {
        let raw = raw?;
        let row = index + 1;

        let score_value = raw.score.unwrap_or_default();
        let score = non_missing(Some(score_value.as_str()))
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .ok_or_else(|| DataError::InvalidScore {
                row,
                value: score_value.clone(),
            })?;

        records.push(ReviewRecord::new(
            score,
            non_missing(raw.translation_title.as_deref()).map(str::to_string),
            non_missing(raw.translation_text.as_deref()).map(str::to_string),
        ));
    }

    Ok(records)
}

fn non_missing(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !MISSING_VALUES.contains(v))
}

/// Склеивает заголовок и текст в один документ.
///
/// Пропуски и пустые строки не дают лишних пробелов; непустые значения не обрезаются.
pub fn merge_texts(title: Option<&str>, text: Option<&str>) -> String {
    match (title, text) {
        (title, None) => title.unwrap_or_default().to_string(),
        (title, Some(text)) if text.trim().is_empty() => title.unwrap_or_default().to_string(),
        (Some(title), Some(text)) if !title.trim().is_empty() => format!("{title} {text}"),
        (_, Some(text)) => text.to_string(),
    }
}

/// Удаляет повторяющиеся документы, оставляя первое вхождение, и фильтрует метки по тем же индексам.
pub fn deduplicate(documents: Vec<String>, labels: Vec<i64>) -> LoadedReviews {
    let mut seen = HashSet::with_capacity(documents.len());
    let mut kept_documents = Vec::new();
    let mut kept_labels = Vec::new();

    for (document, label) in documents.into_iter().zip(labels) {
        if seen.insert(document.clone()) {
            kept_documents.push(document);
            kept_labels.push(label);
        }
    }

    LoadedReviews::new(kept_documents, kept_labels)
}
