// Данный модуль определяет трейт Tokenizer, общий интерфейс токенизаторов классификатора отзывов.
// Конкретная реализация, WordIndexTokenizer, строит словарь из самых частых слов обучающей выборки
// и хранит его как WordLevel-модель библиотеки tokenizers, чтобы словарь можно было сохранить
// и загрузить вместе с обученной моделью. Функция pad_sequences приводит последовательности
// индексов к фиксированной длине.

use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

/// Символы, которые заменяются пробелами перед разбиением на слова.
pub const FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

const PAD_TOKEN: &str = "[PAD]";
const UNK_TOKEN: &str = "[UNK]";

pub trait Tokenizer: Send + Sync {
    /// Конвертирует текстовую строку в последовательность токенов.
    fn encode(&self, value: &str) -> Result<Vec<usize>>;

    /// Конвертирует последовательность токенов обратно в текстовую строку.
    fn decode(&self, tokens: &[usize]) -> Result<String>;

    /// Получает размер словаря токенизатора (включая токен заполнения).
    fn vocab_size(&self) -> usize;

    /// Получает токен, используемый для заполнения последовательностей до одинаковой длины.
    fn pad_token(&self) -> usize;

    fn encode_batch<S: AsRef<str>>(&self, values: &[S]) -> Result<Vec<Vec<usize>>>
    where
        Self: Sized,
    {
        values.iter().map(|v| self.encode(v.as_ref())).collect()
    }
}

/// Разбивает текст на слова: нижний регистр, символы из FILTERS становятся пробелами.
///
/// Регистр понижается посимвольно, как в нормализаторе `Lowercase`.
pub fn text_to_word_sequence(text: &str) -> Vec<String> {
    let cleaned: String = text
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| if FILTERS.contains(c) { ' ' } else { c })
        .collect();

    cleaned.split_whitespace().map(str::to_string).collect()
}

/// Словарь, ограниченный `max_words` самыми частыми словами.
///
/// Индексы слов начинаются с 1 и упорядочены по убыванию частоты (при равенстве
/// раньше идёт слово, встреченное первым). Кодируются только слова с индексом
/// меньше `max_words`; незнакомые слова отбрасываются. Индекс 0 зарезервирован
/// под заполнение.
pub struct WordIndexTokenizer {
    tokenizer: tokenizers::Tokenizer,
    num_words: usize,
}

impl WordIndexTokenizer {
    /// Строит словарь только по переданным (обучающим) текстам.
    pub fn fit<S: AsRef<str>>(texts: &[S], max_words: usize) -> Result<Self> {
        let counts = WordCounts::from_texts(texts);
        let kept: Vec<&str> = counts
            .ranked()
            .into_iter()
            .take(max_words.saturating_sub(1))
            .collect();

        tracing::info!(
            "Tokenizer fitted on {} documents: {} distinct words, {} kept (max_words={})",
            texts.len(),
            counts.len(),
            kept.len(),
            max_words
        );

        let tokenizer = build_word_level(&kept)?;
        Ok(Self {
            tokenizer,
            num_words: kept.len(),
        })
    }

    /// Загружает ранее сохранённый словарь.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let tokenizer = tokenizers::Tokenizer::from_file(path)?;
        // в словаре слова плюс [PAD] и [UNK]
        let num_words = tokenizer.get_vocab_size(false).saturating_sub(2);
        Ok(Self {
            tokenizer,
            num_words,
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.tokenizer.save(path, true)?;
        Ok(())
    }

    /// Количество слов, которым назначен индекс.
    pub fn num_words(&self) -> usize {
        self.num_words
    }

    pub fn word_index(&self, word: &str) -> Option<usize> {
        self.tokenizer
            .token_to_id(word)
            .map(|id| id as usize)
            .filter(|id| self.is_word_id(*id))
    }

    fn is_word_id(&self, id: usize) -> bool {
        (1..=self.num_words).contains(&id)
    }
}

impl Tokenizer for WordIndexTokenizer {
    fn encode(&self, value: &str) -> Result<Vec<usize>> {
        let encoding = self.tokenizer.encode(value, true)?;
        Ok(encoding
            .get_ids()
            .iter()
            .map(|id| *id as usize)
            .filter(|id| self.is_word_id(*id))
            .collect())
    }

    fn decode(&self, tokens: &[usize]) -> Result<String> {
        let tokens = tokens.iter().map(|t| *t as u32).collect::<Vec<u32>>();
        Ok(self.tokenizer.decode(&tokens, false)?)
    }

    fn vocab_size(&self) -> usize {
        self.num_words + 1
    }

    fn pad_token(&self) -> usize {
        0
    }
}

// Частоты слов в порядке первого появления
struct WordCounts {
    order: Vec<String>,
    counts: HashMap<String, usize>,
}

impl WordCounts {
    fn from_texts<S: AsRef<str>>(texts: &[S]) -> Self {
        let mut order = Vec::new();
        let mut counts: HashMap<String, usize> = HashMap::new();

        for word in texts.iter().flat_map(|t| text_to_word_sequence(t.as_ref())) {
            match counts.get_mut(&word) {
                Some(count) => *count += 1,
                None => {
                    counts.insert(word.clone(), 1);
                    order.push(word);
                }
            }
        }

        Self { order, counts }
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    // Устойчивая сортировка: при равной частоте сохраняется порядок появления
    fn ranked(&self) -> Vec<&str> {
        let mut ranked: Vec<(&str, usize)> = self
            .order
            .iter()
            .map(|w| (w.as_str(), self.counts[w]))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.into_iter().map(|(w, _)| w).collect()
    }
}

fn filters_pattern() -> String {
    let mut pattern = String::from("[");
    for c in FILTERS.chars() {
        match c {
            '\\' | ']' | '[' | '^' | '-' => {
                pattern.push('\\');
                pattern.push(c);
            }
            '\t' => pattern.push_str("\\t"),
            '\n' => pattern.push_str("\\n"),
            c => pattern.push(c),
        }
    }
    pattern.push(']');
    pattern
}

// Собирает WordLevel-токенизатор в формате tokenizer.json; нормализация совпадает
// с text_to_word_sequence, поэтому индексы при кодировании совпадают с построенными.
fn build_word_level(words: &[&str]) -> Result<tokenizers::Tokenizer> {
    let mut vocab = serde_json::Map::new();
    vocab.insert(PAD_TOKEN.to_string(), serde_json::json!(0));
    for (i, word) in words.iter().enumerate() {
        vocab.insert(word.to_string(), serde_json::json!(i + 1));
    }
    vocab.insert(UNK_TOKEN.to_string(), serde_json::json!(words.len() + 1));

    let tokenizer_json = serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": {
            "type": "Sequence",
            "normalizers": [
                { "type": "Lowercase" },
                {
                    "type": "Replace",
                    "pattern": { "Regex": filters_pattern() },
                    "content": " "
                }
            ]
        },
        "pre_tokenizer": { "type": "WhitespaceSplit" },
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": vocab,
            "unk_token": UNK_TOKEN
        }
    });

    tokenizers::Tokenizer::from_str(&tokenizer_json.to_string())
        .map_err(|e| DataError::Tokenizer(format!("cannot build word index: {e}")))
}

/// Сторона, с которой дополняются или обрезаются последовательности.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PadSide {
    Pre,
    Post,
}

/// Приводит каждую последовательность ровно к `max_len` элементам.
pub fn pad_sequences(
    sequences: &[Vec<usize>],
    max_len: usize,
    padding: PadSide,
    truncating: PadSide,
    value: usize,
) -> Vec<Vec<usize>> {
    sequences
        .iter()
        .map(|sequence| {
            let kept = if sequence.len() > max_len {
                match truncating {
                    PadSide::Pre => &sequence[sequence.len() - max_len..],
                    PadSide::Post => &sequence[..max_len],
                }
            } else {
                &sequence[..]
            };

            let fill = std::iter::repeat(value).take(max_len - kept.len());
            match padding {
                PadSide::Pre => fill.chain(kept.iter().copied()).collect(),
                PadSide::Post => kept.iter().copied().chain(fill).collect(),
            }
        })
        .collect()
}
