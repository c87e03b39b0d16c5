// Ошибки подготовки данных. Все ошибки чтения CSV, токенизатора и разбиения выборки
// поднимаются наверх без перехвата; бинарник оборачивает их в anyhow с контекстом.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DataError>;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("required column '{0}' is missing")]
    MissingColumn(&'static str),

    /// Строка без числовой оценки (номер строки считается от 1, без заголовка)
    #[error("row {row}: missing or invalid score {value:?}")]
    InvalidScore { row: usize, value: String },

    /// Ошибки сохранения и загрузки весов и конфигурации
    #[error("artifact error: {0}")]
    Artifact(String),

    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    #[error("{0} must be greater than zero")]
    ZeroParameter(&'static str),

    #[error("label {0} was not seen during fitting")]
    UnknownLabel(i64),

    #[error("class index {0} is out of range")]
    UnknownClass(usize),

    #[error("documents and labels have different lengths ({documents} != {labels})")]
    LengthMismatch { documents: usize, labels: usize },

    #[error("cannot split {n_samples} samples with test_size={test_size}: {reason}")]
    InvalidSplit {
        n_samples: usize,
        test_size: f64,
        reason: &'static str,
    },
}

impl From<tokenizers::Error> for DataError {
    fn from(err: tokenizers::Error) -> Self {
        DataError::Tokenizer(err.to_string())
    }
}
