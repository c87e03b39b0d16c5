pub mod cli;
pub mod data_processing;
pub mod error;
mod model;
pub mod reproducibility;

pub mod inference;
pub mod training;

pub use data_processing::{load_reviews, LoadedReviews, PreparedData, Preprocessor, PreprocessorConfig};
pub use error::{DataError, Result};
pub use model::{TextClassificationModel, TextClassificationModelConfig};
