mod batcher;
mod dataset;
mod labels;
mod loader;
mod preprocessor;
mod split;
mod tokenizer;

pub use batcher::*;
pub use dataset::*;
pub use labels::*;
pub use loader::*;
pub use preprocessor::*;
pub use split::*;
pub use tokenizer::*;
