use std::path::PathBuf;

use burn::optim::AdamConfig;
use clap::{Args, Parser, Subcommand};

use crate::data_processing::PreprocessorConfig;
use crate::error::Result;
use crate::training::ExperimentConfig;

pub const DEFAULT_DATA: &str = "reviews.csv";
pub const DEFAULT_ARTIFACT_DIR: &str = "/tmp/review-classifier";

#[derive(Debug, Parser)]
#[command(
    name = "review-classifier",
    version,
    about = "Train an LSTM classifier that predicts the rounded review score"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Без подкоманды выполняется `evaluate` с настройками по умолчанию.
    pub fn into_command(self) -> Command {
        self.command
            .unwrap_or_else(|| Command::Evaluate(TrainArgs::default()))
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Train on the data set and print the test accuracy
    Evaluate(TrainArgs),
    /// Train on the data set and print training and testing accuracy
    Report(TrainArgs),
    /// Predict score buckets for texts with a saved model
    Infer(InferArgs),
}

#[derive(Debug, Clone, PartialEq, Args)]
pub struct TrainArgs {
    #[arg(long, default_value = DEFAULT_DATA)]
    pub data: PathBuf,
    #[arg(long, default_value = DEFAULT_ARTIFACT_DIR)]
    pub artifact_dir: String,
    #[arg(long, default_value_t = 1000)]
    pub max_words: usize,
    #[arg(long, default_value_t = 100)]
    pub max_sequence_length: usize,
    #[arg(long, default_value_t = 5)]
    pub epochs: usize,
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl Default for TrainArgs {
    fn default() -> Self {
        Self {
            data: PathBuf::from(DEFAULT_DATA),
            artifact_dir: DEFAULT_ARTIFACT_DIR.to_string(),
            max_words: 1000,
            max_sequence_length: 100,
            epochs: 5,
            batch_size: 32,
            seed: 42,
        }
    }
}

impl TrainArgs {
    pub fn experiment_config(&self) -> Result<ExperimentConfig> {
        let preprocessor = PreprocessorConfig::new()
            .with_max_words(self.max_words)
            .with_max_sequence_length(self.max_sequence_length)
            .with_seed(self.seed);

        let config = ExperimentConfig::new(preprocessor, AdamConfig::new())
            .with_num_epochs(self.epochs)
            .with_batch_size(self.batch_size)
            .with_seed(self.seed);
        config.validate()?;

        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Args)]
pub struct InferArgs {
    #[arg(long, default_value = DEFAULT_ARTIFACT_DIR)]
    pub artifact_dir: String,
    /// Texts to classify
    #[arg(required = true)]
    pub samples: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;

    fn parse(args: &[&str]) -> Command {
        Cli::try_parse_from(args).unwrap().into_command()
    }

    #[test]
    fn test_no_subcommand_means_default_evaluation() {
        match parse(&["review-classifier"]) {
            Command::Evaluate(args) => assert_eq!(args, TrainArgs::default()),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_clap_defaults_match_default_args() {
        match parse(&["review-classifier", "report"]) {
            Command::Report(args) => assert_eq!(args, TrainArgs::default()),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_train_args_flow_into_config() {
        let command = parse(&[
            "review-classifier",
            "evaluate",
            "--data",
            "other.csv",
            "--max-words",
            "500",
            "--epochs",
            "2",
            "--seed",
            "7",
        ]);
        let Command::Evaluate(args) = command else {
            panic!("expected evaluate");
        };

        let config = args.experiment_config().unwrap();
        assert_eq!(args.data, PathBuf::from("other.csv"));
        assert_eq!(config.preprocessor.max_words, 500);
        assert_eq!(config.preprocessor.seed, 7);
        assert_eq!(config.num_epochs, 2);
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn test_zero_sizes_are_rejected() {
        for (flag, name) in [
            ("--batch-size", "batch_size"),
            ("--epochs", "num_epochs"),
            ("--max-sequence-length", "max_sequence_length"),
        ] {
            let Command::Evaluate(args) = parse(&["review-classifier", "evaluate", flag, "0"]) else {
                panic!("expected evaluate");
            };
            let err = args.experiment_config().err().unwrap();
            assert!(matches!(&err, DataError::ZeroParameter(n) if *n == name), "{flag}: {err}");
        }
    }

    #[test]
    fn test_infer_requires_samples() {
        assert!(Cli::try_parse_from(["review-classifier", "infer"]).is_err());

        match parse(&["review-classifier", "infer", "great value", "broke fast"]) {
            Command::Infer(args) => assert_eq!(args.samples, vec!["great value", "broke fast"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
