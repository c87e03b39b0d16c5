use anyhow::{Context, Result};
use burn::module::AutodiffModule;
use burn::tensor::backend::AutodiffBackend;
use clap::Parser;
use review_classifier::cli::{Cli, Command, TrainArgs};
use review_classifier::reproducibility::ReproducibilityConfig;
use review_classifier::training::{self, ExperimentConfig};
use review_classifier::{inference, load_reviews, PreparedData, Preprocessor, TextClassificationModel};

pub fn launch<B: AutodiffBackend>(device: B::Device, command: Command) -> Result<()> {
    match command {
        Command::Evaluate(args) => {
            let (model, data, config) = fit::<B>(&device, &args)?;
            let model = model.valid();

            let test_accuracy = training::accuracy(
                &model,
                &device,
                &data.testing_tokens,
                &data.testing_labels,
                config.batch_size,
            );
            println!("Test accuracy: {:.2}%", test_accuracy * 100.0);
        }
        Command::Report(args) => {
            let (model, data, config) = fit::<B>(&device, &args)?;
            let model = model.valid();

            let training_accuracy = training::accuracy(
                &model,
                &device,
                &data.training_tokens,
                &data.training_labels,
                config.batch_size,
            );
            let testing_accuracy = training::accuracy(
                &model,
                &device,
                &data.testing_tokens,
                &data.testing_labels,
                config.batch_size,
            );
            println!("Training Accuracy: {:.2}%", training_accuracy * 100.0);
            println!("Testing Accuracy: {:.2}%", testing_accuracy * 100.0);
        }
        Command::Infer(args) => {
            inference::infer::<B::InnerBackend>(device, &args.artifact_dir, args.samples)
                .with_context(|| format!("inference with artifacts from '{}'", args.artifact_dir))?;
        }
    }

    Ok(())
}

// Загрузка, предобработка и обучение; общая часть evaluate и report
fn fit<B: AutodiffBackend>(
    device: &B::Device,
    args: &TrainArgs,
) -> Result<(TextClassificationModel<B>, PreparedData, ExperimentConfig)> {
    let config = args.experiment_config().context("invalid training arguments")?;
    ReproducibilityConfig::new().with_seed(config.seed).init::<B>();

    let reviews = load_reviews(&args.data)
        .with_context(|| format!("cannot load reviews from '{}'", args.data.display()))?;
    let data = Preprocessor::new(config.preprocessor.clone())
        .preprocess(&reviews.documents, &reviews.labels)
        .context("cannot prepare the data set")?;

    let model = training::train::<B>(device.clone(), &data, &config, &args.artifact_dir)
        .context("training failed")?;

    Ok((model, data, config))
}

mod ndarray {
    use crate::launch;
    use burn::backend::ndarray::NdArrayDevice;
    use burn::backend::{Autodiff, NdArray};
    use review_classifier::cli::Command;

    pub fn run(command: Command) -> anyhow::Result<()> {
        launch::<Autodiff<NdArray<f32>>>(NdArrayDevice::Cpu, command)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("review_classifier=info".parse()?),
        )
        .init();

    let command = Cli::parse().into_command();

    ndarray::run(command)
}
