use std::path::Path;

use crate::{
    data::{build_loader, MnistBatcher, NormalizationConfig},
    error::Error,
    model::{Model, ModelConfig},
};
use burn::{
    data::dataset::{
        vision::{MnistDataset, MnistItem},
        Dataset,
    },
    optim::{momentum::MomentumConfig, GradientsParams, Optimizer, SgdConfig},
    prelude::*,
    record::CompactRecorder,
    tensor::{backend::AutodiffBackend, ElementConversion},
};
use serde::{Deserialize, Serialize};

/// File name of the saved training configuration.
pub const CONFIG_FILE: &str = "config.json";
/// File name (without extension) of the saved model record.
pub const MODEL_FILE: &str = "model";
/// File name of the per-epoch loss report.
pub const REPORT_FILE: &str = "report.json";

/// Hyperparameters of a training run.
#[derive(Config)]
pub struct TrainingConfig {
    /// Layer sizes.
    pub model: ModelConfig,
    /// Update rule.
    pub optimizer: SgdConfig,
    /// Pixel normalization shared by training and inference.
    #[config(default = "NormalizationConfig::new()")]
    pub normalization: NormalizationConfig,
    /// Passes over the training set.
    #[config(default = 5)]
    pub num_epochs: usize,
    /// Items per mini-batch.
    #[config(default = 64)]
    pub batch_size: usize,
    /// Batching threads, `0` batches on the training thread.
    #[config(default = 0)]
    pub num_workers: usize,
    /// Seeds both the backend and the shuffling.
    #[config(default = 42)]
    pub seed: u64,
    /// Step size of every SGD update.
    #[config(default = 0.003)]
    pub learning_rate: f64,
}

/// Running average loss of one pass over the training set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpochSummary {
    /// One-based epoch number.
    pub epoch: usize,
    /// Sum of the batch losses divided by the number of batches.
    pub mean_loss: f32,
    /// Number of optimizer steps taken.
    pub num_batches: usize,
}

/// The trained model with the loss history that produced it.
#[derive(Debug)]
pub struct TrainingReport<B: AutodiffBackend> {
    /// Model after the last optimizer step.
    pub model: Model<B>,
    /// One entry per completed epoch.
    pub epochs: Vec<EpochSummary>,
}

/// Plain SGD, or SGD with undampened momentum.
pub fn sgd_config(momentum: Option<f64>) -> SgdConfig {
    let momentum = momentum.map(|momentum| {
        MomentumConfig::new()
            .with_momentum(momentum)
            .with_dampening(0.0)
    });

    SgdConfig::new().with_momentum(momentum)
}

/// Empties `artifact_dir`, creating it when missing.
pub fn create_artifact_dir(artifact_dir: &str) -> crate::Result<()> {
    // Stale records from a previous run would be mixed with the new ones.
    std::fs::remove_dir_all(artifact_dir).ok();
    std::fs::create_dir_all(artifact_dir)?;

    Ok(())
}

/// Trains on the MNIST training split and saves the configuration, the model
/// and the loss report under `artifact_dir`.
///
/// Existing files in `artifact_dir` are overwritten but not removed, see
/// [create_artifact_dir].
pub fn train<B: AutodiffBackend>(
    artifact_dir: &str,
    config: TrainingConfig,
    device: B::Device,
) -> crate::Result<TrainingReport<B>> {
    std::fs::create_dir_all(artifact_dir)?;
    config.save(Path::new(artifact_dir).join(CONFIG_FILE))?;

    log::info!("Loading the MNIST training split");
    let report = train_with(&config, MnistDataset::train(), device)?;

    report
        .model
        .clone()
        .save_file(Path::new(artifact_dir).join(MODEL_FILE), &CompactRecorder::new())?;
    std::fs::write(
        Path::new(artifact_dir).join(REPORT_FILE),
        serde_json::to_string_pretty(&report.epochs)?,
    )?;
    log::info!("Artifacts saved in {artifact_dir}");

    Ok(report)
}

/// Trains a freshly initialized model on `dataset`.
///
/// Every step runs the forward pass, computes the negative log-likelihood,
/// calls the backward pass and lets the optimizer update the parameters. Each
/// backward pass yields its own gradients, so nothing accumulates between
/// steps.
pub fn train_with<B, D>(
    config: &TrainingConfig,
    dataset: D,
    device: B::Device,
) -> crate::Result<TrainingReport<B>>
where
    B: AutodiffBackend,
    D: Dataset<MnistItem> + 'static,
{
    if dataset.is_empty() {
        return Err(Error::EmptyDataset);
    }

    B::seed(config.seed);

    let mut model = config.model.init::<B>(&device);
    let mut optim = config.optimizer.init::<B, Model<B>>();

    log::info!(
        "Training {} parameters on {} items for {} epochs",
        model.num_params(),
        dataset.len(),
        config.num_epochs
    );

    let batcher = MnistBatcher::<B>::new(device, config.normalization.clone());
    let dataloader = build_loader(
        dataset,
        batcher,
        config.batch_size,
        config.num_workers,
        config.seed,
    );

    let mut epochs = Vec::with_capacity(config.num_epochs);

    for epoch in 1..config.num_epochs + 1 {
        let mut running_loss = 0.0;
        let mut num_batches = 0;

        for batch in dataloader.iter() {
            let output = model.forward_classification(batch);
            let loss = output.loss;

            // Gradients for the current backward pass
            let grads = loss.backward();
            // Gradients linked to each parameter of the model.
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(config.learning_rate, model, grads);

            running_loss += loss.into_scalar().elem::<f32>();
            num_batches += 1;
        }

        let summary = EpochSummary {
            epoch,
            mean_loss: running_loss / num_batches as f32,
            num_batches,
        };
        log::info!(
            "[Epoch {}/{}] Training loss {:.4} over {} batches",
            summary.epoch,
            config.num_epochs,
            summary.mean_loss,
            summary.num_batches
        );
        epochs.push(summary);
    }

    Ok(TrainingReport { model, epochs })
}
