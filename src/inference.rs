use std::{fmt::Write, path::Path};

use crate::{
    data::{MnistBatcher, NormalizationConfig, IMAGE_SIZE},
    error::{Error, Result},
    model::Model,
    training::{TrainingConfig, CONFIG_FILE, MODEL_FILE},
};
use burn::{
    data::{
        dataloader::batcher::Batcher,
        dataset::{
            vision::{MnistDataset, MnistItem},
            Dataset,
        },
    },
    prelude::*,
    record::CompactRecorder,
};

const SHADES: &[u8] = b" .:-=+*#%@";
const BAR_WIDTH: usize = 40;

/// Class probabilities of a single digit.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    /// Ground-truth label of the item.
    pub label: u8,
    /// Most likely class.
    pub predicted: usize,
    /// Probability of every class, summing to one.
    pub probabilities: Vec<f32>,
}

/// Reloads the configuration and the model saved by [train](crate::training::train).
pub fn load_model<B: Backend>(
    artifact_dir: &str,
    device: &B::Device,
) -> Result<(TrainingConfig, Model<B>)> {
    let artifact_dir = Path::new(artifact_dir);
    let config = TrainingConfig::load(artifact_dir.join(CONFIG_FILE))?;
    let model = config.model.init::<B>(device).load_file(
        artifact_dir.join(MODEL_FILE),
        &CompactRecorder::new(),
        device,
    )?;

    Ok((config, model))
}

/// Runs one item through the model and turns its log-probabilities back into
/// probabilities.
pub fn classify<B: Backend>(
    model: &Model<B>,
    item: &MnistItem,
    normalization: NormalizationConfig,
    device: B::Device,
) -> Prediction {
    let batcher = MnistBatcher::new(device, normalization);
    let batch = batcher.batch(vec![item.clone()]);

    let probabilities = model
        .forward(batch.images)
        .exp()
        .into_data()
        .iter::<f32>()
        .collect::<Vec<_>>();
    let predicted = probabilities
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(class, _)| class)
        .unwrap_or_default();

    Prediction {
        label: item.label,
        predicted,
        probabilities,
    }
}

/// Classifies the `index`-th image of the MNIST test split with the model
/// saved in `artifact_dir`.
pub fn infer<B: Backend>(
    artifact_dir: &str,
    index: usize,
    device: B::Device,
) -> Result<(MnistItem, Prediction)> {
    infer_with::<B, _>(artifact_dir, MnistDataset::test(), index, device)
}

/// Classifies the `index`-th item of `dataset` with the model saved in
/// `artifact_dir`.
pub fn infer_with<B, D>(
    artifact_dir: &str,
    dataset: D,
    index: usize,
    device: B::Device,
) -> Result<(MnistItem, Prediction)>
where
    B: Backend,
    D: Dataset<MnistItem>,
{
    let (config, model) = load_model::<B>(artifact_dir, &device)?;

    let item = dataset.get(index).ok_or(Error::ItemOutOfRange {
        index,
        len: dataset.len(),
    })?;
    let prediction = classify(&model, &item, config.normalization, device);

    log::info!(
        "Item {index}: predicted {} expected {}",
        prediction.predicted,
        prediction.label
    );

    Ok((item, prediction))
}

/// Draws the digit with characters and a bar per class probability.
pub fn render(item: &MnistItem, prediction: &Prediction) -> String {
    let mut out = String::new();

    for row in item.image.iter() {
        let line = row
            .iter()
            .map(|&pixel| {
                let shade = (pixel.clamp(0.0, 255.0) / 256.0 * SHADES.len() as f32) as usize;
                SHADES[shade] as char
            })
            .collect::<String>();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    debug_assert_eq!(item.image.len(), IMAGE_SIZE);

    out.push('\n');
    for (class, probability) in prediction.probabilities.iter().enumerate() {
        let filled = (probability.clamp(0.0, 1.0) * BAR_WIDTH as f32).round() as usize;
        let marker = if class == prediction.predicted { '<' } else { ' ' };
        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "{class} |{:<width$}| {probability:.3} {marker}",
            "#".repeat(filled),
            width = BAR_WIDTH,
        );
    }
    let _ = writeln!(
        out,
        "Predicted {} Expected {}",
        prediction.predicted, prediction.label
    );

    out
}
