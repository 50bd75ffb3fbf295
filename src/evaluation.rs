use crate::{
    data::{build_loader, MnistBatcher, NormalizationConfig},
    error::{Error, Result},
    loss::num_correct,
    model::Model,
};
use burn::{
    data::dataset::{vision::MnistItem, Dataset},
    prelude::*,
    tensor::ElementConversion,
};

/// Loss and accuracy of a model over a whole dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    /// Per-item negative log-likelihood averaged over the dataset.
    pub mean_loss: f32,
    /// Fraction of correctly classified items.
    pub accuracy: f32,
    /// Number of items scored.
    pub num_items: usize,
}

/// Scores `model` on every item of `dataset`, without tracking gradients.
///
/// Pass the inner model (`AutodiffModule::valid`) of a model being trained.
pub fn evaluate<B, D>(
    model: &Model<B>,
    dataset: D,
    normalization: NormalizationConfig,
    batch_size: usize,
    device: B::Device,
) -> Result<Evaluation>
where
    B: Backend,
    D: Dataset<MnistItem> + 'static,
{
    if dataset.is_empty() {
        return Err(Error::EmptyDataset);
    }

    let batcher = MnistBatcher::<B>::new(device, normalization);
    let dataloader = build_loader(dataset, batcher, batch_size, 0, 0);

    let mut total_loss = 0.0;
    let mut total_correct = 0;
    let mut num_items = 0;

    for batch in dataloader.iter() {
        let [batch_size] = batch.targets.dims();
        let output = model.forward_classification(batch);

        // Weight by size so a short last batch counts for what it holds.
        total_loss += output.loss.into_scalar().elem::<f32>() * batch_size as f32;
        total_correct += num_correct(output.output, output.targets);
        num_items += batch_size;
    }

    let evaluation = Evaluation {
        mean_loss: total_loss / num_items as f32,
        accuracy: total_correct as f32 / num_items as f32,
        num_items,
    };
    log::info!(
        "Evaluated {} items: loss {:.4}, accuracy {:.2} %",
        evaluation.num_items,
        evaluation.mean_loss,
        evaluation.accuracy * 100.0
    );

    Ok(evaluation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data::IMAGE_SIZE, model::ModelConfig, TestBackend};
    use burn::data::dataset::InMemDataset;

    fn dataset(len: usize) -> InMemDataset<MnistItem> {
        let items = (0..len)
            .map(|i| MnistItem {
                image: [[(i * 10) as f32; IMAGE_SIZE]; IMAGE_SIZE],
                label: (i % 10) as u8,
            })
            .collect();

        InMemDataset::new(items)
    }

    #[test]
    fn every_item_is_scored_once() {
        let device = Default::default();
        let model = ModelConfig::new().init::<TestBackend>(&device);

        let evaluation =
            evaluate(&model, dataset(11), NormalizationConfig::new(), 4, device).unwrap();

        assert_eq!(evaluation.num_items, 11);
        assert!((0.0..=1.0).contains(&evaluation.accuracy));
        assert!(evaluation.mean_loss > 0.0);
    }

    #[test]
    fn empty_dataset_is_rejected() {
        let device = Default::default();
        let model = ModelConfig::new().init::<TestBackend>(&device);

        let result = evaluate(
            &model,
            InMemDataset::new(Vec::new()),
            NormalizationConfig::new(),
            4,
            device,
        );

        assert!(matches!(result, Err(Error::EmptyDataset)));
    }
}
