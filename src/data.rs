use std::sync::Arc;

use burn::{
    data::{
        dataloader::{batcher::Batcher, DataLoader, DataLoaderBuilder},
        dataset::{vision::MnistItem, Dataset},
    },
    prelude::*,
    tensor::ElementConversion,
};

/// Width and height of an MNIST digit.
pub const IMAGE_SIZE: usize = 28;
/// Number of features of a flattened digit.
pub const NUM_FEATURES: usize = IMAGE_SIZE * IMAGE_SIZE;
/// Number of digit classes.
pub const NUM_CLASSES: usize = 10;

/// Pixel normalization applied after scaling pixels to `[0, 1]`.
///
/// The defaults map `[0, 1]` onto `[-1, 1]`.
#[derive(Config, Debug)]
pub struct NormalizationConfig {
    /// Value subtracted from each scaled pixel.
    #[config(default = 0.5)]
    pub mean: f32,
    /// Divisor applied after centering.
    #[config(default = 0.5)]
    pub std: f32,
}

/// Turns MNIST items into normalized tensors on a device.
#[derive(Clone, Debug)]
pub struct MnistBatcher<B: Backend> {
    device: B::Device,
    normalization: NormalizationConfig,
}

/// A mini-batch of digits and their labels.
#[derive(Clone, Debug)]
pub struct MnistBatch<B: Backend> {
    /// Normalized images, `[batch_size, 784]`.
    pub images: Tensor<B, 2>,
    /// Class indices, `[batch_size]`.
    pub targets: Tensor<B, 1, Int>,
}

impl<B: Backend> MnistBatcher<B> {
    /// Creates a batcher placing tensors on `device`.
    pub fn new(device: B::Device, normalization: NormalizationConfig) -> Self {
        Self {
            device,
            normalization,
        }
    }
}

impl<B: Backend> Batcher<MnistItem, MnistBatch<B>> for MnistBatcher<B> {
    fn batch(&self, items: Vec<MnistItem>) -> MnistBatch<B> {
        let mean = self.normalization.mean;
        let std = self.normalization.std;

        let images = items
            .iter()
            .map(|item| TensorData::from(item.image).convert::<B::FloatElem>())
            .map(|data| Tensor::<B, 2>::from_data(data, &self.device))
            .map(|tensor| tensor.reshape([1, NUM_FEATURES]))
            // Scale to [0, 1], then center.
            .map(|tensor| ((tensor / 255) - mean) / std)
            .collect();

        let targets = items
            .iter()
            .map(|item| {
                Tensor::<B, 1, Int>::from_data(
                    [(item.label as i64).elem::<B::IntElem>()],
                    &self.device,
                )
            })
            .collect();

        let images = Tensor::cat(images, 0);
        let targets = Tensor::cat(targets, 0);

        MnistBatch { images, targets }
    }
}

/// Builds a shuffled mini-batch loader over `dataset`.
///
/// A `num_workers` of zero keeps batching on the calling thread, which also
/// keeps the batch order reproducible for a given seed.
pub fn build_loader<B, D>(
    dataset: D,
    batcher: MnistBatcher<B>,
    batch_size: usize,
    num_workers: usize,
    seed: u64,
) -> Arc<dyn DataLoader<MnistBatch<B>>>
where
    B: Backend,
    D: Dataset<MnistItem> + 'static,
{
    let builder = DataLoaderBuilder::new(batcher)
        .batch_size(batch_size)
        .shuffle(seed);

    match num_workers {
        0 => builder.build(dataset),
        workers => builder.num_workers(workers).build(dataset),
    }
}
