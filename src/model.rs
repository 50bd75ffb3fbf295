use crate::{
    data::{MnistBatch, NUM_CLASSES, NUM_FEATURES},
    loss::nll_loss,
};
use burn::{
    nn::{Linear, LinearConfig, Relu},
    prelude::*,
    tensor::activation::log_softmax,
};

/// Layer sizes of the classifier.
#[derive(Config, Debug)]
pub struct ModelConfig {
    /// Number of input features, one per pixel.
    #[config(default = "NUM_FEATURES")]
    pub input_size: usize,
    /// Width of every hidden layer, in order.
    #[config(default = "vec![128, 64]")]
    pub hidden_sizes: Vec<usize>,
    /// Number of output classes.
    #[config(default = "NUM_CLASSES")]
    pub num_classes: usize,
}

/// Feed-forward classifier: linear layers with ReLU in between, ending in a
/// log-softmax over the classes.
#[derive(Module, Debug)]
pub struct Model<B: Backend> {
    hidden: Vec<Linear<B>>,
    output: Linear<B>,
    activation: Relu,
}

/// Loss and predictions of one forward pass over a batch.
#[derive(Debug)]
pub struct ClassificationOutput<B: Backend> {
    /// Mean negative log-likelihood of the batch.
    pub loss: Tensor<B, 1>,
    /// Log-probabilities, `[batch_size, num_classes]`.
    pub output: Tensor<B, 2>,
    /// Class indices, `[batch_size]`.
    pub targets: Tensor<B, 1, Int>,
}

impl ModelConfig {
    /// Returns the initialized model.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Model<B> {
        let mut hidden = Vec::with_capacity(self.hidden_sizes.len());
        let mut d_input = self.input_size;

        for &d_output in self.hidden_sizes.iter() {
            hidden.push(LinearConfig::new(d_input, d_output).init(device));
            d_input = d_output;
        }

        Model {
            hidden,
            output: LinearConfig::new(d_input, self.num_classes).init(device),
            activation: Relu::new(),
        }
    }
}

impl<B: Backend> Model<B> {
    /// # Shapes
    ///   - Images [batch_size, input_size]
    ///   - Output [batch_size, num_classes]
    pub fn forward(&self, images: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = images;

        for linear in self.hidden.iter() {
            x = linear.forward(x);
            x = self.activation.forward(x);
        }

        log_softmax(self.output.forward(x), 1)
    }

    /// Runs the batch through the model and scores it against its targets.
    pub fn forward_classification(&self, batch: MnistBatch<B>) -> ClassificationOutput<B> {
        let targets = batch.targets;
        let output = self.forward(batch.images);
        let loss = nll_loss(output.clone(), targets.clone());

        ClassificationOutput {
            loss,
            output,
            targets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TestBackend;

    #[test]
    fn default_config_matches_mnist() {
        let config = ModelConfig::new();

        assert_eq!(config.input_size, 784);
        assert_eq!(config.hidden_sizes, vec![128, 64]);
        assert_eq!(config.num_classes, 10);
    }

    #[test]
    fn forward_outputs_normalized_log_probabilities() {
        let device = Default::default();
        let model = ModelConfig::new()
            .with_hidden_sizes(vec![16])
            .init::<TestBackend>(&device);
        let images = Tensor::<TestBackend, 2>::ones([4, NUM_FEATURES], &device);

        let log_probs = model.forward(images);
        assert_eq!(log_probs.dims(), [4, NUM_CLASSES]);

        let sums = log_probs
            .exp()
            .sum_dim(1)
            .into_data()
            .to_vec::<f32>()
            .unwrap();
        for sum in sums {
            assert!((sum - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn no_hidden_layer_is_a_linear_classifier() {
        let device = Default::default();
        let model = ModelConfig::new()
            .with_hidden_sizes(Vec::new())
            .init::<TestBackend>(&device);

        assert_eq!(model.hidden.len(), 0);
        assert_eq!(model.num_params(), NUM_FEATURES * NUM_CLASSES + NUM_CLASSES);
    }

    #[test]
    fn classification_output_keeps_targets() {
        let device = Default::default();
        let model = ModelConfig::new().init::<TestBackend>(&device);
        let batch = MnistBatch {
            images: Tensor::<TestBackend, 2>::zeros([2, NUM_FEATURES], &device),
            targets: Tensor::<TestBackend, 1, Int>::from_ints([1, 8], &device),
        };

        let output = model.forward_classification(batch);

        assert_eq!(output.output.dims(), [2, NUM_CLASSES]);
        assert_eq!(
            output.targets.into_data().to_vec::<i64>().unwrap(),
            vec![1, 8]
        );
        assert!(output.loss.into_scalar() > 0.0);
    }
}
