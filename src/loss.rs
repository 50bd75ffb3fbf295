use burn::{prelude::*, tensor::ElementConversion};

/// Negative log-likelihood of `targets` under `log_probs`, averaged over the batch.
///
/// `log_probs` must already be normalized (the output of a log-softmax), with
/// shape `[batch_size, num_classes]`.
pub fn nll_loss<B: Backend>(log_probs: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
    let picked = log_probs.gather(1, targets.unsqueeze_dim::<2>(1));

    picked.mean().neg()
}

/// Number of rows whose most likely class matches the target.
pub fn num_correct<B: Backend>(log_probs: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> usize {
    let predictions = log_probs.argmax(1).squeeze::<1>(1);
    let num_corrects = predictions.equal(targets).int().sum().into_scalar();

    num_corrects.elem::<i64>() as usize
}

/// Fraction of correct predictions in `[0, 1]`.
pub fn accuracy<B: Backend>(log_probs: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> f32 {
    let [num_predictions] = targets.dims();

    num_correct(log_probs, targets) as f32 / num_predictions as f32
}
