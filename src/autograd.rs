use burn::{
    prelude::*,
    tensor::{backend::AutodiffBackend, Distribution, ElementConversion},
};

/// Tensors of the `z = mean(x²)` walkthrough.
#[derive(Debug)]
pub struct SquareMean<B: AutodiffBackend> {
    /// Random input tracked for gradients, `[2, 2]`.
    pub x: Tensor<B::InnerBackend, 2>,
    /// Scalar output.
    pub z: Tensor<B::InnerBackend, 1>,
    /// Gradient of `z` with respect to `x`.
    pub grad: Tensor<B::InnerBackend, 2>,
}

impl<B: AutodiffBackend> SquareMean<B> {
    /// Analytic gradient, `2x / n` with `n = 4` elements.
    pub fn expected_grad(&self) -> Tensor<B::InnerBackend, 2> {
        self.x.clone() / 2
    }

    /// Largest absolute difference between the computed and analytic gradients.
    pub fn max_error(&self) -> f32 {
        (self.grad.clone() - self.expected_grad())
            .abs()
            .max()
            .into_scalar()
            .elem::<f32>()
    }
}

/// Builds `y = x²` and `z = mean(y)` on a random `x`, then backpropagates from `z`.
pub fn square_mean<B: AutodiffBackend>(device: &B::Device) -> SquareMean<B> {
    let x = Tensor::<B, 2>::random([2, 2], Distribution::Normal(0.0, 1.0), device).require_grad();

    let y = x.clone().powf_scalar(2.0);
    let z = y.mean();

    let grads = z.backward();
    // `x` requires grad, so a missing entry only means it did not reach `z`.
    let grad = x
        .grad(&grads)
        .unwrap_or_else(|| x.clone().inner().zeros_like());

    log::info!("x = {}", x.clone().inner());
    log::info!("z = mean(x^2) = {}", z.clone().inner());
    log::info!("dz/dx = {grad}");

    SquareMean {
        x: x.inner(),
        z: z.inner(),
        grad,
    }
}
