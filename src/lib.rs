#![warn(missing_docs)]
#![recursion_limit = "256"]

//! Train a feed-forward digit classifier on MNIST with Burn.
//!
//! The crate walks through the usual supervised learning steps: batching a
//! normalized image dataset, running a stack of linear and ReLU layers that
//! ends in log-probabilities, computing the negative log-likelihood, calling
//! the backward pass and stepping an SGD optimizer, epoch after epoch.

/// Autograd walkthrough on a tiny tensor.
pub mod autograd;
/// Command line interface.
pub mod cli;
/// Image batching and normalization.
pub mod data;
/// Error type shared by every fallible operation.
pub mod error;
/// Held-out evaluation.
pub mod evaluation;
/// Single image classification and its text rendering.
pub mod inference;
/// Experiment logging.
pub mod logger;
/// Loss and accuracy helpers.
pub mod loss;
/// The classifier.
pub mod model;
/// The training loop.
pub mod training;

pub use error::{Error, Result};

/// Backend for test cases
#[cfg(test)]
pub type TestBackend = burn::backend::NdArray<f32>;

/// Backend with autodiff for test cases
#[cfg(test)]
pub type TestAutodiffBackend = burn::backend::Autodiff<TestBackend>;
