use clap::{Parser, Subcommand};

/// Train and query a feed-forward MNIST digit classifier.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// What to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Steps of the walkthrough.
#[allow(missing_docs)]
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train on the MNIST training split and save the model.
    Train {
        #[arg(long, default_value = "/tmp/digit-mlp")]
        artifact_dir: String,
        #[arg(long, default_value_t = 5)]
        num_epochs: usize,
        #[arg(long, default_value_t = 64)]
        batch_size: usize,
        #[arg(long, default_value_t = 0.003)]
        learning_rate: f64,
        /// SGD momentum, plain SGD when omitted.
        #[arg(long)]
        momentum: Option<f64>,
        /// Hidden layer widths, comma separated.
        #[arg(long, value_delimiter = ',', default_value = "128,64")]
        hidden_sizes: Vec<usize>,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = 0)]
        num_workers: usize,
    },
    /// Report loss and accuracy of a saved model on the MNIST test split.
    Evaluate {
        #[arg(long, default_value = "/tmp/digit-mlp")]
        artifact_dir: String,
    },
    /// Show the class probabilities of one MNIST test image.
    Infer {
        #[arg(long, default_value = "/tmp/digit-mlp")]
        artifact_dir: String,
        #[arg(long, default_value_t = 0)]
        index: usize,
    },
    /// Backpropagate through `mean(x^2)` and compare with the analytic gradient.
    Autograd,
}
