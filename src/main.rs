#![recursion_limit = "256"]

use clap::Parser;
use digit_mlp::{
    autograd,
    cli::{Cli, Commands},
    data::NormalizationConfig,
    evaluation, inference, logger,
    model::ModelConfig,
    training::{self, sgd_config, TrainingConfig},
};

#[cfg(not(feature = "wgpu"))]
mod backend {
    use burn::backend::{ndarray::NdArrayDevice, Autodiff, NdArray};

    pub type Backend = NdArray<f32>;
    pub type AutodiffBackend = Autodiff<Backend>;

    pub fn device() -> NdArrayDevice {
        NdArrayDevice::Cpu
    }
}

#[cfg(feature = "wgpu")]
mod backend {
    use burn::backend::{wgpu::WgpuDevice, Autodiff, Wgpu};

    pub type Backend = Wgpu;
    pub type AutodiffBackend = Autodiff<Backend>;

    pub fn device() -> WgpuDevice {
        WgpuDevice::default()
    }
}

use backend::{AutodiffBackend, Backend};

fn run(cli: Cli) -> digit_mlp::Result<()> {
    let device = backend::device();

    match cli.command {
        Commands::Train {
            artifact_dir,
            num_epochs,
            batch_size,
            learning_rate,
            momentum,
            hidden_sizes,
            seed,
            num_workers,
        } => {
            training::create_artifact_dir(&artifact_dir)?;
            logger::install(&artifact_dir);

            let config = TrainingConfig::new(
                ModelConfig::new().with_hidden_sizes(hidden_sizes),
                sgd_config(momentum),
            )
            .with_normalization(NormalizationConfig::new())
            .with_num_epochs(num_epochs)
            .with_batch_size(batch_size)
            .with_learning_rate(learning_rate)
            .with_seed(seed)
            .with_num_workers(num_workers);

            training::train::<AutodiffBackend>(&artifact_dir, config, device)?;
        }
        Commands::Evaluate { artifact_dir } => {
            logger::install(&artifact_dir);

            let (config, model) = inference::load_model::<Backend>(&artifact_dir, &device)?;
            let evaluation = evaluation::evaluate(
                &model,
                burn::data::dataset::vision::MnistDataset::test(),
                config.normalization,
                config.batch_size,
                device,
            )?;

            println!(
                "Test loss {:.4} | Accuracy {:.2} % over {} images",
                evaluation.mean_loss,
                evaluation.accuracy * 100.0,
                evaluation.num_items
            );
        }
        Commands::Infer {
            artifact_dir,
            index,
        } => {
            logger::install(&artifact_dir);

            let (item, prediction) = inference::infer::<Backend>(&artifact_dir, index, device)?;
            print!("{}", inference::render(&item, &prediction));
        }
        Commands::Autograd => {
            let demo = autograd::square_mean::<AutodiffBackend>(&device);

            println!("x =\n{}", demo.x);
            println!("z = mean(x^2) = {}", demo.z);
            println!("dz/dx =\n{}", demo.grad);
            println!("x / 2 =\n{}", demo.expected_grad());
            println!("max |dz/dx - x / 2| = {:e}", demo.max_error());
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        log::error!("{err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
