use std::path::Path;
use tracing_core::{Level, LevelFilter};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{registry, Layer};

/// Name of the log file written in the artifact directory.
pub const LOG_FILE: &str = "experiment.log";

/// If a global tracing subscriber is not already configured, log to stdout and
/// to `<artifact_dir>/experiment.log`, and point panics at that file.
///
/// Returns whether this call installed the subscriber.
pub fn install(artifact_dir: &str) -> bool {
    let file_path = Path::new(artifact_dir).join(LOG_FILE);
    let writer = tracing_appender::rolling::never(artifact_dir, LOG_FILE);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(LevelFilter::INFO)
        .with_filter(filter_fn(quiet_dependencies));
    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(LevelFilter::INFO)
        .with_filter(filter_fn(quiet_dependencies));

    let installed = registry()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .is_ok();

    if installed {
        let previous = std::panic::take_hook();
        let file_path = file_path.display().to_string();

        std::panic::set_hook(Box::new(move |panic| {
            log::error!("panicked: {panic}");
            eprintln!("digit-mlp panicked, details in '{file_path}'");
            previous(panic);
        }));
    }

    installed
}

fn quiet_dependencies(metadata: &tracing_core::Metadata<'_>) -> bool {
    if let Some(path) = metadata.module_path() {
        // The wgpu crate is logging too much, so we skip `info` level.
        if path.starts_with("wgpu") && *metadata.level() >= Level::INFO {
            return false;
        }
    }
    true
}
