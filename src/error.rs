use burn::{config::ConfigError, record::RecorderError};

/// Errors raised while training, saving, loading or querying a classifier.
///
/// Shape mismatches and other tensor level failures are panics inside Burn and
/// are not represented here.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The configuration file could not be read or parsed.
    #[error("failed to load the configuration: {0}")]
    Config(String),

    /// The model record could not be written or read.
    #[error("failed to access the model record: {0}")]
    Record(String),

    /// Filesystem access around the artifact directory failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Report serialization failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The dataset has no item to batch.
    #[error("the dataset is empty")]
    EmptyDataset,

    /// The requested item index does not exist in the dataset.
    #[error("item {index} is out of range, the dataset holds {len} items")]
    ItemOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of items in the dataset.
        len: usize,
    },
}

/// Result alias using the crate [error](Error).
pub type Result<T> = std::result::Result<T, Error>;

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(format!("{err:?}"))
    }
}

impl From<RecorderError> for Error {
    fn from(err: RecorderError) -> Self {
        Self::Record(format!("{err:?}"))
    }
}
