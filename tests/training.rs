use burn::{
    backend::{Autodiff, NdArray},
    config::Config,
    data::dataset::{vision::MnistItem, InMemDataset},
    module::AutodiffModule,
};
use digit_mlp::{
    data::{NormalizationConfig, IMAGE_SIZE},
    evaluation::evaluate,
    inference::{classify, load_model},
    model::ModelConfig,
    training::{sgd_config, train_with, TrainingConfig, CONFIG_FILE, MODEL_FILE},
};

type TestBackend = NdArray<f32>;
type TestAutodiffBackend = Autodiff<TestBackend>;

const NUM_CLASSES: usize = 4;

/// Class `k` lights up rows `7k..7k + 7`, the rest of the image stays black.
fn striped_digits(per_class: usize) -> Vec<MnistItem> {
    let mut items = Vec::with_capacity(per_class * NUM_CLASSES);

    for i in 0..per_class {
        for label in 0..NUM_CLASSES {
            let mut image = [[0.0; IMAGE_SIZE]; IMAGE_SIZE];
            let start = label * 7;
            for row in image.iter_mut().skip(start).take(7) {
                // Slight variation between items of the same class.
                *row = [200.0 + (i % 5) as f32 * 10.0; IMAGE_SIZE];
            }
            items.push(MnistItem {
                image,
                label: label as u8,
            });
        }
    }

    items
}

fn config() -> TrainingConfig {
    TrainingConfig::new(
        ModelConfig::new()
            .with_hidden_sizes(vec![32])
            .with_num_classes(NUM_CLASSES),
        sgd_config(None),
    )
    .with_num_epochs(10)
    .with_batch_size(8)
    .with_learning_rate(0.01)
}

#[test]
fn training_lowers_the_epoch_loss() {
    let report = train_with::<TestAutodiffBackend, _>(
        &config(),
        InMemDataset::new(striped_digits(16)),
        Default::default(),
    )
    .unwrap();

    let first = report.epochs.first().unwrap().mean_loss;
    let last = report.epochs.last().unwrap().mean_loss;

    assert_eq!(report.epochs.len(), 10);
    assert!(
        last < first,
        "loss went from {first} to {last} instead of decreasing"
    );
}

#[test]
fn trained_model_separates_the_classes() {
    let device = Default::default();
    let report = train_with::<TestAutodiffBackend, _>(
        &config(),
        InMemDataset::new(striped_digits(16)),
        device,
    )
    .unwrap();

    let evaluation = evaluate(
        &report.model.valid(),
        InMemDataset::new(striped_digits(4)),
        NormalizationConfig::new(),
        8,
        device,
    )
    .unwrap();

    assert_eq!(evaluation.num_items, 4 * NUM_CLASSES);
    assert!(
        evaluation.accuracy > 0.9,
        "accuracy {} is too low",
        evaluation.accuracy
    );
}

#[test]
fn saved_artifacts_classify_like_the_trained_model() {
    let dir = tempfile::tempdir().unwrap();
    let device = Default::default();
    let config = config();

    let report = train_with::<TestAutodiffBackend, _>(
        &config,
        InMemDataset::new(striped_digits(16)),
        device,
    )
    .unwrap();
    config.save(dir.path().join(CONFIG_FILE)).unwrap();
    burn::module::Module::save_file(
        report.model.clone(),
        dir.path().join(MODEL_FILE),
        &burn::record::CompactRecorder::new(),
    )
    .unwrap();

    let (loaded_config, model) =
        load_model::<TestBackend>(dir.path().to_str().unwrap(), &device).unwrap();

    for item in striped_digits(1) {
        let expected = classify(&report.model.valid(), &item, config.normalization.clone(), device);
        let actual = classify(&model, &item, loaded_config.normalization.clone(), device);

        assert_eq!(actual.probabilities.len(), NUM_CLASSES);
        assert_eq!(actual.predicted, expected.predicted);
    }
}
