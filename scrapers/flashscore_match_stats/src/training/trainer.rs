//! Training loop for the outcome classifier

use burn::backend::{Autodiff, NdArray};
use burn::data::dataloader::DataLoaderBuilder;
use burn::data::dataset::InMemDataset;
use burn::module::AutodiffModule;
use burn::nn::loss::CrossEntropyLossConfig;
use burn::optim::decay::WeightDecayConfig;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::ElementConversion;
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::{debug, info};

use super::dataset::{load_examples, train_test_split, MatchBatch, MatchBatcher, MatchExample, Scaler};
use super::model::{ClassifierConfig, OutcomeClassifier};
use crate::{config::TrainingConfig, error::TrainingError};

pub type TrainingBackend = Autodiff<NdArray<f32>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpochStats {
    pub epoch: usize,
    /// Mean training loss over the epoch's batches.
    pub loss: f32,
    /// Test-set accuracy after the epoch.
    pub accuracy: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub train_rows: usize,
    pub test_rows: usize,
    pub epochs: Vec<EpochStats>,
    pub best_accuracy: f32,
    pub best_epoch: usize,
}

/// Loads, splits, standardizes and trains on the model-ready frame.
pub fn train_classifier(frame: &DataFrame, config: &TrainingConfig) -> Result<TrainingReport, TrainingError> {
    let examples = load_examples(frame)?;
    let (mut train, mut test) = train_test_split(examples, config.test_ratio, config.seed);
    if train.is_empty() || test.is_empty() {
        return Err(TrainingError::EmptyPartition {
            train: train.len(),
            test: test.len(),
        });
    }

    let scaler = Scaler::fit(&train);
    debug!("Feature scaling: mean={:?}, std={:?}", scaler.mean, scaler.std);
    scaler.transform(&mut train);
    scaler.transform(&mut test);

    let device = Default::default();
    Ok(fit::<TrainingBackend>(train, test, config, &device))
}

/// Runs the epochs and evaluates on `test` after each one.
pub fn fit<B: AutodiffBackend>(
    train: Vec<MatchExample>,
    test: Vec<MatchExample>,
    config: &TrainingConfig,
    device: &B::Device,
) -> TrainingReport {
    B::seed(config.seed);

    let train_rows = train.len();
    let test_rows = test.len();
    let input_dim = train.first().map(|e| e.features.len()).unwrap_or_default();

    let mut model = OutcomeClassifier::<B>::new(device, &ClassifierConfig::from_training(input_dim, config));
    let mut optimizer = AdamConfig::new()
        .with_weight_decay(Some(WeightDecayConfig::new(config.weight_decay)))
        .init();
    let loss_fn = CrossEntropyLossConfig::new().init(device);

    let train_loader = DataLoaderBuilder::new(MatchBatcher)
        .batch_size(config.batch_size.max(1))
        .shuffle(config.seed)
        .build(InMemDataset::new(train));
    let test_batch = MatchBatcher::tensors::<B::InnerBackend>(&test, device);

    info!(
        "Training on {} rows, evaluating on {} rows for {} epochs",
        train_rows, test_rows, config.epochs
    );

    let mut epochs = Vec::with_capacity(config.epochs);
    let mut best_accuracy = 0.0f32;
    let mut best_epoch = 0;

    for epoch in 1..=config.epochs {
        let mut loss_sum = 0.0f32;
        let mut batches = 0usize;

        for batch in train_loader.iter() {
            let MatchBatch { features, targets } = batch;
            let logits = model.forward(features);
            let loss = loss_fn.forward(logits, targets);
            loss_sum += loss.clone().into_scalar().elem::<f32>();
            batches += 1;

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optimizer.step(config.learning_rate, model, grads);
        }

        let loss = loss_sum / batches.max(1) as f32;
        let accuracy = accuracy(&model.valid(), &test_batch);
        info!("Epoch {}/{}: loss={:.4} accuracy={:.4}", epoch, config.epochs, loss, accuracy);

        if accuracy > best_accuracy || epochs.is_empty() {
            best_accuracy = accuracy;
            best_epoch = epoch;
        }
        epochs.push(EpochStats { epoch, loss, accuracy });
    }

    info!("Best accuracy {:.4} at epoch {}", best_accuracy, best_epoch);
    TrainingReport {
        train_rows,
        test_rows,
        epochs,
        best_accuracy,
        best_epoch,
    }
}

/// Share of rows whose argmax logit is the target class.
pub fn accuracy<B: Backend>(model: &OutcomeClassifier<B>, batch: &MatchBatch<B>) -> f32 {
    let total = batch.targets.dims()[0];
    if total == 0 {
        return 0.0;
    }
    let predicted = model.forward(batch.features.clone()).argmax(1).flatten::<1>(0, 1);
    let correct: i64 = predicted
        .equal(batch.targets.clone())
        .int()
        .sum()
        .into_scalar()
        .elem();
    correct as f32 / total as f32
}
