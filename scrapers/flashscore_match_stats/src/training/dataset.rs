//! Training examples built from the model-ready table.

use burn::data::dataloader::batcher::Batcher;
use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};
use polars::prelude::*;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing::{info, warn};

use crate::{
    cleaning::{FEATURES, OUTCOME},
    error::TrainingError,
    table,
    types::Outcome,
};

/// One match: standardized-or-raw features and its class index.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchExample {
    pub features: Vec<f32>,
    pub label: usize,
}

/// Reads every complete row of the model-ready frame.
///
/// Rows with a missing or unparseable feature or label are dropped.
pub fn load_examples(frame: &DataFrame) -> Result<Vec<MatchExample>, TrainingError> {
    let mut columns: Vec<&str> = FEATURES.to_vec();
    columns.push(OUTCOME);
    let selected = table::select(frame, &columns)?
        .lazy()
        .with_columns(columns.iter().map(|c| col(*c).cast(DataType::Float64)).collect::<Vec<_>>())
        .collect()?;

    let values = columns
        .iter()
        .map(|c| selected.column(c)?.f64())
        .collect::<PolarsResult<Vec<&Float64Chunked>>>()?;
    let (label_column, feature_columns) = values.split_last().ok_or(TrainingError::NoRows)?;

    let examples: Vec<MatchExample> = (0..selected.height())
        .filter_map(|row| parse_row(feature_columns, label_column, row))
        .collect();

    let dropped = selected.height() - examples.len();
    if dropped > 0 {
        warn!("Dropped {} rows with missing features or label", dropped);
    }
    if examples.is_empty() {
        return Err(TrainingError::NoRows);
    }

    let counts = class_distribution(&examples);
    info!(
        "Loaded {} examples: {} home wins, {} draws, {} away wins",
        examples.len(),
        counts[0],
        counts[1],
        counts[2]
    );
    Ok(examples)
}

fn parse_row(features: &[&Float64Chunked], label: &Float64Chunked, row: usize) -> Option<MatchExample> {
    let features = features
        .iter()
        .map(|column| column.get(row).filter(|v| v.is_finite()).map(|v| v as f32))
        .collect::<Option<Vec<f32>>>()?;

    // Labels may have been written as floats by other tools
    let label = label.get(row).filter(|v| v.fract() == 0.0)?;
    let outcome = Outcome::from_label(label as i8)?;

    Some(MatchExample {
        features,
        label: outcome.class_index(),
    })
}

/// Number of examples per class index.
pub fn class_distribution(examples: &[MatchExample]) -> [usize; 3] {
    let mut counts = [0; 3];
    for example in examples {
        counts[example.label] += 1;
    }
    counts
}

/// Seeded shuffle split; the test side gets `ceil(n * test_ratio)` examples.
pub fn train_test_split(
    mut examples: Vec<MatchExample>,
    test_ratio: f64,
    seed: u64,
) -> (Vec<MatchExample>, Vec<MatchExample>) {
    let mut rng = StdRng::seed_from_u64(seed);
    examples.shuffle(&mut rng);

    let test_count = ((examples.len() as f64) * test_ratio).ceil() as usize;
    let test_count = test_count.min(examples.len());
    let train = examples.split_off(test_count);
    (train, examples)
}

/// Per-feature standardization fitted on the training partition.
#[derive(Debug, Clone, PartialEq)]
pub struct Scaler {
    pub mean: Vec<f32>,
    pub std: Vec<f32>,
}

impl Scaler {
    /// Population mean and standard deviation; a constant feature gets std 1.
    pub fn fit(examples: &[MatchExample]) -> Self {
        let dim = examples.first().map(|e| e.features.len()).unwrap_or(0);
        let n = examples.len().max(1) as f64;

        let mut sum = vec![0.0f64; dim];
        let mut sum_sq = vec![0.0f64; dim];
        for example in examples {
            for (j, &value) in example.features.iter().enumerate() {
                sum[j] += value as f64;
                sum_sq[j] += (value as f64) * (value as f64);
            }
        }

        let mean: Vec<f64> = sum.iter().map(|s| s / n).collect();
        let std = sum_sq
            .iter()
            .zip(&mean)
            .map(|(sq, m)| {
                let std = (sq / n - m * m).max(0.0).sqrt();
                if std == 0.0 {
                    1.0
                } else {
                    std as f32
                }
            })
            .collect();

        Scaler {
            mean: mean.into_iter().map(|m| m as f32).collect(),
            std,
        }
    }

    pub fn transform(&self, examples: &mut [MatchExample]) {
        for example in examples {
            for ((value, mean), std) in example.features.iter_mut().zip(&self.mean).zip(&self.std) {
                *value = (*value - mean) / std;
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct MatchBatch<B: Backend> {
    /// [batch, features]
    pub features: Tensor<B, 2>,
    /// Class indices: [batch]
    pub targets: Tensor<B, 1, Int>,
}

#[derive(Debug, Clone, Default)]
pub struct MatchBatcher;

impl MatchBatcher {
    pub fn tensors<B: Backend>(items: &[MatchExample], device: &B::Device) -> MatchBatch<B> {
        let batch_size = items.len();
        let dim = items.first().map(|e| e.features.len()).unwrap_or(FEATURES.len());

        let features: Vec<f32> = items.iter().flat_map(|e| e.features.iter().copied()).collect();
        let targets: Vec<i64> = items.iter().map(|e| e.label as i64).collect();

        MatchBatch {
            features: Tensor::<B, 1>::from_floats(features.as_slice(), device).reshape([batch_size, dim]),
            targets: Tensor::<B, 1, Int>::from_ints(targets.as_slice(), device),
        }
    }
}

impl<B: Backend> Batcher<B, MatchExample, MatchBatch<B>> for MatchBatcher {
    fn batch(&self, items: Vec<MatchExample>, device: &B::Device) -> MatchBatch<B> {
        Self::tensors(&items, device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    fn example(features: Vec<f32>, label: usize) -> MatchExample {
        MatchExample { features, label }
    }

    fn model_ready_columns() -> Vec<&'static str> {
        let mut columns: Vec<&str> = FEATURES.to_vec();
        columns.push(OUTCOME);
        columns
    }

    fn model_ready_rows(rows: usize) -> Vec<Vec<Option<String>>> {
        (0..rows)
            .map(|i| {
                let mut row: Vec<Option<String>> = (0..FEATURES.len()).map(|j| Some(format!("{}", i + j))).collect();
                row.push(Some(["-1", "0", "1"][i % 3].to_string()));
                row
            })
            .collect()
    }

    fn model_ready_frame(rows: Vec<Vec<Option<String>>>) -> DataFrame {
        table::from_rows(&model_ready_columns(), rows).unwrap()
    }

    #[test]
    fn test_split_sizes_are_stable() {
        let examples: Vec<MatchExample> = (0..10).map(|i| example(vec![i as f32], i % 3)).collect();

        let (train, test) = train_test_split(examples.clone(), 0.2, 42);
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);

        let (train_again, test_again) = train_test_split(examples, 0.2, 42);
        assert_eq!(train, train_again);
        assert_eq!(test, test_again);
    }

    #[test]
    fn test_split_rounds_test_count_up() {
        let examples: Vec<MatchExample> = (0..11).map(|i| example(vec![i as f32], 0)).collect();
        let (train, test) = train_test_split(examples, 0.2, 7);
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 8);
    }

    #[test]
    fn test_scaler_population_std_and_constant_feature() {
        let mut examples = vec![example(vec![1.0, 5.0], 0), example(vec![3.0, 5.0], 1)];
        let scaler = Scaler::fit(&examples);
        assert_eq!(scaler.mean, vec![2.0, 5.0]);
        assert_eq!(scaler.std, vec![1.0, 1.0]);

        scaler.transform(&mut examples);
        assert_eq!(examples[0].features, vec![-1.0, 0.0]);
        assert_eq!(examples[1].features, vec![1.0, 0.0]);
    }

    #[test]
    fn test_load_examples_remaps_labels_and_drops_incomplete() {
        let mut rows = model_ready_rows(3);
        let mut incomplete: Vec<Option<String>> = vec![Some("1".to_string()); FEATURES.len()];
        incomplete[4] = None;
        incomplete.push(Some("0".to_string()));
        rows.push(incomplete);
        let mut unparseable: Vec<Option<String>> = vec![Some("2".to_string()); FEATURES.len()];
        unparseable.push(Some("0.5".to_string()));
        rows.push(unparseable);

        let examples = load_examples(&model_ready_frame(rows)).unwrap();
        assert_eq!(examples.len(), 3);
        assert_eq!(examples.iter().map(|e| e.label).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(examples[0].features.len(), FEATURES.len());
        assert_eq!(class_distribution(&examples), [1, 1, 1]);
    }

    #[test]
    fn test_load_examples_requires_feature_columns() {
        let frame = table::from_rows(&["Corners_home", OUTCOME], Vec::new()).unwrap();
        assert!(matches!(load_examples(&frame), Err(TrainingError::Table(_))));
    }

    #[test]
    fn test_load_examples_without_usable_rows() {
        let frame = model_ready_frame(vec![vec![None; FEATURES.len() + 1]]);
        assert!(matches!(load_examples(&frame), Err(TrainingError::NoRows)));
    }

    #[test]
    fn test_ten_model_ready_rows_leave_two_for_testing() {
        let examples = load_examples(&model_ready_frame(model_ready_rows(10))).unwrap();
        assert_eq!(examples.len(), 10);

        let (train, test) = train_test_split(examples, 0.2, 42);
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);
    }

    #[test]
    fn test_batcher_shapes() {
        let device = Default::default();
        let items = vec![example(vec![0.5, 1.0, 1.5], 2), example(vec![0.0, 0.0, 0.0], 0)];
        let batch: MatchBatch<NdArray<f32>> = MatchBatcher.batch(items, &device);
        assert_eq!(batch.features.dims(), [2, 3]);
        assert_eq!(batch.targets.dims(), [2]);
    }
}
