//! Match outcome classifier: example loading, network and training loop.

pub mod dataset;
pub mod model;
pub mod trainer;

pub use dataset::{class_distribution, load_examples, train_test_split, MatchExample, Scaler};
pub use model::{ClassifierConfig, OutcomeClassifier};
pub use trainer::{train_classifier, EpochStats, TrainingBackend, TrainingReport};
