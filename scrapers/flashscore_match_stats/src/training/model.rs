//! Feed-forward outcome classifier.
//!
//! Architecture: Input → Linear(hidden) → ReLU → Dropout
//!                     → Linear(hidden) → ReLU → Dropout
//!                     → Linear(3) logits

use burn::module::Module;
use burn::nn::{Dropout, DropoutConfig, Linear, LinearConfig};
use burn::tensor::activation::relu;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::{cleaning::FEATURES, config::TrainingConfig};

pub const NUM_CLASSES: usize = 3;

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub input_dim: usize,
    pub hidden_dim: usize,
    pub dropout: f64,
}

impl ClassifierConfig {
    pub fn from_training(input_dim: usize, config: &TrainingConfig) -> Self {
        ClassifierConfig {
            input_dim,
            hidden_dim: config.hidden_dim,
            dropout: config.dropout,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            input_dim: FEATURES.len(),
            hidden_dim: 32,
            dropout: 0.5,
        }
    }
}

#[derive(Module, Debug)]
pub struct OutcomeClassifier<B: Backend> {
    fc1: Linear<B>,
    fc2: Linear<B>,
    fc3: Linear<B>,
    dropout: Dropout,
}

impl<B: Backend> OutcomeClassifier<B> {
    pub fn new(device: &B::Device, config: &ClassifierConfig) -> Self {
        OutcomeClassifier {
            fc1: LinearConfig::new(config.input_dim, config.hidden_dim).init(device),
            fc2: LinearConfig::new(config.hidden_dim, config.hidden_dim).init(device),
            fc3: LinearConfig::new(config.hidden_dim, NUM_CLASSES).init(device),
            dropout: DropoutConfig::new(config.dropout).init(),
        }
    }

    /// Class logits: [batch, 3]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.dropout.forward(relu(self.fc1.forward(features)));
        let x = self.dropout.forward(relu(self.fc2.forward(x)));
        self.fc3.forward(x)
    }
}
