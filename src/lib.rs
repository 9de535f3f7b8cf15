pub mod data;
pub mod model;
pub mod training;

pub use model::{DigitClassifier, Mlp, MlpConfig, MlpStack};
