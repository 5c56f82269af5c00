//! Fare model handle and the inference adapter around it.
//!
//! The model is trained on `ln(fare)`, so [`predict_fare`] maps its raw
//! output back to currency with `exp`.

pub mod xgboost;

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::features::FeatureRecord;

pub use xgboost::XgbModel;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to read model at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid model parameter `{name}`: {value}")]
    InvalidParam { name: &'static str, value: String },

    #[error("unsupported objective `{0}`")]
    UnsupportedObjective(String),

    #[error("model schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("malformed tree {tree}: {reason}")]
    MalformedTree { tree: usize, reason: String },

    #[error("model produced a non-finite fare ({0})")]
    NonFiniteOutput(f64),
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub booster: String,
    pub objective: String,
    pub num_trees: usize,
    pub num_features: usize,
    pub base_score: f32,
}

/// A trained regressor over [`FeatureRecord`] rows.
pub trait FareModel: Send + Sync {
    /// Prediction in the space the model was trained in (log fare)
    fn predict_raw(&self, record: &FeatureRecord) -> Result<f64, ModelError>;

    fn info(&self) -> ModelInfo;
}

/// Loads the model artifact. Any error here is fatal for the service.
pub fn load(path: impl AsRef<Path>) -> Result<Arc<dyn FareModel>, ModelError> {
    let model = XgbModel::load(path)?;
    Ok(Arc::new(model))
}

/// Runs the model and inverts the log transform on its output.
pub fn predict_fare(model: &dyn FareModel, record: &FeatureRecord) -> Result<f64, ModelError> {
    let raw = model.predict_raw(record)?;
    let fare = raw.exp();

    if !fare.is_finite() {
        return Err(ModelError::NonFiniteOutput(fare));
    }

    Ok(fare)
}
