//! Engineered inputs for the fare model.

pub mod record;
pub mod time;

pub use record::{FeatureRecord, SchemaError};
pub use time::{DayFlags, TimeFeatures};
