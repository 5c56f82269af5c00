use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use super::time::{DayFlags, TimeFeatures};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("missing feature column `{0}`")]
    MissingColumn(String),

    #[error("feature column `{0}` must be a number")]
    NotNumeric(&'static str),

    #[error("feature column `{column}` expects a small non-negative integer, got {value}")]
    InvalidValue { column: &'static str, value: f64 },
}

/// Model input row. Field order is the column order the model was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureRecord {
    pub passenger_count: u8,
    pub is_night: u8,
    pub is_day: u8,
    pub distance: f64,
    #[serde(flatten)]
    pub days: DayFlags,
}

impl FeatureRecord {
    pub const WIDTH: usize = 11;

    pub const COLUMNS: [&'static str; Self::WIDTH] = [
        "passenger_count",
        "is_night",
        "is_day",
        "distance",
        "day_Friday",
        "day_Monday",
        "day_Saturday",
        "day_Sunday",
        "day_Thursday",
        "day_Tuesday",
        "day_Wednesday",
    ];

    pub fn assemble(passenger_count: u8, distance: f64, time: &TimeFeatures) -> Self {
        Self {
            passenger_count,
            is_night: time.is_night,
            is_day: time.is_day,
            distance,
            days: time.days,
        }
    }

    /// Rebuilds a record from a name -> value mapping in any order.
    /// Unknown keys are ignored.
    pub fn from_mapping(features: &HashMap<String, Value>) -> Result<Self, SchemaError> {
        let lookup = |column: &'static str| -> Result<f64, SchemaError> {
            features
                .get(column)
                .ok_or_else(|| SchemaError::MissingColumn(column.to_string()))?
                .as_f64()
                .ok_or(SchemaError::NotNumeric(column))
        };
        let integer = |column: &'static str| -> Result<u8, SchemaError> {
            let value = lookup(column)?;
            if value.fract() != 0.0 || !(0.0..=f64::from(u8::MAX)).contains(&value) {
                return Err(SchemaError::InvalidValue { column, value });
            }
            Ok(value as u8)
        };

        Ok(Self {
            passenger_count: integer("passenger_count")?,
            is_night: integer("is_night")?,
            is_day: integer("is_day")?,
            distance: lookup("distance")?,
            days: DayFlags {
                friday: integer("day_Friday")?,
                monday: integer("day_Monday")?,
                saturday: integer("day_Saturday")?,
                sunday: integer("day_Sunday")?,
                thursday: integer("day_Thursday")?,
                tuesday: integer("day_Tuesday")?,
                wednesday: integer("day_Wednesday")?,
            },
        })
    }

    /// Values in `COLUMNS` order
    pub fn to_row(&self) -> [f64; Self::WIDTH] {
        let [fri, mon, sat, sun, thu, tue, wed] = self.days.to_array().map(f64::from);
        [
            f64::from(self.passenger_count),
            f64::from(self.is_night),
            f64::from(self.is_day),
            self.distance,
            fri,
            mon,
            sat,
            sun,
            thu,
            tue,
            wed,
        ]
    }
}
