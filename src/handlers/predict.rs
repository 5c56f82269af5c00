use std::collections::HashMap;

use axum::extract::State;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::entities::{Coordinate, RideRequest};
use crate::error::{AppError, AppResult};
use crate::extract::Json;
use crate::fare::estimate_fare;
use crate::features::FeatureRecord;
use crate::model::predict_fare;
use crate::AppState;

pub const MIN_PASSENGERS: u8 = 1;
pub const MAX_PASSENGERS: u8 = 6;

fn earliest_pickup_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2009, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn latest_pickup_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 12, 31).unwrap_or(NaiveDate::MAX)
}

fn default_passenger_count() -> u8 {
    1
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub pickup_longitude: f64,
    pub pickup_latitude: f64,
    pub dropoff_longitude: f64,
    pub dropoff_latitude: f64,
    #[serde(default = "default_passenger_count")]
    pub passenger_count: u8,
    pub pickup_date: NaiveDate,
    pub pickup_time: NaiveTime,
}

impl PredictRequest {
    /// Applies the limits the input form enforces
    pub fn into_ride(self) -> AppResult<RideRequest> {
        if !(MIN_PASSENGERS..=MAX_PASSENGERS).contains(&self.passenger_count) {
            return Err(AppError::BadRequest(format!(
                "Passenger count must be between {} and {}",
                MIN_PASSENGERS, MAX_PASSENGERS
            )));
        }

        let (earliest, latest) = (earliest_pickup_date(), latest_pickup_date());
        if self.pickup_date < earliest || self.pickup_date > latest {
            return Err(AppError::BadRequest(format!(
                "Pickup date must be between {} and {}",
                earliest, latest
            )));
        }

        Ok(RideRequest::new(
            Coordinate::new(self.pickup_longitude, self.pickup_latitude),
            Coordinate::new(self.dropoff_longitude, self.dropoff_latitude),
            self.passenger_count,
            self.pickup_date,
            self.pickup_time,
        ))
    }
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub id: Uuid,
    pub fare: f64,
    pub distance_km: f64,
    pub fare_display: String,
    pub distance_display: String,
    pub features: FeatureRecord,
}

#[derive(Debug, Serialize)]
pub struct FeaturePredictResponse {
    pub id: Uuid,
    pub fare: f64,
    pub fare_display: String,
    pub features: FeatureRecord,
}

fn format_fare(fare: f64) -> String {
    format!("${:.2}", fare)
}

/// Predict the fare for a ride
pub async fn predict(
    State(state): State<AppState>,
    Json(payload): Json<PredictRequest>,
) -> AppResult<Json<PredictResponse>> {
    let id = Uuid::new_v4();
    let ride = payload.into_ride()?;

    let estimate = estimate_fare(state.model.as_ref(), &ride).inspect_err(|e| {
        if matches!(e, AppError::SameLocation) {
            tracing::info!(prediction_id = %id, "Pickup and dropoff coincide, no fare computed");
        }
    })?;

    tracing::info!(
        prediction_id = %id,
        passengers = ride.passenger_count,
        pickup_at = %ride.pickup_at,
        distance_km = estimate.distance_km,
        fare = estimate.fare,
        "Fare predicted"
    );

    Ok(Json(PredictResponse {
        id,
        fare: estimate.fare,
        distance_km: estimate.distance_km,
        fare_display: format_fare(estimate.fare),
        distance_display: format!("{:.2} km", estimate.distance_km),
        features: estimate.features,
    }))
}

/// Predict from an already engineered feature mapping, keys in any order
pub async fn predict_features(
    State(state): State<AppState>,
    Json(payload): Json<HashMap<String, Value>>,
) -> AppResult<Json<FeaturePredictResponse>> {
    let id = Uuid::new_v4();
    let features = FeatureRecord::from_mapping(&payload)?;
    let fare = predict_fare(state.model.as_ref(), &features)?;

    tracing::info!(prediction_id = %id, fare, "Fare predicted from raw features");

    Ok(Json(FeaturePredictResponse {
        id,
        fare,
        fare_display: format_fare(fare),
        features,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(passenger_count: u8, date: &str) -> PredictRequest {
        PredictRequest {
            pickup_longitude: -73.985428,
            pickup_latitude: 40.748817,
            dropoff_longitude: -73.968370,
            dropoff_latitude: 40.767940,
            passenger_count,
            pickup_date: date.parse().unwrap(),
            pickup_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_passenger_limits() {
        assert!(request(1, "2015-01-07").into_ride().is_ok());
        assert!(request(6, "2015-01-07").into_ride().is_ok());
        assert!(matches!(request(0, "2015-01-07").into_ride(), Err(AppError::BadRequest(_))));
        assert!(matches!(request(7, "2015-01-07").into_ride(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_pickup_date_limits() {
        assert!(request(1, "2009-01-01").into_ride().is_ok());
        assert!(request(1, "2030-12-31").into_ride().is_ok());
        assert!(request(1, "2008-12-31").into_ride().is_err());
        assert!(request(1, "2031-01-01").into_ride().is_err());
    }

    #[test]
    fn test_passenger_count_defaults_to_one() {
        let payload: PredictRequest = serde_json::from_str(
            r#"{
                "pickup_longitude": -73.985428,
                "pickup_latitude": 40.748817,
                "dropoff_longitude": -73.96837,
                "dropoff_latitude": 40.76794,
                "pickup_date": "2015-01-01",
                "pickup_time": "08:15:00"
            }"#,
        )
        .unwrap();
        assert_eq!(payload.passenger_count, 1);
    }

    #[test]
    fn test_format_fare() {
        assert_eq!(format_fare(9.4877), "$9.49");
        assert_eq!(format_fare(12.0), "$12.00");
    }
}
