use serde::Serialize;

use crate::entities::RideRequest;
use crate::error::{AppError, AppResult};
use crate::features::{FeatureRecord, TimeFeatures};
use crate::model::{predict_fare, FareModel};

#[derive(Debug, Clone, Serialize)]
pub struct FareEstimate {
    pub fare: f64,
    pub distance_km: f64,
    pub features: FeatureRecord,
}

/// Distance, time features, record assembly, inference.
/// A ride whose pickup and dropoff coincide is rejected before the model runs.
pub fn estimate_fare(model: &dyn FareModel, ride: &RideRequest) -> AppResult<FareEstimate> {
    for (label, point) in [("pickup", &ride.pickup), ("dropoff", &ride.dropoff)] {
        if !point.is_within_bounds() {
            tracing::warn!(
                point = label,
                longitude = point.longitude,
                latitude = point.latitude,
                "Coordinate outside geographic range"
            );
        }
    }

    let distance_km = ride.distance_km();
    if distance_km == 0.0 {
        return Err(AppError::SameLocation);
    }

    let time = TimeFeatures::from_datetime(ride.pickup_at);
    let features = FeatureRecord::assemble(ride.passenger_count, distance_km, &time);
    tracing::debug!(?features, hour = time.hour, weekday = %time.weekday, "Assembled features");

    let fare = predict_fare(model, &features)?;

    Ok(FareEstimate {
        fare,
        distance_km,
        features,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Coordinate;
    use crate::model::testing::{fixture_model, ConstantModel};
    use chrono::{NaiveDate, NaiveTime};

    fn ride(pickup: (f64, f64), dropoff: (f64, f64)) -> RideRequest {
        RideRequest::new(
            Coordinate::new(pickup.0, pickup.1),
            Coordinate::new(dropoff.0, dropoff.1),
            1,
            // Wednesday
            NaiveDate::from_ymd_opt(2015, 1, 7).unwrap(),
            NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_same_location_skips_model() {
        let model = ConstantModel::new(2.0);
        let point = (-73.985428, 40.748817);

        let result = estimate_fare(&model, &ride(point, point));

        assert!(matches!(result, Err(AppError::SameLocation)));
        assert_eq!(model.calls(), 0);
    }

    #[test]
    fn test_midtown_wednesday_afternoon() {
        let model = ConstantModel::new(2.0);

        let estimate = estimate_fare(&model, &ride((-73.985428, 40.748817), (-73.968370, 40.767940))).unwrap();

        assert!(estimate.distance_km > 2.0 && estimate.distance_km < 3.0);
        assert_eq!(estimate.features.is_day, 1);
        assert_eq!(estimate.features.is_night, 0);
        assert_eq!(estimate.features.days.wednesday, 1);
        assert_eq!(estimate.features.days.active_count(), 1);
        assert_eq!(estimate.features.passenger_count, 1);
        assert_eq!(estimate.fare, 2.0f64.exp());
        assert_eq!(model.calls(), 1);
    }

    #[test]
    fn test_with_tree_model() {
        let model = fixture_model();
        let ride = ride((-73.985428, 40.748817), (-73.968370, 40.767940));

        let estimate = estimate_fare(&model, &ride).unwrap();
        let raw = model.predict_raw(&estimate.features).unwrap();

        assert!(estimate.fare.is_finite() && estimate.fare > 0.0);
        assert!((estimate.fare.ln() - raw).abs() < 1e-9);
        assert!((raw - 2.25).abs() < 1e-5);
    }

    #[test]
    fn test_out_of_range_coordinates_still_priced() {
        let model = ConstantModel::new(1.0);
        let estimate = estimate_fare(&model, &ride((-250.0, 95.0), (-73.968370, 40.767940))).unwrap();
        assert!(estimate.distance_km.is_finite());
        assert_eq!(model.calls(), 1);
    }
}
