use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use crate::utils::geo::{haversine_distance, is_within_bounds};

/// A point in degrees. Ranges are not enforced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinate {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self { longitude, latitude }
    }

    /// Great-circle distance in kilometers
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        haversine_distance(self.longitude, self.latitude, other.longitude, other.latitude)
    }

    pub fn is_within_bounds(&self) -> bool {
        is_within_bounds(self.longitude, self.latitude)
    }
}

/// One ride to be priced. Lives only for the duration of a request.
#[derive(Debug, Clone, PartialEq)]
pub struct RideRequest {
    pub pickup: Coordinate,
    pub dropoff: Coordinate,
    pub passenger_count: u8,
    /// Naive local time, exactly as entered
    pub pickup_at: NaiveDateTime,
}

impl RideRequest {
    pub fn new(
        pickup: Coordinate,
        dropoff: Coordinate,
        passenger_count: u8,
        pickup_date: NaiveDate,
        pickup_time: NaiveTime,
    ) -> Self {
        Self {
            pickup,
            dropoff,
            passenger_count,
            pickup_at: pickup_date.and_time(pickup_time),
        }
    }

    pub fn distance_km(&self) -> f64 {
        self.pickup.distance_to(&self.dropoff)
    }
}
