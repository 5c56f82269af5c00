pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate distance between two coordinates using Haversine formula
/// Returns distance in kilometers
pub fn haversine_distance(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = lat2_rad - lat1_rad;
    let delta_lon = lon2.to_radians() - lon1.to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Whether a point lies inside the valid longitude/latitude ranges
pub fn is_within_bounds(longitude: f64, latitude: f64) -> bool {
    (-180.0..=180.0).contains(&longitude) && (-90.0..=90.0).contains(&latitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPIRE_STATE: (f64, f64) = (-73.985428, 40.748817);
    const CENTRAL_PARK_SOUTH: (f64, f64) = (-73.968370, 40.767940);

    #[test]
    fn test_haversine_same_point_is_zero() {
        let points = [EMPIRE_STATE, CENTRAL_PARK_SOUTH, (0.0, 0.0), (179.9, -89.5)];
        for (lon, lat) in points {
            assert_eq!(haversine_distance(lon, lat, lon, lat), 0.0);
        }
    }

    #[test]
    fn test_haversine_symmetric() {
        let (a, b) = (EMPIRE_STATE, CENTRAL_PARK_SOUTH);
        let there = haversine_distance(a.0, a.1, b.0, b.1);
        let back = haversine_distance(b.0, b.1, a.0, a.1);
        assert!((there - back).abs() < 1e-12);
    }

    #[test]
    fn test_haversine_manhattan_short_hop() {
        let (a, b) = (EMPIRE_STATE, CENTRAL_PARK_SOUTH);
        let distance = haversine_distance(a.0, a.1, b.0, b.1);
        // A couple of kilometres up Midtown
        assert!(distance > 2.0 && distance < 3.0, "got {distance}");
    }

    #[test]
    fn test_haversine_jakarta_bandung() {
        // (lon, lat)
        let jakarta = (106.8456, -6.2088);
        let bandung = (107.6191, -6.9175);

        let distance = haversine_distance(jakarta.0, jakarta.1, bandung.0, bandung.1);
        // Should be approximately 120-130 km
        assert!(distance > 100.0 && distance < 150.0);
    }

    #[test]
    fn test_haversine_quarter_meridian() {
        let distance = haversine_distance(0.0, 0.0, 0.0, 90.0);
        let expected = EARTH_RADIUS_KM * std::f64::consts::FRAC_PI_2;
        assert!((distance - expected).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_is_still_computed() {
        let distance = haversine_distance(-200.0, 95.0, 10.0, 10.0);
        assert!(distance.is_finite());
        assert!(!is_within_bounds(-200.0, 95.0));
        assert!(is_within_bounds(EMPIRE_STATE.0, EMPIRE_STATE.1));
    }
}
