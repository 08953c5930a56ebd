//! Distance and travel-time estimates between venues.

/// Mean earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Walking pace, meters per minute
const WALKING_SPEED_M_PER_MIN: f64 = 67.0;

/// Mixed transit pace, meters per minute
const TRANSIT_SPEED_M_PER_MIN: f64 = 250.0;

/// Distances up to this are walked
pub const WALKING_LIMIT_M: f64 = 500.0;

/// Great-circle distance in meters between two `(latitude, longitude)` points.
pub fn haversine_distance_m(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lng1) = (from.0.to_radians(), from.1.to_radians());
    let (lat2, lng2) = (to.0.to_radians(), to.1.to_radians());

    let dlat = lat2 - lat1;
    let dlng = lng2 - lng1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Estimated travel time in whole minutes for a distance in meters.
///
/// Short hops are walked. Longer ones use the transit pace, but never come
/// out quicker than walking the full walking limit.
pub fn estimate_travel_minutes(distance_m: f64) -> u32 {
    if !distance_m.is_finite() || distance_m <= 0.0 {
        return 0;
    }

    if distance_m <= WALKING_LIMIT_M {
        (distance_m / WALKING_SPEED_M_PER_MIN).ceil() as u32
    } else {
        let transit = (distance_m / TRANSIT_SPEED_M_PER_MIN).ceil() as u32;
        transit.max(walking_limit_minutes())
    }
}

fn walking_limit_minutes() -> u32 {
    (WALKING_LIMIT_M / WALKING_SPEED_M_PER_MIN).ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_zero_distance() {
        let p = (37.5445, 127.0557);
        assert_eq!(haversine_distance_m(p, p), 0.0);
    }

    #[test]
    fn test_haversine_known_distance() {
        // One thousandth of a degree of latitude is about 111 m
        let d = haversine_distance_m((37.500, 127.000), (37.501, 127.000));
        assert!((d - 111.19).abs() < 0.5, "got {}", d);

        // Seoul City Hall to Gangnam Station, roughly 8.9 km
        let d = haversine_distance_m((37.5663, 126.9779), (37.4979, 127.0276));
        assert!((8_500.0..9_300.0).contains(&d), "got {}", d);
    }

    #[test]
    fn test_travel_minutes_walking() {
        assert_eq!(estimate_travel_minutes(0.0), 0);
        assert_eq!(estimate_travel_minutes(67.0), 1);
        assert_eq!(estimate_travel_minutes(68.0), 2);
        assert_eq!(estimate_travel_minutes(500.0), 8);
    }

    #[test]
    fn test_travel_minutes_transit() {
        assert_eq!(estimate_travel_minutes(2_500.0), 10);
        assert_eq!(estimate_travel_minutes(5_001.0), 21);
        // Floored at the walking limit
        assert_eq!(estimate_travel_minutes(501.0), 8);
        assert_eq!(estimate_travel_minutes(1_500.0), 8);
    }

    #[test]
    fn test_travel_minutes_monotonic() {
        let mut previous = 0;
        let mut d = 0.0;
        while d < 20_000.0 {
            let minutes = estimate_travel_minutes(d);
            assert!(minutes >= previous, "dropped at {} m", d);
            previous = minutes;
            d += 7.5;
        }
    }
}
