//! Great-circle distance for nearest-first sauna sorting.

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two coordinates, in kilometers.
pub fn distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        assert!(distance_km(35.68, 139.76, 35.68, 139.76) < 1e-9);
    }

    #[test]
    fn test_tokyo_to_osaka() {
        // Tokyo Station to Osaka Station is roughly 400 km.
        let d = distance_km(35.681, 139.767, 34.702, 135.495);
        assert!((390.0..420.0).contains(&d), "got {}", d);
    }

    #[test]
    fn test_symmetry() {
        let a = distance_km(35.0, 139.0, 34.0, 135.0);
        let b = distance_km(34.0, 135.0, 35.0, 139.0);
        assert!((a - b).abs() < 1e-9);
    }
}
