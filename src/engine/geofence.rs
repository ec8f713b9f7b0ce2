use crate::model::office_location::OfficeLocation;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates (haversine).
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeofenceMiss {
    pub nearest: String,
    pub distance_km: f64,
    pub overshoot_km: f64,
}

#[derive(Debug)]
pub enum GeofenceOutcome<'a> {
    /// First office within the radius, in configured order.
    Inside(&'a OfficeLocation),
    /// No office in range; carries the nearest one for the error message.
    Outside(GeofenceMiss),
    NoOffices,
}

/// Evaluates a fix against every configured office. Offices are tried in
/// configured order and the first one within `radius_km` wins, not the
/// nearest one.
pub fn evaluate<'a>(
    offices: &'a [OfficeLocation],
    latitude: f64,
    longitude: f64,
    radius_km: f64,
) -> GeofenceOutcome<'a> {
    let mut nearest: Option<(&OfficeLocation, f64)> = None;

    for office in offices {
        let distance = haversine_km(latitude, longitude, office.latitude, office.longitude);
        if distance <= radius_km {
            return GeofenceOutcome::Inside(office);
        }
        if nearest.map_or(true, |(_, d)| distance < d) {
            nearest = Some((office, distance));
        }
    }

    match nearest {
        Some((office, distance)) => GeofenceOutcome::Outside(GeofenceMiss {
            nearest: office.name.clone(),
            distance_km: distance,
            overshoot_km: distance - radius_km,
        }),
        None => GeofenceOutcome::NoOffices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn office(id: u64, name: &str, lat: f64, lon: f64) -> OfficeLocation {
        OfficeLocation {
            id,
            name: name.into(),
            latitude: lat,
            longitude: lon,
        }
    }

    #[test]
    fn zero_distance_for_identical_points() {
        assert!(haversine_km(23.8103, 90.4125, 23.8103, 90.4125) < 1e-9);
    }

    #[test]
    fn known_city_pair_distance() {
        // Dhaka to Chittagong, roughly 214 km great-circle.
        let d = haversine_km(23.8103, 90.4125, 22.3569, 91.7832);
        assert!((205.0..225.0).contains(&d), "got {}", d);
    }

    #[test]
    fn first_office_in_range_wins_regardless_of_list_order() {
        // Far office listed first; only the near one is within 2 km.
        let offices = vec![
            office(1, "Far Office", 24.8103, 90.4125),
            office(2, "Main Office", 23.8103, 90.4125),
        ];
        match evaluate(&offices, 23.8193, 90.4125, 2.0) {
            GeofenceOutcome::Inside(o) => assert_eq!(o.name, "Main Office"),
            other => panic!("expected Inside, got {:?}", other),
        }
    }

    #[test]
    fn miss_reports_nearest_office_and_overshoot() {
        let offices = vec![
            office(1, "Far Office", 24.8103, 90.4125),
            office(2, "Main Office", 23.8103, 90.4125),
        ];
        // About 5.5 km north of Main Office.
        match evaluate(&offices, 23.86, 90.4125, 2.0) {
            GeofenceOutcome::Outside(miss) => {
                assert_eq!(miss.nearest, "Main Office");
                assert!(miss.distance_km > 2.0);
                assert!((miss.overshoot_km - (miss.distance_km - 2.0)).abs() < 1e-9);
            }
            other => panic!("expected Outside, got {:?}", other),
        }
    }

    #[test]
    fn empty_office_list_is_its_own_outcome() {
        assert!(matches!(
            evaluate(&[], 23.8, 90.4, 2.0),
            GeofenceOutcome::NoOffices
        ));
    }
}
