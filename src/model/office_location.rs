use crate::errors::LedgerError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct OfficeLocation {
    pub id: u64,
    #[schema(example = "Main Office")]
    pub name: String,
    #[schema(example = 23.8103)]
    pub latitude: f64,
    #[schema(example = 90.4125)]
    pub longitude: f64,
}

pub fn validate_latitude(latitude: f64) -> Result<(), LedgerError> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(LedgerError::Validation(format!(
            "latitude {} out of range [-90, 90]",
            latitude
        )));
    }
    Ok(())
}

pub fn validate_longitude(longitude: f64) -> Result<(), LedgerError> {
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(LedgerError::Validation(format!(
            "longitude {} out of range [-180, 180]",
            longitude
        )));
    }
    Ok(())
}

/// Range check before anything touches storage or the geofence math.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), LedgerError> {
    validate_latitude(latitude)?;
    validate_longitude(longitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bounds_inclusive() {
        assert!(validate_coordinates(90.0, 180.0).is_ok());
        assert!(validate_coordinates(-90.0, -180.0).is_ok());
        assert!(validate_coordinates(0.0, 0.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range_and_non_finite() {
        assert!(validate_coordinates(90.1, 0.0).is_err());
        assert!(validate_coordinates(0.0, -180.5).is_err());
        assert!(validate_coordinates(f64::NAN, 0.0).is_err());
        assert!(validate_coordinates(0.0, f64::INFINITY).is_err());
    }
}
