//! Geofence validation - Decides whether a position lies inside a location's area.
//!
//! Distances are great-circle distances on a spherical Earth (haversine formula).
//! Everything here is pure; callers pass the location model they already loaded.

use crate::{
    entities::location,
    errors::{Error, Result},
};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Result of checking a position against a location's geofence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaStatus {
    /// Position is within the radius (boundary included)
    InArea,
    /// Position is farther than the radius
    OutOfArea,
}

/// Great-circle distance in meters between two coordinates given in degrees.
#[must_use]
pub fn distance_meters(latitude: f64, longitude: f64, other_latitude: f64, other_longitude: f64) -> f64 {
    let lat1 = latitude.to_radians();
    let lat2 = other_latitude.to_radians();
    let delta_lat = (other_latitude - latitude).to_radians();
    let delta_lng = (other_longitude - longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Returns true iff the position is at most `radius_meters` away from the location centre.
#[must_use]
pub fn is_within_area(
    latitude: f64,
    longitude: f64,
    location_latitude: f64,
    location_longitude: f64,
    radius_meters: f64,
) -> bool {
    distance_meters(latitude, longitude, location_latitude, location_longitude) <= radius_meters
}

/// Rejects latitudes outside `[-90, 90]`, longitudes outside `[-180, 180]` and non-finite values.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    let valid = latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude);

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidCoordinates {
            latitude,
            longitude,
        })
    }
}

/// Reports whether the position is inside the location's geofence without failing on distance.
pub fn in_area_status(location: &location::Model, latitude: f64, longitude: f64) -> Result<AreaStatus> {
    validate_coordinates(latitude, longitude)?;

    if is_within_area(
        latitude,
        longitude,
        location.latitude,
        location.longitude,
        location.radius_meters,
    ) {
        Ok(AreaStatus::InArea)
    } else {
        Ok(AreaStatus::OutOfArea)
    }
}

/// Fails with [`Error::OutOfArea`] unless the position is inside the geofence.
pub(crate) fn ensure_within_area(
    location: &location::Model,
    latitude: f64,
    longitude: f64,
) -> Result<()> {
    validate_coordinates(latitude, longitude)?;

    let distance = distance_meters(latitude, longitude, location.latitude, location.longitude);
    if distance <= location.radius_meters {
        Ok(())
    } else {
        Err(Error::OutOfArea {
            distance_meters: distance,
            radius_meters: location.radius_meters,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_same_point_is_inside_zero_radius() {
        assert_eq!(distance_meters(-6.2, 106.8, -6.2, 106.8), 0.0);
        assert!(is_within_area(-6.2, 106.8, -6.2, 106.8, 0.0));
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let d = distance_meters(-6.2000, 106.8000, -6.2009, 106.8000);
        assert!(d > 90.0 && d < 110.0, "one thousandth of a degree is about 100 m, got {d}");

        assert!(is_within_area(-6.2000, 106.8000, -6.2009, 106.8000, d));
        assert!(!is_within_area(-6.2000, 106.8000, -6.2009, 106.8000, d - 0.01));
    }

    #[test]
    fn test_known_distance() {
        // One degree of latitude along a meridian
        let d = distance_meters(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_194.9).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_invalid_coordinates() {
        let err = validate_coordinates(91.0, 0.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(validate_coordinates(0.0, -180.5).is_err());
        assert!(validate_coordinates(f64::NAN, 0.0).is_err());
        assert!(validate_coordinates(-90.0, 180.0).is_ok());
    }
}
