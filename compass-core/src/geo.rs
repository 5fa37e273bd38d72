//! Great-circle distance and bearing.

use crate::heading::normalize;
use crate::types::Location;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points, in kilometres.
#[must_use]
pub fn distance_km(from: &Location, to: &Location) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let s_lat = libm::sin(d_lat / 2.0);
    let s_lon = libm::sin(d_lon / 2.0);
    let a = s_lat * s_lat + libm::cos(lat1) * libm::cos(lat2) * s_lon * s_lon;
    let c = 2.0 * libm::atan2(libm::sqrt(a), libm::sqrt(1.0 - a));
    EARTH_RADIUS_KM * c
}

/// Initial great-circle bearing from `from` to `to`, degrees clockwise from
/// true north in `[0, 360)`.
#[must_use]
pub fn bearing_deg(from: &Location, to: &Location) -> f32 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let y = libm::sin(d_lon) * libm::cos(lat2);
    let x = libm::cos(lat1) * libm::sin(lat2) - libm::sin(lat1) * libm::cos(lat2) * libm::cos(d_lon);
    normalize(libm::atan2(y, x).to_degrees() as f32)
}

/// Pointer angle on the matrix for "walk toward `target`".
///
/// The display's zero is due south, so the great-circle bearing is mirrored
/// through 180° before the current heading is subtracted.
#[must_use]
pub fn pointer_angle(current: &Location, target: &Location, heading: f32) -> f32 {
    let bearing = normalize(180.0 - bearing_deg(current, target));
    normalize(heading - bearing)
}
