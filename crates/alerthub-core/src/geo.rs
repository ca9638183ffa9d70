//! Great-circle distance and neighborhood lookup.

use alerthub_types::geo::Coordinates;
use alerthub_types::heatmap::Neighborhood;

/// Mean Earth radius in miles.
const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Haversine distance between two points, in miles, rounded to 2 decimals.
pub fn distance_miles(from: &Coordinates, to: &Coordinates) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (to.longitude - from.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    round_to(EARTH_RADIUS_MILES * c, 2)
}

/// First neighborhood (in the given order) whose bounds contain `point`.
pub fn locate_neighborhood<'a>(
    neighborhoods: &'a [Neighborhood],
    point: &Coordinates,
) -> Option<&'a Neighborhood> {
    neighborhoods.iter().find(|n| n.bounds.contains(point))
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
