use crate::models::{BoundingBox, Coordinates, RoutePoint};

/// Cumulative elevation gain and loss along a path, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElevationTotals {
    pub ascent_m: f64,
    pub descent_m: f64,
}

/// Walk the path in order and accumulate elevation changes between
/// consecutive points. A pair only counts when both points carry elevation.
pub fn compute_ascent_descent(points: &[RoutePoint]) -> ElevationTotals {
    points
        .windows(2)
        .filter_map(|w| Some(w[1].elevation? - w[0].elevation?))
        .fold(ElevationTotals::default(), |mut totals, delta| {
            if delta > 0.0 {
                totals.ascent_m += delta;
            } else {
                totals.descent_m -= delta;
            }
            totals
        })
}

/// Distance from `origin` to a route point, in meters
pub fn distance_to_point_m(origin: &Coordinates, point: &RoutePoint) -> f64 {
    origin.distance_m(&point.coordinates())
}

/// Radius of a circle whose circumference equals the target distance
pub fn expected_radius_m(target_distance_m: f64) -> f64 {
    target_distance_m / std::f64::consts::TAU
}

/// Whether the box sprawls further than `factor` expected radii
pub fn bbox_exceeds(bbox: &BoundingBox, target_distance_m: f64, factor: f64) -> bool {
    bbox.diagonal_m() > factor * expected_radius_m(target_distance_m)
}
