use super::geometry::{bbox_exceeds, distance_to_point_m};
use crate::config::RouteGeneratorConfig;
use crate::constants::*;
use crate::models::{Coordinates, HillinessPreference, HillinessRanges, RouteCandidate};

/// Acceptance limits for one scoring pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringThresholds {
    /// Deviation from the target (as a fraction of it) that costs nothing
    pub tolerance_fraction: f64,
    /// Max bbox diagonal, in multiples of the expected loop radius
    pub bbox_factor: f64,
    /// Max distance from the origin to the route's first and last point
    pub start_end_max_m: f64,
}

impl ScoringThresholds {
    pub fn strict(config: &RouteGeneratorConfig) -> Self {
        ScoringThresholds {
            tolerance_fraction: config.distance_tolerance_fraction,
            bbox_factor: config.bbox_diagonal_max_factor,
            start_end_max_m: config.start_end_max_distance_m,
        }
    }

    /// Same start/end limit as the strict pass; only tolerance and bbox loosen.
    pub fn relaxed(config: &RouteGeneratorConfig) -> Self {
        ScoringThresholds {
            tolerance_fraction: config.relaxed_distance_tolerance_fraction,
            bbox_factor: config.relaxed_bbox_diagonal_max_factor,
            start_end_max_m: config.start_end_max_distance_m,
        }
    }
}

impl Default for ScoringThresholds {
    fn default() -> Self {
        ScoringThresholds {
            tolerance_fraction: DEFAULT_DISTANCE_TOLERANCE_FRACTION,
            bbox_factor: DEFAULT_BBOX_DIAGONAL_MAX_FACTOR,
            start_end_max_m: DEFAULT_START_END_MAX_DISTANCE_M,
        }
    }
}

/// What the caller asked for, shared by every candidate in a batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringContext {
    pub preference: HillinessPreference,
    pub target_distance_m: f64,
    pub origin: Coordinates,
}

/// Percentage off target, or 0 inside the tolerance band (inclusive).
pub fn distance_deviation(distance_m: f64, target_distance_m: f64, tolerance_fraction: f64) -> f64 {
    let tolerance = tolerance_fraction * target_distance_m;
    let error = (distance_m - target_distance_m).abs();
    if error <= tolerance {
        0.0
    } else {
        error / target_distance_m * 100.0
    }
}

/// Fitness function for round-trip candidates. Lower is better;
/// `f64::INFINITY` means the candidate is rejected.
#[derive(Debug, Clone, Default)]
pub struct RouteScorer {
    ranges: HillinessRanges,
}

impl RouteScorer {
    pub fn new(ranges: HillinessRanges) -> Self {
        RouteScorer { ranges }
    }

    /// Score one candidate. Pure: the candidate is not modified.
    pub fn score(
        &self,
        candidate: &RouteCandidate,
        context: &ScoringContext,
        thresholds: &ScoringThresholds,
    ) -> f64 {
        let deviation = distance_deviation(
            candidate.distance_m,
            context.target_distance_m,
            thresholds.tolerance_fraction,
        );

        let score = match context.preference {
            // Ascent dominates; distance deviation only breaks ties
            HillinessPreference::NoHill => candidate.ascent_per_km * FLAT_ASCENT_WEIGHT + deviation,
            preference => {
                let midpoint = self.ranges.get(preference).midpoint;
                (candidate.ascent_per_km - midpoint).abs() + deviation
            }
        };

        if Self::is_rejected(candidate, context, thresholds) {
            return f64::INFINITY;
        }

        score
    }

    /// Hard rejection rules, independent of preference.
    fn is_rejected(
        candidate: &RouteCandidate,
        context: &ScoringContext,
        thresholds: &ScoringThresholds,
    ) -> bool {
        let (Some(first), Some(last)) = (candidate.geometry.first(), candidate.geometry.last())
        else {
            return true;
        };

        let start_m = distance_to_point_m(&context.origin, first);
        let end_m = distance_to_point_m(&context.origin, last);
        if start_m > thresholds.start_end_max_m || end_m > thresholds.start_end_max_m {
            tracing::trace!(
                seed = candidate.seed,
                start_m = %format!("{:.0}", start_m),
                end_m = %format!("{:.0}", end_m),
                "Seed {} rejected: starts {:.0}m / ends {:.0}m from origin",
                candidate.seed, start_m, end_m
            );
            return true;
        }

        if bbox_exceeds(
            &candidate.bbox,
            context.target_distance_m,
            thresholds.bbox_factor,
        ) {
            tracing::trace!(
                seed = candidate.seed,
                diagonal_m = %format!("{:.0}", candidate.bbox.diagonal_m()),
                "Seed {} rejected: bbox diagonal {:.0}m too large",
                candidate.seed, candidate.bbox.diagonal_m()
            );
            return true;
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BoundingBox, LineString, RoutePoint};

    const ORIGIN_LAT: f64 = 37.7749;
    const ORIGIN_LNG: f64 = -122.4194;
    const TARGET_DISTANCE: f64 = 2000.0;

    fn make_candidate(ascent_per_km: f64) -> RouteCandidate {
        RouteCandidate {
            seed: 1,
            distance_m: 2000.0,
            duration_s: 1500.0,
            ascent_m: 10.0,
            descent_m: 10.0,
            ascent_per_km,
            geometry: LineString::new(vec![
                RoutePoint::with_elevation(-122.4194, 37.7749, 10.0),
                RoutePoint::with_elevation(-122.4190, 37.7755, 12.0),
                RoutePoint::with_elevation(-122.4194, 37.7749, 10.0),
            ]),
            bbox: BoundingBox::new(-122.4200, 37.7745, -122.4188, 37.7755),
            steps: vec![],
            score: 0.0,
        }
    }

    fn context(preference: HillinessPreference) -> ScoringContext {
        ScoringContext {
            preference,
            target_distance_m: TARGET_DISTANCE,
            origin: Coordinates::new(ORIGIN_LAT, ORIGIN_LNG).unwrap(),
        }
    }

    fn score(candidate: &RouteCandidate, preference: HillinessPreference) -> f64 {
        RouteScorer::default().score(candidate, &context(preference), &ScoringThresholds::default())
    }

    #[test]
    fn test_flat_beats_hilly_for_no_hill() {
        let flat = score(&make_candidate(5.0), HillinessPreference::NoHill);
        let hilly = score(&make_candidate(30.0), HillinessPreference::NoHill);
        assert!(flat < hilly);
        assert_eq!(flat, 50.0);
    }

    #[test]
    fn test_hilly_scores_well_for_damon_hill() {
        assert!(score(&make_candidate(45.0), HillinessPreference::DamonHill) < 5.0);
        assert!(score(&make_candidate(5.0), HillinessPreference::DamonHill) > 30.0);
    }

    #[test]
    fn test_little_hill_measures_from_midpoint() {
        assert_eq!(score(&make_candidate(17.5), HillinessPreference::LittleHill), 0.0);
        assert_eq!(score(&make_candidate(20.0), HillinessPreference::LittleHill), 2.5);
    }

    #[test]
    fn test_penalizes_distance_outside_tolerance() {
        let mut c = make_candidate(5.0);
        c.distance_m = 3000.0;
        // 50 from ascent, 50 from the 50% distance deviation
        assert_eq!(score(&c, HillinessPreference::NoHill), 100.0);
    }

    #[test]
    fn test_distance_deviation_band_is_inclusive() {
        assert_eq!(distance_deviation(2240.0, 2000.0, 0.12), 0.0);
        assert_eq!(distance_deviation(1760.0, 2000.0, 0.12), 0.0);
        assert!(distance_deviation(2241.0, 2000.0, 0.12) > 12.0);
    }

    #[test]
    fn test_rejects_large_bbox() {
        let mut c = make_candidate(5.0);
        c.bbox = BoundingBox::new(-123.0, 37.0, -122.0, 38.0);
        assert_eq!(score(&c, HillinessPreference::NoHill), f64::INFINITY);
    }

    #[test]
    fn test_rejects_far_start_and_end() {
        let mut c = make_candidate(5.0);
        c.geometry = LineString::new(vec![
            RoutePoint::with_elevation(-121.0, 36.0, 10.0),
            RoutePoint::with_elevation(-121.0, 36.001, 12.0),
            RoutePoint::with_elevation(-121.0, 36.0, 10.0),
        ]);
        assert_eq!(score(&c, HillinessPreference::NoHill), f64::INFINITY);
    }

    #[test]
    fn test_rejects_when_only_end_is_far() {
        let mut c = make_candidate(5.0);
        c.geometry.coordinates.push(RoutePoint::new(-122.4194, 37.7800));
        assert_eq!(score(&c, HillinessPreference::DamonHill), f64::INFINITY);
    }

    fn score_with(candidate: &RouteCandidate, thresholds: &ScoringThresholds) -> f64 {
        RouteScorer::default().score(candidate, &context(HillinessPreference::NoHill), thresholds)
    }

    fn origin() -> Coordinates {
        Coordinates::new(ORIGIN_LAT, ORIGIN_LNG).unwrap()
    }

    #[test]
    fn test_start_exactly_at_limit_is_kept() {
        let mut c = make_candidate(5.0);
        c.geometry.coordinates[0] = RoutePoint::new(ORIGIN_LNG, ORIGIN_LAT + 0.0003);
        let start_m = distance_to_point_m(&origin(), &c.geometry.coordinates[0]);

        let at_limit = ScoringThresholds {
            start_end_max_m: start_m,
            ..ScoringThresholds::default()
        };
        assert!(score_with(&c, &at_limit).is_finite());

        let just_under = ScoringThresholds {
            start_end_max_m: start_m - 1e-6,
            ..ScoringThresholds::default()
        };
        assert_eq!(score_with(&c, &just_under), f64::INFINITY);
    }

    #[test]
    fn test_end_exactly_at_limit_is_kept() {
        let mut c = make_candidate(5.0);
        let last = c.geometry.coordinates.len() - 1;
        c.geometry.coordinates[last] = RoutePoint::new(ORIGIN_LNG + 0.0004, ORIGIN_LAT);
        let end_m = distance_to_point_m(&origin(), &c.geometry.coordinates[last]);

        let at_limit = ScoringThresholds {
            start_end_max_m: end_m,
            ..ScoringThresholds::default()
        };
        assert!(score_with(&c, &at_limit).is_finite());

        let just_under = ScoringThresholds {
            start_end_max_m: end_m - 1e-6,
            ..ScoringThresholds::default()
        };
        assert_eq!(score_with(&c, &just_under), f64::INFINITY);
    }

    #[test]
    fn test_bbox_exactly_at_limit_is_kept() {
        let mut c = make_candidate(5.0);
        c.bbox = BoundingBox::new(ORIGIN_LNG, ORIGIN_LAT, ORIGIN_LNG + 0.004, ORIGIN_LAT + 0.004);
        let diagonal_m = c.bbox.diagonal_m();
        let radius_m = TARGET_DISTANCE / std::f64::consts::TAU;

        // Smallest factor whose limit still covers the diagonal
        let mut factor = diagonal_m / radius_m;
        while factor * radius_m < diagonal_m {
            factor = f64::from_bits(factor.to_bits() + 1);
        }
        while f64::from_bits(factor.to_bits() - 1) * radius_m >= diagonal_m {
            factor = f64::from_bits(factor.to_bits() - 1);
        }

        let at_limit = ScoringThresholds {
            bbox_factor: factor,
            ..ScoringThresholds::default()
        };
        assert!(score_with(&c, &at_limit).is_finite());

        let just_under = ScoringThresholds {
            bbox_factor: f64::from_bits(factor.to_bits() - 1),
            ..ScoringThresholds::default()
        };
        assert_eq!(score_with(&c, &just_under), f64::INFINITY);

        let slightly_smaller = ScoringThresholds {
            bbox_factor: factor * (1.0 - 1e-9),
            ..ScoringThresholds::default()
        };
        assert_eq!(score_with(&c, &slightly_smaller), f64::INFINITY);
    }

    #[test]
    fn test_score_is_pure() {
        let c = make_candidate(5.0);
        let before = c.clone();
        score(&c, HillinessPreference::NoHill);
        assert_eq!(c, before);
    }
}
