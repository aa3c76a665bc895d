//! Fixed loop near downtown San Francisco, served in development when no
//! provider key is configured.

use crate::models::{
    hilliness_label, BoundingBox, LineString, RouteCandidate, RoutePoint, RouteResult, RouteStep,
};

pub const DEMO_SEED: u32 = 42;
pub const DEMO_FINGERPRINT: &str = "demo_fp_42";

/// (lng, lat, elevation)
const DEMO_PATH: [(f64, f64, f64); 30] = [
    (-122.4194, 37.7749, 16.0),
    (-122.4189, 37.7755, 18.0),
    (-122.4180, 37.7762, 22.0),
    (-122.4170, 37.7768, 26.0),
    (-122.4158, 37.7773, 30.0),
    (-122.4145, 37.7778, 34.0),
    (-122.4132, 37.7782, 38.0),
    (-122.4120, 37.7785, 42.0),
    (-122.4108, 37.7780, 46.0),
    (-122.4098, 37.7773, 50.0),
    (-122.4090, 37.7765, 53.0),
    (-122.4085, 37.7755, 56.0),
    (-122.4082, 37.7745, 58.0),
    (-122.4080, 37.7735, 60.0),
    (-122.4083, 37.7725, 57.0),
    (-122.4088, 37.7716, 52.0),
    (-122.4095, 37.7708, 47.0),
    (-122.4105, 37.7702, 42.0),
    (-122.4116, 37.7698, 37.0),
    (-122.4128, 37.7696, 32.0),
    (-122.4140, 37.7698, 28.0),
    (-122.4152, 37.7702, 24.0),
    (-122.4162, 37.7708, 21.0),
    (-122.4170, 37.7716, 19.0),
    (-122.4176, 37.7725, 18.0),
    (-122.4180, 37.7733, 17.0),
    (-122.4184, 37.7738, 16.0),
    (-122.4188, 37.7743, 16.0),
    (-122.4192, 37.7746, 16.0),
    (-122.4194, 37.7749, 16.0),
];

const DEMO_STEPS: [(&str, f64, f64); 9] = [
    ("Head north on Market Street", 180.0, 135.0),
    ("Turn left onto 5th Street", 250.0, 190.0),
    ("Turn right onto Mission Street", 320.0, 240.0),
    ("Continue onto Howard Street", 280.0, 210.0),
    ("Turn left onto 2nd Street", 200.0, 150.0),
    ("Turn right onto Folsom Street", 310.0, 230.0),
    ("Turn left onto 4th Street", 260.0, 195.0),
    ("Continue onto Market Street", 180.0, 135.0),
    ("Arrive at starting point", 120.0, 115.0),
];

const DEMO_ASCENT_PER_KM: f64 = 21.4;

/// The demo route, reporting the caller's computed target distance.
pub fn demo_route(target_distance_m: f64) -> RouteResult {
    let coordinates = DEMO_PATH
        .iter()
        .map(|&(lng, lat, elevation)| RoutePoint::with_elevation(lng, lat, elevation))
        .collect();

    let steps = DEMO_STEPS
        .iter()
        .map(|&(instruction, distance_m, duration_s)| RouteStep {
            instruction: instruction.to_string(),
            distance_m,
            duration_s,
        })
        .collect();

    RouteResult {
        candidate: RouteCandidate {
            seed: DEMO_SEED,
            distance_m: 2100.0,
            duration_s: 1600.0,
            ascent_m: 45.0,
            descent_m: 43.0,
            ascent_per_km: DEMO_ASCENT_PER_KM,
            geometry: LineString::new(coordinates),
            bbox: BoundingBox::new(-122.4194, 37.7696, -122.4080, 37.7785),
            steps,
            score: 3.9,
        },
        hilliness_label: hilliness_label(DEMO_ASCENT_PER_KM).to_string(),
        target_distance_m,
        fingerprint: DEMO_FINGERPRINT.to_string(),
    }
}
