//! Stable application-wide constants.
//!
//! Values here are structural invariants, algorithm coefficients, and default
//! fallbacks for env-var-based configuration. They should rarely change.
//! For tuning knobs that benefit from runtime experimentation, see
//! [`RouteGeneratorConfig`](crate::config::RouteGeneratorConfig) instead.

// --- Server defaults (used when HOST / PORT env vars are absent) ---

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default port for the HTTP server.
pub const DEFAULT_PORT: &str = "3000";

/// openrouteservice round-trip endpoint (walking profile, GeoJSON output).
pub const ORS_DIRECTIONS_URL: &str =
    "https://api.openrouteservice.org/v2/directions/foot-walking/geojson";

// --- Walk duration and length (boundary clamping and target distance) ---

/// Average walking speed in meters per second (~4.8 km/h).
pub const DEFAULT_WALKING_SPEED_MPS: f64 = 1.34;
/// Shortest walk a caller may request, in minutes.
pub const DEFAULT_MIN_WALK_MINUTES: f64 = 5.0;
/// Longest walk a caller may request, in minutes.
pub const DEFAULT_MAX_WALK_MINUTES: f64 = 180.0;
/// Floor on the target loop length, in meters.
pub const DEFAULT_MIN_ROUTE_LENGTH_M: f64 = 400.0;

// --- Candidate acquisition ---

/// Number of seeded round-trip requests issued concurrently per generation.
pub const DEFAULT_CANDIDATE_COUNT: usize = 12;
/// Per-attempt provider timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 4_000;
/// Retries after the first attempt (3 attempts total).
pub const DEFAULT_MAX_RETRIES: usize = 2;
/// Sleep before retry N (1-based) in milliseconds. Retries past the end of the
/// schedule reuse the last entry.
pub const DEFAULT_RETRY_BACKOFF_MS: &[u64] = &[500, 1_500];
/// Seeds are drawn from `[0, SEED_UPPER_BOUND)`.
pub const SEED_UPPER_BOUND: u32 = 2_147_483_647;

/// Waypoint count sent to the provider is `round(target / this)`, clamped.
pub const METERS_PER_ROUND_TRIP_POINT: f64 = 500.0;
pub const MIN_ROUND_TRIP_POINTS: u32 = 3;
pub const MAX_ROUND_TRIP_POINTS: u32 = 8;

// --- Scoring thresholds ---

/// Accepted distance deviation as a fraction of the target (strict pass).
pub const DEFAULT_DISTANCE_TOLERANCE_FRACTION: f64 = 0.12;
/// Accepted distance deviation as a fraction of the target (relaxed pass).
pub const DEFAULT_RELAXED_DISTANCE_TOLERANCE_FRACTION: f64 = 0.24;
/// Max bbox diagonal as a multiple of the expected loop radius (strict pass).
pub const DEFAULT_BBOX_DIAGONAL_MAX_FACTOR: f64 = 2.2;
/// Max bbox diagonal as a multiple of the expected loop radius (relaxed pass).
pub const DEFAULT_RELAXED_BBOX_DIAGONAL_MAX_FACTOR: f64 = 3.0;
/// Max distance between the route's first/last point and the origin, in meters.
pub const DEFAULT_START_END_MAX_DISTANCE_M: f64 = 150.0;
/// Floor on route length (km) when normalizing ascent per km.
pub const MIN_ASCENT_NORMALIZATION_KM: f64 = 0.1;
/// `no_hill` multiplies ascent per km by this so ascent dominates distance.
pub const FLAT_ASCENT_WEIGHT: f64 = 10.0;

// --- Fingerprints ---

/// Every Nth geometry point is sampled into the fingerprint.
pub const FINGERPRINT_SAMPLE_STRIDE: usize = 5;
/// Coordinate rounding applied before hashing (~11 m).
pub const FINGERPRINT_DECIMAL_PLACES: u32 = 4;
/// Number of recent fingerprints remembered for deduplication.
pub const DEFAULT_FINGERPRINT_HISTORY_CAPACITY: usize = 10;
/// Times the generator re-rolls seeds when the chosen route was seen recently.
pub const DEFAULT_DEDUP_RETRIES: usize = 2;
/// Redis list holding the fingerprint history.
pub const REDIS_HISTORY_KEY: &str = "randomwalk:fingerprints";
