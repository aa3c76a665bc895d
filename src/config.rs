use crate::constants::*;
use crate::models::{HillinessRange, HillinessRanges};
use std::env;
use std::str::FromStr;

const DEVELOPMENT_ENV: &str = "development";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// openrouteservice key; absent only in development (demo mode)
    pub ors_api_key: Option<String>,
    pub ors_base_url: String,
    /// Optional; falls back to in-memory history when absent or unreachable
    pub redis_url: Option<String>,
    pub app_env: String,
    pub route_generator: RouteGeneratorConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteGeneratorConfig {
    /// Average walking pace used to turn minutes into meters
    pub walking_speed_mps: f64,

    /// Requested durations are clamped into `[min_walk_minutes, max_walk_minutes]`
    pub min_walk_minutes: f64,
    pub max_walk_minutes: f64,

    /// Floor on the target loop length (m)
    pub min_route_length_m: f64,

    /// Seeded round-trip requests issued per generation attempt
    pub candidate_count: usize,

    /// Per-attempt provider timeout (ms)
    pub request_timeout_ms: u64,

    /// Retries after the first attempt, per seed
    pub max_retries: usize,

    /// Sleep before each retry (ms); the last entry repeats
    pub retry_backoff_ms: Vec<u64>,

    /// Distance deviation (fraction of target) that costs nothing, strict pass
    pub distance_tolerance_fraction: f64,

    /// Same, relaxed pass
    pub relaxed_distance_tolerance_fraction: f64,

    /// Max bbox diagonal in expected-radius multiples, strict pass
    pub bbox_diagonal_max_factor: f64,

    /// Same, relaxed pass
    pub relaxed_bbox_diagonal_max_factor: f64,

    /// Max distance from the origin to a route's first and last point (m)
    pub start_end_max_distance_m: f64,

    pub hilliness_ranges: HillinessRanges,

    /// Recent fingerprints remembered for deduplication
    pub fingerprint_history_capacity: usize,

    /// Extra fetch/select cycles when the chosen route was served recently
    pub dedup_retries: usize,
}

impl Default for RouteGeneratorConfig {
    fn default() -> Self {
        Self {
            walking_speed_mps: DEFAULT_WALKING_SPEED_MPS,
            min_walk_minutes: DEFAULT_MIN_WALK_MINUTES,
            max_walk_minutes: DEFAULT_MAX_WALK_MINUTES,
            min_route_length_m: DEFAULT_MIN_ROUTE_LENGTH_M,
            candidate_count: DEFAULT_CANDIDATE_COUNT,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS.to_vec(),
            distance_tolerance_fraction: DEFAULT_DISTANCE_TOLERANCE_FRACTION,
            relaxed_distance_tolerance_fraction: DEFAULT_RELAXED_DISTANCE_TOLERANCE_FRACTION,
            bbox_diagonal_max_factor: DEFAULT_BBOX_DIAGONAL_MAX_FACTOR,
            relaxed_bbox_diagonal_max_factor: DEFAULT_RELAXED_BBOX_DIAGONAL_MAX_FACTOR,
            start_end_max_distance_m: DEFAULT_START_END_MAX_DISTANCE_M,
            hilliness_ranges: HillinessRanges::default(),
            fingerprint_history_capacity: DEFAULT_FINGERPRINT_HISTORY_CAPACITY,
            dedup_retries: DEFAULT_DEDUP_RETRIES,
        }
    }
}

/// Read `name`, falling back to `default` when unset.
fn env_or<T: FromStr>(name: &str, default: T) -> Result<T, String> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| format!("Invalid {}", name)),
        Err(_) => Ok(default),
    }
}

fn parse_backoff(raw: &str) -> Result<Vec<u64>, String> {
    raw.split(',')
        .map(|part| part.trim().parse::<u64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| "Invalid ROUTE_RETRY_BACKOFF_MS".to_string())
}

fn range_or(name: &str, default: HillinessRange) -> Result<HillinessRange, String> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<HillinessRange>()
            .map_err(|e| format!("Invalid {}: {}", name, e)),
        Err(_) => Ok(default),
    }
}

impl RouteGeneratorConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let retry_backoff_ms = match env::var("ROUTE_RETRY_BACKOFF_MS") {
            Ok(raw) => parse_backoff(&raw)?,
            Err(_) => defaults.retry_backoff_ms.clone(),
        };

        let hilliness_ranges = HillinessRanges {
            no_hill: range_or("ROUTE_HILLINESS_NO_HILL", defaults.hilliness_ranges.no_hill)?,
            little_hill: range_or(
                "ROUTE_HILLINESS_LITTLE_HILL",
                defaults.hilliness_ranges.little_hill,
            )?,
            damon_hill: range_or(
                "ROUTE_HILLINESS_DAMON_HILL",
                defaults.hilliness_ranges.damon_hill,
            )?,
        };

        let config = Self {
            walking_speed_mps: env_or("ROUTE_WALKING_SPEED_MPS", defaults.walking_speed_mps)?,
            min_walk_minutes: env_or("ROUTE_MIN_WALK_MINUTES", defaults.min_walk_minutes)?,
            max_walk_minutes: env_or("ROUTE_MAX_WALK_MINUTES", defaults.max_walk_minutes)?,
            min_route_length_m: env_or("ROUTE_MIN_ROUTE_LENGTH_M", defaults.min_route_length_m)?,
            candidate_count: env_or("ROUTE_CANDIDATE_COUNT", defaults.candidate_count)?,
            request_timeout_ms: env_or("ROUTE_REQUEST_TIMEOUT_MS", defaults.request_timeout_ms)?,
            max_retries: env_or("ROUTE_MAX_RETRIES", defaults.max_retries)?,
            retry_backoff_ms,
            distance_tolerance_fraction: env_or(
                "ROUTE_DISTANCE_TOLERANCE_FRACTION",
                defaults.distance_tolerance_fraction,
            )?,
            relaxed_distance_tolerance_fraction: env_or(
                "ROUTE_RELAXED_DISTANCE_TOLERANCE_FRACTION",
                defaults.relaxed_distance_tolerance_fraction,
            )?,
            bbox_diagonal_max_factor: env_or(
                "ROUTE_BBOX_DIAGONAL_MAX_FACTOR",
                defaults.bbox_diagonal_max_factor,
            )?,
            relaxed_bbox_diagonal_max_factor: env_or(
                "ROUTE_RELAXED_BBOX_DIAGONAL_MAX_FACTOR",
                defaults.relaxed_bbox_diagonal_max_factor,
            )?,
            start_end_max_distance_m: env_or(
                "ROUTE_START_END_MAX_DISTANCE_M",
                defaults.start_end_max_distance_m,
            )?,
            hilliness_ranges,
            fingerprint_history_capacity: env_or(
                "ROUTE_FINGERPRINT_HISTORY_CAPACITY",
                defaults.fingerprint_history_capacity,
            )?,
            dedup_retries: env_or("ROUTE_DEDUP_RETRIES", defaults.dedup_retries)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Cross-field checks that individual parsing can't catch.
    pub fn validate(&self) -> Result<(), String> {
        let knobs = [
            ("ROUTE_WALKING_SPEED_MPS", self.walking_speed_mps),
            ("ROUTE_MIN_WALK_MINUTES", self.min_walk_minutes),
            ("ROUTE_MAX_WALK_MINUTES", self.max_walk_minutes),
            ("ROUTE_MIN_ROUTE_LENGTH_M", self.min_route_length_m),
            ("ROUTE_DISTANCE_TOLERANCE_FRACTION", self.distance_tolerance_fraction),
            (
                "ROUTE_RELAXED_DISTANCE_TOLERANCE_FRACTION",
                self.relaxed_distance_tolerance_fraction,
            ),
            ("ROUTE_BBOX_DIAGONAL_MAX_FACTOR", self.bbox_diagonal_max_factor),
            (
                "ROUTE_RELAXED_BBOX_DIAGONAL_MAX_FACTOR",
                self.relaxed_bbox_diagonal_max_factor,
            ),
            ("ROUTE_START_END_MAX_DISTANCE_M", self.start_end_max_distance_m),
        ];
        // clamp() panics on NaN bounds
        if let Some((name, _)) = knobs.iter().find(|(_, v)| !v.is_finite()) {
            return Err(format!("{} must be a finite number", name));
        }
        if self.walking_speed_mps <= 0.0 {
            return Err("ROUTE_WALKING_SPEED_MPS must be positive".to_string());
        }
        if self.min_walk_minutes > self.max_walk_minutes {
            return Err(
                "ROUTE_MIN_WALK_MINUTES must not exceed ROUTE_MAX_WALK_MINUTES".to_string(),
            );
        }
        if self.candidate_count == 0 {
            return Err("ROUTE_CANDIDATE_COUNT must be at least 1".to_string());
        }
        if self.request_timeout_ms == 0 {
            return Err("ROUTE_REQUEST_TIMEOUT_MS must be at least 1".to_string());
        }
        if self.relaxed_distance_tolerance_fraction < self.distance_tolerance_fraction
            || self.relaxed_bbox_diagonal_max_factor < self.bbox_diagonal_max_factor
        {
            return Err(
                "Relaxed scoring thresholds must not be stricter than strict ones".to_string(),
            );
        }
        Ok(())
    }

    pub fn clamp_minutes(&self, minutes: f64) -> f64 {
        minutes.clamp(self.min_walk_minutes, self.max_walk_minutes)
    }

    /// Loop length for a walk of `minutes`, never below the minimum route length.
    pub fn target_distance_m(&self, minutes: f64) -> f64 {
        (minutes * 60.0 * self.walking_speed_mps).max(self.min_route_length_m)
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "production".to_string());
        let ors_api_key = env::var("ORS_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        if ors_api_key.is_none() && app_env != DEVELOPMENT_ENV {
            return Err(
                "ORS_API_KEY must be set (or APP_ENV=development for demo mode)".to_string(),
            );
        }

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| "Invalid PORT")?,
            ors_api_key,
            ors_base_url: env::var("ORS_BASE_URL")
                .unwrap_or_else(|_| ORS_DIRECTIONS_URL.to_string()),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            app_env,
            route_generator: RouteGeneratorConfig::from_env()?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_development(&self) -> bool {
        self.app_env == DEVELOPMENT_ENV
    }

    /// Serve the fixed demo route instead of calling the provider.
    pub fn demo_mode(&self) -> bool {
        self.ors_api_key.is_none() && self.is_development()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ROUTE_VARS: &[&str] = &[
        "ROUTE_CANDIDATE_COUNT",
        "ROUTE_RETRY_BACKOFF_MS",
        "ROUTE_HILLINESS_LITTLE_HILL",
        "ROUTE_MIN_WALK_MINUTES",
        "ROUTE_MAX_RETRIES",
        "ROUTE_BBOX_DIAGONAL_MAX_FACTOR",
    ];

    fn clear_env() {
        for var in ROUTE_VARS {
            env::remove_var(var);
        }
        env::remove_var("ORS_API_KEY");
        env::remove_var("APP_ENV");
        env::remove_var("PORT");
    }

    #[test]
    fn test_target_distance() {
        let config = RouteGeneratorConfig::default();
        assert!((config.target_distance_m(25.0) - 2010.0).abs() < 1e-9);
        // 1 minute is far below the floor
        assert_eq!(config.target_distance_m(1.0), 400.0);
    }

    #[test]
    fn test_clamp_minutes() {
        let config = RouteGeneratorConfig::default();
        assert_eq!(config.clamp_minutes(2.0), 5.0);
        assert_eq!(config.clamp_minutes(500.0), 180.0);
        assert_eq!(config.clamp_minutes(45.0), 45.0);
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(RouteGeneratorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_relaxed_must_not_be_stricter() {
        let config = RouteGeneratorConfig {
            relaxed_distance_tolerance_fraction: 0.05,
            ..RouteGeneratorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = RouteGeneratorConfig::from_env().unwrap();
        assert_eq!(config, RouteGeneratorConfig::default());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        env::set_var("ROUTE_CANDIDATE_COUNT", "6");
        env::set_var("ROUTE_RETRY_BACKOFF_MS", "100, 200, 400");
        env::set_var("ROUTE_HILLINESS_LITTLE_HILL", "8,20,14");

        let config = RouteGeneratorConfig::from_env().unwrap();
        assert_eq!(config.candidate_count, 6);
        assert_eq!(config.retry_backoff_ms, vec![100, 200, 400]);
        assert_eq!(config.hilliness_ranges.little_hill.midpoint, 14.0);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_garbage() {
        clear_env();
        env::set_var("ROUTE_MAX_RETRIES", "lots");
        assert_eq!(
            RouteGeneratorConfig::from_env().unwrap_err(),
            "Invalid ROUTE_MAX_RETRIES"
        );

        clear_env();
        env::set_var("ROUTE_RETRY_BACKOFF_MS", "500,,1500");
        assert_eq!(
            RouteGeneratorConfig::from_env().unwrap_err(),
            "Invalid ROUTE_RETRY_BACKOFF_MS"
        );

        clear_env();
        env::set_var("ROUTE_MIN_WALK_MINUTES", "200");
        assert!(RouteGeneratorConfig::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_nan() {
        clear_env();
        env::set_var("ROUTE_MIN_WALK_MINUTES", "NaN");
        assert_eq!(
            RouteGeneratorConfig::from_env().unwrap_err(),
            "ROUTE_MIN_WALK_MINUTES must be a finite number"
        );

        clear_env();
        env::set_var("ROUTE_BBOX_DIAGONAL_MAX_FACTOR", "inf");
        assert!(RouteGeneratorConfig::from_env().is_err());
        clear_env();
    }

    #[test]
    fn test_validate_rejects_non_finite_knobs() {
        let nan_tolerance = RouteGeneratorConfig {
            distance_tolerance_fraction: f64::NAN,
            ..RouteGeneratorConfig::default()
        };
        assert!(nan_tolerance.validate().is_err());

        let nan_start_end = RouteGeneratorConfig {
            start_end_max_distance_m: f64::NAN,
            ..RouteGeneratorConfig::default()
        };
        assert!(nan_start_end.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_missing_key_outside_development_fails() {
        clear_env();
        env::set_var("APP_ENV", "production");
        assert!(Config::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_development_without_key_enables_demo() {
        clear_env();
        env::set_var("APP_ENV", "development");
        let config = Config::from_env().unwrap();
        assert!(config.demo_mode());
        assert!(config.is_development());

        env::set_var("ORS_API_KEY", "test-key");
        let config = Config::from_env().unwrap();
        assert!(!config.demo_mode());
        assert_eq!(config.ors_api_key.as_deref(), Some("test-key"));
        clear_env();
    }
}
