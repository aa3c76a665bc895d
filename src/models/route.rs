use crate::constants::MIN_ASCENT_NORMALIZATION_KM;
use crate::models::{Coordinates, HillinessPreference};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// One geometry vertex, serialized GeoJSON-style as `[lng, lat]` or
/// `[lng, lat, elevation]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct RoutePoint {
    pub lng: f64,
    pub lat: f64,
    pub elevation: Option<f64>,
}

impl RoutePoint {
    pub fn new(lng: f64, lat: f64) -> Self {
        RoutePoint {
            lng,
            lat,
            elevation: None,
        }
    }

    pub fn with_elevation(lng: f64, lat: f64, elevation: f64) -> Self {
        RoutePoint {
            lng,
            lat,
            elevation: Some(elevation),
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

impl TryFrom<Vec<f64>> for RoutePoint {
    type Error = String;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        match values.as_slice() {
            [lng, lat] => Ok(RoutePoint::new(*lng, *lat)),
            [lng, lat, elevation] => Ok(RoutePoint::with_elevation(*lng, *lat, *elevation)),
            other => Err(format!(
                "position must have 2 or 3 values, got {}",
                other.len()
            )),
        }
    }
}

impl From<RoutePoint> for Vec<f64> {
    fn from(point: RoutePoint) -> Self {
        match point.elevation {
            Some(elevation) => vec![point.lng, point.lat, elevation],
            None => vec![point.lng, point.lat],
        }
    }
}

/// GeoJSON LineString: `{"type": "LineString", "coordinates": [...]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct LineString {
    pub coordinates: Vec<RoutePoint>,
}

impl LineString {
    pub fn new(coordinates: Vec<RoutePoint>) -> Self {
        LineString { coordinates }
    }

    pub fn first(&self) -> Option<&RoutePoint> {
        self.coordinates.first()
    }

    pub fn last(&self) -> Option<&RoutePoint> {
        self.coordinates.last()
    }
}

/// Planar bounding rectangle, serialized as `[minLon, minLat, maxLon, maxLat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> Self {
        BoundingBox {
            min_lng,
            min_lat,
            max_lng,
            max_lat,
        }
    }

    /// Accepts a 2-D (4 values) or 3-D (6 values, elevation interleaved) box;
    /// elevation bounds are dropped.
    pub fn from_provider(values: &[f64]) -> Result<Self, String> {
        match values {
            [min_lng, min_lat, max_lng, max_lat] => {
                Ok(BoundingBox::new(*min_lng, *min_lat, *max_lng, *max_lat))
            }
            [min_lng, min_lat, _, max_lng, max_lat, _] => {
                Ok(BoundingBox::new(*min_lng, *min_lat, *max_lng, *max_lat))
            }
            other => Err(format!("bbox must have 4 or 6 values, got {}", other.len())),
        }
    }

    pub fn from_points(points: &[RoutePoint]) -> Option<Self> {
        let first = points.first()?;
        let init = BoundingBox::new(first.lng, first.lat, first.lng, first.lat);
        Some(points.iter().fold(init, |bbox, p| BoundingBox {
            min_lng: bbox.min_lng.min(p.lng),
            min_lat: bbox.min_lat.min(p.lat),
            max_lng: bbox.max_lng.max(p.lng),
            max_lat: bbox.max_lat.max(p.lat),
        }))
    }

    /// Great-circle distance between the south-west and north-east corners, in meters
    pub fn diagonal_m(&self) -> f64 {
        let south_west = Coordinates {
            lat: self.min_lat,
            lng: self.min_lng,
        };
        let north_east = Coordinates {
            lat: self.max_lat,
            lng: self.max_lng,
        };
        south_west.distance_m(&north_east)
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(v: [f64; 4]) -> Self {
        BoundingBox::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.min_lng, b.min_lat, b.max_lng, b.max_lat]
    }
}

/// A single turn-by-turn instruction, in travel order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStep {
    pub instruction: String,
    pub distance_m: f64,
    pub duration_s: f64,
}

/// One provider-returned round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteCandidate {
    pub seed: u32,
    pub distance_m: f64,
    pub duration_s: f64,
    pub ascent_m: f64,
    pub descent_m: f64,
    pub ascent_per_km: f64,
    pub geometry: LineString,
    pub bbox: BoundingBox,
    pub steps: Vec<RouteStep>,
    /// Zero until a scoring pass runs; `f64::INFINITY` marks a rejection.
    #[serde(default)]
    pub score: f64,
}

impl RouteCandidate {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        seed: u32,
        distance_m: f64,
        duration_s: f64,
        ascent_m: f64,
        descent_m: f64,
        geometry: LineString,
        bbox: BoundingBox,
        steps: Vec<RouteStep>,
    ) -> Self {
        RouteCandidate {
            seed,
            distance_m,
            duration_s,
            ascent_m,
            descent_m,
            ascent_per_km: ascent_per_km(ascent_m, distance_m),
            geometry,
            bbox,
            steps,
            score: 0.0,
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.score == f64::INFINITY
    }
}

/// Elevation gain normalized by route length, guarding near-zero distances.
pub fn ascent_per_km(ascent_m: f64, distance_m: f64) -> f64 {
    ascent_m / (distance_m / 1000.0).max(MIN_ASCENT_NORMALIZATION_KM)
}

/// A validated request handed to the route generator.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub origin: Coordinates,
    pub minutes: f64,
    pub preference: HillinessPreference,
    pub seed: Option<u32>,
    pub avoid_seeds: HashSet<u32>,
}

impl RouteRequest {
    pub fn new(origin: Coordinates, minutes: f64, preference: HillinessPreference) -> Self {
        RouteRequest {
            origin,
            minutes,
            preference,
            seed: None,
            avoid_seeds: HashSet::new(),
        }
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_avoid_seeds(mut self, seeds: impl IntoIterator<Item = u32>) -> Self {
        self.avoid_seeds = seeds.into_iter().collect();
        self
    }
}

/// The selected route plus presentation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    pub candidate: RouteCandidate,
    pub hilliness_label: String,
    pub target_distance_m: f64,
    pub fingerprint: String,
}

// Request/Response types for API endpoints

/// Raw JSON body of `POST /api/generate-route`. Fields are loosely typed so the
/// handler can report which one is wrong.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRouteBody {
    pub lat: Option<Value>,
    pub lng: Option<Value>,
    pub minutes: Option<Value>,
    pub hilliness: Option<Value>,
    pub seed: Option<u32>,
    #[serde(default)]
    pub locked_seeds: Vec<u32>,
}

impl GenerateRouteBody {
    /// Checks field types and enum membership, clamping `minutes` into
    /// `[min_minutes, max_minutes]`.
    pub fn validate(self, min_minutes: f64, max_minutes: f64) -> Result<RouteRequest, String> {
        let (lat, lng) = match (
            self.lat.as_ref().and_then(Value::as_f64),
            self.lng.as_ref().and_then(Value::as_f64),
        ) {
            (Some(lat), Some(lng)) => (lat, lng),
            _ => return Err("lat and lng are required numbers.".to_string()),
        };
        let origin = Coordinates::new(lat, lng)?;

        let minutes = self
            .minutes
            .as_ref()
            .and_then(Value::as_f64)
            .ok_or_else(|| "minutes is required and must be a number.".to_string())?;

        let preference = self
            .hilliness
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<HillinessPreference>().ok())
            .ok_or_else(|| {
                "hilliness must be one of: no_hill, little_hill, damon_hill.".to_string()
            })?;

        Ok(RouteRequest {
            origin,
            minutes: minutes.clamp(min_minutes, max_minutes),
            preference,
            seed: self.seed,
            avoid_seeds: self.locked_seeds.into_iter().collect(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateRouteResponse {
    pub ok: bool,
    pub result: RouteResult,
}

impl GenerateRouteResponse {
    pub fn success(result: RouteResult) -> Self {
        GenerateRouteResponse { ok: true, result }
    }
}
