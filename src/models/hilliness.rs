use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How steep the caller wants the walk to be.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum HillinessPreference {
    #[default]
    NoHill,
    LittleHill,
    DamonHill,
}

impl HillinessPreference {
    pub const ALL: [HillinessPreference; 3] = [
        HillinessPreference::NoHill,
        HillinessPreference::LittleHill,
        HillinessPreference::DamonHill,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HillinessPreference::NoHill => "no_hill",
            HillinessPreference::LittleHill => "little_hill",
            HillinessPreference::DamonHill => "damon_hill",
        }
    }

    /// Provider hints for this preference. Flat walks avoid stairs and penalize
    /// steep segments, gentle walks only avoid stairs, hill seekers get no
    /// avoidance at all.
    pub fn hints(&self) -> RouteHints {
        match self {
            HillinessPreference::NoHill => RouteHints {
                avoid_steps: true,
                steepness_difficulty: Some(-2),
            },
            HillinessPreference::LittleHill => RouteHints {
                avoid_steps: true,
                steepness_difficulty: None,
            },
            HillinessPreference::DamonHill => RouteHints::default(),
        }
    }
}

impl fmt::Display for HillinessPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HillinessPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "no_hill" => Ok(HillinessPreference::NoHill),
            "little_hill" => Ok(HillinessPreference::LittleHill),
            "damon_hill" => Ok(HillinessPreference::DamonHill),
            _ => Err(format!("Invalid hilliness preference: '{}'", s)),
        }
    }
}

/// Preference-specific request hints forwarded to the routing provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteHints {
    pub avoid_steps: bool,
    pub steepness_difficulty: Option<i32>,
}

/// Target band of ascent-meters-per-km for one preference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HillinessRange {
    pub min: f64,
    pub max: f64,
    pub midpoint: f64,
}

impl HillinessRange {
    pub const fn new(min: f64, max: f64, midpoint: f64) -> Self {
        HillinessRange { min, max, midpoint }
    }
}

impl FromStr for HillinessRange {
    type Err = String;

    /// Parses `min,max,midpoint`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<f64> = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| format!("Invalid hilliness range: '{}'", s))?;

        match parts.as_slice() {
            [min, max, midpoint] if min <= midpoint && midpoint <= max => {
                Ok(HillinessRange::new(*min, *max, *midpoint))
            }
            _ => Err(format!(
                "Invalid hilliness range: '{}' (expected min,max,midpoint in ascending order)",
                s
            )),
        }
    }
}

/// Ranges for all three preferences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HillinessRanges {
    pub no_hill: HillinessRange,
    pub little_hill: HillinessRange,
    pub damon_hill: HillinessRange,
}

impl HillinessRanges {
    pub fn get(&self, preference: HillinessPreference) -> HillinessRange {
        match preference {
            HillinessPreference::NoHill => self.no_hill,
            HillinessPreference::LittleHill => self.little_hill,
            HillinessPreference::DamonHill => self.damon_hill,
        }
    }
}

impl Default for HillinessRanges {
    fn default() -> Self {
        HillinessRanges {
            no_hill: HillinessRange::new(0.0, 10.0, 5.0),
            little_hill: HillinessRange::new(10.0, 25.0, 17.5),
            damon_hill: HillinessRange::new(25.0, 80.0, 45.0),
        }
    }
}

/// Human-friendly label for a route's measured steepness.
pub fn hilliness_label(ascent_per_km: f64) -> &'static str {
    if ascent_per_km <= 10.0 {
        "Flat 🟢"
    } else if ascent_per_km <= 25.0 {
        "Rolling 🟡"
    } else if ascent_per_km <= 40.0 {
        "Hilly 🟠"
    } else {
        "Very Hilly 🔴"
    }
}
