pub mod coordinates;
pub mod hilliness;
pub mod route;

pub use coordinates::Coordinates;
pub use hilliness::{
    hilliness_label, HillinessPreference, HillinessRange, HillinessRanges, RouteHints,
};
pub use route::{
    BoundingBox, GenerateRouteBody, GenerateRouteResponse, LineString, RouteCandidate, RoutePoint,
    RouteRequest, RouteResult, RouteStep,
};
