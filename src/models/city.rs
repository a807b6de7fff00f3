use serde::{Deserialize, Serialize};

/// Earth radius used for great-circle distances, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Problem identifiers with this prefix are planar instances with integer
/// ground truth.
pub const PLANAR_PROBLEM_PREFIX: &str = "MSTSP-";

/// A point on the tour. For planar problems `x`/`y` are plain coordinates,
/// for geographic ones `x` is the longitude and `y` the latitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct City {
    #[serde(default)]
    pub id: usize,
    pub x: f64,
    pub y: f64,
}

impl City {
    pub fn new(id: usize, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }
}

/// How the distance between two cities is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Straight-line distance rounded to the nearest integer.
    PlanarRounded,
    /// Haversine distance in kilometres, unrounded.
    GreatCircle,
}

impl Metric {
    /// Picks the metric from the problem naming convention.
    pub fn for_problem(problem_id: &str) -> Self {
        if problem_id.starts_with(PLANAR_PROBLEM_PREFIX) {
            Self::PlanarRounded
        } else {
            Self::GreatCircle
        }
    }

    pub fn between(&self, from: &City, to: &City) -> f64 {
        match self {
            Self::PlanarRounded => (from.x - to.x).hypot(from.y - to.y).round(),
            Self::GreatCircle => haversine(from, to),
        }
    }
}

fn haversine(from: &City, to: &City) -> f64 {
    let d_lat = (to.y - from.y).to_radians();
    let d_lon = (to.x - from.x).to_radians();
    let lat1 = from.y.to_radians();
    let lat2 = to.y.to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + (d_lon / 2.0).sin().powi(2) * lat1.cos() * lat2.cos();
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}
