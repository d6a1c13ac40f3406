//! Great-circle distance between two coordinates.
//!
//! Uses the haversine formulation on a spherical Earth (mean radius
//! 6 371 008.8 m). Haversine keeps full precision for sub-metre separations,
//! where the spherical law of cosines collapses to `acos(1)`.

use geo::{Coord, Distance, Haversine, Point};

/// Distance in metres between two WGS84 coordinates (`x = lon`, `y = lat`).
///
/// The function is symmetric and returns `0.0` for identical points. Inputs
/// are not range-checked.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use radnote_core::meters_between;
///
/// let equator = Coord { x: 0.0, y: 0.0 };
/// let one_degree_north = Coord { x: 0.0, y: 1.0 };
/// let metres = meters_between(equator, one_degree_north);
/// assert!((metres - 111_195.0).abs() < 1.0);
/// ```
#[must_use]
pub fn meters_between(from: Coord<f64>, to: Coord<f64>) -> f64 {
    Haversine.distance(Point::from(from), Point::from(to))
}
