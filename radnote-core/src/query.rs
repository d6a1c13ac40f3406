//! Resolution of raw query parameters into a region query.
//!
//! Transports receive `lat`, `lon` and `radius_meters` as strings. A request
//! without a usable location asks for the full device listing instead.

use geo::Coord;
use thiserror::Error;

use crate::RegionQuery;

/// Errors raised while resolving query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A parameter was present but not a number.
    #[error("{field} must be a number (got {raw:?})")]
    NotANumber {
        /// Name of the parameter.
        field: &'static str,
        /// Value as received.
        raw: String,
    },
}

/// Raw query parameters as received from a transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryParams<'a> {
    /// Latitude in degrees.
    pub lat: Option<&'a str>,
    /// Longitude in degrees.
    pub lon: Option<&'a str>,
    /// Radius in metres.
    pub radius_meters: Option<&'a str>,
}

impl QueryParams<'_> {
    /// Resolve the parameters.
    ///
    /// Returns `Ok(None)` when the request carries no location, or the
    /// location `(0,0)`, which devices and clients use for "no fix".
    ///
    /// # Errors
    /// Returns [`QueryError::NotANumber`] for any present value that is not a
    /// finite number, including `NaN` and `inf`.
    ///
    /// # Examples
    /// ```
    /// use radnote_core::QueryParams;
    ///
    /// let params = QueryParams {
    ///     lat: Some("37.42"),
    ///     lon: Some("141.03"),
    ///     radius_meters: None,
    /// };
    /// let query = params.resolve().expect("numeric").expect("located");
    /// assert_eq!(query.radius_meters, None);
    /// ```
    pub fn resolve(&self) -> Result<Option<RegionQuery>, QueryError> {
        let lat = parse_number("lat", self.lat)?;
        let lon = parse_number("lon", self.lon)?;
        let radius_meters = parse_number("radius_meters", self.radius_meters)?;
        match (lat, lon) {
            (Some(lat_deg), Some(lon_deg)) if !(lat_deg == 0.0 && lon_deg == 0.0) => {
                Ok(Some(RegionQuery {
                    center: Coord {
                        x: lon_deg,
                        y: lat_deg,
                    },
                    radius_meters,
                }))
            }
            _ => Ok(None),
        }
    }
}

fn parse_number(field: &'static str, raw: Option<&str>) -> Result<Option<f64>, QueryError> {
    let Some(text) = raw.map(str::trim).filter(|text| !text.is_empty()) else {
        return Ok(None);
    };
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(QueryError::NotANumber {
            field,
            raw: text.to_owned(),
        }),
    }
}
