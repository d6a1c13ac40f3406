//! JSON Feed (version 1) wrapping for query results.
//!
//! Feed readers subscribe to a location; each poll yields one item whose
//! `content_text` is the compact JSON of the geofence verdict or region
//! summary.

use geo::Coord;
use radnote_core::{GeofenceVerdict, RegionSummary};
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::CliError;

const FEED_VERSION: &str = "https://jsonfeed.org/version/1";
const FEED_BASE_URL: &str = "https://geofeeds.net/radnote/";
const GEOFENCE_ITEM_ID: &str = "1";
const REGION_ITEM_ID: &str = "region";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct JsonFeed {
    pub(crate) version: &'static str,
    pub(crate) title: String,
    pub(crate) feed_url: String,
    pub(crate) items: Vec<FeedItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct FeedItem {
    pub(crate) id: &'static str,
    pub(crate) url: String,
    pub(crate) content_text: String,
    pub(crate) date_published: String,
    pub(crate) date_modified: String,
}

pub(crate) fn geofence_feed(
    location: Coord<f64>,
    verdict: &GeofenceVerdict,
    published: OffsetDateTime,
) -> Result<JsonFeed, CliError> {
    single_item_feed(GEOFENCE_ITEM_ID, location, verdict, published)
}

pub(crate) fn region_feed(
    summary: &RegionSummary,
    published: OffsetDateTime,
) -> Result<JsonFeed, CliError> {
    let centre = Coord {
        x: summary.lon,
        y: summary.lat,
    };
    single_item_feed(REGION_ITEM_ID, centre, summary, published)
}

fn single_item_feed<T: Serialize>(
    id: &'static str,
    location: Coord<f64>,
    content: &T,
    published: OffsetDateTime,
) -> Result<JsonFeed, CliError> {
    let content_text = serde_json::to_string(content).map_err(CliError::SerialiseOutput)?;
    let date_published = published
        .format(&Rfc3339)
        .map_err(CliError::FormatTimestamp)?;
    let query = location_query(location);
    let item = FeedItem {
        id,
        url: format!("{FEED_BASE_URL}{id}?{query}"),
        content_text,
        date_modified: date_published.clone(),
        date_published,
    };
    Ok(JsonFeed {
        version: FEED_VERSION,
        title: format!("radnote geofeed for {:.6},{:.6}", location.y, location.x),
        feed_url: format!("{FEED_BASE_URL}?{query}"),
        items: vec![item],
    })
}

fn location_query(location: Coord<f64>) -> String {
    format!("lat={:.6}&lon={:.6}", location.y, location.x)
}
