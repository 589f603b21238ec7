use serde::Serialize;
use url::Url;

use crate::model::{Coordinate, Widget};

/// Axis-aligned window around the map center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub lon_min: f64,
    pub lat_min: f64,
    pub lon_max: f64,
    pub lat_max: f64,
}

impl BoundingBox {
    pub fn around(center: Coordinate, half_extent: f64) -> Self {
        Self {
            lon_min: center.longitude - half_extent,
            lat_min: center.latitude - half_extent,
            lon_max: center.longitude + half_extent,
            lat_max: center.latitude + half_extent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapFrame {
    pub center: Coordinate,
    pub bounding_box: BoundingBox,
}

impl MapFrame {
    /// OpenStreetMap embed URL with a marker on the center.
    pub fn embed_url(&self, base: &str) -> Result<Url, url::ParseError> {
        let BoundingBox {
            lon_min,
            lat_min,
            lon_max,
            lat_max,
        } = self.bounding_box;

        let mut url = Url::parse(base)?;
        url.query_pairs_mut()
            .append_pair("bbox", &format!("{lon_min},{lat_min},{lon_max},{lat_max}"))
            .append_pair("layer", "mapnik")
            .append_pair(
                "marker",
                &format!("{},{}", self.center.latitude, self.center.longitude),
            );
        Ok(url)
    }
}

/// What the map area should show.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum MapView {
    /// No widgets yet: show a hint instead of a map.
    Placeholder,
    Map(MapFrame),
}

impl MapView {
    pub fn frame(&self) -> Option<&MapFrame> {
        match self {
            MapView::Placeholder => None,
            MapView::Map(frame) => Some(frame),
        }
    }
}

/// Resolve the map center: explicit focus, else the newest widget, else the default.
pub fn compute_view(
    widgets: &[Widget],
    explicit_focus: Option<Coordinate>,
    default_center: Coordinate,
    half_extent: f64,
) -> MapView {
    if widgets.is_empty() {
        return MapView::Placeholder;
    }

    let center = explicit_focus
        .or_else(|| widgets.first().map(Widget::coordinates))
        .unwrap_or(default_center);

    MapView::Map(MapFrame {
        center,
        bounding_box: BoundingBox::around(center, half_extent),
    })
}
