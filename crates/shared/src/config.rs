use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::display::ZoomThresholds;
use crate::error::{MapError, MapResult};
use crate::grid::{CellSize, GridCellKey};
use crate::models::{Bounds, Category, FloorPlan, LatLng, Marker};

// Tokyo Big Sight
pub const VENUE_CENTER: LatLng = LatLng::new(35.6298243, 139.7962834);
pub const VENUE_BOUNDS: Bounds = Bounds {
    north: 35.631419,
    south: 35.628229,
    east: 139.797833,
    west: 139.794733,
};

pub const BASE_ZOOM: f64 = 16.0;
pub const MIN_ZOOM: f64 = 3.0;
pub const MAX_ZOOM: f64 = 21.0;
pub const MEDIUM_THRESHOLD: f64 = 16.0;
pub const CLOSE_THRESHOLD: f64 = 18.0;

/// Grid cell edge in degrees, roughly 90m of latitude.
pub const CELL_SIZE_DEG: f64 = 0.0008;

pub const FLOOR_PLAN_WIDTH_PX: f64 = 600.0;
pub const FLOOR_PLAN_HEIGHT_PX: f64 = 400.0;
pub const FLOOR_PLAN_OPACITY: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomConfig {
    /// Default and reset zoom; the overlay is drawn at its base size here.
    pub base: f64,
    pub min: f64,
    pub max: f64,
    pub thresholds: ZoomThresholds,
}

impl ZoomConfig {
    pub fn validate(&self) -> MapResult<()> {
        let ordered = self.min.is_finite()
            && self.base.is_finite()
            && self.max.is_finite()
            && self.min <= self.base
            && self.base <= self.max;
        if ordered {
            Ok(())
        } else {
            Err(MapError::InvalidZoomRange {
                min: self.min,
                base: self.base,
                max: self.max,
            })
        }
    }

    pub fn clamp(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min, self.max)
    }
}

impl Default for ZoomConfig {
    fn default() -> Self {
        ZoomConfig {
            base: BASE_ZOOM,
            min: MIN_ZOOM,
            max: MAX_ZOOM,
            thresholds: ZoomThresholds::new_unchecked(MEDIUM_THRESHOLD, CLOSE_THRESHOLD),
        }
    }
}

/// Everything the map page needs to know about one venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueConfig {
    pub name: String,
    pub center: LatLng,
    pub zoom: ZoomConfig,
    pub cell_size: CellSize,
    pub floor_plan: FloorPlan,
    #[serde(default)]
    pub categories: Vec<Category>,
    pub markers: Vec<Marker>,
}

impl VenueConfig {
    /// Parse and validate a venue config JSON document.
    pub fn from_json(json: &str) -> MapResult<Self> {
        let config: VenueConfig = serde_json::from_str(json)?;
        config.validate()?;
        tracing::info!(
            venue = %config.name,
            markers = config.markers.len(),
            categories = config.categories.len(),
            "Loaded venue config"
        );
        Ok(config)
    }

    /// Checks that serde cannot express: zoom ordering, unique marker ids,
    /// marker positions on the globe with a grid cell at this cell size, and
    /// a floor plan centered inside its own bounds. Thresholds and cell size
    /// validate themselves on construction.
    pub fn validate(&self) -> MapResult<()> {
        self.zoom.validate()?;
        let plan = &self.floor_plan;
        if !plan.bounds.contains(plan.center) {
            return Err(MapError::FloorPlanOutsideBounds {
                lat: plan.center.lat,
                lng: plan.center.lng,
            });
        }
        let mut seen = HashSet::with_capacity(self.markers.len());
        for marker in &self.markers {
            if !seen.insert(marker.id) {
                return Err(MapError::DuplicateMarkerId(marker.id));
            }
            let LatLng { lat, lng } = marker.position;
            if !((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)) {
                return Err(MapError::InvalidMarkerPosition { id: marker.id, lat, lng });
            }
            GridCellKey::for_position(marker.position, self.cell_size)?;
        }
        Ok(())
    }

    pub fn find_marker(&self, id: u32) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    pub fn find_category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }
}

fn category(id: &str, name: &str, color: &str) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
    }
}

fn pin(id: u32, lat: f64, lng: f64, title: &str, category: &str) -> Marker {
    Marker {
        id,
        position: LatLng::new(lat, lng),
        image: "/static/images/pin.svg".to_string(),
        title: title.to_string(),
        category: Some(category.to_string()),
    }
}

impl Default for VenueConfig {
    fn default() -> Self {
        VenueConfig {
            name: "東京ビッグサイト".to_string(),
            center: VENUE_CENTER,
            zoom: ZoomConfig::default(),
            cell_size: CellSize::new_unchecked(CELL_SIZE_DEG),
            floor_plan: FloorPlan {
                center: VENUE_CENTER,
                bounds: VENUE_BOUNDS,
                overview_image: "/static/images/live_map2.svg".to_string(),
                detailed_image: "/static/images/live_map1.svg".to_string(),
                width_px: FLOOR_PLAN_WIDTH_PX,
                height_px: FLOOR_PLAN_HEIGHT_PX,
                opacity: FLOOR_PLAN_OPACITY,
            },
            categories: vec![
                category("gourmet", "グルメ", "rgb(226, 39, 129)"),
                category("shopping", "ショッピング", "rgb(24, 145, 96)"),
                category("sightseeing", "観光", "rgb(31, 66, 243)"),
            ],
            markers: vec![
                pin(1, 35.6298243, 139.7962834, "ビッグサイト", "sightseeing"),
                pin(2, 35.6287, 139.7927, "シェルターワーフ", "gourmet"),
                pin(3, 35.6296, 139.7961, "エントランスプラザ", "shopping"),
                pin(4, 35.6305, 139.7969, "東展示棟", "sightseeing"),
            ],
        }
    }
}
