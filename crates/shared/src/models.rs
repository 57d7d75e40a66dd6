use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        LatLng { lat, lng }
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// Geographic rectangle, edges in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Bounds {
    pub fn contains(&self, pos: LatLng) -> bool {
        pos.lat <= self.north && pos.lat >= self.south && pos.lng <= self.east && pos.lng >= self.west
    }
}

pub type MarkerId = u32;

/// A point of interest pinned on the map. Defined once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub id: MarkerId,
    pub position: LatLng,
    pub image: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// Venue floor-plan image drawn over the map.
///
/// `width_px` / `height_px` are the rendered size at the base zoom; the
/// overlay grows and shrinks with the scale factor from there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlan {
    pub center: LatLng,
    pub bounds: Bounds,
    pub overview_image: String,
    pub detailed_image: String,
    pub width_px: f64,
    pub height_px: f64,
    pub opacity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bigsite_bounds() -> Bounds {
        Bounds {
            north: 35.631419,
            south: 35.628229,
            east: 139.797833,
            west: 139.794733,
        }
    }

    #[test]
    fn test_bounds_contains_center() {
        let b = bigsite_bounds();
        assert!(b.contains(LatLng::new(35.6298243, 139.7962834)));
    }

    #[test]
    fn test_bounds_excludes_outside_point() {
        let b = bigsite_bounds();
        // Shelter wharf pin sits west of the venue
        assert!(!b.contains(LatLng::new(35.6287, 139.7927)));
    }

    #[test]
    fn test_marker_json_camel_case_and_optional_category() {
        let json = r#"{"id":7,"position":{"lat":1.0,"lng":2.0},"image":"a.png","title":"Gate"}"#;
        let m: Marker = serde_json::from_str(json).unwrap();
        assert_eq!(m.id, 7);
        assert_eq!(m.category, None);
        let out = serde_json::to_string(&m).unwrap();
        assert!(!out.contains("category"));
    }

    #[test]
    fn test_floor_plan_json_keys() {
        let plan = FloorPlan {
            center: LatLng::new(0.0, 0.0),
            bounds: bigsite_bounds(),
            overview_image: "o.png".to_string(),
            detailed_image: "d.png".to_string(),
            width_px: 600.0,
            height_px: 400.0,
            opacity: 0.7,
        };
        let out = serde_json::to_string(&plan).unwrap();
        assert!(out.contains("\"overviewImage\""));
        assert!(out.contains("\"widthPx\""));
    }
}
