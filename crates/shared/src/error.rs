use thiserror::Error;

/// Errors raised at the boundary of the map core.
///
/// Bad constants, out-of-range coordinates and non-finite zoom from the map
/// surface are the only failure modes.
#[derive(Error, Debug)]
pub enum MapError {
    #[error("cell size must be a positive finite number, got {0}")]
    InvalidCellSize(f64),

    #[error("zoom must be finite, got {0}")]
    NonFiniteZoom(f64),

    #[error("close threshold ({close}) must be finite and greater than medium threshold ({medium})")]
    InvalidThresholds { medium: f64, close: f64 },

    #[error("zoom range must satisfy min <= base <= max, got min={min} base={base} max={max}")]
    InvalidZoomRange { min: f64, base: f64, max: f64 },

    #[error("marker {id} has an invalid position ({lat}, {lng})")]
    InvalidMarkerPosition { id: u32, lat: f64, lng: f64 },

    #[error("position ({lat}, {lng}) has no grid cell at cell size {cell_size}")]
    CellIndexOutOfRange { lat: f64, lng: f64, cell_size: f64 },

    #[error("floor plan center ({lat}, {lng}) lies outside its bounds")]
    FloorPlanOutsideBounds { lat: f64, lng: f64 },

    #[error("duplicate marker id {0}")]
    DuplicateMarkerId(u32),

    #[error("invalid venue config: {0}")]
    Config(#[from] serde_json::Error),
}

pub type MapResult<T> = Result<T, MapError>;

/// Reject NaN and infinities before they reach any threshold comparison.
pub fn ensure_finite_zoom(zoom: f64) -> MapResult<f64> {
    if zoom.is_finite() {
        Ok(zoom)
    } else {
        Err(MapError::NonFiniteZoom(zoom))
    }
}
