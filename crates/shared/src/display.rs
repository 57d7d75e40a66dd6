use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite_zoom, MapError, MapResult};

/// What the map draws on top of the floor plan at a given zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Floor plan only.
    Far,
    /// Grid-cell clusters.
    Medium,
    /// Every marker individually.
    Close,
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayMode::Far => write!(f, "far"),
            DisplayMode::Medium => write!(f, "medium"),
            DisplayMode::Close => write!(f, "close"),
        }
    }
}

/// Zoom levels at which the display mode steps up. `close > medium` always.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoomThresholds {
    medium: f64,
    close: f64,
}

impl ZoomThresholds {
    pub fn new(medium: f64, close: f64) -> MapResult<Self> {
        if medium.is_finite() && close.is_finite() && close > medium {
            Ok(ZoomThresholds { medium, close })
        } else {
            Err(MapError::InvalidThresholds { medium, close })
        }
    }

    /// Caller guarantees `close > medium`, both finite.
    pub(crate) const fn new_unchecked(medium: f64, close: f64) -> Self {
        ZoomThresholds { medium, close }
    }

    pub fn close(&self) -> f64 {
        self.close
    }
}

impl<'de> Deserialize<'de> for ZoomThresholds {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            medium: f64,
            close: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        ZoomThresholds::new(raw.medium, raw.close).map_err(serde::de::Error::custom)
    }
}

/// Map a zoom level to its display mode. Lower bounds are inclusive.
pub fn select_mode(zoom: f64, thresholds: &ZoomThresholds) -> MapResult<DisplayMode> {
    let zoom = ensure_finite_zoom(zoom)?;
    let mode = if zoom >= thresholds.close {
        DisplayMode::Close
    } else if zoom >= thresholds.medium {
        DisplayMode::Medium
    } else {
        DisplayMode::Far
    };
    Ok(mode)
}

/// Overlay scale relative to `base_zoom`: 2^(zoom - base_zoom).
/// One zoom step doubles map resolution, so the overlay doubles with it.
pub fn scale_factor(zoom: f64, base_zoom: f64) -> MapResult<f64> {
    let zoom = ensure_finite_zoom(zoom)?;
    let base_zoom = ensure_finite_zoom(base_zoom)?;
    Ok((zoom - base_zoom).exp2())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayState {
    pub zoom: f64,
    pub mode: DisplayMode,
    pub scale: f64,
}

impl DisplayState {
    pub fn for_zoom(zoom: f64, thresholds: &ZoomThresholds, base_zoom: f64) -> MapResult<Self> {
        Ok(DisplayState {
            zoom,
            mode: select_mode(zoom, thresholds)?,
            scale: scale_factor(zoom, base_zoom)?,
        })
    }
}
