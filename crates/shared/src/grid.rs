//! Grid-cell grouping of markers.
//!
//! Coordinate space is cut into square cells of `cell_size` degrees. Each
//! marker lands in the cell `(floor(lng / cell_size), floor(lat / cell_size))`
//! and every non-empty cell becomes one cluster pinned at the cell midpoint.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{MapError, MapResult};
use crate::models::{LatLng, Marker};

/// Cell edge length in degrees. Always positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct CellSize(f64);

impl CellSize {
    pub fn new(size: f64) -> MapResult<Self> {
        if size.is_finite() && size > 0.0 {
            Ok(CellSize(size))
        } else {
            Err(MapError::InvalidCellSize(size))
        }
    }

    /// Caller guarantees a positive finite size.
    pub(crate) const fn new_unchecked(size: f64) -> Self {
        CellSize(size)
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for CellSize {
    type Error = MapError;

    fn try_from(size: f64) -> MapResult<Self> {
        CellSize::new(size)
    }
}

impl From<CellSize> for f64 {
    fn from(size: CellSize) -> f64 {
        size.0
    }
}

/// 2^63: cell indices at or past this do not fit an `i64`.
const INDEX_LIMIT: f64 = 9_223_372_036_854_775_808.0;

fn cell_index(coord: f64, size: f64) -> Option<i64> {
    let index = (coord / size).floor();
    (index.is_finite() && (-INDEX_LIMIT..INDEX_LIMIT).contains(&index)).then_some(index as i64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCellKey {
    /// Column, from longitude.
    pub x: i64,
    /// Row, from latitude.
    pub y: i64,
}

impl GridCellKey {
    /// Floor division, not truncation: -0.5 cells belongs to cell -1.
    ///
    /// Fails when the cell index is not representable, instead of letting
    /// distant positions saturate into one shared cell.
    pub fn for_position(pos: LatLng, cell: CellSize) -> MapResult<Self> {
        let size = cell.get();
        match (cell_index(pos.lng, size), cell_index(pos.lat, size)) {
            (Some(x), Some(y)) => Ok(GridCellKey { x, y }),
            _ => Err(MapError::CellIndexOutOfRange {
                lat: pos.lat,
                lng: pos.lng,
                cell_size: size,
            }),
        }
    }

    /// Geometric midpoint of the cell.
    pub fn center(self, cell: CellSize) -> LatLng {
        let size = cell.get();
        LatLng {
            lat: self.y as f64 * size + size / 2.0,
            lng: self.x as f64 * size + size / 2.0,
        }
    }
}

/// Markers sharing one grid cell. Rebuilt on every grouping call.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub key: GridCellKey,
    pub center: LatLng,
    pub members: Vec<Marker>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Partition `markers` into one cluster per occupied grid cell.
///
/// Order of the returned clusters is unspecified. Member order inside a
/// cluster follows input order. A marker without a representable cell fails
/// the whole call.
pub fn group_markers(markers: &[Marker], cell: CellSize) -> MapResult<Vec<Cluster>> {
    let mut cells: HashMap<GridCellKey, Vec<Marker>> = HashMap::new();
    for marker in markers {
        let key = GridCellKey::for_position(marker.position, cell)?;
        cells.entry(key).or_default().push(marker.clone());
    }

    let clusters: Vec<Cluster> = cells
        .into_iter()
        .map(|(key, members)| Cluster {
            key,
            center: key.center(cell),
            members,
        })
        .collect();

    tracing::debug!(
        markers = markers.len(),
        clusters = clusters.len(),
        cell_size = cell.get(),
        "Grouped markers into grid cells"
    );

    Ok(clusters)
}
