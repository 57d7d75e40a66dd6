use std::f64::consts::PI;

use venue_map_shared::models::LatLng;

/// Web-Mercator tile edge in pixels at integer zoom.
pub const TILE_SIZE: f64 = 256.0;

/// Deepest zoom the tile server provides. Beyond it tiles are upscaled.
pub const MAX_TILE_ZOOM: u32 = 19;

/// Mercator latitude limit; the projection diverges at the poles.
const MAX_LAT: f64 = 85.051_128_78;

/// Pixel position of `pos` in the whole-world image at `zoom`.
pub fn world_px(pos: LatLng, zoom: f64) -> (f64, f64) {
    let scale = TILE_SIZE * zoom.exp2();
    let lat = pos.lat.clamp(-MAX_LAT, MAX_LAT).to_radians();
    let x = (pos.lng + 180.0) / 360.0 * scale;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * scale;
    (x, y)
}

/// Inverse of [`world_px`].
pub fn world_to_latlng(x: f64, y: f64, zoom: f64) -> LatLng {
    let scale = TILE_SIZE * zoom.exp2();
    let lng = x / scale * 360.0 - 180.0;
    let n = PI * (1.0 - 2.0 * y / scale);
    LatLng::new(n.sinh().atan().to_degrees(), lng)
}

/// Screen position of `pos` inside a `width` x `height` viewport centered on `center`.
pub fn latlng_to_screen(pos: LatLng, center: LatLng, zoom: f64, width: f64, height: f64) -> (f64, f64) {
    let (px, py) = world_px(pos, zoom);
    let (cx, cy) = world_px(center, zoom);
    (px - cx + width / 2.0, py - cy + height / 2.0)
}

pub fn screen_to_latlng(sx: f64, sy: f64, center: LatLng, zoom: f64, width: f64, height: f64) -> LatLng {
    let (cx, cy) = world_px(center, zoom);
    world_to_latlng(cx + sx - width / 2.0, cy + sy - height / 2.0, zoom)
}

/// New map center after dragging the content by (`dx`, `dy`) screen pixels.
pub fn pan_center(start_center: LatLng, zoom: f64, dx: f64, dy: f64) -> LatLng {
    let (cx, cy) = world_px(start_center, zoom);
    world_to_latlng(cx - dx, cy - dy, zoom)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileRef {
    pub z: u32,
    pub x: u32,
    pub y: u32,
    /// Screen position of the tile's top-left corner.
    pub left: f64,
    pub top: f64,
    /// Rendered edge length; larger than `TILE_SIZE` between integer zooms.
    pub size: f64,
}

impl TileRef {
    pub fn url(&self) -> String {
        format!("https://tile.openstreetmap.org/{}/{}/{}.png", self.z, self.x, self.y)
    }
}

/// Tiles covering the viewport. Columns wrap around the antimeridian,
/// rows past the poles are skipped.
pub fn visible_tiles(center: LatLng, zoom: f64, width: f64, height: f64) -> Vec<TileRef> {
    let tile_zoom = zoom.floor().clamp(0.0, MAX_TILE_ZOOM as f64) as u32;
    let size = TILE_SIZE * (zoom - tile_zoom as f64).exp2();
    let (cx, cy) = world_px(center, zoom);
    let left = cx - width / 2.0;
    let top = cy - height / 2.0;

    let x0 = (left / size).floor() as i64;
    let x1 = ((left + width) / size).ceil() as i64 - 1;
    let y0 = (top / size).floor() as i64;
    let y1 = ((top + height) / size).ceil() as i64 - 1;
    let n = 1_i64 << tile_zoom;

    let mut tiles = Vec::new();
    for ty in y0.max(0)..=y1.min(n - 1) {
        for tx in x0..=x1 {
            tiles.push(TileRef {
                z: tile_zoom,
                x: tx.rem_euclid(n) as u32,
                y: ty as u32,
                left: tx as f64 * size - left,
                top: ty as f64 * size - top,
                size,
            });
        }
    }
    tiles
}

/// Container-relative position and size for a client-space point, via web_sys.
pub fn client_to_container(client_x: f64, client_y: f64, container_id: &str) -> Option<(f64, f64, f64, f64)> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(container_id)?;
    let rect = element.get_bounding_client_rect();
    Some((
        client_x - rect.left(),
        client_y - rect.top(),
        rect.width(),
        rect.height(),
    ))
}
