use dioxus::html::geometry::WheelDelta;
use dioxus::html::input_data::MouseButton;
use dioxus::prelude::*;
use venue_map_shared::grid::Cluster;
use venue_map_shared::models::{LatLng, Marker, MarkerId};
use venue_map_shared::view::{MarkerLayer, OverlayRender, RenderPlan, ViewAction, ViewState};

use crate::coords;

const MAP_CONTAINER_ID: &str = "venue-map-container";

/// Surface size used until the container has been measured.
const DEFAULT_WIDTH: f64 = 960.0;
const DEFAULT_HEIGHT: f64 = 640.0;

/// Pointer travel in pixels below which a press counts as a click.
const DRAG_THRESHOLD: f64 = 3.0;

/// Same for touch, looser than the mouse.
const TOUCH_DRAG_THRESHOLD: f64 = 8.0;

/// Zoom change per wheel notch.
const WHEEL_ZOOM_STEP: f64 = 0.5;

const PIN_SIZE: f64 = 32.0;
const CLUSTER_BASE_RADIUS: f64 = 16.0;
const CLUSTER_MAX_RADIUS: f64 = 30.0;
const CLUSTER_FILL: &str = "rgba(31,66,243,0.85)";

/// What the surface shows: center, zoom and pixel size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    fn project(&self, pos: LatLng) -> (f64, f64) {
        coords::latlng_to_screen(pos, self.center, self.zoom, self.width, self.height)
    }
}

/// Result of clicking the marker layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Hit {
    Cluster(LatLng),
    Pin(MarkerId),
}

// ---------------------------------------------------------------------------
// DOM helpers
// ---------------------------------------------------------------------------

fn container_size() -> Option<(f64, f64)> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(MAP_CONTAINER_ID)?;
    let rect = element.get_bounding_client_rect();
    (rect.width() > 0.0 && rect.height() > 0.0).then(|| (rect.width(), rect.height()))
}

/// Store the container's current size if it changed; the next render redraws
/// the SVG at that size.
fn remeasure(mut size: Signal<(f64, f64)>) {
    if let Some(measured) = container_size() {
        if measured != *size.peek() {
            size.set(measured);
        }
    }
}

/// Client position in the coordinates the SVG was last drawn with.
fn surface_point(client_x: f64, client_y: f64, drawn: (f64, f64)) -> Option<(f64, f64)> {
    let (x, y, w, h) = coords::client_to_container(client_x, client_y, MAP_CONTAINER_ID)?;
    Some(container_to_drawn((x, y), (w, h), drawn))
}

// ---------------------------------------------------------------------------
// Zoom / hit-test math (pure functions, easily testable)
// ---------------------------------------------------------------------------

/// Convert a wheel delta (pixels / lines / pages) to a uniform pixel-like value.
fn wheel_delta_y(delta: WheelDelta) -> f64 {
    match delta {
        WheelDelta::Pixels(d) => d.y,
        WheelDelta::Lines(d) => d.y * 40.0,
        WheelDelta::Pages(d) => d.y * 400.0,
    }
}

/// Zoom after one wheel notch, or `None` when the range stops it.
fn wheel_target_zoom(zoom: f64, delta_y: f64, (min, max): (f64, f64)) -> Option<f64> {
    if delta_y == 0.0 {
        return None;
    }
    let step = if delta_y < 0.0 { WHEEL_ZOOM_STEP } else { -WHEEL_ZOOM_STEP };
    let next = (zoom + step).clamp(min, max);
    ((next - zoom).abs() > 1e-9).then_some(next)
}

/// Center that keeps the point under `cursor` in place when zooming to `new_zoom`.
fn zoom_center_at_cursor(vp: &Viewport, new_zoom: f64, cursor: (f64, f64)) -> LatLng {
    let anchor = coords::screen_to_latlng(cursor.0, cursor.1, vp.center, vp.zoom, vp.width, vp.height);
    let (ax, ay) = coords::world_px(anchor, new_zoom);
    coords::world_to_latlng(
        ax - (cursor.0 - vp.width / 2.0),
        ay - (cursor.1 - vp.height / 2.0),
        new_zoom,
    )
}

/// Undo the `xMidYMid meet` letterboxing the browser applies when the
/// container no longer matches the drawn `viewBox`.
fn container_to_drawn(point: (f64, f64), container: (f64, f64), drawn: (f64, f64)) -> (f64, f64) {
    let (cw, ch) = container;
    let (dw, dh) = drawn;
    if cw <= 0.0 || ch <= 0.0 || dw <= 0.0 || dh <= 0.0 {
        return point;
    }
    let scale = (cw / dw).min(ch / dh);
    let offset_x = (cw - dw * scale) / 2.0;
    let offset_y = (ch - dh * scale) / 2.0;
    ((point.0 - offset_x) / scale, (point.1 - offset_y) / scale)
}

fn point_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

/// Badge radius grows with member count, capped.
fn cluster_radius(count: usize) -> f64 {
    (CLUSTER_BASE_RADIUS + 4.0 * (count.max(1) as f64).log2()).min(CLUSTER_MAX_RADIUS)
}

/// Pins are drawn standing on their position; this is the middle of the image.
fn pin_center(vp: &Viewport, pos: LatLng) -> (f64, f64) {
    let (x, y) = vp.project(pos);
    (x, y - PIN_SIZE / 2.0)
}

/// Closest candidate whose hit circle contains `click`.
fn find_nearest<T>(
    candidates: impl IntoIterator<Item = ((f64, f64), f64, T)>,
    click: (f64, f64),
) -> Option<T> {
    let mut best = None;
    let mut best_dist = f64::INFINITY;
    for (pos, radius, item) in candidates {
        let d = point_distance(pos, click);
        if d <= radius && d < best_dist {
            best_dist = d;
            best = Some(item);
        }
    }
    best
}

fn hit_test(layer: &MarkerLayer, vp: &Viewport, click: (f64, f64)) -> Option<Hit> {
    match layer {
        MarkerLayer::Hidden => None,
        MarkerLayer::Clusters(clusters) => find_nearest(
            clusters
                .iter()
                .map(|c| (vp.project(c.center), cluster_radius(c.len()), c.center)),
            click,
        )
        .map(Hit::Cluster),
        MarkerLayer::Individual(markers) => find_nearest(
            markers
                .iter()
                .map(|m| (pin_center(vp, m.position), PIN_SIZE / 2.0, m.id)),
            click,
        )
        .map(Hit::Pin),
    }
}

/// Clusters zoom in on their cell, pins open their card, empty space clears it.
fn dispatch_hit(hit: Option<Hit>, on_action: &EventHandler<ViewAction>) {
    match hit {
        Some(Hit::Cluster(center)) => {
            on_action.call(ViewAction::PanTo(center));
            on_action.call(ViewAction::ZoomIn);
        }
        Some(Hit::Pin(id)) => on_action.call(ViewAction::SelectMarker(Some(id))),
        None => on_action.call(ViewAction::SelectMarker(None)),
    }
}

// ---------------------------------------------------------------------------
// SVG builders
// ---------------------------------------------------------------------------

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

fn build_svg_content(plan: &RenderPlan, vp: &Viewport) -> String {
    let mut svg = String::with_capacity(8192);
    build_tiles(&mut svg, vp);
    build_overlay(&mut svg, &plan.overlay, vp);
    match &plan.markers {
        MarkerLayer::Hidden => {}
        MarkerLayer::Clusters(clusters) => build_clusters(&mut svg, clusters, vp),
        MarkerLayer::Individual(markers) => {
            let selected = plan.selected.as_ref().map(|m| m.id);
            build_pins(&mut svg, markers, vp, selected);
        }
    }
    svg
}

fn build_tiles(svg: &mut String, vp: &Viewport) {
    for tile in coords::visible_tiles(vp.center, vp.zoom, vp.width, vp.height) {
        // Half a pixel of overlap hides seams between upscaled tiles
        let size = tile.size + 0.5;
        svg.push_str(&format!(
            r#"<image href="{}" x="{}" y="{}" width="{size}" height="{size}" preserveAspectRatio="none"/>"#,
            tile.url(),
            tile.left,
            tile.top
        ));
    }
}

fn build_overlay(svg: &mut String, overlay: &OverlayRender, vp: &Viewport) {
    let (cx, cy) = vp.project(overlay.center);
    let x = cx - overlay.width_px / 2.0;
    let y = cy - overlay.height_px / 2.0;
    svg.push_str(&format!(
        r#"<image class="floor-plan" href="{}" x="{x}" y="{y}" width="{}" height="{}" opacity="{}" preserveAspectRatio="none"/>"#,
        escape_xml(&overlay.image),
        overlay.width_px,
        overlay.height_px,
        overlay.opacity
    ));
}

fn build_clusters(svg: &mut String, clusters: &[Cluster], vp: &Viewport) {
    for cluster in clusters {
        let (cx, cy) = vp.project(cluster.center);
        let count = cluster.len();
        let r = cluster_radius(count);
        let fs = r * 0.9;
        let names: Vec<String> = cluster.members.iter().map(|m| escape_xml(&m.title)).collect();
        svg.push_str(&format!(
            r##"<g role="img" class="cluster"><title>{}</title>"##,
            names.join(", ")
        ));
        svg.push_str(&format!(
            r##"<circle cx="{cx}" cy="{cy}" r="{r}" fill="{CLUSTER_FILL}" stroke="white" stroke-width="3"/>"##
        ));
        svg.push_str(&format!(
            r##"<text x="{cx}" y="{cy}" dy="0.35em" fill="white" font-size="{fs}" font-family="sans-serif" font-weight="700" text-anchor="middle">{count}</text>"##
        ));
        svg.push_str("</g>");
    }
}

fn build_pins(svg: &mut String, markers: &[Marker], vp: &Viewport, selected: Option<MarkerId>) {
    for marker in markers {
        let (px, py) = vp.project(marker.position);
        let x = px - PIN_SIZE / 2.0;
        let y = py - PIN_SIZE;
        svg.push_str(&format!(
            r##"<g role="img" class="pin"><title>{}</title>"##,
            escape_xml(&marker.title)
        ));
        svg.push_str(&format!(
            r##"<image href="{}" x="{x}" y="{y}" width="{PIN_SIZE}" height="{PIN_SIZE}"/>"##,
            escape_xml(&marker.image)
        ));
        if selected == Some(marker.id) {
            let (cx, cy) = pin_center(vp, marker.position);
            build_selection_ring(svg, cx, cy);
        }
        svg.push_str("</g>");
    }
}

/// Emit an animated dashed selection ring around a pin.
fn build_selection_ring(svg: &mut String, cx: f64, cy: f64) {
    let r = PIN_SIZE * 0.75;
    svg.push_str(&format!(
        r##"<circle cx="{cx}" cy="{cy}" r="{r}" fill="none" stroke="white" stroke-width="3" stroke-dasharray="6 4" opacity="0.9"><animate attributeName="opacity" values="0.5;1;0.5" dur="1.2s" repeatCount="indefinite"/></circle>"##
    ));
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

#[component]
pub fn MapView(
    plan: RenderPlan,
    view: ViewState,
    zoom_range: (f64, f64),
    on_action: EventHandler<ViewAction>,
) -> Element {
    let mut size = use_signal(|| (DEFAULT_WIDTH, DEFAULT_HEIGHT));

    // Drag state (mouse)
    let mut is_dragging = use_signal(|| false);
    let mut did_drag = use_signal(|| false);
    let mut drag_start = use_signal(|| (0.0_f64, 0.0_f64));
    let mut drag_start_center = use_signal(|| view.center);

    // Touch state
    let mut touch_start_pos = use_signal(|| None::<(f64, f64)>);
    let mut touch_did_pan = use_signal(|| false);
    let mut touch_start_center = use_signal(|| view.center);
    let mut is_pinching = use_signal(|| false);
    let mut pinch_start_distance = use_signal(|| 0.0_f64);
    let mut pinch_start_zoom = use_signal(|| view.zoom);

    let center = view.center;
    let zoom = view.zoom;
    let (width, height) = *size.read();
    let drawn = (width, height);
    let viewport = Viewport { center, zoom, width, height };

    let svg_html = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" style="position:absolute;top:0;left:0;width:100%;height:100%;pointer-events:none;">{}</svg>"#,
        build_svg_content(&plan, &viewport)
    );

    let click_layer = plan.markers.clone();
    let tap_layer = plan.markers.clone();
    let container_class = if *is_dragging.read() && *did_drag.read() {
        "map-container dragging"
    } else {
        "map-container"
    };

    rsx! {
        div {
            id: MAP_CONTAINER_ID,
            class: "{container_class}",

            onmounted: move |_| remeasure(size),

            onresize: move |_| remeasure(size),

            onwheel: move |evt: Event<WheelData>| {
                evt.prevent_default();
                let delta_y = wheel_delta_y(evt.data().delta());
                let Some(new_zoom) = wheel_target_zoom(zoom, delta_y, zoom_range) else {
                    return;
                };
                let client = evt.data().client_coordinates();
                if let Some(cursor) = surface_point(client.x, client.y, drawn) {
                    let vp = Viewport { center, zoom, width, height };
                    on_action.call(ViewAction::PanTo(zoom_center_at_cursor(&vp, new_zoom, cursor)));
                }
                on_action.call(ViewAction::SetZoom(new_zoom));
                remeasure(size);
            },

            onmousedown: move |evt: Event<MouseData>| {
                if evt.trigger_button() != Some(MouseButton::Primary) {
                    return;
                }
                remeasure(size);
                let client = evt.client_coordinates();
                is_dragging.set(true);
                did_drag.set(false);
                drag_start.set((client.x, client.y));
                drag_start_center.set(center);
            },

            onmousemove: move |evt: Event<MouseData>| {
                if !*is_dragging.read() {
                    return;
                }
                let client = evt.client_coordinates();
                let (sx, sy) = *drag_start.read();
                let dx = client.x - sx;
                let dy = client.y - sy;

                if !*did_drag.read() && (dx.abs() > DRAG_THRESHOLD || dy.abs() > DRAG_THRESHOLD) {
                    did_drag.set(true);
                }
                if *did_drag.read() {
                    let start = *drag_start_center.read();
                    on_action.call(ViewAction::PanTo(coords::pan_center(start, zoom, dx, dy)));
                }
            },

            onmouseup: move |evt: Event<MouseData>| {
                let was_dragging = *is_dragging.read();
                let was_drag = *did_drag.read();
                is_dragging.set(false);

                // A mouseup without drag movement = a click
                if was_dragging && !was_drag {
                    let client = evt.client_coordinates();
                    if let Some(point) = surface_point(client.x, client.y, drawn) {
                        dispatch_hit(hit_test(&click_layer, &viewport, point), &on_action);
                    }
                }
            },

            onmouseleave: move |_| {
                is_dragging.set(false);
            },

            ondoubleclick: move |evt: Event<MouseData>| {
                evt.prevent_default();
                on_action.call(ViewAction::ZoomIn);
            },

            // --- Touch event handlers ---

            ontouchstart: move |evt: Event<TouchData>| {
                evt.prevent_default();
                remeasure(size);
                let touches = evt.data().touches();
                if touches.len() == 1 {
                    let p = touches[0].client_coordinates();
                    touch_start_pos.set(Some((p.x, p.y)));
                    touch_did_pan.set(false);
                    touch_start_center.set(center);
                } else if touches.len() >= 2 {
                    let p0 = touches[0].client_coordinates();
                    let p1 = touches[1].client_coordinates();
                    is_pinching.set(true);
                    pinch_start_distance.set(point_distance((p0.x, p0.y), (p1.x, p1.y)));
                    pinch_start_zoom.set(zoom);
                    // Cancel any tap tracking
                    touch_start_pos.set(None);
                    touch_did_pan.set(true);
                }
            },

            ontouchmove: move |evt: Event<TouchData>| {
                evt.prevent_default();
                let touches = evt.data().touches();

                if *is_pinching.read() && touches.len() >= 2 {
                    let p0 = touches[0].client_coordinates();
                    let p1 = touches[1].client_coordinates();
                    let d = point_distance((p0.x, p0.y), (p1.x, p1.y));
                    let start_d = *pinch_start_distance.read();
                    if start_d < 1.0 {
                        return;
                    }
                    // Doubling the finger distance is one zoom level
                    let (min, max) = zoom_range;
                    let target = (*pinch_start_zoom.read() + (d / start_d).log2()).clamp(min, max);
                    if (target - zoom).abs() > 1e-3 {
                        on_action.call(ViewAction::SetZoom(target));
                    }
                } else if touches.len() == 1 {
                    let p = touches[0].client_coordinates();
                    let cur = (p.x, p.y);
                    if let Some(start) = *touch_start_pos.read() {
                        if !*touch_did_pan.read() && point_distance(start, cur) > TOUCH_DRAG_THRESHOLD {
                            touch_did_pan.set(true);
                        }
                        if *touch_did_pan.read() {
                            let origin = *touch_start_center.read();
                            let (dx, dy) = (cur.0 - start.0, cur.1 - start.1);
                            on_action.call(ViewAction::PanTo(coords::pan_center(origin, zoom, dx, dy)));
                        }
                    }
                }
            },

            ontouchend: move |evt: Event<TouchData>| {
                evt.prevent_default();
                let remaining = evt.data().touches().len();

                if *is_pinching.read() {
                    // Wait for all fingers to lift before resetting pinch state
                    if remaining == 0 {
                        is_pinching.set(false);
                        touch_start_pos.set(None);
                    }
                    return;
                }

                if remaining == 0 && !*touch_did_pan.read() {
                    if let Some(start) = *touch_start_pos.read() {
                        if let Some(point) = surface_point(start.0, start.1, drawn) {
                            dispatch_hit(hit_test(&tap_layer, &viewport, point), &on_action);
                        }
                    }
                }

                if remaining == 0 {
                    touch_start_pos.set(None);
                    touch_did_pan.set(false);
                }
            },

            ontouchcancel: move |_evt: Event<TouchData>| {
                touch_start_pos.set(None);
                touch_did_pan.set(false);
                is_pinching.set(false);
            },

            div {
                class: "map-layer",
                dangerous_inner_html: "{svg_html}",
            }

            div { class: "map-attribution", "© OpenStreetMap contributors" }
        }
    }
}
