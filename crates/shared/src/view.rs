use serde::{Deserialize, Serialize};

use crate::config::VenueConfig;
use crate::display::{DisplayMode, DisplayState};
use crate::error::{ensure_finite_zoom, MapResult};
use crate::grid::{group_markers, CellSize, Cluster};
use crate::models::{FloorPlan, LatLng, Marker, MarkerId};

/// Zoom change per zoom button press.
pub const ZOOM_STEP: f64 = 1.0;

/// Everything the map page shows that can change during a session.
/// Never mutated in place: every interaction produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub center: LatLng,
    pub zoom: f64,
    pub menu_open: bool,
    pub selected_category: Option<String>,
    pub selected_marker: Option<MarkerId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewAction {
    ZoomIn,
    ZoomOut,
    /// Zoom reported by the map surface (wheel, pinch).
    SetZoom(f64),
    ResetView,
    PanTo(LatLng),
    ToggleMenu,
    /// Selecting the active category again clears the filter.
    SelectCategory(String),
    SelectMarker(Option<MarkerId>),
}

impl ViewState {
    pub fn initial(config: &VenueConfig) -> Self {
        ViewState {
            center: config.center,
            zoom: config.zoom.base,
            menu_open: false,
            selected_category: None,
            selected_marker: None,
        }
    }

    /// Produce the state after `action`. Zoom always stays inside the
    /// configured range; a non-finite zoom from the surface is rejected.
    pub fn apply(&self, action: ViewAction, config: &VenueConfig) -> MapResult<Self> {
        let mut next = self.clone();
        match action {
            ViewAction::ZoomIn => next.zoom = config.zoom.clamp(self.zoom + ZOOM_STEP),
            ViewAction::ZoomOut => next.zoom = config.zoom.clamp(self.zoom - ZOOM_STEP),
            ViewAction::SetZoom(zoom) => {
                next.zoom = config.zoom.clamp(ensure_finite_zoom(zoom)?);
            }
            ViewAction::ResetView => {
                next.center = config.center;
                next.zoom = config.zoom.base;
            }
            ViewAction::PanTo(center) => next.center = center,
            ViewAction::ToggleMenu => next.menu_open = !self.menu_open,
            ViewAction::SelectCategory(id) => {
                next.selected_category = if self.selected_category.as_deref() == Some(id.as_str()) {
                    None
                } else {
                    Some(id)
                };
            }
            ViewAction::SelectMarker(id) => next.selected_marker = id,
        }
        Ok(next)
    }
}

/// Floor-plan image placement for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayRender {
    pub image: String,
    pub center: LatLng,
    pub width_px: f64,
    pub height_px: f64,
    pub opacity: f64,
}

/// Detailed image once zoomed in past `far`, sized by the scale factor.
pub fn overlay_for(plan: &FloorPlan, display: &DisplayState) -> OverlayRender {
    let image = match display.mode {
        DisplayMode::Far => &plan.overview_image,
        DisplayMode::Medium | DisplayMode::Close => &plan.detailed_image,
    };
    OverlayRender {
        image: image.clone(),
        center: plan.center,
        width_px: plan.width_px * display.scale,
        height_px: plan.height_px * display.scale,
        opacity: plan.opacity,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarkerLayer {
    Hidden,
    Clusters(Vec<Cluster>),
    Individual(Vec<Marker>),
}

/// Markers passing the category filter. No filter keeps everything.
pub fn visible_markers(markers: &[Marker], category: Option<&str>) -> Vec<Marker> {
    match category {
        None => markers.to_vec(),
        Some(cat) => markers
            .iter()
            .filter(|m| m.category.as_deref() == Some(cat))
            .cloned()
            .collect(),
    }
}

pub fn marker_layer(mode: DisplayMode, markers: Vec<Marker>, cell: CellSize) -> MapResult<MarkerLayer> {
    let layer = match mode {
        DisplayMode::Far => MarkerLayer::Hidden,
        DisplayMode::Medium => MarkerLayer::Clusters(group_markers(&markers, cell)?),
        DisplayMode::Close => MarkerLayer::Individual(markers),
    };
    Ok(layer)
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub display: DisplayState,
    pub overlay: OverlayRender,
    pub markers: MarkerLayer,
    pub selected: Option<Marker>,
}

impl RenderPlan {
    /// Build the plan for an already selected display state, e.g. one
    /// delivered by a zoom listener.
    pub fn with_display(display: DisplayState, state: &ViewState, config: &VenueConfig) -> MapResult<Self> {
        let overlay = overlay_for(&config.floor_plan, &display);
        let candidates = visible_markers(&config.markers, state.selected_category.as_deref());
        let markers = marker_layer(display.mode, candidates, config.cell_size)?;
        let selected = state
            .selected_marker
            .and_then(|id| config.find_marker(id))
            .cloned();
        Ok(RenderPlan {
            display,
            overlay,
            markers,
            selected,
        })
    }
}

/// Decide everything drawn on top of the map for `state`.
pub fn render_plan(state: &ViewState, config: &VenueConfig) -> MapResult<RenderPlan> {
    let display = DisplayState::for_zoom(state.zoom, &config.zoom.thresholds, config.zoom.base)?;
    RenderPlan::with_display(display, state, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MAX_ZOOM, MIN_ZOOM};
    use crate::error::MapError;

    fn config() -> VenueConfig {
        VenueConfig::default()
    }

    /// Markers represented by a layer, counting cluster members.
    fn marker_count(layer: &MarkerLayer) -> usize {
        match layer {
            MarkerLayer::Hidden => 0,
            MarkerLayer::Clusters(clusters) => clusters.iter().map(Cluster::len).sum(),
            MarkerLayer::Individual(markers) => markers.len(),
        }
    }

    fn at_zoom(zoom: f64) -> ViewState {
        ViewState {
            zoom,
            ..ViewState::initial(&config())
        }
    }

    #[test]
    fn test_initial_state_uses_venue_center_and_base_zoom() {
        let state = ViewState::initial(&config());
        assert_eq!(state.center, config().center);
        assert_eq!(state.zoom, 16.0);
        assert!(!state.menu_open);
    }

    #[test]
    fn test_zoom_in_and_out_step_by_one() {
        let cfg = config();
        let state = ViewState::initial(&cfg);
        let zoomed = state.apply(ViewAction::ZoomIn, &cfg).unwrap();
        assert_eq!(zoomed.zoom, 17.0);
        let back = zoomed.apply(ViewAction::ZoomOut, &cfg).unwrap();
        assert_eq!(back.zoom, 16.0);
        // Original value untouched
        assert_eq!(state.zoom, 16.0);
    }

    #[test]
    fn test_zoom_in_clamps_at_max() {
        let cfg = config();
        let state = at_zoom(MAX_ZOOM - 0.5).apply(ViewAction::ZoomIn, &cfg).unwrap();
        assert_eq!(state.zoom, MAX_ZOOM);
    }

    #[test]
    fn test_zoom_out_clamps_at_min() {
        let cfg = config();
        let state = at_zoom(MIN_ZOOM).apply(ViewAction::ZoomOut, &cfg).unwrap();
        assert_eq!(state.zoom, MIN_ZOOM);
    }

    #[test]
    fn test_set_zoom_clamps_and_rejects_nan() {
        let cfg = config();
        let state = ViewState::initial(&cfg);
        assert_eq!(state.apply(ViewAction::SetZoom(40.0), &cfg).unwrap().zoom, MAX_ZOOM);
        assert!(matches!(
            state.apply(ViewAction::SetZoom(f64::NAN), &cfg),
            Err(MapError::NonFiniteZoom(_))
        ));
    }

    #[test]
    fn test_reset_restores_center_and_zoom() {
        let cfg = config();
        let moved = ViewState::initial(&cfg)
            .apply(ViewAction::PanTo(LatLng::new(35.0, 139.0)), &cfg)
            .unwrap()
            .apply(ViewAction::SetZoom(12.0), &cfg)
            .unwrap();
        let reset = moved.apply(ViewAction::ResetView, &cfg).unwrap();
        assert_eq!(reset.center, cfg.center);
        assert_eq!(reset.zoom, cfg.zoom.base);
    }

    #[test]
    fn test_toggle_menu() {
        let cfg = config();
        let open = ViewState::initial(&cfg).apply(ViewAction::ToggleMenu, &cfg).unwrap();
        assert!(open.menu_open);
        assert!(!open.apply(ViewAction::ToggleMenu, &cfg).unwrap().menu_open);
    }

    #[test]
    fn test_select_category_twice_clears() {
        let cfg = config();
        let state = ViewState::initial(&cfg)
            .apply(ViewAction::SelectCategory("gourmet".to_string()), &cfg)
            .unwrap();
        assert_eq!(state.selected_category.as_deref(), Some("gourmet"));
        let switched = state
            .apply(ViewAction::SelectCategory("shopping".to_string()), &cfg)
            .unwrap();
        assert_eq!(switched.selected_category.as_deref(), Some("shopping"));
        let cleared = switched
            .apply(ViewAction::SelectCategory("shopping".to_string()), &cfg)
            .unwrap();
        assert_eq!(cleared.selected_category, None);
    }

    #[test]
    fn test_render_far_hides_markers_and_uses_overview() {
        let cfg = config();
        let plan = render_plan(&at_zoom(15.0), &cfg).unwrap();
        assert_eq!(plan.display.mode, DisplayMode::Far);
        assert_eq!(plan.markers, MarkerLayer::Hidden);
        assert_eq!(plan.overlay.image, cfg.floor_plan.overview_image);
        assert!((plan.overlay.width_px - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_render_medium_clusters_venue_pins() {
        let cfg = config();
        let plan = render_plan(&at_zoom(17.0), &cfg).unwrap();
        assert_eq!(plan.display.mode, DisplayMode::Medium);
        assert!((plan.display.scale - 2.0).abs() < 1e-12);
        assert_eq!(plan.overlay.image, cfg.floor_plan.detailed_image);
        assert!((plan.overlay.width_px - 1200.0).abs() < 1e-9);
        assert!((plan.overlay.height_px - 800.0).abs() < 1e-9);

        let MarkerLayer::Clusters(clusters) = &plan.markers else {
            panic!("expected clusters, got {:?}", plan.markers);
        };
        // Pins 1 and 3 share a cell; 2 and 4 are alone
        assert_eq!(clusters.len(), 3);
        let pair = clusters.iter().find(|c| c.len() == 2).unwrap();
        let mut ids: Vec<u32> = pair.members.iter().map(|m| m.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(marker_count(&plan.markers), cfg.markers.len());
    }

    #[test]
    fn test_render_close_shows_every_marker() {
        let cfg = config();
        let plan = render_plan(&at_zoom(18.0), &cfg).unwrap();
        assert_eq!(plan.display.mode, DisplayMode::Close);
        assert_eq!(plan.markers, MarkerLayer::Individual(cfg.markers.clone()));
    }

    #[test]
    fn test_render_category_filter_applies_before_grouping() {
        let cfg = config();
        let state = at_zoom(17.0)
            .apply(ViewAction::SelectCategory("sightseeing".to_string()), &cfg)
            .unwrap();
        let plan = render_plan(&state, &cfg).unwrap();
        assert_eq!(marker_count(&plan.markers), 2);
    }

    #[test]
    fn test_render_resolves_selected_marker() {
        let cfg = config();
        let state = at_zoom(18.0)
            .apply(ViewAction::SelectMarker(Some(2)), &cfg)
            .unwrap();
        let plan = render_plan(&state, &cfg).unwrap();
        assert_eq!(plan.selected.unwrap().id, 2);

        let unknown = at_zoom(18.0)
            .apply(ViewAction::SelectMarker(Some(42)), &cfg)
            .unwrap();
        assert!(render_plan(&unknown, &cfg).unwrap().selected.is_none());
    }

    #[test]
    fn test_render_with_no_markers() {
        let mut cfg = config();
        cfg.markers.clear();
        let plan = render_plan(&at_zoom(17.0), &cfg).unwrap();
        assert_eq!(plan.markers, MarkerLayer::Clusters(Vec::new()));
    }

    #[test]
    fn test_with_display_matches_render_plan() {
        let cfg = config();
        // Close mode keeps input order, so the two plans compare exactly
        let state = at_zoom(18.5);
        let display = DisplayState::for_zoom(18.5, &cfg.zoom.thresholds, cfg.zoom.base).unwrap();
        assert_eq!(
            RenderPlan::with_display(display, &state, &cfg).unwrap(),
            render_plan(&state, &cfg).unwrap()
        );
    }

    #[test]
    fn test_visible_markers_without_filter_keeps_all() {
        let cfg = config();
        assert_eq!(visible_markers(&cfg.markers, None).len(), cfg.markers.len());
        assert!(visible_markers(&cfg.markers, Some("nope")).is_empty());
    }

    #[test]
    fn test_render_medium_fails_on_unrepresentable_cells() {
        let mut cfg = config();
        cfg.cell_size = CellSize::new(1e-18).unwrap();
        assert!(matches!(
            render_plan(&at_zoom(17.0), &cfg),
            Err(MapError::CellIndexOutOfRange { .. })
        ));
        // Far and close never grid the markers
        assert!(render_plan(&at_zoom(18.0), &cfg).is_ok());
    }
}
