use std::cell::RefCell;
use std::rc::Rc;

use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use venue_map_shared::config::VenueConfig;
use venue_map_shared::display::{DisplayMode, DisplayState};
use venue_map_shared::view::{RenderPlan, ViewAction, ViewState};
use venue_map_shared::zoom::ZoomNotifier;

use crate::api;
use crate::components::map_controls::MapControls;
use crate::components::map_view::MapView;
use crate::components::marker_card::MarkerCard;
use crate::components::search_header::SearchHeader;
use crate::components::side_menu::SideMenu;

/// How long the geolocation error toast stays up.
const TOAST_MS: u32 = 3000;

/// Starting view. A marker link opens centered on that marker, close enough
/// to show it individually, with its card open.
fn initial_view(config: &VenueConfig, marker_id: Option<u32>) -> ViewState {
    let base = ViewState::initial(config);
    let Some(id) = marker_id else {
        return base;
    };
    match config.find_marker(id) {
        Some(marker) => ViewState {
            center: marker.position,
            zoom: config.zoom.clamp(config.zoom.thresholds.close()),
            selected_marker: Some(marker.id),
            ..base
        },
        None => {
            tracing::warn!(marker = id, "Link points at an unknown marker");
            base
        }
    }
}

/// View once the served config arrives. Until the user has touched the map
/// the page starts over from the loaded venue. Afterwards their view is kept,
/// with zoom brought into the new range and selections the venue lacks dropped.
fn view_after_load(
    current: &ViewState,
    loaded: &VenueConfig,
    marker_id: Option<u32>,
    interacted: bool,
) -> ViewState {
    if !interacted {
        return initial_view(loaded, marker_id);
    }
    ViewState {
        zoom: loaded.zoom.clamp(current.zoom),
        selected_marker: current
            .selected_marker
            .filter(|id| loaded.find_marker(*id).is_some()),
        selected_category: current
            .selected_category
            .clone()
            .filter(|id| loaded.find_category(id).is_some()),
        ..current.clone()
    }
}

fn display_for(config: &VenueConfig, zoom: f64) -> Option<DisplayState> {
    DisplayState::for_zoom(zoom, &config.zoom.thresholds, config.zoom.base)
        .map_err(|err| tracing::warn!(%err, "Cannot select display mode"))
        .ok()
}

#[component]
pub fn VenueMap(marker_id: Option<u32>) -> Element {
    let mut config = use_signal(VenueConfig::default);
    let mut view = use_signal(|| initial_view(&VenueConfig::default(), marker_id));
    let mut display = use_signal(|| display_for(&VenueConfig::default(), view.peek().zoom));
    let search = use_signal(String::new);
    let mut toast = use_signal(|| None::<String>);
    let mut locating = use_signal(|| false);
    let mut interacted = use_signal(|| false);

    let notifier = use_hook(|| Rc::new(ZoomNotifier::new()));

    // The display mode follows zoom changes through a scoped subscription,
    // held for the lifetime of the page and released on unmount.
    let subscription = use_hook({
        let notifier = Rc::clone(&notifier);
        move || {
            let mut last_mode: Option<DisplayMode> = (*display.peek()).map(|d| d.mode);
            let sub = notifier.subscribe(move |zoom| {
                let next = display_for(&config.peek(), zoom);
                if let Some(state) = next {
                    if last_mode != Some(state.mode) {
                        tracing::info!(zoom, mode = %state.mode, scale = state.scale, "Display mode changed");
                        last_mode = Some(state.mode);
                    }
                }
                display.set(next);
            });
            Rc::new(RefCell::new(Some(sub)))
        }
    });
    use_drop(move || {
        if let Some(sub) = subscription.borrow_mut().take() {
            sub.release();
        }
    });

    let dispatch = use_callback({
        let notifier = Rc::clone(&notifier);
        move |action: ViewAction| {
            let current = view.peek().clone();
            let applied = current.apply(action, &config.peek());
            match applied {
                Ok(next) => {
                    let zoom_changed = next.zoom != current.zoom;
                    let zoom = next.zoom;
                    view.set(next);
                    if !*interacted.peek() {
                        interacted.set(true);
                    }
                    if zoom_changed {
                        if let Err(err) = notifier.notify(zoom) {
                            tracing::warn!(%err, "Zoom change not delivered");
                        }
                    }
                }
                Err(err) => tracing::warn!(%err, "Ignoring view action"),
            }
        }
    });

    // Venue config is served as a static file; the built-in default stays on failure
    let venue_resource = use_resource(|| api::fetch_venue());
    use_effect({
        let notifier = Rc::clone(&notifier);
        move || match &*venue_resource.read() {
            Some(Ok(loaded)) => {
                let next = view_after_load(&view.peek(), loaded, marker_id, *interacted.peek());
                let zoom = next.zoom;
                config.set(loaded.clone());
                view.set(next);
                if let Err(err) = notifier.notify(zoom) {
                    tracing::warn!(%err, "Zoom change not delivered");
                }
            }
            Some(Err(err)) => {
                tracing::warn!(%err, "Venue config unavailable, using built-in default");
            }
            None => {}
        }
    });

    let on_locate = move |_: ()| {
        locating.set(true);
        spawn(async move {
            match api::current_position().await {
                Ok(position) => {
                    locating.set(false);
                    dispatch.call(ViewAction::PanTo(position));
                }
                Err(err) => {
                    locating.set(false);
                    tracing::warn!(%err, "Geolocation failed");
                    toast.set(Some("現在地を取得できませんでした".to_string()));
                    TimeoutFuture::new(TOAST_MS).await;
                    toast.set(None);
                }
            }
        });
    };

    let plan = use_memo(move || {
        let display = (*display.read())?;
        RenderPlan::with_display(display, &view.read(), &config.read())
            .map_err(|err| tracing::warn!(%err, "Cannot build render plan"))
            .ok()
    });

    let cfg = config.read().clone();
    let state = view.read().clone();
    let query = search.read().clone();
    let current_plan = plan.read().clone();
    let selected_tag = current_plan
        .as_ref()
        .and_then(|p| p.selected.as_ref())
        .and_then(|m| m.category.as_deref())
        .and_then(|id| cfg.find_category(id))
        .cloned();

    rsx! {
        div { class: "app",
            SearchHeader {
                venue_name: cfg.name.clone(),
                categories: cfg.categories.clone(),
                selected_category: state.selected_category.clone(),
                search: search,
                on_action: dispatch,
            }

            SideMenu {
                open: state.menu_open,
                markers: cfg.markers.clone(),
                selected_category: state.selected_category.clone(),
                query: query,
                focus_zoom: cfg.zoom.clamp(cfg.zoom.thresholds.close()),
                on_action: dispatch,
            }

            if let Some(plan) = current_plan {
                MapView {
                    plan: plan.clone(),
                    view: state.clone(),
                    zoom_range: (cfg.zoom.min, cfg.zoom.max),
                    on_action: dispatch,
                }

                MapControls {
                    mode: plan.display.mode,
                    locating: *locating.read(),
                    on_locate: on_locate,
                    on_action: dispatch,
                }

                if let Some(marker) = plan.selected.clone() {
                    MarkerCard {
                        marker: marker,
                        category: selected_tag,
                        on_action: dispatch,
                    }
                }
            }

            if let Some(message) = toast.read().clone() {
                div { class: "toast", role: "status", "{message}" }
            }
        }
    }
}
