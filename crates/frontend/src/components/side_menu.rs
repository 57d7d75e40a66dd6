use dioxus::prelude::*;
use venue_map_shared::models::Marker;
use venue_map_shared::view::{visible_markers, ViewAction};

/// Markers passing the category filter whose title contains `query`.
/// Matching ignores ASCII case and surrounding whitespace.
fn matching_markers(markers: &[Marker], category: Option<&str>, query: &str) -> Vec<Marker> {
    let needle = query.trim().to_lowercase();
    visible_markers(markers, category)
        .into_iter()
        .filter(|m| needle.is_empty() || m.title.to_lowercase().contains(&needle))
        .collect()
}

#[component]
pub fn SideMenu(
    open: bool,
    markers: Vec<Marker>,
    selected_category: Option<String>,
    query: String,
    // Zoom used when jumping to a marker, deep enough to show it on its own
    focus_zoom: f64,
    on_action: EventHandler<ViewAction>,
) -> Element {
    if !open {
        return rsx! {};
    }

    let matches = matching_markers(&markers, selected_category.as_deref(), &query);

    rsx! {
        div {
            class: "side-menu-backdrop",
            onclick: move |_| on_action.call(ViewAction::ToggleMenu),

            nav {
                class: "side-menu",
                onclick: move |evt: Event<MouseData>| evt.stop_propagation(),

                h2 { "スポット一覧" }
                if matches.is_empty() {
                    p { class: "empty", "該当するスポットがありません" }
                }
                ul {
                    for marker in matches {
                        li {
                            key: "{marker.id}",
                            button {
                                onclick: {
                                    let id = marker.id;
                                    let position = marker.position;
                                    move |_| {
                                        on_action.call(ViewAction::PanTo(position));
                                        on_action.call(ViewAction::SetZoom(focus_zoom));
                                        on_action.call(ViewAction::SelectMarker(Some(id)));
                                        on_action.call(ViewAction::ToggleMenu);
                                    }
                                },
                                img { src: "{marker.image}", alt: "" }
                                span { "{marker.title}" }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use venue_map_shared::config::VenueConfig;

    fn ids(markers: &[Marker]) -> Vec<u32> {
        markers.iter().map(|m| m.id).collect()
    }

    #[test]
    fn test_empty_query_keeps_everything() {
        let config = VenueConfig::default();
        let found = matching_markers(&config.markers, None, "  ");
        assert_eq!(found.len(), config.markers.len());
    }

    #[test]
    fn test_query_matches_title_substring() {
        let config = VenueConfig::default();
        assert_eq!(ids(&matching_markers(&config.markers, None, "展示")), vec![4]);
    }

    #[test]
    fn test_query_and_category_combine() {
        let config = VenueConfig::default();
        assert_eq!(
            ids(&matching_markers(&config.markers, Some("sightseeing"), "ビッグ")),
            vec![1]
        );
        assert!(matching_markers(&config.markers, Some("gourmet"), "ビッグ").is_empty());
    }

    #[test]
    fn test_query_ignores_ascii_case() {
        let mut config = VenueConfig::default();
        config.markers[0].title = "Big Sight".to_string();
        assert_eq!(ids(&matching_markers(&config.markers, None, "big")), vec![1]);
    }
}
