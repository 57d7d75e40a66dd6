use dioxus::prelude::*;
use venue_map_shared::models::{Category, Marker};
use venue_map_shared::view::ViewAction;

use crate::api;

#[component]
pub fn MarkerCard(
    marker: Marker,
    category: Option<Category>,
    on_action: EventHandler<ViewAction>,
) -> Element {
    let share_url = api::page_origin()
        .ok()
        .map(|origin| api::build_marker_url(&origin, marker.id));

    rsx! {
        div { class: "marker-card",
            div { class: "marker-card-header",
                img { src: "{marker.image}", alt: "" }
                h3 { "{marker.title}" }
                button {
                    class: "icon-button",
                    "aria-label": "閉じる",
                    onclick: move |_| on_action.call(ViewAction::SelectMarker(None)),
                    "×"
                }
            }
            if let Some(cat) = &category {
                span {
                    class: "category-tag",
                    style: "background: {cat.color};",
                    "{cat.name}"
                }
            }
            p { class: "marker-position", "{marker.position}" }
            if let Some(url) = share_url {
                div { class: "share-url",
                    input {
                        r#type: "text",
                        readonly: true,
                        value: "{url}",
                    }
                    button {
                        class: "secondary",
                        onclick: {
                            let url = url.clone();
                            move |_| {
                                let url = url.clone();
                                wasm_bindgen_futures::spawn_local(async move {
                                    if let Some(window) = web_sys::window() {
                                        let clipboard = window.navigator().clipboard();
                                        let _ = wasm_bindgen_futures::JsFuture::from(
                                            clipboard.write_text(&url)
                                        ).await;
                                    }
                                });
                            }
                        },
                        "コピー"
                    }
                }
            }
        }
    }
}
