use dioxus::prelude::*;
use venue_map_shared::display::DisplayMode;
use venue_map_shared::view::ViewAction;

#[component]
pub fn MapControls(
    mode: DisplayMode,
    locating: bool,
    on_locate: EventHandler<()>,
    on_action: EventHandler<ViewAction>,
) -> Element {
    rsx! {
        div { class: "map-controls",
            button {
                class: "icon-button",
                "aria-label": "現在地",
                disabled: locating,
                onclick: move |_| on_locate.call(()),
                "◎"
            }
            button {
                class: "icon-button",
                "aria-label": "縮小",
                onclick: move |_| on_action.call(ViewAction::ZoomOut),
                "−"
            }
            button {
                class: "reset-button",
                onclick: move |_| on_action.call(ViewAction::ResetView),
                "リセット"
            }
            button {
                class: "icon-button",
                "aria-label": "拡大",
                onclick: move |_| on_action.call(ViewAction::ZoomIn),
                "+"
            }
            span { class: "mode-badge mode-{mode}", "{mode}" }
        }
    }
}
