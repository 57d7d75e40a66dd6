use dioxus::prelude::*;
use venue_map_shared::models::Category;
use venue_map_shared::view::ViewAction;

/// Inline style for a category pill. Active pills are filled with the category color.
fn pill_style(color: &str, active: bool) -> String {
    if active {
        format!("background: {color}; border-color: {color}; color: white;")
    } else {
        format!("border-color: {color}; color: {color};")
    }
}

#[component]
pub fn SearchHeader(
    venue_name: String,
    categories: Vec<Category>,
    selected_category: Option<String>,
    search: Signal<String>,
    on_action: EventHandler<ViewAction>,
) -> Element {
    rsx! {
        div { class: "header",
            div { class: "search-row",
                button {
                    class: "icon-button",
                    "aria-label": "Open menu",
                    onclick: move |_| on_action.call(ViewAction::ToggleMenu),
                    "☰"
                }
                input {
                    class: "search-input",
                    r#type: "search",
                    placeholder: "{venue_name}を検索",
                    value: "{search}",
                    oninput: move |evt: Event<FormData>| {
                        search.set(evt.value().to_string());
                    },
                }
            }
            div { class: "category-pills",
                for cat in categories {
                    button {
                        key: "{cat.id}",
                        class: "category-pill",
                        style: pill_style(&cat.color, selected_category.as_deref() == Some(cat.id.as_str())),
                        onclick: {
                            let id = cat.id.clone();
                            move |_| on_action.call(ViewAction::SelectCategory(id.clone()))
                        },
                        "{cat.name}"
                    }
                }
            }
        }
    }
}
