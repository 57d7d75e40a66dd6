mod api;
mod components;
mod coords;
mod pages;

use dioxus::prelude::*;

#[derive(Routable, Clone, PartialEq)]
enum Route {
    #[route("/")]
    Home {},
    #[route("/marker/:id")]
    MarkerView { id: u32 },
}

#[component]
fn Home() -> Element {
    rsx! {
        pages::venue_map::VenueMap { marker_id: None::<u32> }
    }
}

#[component]
fn MarkerView(id: u32) -> Element {
    rsx! {
        pages::venue_map::VenueMap { marker_id: Some(id) }
    }
}

const CSS: Asset = asset!("/assets/main.css");
const FAVICON: Asset = asset!("/assets/favicon.svg");

#[allow(non_snake_case)]
fn App() -> Element {
    rsx! {
        document::Link { rel: "icon", r#type: "image/svg+xml", href: FAVICON }
        document::Stylesheet { href: CSS }
        Router::<Route> {}
    }
}

fn main() {
    launch(App);
}
