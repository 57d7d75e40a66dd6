use venue_map_shared::config::VenueConfig;
use venue_map_shared::models::LatLng;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

/// Build the venue config URL from the page origin.
pub fn venue_config_url(origin: &str) -> String {
    format!("{}/static/venue.json", origin)
}

/// Build a shareable link that opens the map focused on one marker.
pub fn build_marker_url(origin: &str, marker_id: u32) -> String {
    format!("{}/marker/{}", origin, marker_id)
}

pub fn page_origin() -> Result<String, String> {
    let window = web_sys::window().ok_or("no window")?;
    window
        .location()
        .origin()
        .map_err(|_| "could not read page origin".to_string())
}

/// Fetch and validate the venue configuration served next to the app.
pub async fn fetch_venue() -> Result<VenueConfig, String> {
    let url = venue_config_url(&page_origin()?);
    let resp = reqwest::Client::new()
        .get(&url)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !resp.status().is_success() {
        return Err(format!("GET {} returned {}", url, resp.status()));
    }

    let body = resp.text().await.map_err(|e| e.to_string())?;
    VenueConfig::from_json(&body).map_err(|e| e.to_string())
}

/// Ask the browser for the device position.
pub async fn current_position() -> Result<LatLng, String> {
    let geolocation = web_sys::window()
        .ok_or("no window")?
        .navigator()
        .geolocation()
        .map_err(|_| "geolocation unavailable".to_string())?;

    let promise = js_sys::Promise::new(&mut |resolve, reject| {
        if let Err(err) = geolocation.get_current_position_with_error_callback(&resolve, Some(&reject)) {
            let _ = reject.call1(&wasm_bindgen::JsValue::NULL, &err);
        }
    });

    let value = JsFuture::from(promise).await.map_err(|err| {
        err.dyn_ref::<web_sys::GeolocationPositionError>()
            .map(|e| e.message())
            .unwrap_or_else(|| "geolocation failed".to_string())
    })?;

    let position: web_sys::GeolocationPosition = value
        .dyn_into()
        .map_err(|_| "unexpected geolocation result".to_string())?;
    let coords = position.coords();
    Ok(LatLng::new(coords.latitude(), coords.longitude()))
}
