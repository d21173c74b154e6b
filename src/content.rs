/// Content script: mounts the bubble overlay into a Messenger page
use crate::dom;
use crate::error::Error;
use crate::scrape::OVERLAY_ID;
use crate::storage::{self, ChromeSyncStorage};
use crate::ui::bubble::{BubbleOverlay, BubbleOverlayProps};
use web_sys::Element;

fn mount_point() -> Result<Element, Error> {
    let document = dom::document().ok_or(Error::MissingDom("document"))?;
    let body = document.body().ok_or(Error::MissingDom("body"))?;

    let host = document.create_element("div").map_err(Error::bridge)?;
    host.set_id(OVERLAY_ID);
    body.append_child(&host).map_err(Error::bridge)?;

    Ok(host)
}

pub async fn run() {
    log::info!("Bubble Chat Enhancer: Initializing...");

    let settings = storage::load_settings(&ChromeSyncStorage).await;
    if !settings.enabled {
        log::info!("Bubble Chat Enhancer: Disabled in settings");
        return;
    }

    dom::wait_for_page_load().await;

    match mount_point() {
        Ok(host) => {
            yew::Renderer::<BubbleOverlay>::with_root_and_props(host, BubbleOverlayProps { settings }).render();
            log::info!("Bubble Chat Enhancer: Initialized successfully");
        }
        Err(e) => log::error!("Bubble Chat Enhancer: Failed to mount overlay: {}", e),
    }
}
