/// Bubble Chat Enhancer - Chrome Extension adding a floating chat bubble to Messenger
/// Built with Rust + WASM + Yew

mod background;
mod chat_data;
mod content;
mod debounce;
mod dom;
mod error;
mod host;
mod messages;
mod overlay;
mod pinned;
mod runtime;
mod scrape;
mod settings;
mod storage;
pub mod ui;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

pub use background::start_background;

#[cfg(all(test, target_arch = "wasm32"))]
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Re-export site matching for the JS glue
#[wasm_bindgen]
pub fn is_messenger_url(url: &str) -> bool {
    host::is_messenger_url(url)
}

// Inject the bubble overlay into the current Messenger page
#[wasm_bindgen]
pub fn start_content() {
    spawn_local(content::run());
}

// Start the Yew app for the settings popup
#[wasm_bindgen]
pub fn start_settings_popup() {
    yew::Renderer::<ui::settings::SettingsPopup>::new().render();
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    const MANIFEST: &str = include_str!("../extension/manifest.json");
    const POPUP_PAGE: &str = include_str!("../extension/popup.html");
    const WORKER_ENTRY: &str = include_str!("../extension/background.js");
    const WORKER_GLUE: &str = include_str!("../js/background.js");

    #[test]
    fn test_manifest_wiring() {
        let manifest: Value = serde_json::from_str(MANIFEST).unwrap();

        assert_eq!(manifest["manifest_version"], 3);
        assert_eq!(manifest["background"]["service_worker"], "background.js");
        assert_eq!(manifest["background"]["type"], "module");
        assert_eq!(manifest["action"]["default_popup"], "popup.html");
        assert_eq!(manifest["content_scripts"][0]["js"][0], "content.js");
    }

    #[test]
    fn test_popup_page_loads_script_from_file() {
        // Extension pages may not run inline scripts
        assert!(POPUP_PAGE.contains(r#"<script type="module" src="popup.js"></script>"#));
        assert_eq!(POPUP_PAGE.matches("<script").count(), 1);
    }

    #[test]
    fn test_worker_entry_has_no_top_level_await() {
        assert!(!WORKER_ENTRY.lines().any(|line| line.starts_with("await ")));
        assert!(WORKER_ENTRY.contains("init().then(() => start_background())"));
    }

    #[test]
    fn test_worker_listeners_added_at_import() {
        for listener in [
            "chrome.runtime.onInstalled.addListener",
            "chrome.runtime.onMessage.addListener",
            "chrome.storage.onChanged.addListener",
        ] {
            let at_top_level = WORKER_GLUE
                .lines()
                .any(|line| line.strip_prefix("  ").is_some_and(|rest| rest.starts_with(listener)));
            assert!(at_top_level, "{} is not added at import time", listener);
        }
        assert!(WORKER_GLUE.contains("export function registerHandlers(installed, request, storageChanged)"));
    }
}
