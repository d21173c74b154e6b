/// Background service worker: seeds storage on install, answers runtime
/// requests and fans settings changes out to open Messenger tabs
use crate::chat_data::TabInfo;
use crate::error::Error;
use crate::host::is_messenger_url;
use crate::messages::{Notification, Request, Response};
use crate::settings::Settings;
use crate::storage::{self, ChromeSyncStorage, StorageArea, SETTINGS_KEY};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

// Import JS bridge functions
#[wasm_bindgen(module = "/js/background.js")]
extern "C" {
    fn registerHandlers(
        installed: &js_sys::Function,
        request: &js_sys::Function,
        storage_changed: &js_sys::Function,
    );

    #[wasm_bindgen(catch)]
    async fn queryTabs() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendTabMessage(tab_id: i32, message: JsValue) -> Result<(), JsValue>;
}

/// One entry of a `chrome.storage.onChanged` payload
#[derive(Debug, Deserialize)]
struct StorageChange {
    #[serde(rename = "newValue", default)]
    new_value: Option<Value>,
}

/// Answer a runtime request against the given store
pub async fn handle_request<S: StorageArea>(store: &S, request: Request) -> Response {
    match request {
        Request::GetSettings => Response::Settings(storage::load_settings(store).await),
        Request::SaveSettings { settings } => {
            Response::ack(storage::save_settings(store, &settings).await)
        }
        Request::GetPinnedChats => Response::PinnedChats(storage::load_pinned_chats(store).await),
        Request::SavePinnedChats { pinned_chats } => {
            Response::ack(storage::save_pinned_chats(store, &pinned_chats).await)
        }
    }
}

/// IDs of the tabs that should hear about a settings change
pub fn tabs_to_notify(tabs: &[TabInfo]) -> Vec<i32> {
    tabs.iter()
        .filter(|tab| tab.url.as_deref().is_some_and(is_messenger_url))
        .map(|tab| tab.id)
        .collect()
}

/// New settings carried by a storage change event, if the change touched them
pub fn updated_settings(area: &str, changes: Value) -> Option<Settings> {
    if area != "sync" {
        return None;
    }

    let mut changes: HashMap<String, StorageChange> = serde_json::from_value(changes).ok()?;
    let new_value = changes.remove(SETTINGS_KEY)?.new_value?;

    match serde_json::from_value(new_value) {
        Ok(settings) => Some(settings),
        Err(e) => {
            log::warn!("Ignoring malformed settings change: {}", e);
            None
        }
    }
}

async fn notify_tabs(settings: Settings) -> Result<(), Error> {
    let tabs_js = queryTabs().await.map_err(Error::bridge)?;
    let tabs: Vec<TabInfo> = serde_wasm_bindgen::from_value(tabs_js)?;
    let message = storage::to_js(&Notification::SettingsUpdated { settings })?;

    for tab_id in tabs_to_notify(&tabs) {
        // Tabs whose content script has not loaded yet have no receiver
        if let Err(e) = sendTabMessage(tab_id, message.clone()).await {
            log::debug!("Tab {} did not accept settings update: {:?}", tab_id, e);
        }
    }

    Ok(())
}

#[wasm_bindgen]
pub fn start_background() {
    let on_installed = Closure::<dyn FnMut()>::new(|| {
        log::info!("Bubble Chat Enhancer: Extension installed");
        spawn_local(storage::seed_defaults(&ChromeSyncStorage));
    });

    // Returning undefined tells the glue not to hold the response channel open
    let on_request = Closure::<dyn FnMut(JsValue) -> JsValue>::new(|request_js: JsValue| {
        let request: Request = match serde_wasm_bindgen::from_value(request_js) {
            Ok(request) => request,
            Err(e) => {
                log::debug!("Ignoring runtime message: {}", e);
                return JsValue::UNDEFINED;
            }
        };

        future_to_promise(async move {
            let response = handle_request(&ChromeSyncStorage, request).await;
            storage::to_js(&response).map_err(|e| JsValue::from_str(&e.to_string()))
        })
        .into()
    });

    let on_changed = Closure::<dyn FnMut(JsValue, String)>::new(|changes_js: JsValue, area: String| {
        let changes: Value = match serde_wasm_bindgen::from_value(changes_js) {
            Ok(changes) => changes,
            Err(e) => {
                log::error!("Failed to parse storage change: {}", e);
                return;
            }
        };

        if let Some(settings) = updated_settings(&area, changes) {
            log::info!("Settings updated: {:?}", settings);
            spawn_local(async move {
                if let Err(e) = notify_tabs(settings).await {
                    log::error!("Failed to notify tabs: {}", e);
                }
            });
        }
    });

    registerHandlers(
        on_installed.as_ref().unchecked_ref(),
        on_request.as_ref().unchecked_ref(),
        on_changed.as_ref().unchecked_ref(),
    );
    on_installed.forget();
    on_request.forget();
    on_changed.forget();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat_data::PinnedChat;
    use crate::pinned::PinnedChats;
    use crate::settings::{Position, Theme};
    use crate::storage::{MemoryStorage, PINNED_CHATS_KEY};
    use futures::executor::block_on;
    use serde_json::json;

    fn chat(thread_id: &str) -> PinnedChat {
        PinnedChat {
            thread_id: thread_id.to_string(),
            name: thread_id.to_string(),
            avatar: None,
        }
    }

    fn tab(id: i32, url: Option<&str>) -> TabInfo {
        TabInfo {
            id,
            url: url.map(str::to_string),
        }
    }

    #[test]
    fn test_save_then_get_settings() {
        let store = MemoryStorage::new();
        let settings = Settings {
            position: Position::BottomLeft,
            theme: Theme::Dark,
            ..Settings::default()
        };

        let saved = block_on(handle_request(&store, Request::SaveSettings { settings }));
        let loaded = block_on(handle_request(&store, Request::GetSettings));

        assert_eq!(saved, Response::ack(true));
        assert_eq!(loaded, Response::Settings(settings));
    }

    #[test]
    fn test_get_pinned_chats_empty_store() {
        let store = MemoryStorage::new();

        let response = block_on(handle_request(&store, Request::GetPinnedChats));

        assert_eq!(response, Response::PinnedChats(PinnedChats::new()));
    }

    #[test]
    fn test_save_pinned_chats() {
        let store = MemoryStorage::new();
        let pinned_chats = PinnedChats::from_entries(vec![chat("1"), chat("2")]);

        let response = block_on(handle_request(&store, Request::SavePinnedChats { pinned_chats }));

        assert_eq!(response, Response::ack(true));
        assert_eq!(store.raw(PINNED_CHATS_KEY).unwrap().as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_save_reports_failure() {
        let store = MemoryStorage::new();
        store.set_failing(true);

        let response = block_on(handle_request(
            &store,
            Request::SaveSettings {
                settings: Settings::default(),
            },
        ));

        assert_eq!(response, Response::ack(false));
    }

    #[test]
    fn test_tabs_to_notify() {
        let tabs = vec![
            tab(1, Some("https://www.messenger.com/t/123")),
            tab(2, Some("https://github.com/rust-lang/rust")),
            tab(3, None),
            tab(4, Some("https://www.facebook.com/messages/t/9")),
            tab(5, Some("https://www.facebook.com/marketplace")),
        ];

        assert_eq!(tabs_to_notify(&tabs), vec![1, 4]);
    }

    #[test]
    fn test_updated_settings() {
        let changes = json!({
            "bubble_settings": {
                "oldValue": {"enabled": true, "position": "bottom-right", "size": "medium", "theme": "light"},
                "newValue": {"enabled": true, "position": "bottom-right", "size": "medium", "theme": "dark"}
            }
        });

        let settings = updated_settings("sync", changes).unwrap();

        assert_eq!(settings.theme, Theme::Dark);
    }

    #[test]
    fn test_updated_settings_ignores_other_changes() {
        let pinned_only = json!({"pinned_chats": {"newValue": []}});
        let local_area = json!({"bubble_settings": {"newValue": {"enabled": false}}});
        let removed = json!({"bubble_settings": {"oldValue": {"enabled": false}}});

        assert_eq!(updated_settings("sync", pinned_only), None);
        assert_eq!(updated_settings("local", local_area), None);
        assert_eq!(updated_settings("sync", removed), None);
    }
}
