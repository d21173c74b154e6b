/// chrome.runtime messaging from the popup and content script side
use crate::error::Error;
use crate::messages::{Notification, Request};
use crate::storage::to_js;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/js/runtime.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn sendMessage(message: JsValue) -> Result<JsValue, JsValue>;

    fn addMessageListener(callback: &js_sys::Function);

    fn removeMessageListener(callback: &js_sys::Function);
}

/// Send a request to the background worker and decode its response
pub async fn request<T: DeserializeOwned>(request: &Request) -> Result<T, Error> {
    let response = sendMessage(to_js(request)?).await.map_err(Error::bridge)?;
    Ok(serde_wasm_bindgen::from_value(response)?)
}

/// Receives background pushes until dropped
pub struct NotificationListener {
    callback: Closure<dyn FnMut(JsValue)>,
}

impl NotificationListener {
    pub fn new(mut on_notification: impl FnMut(Notification) + 'static) -> Self {
        let callback = Closure::<dyn FnMut(JsValue)>::new(move |message: JsValue| {
            match serde_wasm_bindgen::from_value::<Notification>(message) {
                Ok(notification) => on_notification(notification),
                Err(e) => log::debug!("Ignoring runtime message: {}", e),
            }
        });
        addMessageListener(callback.as_ref().unchecked_ref());

        NotificationListener { callback }
    }
}

impl Drop for NotificationListener {
    fn drop(&mut self) {
        removeMessageListener(self.callback.as_ref().unchecked_ref());
    }
}
