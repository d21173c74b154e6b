/// Storage layer over chrome.storage.sync
///
/// Two keys are kept: the settings object and the pinned-chat list. Reads
/// fall back to defaults and writes report failure after logging, so
/// callers never have to unwind a storage error.
use crate::chat_data::PinnedChat;
use crate::error::Error;
use crate::pinned::{PinOutcome, PinnedChats};
use crate::settings::Settings;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use wasm_bindgen::prelude::*;

pub const SETTINGS_KEY: &str = "bubble_settings";
pub const PINNED_CHATS_KEY: &str = "pinned_chats";

// Import JS bridge functions
#[wasm_bindgen(module = "/js/storage.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: JsValue) -> Result<(), JsValue>;
}

/// Asynchronous key-value store holding JSON values
#[allow(async_fn_in_trait)]
pub trait StorageArea {
    async fn get(&self, key: &str) -> Result<Option<Value>, Error>;
    async fn set(&self, key: &str, value: Value) -> Result<(), Error>;
}

/// `chrome.storage.sync`, reached through the JS glue
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeSyncStorage;

impl StorageArea for ChromeSyncStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>, Error> {
        let value_js = getStorage(key).await.map_err(Error::bridge)?;
        if value_js.is_null() || value_js.is_undefined() {
            return Ok(None);
        }
        Ok(Some(serde_wasm_bindgen::from_value(value_js)?))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), Error> {
        setStorage(key, to_js(&value)?).await.map_err(Error::bridge)
    }
}

/// In-memory store, also able to simulate a failing backend
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RefCell<HashMap<String, Value>>,
    failing: Cell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent get/set fail, as a full quota would
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn raw(&self, key: &str) -> Option<Value> {
        self.values.borrow().get(key).cloned()
    }

    fn check(&self) -> Result<(), Error> {
        if self.failing.get() {
            Err(Error::Bridge("QUOTA_BYTES quota exceeded".to_string()))
        } else {
            Ok(())
        }
    }
}

impl StorageArea for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>, Error> {
        self.check()?;
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), Error> {
        self.check()?;
        self.values.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }
}

/// Convert to a plain JS value (objects stay objects rather than `Map`s)
pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, Error> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

async fn read<S: StorageArea, T: DeserializeOwned>(store: &S, key: &str) -> Result<Option<T>, Error> {
    match store.get(key).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

async fn write<S: StorageArea, T: Serialize>(store: &S, key: &str, value: &T) -> Result<(), Error> {
    store.set(key, serde_json::to_value(value)?).await
}

pub async fn load_settings<S: StorageArea>(store: &S) -> Settings {
    match read(store, SETTINGS_KEY).await {
        Ok(settings) => settings.unwrap_or_default(),
        Err(e) => {
            log::error!("Error getting settings: {}", e);
            Settings::default()
        }
    }
}

pub async fn save_settings<S: StorageArea>(store: &S, settings: &Settings) -> bool {
    match write(store, SETTINGS_KEY, settings).await {
        Ok(()) => true,
        Err(e) => {
            log::error!("Error saving settings: {}", e);
            false
        }
    }
}

pub async fn load_pinned_chats<S: StorageArea>(store: &S) -> PinnedChats {
    match read(store, PINNED_CHATS_KEY).await {
        Ok(pinned) => pinned.unwrap_or_default(),
        Err(e) => {
            log::error!("Error getting pinned chats: {}", e);
            PinnedChats::new()
        }
    }
}

pub async fn save_pinned_chats<S: StorageArea>(store: &S, pinned: &PinnedChats) -> bool {
    match write(store, PINNED_CHATS_KEY, pinned).await {
        Ok(()) => true,
        Err(e) => {
            log::error!("Error saving pinned chats: {}", e);
            false
        }
    }
}

/// Pin a chat, persisting only when the list actually changed
pub async fn pin_chat<S: StorageArea>(store: &S, chat: PinnedChat) -> Result<PinOutcome, Error> {
    let mut pinned: PinnedChats = read(store, PINNED_CHATS_KEY).await?.unwrap_or_default();

    let outcome = pinned.pin(chat);
    match outcome {
        PinOutcome::Pinned => write(store, PINNED_CHATS_KEY, &pinned).await?,
        PinOutcome::Full => log::warn!("Maximum {} chats can be pinned", crate::pinned::MAX_PINNED_CHATS),
        PinOutcome::AlreadyPinned => {}
    }

    Ok(outcome)
}

pub async fn unpin_chat<S: StorageArea>(store: &S, thread_id: &str) -> Result<bool, Error> {
    let mut pinned: PinnedChats = read(store, PINNED_CHATS_KEY).await?.unwrap_or_default();

    let removed = pinned.unpin(thread_id);
    if removed {
        write(store, PINNED_CHATS_KEY, &pinned).await?;
    }

    Ok(removed)
}

/// Write default values for any key that is not yet set. Existing values
/// are left untouched, so running this twice is harmless.
pub async fn seed_defaults<S: StorageArea>(store: &S) {
    match store.get(SETTINGS_KEY).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            save_settings(store, &Settings::default()).await;
        }
        Err(e) => log::error!("Error reading settings during install: {}", e),
    }

    match store.get(PINNED_CHATS_KEY).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            save_pinned_chats(store, &PinnedChats::new()).await;
        }
        Err(e) => log::error!("Error reading pinned chats during install: {}", e),
    }
}
