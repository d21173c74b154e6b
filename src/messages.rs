/// Runtime messages exchanged between the background worker, content
/// scripts and the settings popup
use crate::pinned::PinnedChats;
use crate::settings::Settings;
use serde::{Deserialize, Serialize};

/// Requests answered by the background worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    GetSettings,
    SaveSettings {
        settings: Settings,
    },
    GetPinnedChats,
    SavePinnedChats {
        #[serde(rename = "pinnedChats")]
        pinned_chats: PinnedChats,
    },
}

/// Pushed by the background worker to matching tabs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Notification {
    SettingsUpdated { settings: Settings },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Settings(Settings),
    PinnedChats(PinnedChats),
    Ack(Ack),
}

impl Response {
    pub fn ack(success: bool) -> Self {
        Response::Ack(Ack { success })
    }
}
