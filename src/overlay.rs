/// Content overlay state: collapsed/expanded, unread badge, scraped data
/// and popup position
use crate::chat_data::{ConversationSnapshot, PinnedChat, ScrapedMessage};
use crate::error::Error;
use crate::pinned::{PinOutcome, MAX_PINNED_CHATS};
use crate::settings::Settings;
use crate::storage::{self, StorageArea};
use std::rc::Rc;
use yew::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayState {
    pub settings: Settings,
    pub expanded: bool,
    /// The popup is created on first expand and only hidden afterwards
    pub popup_created: bool,
    pub unread: u32,
    pub snapshot: ConversationSnapshot,
    pub messages: Vec<ScrapedMessage>,
    /// Top-left corner of a dragged popup; `None` keeps the CSS anchor
    pub popup_position: Option<(i32, i32)>,
}

pub enum OverlayAction {
    Toggle,
    /// Scrape that should not count as new activity (startup)
    Refreshed(ConversationSnapshot),
    /// Debounced scrape after the host page changed
    PageChanged(ConversationSnapshot),
    MessagesLoaded(Vec<ScrapedMessage>),
    SettingsUpdated(Settings),
    MovedTo(i32, i32),
}

impl OverlayState {
    pub fn new(settings: Settings) -> Self {
        OverlayState {
            settings,
            expanded: false,
            popup_created: false,
            unread: 0,
            snapshot: ConversationSnapshot {
                name: "Messenger".to_string(),
                avatar: None,
                last_message: "Click to open chat".to_string(),
            },
            messages: Vec::new(),
            popup_position: None,
        }
    }

    pub fn apply(&mut self, action: OverlayAction) {
        match action {
            OverlayAction::Toggle => {
                self.popup_created = true;
                self.expanded = !self.expanded;
                if self.expanded {
                    self.unread = 0;
                }
            }
            OverlayAction::Refreshed(snapshot) => self.snapshot = snapshot,
            OverlayAction::PageChanged(snapshot) => {
                self.snapshot = snapshot;
                if !self.expanded {
                    self.unread = self.unread.saturating_add(1);
                }
            }
            OverlayAction::MessagesLoaded(messages) => self.messages = messages,
            OverlayAction::SettingsUpdated(settings) => self.settings = settings,
            OverlayAction::MovedTo(left, top) => self.popup_position = Some((left, top)),
        }
    }

    /// Badge text, hidden while nothing is unread
    pub fn badge_label(&self) -> Option<String> {
        (self.unread > 0).then(|| self.unread.to_string())
    }

    pub fn popup_style(&self) -> String {
        let display = if self.expanded { "flex" } else { "none" };
        match self.popup_position {
            Some((left, top)) => format!(
                "display: {}; left: {}px; top: {}px; right: auto; bottom: auto;",
                display, left, top
            ),
            None => format!("display: {};", display),
        }
    }
}

impl Reducible for OverlayState {
    type Action = OverlayAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        next.apply(action);
        if next == *self { self } else { Rc::new(next) }
    }
}

/// Pointer offset inside the popup captured when a drag starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragAnchor {
    dx: i32,
    dy: i32,
}

impl DragAnchor {
    pub fn start(client: (i32, i32), popup_offset: (i32, i32)) -> Self {
        DragAnchor {
            dx: client.0 - popup_offset.0,
            dy: client.1 - popup_offset.1,
        }
    }

    pub fn position(&self, client: (i32, i32)) -> (i32, i32) {
        (client.0 - self.dx, client.1 - self.dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinToggle {
    Pinned,
    Unpinned,
    Rejected,
}

impl PinToggle {
    pub fn alert_text(self) -> String {
        match self {
            PinToggle::Pinned => "Chat pinned".to_string(),
            PinToggle::Unpinned => "Chat unpinned".to_string(),
            PinToggle::Rejected => format!("Maximum {} chats can be pinned", MAX_PINNED_CHATS),
        }
    }
}

/// Pin the current thread, or unpin it when it is already pinned
pub async fn toggle_pin<S: StorageArea>(store: &S, chat: PinnedChat) -> Result<PinToggle, Error> {
    if storage::unpin_chat(store, &chat.thread_id).await? {
        return Ok(PinToggle::Unpinned);
    }

    Ok(match storage::pin_chat(store, chat).await? {
        PinOutcome::Pinned | PinOutcome::AlreadyPinned => PinToggle::Pinned,
        PinOutcome::Full => PinToggle::Rejected,
    })
}

/// Chat entry for the thread at `path`, or `None` outside a conversation
pub fn chat_for_path(path: &str, snapshot: &ConversationSnapshot) -> Option<PinnedChat> {
    let thread_id = crate::host::thread_id_from_path(path)?;
    Some(PinnedChat {
        thread_id,
        name: snapshot.name.clone(),
        avatar: snapshot.avatar.clone(),
    })
}

/// Input text worth sending, or `None` for blank input
pub fn composed_text(raw: &str) -> Option<&str> {
    let text = raw.trim();
    (!text.is_empty()).then_some(text)
}
