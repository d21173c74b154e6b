/// Pinned-chat list with its capacity and uniqueness rules
use crate::chat_data::PinnedChat;
use serde::{Deserialize, Deserializer, Serialize};

/// Most chats that can be pinned at once
pub const MAX_PINNED_CHATS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinOutcome {
    Pinned,
    AlreadyPinned,
    Full,
}

/// Ordered list of pinned chats, oldest first.
///
/// Never holds more than [`MAX_PINNED_CHATS`] entries nor two entries for
/// the same thread. Lists read from storage are normalized on the way in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PinnedChats {
    chats: Vec<PinnedChat>,
}

impl PinnedChats {
    pub fn new() -> Self {
        PinnedChats { chats: Vec::new() }
    }

    /// Build a list from arbitrary entries, keeping the first occurrence of
    /// each thread and the oldest entries up to capacity
    pub fn from_entries(entries: Vec<PinnedChat>) -> Self {
        let mut list = PinnedChats::new();
        for chat in entries {
            list.pin(chat);
        }
        list
    }

    pub fn pin(&mut self, chat: PinnedChat) -> PinOutcome {
        if self.contains(&chat.thread_id) {
            return PinOutcome::AlreadyPinned;
        }
        if self.is_full() {
            return PinOutcome::Full;
        }
        self.chats.push(chat);
        PinOutcome::Pinned
    }

    pub fn unpin(&mut self, thread_id: &str) -> bool {
        let original_len = self.chats.len();
        self.chats.retain(|c| c.thread_id != thread_id);
        self.chats.len() < original_len
    }

    pub fn unpin_at(&mut self, index: usize) -> Option<PinnedChat> {
        (index < self.chats.len()).then(|| self.chats.remove(index))
    }

    pub fn contains(&self, thread_id: &str) -> bool {
        self.chats.iter().any(|c| c.thread_id == thread_id)
    }

    pub fn is_full(&self) -> bool {
        self.chats.len() >= MAX_PINNED_CHATS
    }

    pub fn len(&self) -> usize {
        self.chats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chats.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PinnedChat> {
        self.chats.iter()
    }
}

impl<'de> Deserialize<'de> for PinnedChats {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<PinnedChat>::deserialize(deserializer).map(PinnedChats::from_entries)
    }
}
