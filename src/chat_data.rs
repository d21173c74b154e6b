/// Data structures for Bubble Chat Enhancer
use serde::{Deserialize, Serialize};

/// Information about a browser tab, as reported by `chrome.tabs.query`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabInfo {
    pub id: i32,
    #[serde(default)]
    pub url: Option<String>,
}

/// A conversation the user pinned from the overlay
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PinnedChat {
    pub thread_id: String,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// A message read off the host page. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedMessage {
    pub text: String,
    pub is_outgoing: bool,
    pub timestamp: f64,
}

/// Result of one scrape pass over the host page
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSnapshot {
    pub name: String,
    pub avatar: Option<String>,
    pub last_message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_info_without_url() {
        let tab: TabInfo = serde_json::from_str(r#"{"id": 7}"#).unwrap();

        assert_eq!(tab.id, 7);
        assert_eq!(tab.url, None);
    }

    #[test]
    fn test_pinned_chat_wire_names() {
        let chat = PinnedChat {
            thread_id: "100012345".to_string(),
            name: "Alice".to_string(),
            avatar: None,
        };

        let json = serde_json::to_value(&chat).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"threadId": "100012345", "name": "Alice", "avatar": null})
        );
    }

    #[test]
    fn test_pinned_chat_missing_avatar() {
        let chat: PinnedChat =
            serde_json::from_str(r#"{"threadId": "42", "name": "Bob"}"#).unwrap();

        assert_eq!(chat.thread_id, "42");
        assert_eq!(chat.avatar, None);
    }

    #[test]
    fn test_scraped_message_serialization() {
        let message = ScrapedMessage {
            text: "hey".to_string(),
            is_outgoing: true,
            timestamp: 1698508200000.0,
        };

        let json = serde_json::to_string(&message).unwrap();
        assert!(json.contains("\"isOutgoing\":true"));
    }
}
