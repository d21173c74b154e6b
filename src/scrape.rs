/// Selector-driven scraping of the host conversation page
///
/// Every field is read by trying an ordered list of CSS selectors and
/// taking the first non-empty match. The host markup changes often, so the
/// lists are empirical and each has a fallback.
use crate::chat_data::{ConversationSnapshot, ScrapedMessage};

pub const NAME_SELECTORS: &[&str] = &[
    "h1 span",
    "[role=\"heading\"] span",
    "[data-scope=\"messages_table\"] span",
];

pub const AVATAR_SELECTORS: &[&str] = &[
    "img[data-visualcompletion=\"media-vc-image\"]",
    "img[alt][src]",
];

pub const MESSAGE_CONTAINER_SELECTORS: &[&str] = &[
    "[role=\"row\"]",
    "[data-scope=\"messages_table\"]",
    ".x78zum5.xdt5ytf.x1iyjqo2",
];

pub const MESSAGE_TEXT_SELECTORS: &[&str] = &[
    "[dir=\"auto\"]",
    "[data-scope=\"messages_table\"]",
    ".x1lliihq",
    "span",
];

pub const OUTGOING_SELECTOR: &str = "[aria-label*=\"You\"]";

pub const INPUT_SELECTORS: &[&str] = &[
    "[role=\"textbox\"][contenteditable=\"true\"]",
    "[contenteditable=\"true\"][data-scope=\"messages_table\"]",
    "div[contenteditable=\"true\"]",
];

pub const SEND_BUTTON_SELECTORS: &[&str] = &[
    "[aria-label*=\"Send\"]",
    "[aria-label*=\"Press enter to send\"]",
    "button[type=\"submit\"]",
];

/// ID of the element the overlay renders into. Nodes under it are never
/// treated as part of the host page.
pub const OVERLAY_ID: &str = "bubble-chat-enhancer";
pub const OVERLAY_SELECTOR: &str = "#bubble-chat-enhancer";

pub const FALLBACK_NAME: &str = "Messenger Conversation";
pub const FALLBACK_LAST_MESSAGE: &str = "No messages";

/// Messages shown in the expanded popup
pub const RECENT_MESSAGE_LIMIT: usize = 10;

/// The slice of the DOM API the scraper needs
pub trait PageNode: Sized {
    /// All descendants matching `selector`, in document order
    fn query_all(&self, selector: &str) -> Vec<Self>;

    fn text(&self) -> String;

    /// Resolved `src` of an image element
    fn image_src(&self) -> Option<String>;

    /// Whether this node or one of its ancestors matches `selector`
    fn has_ancestor(&self, selector: &str) -> bool;
}

/// First match for `selector` that is not part of the overlay
fn page_query<N: PageNode>(root: &N, selector: &str) -> Option<N> {
    root.query_all(selector)
        .into_iter()
        .find(|node| !node.has_ancestor(OVERLAY_SELECTOR))
}

/// Trimmed text of the first candidate that matches with non-empty text
pub fn first_text<N: PageNode>(root: &N, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|selector| {
        let text = page_query(root, selector)?.text();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    })
}

/// First node matching any candidate, in candidate order
pub fn first_match<N: PageNode>(root: &N, selectors: &[&str]) -> Option<N> {
    selectors.iter().find_map(|selector| page_query(root, selector))
}

pub fn conversation_name<N: PageNode>(root: &N) -> String {
    first_text(root, NAME_SELECTORS).unwrap_or_else(|| FALLBACK_NAME.to_string())
}

/// Avatar of the open conversation; emoji images are not avatars
pub fn conversation_avatar<N: PageNode>(root: &N) -> Option<String> {
    AVATAR_SELECTORS.iter().find_map(|selector| {
        page_query(root, selector)?
            .image_src()
            .filter(|src| !src.is_empty() && !src.contains("emoji"))
    })
}

pub fn parse_message<N: PageNode>(container: &N, timestamp: f64) -> Option<ScrapedMessage> {
    let text = first_text(container, MESSAGE_TEXT_SELECTORS)?;

    Some(ScrapedMessage {
        text,
        is_outgoing: container.has_ancestor(OUTGOING_SELECTOR),
        timestamp,
    })
}

/// Containers from the first candidate selector that matches anything
fn message_containers<N: PageNode>(root: &N) -> Vec<N> {
    MESSAGE_CONTAINER_SELECTORS
        .iter()
        .map(|selector| {
            root.query_all(selector)
                .into_iter()
                .filter(|node| !node.has_ancestor(OVERLAY_SELECTOR))
                .collect::<Vec<_>>()
        })
        .find(|nodes| !nodes.is_empty())
        .unwrap_or_default()
}

/// Parse the last `limit` message containers, skipping ones with no text
pub fn recent_messages<N: PageNode>(root: &N, limit: usize, timestamp: f64) -> Vec<ScrapedMessage> {
    let containers = message_containers(root);
    let start = containers.len().saturating_sub(limit);

    containers[start..]
        .iter()
        .filter_map(|container| parse_message(container, timestamp))
        .collect()
}

pub fn last_message<N: PageNode>(root: &N, timestamp: f64) -> String {
    recent_messages(root, 1, timestamp)
        .pop()
        .map(|message| message.text)
        .unwrap_or_else(|| FALLBACK_LAST_MESSAGE.to_string())
}

pub fn snapshot<N: PageNode>(root: &N, timestamp: f64) -> ConversationSnapshot {
    ConversationSnapshot {
        name: conversation_name(root),
        avatar: conversation_avatar(root),
        last_message: last_message(root, timestamp),
    }
}
