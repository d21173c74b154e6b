/// Reusable UI components

use crate::chat_data::{PinnedChat, ScrapedMessage};
use patternfly_yew::prelude::*;
use yew::prelude::*;

/// Generic person icon shown until the host page yields an avatar
pub const DEFAULT_AVATAR: &str = "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24' fill='%230084ff'%3E%3Cpath d='M12 2C6.48 2 2 6.48 2 12s4.48 10 10 10 10-4.48 10-10S17.52 2 12 2zm0 3c1.66 0 3 1.34 3 3s-1.34 3-3 3-3-1.34-3-3 1.34-3 3-3zm0 14.2c-2.5 0-4.71-1.28-6-3.22.03-1.99 4-3.08 6-3.08 1.99 0 5.97 1.09 6 3.08-1.29 1.94-3.5 3.22-6 3.22z'/%3E%3C/svg%3E";

#[derive(Properties, PartialEq)]
pub struct ChatAvatarProps {
    #[prop_or_default]
    pub src: Option<String>,
    pub class: &'static str,
}

#[function_component(ChatAvatar)]
pub fn chat_avatar(props: &ChatAvatarProps) -> Html {
    let src = props.src.clone().unwrap_or_else(|| DEFAULT_AVATAR.to_string());

    html! {
        <img src={src} alt="Avatar" class={props.class} />
    }
}

#[derive(Properties, PartialEq)]
pub struct MessageRowProps {
    pub message: ScrapedMessage,
}

#[function_component(MessageRow)]
pub fn message_row(props: &MessageRowProps) -> Html {
    let direction = if props.message.is_outgoing { "outgoing" } else { "incoming" };

    html! {
        <div class={classes!("message", direction)}>
            <div class="message-bubble">
                <div class="message-text">{&props.message.text}</div>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct PinnedChatRowProps {
    pub chat: PinnedChat,
    pub on_unpin: Callback<MouseEvent>,
}

#[function_component(PinnedChatRow)]
pub fn pinned_chat_row(props: &PinnedChatRowProps) -> Html {
    html! {
        <div class="pinned-chat">
            <div class="pinned-chat-info">
                <ChatAvatar src={props.chat.avatar.clone()} class="pinned-avatar" />
                <span class="pinned-name">{&props.chat.name}</span>
            </div>
            <Button onclick={props.on_unpin.clone()} variant={ButtonVariant::Secondary}>
                {"Unpin"}
            </Button>
        </div>
    }
}
