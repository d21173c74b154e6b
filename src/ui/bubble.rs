/// Floating chat bubble and its draggable popup, mounted into the host page

use crate::debounce::{Debouncer, MUTATION_DEBOUNCE_MS};
use crate::dom::{self, MutationWatch};
use crate::messages::Notification;
use crate::overlay::{self, DragAnchor, OverlayAction, OverlayState};
use crate::runtime::NotificationListener;
use crate::settings::Settings;
use crate::storage::ChromeSyncStorage;
use crate::ui::components::{ChatAvatar, MessageRow};
use gloo_events::EventListener;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, HtmlElement, HtmlInputElement};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct BubbleOverlayProps {
    pub settings: Settings,
}

#[function_component(BubbleOverlay)]
pub fn bubble_overlay(props: &BubbleOverlayProps) -> Html {
    let initial_settings = props.settings;
    let state = use_reducer(move || OverlayState::new(initial_settings));
    let container_ref = use_node_ref();
    let popup_ref = use_node_ref();
    let messages_ref = use_node_ref();
    let draft = use_state(String::new);
    let drag = use_mut_ref(|| None::<DragAnchor>);

    // Scrape once, then again after each burst of host page mutations
    {
        let dispatcher = state.dispatcher();
        let container_ref = container_ref.clone();

        use_effect_with(state.settings.enabled, move |enabled| {
            let debouncer = Debouncer::new(MUTATION_DEBOUNCE_MS);
            let mut watch = None;

            if *enabled {
                dispatcher.dispatch(OverlayAction::Refreshed(dom::scrape_snapshot()));

                let pending = debouncer.clone();
                let observed = MutationWatch::observe_body(container_ref.get(), move || {
                    let dispatcher = dispatcher.clone();
                    pending.trigger(move || {
                        dispatcher.dispatch(OverlayAction::PageChanged(dom::scrape_snapshot()));
                    });
                });
                match observed {
                    Ok(observed) => watch = Some(observed),
                    Err(e) => log::error!("Failed to observe page: {}", e),
                }
            }

            move || {
                debouncer.cancel();
                drop(watch);
            }
        });
    }

    // Live settings pushed by the background worker
    {
        let dispatcher = state.dispatcher();
        use_effect_with((), move |_| {
            let listener = NotificationListener::new(move |notification| match notification {
                Notification::SettingsUpdated { settings } => {
                    dispatcher.dispatch(OverlayAction::SettingsUpdated(settings));
                }
            });
            move || drop(listener)
        });
    }

    // Keep the newest message in view
    {
        let messages_ref = messages_ref.clone();
        use_effect_with(state.messages.clone(), move |_| {
            if let Some(container) = messages_ref.cast::<Element>() {
                container.set_scroll_top(container.scroll_height());
            }
            || ()
        });
    }

    // Popup dragging follows the pointer anywhere on the page
    {
        let drag = drag.clone();
        let dispatcher = state.dispatcher();

        use_effect_with((), move |_| {
            let listeners = dom::document().map(|document| {
                let on_move = {
                    let drag = drag.clone();
                    move |event: &Event| {
                        let Some(anchor) = *drag.borrow() else {
                            return;
                        };
                        if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                            event.prevent_default();
                            let (left, top) = anchor.position((mouse.client_x(), mouse.client_y()));
                            dispatcher.dispatch(OverlayAction::MovedTo(left, top));
                        }
                    }
                };
                let on_up = move |_: &Event| {
                    *drag.borrow_mut() = None;
                };

                [
                    EventListener::new(&document, "mousemove", on_move),
                    EventListener::new(&document, "mouseup", on_up),
                ]
            });

            move || drop(listeners)
        });
    }

    let on_toggle = {
        let state = state.clone();
        Callback::from(move |_: MouseEvent| {
            let expanding = !state.expanded;
            state.dispatch(OverlayAction::Toggle);
            if expanding {
                state.dispatch(OverlayAction::MessagesLoaded(dom::scrape_recent_messages()));
            }
        })
    };

    let on_close = {
        let on_toggle = on_toggle.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            on_toggle.emit(e);
        })
    };

    let on_pin = Callback::from(move |e: MouseEvent| {
        e.stop_propagation();

        let Some(chat) = dom::current_path()
            .and_then(|path| overlay::chat_for_path(&path, &dom::scrape_snapshot()))
        else {
            return;
        };

        spawn_local(async move {
            match overlay::toggle_pin(&ChromeSyncStorage, chat).await {
                Ok(result) => dom::alert(&result.alert_text()),
                Err(e) => log::error!("Error toggling pin: {}", e),
            }
        });
    });

    let on_header_mousedown = {
        let drag = drag.clone();
        let popup_ref = popup_ref.clone();
        Callback::from(move |e: MouseEvent| {
            let on_button = e
                .target_dyn_into::<HtmlElement>()
                .is_some_and(|el| el.tag_name() == "BUTTON");
            if on_button {
                return;
            }
            if let Some(popup) = popup_ref.cast::<HtmlElement>() {
                *drag.borrow_mut() = Some(DragAnchor::start(
                    (e.client_x(), e.client_y()),
                    (popup.offset_left(), popup.offset_top()),
                ));
            }
        })
    };

    let send_draft = {
        let draft = draft.clone();
        move || {
            if let Some(text) = overlay::composed_text(&draft) {
                if let Err(e) = dom::send_to_host_page(text) {
                    log::error!("Error sending message: {}", e);
                }
                draft.set(String::new());
            }
        }
    };

    let on_send = {
        let send_draft = send_draft.clone();
        Callback::from(move |_: MouseEvent| send_draft())
    };

    let on_keypress = Callback::from(move |e: KeyboardEvent| {
        if e.key() == "Enter" {
            send_draft();
        }
    });

    let on_input = {
        let draft = draft.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                draft.set(input.value());
            }
        })
    };

    if !state.settings.enabled {
        return html! {};
    }

    html! {
        <div ref={container_ref} class={state.settings.container_class()}>
            <div class="bubble" onclick={on_toggle}>
                <div class="bubble-avatar">
                    <ChatAvatar src={state.snapshot.avatar.clone()} class="avatar-image" />
                </div>
                <div class="bubble-content">
                    <div class="bubble-name">{&state.snapshot.name}</div>
                    <div class="bubble-message">{&state.snapshot.last_message}</div>
                </div>
                if let Some(label) = state.badge_label() {
                    <div class="bubble-badge">{label}</div>
                }
            </div>

            if state.popup_created {
                <div ref={popup_ref} class="bubble-popup" style={state.popup_style()}>
                    <div class="popup-header" style="cursor: move;" onmousedown={on_header_mousedown}>
                        <div class="popup-title">
                            <ChatAvatar src={state.snapshot.avatar.clone()} class="popup-avatar" />
                            <span class="popup-name">{&state.snapshot.name}</span>
                        </div>
                        <div class="popup-controls">
                            <button class="popup-pin" title="Pin conversation" onclick={on_pin}>{"📌"}</button>
                            <button class="popup-close" title="Close" onclick={on_close}>{"✕"}</button>
                        </div>
                    </div>

                    <div ref={messages_ref} class="popup-messages">
                        if state.messages.is_empty() {
                            <div class="no-messages">{"No messages yet"}</div>
                        } else {
                            {for state.messages.iter().map(|message| html! {
                                <MessageRow message={message.clone()} />
                            })}
                        }
                    </div>

                    <div class="popup-input">
                        <input
                            type="text"
                            placeholder="Type a message..."
                            class="message-input"
                            value={(*draft).clone()}
                            oninput={on_input}
                            onkeypress={on_keypress}
                        />
                        <button class="send-button" onclick={on_send}>{"Send"}</button>
                    </div>
                </div>
            }
        </div>
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use crate::debounce::MUTATION_DEBOUNCE_MS;
    use crate::scrape::OVERLAY_ID;
    use gloo_timers::future::TimeoutFuture;
    use wasm_bindgen_test::*;

    struct Mounted {
        host: Element,
        app: Option<yew::AppHandle<BubbleOverlay>>,
    }

    impl Mounted {
        async fn new(settings: Settings) -> Self {
            let document = dom::document().unwrap();
            let host = document.create_element("div").unwrap();
            host.set_id(OVERLAY_ID);
            document.body().unwrap().append_child(&host).unwrap();

            let app = yew::Renderer::<BubbleOverlay>::with_root_and_props(host.clone(), BubbleOverlayProps { settings })
                .render();
            TimeoutFuture::new(20).await;

            Mounted { host, app: Some(app) }
        }

        fn find(&self, selector: &str) -> Option<Element> {
            self.host.query_selector(selector).unwrap()
        }

        fn badge(&self) -> Option<String> {
            self.find(".bubble-badge").and_then(|badge| badge.text_content())
        }
    }

    impl Drop for Mounted {
        fn drop(&mut self) {
            if let Some(app) = self.app.take() {
                app.destroy();
            }
            self.host.remove();
        }
    }

    /// Append `count` nodes to the page outside the overlay in one burst
    fn page_burst(count: usize) -> Element {
        let document = dom::document().unwrap();
        let page = document.create_element("div").unwrap();
        for _ in 0..count {
            page.append_child(&document.create_element("p").unwrap()).unwrap();
        }
        document.body().unwrap().append_child(&page).unwrap();
        page
    }

    async fn settle() {
        TimeoutFuture::new(MUTATION_DEBOUNCE_MS + 200).await;
    }

    #[wasm_bindgen_test]
    async fn test_renders_collapsed_bubble() {
        let overlay = Mounted::new(Settings::default()).await;

        let container = overlay.find(".bubble-container").unwrap();
        assert_eq!(container.class_name(), Settings::default().container_class());
        assert!(overlay.find(".bubble-name").is_some());
        assert!(overlay.find(".bubble-popup").is_none());
        assert_eq!(overlay.badge(), None);
    }

    #[wasm_bindgen_test]
    async fn test_page_burst_counts_once_while_collapsed() {
        let overlay = Mounted::new(Settings::default()).await;

        let first = page_burst(5);
        settle().await;
        assert_eq!(overlay.badge().as_deref(), Some("1"));

        let second = page_burst(3);
        settle().await;
        assert_eq!(overlay.badge().as_deref(), Some("2"));

        first.remove();
        second.remove();
    }

    #[wasm_bindgen_test]
    async fn test_expanding_clears_badge_and_creates_popup() {
        let overlay = Mounted::new(Settings::default()).await;
        let burst = page_burst(1);
        settle().await;
        assert_eq!(overlay.badge().as_deref(), Some("1"));

        let bubble = overlay.find(".bubble").unwrap().dyn_into::<HtmlElement>().unwrap();
        bubble.click();
        TimeoutFuture::new(20).await;

        assert_eq!(overlay.badge(), None);
        assert!(overlay.find(".bubble-popup").is_some());

        // Building the popup and collapsing it again is not page activity
        bubble.click();
        settle().await;
        assert_eq!(overlay.badge(), None);
        assert!(overlay.find(".bubble-popup").is_some());

        burst.remove();
    }

    #[wasm_bindgen_test]
    async fn test_disabled_renders_nothing() {
        let settings = Settings {
            enabled: false,
            ..Settings::default()
        };
        let overlay = Mounted::new(settings).await;

        assert!(overlay.find(".bubble-container").is_none());
    }
}
