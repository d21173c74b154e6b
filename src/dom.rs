/// Browser-side helpers: the scraper's DOM binding, page load, mutation
/// watching and synthetic input on the host page
use crate::chat_data::{ConversationSnapshot, ScrapedMessage};
use crate::error::Error;
use crate::scrape::{self, PageNode};
use futures::channel::oneshot;
use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Element, Event, EventInit, HtmlElement, HtmlImageElement, KeyboardEvent, KeyboardEventInit, MutationObserver,
    MutationObserverInit, MutationRecord, Node,
};

/// Pause between filling the host input and pressing send, so the page's
/// own input handlers see the text first
pub const SEND_DELAY_MS: u32 = 100;

/// Extra wait after the page `load` event before mounting the overlay
pub const PAGE_SETTLE_MS: u32 = 1000;

impl PageNode for Element {
    fn query_all(&self, selector: &str) -> Vec<Self> {
        let Ok(nodes) = self.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn text(&self) -> String {
        self.text_content().unwrap_or_default()
    }

    fn image_src(&self) -> Option<String> {
        self.dyn_ref::<HtmlImageElement>().map(|img| img.src())
    }

    fn has_ancestor(&self, selector: &str) -> bool {
        matches!(self.closest(selector), Ok(Some(_)))
    }
}

pub fn document() -> Option<web_sys::Document> {
    web_sys::window()?.document()
}

/// Root element every scrape starts from
pub fn page_root() -> Option<Element> {
    document()?.document_element()
}

pub fn now() -> f64 {
    js_sys::Date::now()
}

pub fn scrape_snapshot() -> ConversationSnapshot {
    match page_root() {
        Some(root) => scrape::snapshot(&root, now()),
        None => ConversationSnapshot {
            name: scrape::FALLBACK_NAME.to_string(),
            avatar: None,
            last_message: scrape::FALLBACK_LAST_MESSAGE.to_string(),
        },
    }
}

pub fn scrape_recent_messages() -> Vec<ScrapedMessage> {
    page_root()
        .map(|root| scrape::recent_messages(&root, scrape::RECENT_MESSAGE_LIMIT, now()))
        .unwrap_or_default()
}

/// Path of the current page, used to find the thread ID
pub fn current_path() -> Option<String> {
    web_sys::window()?.location().pathname().ok()
}

pub fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        if let Err(e) = window.alert_with_message(message) {
            log::error!("Failed to show alert: {:?}", e);
        }
    }
}

/// Resolve once the page has finished loading and had a moment to settle
pub async fn wait_for_page_load() {
    let Some(window) = web_sys::window() else {
        return;
    };

    let loading = window.document().is_some_and(|d| d.ready_state() != "complete");
    if loading {
        let (loaded, on_load) = oneshot::channel();
        let _listener = EventListener::once(&window, "load", move |_| {
            let _ = loaded.send(());
        });
        if on_load.await.is_err() {
            log::warn!("Load listener went away before the page loaded");
        }
    }

    TimeoutFuture::new(PAGE_SETTLE_MS).await;
}

/// Keeps a mutation observer on `document.body` alive; disconnects on drop
pub struct MutationWatch {
    observer: MutationObserver,
    _callback: Closure<dyn FnMut(js_sys::Array, MutationObserver)>,
}

impl MutationWatch {
    /// Watch the page body, ignoring mutations that happen inside `ignore`
    pub fn observe_body(ignore: Option<Node>, mut on_change: impl FnMut() + 'static) -> Result<Self, Error> {
        let body = document()
            .and_then(|d| d.body())
            .ok_or(Error::MissingDom("body"))?;

        let callback = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
            move |records: js_sys::Array, _observer: MutationObserver| {
                let from_page = records.iter().any(|record| {
                    let Ok(record) = record.dyn_into::<MutationRecord>() else {
                        return true;
                    };
                    match (&ignore, record.target()) {
                        (Some(ignore), Some(target)) => !ignore.contains(Some(&target)),
                        _ => true,
                    }
                });
                if from_page {
                    on_change();
                }
            },
        );

        let observer = MutationObserver::new(callback.as_ref().unchecked_ref()).map_err(Error::bridge)?;
        let options = MutationObserverInit::new();
        options.set_child_list(true);
        options.set_subtree(true);
        options.set_character_data(true);
        observer
            .observe_with_options(&body, &options)
            .map_err(Error::bridge)?;

        Ok(MutationWatch {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for MutationWatch {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

fn bubbling_event(kind: &str) -> Result<Event, Error> {
    let init = EventInit::new();
    init.set_bubbles(true);
    Event::new_with_event_init_dict(kind, &init).map_err(Error::bridge)
}

fn press_enter(target: &Element) -> Result<(), Error> {
    let init = KeyboardEventInit::new();
    init.set_key("Enter");
    init.set_code("Enter");
    init.set_bubbles(true);
    init.set_cancelable(true);
    let event = KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init).map_err(Error::bridge)?;
    target.dispatch_event(&event).map_err(Error::bridge)?;
    Ok(())
}

/// Type `text` into the host page's composer and submit it.
///
/// The send button is looked up after [`SEND_DELAY_MS`]; when none matches,
/// a synthetic Enter keydown goes to the input instead.
pub fn send_to_host_page(text: &str) -> Result<(), Error> {
    let root = page_root().ok_or(Error::MissingDom("document"))?;
    let input = scrape::first_match(&root, scrape::INPUT_SELECTORS)
        .ok_or(Error::MissingDom("message input"))?;

    input.set_text_content(Some(text));
    input.dispatch_event(&bubbling_event("input")?).map_err(Error::bridge)?;
    input.dispatch_event(&bubbling_event("change")?).map_err(Error::bridge)?;

    Timeout::new(SEND_DELAY_MS, move || {
        let button = scrape::first_match(&root, scrape::SEND_BUTTON_SELECTORS)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());

        let result = match button {
            Some(button) => {
                button.click();
                Ok(())
            }
            None => press_enter(&input),
        };
        if let Err(e) = result {
            log::error!("Error sending message: {}", e);
        }
    })
    .forget();

    Ok(())
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use wasm_bindgen_test::*;

    /// Markup appended to `<body>` for one test and removed afterwards
    struct Fixture(Element);

    impl Fixture {
        fn new(html: &str) -> Self {
            let document = document().unwrap();
            let root = document.create_element("div").unwrap();
            root.set_inner_html(html);
            document.body().unwrap().append_child(&root).unwrap();
            Fixture(root)
        }

        fn find(&self, selector: &str) -> Element {
            self.0.query_selector(selector).unwrap().unwrap()
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            self.0.remove();
        }
    }

    fn counter() -> (Rc<Cell<u32>>, impl FnMut() + 'static) {
        let count = Rc::new(Cell::new(0));
        let handle = count.clone();
        (count, move || handle.set(handle.get() + 1))
    }

    #[wasm_bindgen_test]
    fn test_element_scrape() {
        let page = Fixture::new(
            r#"<h1><span>  Alice  </span></h1>
               <img alt="Alice" src="https://cdn.example/alice.jpg">
               <div role="row"><div dir="auto">hi there</div></div>
               <div aria-label="You sent"><div role="row"><div dir="auto">hello back</div></div></div>"#,
        );

        let snapshot = scrape::snapshot(&page.0, 0.0);
        let messages = scrape::recent_messages(&page.0, scrape::RECENT_MESSAGE_LIMIT, 0.0);

        assert_eq!(snapshot.name, "Alice");
        assert_eq!(snapshot.avatar, Some("https://cdn.example/alice.jpg".to_string()));
        assert_eq!(snapshot.last_message, "hello back");
        assert_eq!(messages.len(), 2);
        assert!(!messages[0].is_outgoing);
        assert!(messages[1].is_outgoing);
    }

    #[wasm_bindgen_test]
    fn test_scrape_skips_overlay_nodes() {
        let page = Fixture::new(
            r#"<div id="bubble-chat-enhancer">
                 <img alt="Avatar" src="data:image/svg+xml,%3Csvg%3E">
                 <h1><span>Overlay</span></h1>
               </div>"#,
        );

        let snapshot = scrape::snapshot(&page.0, 0.0);

        assert_eq!(snapshot.avatar, None);
        assert_eq!(snapshot.name, scrape::FALLBACK_NAME);
    }

    #[wasm_bindgen_test]
    async fn test_mutation_watch_ignores_overlay() {
        let page = Fixture::new(r#"<div id="bubble-chat-enhancer"></div><div class="host"></div>"#);
        let overlay = page.find("#bubble-chat-enhancer");
        let host = page.find(".host");
        let document = document().unwrap();
        let (changes, on_change) = counter();

        let watch = MutationWatch::observe_body(Some(overlay.clone().into()), on_change).unwrap();

        overlay.append_child(&document.create_element("span").unwrap()).unwrap();
        TimeoutFuture::new(20).await;
        assert_eq!(changes.get(), 0);

        host.append_child(&document.create_element("span").unwrap()).unwrap();
        TimeoutFuture::new(20).await;
        assert_eq!(changes.get(), 1);

        drop(watch);
        host.append_child(&document.create_element("span").unwrap()).unwrap();
        TimeoutFuture::new(20).await;
        assert_eq!(changes.get(), 1);
    }

    #[wasm_bindgen_test]
    async fn test_send_clicks_send_button() {
        let page = Fixture::new(
            r#"<div role="textbox" contenteditable="true"></div>
               <button aria-label="Send">Send</button>"#,
        );
        let input = page.find("[role=\"textbox\"]");
        let (inputs, mut on_input) = counter();
        let (clicks, mut on_click) = counter();
        let (enters, mut on_keydown) = counter();
        let _input_listener = EventListener::new(&input, "input", move |_| on_input());
        let _keydown_listener = EventListener::new(&input, "keydown", move |_| on_keydown());
        let _click_listener = EventListener::new(&page.find("button"), "click", move |_| on_click());

        send_to_host_page("hello").unwrap();

        assert_eq!(input.text_content().as_deref(), Some("hello"));
        assert_eq!(inputs.get(), 1);
        assert_eq!(clicks.get(), 0);

        TimeoutFuture::new(SEND_DELAY_MS + 50).await;
        assert_eq!(clicks.get(), 1);
        assert_eq!(enters.get(), 0);
    }

    #[wasm_bindgen_test]
    async fn test_send_falls_back_to_enter() {
        let page = Fixture::new(r#"<div role="textbox" contenteditable="true"></div>"#);
        let input = page.find("[role=\"textbox\"]");
        let pressed = Rc::new(RefCell::new(None::<String>));
        let seen = pressed.clone();
        let _listener = EventListener::new(&input, "keydown", move |event| {
            *seen.borrow_mut() = event.dyn_ref::<KeyboardEvent>().map(|key| key.key());
        });

        send_to_host_page("hello").unwrap();
        TimeoutFuture::new(SEND_DELAY_MS + 50).await;

        assert_eq!(pressed.borrow().as_deref(), Some("Enter"));
    }

    #[wasm_bindgen_test]
    fn test_send_without_input() {
        assert_eq!(send_to_host_page("hello"), Err(Error::MissingDom("message input")));
    }

    #[wasm_bindgen_test]
    async fn test_wait_for_loaded_page_settles() {
        let started = now();

        wait_for_page_load().await;

        assert!(now() - started >= f64::from(PAGE_SETTLE_MS) - 5.0);
    }
}
