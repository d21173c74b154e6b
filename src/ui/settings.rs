/// Settings popup for the extension action

use crate::debounce::Debouncer;
use crate::error::Error;
use crate::messages::{Ack, Request};
use crate::pinned::PinnedChats;
use crate::runtime;
use crate::settings::{Position, Settings, Size, Theme};
use crate::ui::components::PinnedChatRow;
use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// How long the "Settings saved" notice stays up
const SAVE_STATUS_MS: u32 = 2000;

#[derive(Debug, Clone, PartialEq)]
enum PopupState {
    Loading,
    Idle,
    Error(String),
}

/// State to show once the background has answered a save; a success
/// clears any earlier failure
fn save_outcome(result: Result<Ack, Error>, what: &str) -> PopupState {
    match result {
        Ok(Ack { success: true }) => PopupState::Idle,
        Ok(_) => PopupState::Error(format!("Failed to {}", what)),
        Err(e) => {
            log::error!("Error trying to {}: {}", what, e);
            PopupState::Error(format!("Failed to {}: {}", what, e))
        }
    }
}

#[function_component(SettingsPopup)]
pub fn settings_popup() -> Html {
    let state = use_state(|| PopupState::Loading);
    let settings = use_state(Settings::default);
    let pinned = use_state(PinnedChats::new);
    let saved = use_state(|| false);
    let status_timer = use_memo((), |_| Debouncer::new(SAVE_STATUS_MS));

    // Load settings and pinned chats on open
    {
        let state = state.clone();
        let settings = settings.clone();
        let pinned = pinned.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                let loaded_settings = runtime::request::<Settings>(&Request::GetSettings).await;
                let loaded_pinned = runtime::request::<PinnedChats>(&Request::GetPinnedChats).await;

                match (loaded_settings, loaded_pinned) {
                    (Ok(loaded_settings), Ok(loaded_pinned)) => {
                        settings.set(loaded_settings);
                        pinned.set(loaded_pinned);
                        state.set(PopupState::Idle);
                    }
                    (Err(e), _) | (_, Err(e)) => {
                        log::error!("Error loading settings: {}", e);
                        state.set(PopupState::Error(format!("Failed to load: {}", e)));
                    }
                }
            });
            || ()
        });
    }

    let show_saved = {
        let saved = saved.clone();
        let status_timer = status_timer.clone();
        move || {
            saved.set(true);
            let saved = saved.clone();
            status_timer.trigger(move || saved.set(false));
        }
    };

    // Every control writes the whole settings object straight through
    let on_settings_change = {
        let settings = settings.clone();
        let state = state.clone();
        let show_saved = show_saved.clone();

        Callback::from(move |next: Settings| {
            settings.set(next);

            let state = state.clone();
            let show_saved = show_saved.clone();
            spawn_local(async move {
                let result = runtime::request::<Ack>(&Request::SaveSettings { settings: next }).await;
                let outcome = save_outcome(result, "save settings");
                if outcome == PopupState::Idle {
                    show_saved();
                }
                state.set(outcome);
            });
        })
    };

    let on_enabled = {
        let settings = settings.clone();
        let on_change = on_settings_change.clone();
        Callback::from(move |e: Event| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                on_change.emit(Settings {
                    enabled: input.checked(),
                    ..*settings
                });
            }
        })
    };

    let on_position = {
        let settings = settings.clone();
        let on_change = on_settings_change.clone();
        Callback::from(move |position: Position| on_change.emit(Settings { position, ..*settings }))
    };

    let on_size = {
        let settings = settings.clone();
        let on_change = on_settings_change.clone();
        Callback::from(move |size: Size| on_change.emit(Settings { size, ..*settings }))
    };

    let on_theme = {
        let settings = settings.clone();
        let on_change = on_settings_change.clone();
        Callback::from(move |theme: Theme| on_change.emit(Settings { theme, ..*settings }))
    };

    // Unpin handler for the row at `index`
    let on_unpin = {
        let pinned = pinned.clone();
        let state = state.clone();
        move |index: usize| {
            let pinned = pinned.clone();
            let state = state.clone();
            let show_saved = show_saved.clone();

            Callback::from(move |_: MouseEvent| {
                let mut next = (*pinned).clone();
                if next.unpin_at(index).is_none() {
                    return;
                }
                pinned.set(next.clone());

                let state = state.clone();
                let show_saved = show_saved.clone();
                spawn_local(async move {
                    let request = Request::SavePinnedChats { pinned_chats: next };
                    let outcome = save_outcome(runtime::request::<Ack>(&request).await, "unpin chat");
                    if outcome == PopupState::Idle {
                        show_saved();
                    }
                    state.set(outcome);
                });
            })
        }
    };

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Bubble Chat Enhancer"}</h1>

            if let PopupState::Error(err) = &*state {
                <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                    {err.clone()}
                </Alert>
            }

            if matches!(*state, PopupState::Loading) {
                <div class="loading-text-center">
                    <Spinner />
                </div>
            } else {
                <div class="flex-column-gap">
                    <section class="settings-section">
                        <label class="pf-v5-c-switch">
                            <input
                                class="pf-v5-c-switch__input"
                                type="checkbox"
                                id="enabled"
                                checked={settings.enabled}
                                onchange={on_enabled}
                            />
                            <span class="pf-v5-c-switch__toggle"></span>
                            <span class="pf-v5-c-switch__label">{"Show chat bubble"}</span>
                        </label>
                    </section>

                    <section class="settings-section">
                        <h2 class="section-title">{"Position"}</h2>
                        {radio_group("position", Position::ALL.map(|p| (p, p.label())), settings.position, on_position)}
                    </section>

                    <section class="settings-section">
                        <h2 class="section-title">{"Size"}</h2>
                        {radio_group("size", Size::ALL.map(|s| (s, s.label())), settings.size, on_size)}
                    </section>

                    <section class="settings-section">
                        <h2 class="section-title">{"Theme"}</h2>
                        {radio_group("theme", Theme::ALL.map(|t| (t, t.label())), settings.theme, on_theme)}
                    </section>

                    <section class="settings-section">
                        <h2 class="section-title">{"Pinned chats"}</h2>
                        if pinned.is_empty() {
                            <div class="no-pinned">{"No pinned chats yet"}</div>
                        } else {
                            {for pinned.iter().enumerate().map(|(index, chat)| html! {
                                <PinnedChatRow
                                    key={chat.thread_id.clone()}
                                    chat={chat.clone()}
                                    on_unpin={on_unpin(index)}
                                />
                            })}
                        }
                    </section>
                </div>
            }

            if *saved {
                <Alert r#type={AlertType::Success} title={"Settings saved"} inline={true}>
                </Alert>
            }

            <p class="footer-popup">
                {"Bubble Chat Enhancer v0.1.0"}
            </p>
        </div>
    }
}

/// A radio button per option; picking one emits its value
fn radio_group<T, const N: usize>(
    name: &'static str,
    options: [(T, &'static str); N],
    current: T,
    onchange: Callback<T>,
) -> Html
where
    T: Copy + PartialEq + 'static,
{
    html! {
        <div class="radio-group">
            {for options.into_iter().map(|(value, label)| {
                let onchange = onchange.reform(move |_: Event| value);
                html! {
                    <label class="pf-v5-c-radio">
                        <input
                            class="pf-v5-c-radio__input"
                            type="radio"
                            name={name}
                            checked={value == current}
                            onchange={onchange}
                        />
                        <span class="pf-v5-c-radio__label">{label}</span>
                    </label>
                }
            })}
        </div>
    }
}
