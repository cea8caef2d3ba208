use leptos::prelude::*;

use crate::error::BootError;

/// Log a startup failure and put it in front of the user.
pub fn show_fatal_error(target: RwSignal<Option<String>>, err: &BootError) {
    web_sys::console::error_1(&format!("boot_failed error={err}").into());
    target.set(Some(err.to_string()));
}

/// Full-screen error panel, shown once a fatal error has been recorded.
#[component]
pub fn FatalErrorView(error: RwSignal<Option<String>>) -> impl IntoView {
    move || {
        error.get().map(|message| {
            view! {
                <div
                    class="fatal-error"
                    style="position: fixed; inset: 0; z-index: 20000; display: flex; align-items: center; justify-content: center; background: rgba(12, 14, 23, 0.92);"
                >
                    <div style="max-width: 420px; padding: 20px 24px; background: #161921; border: 1px solid #5c2a2a; border-radius: 6px; box-shadow: 0 4px 16px rgba(0,0,0,0.5); font-family: 'Inter', system-ui, sans-serif;">
                        <div style="font-size: 0.95rem; font-weight: 700; color: #f06262; margin-bottom: 8px;">"The map could not start"</div>
                        <div style="font-size: 0.8rem; color: #e2e0d8; font-family: 'JetBrains Mono', monospace; word-break: break-word;">{message}</div>
                    </div>
                </div>
            }
        })
    }
}
