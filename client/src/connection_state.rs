use leptos::prelude::*;

use crate::socket::ConnectionStatus;

fn status_label(status: ConnectionStatus) -> Option<&'static str> {
    match status {
        ConnectionStatus::Connecting => Some("Connecting to server…"),
        ConnectionStatus::Reconnecting => Some("Connection lost, reconnecting…"),
        ConnectionStatus::Connected => None,
    }
}

/// Banner shown while the sync socket is not connected.
#[component]
pub fn ConnectionStateView(status: RwSignal<ConnectionStatus>) -> impl IntoView {
    move || {
        status_label(status.get()).map(|label| {
            view! {
                <div
                    class="connection-state"
                    style="position: fixed; bottom: 16px; left: 50%; transform: translateX(-50%); z-index: 9000; padding: 6px 14px; background: #13161f; border: 1px solid #3a3f5c; border-radius: 4px; color: #f5c542; font-family: 'JetBrains Mono', monospace; font-size: 0.75rem; pointer-events: none;"
                >
                    {label}
                </div>
            }
        })
    }
}
