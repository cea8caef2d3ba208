use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlElement;

use crate::connection_state::ConnectionStateView;
use crate::error::BootError;
use crate::fatal_error::{FatalErrorView, show_fatal_error};
use crate::fetch;
use crate::map_view::{MapApp, device_pixel_ratio};
use crate::options::ClientOptions;
use crate::render_loop::FrameTicker;
use crate::socket::{ConnectionStatus, ServerSocketConnector, SocketEvent};
use crate::stats::{BrowserOverlay, OverlayConfig, SharedOverlay};

struct ResizeBinding {
    window: web_sys::Window,
    handler: Closure<dyn Fn()>,
}

impl ResizeBinding {
    fn new(map: Rc<MapApp>) -> Result<Self, BootError> {
        let window = web_sys::window().ok_or_else(|| BootError::Dom("no window".into()))?;
        let handler = Closure::<dyn Fn()>::new(move || map.resize());
        window
            .add_event_listener_with_callback("resize", handler.as_ref().unchecked_ref())
            .map_err(|_| BootError::Dom("could not listen for window resize".into()))?;
        Ok(Self { window, handler })
    }
}

impl Drop for ResizeBinding {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("resize", self.handler.as_ref().unchecked_ref());
    }
}

/// Everything a running map keeps alive. Field order is drop order:
/// the ticker goes first so no frame runs against a half-torn-down map.
struct Session {
    _ticker: FrameTicker,
    _resize: ResizeBinding,
    _connector: Rc<ServerSocketConnector>,
    _map: Rc<MapApp>,
}

thread_local! {
    static SESSION: RefCell<Option<Session>> = const { RefCell::new(None) };
    // Bumped on unmount; a boot started under an older epoch must not install its session.
    static BOOT_EPOCH: Cell<u64> = const { Cell::new(0) };
}

fn current_boot_epoch() -> u64 {
    BOOT_EPOCH.with(Cell::get)
}

fn cancel_pending_boots() {
    BOOT_EPOCH.with(|epoch| epoch.set(epoch.get().wrapping_add(1)));
}

fn boot_cancelled(epoch: u64) -> bool {
    current_boot_epoch() != epoch
}

fn with_overlay(stats: &SharedOverlay, f: impl FnOnce(&mut BrowserOverlay)) {
    if let Ok(mut overlay) = stats.try_borrow_mut() {
        f(&mut overlay);
    }
}

/// Fetch config and textures, mount the map into `host`, and start syncing.
async fn boot(
    host: HtmlElement,
    connection: RwSignal<ConnectionStatus>,
    epoch: u64,
) -> Result<(), BootError> {
    let options = ClientOptions::from_location();
    web_sys::console::info_1(
        &format!(
            "boot_start server={} stats_channel={:?}",
            options.server_url, options.stats_channel
        )
        .into(),
    );

    let config = fetch::fetch_config(&options.config_url()).await?;
    let textures = fetch::fetch_textures(fetch::TEXTURE_DIR, &config.textures).await?;
    if boot_cancelled(epoch) {
        web_sys::console::info_1(&"boot_cancelled reason=unmounted".into());
        return Ok(());
    }

    let overlay_config = OverlayConfig {
        pixel_density: device_pixel_ratio(),
        cycle_policy: options.cycle_policy,
    };
    let map = Rc::new(MapApp::new(&config, textures, overlay_config)?);
    host.append_child(map.element())
        .map_err(|_| BootError::Dom("could not mount the map".into()))?;
    map.resize();
    let resize = ResizeBinding::new(map.clone())?;

    // Set on connect and on every sync; the next frame answers with one sync request.
    let sync_received = Rc::new(Cell::new(false));
    let connector = Rc::new(ServerSocketConnector::connect(
        options.socket_url(),
        connection,
    )?);
    {
        let sync_received = sync_received.clone();
        let map = map.clone();
        let stats = map.stats();
        connector.on(move |event| match event {
            SocketEvent::Connect => sync_received.set(true),
            SocketEvent::Sync(players) => {
                sync_received.set(true);
                with_overlay(&stats, |overlay| overlay.on_ping());
                map.apply_sync(players);
            }
            SocketEvent::Disconnect => {}
        });
    }

    let ticker = FrameTicker::new();
    {
        let map = map.clone();
        let stats = map.stats();
        ticker.add(move |timestamp| {
            with_overlay(&stats, |overlay| overlay.frame_start());
            map.render_frame(timestamp);
            with_overlay(&stats, |overlay| {
                overlay.frame_end();
            });
        });
    }
    {
        let connector = connector.clone();
        ticker.add(move |_| {
            if sync_received.replace(false) {
                connector.sync();
            }
        });
    }
    ticker.start();

    if let Some(channel) = &options.stats_channel {
        with_overlay(&map.stats(), |overlay| overlay.show_channel(channel));
    }

    let session = Session {
        _ticker: ticker,
        _resize: resize,
        _connector: connector,
        _map: map,
    };
    let previous = SESSION.with(|slot| slot.borrow_mut().replace(session));
    drop(previous);

    web_sys::console::info_1(&"boot_complete".into());
    Ok(())
}

/// Root component: map host, connection banner and fatal error panel.
#[component]
pub fn App() -> impl IntoView {
    let connection: RwSignal<ConnectionStatus> = RwSignal::new(ConnectionStatus::Connecting);
    let fatal_error: RwSignal<Option<String>> = RwSignal::new(None);
    let boot_started: RwSignal<bool> = RwSignal::new(false);
    let map_host = NodeRef::<leptos::html::Div>::new();

    // Boot once the host element is in the page.
    Effect::new(move || {
        let Some(host) = map_host.get() else {
            return;
        };
        if boot_started.get_untracked() {
            return;
        }
        boot_started.set(true);

        let host: HtmlElement = (*host).clone();
        let epoch = current_boot_epoch();
        spawn_local(async move {
            if let Err(err) = boot(host, connection, epoch).await
                && !boot_cancelled(epoch)
            {
                show_fatal_error(fatal_error, &err);
            }
        });
    });

    on_cleanup(|| {
        cancel_pending_boots();
        let session = SESSION.with(|slot| slot.borrow_mut().take());
        drop(session);
    });

    view! {
        <div
            node_ref=map_host
            data-component="MapApp"
            style="width: 100%; height: 100%; position: relative; overflow: hidden; background: #0c0e17;"
        />
        <ConnectionStateView status=connection />
        <FatalErrorView error=fatal_error />
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmount_cancels_a_boot_in_flight() {
        let epoch = current_boot_epoch();
        assert!(!boot_cancelled(epoch));

        cancel_pending_boots();
        assert!(boot_cancelled(epoch));
        assert!(!boot_cancelled(current_boot_epoch()));
    }
}
