use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, MouseEvent};

use super::clock::PerformanceClock;
use super::overlay::{Overlay, OverlayConfig};
use super::surface::{PanelGeometry, Surface};
use crate::error::BootError;

const CONTAINER_STYLE: &str =
    "position:fixed;top:0;left:0;cursor:pointer;opacity:0.9;z-index:10000";

pub type BrowserOverlay = Overlay<CanvasSurface, PerformanceClock>;
pub type SharedOverlay = Rc<RefCell<BrowserOverlay>>;

/// A panel's `<canvas>`. Removed from the page when dropped.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Create a canvas sized for `geometry` and append it to `parent`.
    pub fn attach(
        document: &Document,
        parent: &HtmlElement,
        geometry: &PanelGeometry,
    ) -> Result<Self, BootError> {
        let canvas = document
            .create_element("canvas")
            .ok()
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
            .ok_or_else(|| BootError::Dom("could not create stats canvas".into()))?;
        canvas.set_width(geometry.width as u32);
        canvas.set_height(geometry.height as u32);
        let (css_w, css_h) = PanelGeometry::css_size();
        canvas
            .set_attribute("style", &format!("width:{css_w}px;height:{css_h}px"))
            .ok();

        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or_else(|| BootError::Dom("2d context unavailable for stats canvas".into()))?;
        ctx.set_font(&geometry.font());
        ctx.set_text_baseline("top");

        parent
            .append_child(&canvas)
            .map_err(|_| BootError::Dom("could not attach stats canvas".into()))?;
        Ok(Self { canvas, ctx })
    }
}

impl Surface for CanvasSurface {
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str, alpha: f64) {
        self.ctx.set_global_alpha(alpha);
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(x, y, w, h);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: &str) {
        self.ctx.set_global_alpha(1.0);
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_text(text, x, y).ok();
    }

    fn set_visible(&mut self, visible: bool) {
        let display = if visible { "block" } else { "none" };
        self.canvas.style().set_property("display", display).ok();
    }
}

impl Drop for CanvasSurface {
    fn drop(&mut self) {
        self.canvas.remove();
    }
}

/// The overlay's root `<div>`, one canvas per channel. Clicking it cycles channels.
pub struct StatsWidget {
    container: HtmlElement,
    overlay: SharedOverlay,
    on_click: Closure<dyn Fn(MouseEvent)>,
}

impl StatsWidget {
    pub fn new(config: OverlayConfig) -> Result<Self, BootError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| BootError::Dom("no document".into()))?;
        let container = document
            .create_element("div")
            .ok()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            .ok_or_else(|| BootError::Dom("could not create stats container".into()))?;
        container.set_attribute("style", CONTAINER_STYLE).ok();

        let overlay = Overlay::new(PerformanceClock::new(), config, |geometry| {
            CanvasSurface::attach(&document, &container, geometry)
        })?;
        let overlay: SharedOverlay = Rc::new(RefCell::new(overlay));

        let overlay_click = overlay.clone();
        let on_click = Closure::<dyn Fn(MouseEvent)>::new(move |e: MouseEvent| {
            e.prevent_default();
            if let Ok(mut overlay) = overlay_click.try_borrow_mut() {
                overlay.cycle_panel();
            }
        });
        container
            .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
            .map_err(|_| BootError::Dom("could not listen for stats clicks".into()))?;

        Ok(Self {
            container,
            overlay,
            on_click,
        })
    }

    pub fn element(&self) -> &HtmlElement {
        &self.container
    }

    pub fn overlay(&self) -> SharedOverlay {
        self.overlay.clone()
    }
}

impl Drop for StatsWidget {
    fn drop(&mut self) {
        let _ = self
            .container
            .remove_event_listener_with_callback("click", self.on_click.as_ref().unchecked_ref());
        self.container.remove();
    }
}
