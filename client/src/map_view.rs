use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, HtmlImageElement};

use townview_shared::{MapConfig, PlayerUpdate};

use crate::error::BootError;
use crate::fetch::Textures;
use crate::players::Players;
use crate::stats::{OverlayConfig, SharedOverlay, StatsWidget};
use crate::viewport::Viewport;

const BACKGROUND: &str = "#0c0e17";
const BACKGROUND_TEXTURE: &str = "town";
const MARKER_RADIUS: f64 = 6.0;
const MARKER_OUTLINE: &str = "rgba(0, 0, 0, 0.6)";
const LABEL_FONT: &str = "600 11px 'Inter', system-ui, sans-serif";
const LABEL_COLOR: &str = "rgba(226, 224, 216, 0.9)";

pub(crate) fn canvas_dimensions() -> (f64, f64) {
    let Some(window) = web_sys::window() else {
        return (1200.0, 800.0);
    };
    let w = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(1200.0);
    let h = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(800.0);
    (w, h)
}

pub(crate) fn device_pixel_ratio() -> f64 {
    web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0)
}

/// The town map: background texture, player markers and the stats overlay.
pub struct MapApp {
    root: HtmlElement,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    town_size: (f64, f64),
    background: Option<HtmlImageElement>,
    players: RefCell<Players>,
    viewport: Cell<Viewport>,
    css_size: Cell<(f64, f64)>,
    last_frame_ms: Cell<Option<f64>>,
    stats: StatsWidget,
}

impl MapApp {
    pub fn new(
        config: &MapConfig,
        textures: Textures,
        stats_config: OverlayConfig,
    ) -> Result<Self, BootError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| BootError::Dom("no document".into()))?;

        let root = document
            .create_element("div")
            .ok()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            .ok_or_else(|| BootError::Dom("could not create map root".into()))?;
        root.set_class_name("map-app");
        root.set_attribute(
            "style",
            "position: relative; width: 100%; height: 100%; overflow: hidden;",
        )
        .ok();

        let canvas = document
            .create_element("canvas")
            .ok()
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
            .ok_or_else(|| BootError::Dom("could not create map canvas".into()))?;
        canvas
            .set_attribute("style", "display: block; width: 100%; height: 100%;")
            .ok();
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or_else(|| BootError::Dom("2d context unavailable for map canvas".into()))?;
        root.append_child(&canvas)
            .map_err(|_| BootError::Dom("could not attach map canvas".into()))?;

        let stats = StatsWidget::new(stats_config)?;
        root.append_child(stats.element())
            .map_err(|_| BootError::Dom("could not attach stats overlay".into()))?;

        let background = textures
            .get(BACKGROUND_TEXTURE)
            .or_else(|| textures.values().next())
            .cloned();

        Ok(Self {
            root,
            canvas,
            ctx,
            town_size: (config.town_width, config.town_height),
            background,
            players: RefCell::new(Players::from_config(config)),
            viewport: Cell::new(Viewport::default()),
            css_size: Cell::new((0.0, 0.0)),
            last_frame_ms: Cell::new(None),
            stats,
        })
    }

    pub fn element(&self) -> &HtmlElement {
        &self.root
    }

    pub fn stats(&self) -> SharedOverlay {
        self.stats.overlay()
    }

    /// Match the canvas backing store to the window and refit the town.
    pub fn resize(&self) {
        let (w, h) = canvas_dimensions();
        let dpr = device_pixel_ratio();
        let backing_w = (w * dpr).round() as u32;
        let backing_h = (h * dpr).round() as u32;
        if self.canvas.width() != backing_w || self.canvas.height() != backing_h {
            self.canvas.set_width(backing_w);
            self.canvas.set_height(backing_h);
        }
        self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0).ok();
        self.css_size.set((w, h));
        let (town_w, town_h) = self.town_size;
        self.viewport.set(Viewport::fit(town_w, town_h, w, h));
    }

    pub fn apply_sync(&self, updates: &BTreeMap<String, PlayerUpdate>) {
        self.players.borrow_mut().apply_sync(updates);
    }

    /// Advance markers to `timestamp_ms` and repaint.
    pub fn render_frame(&self, timestamp_ms: f64) {
        let elapsed = self
            .last_frame_ms
            .replace(Some(timestamp_ms))
            .map(|prev| timestamp_ms - prev)
            .unwrap_or(0.0);
        let mut players = self.players.borrow_mut();
        players.advance(elapsed);

        let ctx = &self.ctx;
        let (w, h) = self.css_size.get();
        let vp = self.viewport.get();

        ctx.set_fill_style_str(BACKGROUND);
        ctx.fill_rect(0.0, 0.0, w, h);

        if let Some(image) = &self.background {
            let (x, y) = vp.world_to_screen(0.0, 0.0);
            let (town_w, town_h) = self.town_size;
            ctx.draw_image_with_html_image_element_and_dw_and_dh(
                image,
                x,
                y,
                town_w * vp.scale,
                town_h * vp.scale,
            )
            .ok();
        }

        ctx.set_font(LABEL_FONT);
        ctx.set_line_width(1.5);
        for (_, marker) in players.iter() {
            let (x, y) = vp.world_to_screen(marker.position.x, marker.position.y);

            ctx.begin_path();
            ctx.arc(x, y, MARKER_RADIUS, 0.0, TAU).ok();
            ctx.set_fill_style_str(&marker.color);
            ctx.fill();
            ctx.set_stroke_style_str(MARKER_OUTLINE);
            ctx.stroke();

            if let Some(name) = &marker.name {
                ctx.set_fill_style_str(LABEL_COLOR);
                ctx.fill_text(name, x + MARKER_RADIUS + 3.0, y + 4.0).ok();
            }
        }
    }
}

impl Drop for MapApp {
    fn drop(&mut self) {
        self.root.remove();
    }
}
