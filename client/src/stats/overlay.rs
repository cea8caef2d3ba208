use super::clock::Clock;
use super::panel::Panel;
use super::surface::{PanelGeometry, Surface};

pub const FPS_CHANNEL: &str = "fps";
pub const RENDER_CHANNEL: &str = "render";
pub const PING_CHANNEL: &str = "ping";

const WINDOW_MS: f64 = 1000.0;
const FPS_CEILING: f64 = 100.0;
const RENDER_CEILING_MS: f64 = 200.0;
const PING_CEILING_MS: f64 = 1000.0;

/// (channel id, panel label, foreground, background)
const BUILTIN_CHANNELS: &[(&str, &str, &str, &str)] = &[
    (FPS_CHANNEL, "fps", "#0ff", "#002"),
    (RENDER_CHANNEL, "ms", "#0f0", "#020"),
    (PING_CHANNEL, "ping", "#fffb13", "#020"),
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum OverlayError {
    #[error("stats channel `{0}` is already registered")]
    DuplicateChannel(String),
}

/// What `cycle_panel` does after the last channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CyclePolicy {
    #[default]
    HideAfterLast,
    WrapToFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    /// Index into the channel list, in registration order.
    Channel(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayConfig {
    pub pixel_density: f64,
    pub cycle_policy: CyclePolicy,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            pixel_density: 1.0,
            cycle_policy: CyclePolicy::HideAfterLast,
        }
    }
}

/// Frame-rate, render-time and ping panels, one shown at a time.
pub struct Overlay<S, C> {
    channels: Vec<(String, Panel<S>)>,
    visibility: Visibility,
    cycle_policy: CyclePolicy,
    geometry: PanelGeometry,
    clock: C,

    frame_start_ms: f64,
    window_start_ms: f64,
    frames_in_window: u32,

    last_ping_ms: f64,
    max_ping_in_window: f64,
    ping_window_elapsed_ms: f64,
}

impl<S: Surface, C: Clock> Overlay<S, C> {
    /// Build the overlay with its built-in channels, showing `fps`.
    ///
    /// `new_surface` is called once per built-in panel, in display order.
    pub fn new<E>(
        clock: C,
        config: OverlayConfig,
        mut new_surface: impl FnMut(&PanelGeometry) -> Result<S, E>,
    ) -> Result<Self, E> {
        let geometry = PanelGeometry::new(config.pixel_density);
        let now = clock.now_ms();

        let mut channels = Vec::with_capacity(BUILTIN_CHANNELS.len());
        for &(id, label, fg, bg) in BUILTIN_CHANNELS {
            let surface = new_surface(&geometry)?;
            channels.push((id.to_string(), Panel::new(label, fg, bg, geometry, surface)));
        }

        let mut overlay = Self {
            channels,
            visibility: Visibility::Hidden,
            cycle_policy: config.cycle_policy,
            geometry,
            clock,
            frame_start_ms: now,
            window_start_ms: now,
            frames_in_window: 0,
            last_ping_ms: now,
            max_ping_in_window: 0.0,
            ping_window_elapsed_ms: 0.0,
        };
        overlay.show_channel(FPS_CHANNEL);
        Ok(overlay)
    }

    /// Panel geometry matching this overlay, for building extra channels.
    pub fn geometry(&self) -> &PanelGeometry {
        &self.geometry
    }

    /// Append a channel. Duplicate ids are rejected and `panel` is dropped.
    pub fn register_channel(
        &mut self,
        id: impl Into<String>,
        mut panel: Panel<S>,
    ) -> Result<&mut Panel<S>, OverlayError> {
        let id = id.into();
        if self.index_of(&id).is_some() {
            return Err(OverlayError::DuplicateChannel(id));
        }
        panel.set_visible(false);
        let index = self.channels.len();
        self.channels.push((id, panel));
        Ok(&mut self.channels[index].1)
    }

    /// Show only `id`. An unknown id hides every panel.
    pub fn show_channel(&mut self, id: &str) {
        self.show_channel_by_index(self.index_of(id));
    }

    /// Show the channel at `index` in registration order; out of range hides all.
    pub fn show_channel_by_index(&mut self, index: Option<usize>) {
        let index = index.filter(|&i| i < self.channels.len());
        for (i, (_, panel)) in self.channels.iter_mut().enumerate() {
            panel.set_visible(Some(i) == index);
        }
        self.visibility = match index {
            Some(i) => Visibility::Channel(i),
            None => Visibility::Hidden,
        };
    }

    /// Advance to the next channel using the configured policy.
    pub fn cycle_panel(&mut self) {
        self.cycle_panel_with(self.cycle_policy);
    }

    pub fn cycle_panel_with(&mut self, policy: CyclePolicy) {
        let next = match self.visibility {
            Visibility::Hidden => Some(0),
            Visibility::Channel(current) => {
                let next = current + 1;
                if next < self.channels.len() {
                    Some(next)
                } else {
                    match policy {
                        CyclePolicy::HideAfterLast => None,
                        CyclePolicy::WrapToFirst => Some(0),
                    }
                }
            }
        };
        self.show_channel_by_index(next);
    }

    pub fn frame_start(&mut self) {
        self.frame_start_ms = self.clock.now_ms();
    }

    /// Close the current frame. Returns the timestamp it ended at.
    pub fn frame_end(&mut self) -> f64 {
        self.frames_in_window += 1;
        let now = self.clock.now_ms();
        let render_ms = now - self.frame_start_ms;
        self.update_channel(RENDER_CHANNEL, render_ms, RENDER_CEILING_MS);

        if now >= self.window_start_ms + WINDOW_MS {
            let fps = (self.frames_in_window as f64 * 1000.0) / (now - self.window_start_ms);
            self.update_channel(FPS_CHANNEL, fps, FPS_CEILING);
            self.window_start_ms = now;
            self.frames_in_window = 0;
        }
        now
    }

    /// End the previous frame and start timing the next one from the same instant.
    pub fn tick(&mut self) {
        self.frame_start_ms = self.frame_end();
    }

    /// Record a server acknowledgment.
    ///
    /// The sample is the time since the previous acknowledgment, so it measures
    /// message spacing rather than round-trip latency. Hosts that time their
    /// own requests should use [`Overlay::on_latency_sample`].
    pub fn on_ping(&mut self) {
        let now = self.clock.now_ms();
        let spacing = now - self.last_ping_ms;
        self.last_ping_ms = now;
        self.record_ping(spacing);
    }

    /// Record a measured round trip. The window advances by the sample itself,
    /// which tracks wall time while one request is in flight at a time.
    pub fn on_latency_sample(&mut self, latency_ms: f64) {
        self.record_ping(latency_ms);
    }

    fn record_ping(&mut self, sample_ms: f64) {
        // A non-finite sample would stall the window accumulator for good.
        if !sample_ms.is_finite() {
            return;
        }
        self.max_ping_in_window = self.max_ping_in_window.max(sample_ms);
        self.ping_window_elapsed_ms += sample_ms;
        if self.ping_window_elapsed_ms >= WINDOW_MS {
            let max = self.max_ping_in_window;
            self.update_channel(PING_CHANNEL, max, PING_CEILING_MS);
            self.ping_window_elapsed_ms = 0.0;
            self.max_ping_in_window = 0.0;
        }
    }

    fn update_channel(&mut self, id: &str, value: f64, scale_max: f64) {
        if let Some(panel) = self.channel_mut(id) {
            panel.update(value, scale_max);
        }
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.channels.iter().position(|(channel_id, _)| channel_id == id)
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Id of the visible channel, if any.
    pub fn visible_channel(&self) -> Option<&str> {
        match self.visibility {
            Visibility::Hidden => None,
            Visibility::Channel(index) => self.channels.get(index).map(|(id, _)| id.as_str()),
        }
    }

    pub fn channel(&self, id: &str) -> Option<&Panel<S>> {
        self.channels
            .iter()
            .find(|(channel_id, _)| channel_id == id)
            .map(|(_, panel)| panel)
    }

    fn channel_mut(&mut self, id: &str) -> Option<&mut Panel<S>> {
        self.channels
            .iter_mut()
            .find(|(channel_id, _)| channel_id == id)
            .map(|(_, panel)| panel)
    }

    pub fn channel_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.channels.iter().map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }
}
