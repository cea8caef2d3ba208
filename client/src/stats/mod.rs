//! On-screen performance overlay: frame rate, render time and server ping,
//! each drawn as a small scrolling strip chart.
//!
//! The chart and aggregation logic is independent of the browser: panels
//! draw through `Surface` and read time from `Clock`. [`StatsWidget`]
//! binds them to canvases in the page.

#![cfg_attr(not(test), allow(dead_code))]

mod canvas;
mod clock;
mod overlay;
mod panel;
mod surface;

pub use canvas::{BrowserOverlay, SharedOverlay, StatsWidget};
pub use overlay::{CyclePolicy, OverlayConfig};
