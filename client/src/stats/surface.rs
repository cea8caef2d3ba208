/// Logical panel size before pixel-density scaling.
const PANEL_W: f64 = 80.0;
const PANEL_H: f64 = 48.0;
const TEXT_X: f64 = 3.0;
const TEXT_Y: f64 = 2.0;
const GRAPH_X: f64 = 3.0;
const GRAPH_Y: f64 = 15.0;
const GRAPH_W: f64 = 74.0;
const GRAPH_H: f64 = 30.0;
const FONT_PX: f64 = 9.0;

/// Something a stats panel can paint into.
///
/// Coordinates are device pixels with the origin at the top-left corner.
/// Text is drawn with a top baseline.
pub trait Surface {
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str, alpha: f64);
    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: &str);
    fn set_visible(&mut self, visible: bool);
}

/// Round a device pixel ratio to a whole number of at least 1.
pub fn pixel_ratio(density: f64) -> f64 {
    if density.is_finite() {
        density.round().max(1.0)
    } else {
        1.0
    }
}

/// Device-pixel layout of a panel for one pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelGeometry {
    pub ratio: f64,
    pub width: f64,
    pub height: f64,
    pub text_x: f64,
    pub text_y: f64,
    pub graph_x: f64,
    pub graph_y: f64,
    pub graph_width: f64,
    pub graph_height: f64,
}

impl PanelGeometry {
    pub fn new(pixel_density: f64) -> Self {
        let ratio = pixel_ratio(pixel_density);
        Self {
            ratio,
            width: PANEL_W * ratio,
            height: PANEL_H * ratio,
            text_x: TEXT_X * ratio,
            text_y: TEXT_Y * ratio,
            graph_x: GRAPH_X * ratio,
            graph_y: GRAPH_Y * ratio,
            graph_width: GRAPH_W * ratio,
            graph_height: GRAPH_H * ratio,
        }
    }

    /// CSS size of the panel element.
    pub const fn css_size() -> (f64, f64) {
        (PANEL_W, PANEL_H)
    }

    /// Number of one-sample columns the graph holds.
    pub fn columns(&self) -> usize {
        GRAPH_W as usize
    }

    pub fn font(&self) -> String {
        format!("bold {}px Helvetica,Arial,sans-serif", FONT_PX * self.ratio)
    }
}

impl Default for PanelGeometry {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::Surface;

    #[derive(Debug, Clone, PartialEq)]
    pub enum DrawOp {
        Rect {
            x: f64,
            y: f64,
            w: f64,
            h: f64,
            color: String,
            alpha: f64,
        },
        Text {
            text: String,
            x: f64,
            y: f64,
            color: String,
        },
    }

    /// Surface that keeps every draw call for inspection.
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub ops: Vec<DrawOp>,
        pub visible: bool,
    }

    impl RecordingSurface {
        pub fn texts(&self) -> Vec<&str> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    DrawOp::Text { text, .. } => Some(text.as_str()),
                    DrawOp::Rect { .. } => None,
                })
                .collect()
        }

        pub fn last_text(&self) -> Option<&str> {
            self.texts().last().copied()
        }
    }

    impl Surface for RecordingSurface {
        fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str, alpha: f64) {
            self.ops.push(DrawOp::Rect {
                x,
                y,
                w,
                h,
                color: color.to_string(),
                alpha,
            });
        }

        fn fill_text(&mut self, text: &str, x: f64, y: f64, color: &str) {
            self.ops.push(DrawOp::Text {
                text: text.to_string(),
                x,
                y,
                color: color.to_string(),
            });
        }

        fn set_visible(&mut self, visible: bool) {
            self.visible = visible;
        }
    }
}
