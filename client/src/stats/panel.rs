use std::collections::VecDeque;

use super::surface::{PanelGeometry, Surface};

const GRAPH_WASH_ALPHA: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Sample {
    value: f64,
    scale_max: f64,
}

/// A scrolling strip chart for one metric.
///
/// The last `geometry.columns()` samples live in `history`; every update
/// repaints the label and replays the history into the surface, newest
/// column on the right.
pub struct Panel<S> {
    name: String,
    foreground: String,
    background: String,
    min: f64,
    max: f64,
    history: VecDeque<Sample>,
    geometry: PanelGeometry,
    surface: S,
}

impl<S: Surface> Panel<S> {
    pub fn new(
        name: impl Into<String>,
        foreground: impl Into<String>,
        background: impl Into<String>,
        geometry: PanelGeometry,
        surface: S,
    ) -> Self {
        let mut panel = Self {
            name: name.into(),
            foreground: foreground.into(),
            background: background.into(),
            min: f64::INFINITY,
            max: 0.0,
            history: VecDeque::with_capacity(geometry.columns()),
            geometry,
            surface,
        };
        panel.paint_initial();
        panel
    }

    fn paint_initial(&mut self) {
        let g = self.geometry;
        self.surface
            .fill_rect(0.0, 0.0, g.width, g.height, &self.background, 1.0);
        self.surface
            .fill_text(&self.name, g.text_x, g.text_y, &self.foreground);
        self.paint_graph_baseline();
    }

    fn paint_graph_baseline(&mut self) {
        let g = self.geometry;
        self.surface.fill_rect(
            g.graph_x,
            g.graph_y,
            g.graph_width,
            g.graph_height,
            &self.foreground,
            1.0,
        );
        self.surface.fill_rect(
            g.graph_x,
            g.graph_y,
            g.graph_width,
            g.graph_height,
            &self.background,
            GRAPH_WASH_ALPHA,
        );
    }

    /// Record `value` and repaint. `scale_max` is the value drawn as a full-height bar.
    pub fn update(&mut self, value: f64, scale_max: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);

        if self.history.len() == self.geometry.columns() {
            self.history.pop_front();
        }
        self.history.push_back(Sample { value, scale_max });

        let g = self.geometry;
        let label = self.label();
        self.surface
            .fill_rect(0.0, 0.0, g.width, g.graph_y, &self.background, 1.0);
        self.surface
            .fill_text(&label, g.text_x, g.text_y, &self.foreground);
        self.replay_graph();
    }

    fn replay_graph(&mut self) {
        self.paint_graph_baseline();

        let g = self.geometry;
        let column_w = g.ratio;
        let first_x = g.graph_x + g.graph_width - column_w * self.history.len() as f64;
        for (i, sample) in self.history.iter().enumerate() {
            let x = first_x + column_w * i as f64;
            self.surface.fill_rect(
                x,
                g.graph_y,
                column_w,
                g.graph_height,
                &self.foreground,
                1.0,
            );
            let wash = wash_height(sample.value, sample.scale_max, g.graph_height);
            self.surface.fill_rect(
                x,
                g.graph_y,
                column_w,
                wash,
                &self.background,
                GRAPH_WASH_ALPHA,
            );
        }
    }

    /// Current label text; just the name until the first update.
    pub fn label(&self) -> String {
        let Some(last) = self.history.back() else {
            return self.name.clone();
        };
        format!(
            "{} {} ({}-{})",
            format_rounded(last.value),
            self.name,
            format_rounded(self.min),
            format_rounded(self.max)
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn last_value(&self) -> Option<f64> {
        self.history.back().map(|s| s.value)
    }

    /// Sample values, oldest first.
    pub fn history(&self) -> impl Iterator<Item = f64> + '_ {
        self.history.iter().map(|s| s.value)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.surface.set_visible(visible);
    }
}

/// Height of the background wash covering the top of a column.
/// Full height means no visible bar, zero means a full bar.
fn wash_height(value: f64, scale_max: f64, graph_height: f64) -> f64 {
    let filled = value / scale_max;
    let filled = if filled.is_nan() {
        0.0
    } else {
        filled.clamp(0.0, 1.0)
    };
    ((1.0 - filled) * graph_height).round()
}

/// Round half up, the way the label has always displayed numbers.
fn format_rounded(value: f64) -> String {
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let rounded = (value + 0.5).floor();
    // -0.0 would print as "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded:.0}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::surface::recording::{DrawOp, RecordingSurface};

    fn panel() -> Panel<RecordingSurface> {
        Panel::new(
            "ms",
            "#0f0",
            "#020",
            PanelGeometry::default(),
            RecordingSurface::default(),
        )
    }

    #[test]
    fn construction_paints_background_label_and_baseline() {
        let p = panel();
        let ops = &p.surface().ops;
        assert_eq!(ops.len(), 4);
        assert_eq!(
            ops[0],
            DrawOp::Rect {
                x: 0.0,
                y: 0.0,
                w: 80.0,
                h: 48.0,
                color: "#020".into(),
                alpha: 1.0
            }
        );
        assert_eq!(
            ops[1],
            DrawOp::Text {
                text: "ms".into(),
                x: 3.0,
                y: 2.0,
                color: "#0f0".into()
            }
        );
        assert!(matches!(&ops[3], DrawOp::Rect { alpha, .. } if *alpha == 0.9));
        assert_eq!(p.label(), "ms");
    }

    #[test]
    fn min_max_track_all_values() {
        let mut p = panel();
        let values = [12.0, 3.5, 40.0, 7.0, 0.25, 39.0];
        for v in values {
            p.update(v, 200.0);
        }
        assert_eq!(p.min(), 0.25);
        assert_eq!(p.max(), 40.0);
    }

    #[test]
    fn repeating_a_value_leaves_extrema_alone() {
        let mut p = panel();
        p.update(5.0, 10.0);
        p.update(9.0, 10.0);
        let before = (p.min(), p.max());
        p.update(9.0, 10.0);
        assert_eq!((p.min(), p.max()), before);
    }

    #[test]
    fn label_rounds_every_number() {
        let mut p = panel();
        p.update(16.4, 200.0);
        p.update(2.5, 200.0);
        p.update(33.6, 200.0);
        assert_eq!(p.label(), "34 ms (3-34)");
        assert_eq!(p.surface().last_text(), Some("34 ms (3-34)"));
    }

    #[test]
    fn history_is_bounded_by_graph_columns() {
        let mut p = panel();
        for i in 0..100 {
            p.update(i as f64, 100.0);
        }
        let history: Vec<f64> = p.history().collect();
        assert_eq!(history.len(), 74);
        assert_eq!(history.first(), Some(&26.0));
        assert_eq!(p.last_value(), Some(99.0));
    }

    #[test]
    fn newest_column_is_rightmost() {
        let mut p = panel();
        p.update(50.0, 100.0);
        let ops = &p.surface().ops;
        let n = ops.len();
        assert_eq!(
            ops[n - 2],
            DrawOp::Rect {
                x: 76.0,
                y: 15.0,
                w: 1.0,
                h: 30.0,
                color: "#0f0".into(),
                alpha: 1.0
            }
        );
        assert_eq!(
            ops[n - 1],
            DrawOp::Rect {
                x: 76.0,
                y: 15.0,
                w: 1.0,
                h: 15.0,
                color: "#020".into(),
                alpha: 0.9
            }
        );
    }

    #[test]
    fn wash_height_clamps_to_graph() {
        assert_eq!(wash_height(0.0, 100.0, 30.0), 30.0);
        assert_eq!(wash_height(100.0, 100.0, 30.0), 0.0);
        assert_eq!(wash_height(250.0, 100.0, 30.0), 0.0);
        assert_eq!(wash_height(-5.0, 100.0, 30.0), 30.0);
        assert_eq!(wash_height(f64::NAN, 100.0, 30.0), 30.0);
        assert_eq!(wash_height(f64::INFINITY, 100.0, 30.0), 0.0);
    }

    #[test]
    fn infinities_print_like_the_label_always_has() {
        assert_eq!(format_rounded(f64::INFINITY), "Infinity");
        assert_eq!(format_rounded(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_rounded(-0.2), "0");
        assert_eq!(format_rounded(2.5), "3");
    }

    #[test]
    fn degenerate_values_do_not_panic() {
        let mut p = panel();
        p.update(0.0, 100.0);
        p.update(f64::INFINITY, 100.0);
        p.update(f64::NAN, 100.0);
        assert_eq!(p.max(), f64::INFINITY);
        assert_eq!(p.label(), "NaN ms (0-Infinity)");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn min_max_match_the_sequence(values in proptest::collection::vec(0.0f64..10_000.0, 1..200)) {
                let mut p = panel();
                for &v in &values {
                    p.update(v, 200.0);
                }
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(0.0, f64::max);
                prop_assert_eq!(p.min(), min);
                prop_assert_eq!(p.max(), max);
                prop_assert!(p.history().count() <= p.geometry.columns());
            }

            #[test]
            fn repeated_value_keeps_extrema(
                values in proptest::collection::vec(0.0f64..1_000.0, 1..50),
                pick in any::<prop::sample::Index>(),
            ) {
                let mut p = panel();
                for &v in &values {
                    p.update(v, 100.0);
                }
                let before = (p.min(), p.max());
                p.update(values[pick.index(values.len())], 100.0);
                prop_assert_eq!((p.min(), p.max()), before);
            }
        }
    }
}
