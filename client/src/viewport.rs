/// Transformation from town coordinates to canvas CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 1.0,
        }
    }
}

impl Viewport {
    /// Largest scale that shows the whole town, centered, aspect preserved.
    /// Degenerate sizes give the identity transform.
    pub fn fit(town_w: f64, town_h: f64, canvas_w: f64, canvas_h: f64) -> Self {
        if town_w <= 0.0 || town_h <= 0.0 || canvas_w <= 0.0 || canvas_h <= 0.0 {
            return Self::default();
        }

        let scale = (canvas_w / town_w).min(canvas_h / town_h);
        Self {
            offset_x: (canvas_w - town_w * scale) / 2.0,
            offset_y: (canvas_h - town_h * scale) / 2.0,
            scale,
        }
    }

    pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
        (
            wx * self.scale + self.offset_x,
            wy * self.scale + self.offset_y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Viewport;

    #[test]
    fn letterboxes_wide_canvas() {
        let vp = Viewport::fit(100.0, 100.0, 400.0, 200.0);
        assert_eq!(vp.scale, 2.0);
        assert_eq!((vp.offset_x, vp.offset_y), (100.0, 0.0));
        assert_eq!(vp.world_to_screen(100.0, 100.0), (300.0, 200.0));
    }

    #[test]
    fn letterboxes_tall_canvas() {
        let vp = Viewport::fit(200.0, 100.0, 100.0, 300.0);
        assert_eq!(vp.scale, 0.5);
        assert_eq!((vp.offset_x, vp.offset_y), (0.0, 125.0));
    }

    #[test]
    fn degenerate_sizes_fall_back_to_identity() {
        assert_eq!(Viewport::fit(0.0, 10.0, 100.0, 100.0), Viewport::default());
        assert_eq!(Viewport::fit(10.0, 10.0, 100.0, 0.0), Viewport::default());
    }
}
