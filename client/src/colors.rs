/// Marker colors for players whose config does not set one.
const PLAYER_PALETTE: &[(u8, u8, u8)] = &[
    (245, 197, 66),
    (96, 200, 255),
    (240, 98, 146),
    (129, 212, 120),
    (186, 140, 255),
    (255, 150, 80),
];

/// Format RGBA as a CSS color string.
pub fn rgba_css(r: u8, g: u8, b: u8, a: f64) -> String {
    format!("rgba({r},{g},{b},{a})")
}

/// Palette color for the player at `index`, wrapping around.
pub fn palette_css(index: usize) -> String {
    let (r, g, b) = PLAYER_PALETTE[index % PLAYER_PALETTE.len()];
    rgba_css(r, g, b, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_rgba() {
        assert_eq!(rgba_css(12, 14, 23, 0.5), "rgba(12,14,23,0.5)");
    }

    #[test]
    fn palette_wraps() {
        assert_eq!(palette_css(0), "rgba(245,197,66,1)");
        assert_eq!(palette_css(PLAYER_PALETTE.len()), palette_css(0));
    }
}
