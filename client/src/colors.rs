use weatherguard_shared::colors::{Rgb, rgb_to_hex};

/// Format RGBA as a CSS color string.
pub fn rgba_css((r, g, b): Rgb, a: f64) -> String {
    format!("rgba({r},{g},{b},{a})")
}

/// Opaque colors as `#rrggbb`.
pub fn rgb_css(rgb: Rgb) -> String {
    rgb_to_hex(rgb)
}

/// CSS `linear-gradient` from a color at full strength to the same color faded.
pub fn fade_gradient(rgb: Rgb, from_alpha: f64, to_alpha: f64) -> String {
    format!(
        "linear-gradient(to right, {}, {})",
        rgba_css(rgb, from_alpha),
        rgba_css(rgb, to_alpha)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use weatherguard_shared::colors::{BLUE_500, RED_400};

    #[test]
    fn formats_rgba() {
        assert_eq!(rgba_css(BLUE_500, 0.6), "rgba(59,130,246,0.6)");
        assert_eq!(rgb_css(RED_400), "#f87171");
    }

    #[test]
    fn gradient_uses_both_alphas() {
        assert_eq!(
            fade_gradient(RED_400, 1.0, 0.4),
            "linear-gradient(to right, rgba(248,113,113,1), rgba(248,113,113,0.4))"
        );
    }
}
