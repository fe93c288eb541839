/// An sRGB color as raw bytes.
pub type Rgb = (u8, u8, u8);

// Tailwind-derived palette used across markers, cards and badges.
pub const RED_500: Rgb = (239, 68, 68);
pub const RED_400: Rgb = (248, 113, 113);
pub const BLUE_500: Rgb = (59, 130, 246);
pub const BLUE_400: Rgb = (96, 165, 250);
pub const EMERALD_400: Rgb = (52, 211, 153);
pub const WHITE: Rgb = (255, 255, 255);

/// Lowercase `#rrggbb`.
pub fn rgb_to_hex((r, g, b): Rgb) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}
