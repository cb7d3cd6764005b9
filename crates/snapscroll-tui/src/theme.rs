use ratatui::style::Color;

use snapscroll_core::host::DEFAULT_HEADER_BG;

/// Runtime theme with configurable colors
#[derive(Debug, Clone)]
pub struct Theme {
    // Background colors
    pub bg0: Color,
    pub bg1: Color,
    pub bg2: Color,

    // Foreground colors
    pub fg0: Color,
    pub grey0: Color,
    pub grey2: Color,

    // Semantic colors
    pub snapped: Color,
    pub snapping: Color,
    pub locked: Color,
    pub media: Color,
    pub accent: Color,
}

impl Default for Theme {
    fn default() -> Self {
        // Gruvbox Dark
        Self {
            bg0: Color::Rgb(0x28, 0x28, 0x28),
            bg1: Color::Rgb(0x32, 0x30, 0x2f),
            bg2: Color::Rgb(0x45, 0x40, 0x3d),
            fg0: Color::Rgb(0xd4, 0xbe, 0x98),
            grey0: Color::Rgb(0x7c, 0x6f, 0x64),
            grey2: Color::Rgb(0xa8, 0x99, 0x84),
            snapped: Color::Rgb(0x89, 0xb4, 0x82),
            snapping: Color::Rgb(0xd8, 0xa6, 0x57),
            locked: Color::Rgb(0xea, 0x69, 0x62),
            media: Color::Rgb(0xd3, 0x86, 0x9b),
            accent: Color::Rgb(0x7d, 0xae, 0xa3),
        }
    }
}

impl Theme {
    /// Header background for a declared value; `transparent` and
    /// unparseable values fall back to the base background
    pub fn header_bg(&self, value: &str) -> Color {
        if value == DEFAULT_HEADER_BG {
            return self.bg1;
        }
        parse_hex_color(value).unwrap_or(self.bg1)
    }
}

/// Parse a hex color string into a ratatui Color
/// Accepts formats: "#RRGGBB", "RRGGBB", "#RGB", "RGB"
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }

    match hex.len() {
        // Short form: RGB -> RRGGBB
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        _ => None,
    }
}
