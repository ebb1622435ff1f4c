use eframe::egui::Color32;

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub background: Color32,
    pub foreground: Color32,
    pub heading_color: Color32,
    pub accent: Color32,
    pub grid_line: Color32,
    pub card_fill: Color32,
    pub card_border: Color32,
    pub card_shadow: Color32,
    /// Stroke for edges that do not set their own colour.
    pub edge_stroke: Color32,
    pub label_background: Color32,
    pub label_foreground: Color32,
    pub panel_background: Color32,
    pub code_foreground: Color32,
    pub success: Color32,
    pub title_size: f32,
    pub caption_size: f32,
    pub code_size: f32,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            background: Color32::from_rgb(0x1E, 0x1E, 0x1E),
            foreground: Color32::from_rgb(0xC8, 0xC8, 0xC8),
            heading_color: Color32::WHITE,
            accent: Color32::from_rgb(0x52, 0x94, 0xE2),
            grid_line: Color32::from_rgb(0x2A, 0x2A, 0x2A),
            card_fill: Color32::from_rgb(0x2D, 0x2D, 0x2D),
            card_border: Color32::from_rgb(0x4A, 0x4A, 0x4A),
            card_shadow: Color32::from_black_alpha(90),
            edge_stroke: Color32::from_rgb(0x9A, 0x9A, 0x9A),
            label_background: Color32::from_rgb(0x26, 0x26, 0x26),
            label_foreground: Color32::from_rgb(0xE0, 0xE0, 0xE0),
            panel_background: Color32::from_rgb(0x25, 0x25, 0x25),
            code_foreground: Color32::from_rgb(0xD4, 0xD4, 0xD4),
            success: Color32::from_rgb(0x5C, 0xDB, 0x95),
            title_size: 40.0,
            caption_size: 22.0,
            code_size: 14.0,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            background: Color32::WHITE,
            foreground: Color32::from_rgb(0x1A, 0x1A, 0x2E),
            heading_color: Color32::from_rgb(0x16, 0x21, 0x3E),
            accent: Color32::from_rgb(0x0F, 0x34, 0x60),
            grid_line: Color32::from_rgb(0xEE, 0xEF, 0xF3),
            card_fill: Color32::WHITE,
            card_border: Color32::from_rgb(0xCB, 0xD2, 0xDC),
            card_shadow: Color32::from_black_alpha(24),
            edge_stroke: Color32::from_rgb(0x64, 0x74, 0x8B),
            label_background: Color32::from_rgb(0xF5, 0xF5, 0xF5),
            label_foreground: Color32::from_rgb(0x33, 0x33, 0x33),
            panel_background: Color32::from_rgb(0xF7, 0xF8, 0xFA),
            code_foreground: Color32::from_rgb(0x33, 0x33, 0x33),
            success: Color32::from_rgb(0x1E, 0x8A, 0x5A),
            title_size: 40.0,
            caption_size: 22.0,
            code_size: 14.0,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "dark" => Self::dark(),
            _ => Self::light(),
        }
    }

    pub fn toggled(&self) -> Self {
        if self.name == "dark" {
            Self::light()
        } else {
            Self::dark()
        }
    }

    /// Apply opacity to a color
    pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
        Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), (opacity * 255.0) as u8)
    }

    /// Resolve an optional `#rrggbb` colour, falling back to `fallback`.
    pub fn resolve(color: Option<&str>, fallback: Color32) -> Color32 {
        color.and_then(parse_color).unwrap_or(fallback)
    }
}

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`. The leading `#` is optional.
pub fn parse_color(value: &str) -> Option<Color32> {
    let hex = value.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (slot, c) in rgb.iter_mut().zip(hex.chars()) {
                let v = c.to_digit(16)? as u8;
                *slot = v * 16 + v;
            }
            Some(Color32::from_rgb(rgb[0], rgb[1], rgb[2]))
        }
        6 => Some(Color32::from_rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color32::from_rgba_unmultiplied(
            byte(0)?,
            byte(2)?,
            byte(4)?,
            byte(6)?,
        )),
        _ => None,
    }
}

/// `#rrggbb` form of a colour, alpha dropped.
pub fn to_hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}
