//! Stage rendering. Both back ends draw the same three layers in the same
//! order (grid, edges, cards) from the same routed geometry and sizing rules.

pub mod painter;
pub mod svg;

use std::borrow::Cow;

use eframe::egui::Color32;

use crate::stage::types::EdgeSpec;
use crate::theme::Theme;

pub const GRID_SPACING: f32 = 40.0;
pub const EDGE_WIDTH: f32 = 2.0;
pub const ARROW_SIZE: f32 = 10.0;
pub const CARD_RADIUS: f32 = 10.0;

/// Dash and gap for `dashed` edges.
pub const DASH_PATTERN: (f32, f32) = (8.0, 5.0);
/// Dash and gap for pulsing edges. Together they span one pulse period.
pub const PULSE_PATTERN: (f32, f32) = (12.0, 8.0);

pub const LABEL_FONT_SIZE: f32 = 12.0;
pub const LABEL_CHAR_WIDTH: f32 = 7.0;
pub const LABEL_PAD_X: f32 = 8.0;
pub const LABEL_HEIGHT: f32 = 22.0;
pub const LABEL_MAX_CHARS: usize = 36;

/// Label text as drawn: over-long labels are cut and end in an ellipsis.
pub fn display_label(label: &str) -> Cow<'_, str> {
    if label.chars().count() <= LABEL_MAX_CHARS {
        Cow::Borrowed(label)
    } else {
        let cut: String = label.chars().take(LABEL_MAX_CHARS - 1).collect();
        Cow::Owned(format!("{cut}\u{2026}"))
    }
}

/// Chip size for a label, from its character count alone.
pub fn label_chip_size(label: &str) -> (f32, f32) {
    let chars = display_label(label).chars().count() as f32;
    (chars * LABEL_CHAR_WIDTH + LABEL_PAD_X * 2.0, LABEL_HEIGHT)
}

/// Resolved stroke for one edge at a given pulse phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeStyle {
    pub color: Color32,
    pub dash: Option<(f32, f32)>,
    /// Distance the dash pattern is shifted along the path.
    pub dash_offset: f32,
}

pub fn edge_style(edge: &EdgeSpec, theme: &Theme, phase: f32) -> EdgeStyle {
    let color = Theme::resolve(edge.color.as_deref(), theme.edge_stroke);
    if edge.pulse {
        EdgeStyle {
            color,
            dash: Some(PULSE_PATTERN),
            dash_offset: phase,
        }
    } else {
        EdgeStyle {
            color,
            dash: edge.dashed.then_some(DASH_PATTERN),
            dash_offset: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::pulse::PULSE_PERIOD;

    #[test]
    fn chip_width_grows_with_length() {
        let (short, h) = label_chip_size("code");
        let (long, _) = label_chip_size("authorization_code");
        assert_eq!(short, 4.0 * LABEL_CHAR_WIDTH + 2.0 * LABEL_PAD_X);
        assert!(long > short);
        assert_eq!(h, LABEL_HEIGHT);
    }

    #[test]
    fn chip_width_is_capped() {
        let huge = "x".repeat(500);
        let capped = label_chip_size(&huge).0;
        assert_eq!(
            capped,
            LABEL_MAX_CHARS as f32 * LABEL_CHAR_WIDTH + 2.0 * LABEL_PAD_X
        );
        assert!(display_label(&huge).ends_with('\u{2026}'));
        assert_eq!(display_label(&huge).chars().count(), LABEL_MAX_CHARS);
    }

    #[test]
    fn short_label_is_borrowed() {
        assert!(matches!(display_label("id_token"), Cow::Borrowed(_)));
    }

    #[test]
    fn edge_colour_falls_back_to_theme() {
        let theme = Theme::light();
        let mut edge = EdgeSpec::new("e", "a", "b");
        assert_eq!(edge_style(&edge, &theme, 0.0).color, theme.edge_stroke);
        edge.color = Some("#ff0000".to_string());
        assert_eq!(
            edge_style(&edge, &theme, 0.0).color,
            Color32::from_rgb(255, 0, 0)
        );
    }

    #[test]
    fn pulse_pattern_spans_one_period() {
        let (dash, gap) = PULSE_PATTERN;
        assert_eq!(dash + gap, PULSE_PERIOD);

        let mut edge = EdgeSpec::new("e", "a", "b");
        edge.pulse = true;
        let style = edge_style(&edge, &Theme::dark(), 7.5);
        assert_eq!(style.dash_offset, 7.5);
        assert_eq!(style.dash, Some(PULSE_PATTERN));
    }
}
