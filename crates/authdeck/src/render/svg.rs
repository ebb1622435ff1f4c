//! Standalone SVG rendering of a stage, used by `authdeck export`.

use std::fmt::Write as _;

use crate::stage::Stage;
use crate::stage::layout::{
    CARD_PADDING, DETAIL_FONT_SIZE, LABEL_FONT_SIZE as CARD_LABEL_SIZE, MonoMeasure,
    ROLE_CHIP_HEIGHT, card_layout,
};
use crate::stage::pulse::{PULSE_PERIOD, PULSE_STEP};
use crate::stage::types::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::theme::{Theme, to_hex};

use super::{
    ARROW_SIZE, CARD_RADIUS, EDGE_WIDTH, GRID_SPACING, LABEL_FONT_SIZE, display_label, edge_style,
    label_chip_size,
};

/// Frames per second the live presenter advances the pulse at.
const PULSE_FPS: f32 = 60.0;

/// Text drawn around the diagram.
#[derive(Debug, Clone, Default)]
pub struct SvgOverlay<'a> {
    pub title: Option<&'a str>,
    pub caption: Option<&'a str>,
    /// `(node id, text)` badges pinned to a node's top-right corner.
    pub badges: Vec<(&'a str, &'a str)>,
}

/// Render the stage's current scene as an SVG document.
pub fn render_svg(stage: &Stage, theme: &Theme, overlay: &SvgOverlay<'_>) -> String {
    let mut svg = String::new();
    let (w, h) = (CANVAS_WIDTH, CANVAS_HEIGHT);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"Helvetica, Arial, sans-serif\">"
    );
    let _ = write!(
        svg,
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        to_hex(theme.background)
    );

    write_markers(&mut svg, stage, theme);
    write_grid(&mut svg, theme);
    write_edges(&mut svg, stage, theme);
    write_cards(&mut svg, stage, theme);
    write_overlay(&mut svg, stage, theme, overlay);

    svg.push_str("</svg>");
    svg
}

fn write_markers(svg: &mut String, stage: &Stage, theme: &Theme) {
    svg.push_str("<defs>");
    for (edge, _) in stage.routes().drawn() {
        let color = to_hex(edge_style(edge, theme, 0.0).color);
        let _ = write!(
            svg,
            "<marker id=\"arrow-{}\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"{ARROW_SIZE}\" markerHeight=\"{ARROW_SIZE}\" markerUnits=\"userSpaceOnUse\" orient=\"auto\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{color}\"/></marker>",
            escape_xml(&edge.id)
        );
    }
    svg.push_str("</defs>");
}

fn write_grid(svg: &mut String, theme: &Theme) {
    let color = to_hex(theme.grid_line);
    let _ = write!(svg, "<g class=\"grid\" stroke=\"{color}\" stroke-width=\"1\">");
    let mut x = GRID_SPACING;
    while x < CANVAS_WIDTH {
        let _ = write!(svg, "<line x1=\"{x}\" y1=\"0\" x2=\"{x}\" y2=\"{CANVAS_HEIGHT}\"/>");
        x += GRID_SPACING;
    }
    let mut y = GRID_SPACING;
    while y < CANVAS_HEIGHT {
        let _ = write!(svg, "<line x1=\"0\" y1=\"{y}\" x2=\"{CANVAS_WIDTH}\" y2=\"{y}\"/>");
        y += GRID_SPACING;
    }
    svg.push_str("</g>");
}

fn write_edges(svg: &mut String, stage: &Stage, theme: &Theme) {
    svg.push_str("<g class=\"edges\" fill=\"none\">");
    for (edge, route) in stage.routes().drawn() {
        let style = edge_style(edge, theme, stage.phase());
        let color = to_hex(style.color);
        let id = escape_xml(&edge.id);
        let _ = write!(
            svg,
            "<path data-edge=\"{id}\" d=\"{}\" stroke=\"{color}\" stroke-width=\"{EDGE_WIDTH}\" marker-end=\"url(#arrow-{id})\"",
            route.path_data()
        );
        match style.dash {
            Some((dash, gap)) if edge.pulse => {
                let seconds = PULSE_PERIOD / PULSE_STEP / PULSE_FPS;
                let _ = write!(
                    svg,
                    " stroke-dasharray=\"{dash} {gap}\" stroke-dashoffset=\"{:.2}\"><animate attributeName=\"stroke-dashoffset\" from=\"{:.2}\" to=\"{:.2}\" dur=\"{seconds:.2}s\" repeatCount=\"indefinite\"/></path>",
                    -style.dash_offset,
                    -style.dash_offset,
                    -style.dash_offset - PULSE_PERIOD
                );
            }
            Some((dash, gap)) => {
                let _ = write!(svg, " stroke-dasharray=\"{dash} {gap}\"/>");
            }
            None => svg.push_str("/>"),
        }

        if let Some(label) = edge.label.as_deref().filter(|l| !l.is_empty()) {
            let (cw, ch) = label_chip_size(label);
            let c = route.label_anchor;
            let _ = write!(
                svg,
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{cw:.2}\" height=\"{ch:.2}\" rx=\"{:.2}\" fill=\"{}\" stroke=\"{color}\" stroke-width=\"1\"/>",
                c.x - cw / 2.0,
                c.y - ch / 2.0,
                ch / 2.0,
                to_hex(theme.label_background)
            );
            let _ = write!(
                svg,
                "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"{LABEL_FONT_SIZE}\" font-family=\"monospace\" text-anchor=\"middle\" dominant-baseline=\"central\" fill=\"{}\">{}</text>",
                c.x,
                c.y,
                to_hex(theme.label_foreground),
                escape_xml(&display_label(label))
            );
        }
    }
    svg.push_str("</g>");
}

fn write_cards(svg: &mut String, stage: &Stage, theme: &Theme) {
    svg.push_str("<g class=\"nodes\">");
    for spec in stage.nodes() {
        let Some(rect) = stage.node_box(&spec.id) else {
            continue;
        };
        let card = card_layout(spec, &MonoMeasure);
        let _ = write!(
            svg,
            "<g data-node=\"{}\"><rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{CARD_RADIUS}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.5\"/>",
            escape_xml(&spec.id),
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            to_hex(theme.card_fill),
            to_hex(theme.card_border)
        );

        let inner = rect.width - CARD_PADDING * 2.0;
        if let (Some(role), Some(top)) = (&spec.role_label, card.role_top) {
            let chip_color = to_hex(Theme::resolve(role.color.as_deref(), theme.accent));
            let chip_w = (role.text.chars().count() as f32 * 6.5 + 16.0).min(inner);
            let _ = write!(
                svg,
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{chip_w:.2}\" height=\"{ROLE_CHIP_HEIGHT}\" rx=\"{:.2}\" fill=\"{chip_color}\"/><text x=\"{:.2}\" y=\"{:.2}\" font-size=\"11\" dominant-baseline=\"central\" fill=\"#ffffff\">{}</text>",
                rect.x + CARD_PADDING,
                rect.y + top,
                ROLE_CHIP_HEIGHT / 2.0,
                rect.x + CARD_PADDING + 8.0,
                rect.y + top + ROLE_CHIP_HEIGHT / 2.0,
                escape_xml(&role.text)
            );
        }

        write_text_block(
            svg,
            &spec.label,
            rect.x + CARD_PADDING,
            rect.y + card.label_top,
            CARD_LABEL_SIZE,
            inner,
            &to_hex(theme.heading_color),
            "600",
        );
        if let (Some(detail), Some(top)) = (&spec.detail, card.detail_top) {
            write_text_block(
                svg,
                detail,
                rect.x + CARD_PADDING,
                rect.y + top,
                DETAIL_FONT_SIZE,
                inner,
                &to_hex(theme.foreground),
                "400",
            );
        }
        svg.push_str("</g>");
    }
    svg.push_str("</g>");
}

fn write_overlay(svg: &mut String, stage: &Stage, theme: &Theme, overlay: &SvgOverlay<'_>) {
    if let Some(title) = overlay.title {
        let _ = write!(
            svg,
            "<text x=\"40\" y=\"56\" font-size=\"30\" font-weight=\"700\" fill=\"{}\">{}</text>",
            to_hex(theme.heading_color),
            escape_xml(title)
        );
    }
    if let Some(caption) = overlay.caption {
        write_text_block(
            svg,
            caption,
            40.0,
            CANVAS_HEIGHT - 70.0,
            18.0,
            CANVAS_WIDTH - 80.0,
            &to_hex(theme.foreground),
            "400",
        );
    }
    for (node, text) in &overlay.badges {
        let Some(rect) = stage.node_box(node) else {
            continue;
        };
        let (bw, bh) = label_chip_size(text);
        let _ = write!(
            svg,
            "<g class=\"badge\"><rect x=\"{:.2}\" y=\"{:.2}\" width=\"{bw:.2}\" height=\"{bh:.2}\" rx=\"{:.2}\" fill=\"{}\"/><text x=\"{:.2}\" y=\"{:.2}\" font-size=\"{LABEL_FONT_SIZE}\" text-anchor=\"middle\" dominant-baseline=\"central\" fill=\"#ffffff\">{}</text></g>",
            rect.right() - bw / 2.0,
            rect.top() - bh / 2.0,
            bh / 2.0,
            to_hex(theme.success),
            rect.right(),
            rect.top(),
            escape_xml(&display_label(text))
        );
    }
}

/// Naive character-count word wrap, matching the layout pass's measure.
fn wrap_chars(text: &str, font_size: f32, width: f32) -> Vec<String> {
    let per_line = (width / (font_size * 0.55)).floor().max(1.0) as usize;
    let mut lines = Vec::new();
    for raw in text.lines() {
        let chars: Vec<char> = raw.chars().collect();
        if chars.is_empty() {
            lines.push(String::new());
            continue;
        }
        for chunk in chars.chunks(per_line) {
            lines.push(chunk.iter().collect());
        }
    }
    lines
}

#[allow(clippy::too_many_arguments)]
fn write_text_block(
    svg: &mut String,
    text: &str,
    x: f32,
    top: f32,
    font_size: f32,
    width: f32,
    color: &str,
    weight: &str,
) {
    let line_height = font_size * 1.3;
    for (i, line) in wrap_chars(text, font_size, width).iter().enumerate() {
        let baseline = top + line_height * i as f32 + font_size;
        let _ = write!(
            svg,
            "<text x=\"{x:.2}\" y=\"{baseline:.2}\" font-size=\"{font_size}\" font-weight=\"{weight}\" fill=\"{color}\">{}</text>",
            escape_xml(line)
        );
    }
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    use crate::stage::StageConfig;
    use crate::stage::types::{EdgeSpec, NodeSpec};

    fn stage_with(edges: Vec<EdgeSpec>) -> Stage {
        let mut stage = Stage::mount(Instant::now(), StageConfig::default());
        stage.set_scene(
            vec![
                NodeSpec::new("client", 80.0, 200.0, 200.0),
                NodeSpec::new("as", 520.0, 200.0, 200.0),
                NodeSpec::new("rs", 960.0, 200.0, 200.0),
            ],
            edges,
            &MonoMeasure,
        );
        stage
    }

    #[test]
    fn one_marker_per_drawn_edge() {
        let mut red = EdgeSpec::new("authz", "client", "as");
        red.color = Some("#ff0000".to_string());
        let svg = render_svg(
            &stage_with(vec![red, EdgeSpec::new("token", "as", "rs")]),
            &Theme::light(),
            &SvgOverlay::default(),
        );
        assert!(svg.contains("<marker id=\"arrow-authz\""));
        assert!(svg.contains("<marker id=\"arrow-token\""));
        assert!(svg.contains("marker-end=\"url(#arrow-authz)\""));
        assert!(svg.contains("fill=\"#ff0000\"/></marker>"));
    }

    #[test]
    fn hidden_edge_leaves_no_path_or_marker() {
        let mut hidden = EdgeSpec::new("secret", "client", "as");
        hidden.visible = false;
        let svg = render_svg(&stage_with(vec![hidden]), &Theme::light(), &SvgOverlay::default());
        assert!(!svg.contains("arrow-secret"));
        assert!(!svg.contains("data-edge=\"secret\""));
    }

    #[test]
    fn layers_are_ordered_grid_edges_nodes() {
        let svg = render_svg(
            &stage_with(vec![EdgeSpec::new("e", "client", "as")]),
            &Theme::dark(),
            &SvgOverlay::default(),
        );
        let grid = svg.find("class=\"grid\"").expect("grid layer");
        let edges = svg.find("class=\"edges\"").expect("edge layer");
        let nodes = svg.find("class=\"nodes\"").expect("node layer");
        assert!(grid < edges && edges < nodes);
    }

    #[test]
    fn dashed_and_pulsing_edges() {
        let mut dashed = EdgeSpec::new("d", "client", "as");
        dashed.dashed = true;
        let mut pulsing = EdgeSpec::new("p", "as", "rs");
        pulsing.pulse = true;
        let svg = render_svg(
            &stage_with(vec![dashed, pulsing]),
            &Theme::light(),
            &SvgOverlay::default(),
        );
        assert!(svg.contains("stroke-dasharray=\"8 5\""));
        assert!(svg.contains("attributeName=\"stroke-dashoffset\""));
    }

    #[test]
    fn labels_are_escaped() {
        let mut edge = EdgeSpec::new("e", "client", "as");
        edge.label = Some("code & <state>".to_string());
        let svg = render_svg(&stage_with(vec![edge]), &Theme::light(), &SvgOverlay::default());
        assert!(svg.contains("code &amp; &lt;state&gt;"));
    }

    #[test]
    fn badge_is_pinned_to_node() {
        let stage = stage_with(Vec::new());
        let overlay = SvgOverlay {
            badges: vec![("as", "valid")],
            ..SvgOverlay::default()
        };
        let svg = render_svg(&stage, &Theme::light(), &overlay);
        assert!(svg.contains("class=\"badge\""));

        let overlay = SvgOverlay {
            badges: vec![("missing", "valid")],
            ..SvgOverlay::default()
        };
        assert!(!render_svg(&stage, &Theme::light(), &overlay).contains("class=\"badge\""));
    }

    #[test]
    fn wrap_splits_by_width() {
        let lines = wrap_chars(&"a".repeat(25), 10.0, 55.0);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), 10);
    }
}
