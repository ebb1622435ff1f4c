use eframe::egui::{self, Color32, FontId, Pos2, Stroke};

use crate::stage::Stage;
use crate::stage::geometry::{point_at_distance, polyline_length};
use crate::stage::layout::{
    CARD_PADDING, DETAIL_FONT_SIZE, LABEL_FONT_SIZE as CARD_LABEL_SIZE, ROLE_CHIP_HEIGHT,
    TextMeasure, card_layout,
};
use crate::stage::registry::parse_px;
use crate::stage::types::{CANVAS_HEIGHT, CANVAS_WIDTH, Point};
use crate::theme::Theme;

use super::{
    ARROW_SIZE, CARD_RADIUS, EDGE_WIDTH, GRID_SPACING, LABEL_FONT_SIZE, display_label, edge_style,
    label_chip_size,
};

/// Measures card text with the live egui fonts, in logical canvas units.
pub struct EguiMeasure<'a> {
    painter: &'a egui::Painter,
}

impl<'a> EguiMeasure<'a> {
    pub fn new(painter: &'a egui::Painter) -> Self {
        Self { painter }
    }
}

impl TextMeasure for EguiMeasure<'_> {
    fn text_height(&self, text: &str, font_size: f32, wrap_width: f32) -> f32 {
        self.painter
            .layout(
                text.to_string(),
                FontId::proportional(font_size),
                Color32::WHITE,
                wrap_width,
            )
            .size()
            .y
    }
}

/// The letterboxed 1280×720 canvas inside the window.
#[derive(Debug, Clone, Copy)]
pub struct StageCanvas {
    pub rect: egui::Rect,
    pub scale: f32,
}

impl StageCanvas {
    /// Fit the logical canvas into `available`, centred, aspect preserved.
    pub fn fit(available: egui::Rect) -> Self {
        let scale = (available.width() / CANVAS_WIDTH).min(available.height() / CANVAS_HEIGHT);
        let size = egui::vec2(CANVAS_WIDTH * scale, CANVAS_HEIGHT * scale);
        Self {
            rect: egui::Rect::from_center_size(available.center(), size),
            scale,
        }
    }

    pub fn to_screen(&self, p: Point) -> Pos2 {
        egui::pos2(
            self.rect.left() + p.x * self.scale,
            self.rect.top() + p.y * self.scale,
        )
    }
}

/// Draw the three stage layers: grid, edges, cards.
pub fn draw_stage(painter: &egui::Painter, canvas: &StageCanvas, stage: &Stage, theme: &Theme) {
    draw_grid(painter, canvas, theme);
    draw_edges(painter, canvas, stage, theme);
    draw_cards(painter, canvas, stage, theme);
}

fn draw_grid(painter: &egui::Painter, canvas: &StageCanvas, theme: &Theme) {
    let stroke = Stroke::new(1.0, theme.grid_line);
    let mut x = GRID_SPACING;
    while x < CANVAS_WIDTH {
        painter.line_segment(
            [
                canvas.to_screen(Point::new(x, 0.0)),
                canvas.to_screen(Point::new(x, CANVAS_HEIGHT)),
            ],
            stroke,
        );
        x += GRID_SPACING;
    }
    let mut y = GRID_SPACING;
    while y < CANVAS_HEIGHT {
        painter.line_segment(
            [
                canvas.to_screen(Point::new(0.0, y)),
                canvas.to_screen(Point::new(CANVAS_WIDTH, y)),
            ],
            stroke,
        );
        y += GRID_SPACING;
    }
}

fn draw_edges(painter: &egui::Painter, canvas: &StageCanvas, stage: &Stage, theme: &Theme) {
    let scale = canvas.scale;
    for (edge, route) in stage.routes().drawn() {
        if route.points.len() < 2 {
            continue;
        }
        let style = edge_style(edge, theme, stage.phase());
        let width = EDGE_WIDTH * scale;
        let arrow = ARROW_SIZE * scale;

        // Stop the line where the arrowhead begins.
        let total = polyline_length(&route.points);
        let tip = route.points[route.points.len() - 1];
        let base = point_at_distance(&route.points, (total - ARROW_SIZE).max(0.0));
        let mut line: Vec<Pos2> = route.points[..route.points.len() - 1]
            .iter()
            .map(|p| canvas.to_screen(*p))
            .collect();
        line.push(canvas.to_screen(base));
        line.dedup_by(|a, b| (*a - *b).length() < 0.5);

        match style.dash {
            Some((dash, gap)) => draw_dashed_polyline(
                painter,
                &line,
                Stroke::new(width, style.color),
                dash * scale,
                gap * scale,
                style.dash_offset * scale,
            ),
            None => {
                painter.add(egui::Shape::line(line, Stroke::new(width, style.color)));
            }
        }

        let tip = canvas.to_screen(tip);
        let dir = (tip - canvas.to_screen(base)).normalized();
        let perp = egui::vec2(-dir.y, dir.x);
        painter.add(egui::Shape::convex_polygon(
            vec![
                tip,
                tip - dir * arrow + perp * arrow * 0.4,
                tip - dir * arrow - perp * arrow * 0.4,
            ],
            style.color,
            Stroke::NONE,
        ));

        if let Some(label) = edge.label.as_deref().filter(|l| !l.is_empty()) {
            let (w, h) = label_chip_size(label);
            let chip = egui::Rect::from_center_size(
                canvas.to_screen(route.label_anchor),
                egui::vec2(w * scale, h * scale),
            );
            painter.rect_filled(chip, h * scale / 2.0, theme.label_background);
            painter.rect_stroke(
                chip,
                h * scale / 2.0,
                Stroke::new(1.0, style.color),
                egui::StrokeKind::Inside,
            );
            painter.text(
                chip.center(),
                egui::Align2::CENTER_CENTER,
                display_label(label),
                FontId::monospace(LABEL_FONT_SIZE * scale),
                theme.label_foreground,
            );
        }
    }
}

fn draw_cards(painter: &egui::Painter, canvas: &StageCanvas, stage: &Stage, theme: &Theme) {
    let scale = canvas.scale;
    let measure = EguiMeasure::new(painter);
    for spec in stage.nodes() {
        let Some(rect) = stage.node_box(&spec.id) else {
            continue;
        };
        let card = card_layout(spec, &measure);
        let min = canvas.to_screen(Point::new(rect.x, rect.y));
        let body = egui::Rect::from_min_size(
            min,
            egui::vec2(rect.width * scale, rect.height * scale),
        );
        let radius = CARD_RADIUS * scale;

        painter.rect_filled(
            body.translate(egui::vec2(0.0, 3.0 * scale)),
            radius,
            theme.card_shadow,
        );
        painter.rect_filled(body, radius, theme.card_fill);
        painter.rect_stroke(
            body,
            radius,
            Stroke::new(1.5 * scale, theme.card_border),
            egui::StrokeKind::Inside,
        );

        let inner = (rect.width - CARD_PADDING * 2.0) * scale;
        let left = body.left() + CARD_PADDING * scale;

        if let (Some(role), Some(top)) = (&spec.role_label, card.role_top) {
            let color = Theme::resolve(role.color.as_deref(), theme.accent);
            let galley = painter.layout_no_wrap(
                role.text.clone(),
                FontId::proportional(11.0 * scale),
                Color32::WHITE,
            );
            let chip_h = ROLE_CHIP_HEIGHT * scale;
            let chip = egui::Rect::from_min_size(
                egui::pos2(left, body.top() + top * scale),
                egui::vec2((galley.size().x + 16.0 * scale).min(inner), chip_h),
            );
            painter.rect_filled(chip, chip_h / 2.0, color);
            painter.galley(
                egui::pos2(chip.left() + 8.0 * scale, chip.center().y - galley.size().y / 2.0),
                galley,
                Color32::WHITE,
            );
        }

        let title = painter.layout(
            spec.label.clone(),
            FontId::proportional(CARD_LABEL_SIZE * scale),
            theme.heading_color,
            inner,
        );
        painter.galley(
            egui::pos2(left, body.top() + card.label_top * scale),
            title,
            theme.heading_color,
        );

        if let (Some(detail), Some(top)) = (&spec.detail, card.detail_top) {
            let galley = painter.layout(
                detail.clone(),
                FontId::proportional(DETAIL_FONT_SIZE * scale),
                theme.foreground,
                inner,
            );
            painter.galley(
                egui::pos2(left, body.top() + top * scale),
                galley,
                theme.foreground,
            );
        }
    }
}

/// Pin a small badge to the top-right corner of a node's live card.
/// Nothing is drawn while the card is unmounted.
pub fn draw_badge(
    painter: &egui::Painter,
    canvas: &StageCanvas,
    stage: &Stage,
    node_id: &str,
    text: &str,
    theme: &Theme,
) {
    let Some(handle) = stage.element(node_id) else {
        return;
    };
    let corner = {
        let element = handle.borrow();
        if !element.mounted {
            return;
        }
        Point::new(
            parse_px(&element.left) + element.offset_width,
            parse_px(&element.top),
        )
    };
    let scale = canvas.scale;
    let (w, h) = label_chip_size(text);
    let chip = egui::Rect::from_center_size(
        canvas.to_screen(corner),
        egui::vec2(w * scale, h * scale),
    );
    painter.rect_filled(chip, h * scale / 2.0, theme.success);
    painter.text(
        chip.center(),
        egui::Align2::CENTER_CENTER,
        display_label(text),
        FontId::proportional(LABEL_FONT_SIZE * scale),
        Color32::WHITE,
    );
}

/// Draw a polyline as dashes, with the pattern shifted `offset` along it.
fn draw_dashed_polyline(
    painter: &egui::Painter,
    points: &[Pos2],
    stroke: Stroke,
    dash: f32,
    gap: f32,
    offset: f32,
) {
    let period = dash + gap;
    if points.len() < 2 || period <= 0.0 {
        return;
    }
    let pts: Vec<Point> = points.iter().map(|p| Point::new(p.x, p.y)).collect();
    let total = polyline_length(&pts);
    let to_pos = |p: Point| egui::pos2(p.x, p.y);

    // Start one period early so a shifted pattern still covers the head.
    let mut d = offset.rem_euclid(period) - period;
    while d < total {
        let start = d.max(0.0);
        let end = (d + dash).min(total);
        if end > start {
            painter.line_segment(
                [
                    to_pos(point_at_distance(&pts, start)),
                    to_pos(point_at_distance(&pts, end)),
                ],
                stroke,
            );
        }
        d += period;
    }
}
