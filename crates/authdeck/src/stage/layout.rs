//! Retained layout pass: turns declared nodes into measured card elements.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use super::registry::{CardElement, NodeRegistry};
use super::types::NodeSpec;

pub const CARD_PADDING: f32 = 14.0;
pub const ROLE_CHIP_HEIGHT: f32 = 22.0;
pub const ROLE_CHIP_GAP: f32 = 8.0;
pub const LABEL_FONT_SIZE: f32 = 18.0;
pub const DETAIL_FONT_SIZE: f32 = 13.0;
pub const DETAIL_GAP: f32 = 4.0;
/// Cards never get narrower than this, whatever the hint says.
pub const MIN_CARD_WIDTH: f32 = 80.0;

/// Text measurement used by the layout pass.
pub trait TextMeasure {
    /// Height of `text` laid out at `font_size`, wrapped to `wrap_width`.
    fn text_height(&self, text: &str, font_size: f32, wrap_width: f32) -> f32;
}

/// Fixed-advance approximation, used for export and tests where no font
/// system is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonoMeasure;

impl MonoMeasure {
    const ADVANCE: f32 = 0.55;
    const LINE_HEIGHT: f32 = 1.3;
}

impl TextMeasure for MonoMeasure {
    fn text_height(&self, text: &str, font_size: f32, wrap_width: f32) -> f32 {
        let per_line = (wrap_width / (font_size * Self::ADVANCE)).floor().max(1.0) as usize;
        let lines: usize = text
            .lines()
            .map(|line| line.chars().count().div_ceil(per_line).max(1))
            .sum::<usize>()
            .max(1);
        lines as f32 * font_size * Self::LINE_HEIGHT
    }
}

/// Vertical placement of the pieces of a card, relative to its top edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardLayout {
    pub width: f32,
    pub height: f32,
    pub role_top: Option<f32>,
    pub label_top: f32,
    pub detail_top: Option<f32>,
}

/// Lay out one card.
pub fn card_layout(spec: &NodeSpec, measure: &dyn TextMeasure) -> CardLayout {
    let width = spec.w.max(MIN_CARD_WIDTH);
    let inner = width - CARD_PADDING * 2.0;
    let mut y = CARD_PADDING;

    let role_top = spec.role_label.as_ref().map(|_| {
        let top = y;
        y += ROLE_CHIP_HEIGHT + ROLE_CHIP_GAP;
        top
    });

    let label_top = y;
    y += measure.text_height(&spec.label, LABEL_FONT_SIZE, inner);

    let detail_top = spec.detail.as_deref().map(|detail| {
        y += DETAIL_GAP;
        let top = y;
        y += measure.text_height(detail, DETAIL_FONT_SIZE, inner);
        top
    });

    CardLayout {
        width,
        height: y + CARD_PADDING,
        role_top,
        label_top,
        detail_top,
    }
}

/// Mount, update and unmount card elements so the registry mirrors `nodes`.
///
/// Nodes missing from `nodes` are unmounted; the next registry refresh drops
/// them. Returns the number of elements whose geometry changed.
pub fn layout_pass(
    registry: &mut NodeRegistry,
    nodes: &[NodeSpec],
    measure: &dyn TextMeasure,
) -> usize {
    let declared: BTreeSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let stale: Vec<String> = registry
        .ids()
        .filter(|id| !declared.contains(id))
        .map(str::to_string)
        .collect();
    for id in stale {
        if let Some(handle) = registry.element(&id) {
            handle.borrow_mut().mounted = false;
        }
    }

    let mut changed = 0;
    for spec in nodes {
        let card = card_layout(spec, measure);
        let mut next = CardElement {
            offset_width: card.width,
            offset_height: card.height,
            mounted: true,
            ..CardElement::default()
        };
        next.set_position(spec.x, spec.y);

        match registry.element(&spec.id) {
            Some(handle) => {
                let mut el = handle.borrow_mut();
                if *el != next {
                    *el = next;
                    changed += 1;
                }
            }
            None => {
                registry.register_node(&spec.id, Rc::new(RefCell::new(next)));
                changed += 1;
            }
        }
    }
    changed
}
