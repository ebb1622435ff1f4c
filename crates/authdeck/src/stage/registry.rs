use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;

use super::types::{BoxMap, NodeBox};

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?)").expect("valid regex")
});

/// The retained card element a node renders into.
///
/// Position lives in inline-style strings (`"120px"`) written by the layout
/// pass; size is the measured outer size of the card.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardElement {
    pub left: String,
    pub top: String,
    pub offset_width: f32,
    pub offset_height: f32,
    pub mounted: bool,
}

impl CardElement {
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.left = format!("{x}px");
        self.top = format!("{y}px");
    }
}

/// Shared handle to a live card element.
pub type ElementHandle = Rc<RefCell<CardElement>>;

/// Parse a CSS-like length, keeping only the leading number.
/// Anything unparseable reads as 0.
pub fn parse_px(value: &str) -> f32 {
    LEADING_NUMBER
        .captures(value)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f32>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Maps node ids to live elements and caches their measured boxes.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    elements: BTreeMap<String, ElementHandle>,
    boxes: BoxMap,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `id` to a live element. A second registration under the same id
    /// replaces the first.
    pub fn register_node(&mut self, id: &str, handle: ElementHandle) {
        if self.elements.insert(id.to_string(), handle).is_some() {
            log::trace!("node '{id}' re-registered, last registration wins");
        }
    }

    /// Re-read every registered element and rebuild the box cache.
    ///
    /// Unmounted elements are released and their entries become absent, as
    /// do elements measured at a negative position.
    pub fn refresh(&mut self) {
        self.elements.retain(|id, handle| {
            let mounted = handle.borrow().mounted;
            if !mounted {
                log::trace!("node '{id}' unmounted, releasing");
            }
            mounted
        });

        self.boxes.clear();
        for (id, handle) in &self.elements {
            let el = handle.borrow();
            let x = parse_px(&el.left);
            let y = parse_px(&el.top);
            if x < 0.0 || y < 0.0 {
                continue;
            }
            self.boxes.insert(
                id.clone(),
                NodeBox::new(x, y, el.offset_width, el.offset_height),
            );
        }
    }

    /// Measured box for `id`, if present and valid.
    pub fn get(&self, id: &str) -> Option<NodeBox> {
        self.boxes.get(id).copied()
    }

    /// Live element bound to `id`.
    pub fn element(&self, id: &str) -> Option<ElementHandle> {
        self.elements.get(id).cloned()
    }

    pub fn snapshot(&self) -> &BoxMap {
        &self.boxes
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }

    /// Unmount and release every element.
    pub fn clear(&mut self) {
        for handle in self.elements.values() {
            handle.borrow_mut().mounted = false;
        }
        self.elements.clear();
        self.boxes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mounted(left: &str, top: &str, w: f32, h: f32) -> ElementHandle {
        Rc::new(RefCell::new(CardElement {
            left: left.to_string(),
            top: top.to_string(),
            offset_width: w,
            offset_height: h,
            mounted: true,
        }))
    }

    #[test]
    fn parse_px_strips_units() {
        assert_eq!(parse_px("120px"), 120.0);
        assert_eq!(parse_px(" 42.5px "), 42.5);
        assert_eq!(parse_px("-8px"), -8.0);
        assert_eq!(parse_px("300"), 300.0);
        assert_eq!(parse_px(".5em"), 0.5);
    }

    #[test]
    fn parse_px_malformed_reads_zero() {
        assert_eq!(parse_px(""), 0.0);
        assert_eq!(parse_px("auto"), 0.0);
        assert_eq!(parse_px("px12"), 0.0);
    }

    #[test]
    fn refresh_measures_registered_elements() {
        let mut registry = NodeRegistry::new();
        registry.register_node("a", mounted("10px", "20px", 100.0, 50.0));
        assert!(registry.get("a").is_none(), "absent until refreshed");

        registry.refresh();
        assert_eq!(registry.get("a"), Some(NodeBox::new(10.0, 20.0, 100.0, 50.0)));
    }

    #[test]
    fn malformed_position_defaults_to_origin_but_stays_present() {
        let mut registry = NodeRegistry::new();
        registry.register_node("a", mounted("auto", "", 80.0, 40.0));
        registry.refresh();
        assert_eq!(registry.get("a"), Some(NodeBox::new(0.0, 0.0, 80.0, 40.0)));
    }

    #[test]
    fn negative_position_is_absent() {
        let mut registry = NodeRegistry::new();
        registry.register_node("a", mounted("-5px", "10px", 80.0, 40.0));
        registry.refresh();
        assert!(registry.get("a").is_none());
    }

    #[test]
    fn unmounted_element_leaves_no_stale_entry() {
        let mut registry = NodeRegistry::new();
        let handle = mounted("10px", "10px", 80.0, 40.0);
        registry.register_node("a", handle.clone());
        registry.refresh();
        assert!(registry.get("a").is_some());

        handle.borrow_mut().mounted = false;
        registry.refresh();
        assert!(registry.get("a").is_none());
        assert!(registry.element("a").is_none());
    }

    #[test]
    fn unknown_id_is_absent() {
        let registry = NodeRegistry::new();
        assert!(registry.get("nope").is_none());
        assert!(registry.element("nope").is_none());
    }

    #[test]
    fn duplicate_registration_last_wins() {
        let mut registry = NodeRegistry::new();
        registry.register_node("a", mounted("0px", "0px", 10.0, 10.0));
        registry.register_node("a", mounted("50px", "60px", 10.0, 10.0));
        registry.refresh();
        assert_eq!(registry.get("a").map(|b| b.x), Some(50.0));
    }
}
