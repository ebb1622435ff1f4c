use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical canvas width. Every stage renders into this coordinate space.
pub const CANVAS_WIDTH: f32 = 1280.0;
/// Logical canvas height.
pub const CANVAS_HEIGHT: f32 = 720.0;

/// A point in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Measured geometry of a mounted node card.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NodeBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl NodeBox {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether `p` lies strictly inside the box (the boundary does not count).
    pub fn contains_interior(&self, p: Point) -> bool {
        p.x > self.left() && p.x < self.right() && p.y > self.top() && p.y < self.bottom()
    }
}

/// Registry snapshot: node id to measured box. Ordered so that every pass
/// over it is deterministic.
pub type BoxMap = BTreeMap<String, NodeBox>;

/// Small coloured chip shown above a card's title (e.g. "Authorization Server").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleLabel {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A node as declared by the slide for one step.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    pub id: String,
    pub label: String,
    pub detail: Option<String>,
    /// Logical top-left position. Advisory: routing reads the measured box.
    pub x: f32,
    pub y: f32,
    /// Card width hint.
    pub w: f32,
    pub role_label: Option<RoleLabel>,
}

impl NodeSpec {
    pub fn new(id: &str, x: f32, y: f32, w: f32) -> Self {
        Self {
            id: id.to_string(),
            label: id.to_string(),
            detail: None,
            x,
            y,
            w,
            role_label: None,
        }
    }
}

/// A directed connector as declared by the slide for one step.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSpec {
    pub id: String,
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    pub dashed: bool,
    pub pulse: bool,
    pub visible: bool,
    pub color: Option<String>,
}

impl EdgeSpec {
    pub fn new(id: &str, from: &str, to: &str) -> Self {
        Self {
            id: id.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            label: None,
            dashed: false,
            pulse: false,
            visible: true,
            color: None,
        }
    }
}
