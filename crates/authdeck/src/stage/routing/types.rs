use std::fmt::Write as _;

use crate::stage::geometry::Axis;
use crate::stage::types::{EdgeSpec, Point};

/// Which side of the obstruction a bypass takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BypassSide {
    Above,
    Below,
    Left,
    Right,
}

/// How a route was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Elbow through the midpoint of the dominant axis (or a straight run).
    Direct(Axis),
    /// Detour around nodes sitting between the endpoints.
    Bypass { side: BypassSide, obstructions: usize },
}

/// A drawable path for one edge.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedRoute {
    pub edge_id: String,
    /// Ordered orthogonal polyline from the source anchor to the target anchor.
    pub points: Vec<Point>,
    pub label_anchor: Point,
    pub kind: RouteKind,
}

impl ComputedRoute {
    /// SVG path commands for the polyline, e.g. `M 100.00 30.00 L 300.00 30.00`.
    pub fn path_data(&self) -> String {
        let mut d = String::new();
        for (i, p) in self.points.iter().enumerate() {
            let cmd = if i == 0 { "M" } else { " L" };
            let _ = write!(d, "{cmd} {:.2} {:.2}", p.x, p.y);
        }
        d
    }

    pub fn start(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn end(&self) -> Option<Point> {
        self.points.last().copied()
    }
}

/// Why an edge produced nothing this pass. None of these are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// An endpoint has no measured box yet.
    Unmeasured { node: String },
    SelfLoop,
}

/// Result for routing a single edge.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteResult {
    Drawn(ComputedRoute),
    Skipped(SkipReason),
}

/// Output of routing every visible edge in a diagram.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutingOutput {
    pub results: Vec<(EdgeSpec, RouteResult)>,
}

impl RoutingOutput {
    /// Drawable routes in declaration order.
    pub fn drawn(&self) -> impl Iterator<Item = (&EdgeSpec, &ComputedRoute)> {
        self.results.iter().filter_map(|(edge, result)| match result {
            RouteResult::Drawn(route) => Some((edge, route)),
            RouteResult::Skipped(_) => None,
        })
    }

    pub fn route(&self, edge_id: &str) -> Option<&ComputedRoute> {
        self.drawn()
            .find(|(edge, _)| edge.id == edge_id)
            .map(|(_, route)| route)
    }
}

/// Configuration for the route planner.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingConfig {
    /// Clearance between a bypass line and the nearest involved node.
    pub bypass_padding: f32,
    /// Offset of a bypass label from its bypass line.
    pub label_lift: f32,
    /// Also detour vertical-dominant edges around nodes between them.
    pub vertical_bypass: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            bypass_padding: 30.0,
            label_lift: 12.0,
            vertical_bypass: true,
        }
    }
}
