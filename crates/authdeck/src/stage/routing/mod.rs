pub mod bypass;
pub mod direct;
pub mod types;

#[cfg(test)]
mod tests;

use crate::stage::geometry::{Axis, dominant_axis, is_orthogonal, path_crosses_box};
use crate::stage::types::{BoxMap, EdgeSpec, NodeBox};

use bypass::{find_obstructions, route_bypass};
use direct::route_direct;
use types::{ComputedRoute, RouteResult, RoutingConfig, RoutingOutput, SkipReason};

/// Route every visible edge against a registry snapshot.
///
/// Hidden edges are dropped before routing and never appear in the output.
/// Edges are routed independently in declaration order; there is no global
/// crossing minimisation, so the same input always yields the same output.
pub fn plan_routes(boxes: &BoxMap, edges: &[EdgeSpec], config: &RoutingConfig) -> RoutingOutput {
    let mut results = Vec::with_capacity(edges.len());

    for edge in edges.iter().filter(|e| e.visible) {
        let result = route_edge(boxes, edge, config);
        if let RouteResult::Skipped(reason) = &result {
            log::debug!("edge '{}' skipped this pass: {reason:?}", edge.id);
        }
        results.push((edge.clone(), result));
    }

    RoutingOutput { results }
}

/// Route a single edge.
pub fn route_edge(boxes: &BoxMap, edge: &EdgeSpec, config: &RoutingConfig) -> RouteResult {
    if edge.from == edge.to {
        return RouteResult::Skipped(SkipReason::SelfLoop);
    }
    let Some(from) = boxes.get(&edge.from) else {
        return RouteResult::Skipped(SkipReason::Unmeasured {
            node: edge.from.clone(),
        });
    };
    let Some(to) = boxes.get(&edge.to) else {
        return RouteResult::Skipped(SkipReason::Unmeasured {
            node: edge.to.clone(),
        });
    };

    let axis = dominant_axis(from, to);
    let obstructions = match axis {
        Axis::Horizontal => find_obstructions(boxes, edge, axis),
        Axis::Vertical if config.vertical_bypass => find_obstructions(boxes, edge, axis),
        Axis::Vertical => Vec::new(),
    };

    let route = if obstructions.is_empty() {
        route_direct(&edge.id, from, to)
    } else {
        let route = route_bypass(&edge.id, from, to, &obstructions, axis, config);
        log::trace!(
            "edge '{}' bypasses {} node(s) via {:?}",
            edge.id,
            obstructions.len(),
            route.kind
        );
        warn_on_crossing(&route, &obstructions);
        route
    };
    debug_assert!(is_orthogonal(&route.points), "edge '{}' has a diagonal segment", edge.id);

    RouteResult::Drawn(route)
}

/// Only cards that overlap an endpoint can still be crossed.
fn warn_on_crossing(route: &ComputedRoute, obstructions: &[(&str, NodeBox)]) {
    for (id, rect) in obstructions {
        if path_crosses_box(&route.points, rect) {
            log::debug!("edge '{}' bypass still crosses node '{id}'", route.edge_id);
        }
    }
}
