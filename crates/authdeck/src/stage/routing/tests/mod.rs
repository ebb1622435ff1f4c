mod determinism;
mod direct;

use super::types::{ComputedRoute, RouteResult, RoutingConfig, RoutingOutput};
use super::plan_routes;
use crate::stage::types::{BoxMap, EdgeSpec, NodeBox, Point};

/// Card height used by every helper box.
const H: f32 = 60.0;

/// Helper to create a measured node box of width 100.
fn node(id: &str, x: f32, y: f32) -> (String, NodeBox) {
    (id.to_string(), NodeBox::new(x, y, 100.0, H))
}

/// Helper to build a registry snapshot.
fn boxes(nodes: Vec<(String, NodeBox)>) -> BoxMap {
    nodes.into_iter().collect()
}

/// Helper to create an edge with id `from-to`.
fn edge(from: &str, to: &str) -> EdgeSpec {
    EdgeSpec::new(&format!("{from}-{to}"), from, to)
}

fn config() -> RoutingConfig {
    RoutingConfig::default()
}

/// Assert that every result in the output was drawn.
fn assert_all_drawn(output: &RoutingOutput) {
    for (edge, result) in &output.results {
        if let RouteResult::Skipped(reason) = result {
            panic!("Edge {} -> {} skipped: {:?}", edge.from, edge.to, reason);
        }
    }
}

/// Get the route for an edge id, panicking if it was not drawn.
fn get_route<'a>(output: &'a RoutingOutput, edge_id: &str) -> &'a ComputedRoute {
    output
        .route(edge_id)
        .unwrap_or_else(|| panic!("Edge {edge_id} has no drawn route"))
}

fn pt(x: f32, y: f32) -> Point {
    Point::new(x, y)
}

fn route(nodes: Vec<(String, NodeBox)>, edges: &[EdgeSpec]) -> RoutingOutput {
    plan_routes(&boxes(nodes), edges, &config())
}
