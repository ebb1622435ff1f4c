use super::*;
use crate::stage::geometry::{bend_count, is_orthogonal};
use crate::stage::routing::types::RouteKind;
use crate::stage::geometry::Axis;

#[test]
fn aligned_nodes_give_straight_segment() {
    // a(0,0) -> b(300,0): east anchor to west anchor, same row.
    let output = route(vec![node("a", 0.0, 0.0), node("b", 300.0, 0.0)], &[edge("a", "b")]);
    assert_all_drawn(&output);
    let r = get_route(&output, "a-b");
    assert_eq!(r.points, vec![pt(100.0, 30.0), pt(300.0, 30.0)]);
    assert_eq!(r.path_data(), "M 100.00 30.00 L 300.00 30.00");
    assert_eq!(r.label_anchor, pt(200.0, 30.0));
    assert_eq!(r.kind, RouteKind::Direct(Axis::Horizontal));
}

#[test]
fn right_to_left_uses_west_then_east() {
    let output = route(vec![node("a", 0.0, 0.0), node("b", 300.0, 0.0)], &[edge("b", "a")]);
    let r = get_route(&output, "b-a");
    assert_eq!(r.points, vec![pt(300.0, 30.0), pt(100.0, 30.0)]);
}

#[test]
fn offset_rows_jog_at_midpoint_x() {
    let output = route(vec![node("a", 0.0, 0.0), node("b", 300.0, 100.0)], &[edge("a", "b")]);
    let r = get_route(&output, "a-b");
    assert_eq!(
        r.points,
        vec![pt(100.0, 30.0), pt(200.0, 30.0), pt(200.0, 130.0), pt(300.0, 130.0)]
    );
    assert!(is_orthogonal(&r.points));
    assert_eq!(bend_count(&r.points), 2);
    assert_eq!(r.label_anchor, pt(200.0, 80.0));
}

#[test]
fn vertical_edge_jogs_at_midpoint_y() {
    let output = route(vec![node("a", 0.0, 0.0), node("b", 80.0, 300.0)], &[edge("a", "b")]);
    let r = get_route(&output, "a-b");
    assert_eq!(r.kind, RouteKind::Direct(Axis::Vertical));
    assert_eq!(
        r.points,
        vec![pt(50.0, 60.0), pt(50.0, 180.0), pt(130.0, 180.0), pt(130.0, 300.0)]
    );
}

#[test]
fn stacked_nodes_give_straight_vertical_segment() {
    let output = route(vec![node("a", 0.0, 0.0), node("b", 0.0, 200.0)], &[edge("a", "b")]);
    let r = get_route(&output, "a-b");
    assert_eq!(r.points, vec![pt(50.0, 60.0), pt(50.0, 200.0)]);
}

#[test]
fn endpoints_match_anchors_exactly() {
    let nodes = vec![node("a", 40.0, 80.0), node("b", 520.0, 10.0)];
    let output = route(nodes, &[edge("a", "b")]);
    let r = get_route(&output, "a-b");
    assert_eq!(r.start(), Some(pt(140.0, 110.0)));
    assert_eq!(r.end(), Some(pt(520.0, 40.0)));
}

#[test]
fn unrelated_node_off_axis_does_not_obstruct() {
    // c sits below the row but outside the x-range of a and b.
    let nodes = vec![node("a", 0.0, 0.0), node("b", 300.0, 0.0), node("c", 700.0, 0.0)];
    let output = route(nodes, &[edge("a", "b")]);
    let r = get_route(&output, "a-b");
    assert!(matches!(r.kind, RouteKind::Direct(_)));
}
