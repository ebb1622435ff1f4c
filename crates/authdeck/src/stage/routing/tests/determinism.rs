use super::*;

/// Route the same scene repeatedly and assert identical output.
fn assert_deterministic(nodes: Vec<(String, NodeBox)>, edges: &[EdgeSpec], iterations: usize) {
    let map = boxes(nodes);
    let reference = plan_routes(&map, edges, &config());
    let ref_paths: Vec<String> = reference.drawn().map(|(_, r)| r.path_data()).collect();

    for i in 1..iterations {
        let output = plan_routes(&map, edges, &config());
        assert_eq!(reference, output, "Non-deterministic result on iteration {i}");
        let paths: Vec<String> = output.drawn().map(|(_, r)| r.path_data()).collect();
        assert_eq!(ref_paths, paths);
    }
}

#[test]
fn direct_routes_deterministic() {
    let nodes = vec![node("a", 0.0, 0.0), node("b", 300.0, 120.0)];
    assert_deterministic(nodes, &[edge("a", "b"), edge("b", "a")], 50);
}

#[test]
fn bypass_routes_deterministic() {
    let nodes = vec![
        node("client", 60.0, 300.0),
        node("idp", 460.0, 200.0),
        node("as", 860.0, 300.0),
        node("rs", 860.0, 560.0),
    ];
    let edges = vec![
        edge("client", "as"),
        edge("as", "client"),
        edge("client", "idp"),
        edge("as", "rs"),
    ];
    assert_deterministic(nodes, &edges, 50);
}

#[test]
fn declaration_order_is_preserved() {
    let nodes = vec![node("a", 0.0, 0.0), node("b", 300.0, 0.0), node("c", 600.0, 0.0)];
    let edges = vec![edge("b", "c"), edge("a", "b"), edge("c", "a")];
    let output = route(nodes, &edges);
    let ids: Vec<&str> = output.results.iter().map(|(e, _)| e.id.as_str()).collect();
    assert_eq!(ids, vec!["b-c", "a-b", "c-a"]);
}
