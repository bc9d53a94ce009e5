use std::sync::Arc;

use chrono::Utc;
use wayfind_core::prelude::*;

const MAP: MapId = MapId::from_u128(0xF100);
const OTHER_MAP: MapId = MapId::from_u128(0xF200);

fn id(n: u128) -> NodeId {
    NodeId::from_u128(n)
}

fn node(n: u128, name: &str, x: f64) -> Node {
    Node::new(id(n), MAP, x, 0.0).with_name(name)
}

fn edge(from: u128, to: u128, distance: f64) -> Edge {
    Edge::new(EdgeId::from_u128(from * 1000 + to), MAP, id(from), id(to), distance)
}

fn assembler(plans: Vec<FloorPlan>) -> RouteAssembler<InMemoryGraphStore> {
    let store = InMemoryGraphStore::new();
    for plan in plans {
        store.insert_floor_plan(plan).unwrap();
    }
    RouteAssembler::new(Arc::new(store), RoutingConfig::default()).unwrap()
}

/// Oriented edges of the path the search settles on
fn edges_used(
    assembler: &RouteAssembler<InMemoryGraphStore>,
    from: NodeId,
    to: NodeId,
    route_type: RouteType,
) -> Vec<Edge> {
    let graph = RouteGraph::load(assembler.store(), MAP).unwrap();
    find_path(&graph, from, to, route_type, &CancellationToken::new())
        .unwrap()
        .edges
}

fn assert_admissible(edges: &[Edge], route_type: RouteType) {
    for edge in edges {
        assert!(!edge.restricted, "{route_type} used restricted edge {}", edge.id);
        match route_type {
            RouteType::Shortest => {}
            RouteType::AccessiblePath => {
                assert!(edge.accessible, "{route_type} used inaccessible edge {}", edge.id);
            }
            RouteType::EmergencyEvacuation => {
                assert!(edge.emergency_route, "{route_type} used non-emergency edge {}", edge.id);
            }
        }
    }
}

/// A - B - C - D in a line; B-C is an inaccessible stair flight
fn line_plan() -> FloorPlan {
    let mut c = node(3, "C", 15.0);
    c.stairs = true;
    let mut bc = edge(2, 3, 5.0);
    bc.accessible = false;
    bc.kind = EdgeKind::Stairs;

    FloorPlan {
        map: IndoorMap::new(MAP, "shelter", 0),
        nodes: vec![node(1, "A", 0.0), node(2, "B", 10.0), c, node(4, "D", 25.0)],
        edges: vec![edge(1, 2, 10.0), bc, edge(3, 4, 10.0)],
    }
}

#[test]
fn shortest_route_along_line() {
    let assembler = assembler(vec![line_plan()]);
    let route = assembler
        .compute_route(MAP, id(1), id(4), RouteType::Shortest, "dispatcher")
        .unwrap();

    assert_eq!(route.path, vec![id(1), id(2), id(3), id(4)]);
    assert!((route.total_distance - 25.0).abs() < 1e-9);
    assert_eq!(route.estimated_time, 18);
    assert_eq!(route.difficulty, DifficultyLevel::Difficult);
    assert_eq!(route.name, "A to D");
    assert!(!route.emergency);
    assert!(!route.restricted);
    assert_eq!(route.created_by, "dispatcher");
    assert_eq!(route.instructions.len(), route.path.len());
    assert_eq!(route.waypoints.len(), route.path.len());
    assert_eq!(route.instructions[2].action, StepAction::GoUpStairs);

    let stored = assembler.store().get_route(route.id).unwrap();
    assert_eq!(stored, route);
}

#[test]
fn accessible_route_not_found_without_detour() {
    let assembler = assembler(vec![line_plan()]);
    let err = assembler
        .compute_route(MAP, id(1), id(4), RouteType::AccessiblePath, "dispatcher")
        .unwrap_err();
    assert!(matches!(
        err,
        Error::RouteNotFound {
            route_type: RouteType::AccessiblePath,
            ..
        }
    ));
    assert_eq!(assembler.store().route_count(), 0);
}

#[test]
fn accessible_route_takes_detour() {
    let mut plan = line_plan();
    plan.nodes.push(node(5, "Ramp", 12.0));
    plan.edges.push(edge(2, 5, 4.0));
    plan.edges.push(edge(5, 3, 4.0));
    let assembler = assembler(vec![plan.clone()]);

    let route = assembler
        .compute_route(MAP, id(1), id(4), RouteType::AccessiblePath, "dispatcher")
        .unwrap();
    assert_eq!(route.path, vec![id(1), id(2), id(5), id(3), id(4)]);
    assert!((route.total_distance - 28.0).abs() < 1e-9);

    for pair in route.path.windows(2) {
        let used = plan
            .edges
            .iter()
            .filter(|edge| edge.connects(pair[0], pair[1]))
            .all(|edge| edge.accessible);
        assert!(used);
    }
}

#[test]
fn evacuation_uses_only_emergency_edges() {
    let mut plan = line_plan();
    for edge in &mut plan.edges {
        edge.emergency_route = true;
    }
    // Shortcut A-D that is not an emergency route
    plan.edges.push(edge(1, 4, 1.0));
    let assembler = assembler(vec![plan]);

    let shortest = assembler
        .compute_route(MAP, id(1), id(4), RouteType::Shortest, "x")
        .unwrap();
    assert_eq!(shortest.path, vec![id(1), id(4)]);

    let evacuation = assembler
        .compute_route(MAP, id(1), id(4), RouteType::EmergencyEvacuation, "x")
        .unwrap();
    assert_eq!(evacuation.path.len(), 4);
    assert!(evacuation.emergency);

    let used = edges_used(&assembler, id(1), id(4), RouteType::EmergencyEvacuation);
    assert_eq!(used.len(), 3);
    assert_admissible(&used, RouteType::EmergencyEvacuation);
}

#[test]
fn restricted_edges_are_avoided() {
    let mut plan = line_plan();
    plan.edges[0].restricted = true;
    plan.edges[0].restriction_reason = Some("structural damage".into());
    let assembler = assembler(vec![plan]);

    assert!(matches!(
        assembler.compute_route(MAP, id(1), id(4), RouteType::Shortest, "x"),
        Err(Error::RouteNotFound { .. })
    ));
}

#[test]
fn identity_route() {
    let assembler = assembler(vec![line_plan()]);
    let route = assembler
        .compute_route(MAP, id(2), id(2), RouteType::AccessiblePath, "x")
        .unwrap();

    assert_eq!(route.path, vec![id(2)]);
    assert_eq!(route.total_distance, 0.0);
    assert_eq!(route.estimated_time, 0);
    assert_eq!(route.difficulty, DifficultyLevel::Easy);
    assert_eq!(route.instructions.len(), 1);
    assert_eq!(route.instructions[0].action, StepAction::Start);
}

#[test]
fn disconnected_components() {
    let mut plan = line_plan();
    plan.nodes.push(node(7, "Annex", 100.0));
    plan.nodes.push(node(8, "Annex store", 110.0));
    plan.edges.push(edge(7, 8, 10.0));
    let assembler = assembler(vec![plan]);

    assert!(matches!(
        assembler.compute_route(MAP, id(1), id(8), RouteType::Shortest, "x"),
        Err(Error::RouteNotFound { .. })
    ));
}

#[test]
fn cross_map_request_is_invalid() {
    let mut other = FloorPlan {
        map: IndoorMap::new(OTHER_MAP, "shelter", 1),
        nodes: vec![Node::new(id(50), OTHER_MAP, 0.0, 0.0)],
        edges: vec![],
    };
    other.map.floor_name = Some("First".into());
    let assembler = assembler(vec![line_plan(), other]);

    assert!(matches!(
        assembler.compute_route(MAP, id(1), id(50), RouteType::Shortest, "x"),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        assembler.compute_route(OTHER_MAP, id(1), id(2), RouteType::Shortest, "x"),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn missing_map_and_node_are_not_found() {
    let assembler = assembler(vec![line_plan()]);
    assert!(matches!(
        assembler.compute_route(OTHER_MAP, id(1), id(2), RouteType::Shortest, "x"),
        Err(Error::NotFound { .. })
    ));
    assert!(matches!(
        assembler.compute_route(MAP, id(1), id(99), RouteType::Shortest, "x"),
        Err(Error::NotFound { .. })
    ));
}

#[test]
fn inactive_map_is_rejected() {
    let mut plan = line_plan();
    plan.map.active = false;
    let assembler = assembler(vec![plan]);
    assert!(matches!(
        assembler.compute_route(MAP, id(1), id(4), RouteType::Shortest, "x"),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn repeated_requests_are_deterministic() {
    let assembler = assembler(vec![grid_plan(4, 4)]);
    let first = assembler
        .compute_route(MAP, id(0), id(15), RouteType::Shortest, "x")
        .unwrap();
    let second = assembler
        .compute_route(MAP, id(0), id(15), RouteType::Shortest, "x")
        .unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(first.path, second.path);
    assert!((first.total_distance - second.total_distance).abs() < 1e-9);
    assert_eq!(assembler.store().route_count(), 2);
}

#[test]
fn zero_timeout_cancels_search() {
    let store = InMemoryGraphStore::new();
    store.insert_floor_plan(line_plan()).unwrap();
    let config = RoutingConfig {
        search_timeout_ms: Some(0),
        ..RoutingConfig::default()
    };
    let assembler = RouteAssembler::new(Arc::new(store), config).unwrap();

    assert!(matches!(
        assembler.compute_route(MAP, id(1), id(4), RouteType::Shortest, "x"),
        Err(Error::Cancelled)
    ));
}

#[test]
fn evacuation_to_nearest_exit() {
    let mut plan = line_plan();
    for edge in &mut plan.edges {
        edge.emergency_route = true;
    }
    plan.nodes[0].emergency_exit = true;
    plan.nodes[3].emergency_exit = true;
    let assembler = assembler(vec![plan]);

    let route = assembler.compute_evacuation_route(MAP, id(3), "warden").unwrap();
    assert_eq!(route.path, vec![id(3), id(4)]);
    assert_eq!(route.route_type, RouteType::EmergencyEvacuation);
    assert!(route.emergency);

    let at_exit = assembler.compute_evacuation_route(MAP, id(1), "warden").unwrap();
    assert_eq!(at_exit.path, vec![id(1)]);
}

#[test]
fn evacuation_without_exits_or_routes() {
    let assembler = assembler(vec![line_plan()]);
    assert!(matches!(
        assembler.compute_evacuation_route(MAP, id(2), "warden"),
        Err(Error::InvalidArgument(_))
    ));

    let mut plan = line_plan();
    plan.nodes[3].emergency_exit = true;
    let assembler = self::assembler(vec![plan]);
    assert!(matches!(
        assembler.compute_evacuation_route(MAP, id(2), "warden"),
        Err(Error::RouteNotFound { to: None, .. })
    ));
}

#[test]
fn route_from_latest_position() {
    let mut plan = line_plan();
    plan.nodes[1].longitude = 30.0;
    plan.nodes[1].latitude = 60.0;
    let assembler = assembler(vec![plan]);

    let position = Position {
        entity_type: EntityType::Person,
        entity_id: "medic-7".into(),
        map_id: MAP,
        longitude: 30.00001,
        latitude: 60.0,
        floor_level: 0,
        heading: Some(90.0),
        speed: None,
        accuracy: Some(2.0),
        technology: PositioningTechnology::Uwb,
        recorded_at: Utc::now(),
    };
    assembler.store().record_position(position).unwrap();

    let route = assembler
        .compute_route_from_position(
            MAP,
            EntityType::Person,
            "medic-7",
            id(1),
            RouteType::Shortest,
            "medic-7",
        )
        .unwrap();
    assert_eq!(route.path, vec![id(2), id(1)]);

    assert!(matches!(
        assembler.compute_route_from_position(
            MAP,
            EntityType::Asset,
            "medic-7",
            id(1),
            RouteType::Shortest,
            "x",
        ),
        Err(Error::NotFound { .. })
    ));
}

#[test]
fn batch_results_keep_request_order() {
    let assembler = assembler(vec![line_plan()]);
    let request = |to, route_type| RouteRequest {
        map_id: MAP,
        from_node_id: id(1),
        to_node_id: id(to),
        route_type,
        requested_by: "batch".into(),
    };
    let results = assembler.compute_routes(&[
        request(4, RouteType::Shortest),
        request(4, RouteType::AccessiblePath),
        request(2, RouteType::AccessiblePath),
    ]);

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(Error::RouteNotFound { .. })));
    assert_eq!(results[2].as_ref().unwrap().path, vec![id(1), id(2)]);
}

/// Grid of `w × h` nodes with ids `row * w + col`, unit spacing
fn grid_plan(w: u128, h: u128) -> FloorPlan {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    for row in 0..h {
        for col in 0..w {
            let n = row * w + col;
            nodes.push(Node::new(id(n), MAP, col as f64, row as f64));
            if col + 1 < w {
                edges.push(edge(n, n + 1, 1.0));
            }
            if row + 1 < h {
                edges.push(edge(n, n + w, 1.0));
            }
        }
    }
    FloorPlan {
        map: IndoorMap::new(MAP, "grid", 0),
        nodes,
        edges,
    }
}

/// Linear congruential generator; keeps the graphs reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }
}

fn random_plan(seed: u64, node_count: u128) -> FloorPlan {
    let mut rng = Lcg(seed);
    let nodes = (0..node_count)
        .map(|n| Node::new(id(n), MAP, n as f64, 0.0))
        .collect();
    let mut edges = Vec::new();
    for from in 0..node_count {
        for to in 0..node_count {
            if from == to || rng.next() % 4 != 0 {
                continue;
            }
            let mut e = edge(from, to, (rng.next() % 20 + 1) as f64);
            e.bidirectional = rng.next() % 2 == 0;
            e.accessible = rng.next() % 3 != 0;
            e.emergency_route = rng.next() % 2 == 0;
            edges.push(e);
        }
    }
    FloorPlan {
        map: IndoorMap::new(MAP, "random", 0),
        nodes,
        edges,
    }
}

/// Exhaustive search over simple paths
fn brute_force(plan: &FloorPlan, from: NodeId, to: NodeId, route_type: RouteType) -> Option<f64> {
    fn walk(
        plan: &FloorPlan,
        at: NodeId,
        to: NodeId,
        route_type: RouteType,
        visited: &mut Vec<NodeId>,
        cost: f64,
        best: &mut Option<f64>,
    ) {
        if at == to {
            *best = Some(best.map_or(cost, |b| b.min(cost)));
            return;
        }
        for edge in &plan.edges {
            if !route_type.admits(edge) {
                continue;
            }
            let next = if edge.from_node == at {
                edge.to_node
            } else if edge.bidirectional && edge.to_node == at {
                edge.from_node
            } else {
                continue;
            };
            if visited.contains(&next) {
                continue;
            }
            visited.push(next);
            walk(plan, next, to, route_type, visited, cost + edge.cost(), best);
            visited.pop();
        }
    }

    let mut best = None;
    walk(plan, from, to, route_type, &mut vec![from], 0.0, &mut best);
    best
}

#[test]
fn matches_brute_force_on_small_graphs() {
    for seed in 1..=12 {
        let plan = random_plan(seed, 7);
        let assembler = assembler(vec![plan.clone()]);

        for (from, to) in [(0, 6), (6, 0), (2, 5), (3, 1)] {
            for route_type in [
                RouteType::Shortest,
                RouteType::AccessiblePath,
                RouteType::EmergencyEvacuation,
            ] {
                let expected = brute_force(&plan, id(from), id(to), route_type);
                let actual = assembler.compute_route(MAP, id(from), id(to), route_type, "x");
                match (expected, actual) {
                    (Some(cost), Ok(route)) => {
                        assert!(
                            (route.total_distance - cost).abs() < 1e-9,
                            "seed {seed}: {from}->{to} {route_type}: {} != {cost}",
                            route.total_distance
                        );
                        assert_eq!(route.instructions.len(), route.path.len());

                        let used = edges_used(&assembler, id(from), id(to), route_type);
                        assert_eq!(used.len() + 1, route.path.len());
                        assert_admissible(&used, route_type);
                    }
                    (None, Err(Error::RouteNotFound { .. })) => {}
                    (expected, actual) => panic!(
                        "seed {seed}: {from}->{to} {route_type}: expected {expected:?}, got {actual:?}"
                    ),
                }
            }
        }
    }
}
