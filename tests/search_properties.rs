use bevy::math::Vec3;
use kestrel::nav::{
    create_search, AStar, Bfs, Dfs, Dijkstra, Edge, Euclidean, Graph, GraphSearch, HeuristicPolicy, Node,
    SearchKind, Zero,
};

/// Random connected-ish graph whose edge costs never undercut the straight
/// line distance, which keeps the euclidean heuristic admissible.
fn random_graph(seed: u64, node_count: usize, edge_count: usize, digraph: bool) -> Graph {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut graph = Graph::new(digraph);

    for index in 0..node_count {
        let position = Vec3::new(rng.f32() * 100.0, 0.0, rng.f32() * 100.0);
        graph.add_node(Node::new(index, position));
    }

    for _ in 0..edge_count {
        let from = rng.usize(0..node_count);
        let to = rng.usize(0..node_count);
        if from == to || graph.has_edge(from, to) {
            continue;
        }
        let distance = graph.node(from).unwrap().position.distance(graph.node(to).unwrap().position);
        graph.add_edge(Edge::new(from, to, distance * (1.0 + rng.f32())));
    }

    graph
}

fn path_cost(graph: &Graph, path: &[usize]) -> f32 {
    path.windows(2).map(|pair| graph.edge(pair[0], pair[1]).unwrap().cost).sum()
}

fn assert_valid_path(graph: &Graph, path: &[usize], source: usize, target: usize) {
    assert_eq!(path.first(), Some(&source));
    assert_eq!(path.last(), Some(&target));
    for pair in path.windows(2) {
        assert!(graph.has_edge(pair[0], pair[1]), "missing edge {} -> {}", pair[0], pair[1]);
    }
}

#[test]
fn test_zero_heuristic_astar_equals_dijkstra() {
    for seed in 0..20 {
        let graph = random_graph(seed, 40, 120, seed % 2 == 0);
        let (source, target) = (0, 39);

        let mut astar = AStar::with_heuristic(&graph, source, target, Zero);
        let mut dijkstra = Dijkstra::new(&graph, source, target);

        assert_eq!(astar.search(), dijkstra.search(), "seed {seed}");
        assert_eq!(astar.path(), dijkstra.path(), "seed {seed}");
        assert_eq!(astar.settled(), dijkstra.settled(), "seed {seed}");
        assert_eq!(astar.search_tree(), dijkstra.search_tree(), "seed {seed}");
    }
}

#[test]
fn test_admissible_astar_finds_optimal_cost() {
    for seed in 100..120 {
        let graph = random_graph(seed, 50, 200, false);
        let (source, target) = (3, 44);

        let mut astar = AStar::with_heuristic(&graph, source, target, Euclidean);
        let mut dijkstra = Dijkstra::new(&graph, source, target);
        let found = dijkstra.search();
        assert_eq!(astar.search(), found, "seed {seed}");
        if !found {
            continue;
        }

        let optimal = dijkstra.cost_to(target).unwrap();
        assert_valid_path(&graph, &astar.path(), source, target);
        let cost = path_cost(&graph, &astar.path());
        assert!((cost - optimal).abs() <= optimal * 1e-4 + 1e-4, "seed {seed}: {cost} vs {optimal}");
    }
}

#[test]
fn test_bfs_path_has_fewest_hops() {
    for seed in 200..220 {
        let graph = random_graph(seed, 30, 70, seed % 2 == 1);
        let (source, target) = (1, 28);

        let mut bfs = Bfs::new(&graph, source, target);
        let mut dfs = Dfs::new(&graph, source, target);
        let mut dijkstra = Dijkstra::new(&graph, source, target);

        let found = bfs.search();
        assert_eq!(dfs.search(), found, "seed {seed}");
        assert_eq!(dijkstra.search(), found, "seed {seed}");
        if !found {
            continue;
        }

        let hops = bfs.path().len();
        assert_valid_path(&graph, &bfs.path(), source, target);
        assert_valid_path(&graph, &dfs.path(), source, target);
        assert!(hops <= dfs.path().len(), "seed {seed}");
        assert!(hops <= dijkstra.path().len(), "seed {seed}");
    }
}

#[test]
fn test_search_trees_only_contain_graph_edges() {
    let graph = random_graph(7, 25, 80, true);

    for kind in [SearchKind::AStar, SearchKind::Dijkstra, SearchKind::Bfs, SearchKind::Dfs] {
        let mut search = create_search(kind, &graph, 0, None, HeuristicPolicy::Euclidean);
        assert!(!search.search());

        let tree = search.search_tree();
        let mut reached = std::collections::BTreeSet::new();
        for edge in &tree {
            assert!(graph.has_edge(edge.from, edge.to), "{kind:?}");
            assert!(reached.insert(edge.to), "{kind:?} reached {} twice", edge.to);
            assert_ne!(edge.to, 0, "{kind:?} tree re-entered the source");
        }
    }
}

#[test]
fn test_all_strategies_agree_on_reachability() {
    let graph = random_graph(42, 60, 90, true);

    for target in 0..60 {
        let reachable: Vec<bool> = [SearchKind::AStar, SearchKind::Dijkstra, SearchKind::Bfs, SearchKind::Dfs]
            .into_iter()
            .map(|kind| create_search(kind, &graph, 5, target, HeuristicPolicy::Manhattan).search())
            .collect();

        assert!(reachable.windows(2).all(|pair| pair[0] == pair[1]), "target {target}: {reachable:?}");
    }
}
