mod common;

use approx::assert_relative_eq;
use common::{brute_force_minimum, init, is_permutation, random_labeled_graph, random_tree, tree_graph};
use graph_edit_assignment::edit_costs::{
    ExtendedAssignmentCosts, ExtendedSimpleAssignmentCosts, GraphEditAssignmentCosts, SimpleAssignmentCosts,
};
use graph_edit_assignment::graph_tools::{add_cycle, shuffle_vertices};
use graph_edit_assignment::label_distance::IdentityDistance;
use graph_edit_assignment::tiebreak::{AmenableTiebreak, DefaultTiebreak};
use graph_edit_assignment::{
    check_amenable, edit_costs, test_amenable, AdjListGraph, Amenability, AssignmentSolver,
    DatasetDistance, GraphEditCosts, GraphEditDistanceAssignment, GraphVertexTreeDistance,
    GreedyBasic, GreedySort, Hungarian, JonkerVolgenant, LGraph, LinearTreeGed, Tiebreak,
    TreeDistance, TreeDistanceAssignmentSolver, TreeMetric, VertexMap,
};
use ndarray::Array2;
use petgraph::algo::is_isomorphic_matching;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use std::sync::Arc;

#[test]
fn test_tree_solver_is_optimal() {
    init();
    let mut rng = Pcg64Mcg::seed_from_u64(42);
    for _ in 0..50 {
        let tree = random_tree(rng.gen_range(1..12), &mut rng);
        let mut weight = VertexMap::new(&tree, 1.0);
        for v in 0..weight.len() {
            weight[v] = [0.0, 0.5, 1.0, 2.0][rng.gen_range(0..4)];
        }
        let n = weight.len();
        let metric = TreeMetric::new(tree, weight).unwrap();

        let k = rng.gen_range(0..7);
        let a: Vec<usize> = (0..k).map(|_| rng.gen_range(0..n)).collect();
        let b: Vec<usize> = (0..k).map(|_| rng.gen_range(0..n)).collect();
        let c = Array2::from_shape_fn((k, k), |(i, j)| metric.path_length(a[i], b[j]));

        let mut solver = TreeDistanceAssignmentSolver::new(&metric);
        let assignment = solver.solve(&a, &b).unwrap();
        assert!(is_permutation(&assignment));
        let expected = brute_force_minimum(&c);
        assert_relative_eq!(expected, solver.minimum_cost(&a, &b).unwrap(), epsilon = 1e-9);
        if k > 0 {
            assert_relative_eq!(expected, Hungarian.minimum_cost(&c).unwrap(), epsilon = 1e-9);
            assert_relative_eq!(expected, JonkerVolgenant.minimum_cost(&c).unwrap(), epsilon = 1e-9);
        }
    }
}

#[test]
fn test_greedy_solvers_are_upper_bounds() {
    let mut rng = Pcg64Mcg::seed_from_u64(3);
    for _ in 0..30 {
        let n = rng.gen_range(1..6);
        let c = Array2::from_shape_fn((n, n), |_| rng.gen_range(0.0..10.0));
        let optimum = brute_force_minimum(&c);
        for solver in [&GreedyBasic as &dyn AssignmentSolver, &GreedySort] {
            let assignment = solver.solve(&c).unwrap();
            assert!(is_permutation(&assignment));
            assert!(solver.minimum_cost(&c).unwrap() >= optimum - 1e-9);
        }
    }
}

#[test]
fn test_ged_of_shuffled_graphs_is_zero() {
    init();
    let mut rng = Pcg64Mcg::seed_from_u64(17);
    let labels: Vec<char> = ('a'..='z').collect();
    let mut dataset = Vec::new();
    for _ in 0..4 {
        // distinct labels, so the only zero-cost assignment is the isomorphism
        let g = random_labeled_graph(8, 10, &['x'], &mut rng);
        let g = g.map_labels(|v, _| labels[v], |_, l| *l);
        let (h, _) = shuffle_vertices(&g, &mut rng);
        dataset.push(g);
        dataset.push(h);
    }

    let costs = Arc::new(GraphEditCosts::default());
    let quadratic = GraphEditDistanceAssignment::new(costs.clone());
    let td = GraphVertexTreeDistance::discrete(&dataset, 3).unwrap();
    let linear = LinearTreeGed::new(&dataset, costs, td, Tiebreak::Default).unwrap();
    for i in (0..dataset.len()).step_by(2) {
        assert_relative_eq!(0.0, quadratic.compute(&dataset[i], &dataset[i + 1]).unwrap());
        let (d, assignment) = linear.compute_with_assignment(i, i + 1).unwrap();
        assert_relative_eq!(0.0, d);
        assert!(is_permutation(&assignment));
    }
}

#[test]
fn test_self_distance_is_zero_for_all_cost_models() {
    init();
    let mut rng = Pcg64Mcg::seed_from_u64(29);
    let labels: Vec<char> = ('a'..='z').collect();
    // vertex deletion, vertex insertion, edge deletion, edge insertion
    let settings = [
        (1.0, 1.0, 1.0, 1.0),
        (0.5, 2.0, 1.0, 3.0),
        (3.0, 3.0, 0.0, 0.0),
        (0.0, 0.0, 1.0, 1.0),
        (0.0, 0.0, 0.0, 0.0),
    ];
    for _ in 0..10 {
        let g = random_labeled_graph(7, 9, &['x'], &mut rng).map_labels(|v, _| labels[v], |_, l| *l);
        let (h, _) = shuffle_vertices(&g, &mut rng);
        for &(vd, vi, ed, ei) in &settings {
            let costs = Arc::new(GraphEditCosts::new(
                vd,
                vi,
                ed,
                ei,
                Box::new(IdentityDistance),
                Box::new(IdentityDistance),
            ));
            let mut models: Vec<Box<dyn GraphEditAssignmentCosts<char, ()>>> = vec![
                Box::new(ExtendedSimpleAssignmentCosts::new(costs.clone())),
                Box::new(ExtendedAssignmentCosts::new(costs.clone())),
            ];
            // the plain model ignores incident edges on deletion, so with free vertex
            // deletion it may delete and reinsert vertices whose edges the edit path pays for
            if vd > 0.0 || ed == 0.0 {
                models.push(Box::new(SimpleAssignmentCosts::new(costs.clone())));
            }
            for model in models {
                let ged = GraphEditDistanceAssignment::with_solver(Box::new(Hungarian), costs.clone(), model);
                assert_relative_eq!(0.0, ged.compute(&g, &g).unwrap());
                assert_relative_eq!(0.0, ged.compute(&g, &h).unwrap());
            }
        }
    }
}

#[test]
fn test_zero_distance_implies_isomorphism() {
    let mut rng = Pcg64Mcg::seed_from_u64(5);
    let costs = Arc::new(GraphEditCosts::default());
    let ged = GraphEditDistanceAssignment::new(costs.clone());
    let mut zeros = 0;
    for _ in 0..200 {
        let g = random_labeled_graph(4, 3, &['a', 'b'], &mut rng);
        let h = random_labeled_graph(4, 3, &['a', 'b'], &mut rng);
        let (d, assignment) = ged.compute_with_assignment(&g, &h).unwrap();
        assert!(is_permutation(&assignment));
        assert_relative_eq!(d, edit_costs(&g, &h, &costs, &assignment));
        if d == 0.0 {
            zeros += 1;
            assert!(is_isomorphic_matching(
                &g.to_labeled_petgraph(),
                &h.to_labeled_petgraph(),
                |x, y| x == y,
                |_, _| true
            ));
        }
    }
    assert!(zeros > 0);
}

#[test]
fn test_linear_pairwise_matrix() {
    init();
    let mut rng = Pcg64Mcg::seed_from_u64(23);
    let dataset: Vec<LGraph<char, ()>> = (0..6)
        .map(|_| {
            let n = rng.gen_range(3..8);
            let m = rng.gen_range(n - 1..=n);
            random_labeled_graph(n, m, &['C', 'N', 'O'], &mut rng)
        })
        .collect();
    let costs = Arc::new(GraphEditCosts::default());
    let td = GraphVertexTreeDistance::discrete(&dataset, 2).unwrap();
    let linear = LinearTreeGed::new(&dataset, costs.clone(), td, Tiebreak::Random { seed: 1 }).unwrap();
    let d = linear.compute_all().unwrap();
    assert_eq!((6, 6), d.dim());
    for i in 0..6 {
        assert_eq!(0.0, d[[i, i]]);
        for j in 0..6 {
            assert_eq!(d[[i, j]], d[[j, i]]);
            assert!(d[[i, j]] >= 0.0);
        }
    }
    // the tree assignment is optimal for the tree costs
    for i in 0..6 {
        for j in 0..6 {
            let c = linear.tree().assignment_cost_matrix(i, j).unwrap();
            let (_, assignment) = linear.compute_with_assignment(i, j).unwrap();
            let cost: f64 = assignment
                .iter()
                .enumerate()
                .map(|(r, s)| s.map_or(0.0, |s| c[[r, s]]))
                .sum();
            assert_relative_eq!(Hungarian.minimum_cost(&c).unwrap(), cost, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_amenable_tiebreak_keeps_tree_cost() {
    let mut rng = Pcg64Mcg::seed_from_u64(8);
    let mut dataset = Vec::new();
    for _ in 0..3 {
        let g = random_labeled_graph(7, 8, &['a', 'b'], &mut rng);
        let (h, _) = shuffle_vertices(&g, &mut rng);
        dataset.push(g);
        dataset.push(h);
    }
    let td = GraphVertexTreeDistance::discrete(&dataset, 4).unwrap();
    for i in 0..dataset.len() {
        for j in 0..dataset.len() {
            let (a, b) = td.padded_vertices(i, j).unwrap();
            let cost = |assignment: &[Option<usize>]| -> f64 {
                assignment
                    .iter()
                    .enumerate()
                    .map(|(r, s)| s.map_or(0.0, |s| td.compute(&a[r], &b[s]).unwrap()))
                    .sum()
            };
            let mut solver = TreeDistanceAssignmentSolver::new(&td);
            let by_default = solver.solve_with(&a, &b, &mut DefaultTiebreak).unwrap();
            let mut amenable = AmenableTiebreak::new(&dataset[i], &dataset[j]);
            let by_cells = solver.solve_with(&a, &b, &mut amenable).unwrap();
            assert!(is_permutation(&by_cells));
            assert_relative_eq!(cost(&by_default), cost(&by_cells), epsilon = 1e-9);
        }
    }
}

#[test]
fn test_amenability_examples() {
    init();
    let mut c5 = AdjListGraph::new();
    add_cycle(5, &mut c5);
    assert!(test_amenable(&c5));

    let mut triangles = AdjListGraph::new();
    add_cycle(3, &mut triangles);
    add_cycle(3, &mut triangles);
    let mut hexagon = AdjListGraph::new();
    add_cycle(6, &mut hexagon);
    assert!(!test_amenable(&triangles) || !test_amenable(&hexagon));

    let mut two_c5 = AdjListGraph::new();
    add_cycle(5, &mut two_c5);
    add_cycle(5, &mut two_c5);
    assert!(matches!(check_amenable(&two_c5), Amenability::NotAmenable(_)));
}

#[test]
fn test_trees_are_amenable() {
    let mut rng = Pcg64Mcg::seed_from_u64(99);
    for _ in 0..40 {
        let t = random_tree(rng.gen_range(1..10), &mut rng);
        let g = tree_graph(&t);
        assert_eq!(Amenability::Amenable, check_amenable(&g), "{:?}", g);
    }
}

#[test]
fn test_random_tiebreak_is_order_independent() {
    let mut rng = Pcg64Mcg::seed_from_u64(61);
    let dataset: Vec<LGraph<char, ()>> = (0..4).map(|_| random_labeled_graph(6, 6, &['a'], &mut rng)).collect();
    let td = GraphVertexTreeDistance::discrete(&dataset, 2).unwrap();
    let costs = Arc::new(GraphEditCosts::default());
    let ged = LinearTreeGed::new(&dataset, costs, td, Tiebreak::Random { seed: 4 }).unwrap();
    let all = ged.compute_all().unwrap();
    for i in 0..4 {
        for j in (i + 1)..4 {
            assert_eq!(all[[i, j]], ged.compute(i, j).unwrap());
        }
    }
}
