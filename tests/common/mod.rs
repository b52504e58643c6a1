#![allow(dead_code)]

use graph_edit_assignment::graph_tools::add_random_graph;
use graph_edit_assignment::{AdjListGraph, EdgeMap, Graph, LGraph, RootedTree, VertexIndex, VertexMap};
use ndarray::Array2;
use rand::Rng;

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A simple graph with `n` vertices and `m` edges, labels drawn from `labels`.
pub fn random_labeled_graph<R: Rng>(n: usize, m: usize, labels: &[char], rng: &mut R) -> LGraph<char, ()> {
    let mut g = AdjListGraph::new();
    add_random_graph(n, m, &mut g, rng).unwrap();
    let vertex_labels = (0..n).map(|_| labels[rng.gen_range(0..labels.len())]).collect();
    let edge_labels = EdgeMap::from_vec(vec![(); g.edge_bound()]);
    LGraph::from_parts(g, VertexMap::from_vec(vertex_labels), edge_labels).unwrap()
}

/// Every vertex but the root gets a random earlier vertex as parent.
pub fn random_tree<R: Rng>(n: usize, rng: &mut R) -> RootedTree {
    let mut t = RootedTree::with_capacity(n);
    t.create_root().unwrap();
    for v in 1..n {
        t.create_child(rng.gen_range(0..v));
    }
    t
}

/// The same tree as an undirected graph.
pub fn tree_graph(t: &RootedTree) -> AdjListGraph {
    let edges: Vec<(VertexIndex, VertexIndex)> = t.edges().map(|e| (t.edge(e).first(), t.edge(e).second())).collect();
    AdjListGraph::from_edges(t.vertex_count(), &edges)
}

/// Minimum assignment cost of a square matrix by enumerating all permutations.
pub fn brute_force_minimum(c: &Array2<f64>) -> f64 {
    fn search(c: &Array2<f64>, row: usize, used: &mut Vec<bool>, acc: f64, best: &mut f64) {
        if row == c.nrows() {
            *best = best.min(acc);
            return;
        }
        for j in 0..c.ncols() {
            if !used[j] {
                used[j] = true;
                search(c, row + 1, used, acc + c[[row, j]], best);
                used[j] = false;
            }
        }
    }
    let mut best = f64::INFINITY;
    search(c, 0, &mut vec![false; c.ncols()], 0.0, &mut best);
    if c.nrows() == 0 {
        0.0
    } else {
        best
    }
}

/// Whether `assignment` maps rows onto `0..len` one to one.
pub fn is_permutation(assignment: &[Option<usize>]) -> bool {
    let mut seen = vec![false; assignment.len()];
    for j in assignment {
        match j {
            Some(j) if *j < seen.len() && !seen[*j] => seen[*j] = true,
            _ => return false,
        }
    }
    true
}
