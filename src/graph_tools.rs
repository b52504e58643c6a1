//! Graph constructions, structural predicates and generators.

use crate::error::{Error, Result};
use crate::graph::{AdjListGraph, LGraph};
use crate::graph_traits::{Graph, VertexIndex};
use rand::seq::SliceRandom;
use rand::Rng;

/// A graph built from a subset of another graph's vertices.
///
/// Vertex `i` of `graph` corresponds to vertex `original[i]` of the source graph.
#[derive(Debug, Clone)]
pub struct Subgraph {
    pub graph: AdjListGraph,
    pub original: Vec<VertexIndex>,
}

fn local_indices<G: Graph + ?Sized>(g: &G, vertices: &[VertexIndex]) -> Vec<Option<usize>> {
    let mut local = vec![None; g.vertex_bound()];
    for (i, &v) in vertices.iter().enumerate() {
        local[v] = Some(i);
    }
    local
}

/// The subgraph induced by `vertices`, in the given order.
pub fn induced_subgraph<G: Graph + ?Sized>(g: &G, vertices: &[VertexIndex]) -> Subgraph {
    let local = local_indices(g, vertices);
    let mut sg = AdjListGraph::with_capacity(vertices.len(), 0);
    for _ in vertices {
        sg.create_vertex();
    }
    for (u_local, &u) in vertices.iter().enumerate() {
        for &e in g.incident_edges(u) {
            if let Some(w_local) = local[g.edge(e).opposite(u)] {
                if w_local >= u_local {
                    sg.create_edge(u_local, w_local);
                }
            }
        }
    }
    Subgraph {
        graph: sg,
        original: vertices.to_vec(),
    }
}

/// The bipartite subgraph between the disjoint sets `x` and `y`. Only edges with one
/// endpoint in each set are kept; the first `x.len()` vertices are the `x` side.
pub fn induced_bipartite_subgraph<G: Graph + ?Sized>(
    g: &G,
    x: &[VertexIndex],
    y: &[VertexIndex],
) -> Subgraph {
    let mut vertices = Vec::with_capacity(x.len() + y.len());
    vertices.extend_from_slice(x);
    vertices.extend_from_slice(y);
    let local = local_indices(g, &vertices);
    let mut sg = AdjListGraph::with_capacity(vertices.len(), 0);
    for _ in &vertices {
        sg.create_vertex();
    }
    for (u_local, &u) in x.iter().enumerate() {
        for &e in g.incident_edges(u) {
            if let Some(w_local) = local[g.edge(e).opposite(u)] {
                if w_local >= x.len() {
                    sg.create_edge(u_local, w_local);
                }
            }
        }
    }
    Subgraph {
        graph: sg,
        original: vertices,
    }
}

/// The complement of a simple undirected graph, with the same vertex indices.
pub fn complement<G: Graph + ?Sized>(g: &G) -> AdjListGraph {
    let n = g.vertex_bound();
    let mut h = AdjListGraph::with_capacity(n, 0);
    for _ in 0..n {
        h.create_vertex();
    }
    for u in 0..n {
        for v in (u + 1)..n {
            if !g.has_edge(u, v) {
                h.create_edge(u, v);
            }
        }
    }
    h
}

/// The bipartite complement of a bipartite graph whose first `nx` vertices form one side
/// and the remaining `ny` vertices the other.
pub fn bipartite_complement<G: Graph + ?Sized>(g: &G, nx: usize, ny: usize) -> AdjListGraph {
    let mut h = AdjListGraph::with_capacity(nx + ny, 0);
    for _ in 0..(nx + ny) {
        h.create_vertex();
    }
    for u in 0..nx {
        for v in nx..(nx + ny) {
            if !g.has_edge(u, v) {
                h.create_edge(u, v);
            }
        }
    }
    h
}

pub fn is_empty<G: Graph + ?Sized>(g: &G) -> bool {
    g.edge_count() == 0
}

/// Simple undirected graphs only.
pub fn is_complete<G: Graph + ?Sized>(g: &G) -> bool {
    let n = g.vertex_count();
    n * n.saturating_sub(1) == 2 * g.edge_count()
}

/// A union of pairwise non-incident edges covering all vertices.
pub fn is_matching_graph<G: Graph + ?Sized>(g: &G) -> bool {
    g.vertex_count() == 2 * g.edge_count() && g.vertices().all(|v| g.degree(v) == 1)
}

/// The complement of a matching graph: every vertex misses exactly one other vertex.
pub fn is_matching_graph_complement<G: Graph + ?Sized>(g: &G) -> bool {
    let n = g.vertex_count();
    n >= 2
        && n * (n - 2) == 2 * g.edge_count()
        && g.vertices().all(|v| g.degree(v) == n - 2)
}

pub fn is_5cycle<G: Graph + ?Sized>(g: &G) -> bool {
    g.vertex_count() == 5 && g.edge_count() == 5 && g.vertices().all(|v| g.degree(v) == 2)
}

/// Adds a cycle on `k` new vertices and returns them in cycle order.
pub fn add_cycle(k: usize, g: &mut AdjListGraph) -> Vec<VertexIndex> {
    let vs: Vec<_> = (0..k).map(|_| g.create_vertex()).collect();
    for w in vs.windows(2) {
        g.create_edge(w[0], w[1]);
    }
    if k > 2 {
        g.create_edge(vs[k - 1], vs[0]);
    }
    vs
}

pub fn add_complete_graph(k: usize, g: &mut AdjListGraph) -> Vec<VertexIndex> {
    let vs: Vec<_> = (0..k).map(|_| g.create_vertex()).collect();
    for i in 0..k {
        for j in (i + 1)..k {
            g.create_edge(vs[i], vs[j]);
        }
    }
    vs
}

/// Adds an `n` x `m` grid; vertex `(i, j)` is at position `i * m + j` of the result.
pub fn add_grid_graph(n: usize, m: usize, g: &mut AdjListGraph) -> Vec<VertexIndex> {
    let vs: Vec<_> = (0..n * m).map(|_| g.create_vertex()).collect();
    for i in 0..n {
        for j in 0..m {
            if j + 1 < m {
                g.create_edge(vs[i * m + j], vs[i * m + j + 1]);
            }
            if i + 1 < n {
                g.create_edge(vs[i * m + j], vs[(i + 1) * m + j]);
            }
        }
    }
    vs
}

/// Adds a uniformly drawn simple graph with `n` vertices and `m` edges.
pub fn add_random_graph<R: Rng + ?Sized>(
    n: usize,
    m: usize,
    g: &mut AdjListGraph,
    rng: &mut R,
) -> Result<Vec<VertexIndex>> {
    if m > n * n.saturating_sub(1) / 2 {
        return Err(Error::InvalidParameter(format!(
            "a simple graph on {} vertices has fewer than {} edges",
            n, m
        )));
    }
    let vs: Vec<_> = (0..n).map(|_| g.create_vertex()).collect();
    for _ in 0..m {
        loop {
            let u = vs[rng.gen_range(0..n)];
            let v = vs[rng.gen_range(0..n)];
            if u != v && !g.has_edge(u, v) {
                g.create_edge(u, v);
                break;
            }
        }
    }
    Ok(vs)
}

/// Adds an Erdős-Rényi graph following the G(n, p) model.
pub fn add_erdos_renyi_graph<R: Rng + ?Sized>(
    n: usize,
    p: f64,
    g: &mut AdjListGraph,
    rng: &mut R,
) -> Vec<VertexIndex> {
    let vs: Vec<_> = (0..n).map(|_| g.create_vertex()).collect();
    for i in 0..n {
        for j in (i + 1)..n {
            if rng.gen::<f64>() < p {
                g.create_edge(vs[i], vs[j]);
            }
        }
    }
    vs
}

/// Copies a labeled graph with its vertices in random order. Returns the copy and the
/// permutation mapping old vertex indices to new ones.
pub fn shuffle_vertices<V: Clone, E: Clone, R: Rng + ?Sized>(
    lg: &LGraph<V, E>,
    rng: &mut R,
) -> (LGraph<V, E>, Vec<VertexIndex>) {
    let mut order: Vec<VertexIndex> = lg.vertices().collect();
    order.shuffle(rng);
    let mut new_index = vec![0; lg.vertex_bound()];
    let mut shuffled = LGraph::new();
    for &v in &order {
        new_index[v] = shuffled.add_vertex(lg.vertex_label(v).clone());
    }
    for e in lg.edges() {
        let edge = lg.edge(e);
        shuffled.add_edge(
            new_index[edge.first()],
            new_index[edge.second()],
            lg.edge_label(e).clone(),
        );
    }
    (shuffled, new_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    #[test]
    fn test_predicates() {
        let mut c5 = AdjListGraph::new();
        add_cycle(5, &mut c5);
        assert!(is_5cycle(&c5));
        assert!(!is_complete(&c5));
        // the 5-cycle is self-complementary
        assert!(is_5cycle(&complement(&c5)));

        let mut k4 = AdjListGraph::new();
        add_complete_graph(4, &mut k4);
        assert!(is_complete(&k4));
        assert!(is_empty(&complement(&k4)));

        let m = AdjListGraph::from_edges(6, &[(0, 1), (2, 3), (4, 5)]);
        assert!(is_matching_graph(&m));
        assert!(is_matching_graph_complement(&complement(&m)));
        assert!(!is_matching_graph(&k4));
    }

    #[test]
    fn test_induced_subgraphs() {
        let mut g = AdjListGraph::new();
        add_grid_graph(2, 3, &mut g);
        // 0 1 2
        // 3 4 5
        let sg = induced_subgraph(&g, &[1, 4, 5]);
        assert_eq!(2, sg.graph.edge_count());
        assert!(sg.graph.has_edge(0, 1));
        assert!(sg.graph.has_edge(1, 2));

        let bg = induced_bipartite_subgraph(&g, &[0, 1, 2], &[3, 4, 5]);
        assert_eq!(3, bg.graph.edge_count());
        assert!(is_matching_graph(&bg.graph));
        let co = bipartite_complement(&bg.graph, 3, 3);
        assert_eq!(6, co.edge_count());
        assert_eq!(vec![0, 1, 2, 3, 4, 5], bg.original);
    }

    #[test]
    fn test_random_graph() {
        let mut rng = Pcg64Mcg::seed_from_u64(7);
        let mut g = AdjListGraph::new();
        add_random_graph(6, 10, &mut g, &mut rng).unwrap();
        assert_eq!(10, g.edge_count());
        assert!(add_random_graph(3, 4, &mut g, &mut rng).is_err());
    }
}
