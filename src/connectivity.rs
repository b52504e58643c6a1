//! Connectivity probes. Separator searches delete and restore vertex subsets on a
//! [`DynamicInducedSubgraph`] instead of copying the graph for every probe.

use crate::dynamic_subgraph::DynamicInducedSubgraph;
use crate::graph_traits::{Graph, VertexIndex};

/// Connected components, each listed in DFS discovery order. Components are ordered by
/// their smallest vertex.
pub fn connected_components<G: Graph + ?Sized>(g: &G) -> Vec<Vec<VertexIndex>> {
    let mut found = vec![false; g.vertex_bound()];
    let mut components = Vec::new();
    for s in g.vertices() {
        if found[s] {
            continue;
        }
        let mut component = Vec::new();
        let mut stack = vec![s];
        found[s] = true;
        while let Some(v) = stack.pop() {
            component.push(v);
            for w in g.neighbors(v) {
                if !found[w] {
                    found[w] = true;
                    stack.push(w);
                }
            }
        }
        components.push(component);
    }
    components
}

pub fn is_connected<G: Graph + ?Sized>(g: &G) -> bool {
    let n = g.vertex_count();
    if n == 0 {
        return true;
    }
    if g.edge_count() + 1 < n {
        return false;
    }
    connected_components(g).len() == 1
}

/// Vertices whose removal disconnects the graph. Tests every vertex in turn.
pub fn find_cut_vertices<G: Graph>(g: &G) -> Vec<VertexIndex> {
    let mut sg = DynamicInducedSubgraph::new(g);
    let mut cut = Vec::new();
    for v in g.vertices() {
        sg.delete_vertex(v);
        if !is_connected(&sg) {
            cut.push(v);
        }
        sg.restore_vertex(v);
    }
    cut
}

/// All vertex sets of size `k` whose removal disconnects the graph, found by testing every
/// `k`-subset.
pub fn find_k_separators<G: Graph>(g: &G, k: usize) -> Vec<Vec<VertexIndex>> {
    let vertices: Vec<VertexIndex> = g.vertices().collect();
    let mut sg = DynamicInducedSubgraph::new(g);
    let mut subset = Vec::with_capacity(k);
    let mut separators = Vec::new();
    extend_subset(&vertices, k, 0, &mut subset, &mut sg, &mut separators);
    separators
}

fn extend_subset<G: Graph>(
    vertices: &[VertexIndex],
    k: usize,
    next: usize,
    subset: &mut Vec<VertexIndex>,
    sg: &mut DynamicInducedSubgraph<'_, G>,
    separators: &mut Vec<Vec<VertexIndex>>,
) {
    if subset.len() == k {
        if !is_connected(&*sg) {
            separators.push(subset.clone());
        }
        return;
    }
    for j in next..vertices.len() {
        let v = vertices[j];
        subset.push(v);
        sg.delete_vertex(v);
        extend_subset(vertices, k, j + 1, subset, sg, separators);
        sg.restore_vertex(v);
        subset.pop();
    }
}

/// Whether the graph stays connected after removing any `k - 1` vertices.
pub fn is_k_connected<G: Graph>(g: &G, k: usize) -> bool {
    if k == 0 {
        return true;
    }
    find_k_separators(g, k - 1).is_empty()
}

pub fn is_biconnected<G: Graph>(g: &G) -> bool {
    is_k_connected(g, 2)
}
