//! Amenability to colour refinement.
//!
//! A graph is amenable if colour refinement distinguishes it from every non-isomorphic
//! graph. The test follows the characterisation of Arvind, Köbler, Rattan and Verbitsky
//! (Graph Isomorphism, Color Refinement, and Compactness, 2017): every cell of the stable
//! partition and every pair of cells must induce one of a few regular structures, and the
//! cell graph formed by the anisotropic pairs must be a forest whose trees grow in
//! cardinality away from their smallest cell, with at most one heterogeneous cell each,
//! located at that smallest cell.

use crate::connectivity::connected_components;
use crate::graph::LGraph;
use crate::graph_tools::{
    bipartite_complement, induced_bipartite_subgraph, induced_subgraph, is_5cycle, is_complete,
    is_empty, is_matching_graph, is_matching_graph_complement,
};
use crate::graph_traits::{Graph, VertexIndex};
use crate::refinement::stable_partition;
use log::debug;

/// Structure of the graph induced by a cell, or of the bipartite graph between two cells.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GraphType {
    Empty,
    Complete,
    Matching,
    CoMatching,
    Cycle5,
    BipartiteComplete,
    BipartiteStars,
    CoBipartiteStars,
    Other,
}

impl GraphType {
    /// Empty and complete cells are homogeneous; every other cell type is heterogeneous.
    pub fn is_homogeneous(self) -> bool {
        matches!(self, GraphType::Empty | GraphType::Complete)
    }
}

/// Why a graph is not amenable. Cells are addressed by their position in the partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    CellType(usize),
    PairType(usize, usize),
    MultipleHeterogeneous(usize, usize),
    HeterogeneousCardinality(usize),
    NotATree,
    NotMonotonic { parent: usize, child: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Amenability {
    Amenable,
    NotAmenable(Reason),
}

impl Amenability {
    pub fn is_amenable(&self) -> bool {
        matches!(self, Amenability::Amenable)
    }
}

pub fn classify_cell<G: Graph + ?Sized>(g: &G, cell: &[VertexIndex]) -> GraphType {
    let sg = induced_subgraph(g, cell).graph;
    if is_empty(&sg) {
        GraphType::Empty
    } else if is_complete(&sg) {
        GraphType::Complete
    } else if is_matching_graph(&sg) {
        GraphType::Matching
    } else if is_matching_graph_complement(&sg) {
        GraphType::CoMatching
    } else if is_5cycle(&sg) {
        GraphType::Cycle5
    } else {
        GraphType::Other
    }
}

/// Classifies the bipartite graph between the disjoint cells `x` and `y`.
pub fn classify_pair<G: Graph + ?Sized>(g: &G, x: &[VertexIndex], y: &[VertexIndex]) -> GraphType {
    let sg = induced_bipartite_subgraph(g, x, y).graph;
    if is_empty(&sg) {
        GraphType::Empty
    } else if sg.edge_count() == x.len() * y.len() {
        GraphType::BipartiteComplete
    } else if is_bipartite_stars(&sg, x.len()) {
        GraphType::BipartiteStars
    } else if is_bipartite_stars(&bipartite_complement(&sg, x.len(), y.len()), x.len()) {
        GraphType::CoBipartiteStars
    } else {
        GraphType::Other
    }
}

/// Whether a bipartite graph, whose first `nx` vertices form one side, is a disjoint union
/// of stars whose centres all lie on the same side and cover it.
fn is_bipartite_stars<G: Graph + ?Sized>(g: &G, nx: usize) -> bool {
    let n = g.vertex_count();
    if nx == 0 || nx == n {
        return false;
    }
    let ny = n - nx;
    let uniform = |range: std::ops::Range<usize>| {
        let d = g.degree(range.start);
        range.into_iter().all(|v| g.degree(v) == d).then_some(d)
    };
    match (uniform(0..nx), uniform(nx..n)) {
        (Some(dx), Some(dy)) => (dx == 1 && nx == ny * dy) || (dy == 1 && ny == nx * dx),
        _ => false,
    }
}

/// The cell graph of `g` with respect to `cells`. Vertex `i` stands for `cells[i]` and is
/// labeled with its type; cells `i` and `j` are adjacent if their pair is anisotropic,
/// i.e. neither empty nor bipartite complete, and the edge is labeled with the pair type.
pub fn create_cell_graph<G: Graph + ?Sized>(
    g: &G,
    cells: &[Vec<VertexIndex>],
) -> LGraph<GraphType, GraphType> {
    let mut cg = LGraph::new();
    for cell in cells {
        cg.add_vertex(classify_cell(g, cell));
    }
    for i in 0..cells.len() {
        for j in (i + 1)..cells.len() {
            let t = classify_pair(g, &cells[i], &cells[j]);
            if t != GraphType::Empty && t != GraphType::BipartiteComplete {
                cg.add_edge(i, j, t);
            }
        }
    }
    cg
}

/// Checks the global conditions on a cell graph whose vertex `i` stands for a cell of
/// `cardinality[i]` vertices.
pub fn check_cell_graph(cg: &LGraph<GraphType, GraphType>, cardinality: &[usize]) -> Amenability {
    if let Some(c) = cg.vertices().find(|&c| *cg.vertex_label(c) == GraphType::Other) {
        return Amenability::NotAmenable(Reason::CellType(c));
    }
    if let Some(e) = cg.edges().find(|&e| *cg.edge_label(e) == GraphType::Other) {
        let edge = cg.edge(e);
        return Amenability::NotAmenable(Reason::PairType(edge.first(), edge.second()));
    }

    let mut parent: Vec<Option<usize>> = vec![None; cg.vertex_bound()];
    for component in connected_components(cg) {
        let mut heterogeneous = None;
        let mut root = component[0];
        for &c in &component {
            if cardinality[c] < cardinality[root] {
                root = c;
            }
            if !cg.vertex_label(c).is_homogeneous() {
                if let Some(h) = heterogeneous {
                    return Amenability::NotAmenable(Reason::MultipleHeterogeneous(h, c));
                }
                heterogeneous = Some(c);
            }
        }
        if let Some(h) = heterogeneous {
            if cardinality[h] != cardinality[root] {
                return Amenability::NotAmenable(Reason::HeterogeneousCardinality(h));
            }
        }

        // breadth-first from the smallest cell; a second way into a cell closes a cycle
        parent[root] = Some(root);
        let mut level = vec![root];
        while !level.is_empty() {
            let mut next = Vec::new();
            for &c in &level {
                for d in cg.neighbors(c) {
                    if parent[d].is_some() {
                        if parent[c] == Some(d) {
                            continue;
                        }
                        return Amenability::NotAmenable(Reason::NotATree);
                    }
                    parent[d] = Some(c);
                    if cardinality[d] < cardinality[c] {
                        return Amenability::NotAmenable(Reason::NotMonotonic {
                            parent: c,
                            child: d,
                        });
                    }
                    next.push(d);
                }
            }
            level = next;
        }
    }
    Amenability::Amenable
}

/// Full amenability test of a simple undirected graph.
pub fn check_amenable<G: Graph + ?Sized>(g: &G) -> Amenability {
    let cells = stable_partition(g);
    let cg = create_cell_graph(g, &cells);
    let cardinality: Vec<usize> = cells.iter().map(Vec::len).collect();
    let result = check_cell_graph(&cg, &cardinality);
    match &result {
        Amenability::Amenable => debug!("amenable with {} cells", cells.len()),
        Amenability::NotAmenable(reason) => {
            debug!("not amenable with {} cells: {:?}", cells.len(), reason)
        }
    }
    result
}

pub fn test_amenable<G: Graph + ?Sized>(g: &G) -> bool {
    check_amenable(g).is_amenable()
}
