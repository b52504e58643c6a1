//! Traits that represent an abstract undirected graph upon which our algorithms operate.

use petgraph::graph::{NodeIndex, UnGraph};

/// Index of a vertex. Indices are dense, 0-based and stable for the lifetime of a graph.
pub type VertexIndex = usize;

/// Index of an edge. Indices are dense, 0-based and stable for the lifetime of a graph.
pub type EdgeIndex = usize;

/// An edge holds the indices of its two endpoints; it owns nothing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub(crate) first: VertexIndex,
    pub(crate) second: VertexIndex,
}

impl Edge {
    pub fn new(first: VertexIndex, second: VertexIndex) -> Edge {
        Edge { first, second }
    }

    #[inline]
    pub fn first(&self) -> VertexIndex {
        self.first
    }

    #[inline]
    pub fn second(&self) -> VertexIndex {
        self.second
    }

    /// Returns the endpoint that is not `v`.
    #[inline]
    pub fn opposite(&self, v: VertexIndex) -> VertexIndex {
        debug_assert!(v == self.first || v == self.second);
        if v == self.first {
            self.second
        } else {
            self.first
        }
    }
}

/// Abstract representation of an undirected graph with index-addressed vertices and edges.
///
/// `vertex_bound` and `edge_bound` are the sizes of the index ranges. They can exceed
/// `vertex_count` and `edge_count` when a graph leaves holes, as the
/// [`DynamicInducedSubgraph`](crate::DynamicInducedSubgraph) does for deleted vertices.
pub trait Graph {
    fn vertex_count(&self) -> usize;
    fn edge_count(&self) -> usize;
    fn vertex_bound(&self) -> usize;
    fn edge_bound(&self) -> usize;

    fn contains_vertex(&self, v: VertexIndex) -> bool;

    /// Iterates the indices of all present vertices in ascending order.
    fn vertices(&self) -> impl Iterator<Item = VertexIndex> + '_;

    /// Iterates the indices of all present edges in ascending order.
    fn edges(&self) -> impl Iterator<Item = EdgeIndex> + '_;

    fn edge(&self, e: EdgeIndex) -> Edge;

    /// The incident-edge list of `v`, in insertion order.
    fn incident_edges(&self, v: VertexIndex) -> &[EdgeIndex];

    #[inline]
    fn degree(&self, v: VertexIndex) -> usize {
        self.incident_edges(v).len()
    }

    fn neighbors(&self, v: VertexIndex) -> impl Iterator<Item = VertexIndex> + '_ {
        self.incident_edges(v)
            .iter()
            .map(move |&e| self.edge(e).opposite(v))
    }

    /// Finds an edge between `u` and `v` by scanning the shorter incident list.
    ///
    /// Runs in O(min(deg(u), deg(v))).
    fn get_edge(&self, u: VertexIndex, v: VertexIndex) -> Option<EdgeIndex> {
        let (scan, other) = if self.degree(u) <= self.degree(v) {
            (u, v)
        } else {
            (v, u)
        };
        self.incident_edges(scan)
            .iter()
            .copied()
            .find(|&e| self.edge(e).opposite(scan) == other)
    }

    fn has_edge(&self, u: VertexIndex, v: VertexIndex) -> bool {
        self.get_edge(u, v).is_some()
    }

    /// Converts the present part of the graph into a petgraph graph. Node weights
    /// hold the original vertex index.
    fn to_petgraph(&self) -> UnGraph<VertexIndex, ()> {
        let mut graph = UnGraph::with_capacity(self.vertex_count(), self.edge_count());
        let mut node_of = vec![NodeIndex::end(); self.vertex_bound()];
        for v in self.vertices() {
            node_of[v] = graph.add_node(v);
        }
        for e in self.edges() {
            let edge = self.edge(e);
            graph.add_edge(node_of[edge.first], node_of[edge.second], ());
        }
        graph
    }
}
