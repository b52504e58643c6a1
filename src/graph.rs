use crate::error::{Error, Result};
use crate::graph_traits::{Edge, EdgeIndex, Graph, VertexIndex};
use crate::property::{EdgeMap, VertexMap};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt::Debug;

#[derive(Debug, Clone, Default)]
pub struct Vertex {
    /// Incident edges in insertion order. A vertex exclusively owns this list.
    edges: Vec<EdgeIndex>,
}

impl Vertex {
    pub fn edges(&self) -> &[EdgeIndex] {
        &self.edges
    }

    pub(crate) fn add_edge(&mut self, e: EdgeIndex) {
        self.edges.push(e);
    }

    pub(crate) fn remove_edge(&mut self, e: EdgeIndex) {
        if let Some(pos) = self.edges.iter().position(|&x| x == e) {
            self.edges.remove(pos);
        }
    }
}

/// An undirected graph stored as incident-edge lists.
#[derive(Debug, Clone, Default)]
pub struct AdjListGraph {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
}

impl AdjListGraph {
    pub fn new() -> AdjListGraph {
        AdjListGraph::default()
    }

    pub fn with_capacity(vertices: usize, edges: usize) -> AdjListGraph {
        AdjListGraph {
            vertices: Vec::with_capacity(vertices),
            edges: Vec::with_capacity(edges),
        }
    }

    /// Builds a graph with `n` vertices and the given edges.
    pub fn from_edges(n: usize, edges: &[(VertexIndex, VertexIndex)]) -> AdjListGraph {
        let mut g = AdjListGraph::with_capacity(n, edges.len());
        for _ in 0..n {
            g.create_vertex();
        }
        for &(u, v) in edges {
            g.create_edge(u, v);
        }
        g
    }

    pub fn create_vertex(&mut self) -> VertexIndex {
        self.vertices.push(Vertex::default());
        self.vertices.len() - 1
    }

    /// Creates the edge `{u, v}` and appends it to the incident lists of both endpoints.
    ///
    /// # Panics
    ///
    /// Panics if `u` or `v` is not a vertex of this graph.
    pub fn create_edge(&mut self, u: VertexIndex, v: VertexIndex) -> EdgeIndex {
        assert!(u < self.vertices.len() && v < self.vertices.len());
        let e = self.edges.len();
        self.edges.push(Edge::new(u, v));
        self.vertices[u].add_edge(e);
        if u != v {
            self.vertices[v].add_edge(e);
        }
        e
    }

    pub fn vertex(&self, v: VertexIndex) -> &Vertex {
        &self.vertices[v]
    }

    /// Moves the endpoint of `e` opposite to `keep` over to `target`, updating the
    /// incident lists of the old and the new endpoint.
    pub(crate) fn reattach_edge(&mut self, e: EdgeIndex, keep: VertexIndex, target: VertexIndex) {
        let edge = self.edges[e];
        let old = edge.opposite(keep);
        self.vertices[old].remove_edge(e);
        self.vertices[target].add_edge(e);
        self.edges[e] = if edge.first == keep {
            Edge::new(keep, target)
        } else {
            Edge::new(target, keep)
        };
    }
}

impl Graph for AdjListGraph {
    #[inline]
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    fn vertex_bound(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    fn edge_bound(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    fn contains_vertex(&self, v: VertexIndex) -> bool {
        v < self.vertices.len()
    }

    fn vertices(&self) -> impl Iterator<Item = VertexIndex> + '_ {
        0..self.vertices.len()
    }

    fn edges(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        0..self.edges.len()
    }

    #[inline]
    fn edge(&self, e: EdgeIndex) -> Edge {
        self.edges[e]
    }

    #[inline]
    fn incident_edges(&self, v: VertexIndex) -> &[EdgeIndex] {
        &self.vertices[v].edges
    }
}

/// A graph whose vertices and edges carry labels.
#[derive(Debug, Clone)]
pub struct LGraph<V, E> {
    graph: AdjListGraph,
    vertex_labels: VertexMap<V>,
    edge_labels: EdgeMap<E>,
}

impl<V, E> Default for LGraph<V, E> {
    fn default() -> Self {
        LGraph {
            graph: AdjListGraph::new(),
            vertex_labels: VertexMap::default(),
            edge_labels: EdgeMap::default(),
        }
    }
}

impl<V, E> LGraph<V, E> {
    pub fn new() -> LGraph<V, E> {
        LGraph::default()
    }

    /// Attaches label maps to an existing graph. The maps must cover the graph exactly.
    pub fn from_parts(
        graph: AdjListGraph,
        vertex_labels: VertexMap<V>,
        edge_labels: EdgeMap<E>,
    ) -> Result<LGraph<V, E>> {
        if vertex_labels.len() != graph.vertex_bound() || edge_labels.len() != graph.edge_bound()
        {
            return Err(Error::InvalidParameter(format!(
                "label maps of size {}/{} do not match a graph with {} vertices and {} edges",
                vertex_labels.len(),
                edge_labels.len(),
                graph.vertex_bound(),
                graph.edge_bound()
            )));
        }
        Ok(LGraph {
            graph,
            vertex_labels,
            edge_labels,
        })
    }

    pub fn add_vertex(&mut self, label: V) -> VertexIndex {
        let v = self.graph.create_vertex();
        self.vertex_labels.push(label);
        v
    }

    pub fn add_edge(&mut self, u: VertexIndex, v: VertexIndex, label: E) -> EdgeIndex {
        let e = self.graph.create_edge(u, v);
        self.edge_labels.push(label);
        e
    }

    pub fn graph(&self) -> &AdjListGraph {
        &self.graph
    }

    #[inline]
    pub fn vertex_label(&self, v: VertexIndex) -> &V {
        &self.vertex_labels[v]
    }

    #[inline]
    pub fn edge_label(&self, e: EdgeIndex) -> &E {
        &self.edge_labels[e]
    }

    pub fn vertex_labels(&self) -> &VertexMap<V> {
        &self.vertex_labels
    }

    pub fn edge_labels(&self) -> &EdgeMap<E> {
        &self.edge_labels
    }

    /// Relabels the graph, keeping its structure.
    pub fn map_labels<V2, E2>(
        &self,
        mut vertex_fn: impl FnMut(VertexIndex, &V) -> V2,
        mut edge_fn: impl FnMut(EdgeIndex, &E) -> E2,
    ) -> LGraph<V2, E2> {
        LGraph {
            graph: self.graph.clone(),
            vertex_labels: VertexMap::from_vec(
                self.vertex_labels
                    .iter()
                    .enumerate()
                    .map(|(v, l)| vertex_fn(v, l))
                    .collect(),
            ),
            edge_labels: EdgeMap::from_vec(
                self.edge_labels
                    .iter()
                    .enumerate()
                    .map(|(e, l)| edge_fn(e, l))
                    .collect(),
            ),
        }
    }
}

impl<V: Clone, E: Clone> LGraph<V, E> {
    pub fn from_petgraph(pg: &UnGraph<V, E>) -> LGraph<V, E> {
        let mut lg = LGraph::new();
        for i in pg.node_indices() {
            let v = lg.add_vertex(pg[i].clone());
            debug_assert!(v == i.index());
        }
        for e in pg.edge_references() {
            lg.add_edge(e.source().index(), e.target().index(), e.weight().clone());
        }
        lg
    }

    pub fn to_labeled_petgraph(&self) -> UnGraph<V, E> {
        let mut pg = UnGraph::with_capacity(self.vertex_count(), self.edge_count());
        for v in self.vertices() {
            pg.add_node(self.vertex_labels[v].clone());
        }
        for e in self.edges() {
            let edge = self.edge(e);
            pg.add_edge(
                NodeIndex::new(edge.first()),
                NodeIndex::new(edge.second()),
                self.edge_labels[e].clone(),
            );
        }
        pg
    }
}

impl<V, E> Graph for LGraph<V, E> {
    #[inline]
    fn vertex_count(&self) -> usize {
        self.graph.vertex_count()
    }

    #[inline]
    fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[inline]
    fn vertex_bound(&self) -> usize {
        self.graph.vertex_bound()
    }

    #[inline]
    fn edge_bound(&self) -> usize {
        self.graph.edge_bound()
    }

    #[inline]
    fn contains_vertex(&self, v: VertexIndex) -> bool {
        self.graph.contains_vertex(v)
    }

    fn vertices(&self) -> impl Iterator<Item = VertexIndex> + '_ {
        self.graph.vertices()
    }

    fn edges(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edges()
    }

    #[inline]
    fn edge(&self, e: EdgeIndex) -> Edge {
        self.graph.edge(e)
    }

    #[inline]
    fn incident_edges(&self, v: VertexIndex) -> &[EdgeIndex] {
        self.graph.incident_edges(v)
    }
}

/// Builds a labeled graph from arbitrary node ids.
pub struct GraphBuilder<K: Ord, V, E> {
    // maps node id to vertex index
    node_map: BTreeMap<K, VertexIndex>,
    graph: LGraph<V, E>,
}

impl<K: Ord + Debug, V, E> GraphBuilder<K, V, E> {
    pub fn new() -> GraphBuilder<K, V, E> {
        GraphBuilder {
            node_map: BTreeMap::new(),
            graph: LGraph::new(),
        }
    }

    pub fn graph(self) -> LGraph<V, E> {
        self.graph
    }

    pub fn vertex_of(&self, node_id: &K) -> Option<VertexIndex> {
        self.node_map.get(node_id).copied()
    }

    pub fn add_node(&mut self, node_id: K, node_value: V) -> Result<VertexIndex> {
        match self.node_map.entry(node_id) {
            Entry::Vacant(e) => {
                let v = self.graph.add_vertex(node_value);
                e.insert(v);
                Ok(v)
            }
            Entry::Occupied(e) => Err(Error::DuplicateVertex(format!("{:?}", e.key()))),
        }
    }

    /// Adds an edge between two previously added nodes.
    pub fn add_edge(&mut self, source_id: &K, target_id: &K, label: E) -> Result<EdgeIndex> {
        let u = self
            .vertex_of(source_id)
            .ok_or_else(|| Error::InvalidParameter(format!("unknown node id {:?}", source_id)))?;
        let v = self
            .vertex_of(target_id)
            .ok_or_else(|| Error::InvalidParameter(format!("unknown node id {:?}", target_id)))?;
        Ok(self.graph.add_edge(u, v, label))
    }
}

impl<K: Ord + Debug, V: Default, E> GraphBuilder<K, V, E> {
    // returns node index
    pub fn add_or_get_node(&mut self, node_id: K) -> VertexIndex {
        match self.node_map.entry(node_id) {
            Entry::Vacant(e) => {
                let v = self.graph.add_vertex(V::default());
                *e.insert(v)
            }
            Entry::Occupied(e) => *e.get(),
        }
    }

    /// Adds an edge, creating missing endpoints with a default label.
    pub fn add_edge_creating(&mut self, source_id: K, target_id: K, label: E) -> EdgeIndex {
        let u = self.add_or_get_node(source_id);
        let v = self.add_or_get_node(target_id);
        self.graph.add_edge(u, v, label)
    }
}

impl<K: Ord + Debug, V, E> Default for GraphBuilder<K, V, E> {
    fn default() -> Self {
        GraphBuilder::new()
    }
}
