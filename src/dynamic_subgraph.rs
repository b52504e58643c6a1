use crate::graph_traits::{Edge, EdgeIndex, Graph, VertexIndex};

/// An induced subgraph whose vertex set shrinks and grows again.
///
/// It starts out equal to the supergraph. Deleted vertices and their edges leave
/// tombstones, so every surviving vertex and edge keeps the index it has in the
/// supergraph and property maps of the supergraph remain usable.
#[derive(Debug, Clone)]
pub struct DynamicInducedSubgraph<'g, G: Graph> {
    supergraph: &'g G,
    incident: Vec<Option<Vec<EdgeIndex>>>,
    edges: Vec<Option<Edge>>,
    vertex_count: usize,
    edge_count: usize,
}

impl<'g, G: Graph> DynamicInducedSubgraph<'g, G> {
    pub fn new(supergraph: &'g G) -> Self {
        let mut incident = vec![None; supergraph.vertex_bound()];
        for v in supergraph.vertices() {
            incident[v] = Some(supergraph.incident_edges(v).to_vec());
        }
        let mut edges = vec![None; supergraph.edge_bound()];
        for e in supergraph.edges() {
            edges[e] = Some(supergraph.edge(e));
        }
        DynamicInducedSubgraph {
            supergraph,
            incident,
            edges,
            vertex_count: supergraph.vertex_count(),
            edge_count: supergraph.edge_count(),
        }
    }

    pub fn supergraph(&self) -> &'g G {
        self.supergraph
    }

    /// Removes `v` together with all its incident edges. Deleting an absent vertex is a no-op.
    pub fn delete_vertex(&mut self, v: VertexIndex) {
        let Some(es) = self.incident[v].take() else {
            return;
        };
        for e in es {
            if let Some(edge) = self.edges[e].take() {
                let w = edge.opposite(v);
                if w != v {
                    if let Some(list) = self.incident[w].as_mut() {
                        list.retain(|&x| x != e);
                    }
                }
                self.edge_count -= 1;
            }
        }
        self.vertex_count -= 1;
    }

    /// Restores `v` of the supergraph, including its edges to vertices currently present.
    pub fn restore_vertex(&mut self, v: VertexIndex) {
        if self.incident[v].is_some() {
            return;
        }
        self.incident[v] = Some(Vec::new());
        self.vertex_count += 1;
        let supergraph = self.supergraph;
        for &e in supergraph.incident_edges(v) {
            let edge = supergraph.edge(e);
            let w = edge.opposite(v);
            if self.incident[w].is_some() && self.edges[e].is_none() {
                self.edges[e] = Some(edge);
                if let Some(list) = self.incident[v].as_mut() {
                    list.push(e);
                }
                if w != v {
                    if let Some(list) = self.incident[w].as_mut() {
                        list.push(e);
                    }
                }
                self.edge_count += 1;
            }
        }
    }
}

impl<'g, G: Graph> Graph for DynamicInducedSubgraph<'g, G> {
    #[inline]
    fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    #[inline]
    fn edge_count(&self) -> usize {
        self.edge_count
    }

    #[inline]
    fn vertex_bound(&self) -> usize {
        self.incident.len()
    }

    #[inline]
    fn edge_bound(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    fn contains_vertex(&self, v: VertexIndex) -> bool {
        self.incident.get(v).map_or(false, Option::is_some)
    }

    fn vertices(&self) -> impl Iterator<Item = VertexIndex> + '_ {
        self.incident
            .iter()
            .enumerate()
            .filter_map(|(v, i)| i.as_ref().map(|_| v))
    }

    fn edges(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(e, i)| i.as_ref().map(|_| e))
    }

    /// Panics if `e` has been deleted.
    #[inline]
    fn edge(&self, e: EdgeIndex) -> Edge {
        match self.edges[e] {
            Some(edge) => edge,
            None => panic!("edge {} is not present in the subgraph", e),
        }
    }

    /// Deleted vertices have no incident edges.
    #[inline]
    fn incident_edges(&self, v: VertexIndex) -> &[EdgeIndex] {
        self.incident[v].as_deref().unwrap_or(&[])
    }
}
