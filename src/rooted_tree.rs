use crate::error::{Error, Result};
use crate::graph::AdjListGraph;
use crate::graph_traits::{Edge, EdgeIndex, Graph, VertexIndex};
use crate::property::VertexMap;
use std::collections::VecDeque;

/// A rooted tree stored in an arena. Parent and child links are vertex indices.
///
/// The root is its own parent, so ascending loops reach a fixed point at the root.
/// Use [`RootedTree::create_root`] and [`RootedTree::create_child`] to build the tree;
/// the underlying adjacency lists are kept consistent with the parent links.
#[derive(Debug, Clone, Default)]
pub struct RootedTree {
    graph: AdjListGraph,
    parent: Vec<VertexIndex>,
    children: Vec<Vec<VertexIndex>>,
    root: Option<VertexIndex>,
}

impl RootedTree {
    pub fn new() -> RootedTree {
        RootedTree::default()
    }

    pub fn with_capacity(n: usize) -> RootedTree {
        RootedTree {
            graph: AdjListGraph::with_capacity(n, n.saturating_sub(1)),
            parent: Vec::with_capacity(n),
            children: Vec::with_capacity(n),
            root: None,
        }
    }

    pub fn root(&self) -> Option<VertexIndex> {
        self.root
    }

    pub fn create_root(&mut self) -> Result<VertexIndex> {
        if self.root.is_some() {
            return Err(Error::RootExists);
        }
        let r = self.push_vertex();
        self.parent[r] = r;
        self.root = Some(r);
        Ok(r)
    }

    /// Adds a new leaf below `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is not a vertex of this tree.
    pub fn create_child(&mut self, parent: VertexIndex) -> VertexIndex {
        assert!(parent < self.parent.len());
        let c = self.push_vertex();
        self.parent[c] = parent;
        self.children[parent].push(c);
        self.graph.create_edge(parent, c);
        c
    }

    /// Re-parents `child` below `new_parent`, moving the tree edge along.
    pub fn set_parent(&mut self, child: VertexIndex, new_parent: VertexIndex) -> Result<()> {
        if Some(child) == self.root {
            return Err(Error::ReparentRoot);
        }
        if child >= self.parent.len() {
            return Err(Error::InvalidVertex(child));
        }
        if new_parent >= self.parent.len() {
            return Err(Error::InvalidVertex(new_parent));
        }
        let current = self.parent[child];
        let e = self
            .graph
            .get_edge(child, current)
            .ok_or(Error::InvalidVertex(child))?;
        self.graph.reattach_edge(e, child, new_parent);
        self.children[current].retain(|&c| c != child);
        self.children[new_parent].push(child);
        self.parent[child] = new_parent;
        Ok(())
    }

    #[inline]
    pub fn parent(&self, v: VertexIndex) -> VertexIndex {
        self.parent[v]
    }

    #[inline]
    pub fn children(&self, v: VertexIndex) -> &[VertexIndex] {
        &self.children[v]
    }

    #[inline]
    pub fn is_leaf(&self, v: VertexIndex) -> bool {
        self.children[v].is_empty()
    }

    /// Leaves in breadth-first order from the root.
    pub fn find_leaves(&self) -> Vec<VertexIndex> {
        let mut leaves = Vec::new();
        let mut queue: VecDeque<VertexIndex> = self.root.into_iter().collect();
        while let Some(v) = queue.pop_front() {
            if self.is_leaf(v) {
                leaves.push(v);
            } else {
                queue.extend(self.children[v].iter().copied());
            }
        }
        leaves
    }

    /// Depth of every vertex; the root has depth 0.
    pub fn compute_depth(&self) -> Result<VertexMap<usize>> {
        let root = self.root.ok_or(Error::MissingRoot)?;
        let mut depth = VertexMap::new(self, 0);
        let mut level = vec![root];
        let mut current = 0;
        while !level.is_empty() {
            let mut next_level = Vec::new();
            for v in level {
                depth[v] = current;
                next_level.extend(self.children[v].iter().copied());
            }
            level = next_level;
            current += 1;
        }
        Ok(depth)
    }

    /// Lowest common ancestor in O(depth(a) + depth(b)) using precomputed depths.
    pub fn lca(&self, mut a: VertexIndex, mut b: VertexIndex, depth: &VertexMap<usize>) -> VertexIndex {
        while depth[a] < depth[b] {
            b = self.parent[b];
        }
        while depth[b] < depth[a] {
            a = self.parent[a];
        }
        while a != b {
            a = self.parent[a];
            b = self.parent[b];
        }
        a
    }

    fn push_vertex(&mut self) -> VertexIndex {
        let v = self.graph.create_vertex();
        self.parent.push(v);
        self.children.push(Vec::new());
        v
    }
}

impl Graph for RootedTree {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_own_parent() {
        let mut t = RootedTree::new();
        let r = t.create_root().unwrap();
        assert_eq!(r, t.parent(r));
        assert_eq!(Err(Error::RootExists), t.create_root());
    }

    #[test]
    fn test_set_parent() {
        let mut t = RootedTree::new();
        let r = t.create_root().unwrap();
        let a = t.create_child(r);
        let b = t.create_child(r);
        let c = t.create_child(a);

        t.set_parent(c, b).unwrap();
        assert_eq!(b, t.parent(c));
        assert!(t.children(a).is_empty());
        assert_eq!(&[c], t.children(b));
        assert!(t.has_edge(b, c));
        assert!(!t.has_edge(a, c));
        assert_eq!(Err(Error::ReparentRoot), t.set_parent(r, a));
    }

    #[test]
    fn test_depth_leaves_lca() {
        let mut t = RootedTree::new();
        let r = t.create_root().unwrap();
        let a = t.create_child(r);
        let b = t.create_child(r);
        let c = t.create_child(a);
        let d = t.create_child(a);

        let depth = t.compute_depth().unwrap();
        assert_eq!(0, depth[r]);
        assert_eq!(2, depth[d]);
        assert_eq!(vec![b, c, d], t.find_leaves());
        assert_eq!(a, t.lca(c, d, &depth));
        assert_eq!(r, t.lca(c, b, &depth));
        assert_eq!(a, t.lca(a, d, &depth));
    }
}
