//! Tree metrics and the linear-time assignment algorithm under a tree metric.
//!
//! Objects are mapped to the vertices of a weighted rooted tree. Their distance is the
//! weight of the tree path between their images, where every vertex carries the weight of
//! the edge to its parent.

use crate::assignment::Assignment;
use crate::error::{Error, Result};
use crate::graph_traits::{Graph, VertexIndex};
use crate::property::VertexMap;
use crate::rooted_tree::RootedTree;
use crate::tiebreak::{DefaultTiebreak, TiebreakStrategy};
use log::trace;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::ops::{Deref, DerefMut};

/// A rooted tree with precomputed depths and parent-edge weights.
#[derive(Debug, Clone)]
pub struct TreeMetric {
    tree: RootedTree,
    depth: VertexMap<usize>,
    weight: VertexMap<f64>,
}

impl TreeMetric {
    pub fn new(tree: RootedTree, weight: VertexMap<f64>) -> Result<TreeMetric> {
        if weight.len() != tree.vertex_bound() {
            return Err(Error::InvalidParameter(format!(
                "{} weights for a tree with {} vertices",
                weight.len(),
                tree.vertex_bound()
            )));
        }
        let depth = tree.compute_depth()?;
        Ok(TreeMetric {
            tree,
            depth,
            weight,
        })
    }

    /// Every edge has weight 1.
    pub fn with_unit_weights(tree: RootedTree) -> Result<TreeMetric> {
        let weight = VertexMap::new(&tree, 1.0);
        TreeMetric::new(tree, weight)
    }

    pub fn tree(&self) -> &RootedTree {
        &self.tree
    }

    #[inline]
    pub fn depth(&self, v: VertexIndex) -> usize {
        self.depth[v]
    }

    /// Weight of the edge from `v` to its parent.
    #[inline]
    pub fn weight(&self, v: VertexIndex) -> f64 {
        self.weight[v]
    }

    /// Weight of the path between two tree vertices. Ascends from the deeper side until the
    /// depths agree, then from both sides until they meet.
    pub fn path_length(&self, mut a: VertexIndex, mut b: VertexIndex) -> f64 {
        let mut length = 0.0;
        while self.depth[a] < self.depth[b] {
            length += self.weight[b];
            b = self.tree.parent(b);
        }
        while self.depth[b] < self.depth[a] {
            length += self.weight[a];
            a = self.tree.parent(a);
        }
        while a != b {
            length += self.weight[a] + self.weight[b];
            a = self.tree.parent(a);
            b = self.tree.parent(b);
        }
        length
    }
}

/// Access to the tree metric underlying a [`TreeDistance`].
pub trait AsTreeMetric {
    fn metric(&self) -> &TreeMetric;
}

impl AsTreeMetric for TreeMetric {
    fn metric(&self) -> &TreeMetric {
        self
    }
}

/// Maps objects of type `T` onto the vertices of a tree metric.
pub trait TreeDistance<T: ?Sized>: AsTreeMetric {
    /// The tree vertex of `t`, if `t` is known to the metric.
    fn map_to_node(&self, t: &T) -> Option<VertexIndex>;

    fn compute(&self, a: &T, b: &T) -> Result<f64>
    where
        T: Debug,
    {
        let a = self.map_to_node(a).ok_or_else(|| unmapped(a))?;
        let b = self.map_to_node(b).ok_or_else(|| unmapped(b))?;
        Ok(self.metric().path_length(a, b))
    }
}

fn unmapped<T: Debug + ?Sized>(t: &T) -> Error {
    Error::UnmappedElement(format!("{:?}", t))
}

/// Tree vertices map to themselves.
impl TreeDistance<VertexIndex> for TreeMetric {
    fn map_to_node(&self, t: &VertexIndex) -> Option<VertexIndex> {
        if self.tree.contains_vertex(*t) {
            Some(*t)
        } else {
            None
        }
    }
}

/// Per-vertex bookkeeping of the tree assignment algorithm.
///
/// Between two solves every list is empty, every counter zero and nothing is marked.
#[derive(Debug, Clone, Default)]
pub struct SolverScratch {
    pub(crate) a_lists: Vec<Vec<usize>>,
    pub(crate) b_lists: Vec<Vec<usize>>,
    degree: Vec<usize>,
    marked: Vec<bool>,
    touched: Vec<VertexIndex>,
}

impl SolverScratch {
    pub fn new(tree_size: usize) -> SolverScratch {
        SolverScratch {
            a_lists: vec![Vec::new(); tree_size],
            b_lists: vec![Vec::new(); tree_size],
            degree: vec![0; tree_size],
            marked: vec![false; tree_size],
            touched: Vec::new(),
        }
    }

    fn fits(&self, tree_size: usize) -> bool {
        self.degree.len() >= tree_size
    }

    fn mark(&mut self, v: VertexIndex) {
        self.marked[v] = true;
        self.touched.push(v);
    }

    fn clear(&mut self) {
        for v in self.touched.drain(..) {
            self.a_lists[v].clear();
            self.b_lists[v].clear();
            self.degree[v] = 0;
            self.marked[v] = false;
        }
    }
}

/// Returns the scratch to a clean state however the solve ends.
struct ScratchGuard<'s>(&'s mut SolverScratch);

impl Deref for ScratchGuard<'_> {
    type Target = SolverScratch;

    fn deref(&self) -> &SolverScratch {
        self.0
    }
}

impl DerefMut for ScratchGuard<'_> {
    fn deref_mut(&mut self) -> &mut SolverScratch {
        self.0
    }
}

impl Drop for ScratchGuard<'_> {
    fn drop(&mut self) {
        self.0.clear();
    }
}

/// Solves the assignment problem between two multisets of equal size under a tree metric
/// in time linear in their size plus the size of the subtree spanning their images.
///
/// Elements sharing a tree vertex are paired first; the surplus moves up to the parent.
/// Since the metric is a tree metric, this greedy bottom-up pairing is optimal.
#[derive(Debug)]
pub struct TreeDistanceAssignmentSolver<'d, D: ?Sized> {
    dist: &'d D,
    scratch: SolverScratch,
}

impl<'d, D: AsTreeMetric + ?Sized> TreeDistanceAssignmentSolver<'d, D> {
    pub fn new(dist: &'d D) -> Self {
        let scratch = SolverScratch::new(dist.metric().tree().vertex_bound());
        TreeDistanceAssignmentSolver { dist, scratch }
    }

    /// Reuses scratch state from an earlier solver over the same tree. Scratch that is too
    /// small for the tree is replaced.
    pub fn with_scratch(dist: &'d D, scratch: SolverScratch) -> Self {
        let n = dist.metric().tree().vertex_bound();
        let scratch = if scratch.fits(n) {
            scratch
        } else {
            SolverScratch::new(n)
        };
        TreeDistanceAssignmentSolver { dist, scratch }
    }

    pub fn into_scratch(self) -> SolverScratch {
        self.scratch
    }

    /// Assignment with the default tiebreak.
    pub fn solve<T: Debug>(&mut self, a: &[T], b: &[T]) -> Result<Assignment>
    where
        D: TreeDistance<T>,
    {
        self.solve_with(a, b, &mut DefaultTiebreak)
    }

    pub fn minimum_cost<T: Debug>(&mut self, a: &[T], b: &[T]) -> Result<f64>
    where
        D: TreeDistance<T>,
    {
        let assignment = self.solve(a, b)?;
        let mut cost = 0.0;
        for (i, j) in assignment.iter().enumerate() {
            if let Some(j) = j {
                cost += self.dist.compute(&a[i], &b[*j])?;
            }
        }
        Ok(cost)
    }

    /// Computes a minimum-cost assignment of `a` to `b`. The strategy decides the leaf
    /// order and which elements at a vertex are paired; it cannot change the cost.
    pub fn solve_with<T: Debug, S: TiebreakStrategy<T> + ?Sized>(
        &mut self,
        a: &[T],
        b: &[T],
        strategy: &mut S,
    ) -> Result<Assignment>
    where
        D: TreeDistance<T>,
    {
        if a.len() != b.len() {
            return Err(Error::CardinalityMismatch {
                left: a.len(),
                right: b.len(),
            });
        }
        let metric = self.dist.metric();
        let tree = metric.tree();
        let mut s = ScratchGuard(&mut self.scratch);

        // group the elements by tree vertex
        let mut occupied = Vec::new();
        let mut min_depth = usize::MAX;
        for (side, elements) in [a, b].into_iter().enumerate() {
            for (i, t) in elements.iter().enumerate() {
                let v = self.dist.map_to_node(t).ok_or_else(|| unmapped(t))?;
                if !s.marked[v] {
                    s.mark(v);
                    occupied.push(v);
                    min_depth = min_depth.min(metric.depth(v));
                }
                if side == 0 {
                    s.a_lists[v].push(i);
                } else {
                    s.b_lists[v].push(i);
                }
            }
        }
        if occupied.is_empty() {
            return Ok(Vec::new());
        }

        // mark the subtree spanning the occupied vertices up to depth min_depth and count
        // the children of every vertex within it
        let mut frontier = Vec::new();
        for &start in &occupied {
            let mut v = start;
            let mut joined = false;
            while metric.depth(v) > min_depth {
                let p = tree.parent(v);
                s.degree[p] += 1;
                if s.marked[p] {
                    joined = true;
                    break;
                }
                s.mark(p);
                v = p;
            }
            if !joined {
                frontier.push(v);
            }
        }
        // ascend together until a single common ancestor remains
        while frontier.len() > 1 {
            let mut parents = Vec::new();
            for &r in &frontier {
                let p = tree.parent(r);
                s.degree[p] += 1;
                if !s.marked[p] {
                    s.mark(p);
                    parents.push(p);
                }
            }
            frontier = parents;
        }
        let root = frontier[0];

        let leaves: Vec<VertexIndex> = occupied
            .iter()
            .copied()
            .filter(|&v| s.degree[v] == 0)
            .collect();
        trace!(
            "tree assignment of {} elements, {} occupied vertices, {} leaves",
            a.len(),
            occupied.len(),
            leaves.len()
        );
        let mut leaves: VecDeque<VertexIndex> = strategy.leaf_order(a, b, &s.a_lists, leaves).into();

        let mut assignment = vec![None; a.len()];
        while let Some(l) = leaves.pop_front() {
            let mut ea = std::mem::take(&mut s.a_lists[l]);
            let mut eb = std::mem::take(&mut s.b_lists[l]);
            strategy.pair_elements(a, b, &mut ea, &mut eb, l, &mut assignment);

            // propagate the surplus to the parent
            if l != root {
                let p = tree.parent(l);
                s.a_lists[p].append(&mut ea);
                s.b_lists[p].append(&mut eb);
                s.degree[p] -= 1;
                if s.degree[p] == 0 {
                    leaves.push_back(p);
                }
            }
            s.a_lists[l] = ea;
            s.b_lists[l] = eb;
        }
        Ok(assignment)
    }
}
