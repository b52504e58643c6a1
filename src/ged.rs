//! Graph edit distance approximated by an optimal vertex assignment.
//!
//! The vertices of both graphs, padded with dummies for deletion and insertion, are
//! assigned to each other. The assignment is then read as an edit path whose cost is the
//! reported distance. It is an upper bound on the exact graph edit distance.

use crate::assignment::{Assignment, AssignmentSolver, Hungarian};
use crate::edit_costs::{ExtendedAssignmentCosts, GraphEditAssignmentCosts, GraphEditCosts};
use crate::error::Result;
use crate::graph::LGraph;
use crate::graph_traits::Graph;
use log::{debug, info};
use ndarray::Array2;
use rayon::prelude::*;
use std::fmt::Debug;
use std::sync::Arc;

/// Cost of the edit path induced by an assignment between the vertices of `g_edit` and
/// `g_target`.
///
/// The assignment has one row per vertex of `g_edit` followed by one row per insertion
/// dummy. Rows of `g_edit` vertices mapped to a column `>= m` are deleted; dummy rows
/// mapped to a column `< m` insert that target vertex. An edge is relabeled when both its
/// endpoints are kept and their images are adjacent, otherwise it is deleted. Target edges
/// left over are inserted.
pub fn edit_costs<V, E>(
    g_edit: &LGraph<V, E>,
    g_target: &LGraph<V, E>,
    costs: &GraphEditCosts<V, E>,
    assignment: &[Option<usize>],
) -> f64 {
    let n = g_edit.vertex_count();
    let m = g_target.vertex_count();
    let image = |v: usize| assignment[v].filter(|&j| j < m);

    let mut r = 0.0;

    // vertex deletion and relabeling
    for v in g_edit.vertices() {
        match image(v) {
            Some(w) => r += costs.vertex_relabeling(g_edit, v, g_target, w),
            None => r += costs.vertex_deletion,
        }
    }

    // vertex insertion
    for row in assignment.iter().skip(n) {
        if matches!(row, Some(j) if *j < m) {
            r += costs.vertex_insertion;
        }
    }

    // edge relabeling and deletion
    let mut matched = vec![false; g_target.edge_bound()];
    for e in g_edit.edges() {
        let edge = g_edit.edge(e);
        let e_target = match (image(edge.first()), image(edge.second())) {
            (Some(u), Some(w)) => g_target.get_edge(u, w),
            _ => None,
        };
        match e_target {
            Some(f) if !matched[f] => {
                r += costs.edge_relabeling(g_edit, e, g_target, f);
                matched[f] = true;
            }
            _ => r += costs.edge_deletion,
        }
    }

    // edge insertion
    r += matched.iter().filter(|&&x| !x).count() as f64 * costs.edge_insertion;
    r
}

/// Approximates the graph edit distance with an assignment solved on the full
/// `(n + m) x (n + m)` cost matrix.
#[derive(Debug)]
pub struct GraphEditDistanceAssignment<V, E> {
    solver: Box<dyn AssignmentSolver>,
    costs: Arc<GraphEditCosts<V, E>>,
    assignment_costs: Box<dyn GraphEditAssignmentCosts<V, E>>,
}

impl<V: 'static, E: 'static> GraphEditDistanceAssignment<V, E> {
    /// Hungarian solver with nested edge assignments.
    pub fn new(costs: Arc<GraphEditCosts<V, E>>) -> Self {
        let assignment_costs = Box::new(ExtendedAssignmentCosts::new(costs.clone()));
        GraphEditDistanceAssignment::with_solver(Box::new(Hungarian), costs, assignment_costs)
    }
}

impl<V, E> GraphEditDistanceAssignment<V, E> {
    pub fn with_solver(
        solver: Box<dyn AssignmentSolver>,
        costs: Arc<GraphEditCosts<V, E>>,
        assignment_costs: Box<dyn GraphEditAssignmentCosts<V, E>>,
    ) -> Self {
        GraphEditDistanceAssignment {
            solver,
            costs,
            assignment_costs,
        }
    }

    pub fn costs(&self) -> &GraphEditCosts<V, E> {
        &self.costs
    }

    /// Builds the cost matrix: substitutions in the upper left block, deletions on the
    /// diagonal of the upper right block, insertions on the diagonal of the lower left
    /// block and zeros in the lower right block. Off-diagonal cells of the deletion and
    /// insertion blocks are forbidden.
    pub fn cost_matrix(&self, g_edit: &LGraph<V, E>, g_target: &LGraph<V, E>) -> Result<Array2<f64>> {
        let n = g_edit.vertex_count();
        let m = g_target.vertex_count();
        let mut c = Array2::from_elem((n + m, n + m), f64::INFINITY);

        for i in 0..n {
            for j in 0..m {
                c[[i, j]] = self
                    .assignment_costs
                    .vertex_substitution(g_edit, i, g_target, j)?;
            }
            c[[i, m + i]] = self.assignment_costs.vertex_deletion(g_edit, i);
        }
        for j in 0..m {
            c[[n + j, j]] = self.assignment_costs.vertex_insertion(g_edit, g_target, j);
        }
        for i in n..(n + m) {
            for j in m..(n + m) {
                c[[i, j]] = 0.0;
            }
        }
        Ok(c)
    }

    /// Solves the vertex assignment and returns it along with the cost of its edit path.
    pub fn compute_with_assignment(
        &self,
        g_edit: &LGraph<V, E>,
        g_target: &LGraph<V, E>,
    ) -> Result<(f64, Assignment)> {
        let c = self.cost_matrix(g_edit, g_target)?;
        let assignment = self.solver.solve(&c)?;
        let d = edit_costs(g_edit, g_target, &self.costs, &assignment);
        debug!(
            "{}x{} vertices, edit path cost {}",
            g_edit.vertex_count(),
            g_target.vertex_count(),
            d
        );
        Ok((d, assignment))
    }

    pub fn compute(&self, g_edit: &LGraph<V, E>, g_target: &LGraph<V, E>) -> Result<f64> {
        self.compute_with_assignment(g_edit, g_target).map(|(d, _)| d)
    }
}

/// A distance between the members of a fixed collection, addressed by position.
pub trait DatasetDistance: Sync {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn compute_pair(&self, i: usize, j: usize) -> Result<f64>;

    /// All pairwise distances. The pairs `i < j` are evaluated in parallel and mirrored;
    /// the diagonal is zero.
    fn compute_all(&self) -> Result<Array2<f64>> {
        let n = self.len();
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .collect();
        info!("computing {} pairwise distances", pairs.len());
        let values = pairs
            .par_iter()
            .map(|&(i, j)| self.compute_pair(i, j))
            .collect::<Result<Vec<f64>>>()?;

        let mut d = Array2::zeros((n, n));
        for (&(i, j), x) in pairs.iter().zip(values) {
            d[[i, j]] = x;
            d[[j, i]] = x;
        }
        Ok(d)
    }
}

/// [`GraphEditDistanceAssignment`] over a dataset of graphs.
#[derive(Debug)]
pub struct QuadraticGed<'a, V, E> {
    dataset: &'a [LGraph<V, E>],
    ged: GraphEditDistanceAssignment<V, E>,
}

impl<'a, V, E> QuadraticGed<'a, V, E> {
    pub fn new(dataset: &'a [LGraph<V, E>], ged: GraphEditDistanceAssignment<V, E>) -> Self {
        QuadraticGed { dataset, ged }
    }

    pub fn ged(&self) -> &GraphEditDistanceAssignment<V, E> {
        &self.ged
    }
}

impl<'a, V: Sync, E: Sync> DatasetDistance for QuadraticGed<'a, V, E> {
    fn len(&self) -> usize {
        self.dataset.len()
    }

    fn compute_pair(&self, i: usize, j: usize) -> Result<f64> {
        self.ged.compute(&self.dataset[i], &self.dataset[j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::GreedyBasic;
    use crate::edit_costs::ExtendedSimpleAssignmentCosts;
    use approx::assert_relative_eq;

    fn triangle_with_tail() -> LGraph<char, ()> {
        let mut g = LGraph::new();
        for l in ['C', 'C', 'O', 'N'] {
            g.add_vertex(l);
        }
        g.add_edge(0, 1, ());
        g.add_edge(1, 2, ());
        g.add_edge(2, 0, ());
        g.add_edge(2, 3, ());
        g
    }

    #[test]
    fn test_identical_graphs() {
        let g = triangle_with_tail();
        let ged = GraphEditDistanceAssignment::new(Arc::new(GraphEditCosts::default()));
        let (d, assignment) = ged.compute_with_assignment(&g, &g).unwrap();
        assert_relative_eq!(0.0, d);
        assert_eq!(Some(3), assignment[3]);
    }

    #[test]
    fn test_cost_matrix_layout() {
        let g = triangle_with_tail();
        let mut h = LGraph::new();
        h.add_vertex('C');
        let ged = GraphEditDistanceAssignment::new(Arc::new(GraphEditCosts::default()));
        let c = ged.cost_matrix(&g, &h).unwrap();
        assert_eq!((5, 5), c.dim());
        // deleting vertex 2 and its three edges
        assert_relative_eq!(4.0, c[[2, 3]]);
        assert_eq!(f64::INFINITY, c[[2, 2]]);
        assert_relative_eq!(1.0, c[[4, 0]]);
        assert_eq!(0.0, c[[4, 4]]);
    }

    #[test]
    fn test_deletion_path() {
        let g = triangle_with_tail();
        // drop the N and its edge
        let mut h = LGraph::new();
        for l in ['C', 'C', 'O'] {
            h.add_vertex(l);
        }
        h.add_edge(0, 1, ());
        h.add_edge(1, 2, ());
        h.add_edge(2, 0, ());

        let costs = Arc::new(GraphEditCosts::default());
        let exact = GraphEditDistanceAssignment::new(costs.clone());
        assert_relative_eq!(2.0, exact.compute(&g, &h).unwrap());
        assert_relative_eq!(2.0, exact.compute(&h, &g).unwrap());

        let greedy = GraphEditDistanceAssignment::with_solver(
            Box::new(GreedyBasic),
            costs.clone(),
            Box::new(ExtendedSimpleAssignmentCosts::new(costs)),
        );
        assert!(greedy.compute(&g, &h).unwrap() >= 2.0);
    }

    #[test]
    fn test_edit_costs_of_explicit_assignment() {
        let g = triangle_with_tail();
        let costs = GraphEditCosts::default();
        // swap the two carbons, keep the rest
        let swap = vec![Some(1), Some(0), Some(2), Some(3), Some(4), Some(5), Some(6), Some(7)];
        assert_relative_eq!(0.0, edit_costs(&g, &g, &costs, &swap));
        // map O to N and N to O: relabel both, lose edges 0-2 and 1-2
        let cross = vec![Some(0), Some(1), Some(3), Some(2), Some(4), Some(5), Some(6), Some(7)];
        assert_relative_eq!(6.0, edit_costs(&g, &g, &costs, &cross));
    }

    #[test]
    fn test_empty_graphs() {
        let e: LGraph<char, ()> = LGraph::new();
        let g = triangle_with_tail();
        let ged = GraphEditDistanceAssignment::new(Arc::new(GraphEditCosts::default()));
        assert_relative_eq!(0.0, ged.compute(&e, &e).unwrap());
        assert_relative_eq!(8.0, ged.compute(&e, &g).unwrap());
    }
}
