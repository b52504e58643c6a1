//! Edit-operation costs and the vertex-level costs derived from them for the assignment
//! formulation of the graph edit distance.

use crate::assignment::{AssignmentSolver, Hungarian};
use crate::error::Result;
use crate::graph::LGraph;
use crate::graph_traits::{EdgeIndex, Graph, VertexIndex};
use crate::label_distance::{IdentityDistance, LabelDistance};
use ndarray::{s, Array2};
use std::fmt;
use std::sync::Arc;

/// Costs of the elementary edit operations on labeled graphs.
///
/// Insertions and deletions have fixed costs; relabeling delegates to a label distance.
pub struct GraphEditCosts<V, E> {
    pub vertex_deletion: f64,
    pub vertex_insertion: f64,
    pub edge_deletion: f64,
    pub edge_insertion: f64,
    vertex_label_distance: Box<dyn LabelDistance<V>>,
    edge_label_distance: Box<dyn LabelDistance<E>>,
}

impl<V, E> GraphEditCosts<V, E> {
    pub fn new(
        vertex_deletion: f64,
        vertex_insertion: f64,
        edge_deletion: f64,
        edge_insertion: f64,
        vertex_label_distance: Box<dyn LabelDistance<V>>,
        edge_label_distance: Box<dyn LabelDistance<E>>,
    ) -> GraphEditCosts<V, E> {
        GraphEditCosts {
            vertex_deletion,
            vertex_insertion,
            edge_deletion,
            edge_insertion,
            vertex_label_distance,
            edge_label_distance,
        }
    }

    /// Same cost for inserting and deleting a vertex, and likewise for edges.
    pub fn uniform(
        vertex_cost: f64,
        edge_cost: f64,
        vertex_label_distance: Box<dyn LabelDistance<V>>,
        edge_label_distance: Box<dyn LabelDistance<E>>,
    ) -> GraphEditCosts<V, E> {
        GraphEditCosts::new(
            vertex_cost,
            vertex_cost,
            edge_cost,
            edge_cost,
            vertex_label_distance,
            edge_label_distance,
        )
    }

    #[inline]
    pub fn vertex_relabeling(
        &self,
        g_edit: &LGraph<V, E>,
        v_edit: VertexIndex,
        g_target: &LGraph<V, E>,
        v_target: VertexIndex,
    ) -> f64 {
        self.vertex_label_distance
            .distance(g_edit.vertex_label(v_edit), g_target.vertex_label(v_target))
    }

    #[inline]
    pub fn edge_relabeling(
        &self,
        g_edit: &LGraph<V, E>,
        e_edit: EdgeIndex,
        g_target: &LGraph<V, E>,
        e_target: EdgeIndex,
    ) -> f64 {
        self.edge_label_distance
            .distance(g_edit.edge_label(e_edit), g_target.edge_label(e_target))
    }
}

impl<V: PartialEq + 'static, E: PartialEq + 'static> Default for GraphEditCosts<V, E> {
    /// Unit costs for all operations, identity distance on the labels.
    fn default() -> Self {
        GraphEditCosts::uniform(1.0, 1.0, Box::new(IdentityDistance), Box::new(IdentityDistance))
    }
}

impl<V, E> fmt::Debug for GraphEditCosts<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphEditCosts")
            .field("vertex_deletion", &self.vertex_deletion)
            .field("vertex_insertion", &self.vertex_insertion)
            .field("edge_deletion", &self.edge_deletion)
            .field("edge_insertion", &self.edge_insertion)
            .field("vertex_label_distance", &self.vertex_label_distance)
            .field("edge_label_distance", &self.edge_label_distance)
            .finish()
    }
}

/// Vertex-level costs used to fill the assignment cost matrix. They fold the edit costs of
/// the edges around a vertex into the cost of the vertex operation.
pub trait GraphEditAssignmentCosts<V, E>: fmt::Debug + Send + Sync {
    /// Cost of substituting `v_edit` in `g_edit` by `v_target` in `g_target`.
    fn vertex_substitution(
        &self,
        g_edit: &LGraph<V, E>,
        v_edit: VertexIndex,
        g_target: &LGraph<V, E>,
        v_target: VertexIndex,
    ) -> Result<f64>;

    fn vertex_deletion(&self, g: &LGraph<V, E>, v: VertexIndex) -> f64;

    fn vertex_insertion(&self, g_edit: &LGraph<V, E>, g_target: &LGraph<V, E>, v_target: VertexIndex) -> f64;
}

/// Cost of the edges that must be deleted or inserted when vertices of the given degrees
/// are substituted.
fn degree_difference<V, E>(gec: &GraphEditCosts<V, E>, n: usize, m: usize) -> f64 {
    if n > m {
        (n - m) as f64 * gec.edge_deletion
    } else {
        (m - n) as f64 * gec.edge_insertion
    }
}

/// Substitution accounts for the degree difference; insertion and deletion cost a plain
/// vertex operation.
pub struct SimpleAssignmentCosts<V, E> {
    costs: Arc<GraphEditCosts<V, E>>,
}

impl<V, E> SimpleAssignmentCosts<V, E> {
    pub fn new(costs: Arc<GraphEditCosts<V, E>>) -> Self {
        SimpleAssignmentCosts { costs }
    }
}

impl<V, E> GraphEditAssignmentCosts<V, E> for SimpleAssignmentCosts<V, E> {
    fn vertex_substitution(
        &self,
        g_edit: &LGraph<V, E>,
        v_edit: VertexIndex,
        g_target: &LGraph<V, E>,
        v_target: VertexIndex,
    ) -> Result<f64> {
        Ok(self.costs.vertex_relabeling(g_edit, v_edit, g_target, v_target)
            + degree_difference(&self.costs, g_edit.degree(v_edit), g_target.degree(v_target)))
    }

    fn vertex_deletion(&self, _g: &LGraph<V, E>, _v: VertexIndex) -> f64 {
        self.costs.vertex_deletion
    }

    fn vertex_insertion(&self, _g_edit: &LGraph<V, E>, _g_target: &LGraph<V, E>, _v_target: VertexIndex) -> f64 {
        self.costs.vertex_insertion
    }
}

/// Like [`SimpleAssignmentCosts`], but deleting or inserting a vertex also pays for all of
/// its incident edges. Equivalent to [`ExtendedAssignmentCosts`] when edge relabeling is
/// free, and cheaper to evaluate.
pub struct ExtendedSimpleAssignmentCosts<V, E> {
    costs: Arc<GraphEditCosts<V, E>>,
}

impl<V, E> ExtendedSimpleAssignmentCosts<V, E> {
    pub fn new(costs: Arc<GraphEditCosts<V, E>>) -> Self {
        ExtendedSimpleAssignmentCosts { costs }
    }
}

impl<V, E> GraphEditAssignmentCosts<V, E> for ExtendedSimpleAssignmentCosts<V, E> {
    fn vertex_substitution(
        &self,
        g_edit: &LGraph<V, E>,
        v_edit: VertexIndex,
        g_target: &LGraph<V, E>,
        v_target: VertexIndex,
    ) -> Result<f64> {
        Ok(self.costs.vertex_relabeling(g_edit, v_edit, g_target, v_target)
            + degree_difference(&self.costs, g_edit.degree(v_edit), g_target.degree(v_target)))
    }

    fn vertex_deletion(&self, g: &LGraph<V, E>, v: VertexIndex) -> f64 {
        self.costs.vertex_deletion + g.degree(v) as f64 * self.costs.edge_deletion
    }

    fn vertex_insertion(&self, _g_edit: &LGraph<V, E>, g_target: &LGraph<V, E>, v_target: VertexIndex) -> f64 {
        self.costs.vertex_insertion + g_target.degree(v_target) as f64 * self.costs.edge_insertion
    }
}

/// Substitution solves a nested assignment between the incident edges of both vertices,
/// so edge relabeling, deletion and insertion are accounted for jointly.
///
/// See Riesen and Bunke, "Approximate graph edit distance computation by means of
/// bipartite graph matching", Image and Vision Computing 27 (2009).
pub struct ExtendedAssignmentCosts<V, E> {
    costs: Arc<GraphEditCosts<V, E>>,
    solver: Box<dyn AssignmentSolver>,
}

impl<V, E> ExtendedAssignmentCosts<V, E> {
    pub fn new(costs: Arc<GraphEditCosts<V, E>>) -> Self {
        ExtendedAssignmentCosts::with_solver(costs, Box::new(Hungarian))
    }

    pub fn with_solver(costs: Arc<GraphEditCosts<V, E>>, solver: Box<dyn AssignmentSolver>) -> Self {
        ExtendedAssignmentCosts { costs, solver }
    }

    /// Padded cost matrix of the assignment between the incident edges of two vertices.
    pub fn edge_cost_matrix(
        &self,
        g_edit: &LGraph<V, E>,
        v_edit: VertexIndex,
        g_target: &LGraph<V, E>,
        v_target: VertexIndex,
    ) -> Array2<f64> {
        let edit_edges = g_edit.incident_edges(v_edit);
        let target_edges = g_target.incident_edges(v_target);
        let (n, m) = (edit_edges.len(), target_edges.len());
        let mut c = Array2::from_elem((n + m, n + m), f64::INFINITY);

        for (i, &e_edit) in edit_edges.iter().enumerate() {
            for (j, &e_target) in target_edges.iter().enumerate() {
                c[[i, j]] = self.costs.edge_relabeling(g_edit, e_edit, g_target, e_target);
            }
            c[[i, m + i]] = self.costs.edge_deletion;
        }
        for j in 0..m {
            c[[n + j, j]] = self.costs.edge_insertion;
        }
        c.slice_mut(s![n.., m..]).fill(0.0);
        c
    }
}

impl<V, E> GraphEditAssignmentCosts<V, E> for ExtendedAssignmentCosts<V, E> {
    fn vertex_substitution(
        &self,
        g_edit: &LGraph<V, E>,
        v_edit: VertexIndex,
        g_target: &LGraph<V, E>,
        v_target: VertexIndex,
    ) -> Result<f64> {
        let r = self.costs.vertex_relabeling(g_edit, v_edit, g_target, v_target);
        if g_edit.degree(v_edit) == 0 && g_target.degree(v_target) == 0 {
            return Ok(r);
        }
        let c = self.edge_cost_matrix(g_edit, v_edit, g_target, v_target);
        Ok(r + self.solver.minimum_cost(&c)?)
    }

    fn vertex_deletion(&self, g: &LGraph<V, E>, v: VertexIndex) -> f64 {
        self.costs.vertex_deletion + g.degree(v) as f64 * self.costs.edge_deletion
    }

    fn vertex_insertion(&self, _g_edit: &LGraph<V, E>, g_target: &LGraph<V, E>, v_target: VertexIndex) -> f64 {
        self.costs.vertex_insertion + g_target.degree(v_target) as f64 * self.costs.edge_insertion
    }
}

macro_rules! debug_costs {
    ($name:ident $(, $field:ident)*) => {
        impl<V, E> fmt::Debug for $name<V, E> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("costs", &self.costs)
                    $(.field(stringify!($field), &self.$field))*
                    .finish()
            }
        }
    };
}

debug_costs!(SimpleAssignmentCosts);
debug_costs!(ExtendedSimpleAssignmentCosts);
debug_costs!(ExtendedAssignmentCosts, solver);
