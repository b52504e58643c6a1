//! Tree metrics on the vertices of a graph dataset, and the linear-time graph edit distance
//! estimator built on them.
//!
//! Every vertex of every graph, plus a deletion and an insertion dummy, is mapped to a
//! node of one rooted tree. The tree comes from colour refinement for discrete labels, or
//! from bisecting k-means for real-valued labels. The dummies hang below an auxiliary child
//! of the root on zero-weight edges, so deleting or inserting any vertex costs its depth
//! plus one, and a deletion dummy paired with an insertion dummy is free.

use crate::assignment::Assignment;
use crate::clustering::{BisectingKMeans, HierarchicalClustering};
use crate::edit_costs::{GraphEditAssignmentCosts, GraphEditCosts};
use crate::error::{Error, Result};
use crate::ged::{edit_costs, DatasetDistance};
use crate::graph::LGraph;
use crate::graph_traits::{Graph, VertexIndex};
use crate::label_distance::RealValued;
use crate::property::VertexMap;
use crate::refinement::DatasetRefinement;
use crate::rooted_tree::RootedTree;
use crate::tiebreak::{AmenableTiebreak, DefaultTiebreak, RandomTiebreak, Tiebreak};
use crate::tree_distance::{AsTreeMetric, SolverScratch, TreeDistance, TreeDistanceAssignmentSolver, TreeMetric};
use log::debug;
use ndarray::Array2;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

/// Number of 2-means runs per bisection when building a clustering tree.
const BISECTION_RUNS: usize = 3;

/// An element of the padded vertex multisets compared by the linear estimator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GraphVertex {
    /// Vertex `vertex` of graph `graph` of the dataset.
    Vertex { graph: usize, vertex: VertexIndex },
    DeletionDummy,
    InsertionDummy,
}

impl GraphVertex {
    /// The graph vertex, or `None` for a dummy.
    pub fn vertex(&self) -> Option<VertexIndex> {
        match *self {
            GraphVertex::Vertex { vertex, .. } => Some(vertex),
            _ => None,
        }
    }
}

/// A tree metric over all vertices of a dataset.
#[derive(Debug, Clone)]
pub struct GraphVertexTreeDistance {
    metric: TreeMetric,
    node_of: Vec<VertexMap<VertexIndex>>,
    deletion: VertexIndex,
    insertion: VertexIndex,
}

impl GraphVertexTreeDistance {
    /// Tree of the colour classes of `iterations` refinement rounds. Level 1 holds the
    /// label classes, level `i + 1` the colours after round `i`. Every colour is a child of
    /// the colour it refines.
    pub fn discrete<V: Hash + Eq, E: Hash + Eq>(
        dataset: &[LGraph<V, E>],
        iterations: usize,
    ) -> Result<GraphVertexTreeDistance> {
        let mut tree = RootedTree::new();
        let root = tree.create_root()?;
        let mut node_of: Vec<VertexMap<VertexIndex>> =
            dataset.iter().map(|g| VertexMap::new(g, root)).collect();
        let mut node_of_color: Vec<Option<VertexIndex>> = Vec::new();

        let mut refinement = DatasetRefinement::new(dataset);
        for round in 0..=iterations {
            if round > 0 {
                refinement.refine();
            }
            node_of_color.resize(refinement.color_bound(), None);
            for (g, colors) in refinement.colors().iter().enumerate() {
                for v in dataset[g].vertices() {
                    let parent = node_of[g][v];
                    let node = *node_of_color[colors[v]].get_or_insert_with(|| tree.create_child(parent));
                    node_of[g][v] = node;
                }
            }
        }
        GraphVertexTreeDistance::with_dummies(tree, node_of)
    }

    /// Tree of a bisecting k-means clustering of the vertex labels into at most
    /// `partitions` clusters. Vertices sit at the leaf of their cluster.
    pub fn continuous<V: RealValued, E>(
        dataset: &[LGraph<V, E>],
        partitions: usize,
        seed: u64,
    ) -> Result<GraphVertexTreeDistance> {
        let mut values = Vec::new();
        let mut dim = None;
        let mut rows = 0;
        for g in dataset {
            for v in g.vertices() {
                let x = g.vertex_label(v).real_values();
                match dim {
                    None => dim = Some(x.len()),
                    Some(d) if d != x.len() => {
                        return Err(Error::UnsupportedLabels(format!(
                            "real-valued labels of dimension {} and {}",
                            d,
                            x.len()
                        )))
                    }
                    Some(_) => {}
                }
                values.extend_from_slice(x);
                rows += 1;
            }
        }
        let points = Array2::from_shape_vec((rows, dim.unwrap_or(0)), values)
            .map_err(|e| Error::InvalidParameter(e.to_string()))?;

        let mut clustering = BisectingKMeans::new(BISECTION_RUNS, partitions, seed)?;
        let (tree, leaf_of) = clustering.cluster(&points)?;
        let mut leaves = leaf_of.into_iter();
        let node_of = dataset
            .iter()
            .map(|g| VertexMap::from_vec(leaves.by_ref().take(g.vertex_count()).collect()))
            .collect();
        GraphVertexTreeDistance::with_dummies(tree, node_of)
    }

    fn with_dummies(mut tree: RootedTree, node_of: Vec<VertexMap<VertexIndex>>) -> Result<GraphVertexTreeDistance> {
        let root = tree.root().ok_or(Error::MissingRoot)?;
        let dummy = tree.create_child(root);
        let deletion = tree.create_child(dummy);
        let insertion = tree.create_child(dummy);
        let mut weight = VertexMap::new(&tree, 1.0);
        weight[deletion] = 0.0;
        weight[insertion] = 0.0;
        debug!(
            "tree metric with {} nodes over {} graphs",
            tree.vertex_count(),
            node_of.len()
        );
        Ok(GraphVertexTreeDistance {
            metric: TreeMetric::new(tree, weight)?,
            node_of,
            deletion,
            insertion,
        })
    }

    /// Number of graphs covered.
    pub fn len(&self) -> usize {
        self.node_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_of.is_empty()
    }

    /// The padded multisets of graphs `i` and `j`: the vertices of `i` followed by one
    /// deletion dummy per vertex of `j`, and the vertices of `j` followed by one insertion
    /// dummy per vertex of `i`.
    pub fn padded_vertices(&self, i: usize, j: usize) -> Result<(Vec<GraphVertex>, Vec<GraphVertex>)> {
        let n = self.graph_size(i)?;
        let m = self.graph_size(j)?;
        let a = (0..n)
            .map(|vertex| GraphVertex::Vertex { graph: i, vertex })
            .chain(std::iter::repeat(GraphVertex::DeletionDummy).take(m))
            .collect();
        let b = (0..m)
            .map(|vertex| GraphVertex::Vertex { graph: j, vertex })
            .chain(std::iter::repeat(GraphVertex::InsertionDummy).take(n))
            .collect();
        Ok((a, b))
    }

    /// Tree distances between the padded multisets of graphs `i` and `j`, as a square
    /// matrix that any assignment solver accepts.
    pub fn assignment_cost_matrix(&self, i: usize, j: usize) -> Result<Array2<f64>> {
        let (a, b) = self.padded_vertices(i, j)?;
        let mut c = Array2::zeros((a.len(), b.len()));
        for (r, x) in a.iter().enumerate() {
            for (s, y) in b.iter().enumerate() {
                c[[r, s]] = self.compute(x, y)?;
            }
        }
        Ok(c)
    }

    fn graph_size(&self, i: usize) -> Result<usize> {
        self.node_of
            .get(i)
            .map(VertexMap::len)
            .ok_or_else(|| Error::InvalidParameter(format!("graph {} is not in the dataset", i)))
    }
}

impl AsTreeMetric for GraphVertexTreeDistance {
    fn metric(&self) -> &TreeMetric {
        &self.metric
    }
}

impl TreeDistance<GraphVertex> for GraphVertexTreeDistance {
    fn map_to_node(&self, t: &GraphVertex) -> Option<VertexIndex> {
        match *t {
            GraphVertex::Vertex { graph, vertex } => self.node_of.get(graph)?.get(vertex).copied(),
            GraphVertex::DeletionDummy => Some(self.deletion),
            GraphVertex::InsertionDummy => Some(self.insertion),
        }
    }
}

/// Vertex-level edit costs read off a [`GraphVertexTreeDistance`], so that the matrix
/// solvers of [`GraphEditDistanceAssignment`] can run on tree costs. Substitution costs
/// the tree distance of the two vertices; deletion and insertion cost the distance to
/// the respective dummy.
///
/// Graphs are recognised by their address in the dataset slice the costs were created
/// for. Substituting a vertex of any other graph fails with
/// [`Error::UnmappedElement`], deleting or inserting one costs infinity.
///
/// [`GraphEditDistanceAssignment`]: crate::ged::GraphEditDistanceAssignment
#[derive(Debug, Clone)]
pub struct TreeDistanceEditCosts {
    tree: Arc<GraphVertexTreeDistance>,
    graphs: Vec<usize>,
}

impl TreeDistanceEditCosts {
    pub fn new<V, E>(tree: Arc<GraphVertexTreeDistance>, dataset: &[LGraph<V, E>]) -> Result<Self> {
        if tree.len() != dataset.len() {
            return Err(Error::InvalidParameter(format!(
                "tree metric covers {} graphs, dataset has {}",
                tree.len(),
                dataset.len()
            )));
        }
        let graphs = dataset.iter().map(|g| g as *const LGraph<V, E> as usize).collect();
        Ok(TreeDistanceEditCosts { tree, graphs })
    }

    pub fn tree(&self) -> &GraphVertexTreeDistance {
        &self.tree
    }

    fn graph_vertex<V, E>(&self, g: &LGraph<V, E>, vertex: VertexIndex) -> Result<GraphVertex> {
        let address = g as *const LGraph<V, E> as usize;
        self.graphs
            .iter()
            .position(|&a| a == address)
            .map(|graph| GraphVertex::Vertex { graph, vertex })
            .ok_or_else(|| Error::UnmappedElement(format!("vertex {} of a graph outside the dataset", vertex)))
    }

    fn distance_to<V, E>(&self, g: &LGraph<V, E>, vertex: VertexIndex, dummy: GraphVertex) -> f64 {
        self.graph_vertex(g, vertex)
            .and_then(|x| self.tree.compute(&x, &dummy))
            .unwrap_or(f64::INFINITY)
    }
}

impl<V, E> GraphEditAssignmentCosts<V, E> for TreeDistanceEditCosts {
    fn vertex_substitution(
        &self,
        g_edit: &LGraph<V, E>,
        v_edit: VertexIndex,
        g_target: &LGraph<V, E>,
        v_target: VertexIndex,
    ) -> Result<f64> {
        let a = self.graph_vertex(g_edit, v_edit)?;
        let b = self.graph_vertex(g_target, v_target)?;
        self.tree.compute(&a, &b)
    }

    fn vertex_deletion(&self, g: &LGraph<V, E>, v: VertexIndex) -> f64 {
        self.distance_to(g, v, GraphVertex::DeletionDummy)
    }

    fn vertex_insertion(&self, _g_edit: &LGraph<V, E>, g_target: &LGraph<V, E>, v_target: VertexIndex) -> f64 {
        self.distance_to(g_target, v_target, GraphVertex::InsertionDummy)
    }
}

/// Graph edit distance from an optimal assignment under a tree metric, in time linear in
/// the size of the graphs.
///
/// The assignment minimises the tree distance; the reported distance is the cost of the
/// induced edit path under `costs`, as for [`GraphEditDistanceAssignment`].
///
/// [`GraphEditDistanceAssignment`]: crate::ged::GraphEditDistanceAssignment
#[derive(Debug)]
pub struct LinearTreeGed<'a, V, E> {
    dataset: &'a [LGraph<V, E>],
    costs: Arc<GraphEditCosts<V, E>>,
    tree: GraphVertexTreeDistance,
    tiebreak: Tiebreak,
    scratch: Mutex<Vec<SolverScratch>>,
}

impl<'a, V, E> LinearTreeGed<'a, V, E> {
    pub fn new(
        dataset: &'a [LGraph<V, E>],
        costs: Arc<GraphEditCosts<V, E>>,
        tree: GraphVertexTreeDistance,
        tiebreak: Tiebreak,
    ) -> Result<Self> {
        if tree.len() != dataset.len() {
            return Err(Error::InvalidParameter(format!(
                "tree metric covers {} graphs, dataset has {}",
                tree.len(),
                dataset.len()
            )));
        }
        Ok(LinearTreeGed {
            dataset,
            costs,
            tree,
            tiebreak,
            scratch: Mutex::new(Vec::new()),
        })
    }

    pub fn tree(&self) -> &GraphVertexTreeDistance {
        &self.tree
    }

    pub fn tiebreak(&self) -> Tiebreak {
        self.tiebreak
    }

    /// Assignment between the padded vertex multisets of graphs `i` and `j`, along with
    /// the cost of its edit path from `i` to `j`.
    pub fn compute_with_assignment(&self, i: usize, j: usize) -> Result<(f64, Assignment)> {
        let (a, b) = self.tree.padded_vertices(i, j)?;
        let scratch = self.lock_pool().pop().unwrap_or_default();
        let mut solver = TreeDistanceAssignmentSolver::with_scratch(&self.tree, scratch);
        let solved = match self.tiebreak {
            Tiebreak::Default => solver.solve_with(&a, &b, &mut DefaultTiebreak),
            Tiebreak::Random { seed } => solver.solve_with(&a, &b, &mut RandomTiebreak::new(pair_seed(seed, i, j))),
            Tiebreak::Amenable => solver.solve_with(
                &a,
                &b,
                &mut AmenableTiebreak::new(&self.dataset[i], &self.dataset[j]),
            ),
        };
        self.lock_pool().push(solver.into_scratch());
        let assignment = solved?;
        let d = edit_costs(&self.dataset[i], &self.dataset[j], &self.costs, &assignment);
        Ok((d, assignment))
    }

    pub fn compute(&self, i: usize, j: usize) -> Result<f64> {
        self.compute_with_assignment(i, j).map(|(d, _)| d)
    }

    fn lock_pool(&self) -> std::sync::MutexGuard<'_, Vec<SolverScratch>> {
        self.scratch.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Seed of the random tiebreak for one pair, so that results do not depend on the order
/// in which pairs are evaluated.
fn pair_seed(seed: u64, i: usize, j: usize) -> u64 {
    seed ^ (i as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15) ^ (j as u64).wrapping_mul(0xc2b2_ae3d_27d4_eb4f)
}

impl<'a, V: Sync, E: Sync> DatasetDistance for LinearTreeGed<'a, V, E> {
    fn len(&self) -> usize {
        self.dataset.len()
    }

    fn compute_pair(&self, i: usize, j: usize) -> Result<f64> {
        self.compute(i, j)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::{assignment_cost, AssignmentSolver, Hungarian};
    use crate::ged::GraphEditDistanceAssignment;
    use approx::assert_relative_eq;

    fn path(labels: &[char]) -> LGraph<char, ()> {
        let mut g = LGraph::new();
        for &l in labels {
            g.add_vertex(l);
        }
        for v in 1..labels.len() {
            g.add_edge(v - 1, v, ());
        }
        g
    }

    #[test]
    fn test_discrete_tree_levels() {
        let dataset = vec![path(&['a', 'b']), path(&['a', 'a', 'b'])];
        let td = GraphVertexTreeDistance::discrete(&dataset, 1).unwrap();
        let a0 = GraphVertex::Vertex { graph: 0, vertex: 0 };
        let a1 = GraphVertex::Vertex { graph: 1, vertex: 1 };
        let b0 = GraphVertex::Vertex { graph: 0, vertex: 1 };
        let b1 = GraphVertex::Vertex { graph: 1, vertex: 2 };
        // both a's see one b, but the middle a also sees an a
        assert_relative_eq!(2.0, td.compute(&a0, &a1).unwrap());
        assert_relative_eq!(0.0, td.compute(&b0, &b1).unwrap());
        assert_relative_eq!(4.0, td.compute(&a0, &b0).unwrap());
        // depth 2 below the root, plus the auxiliary node
        assert_relative_eq!(3.0, td.compute(&a0, &GraphVertex::DeletionDummy).unwrap());
        assert_relative_eq!(
            0.0,
            td.compute(&GraphVertex::DeletionDummy, &GraphVertex::InsertionDummy).unwrap()
        );
        assert!(td
            .compute(&GraphVertex::Vertex { graph: 2, vertex: 0 }, &a0)
            .is_err());
    }

    #[test]
    fn test_continuous_tree() {
        let mut g: LGraph<Vec<f64>, ()> = LGraph::new();
        g.add_vertex(vec![0.0]);
        g.add_vertex(vec![10.0]);
        let mut h: LGraph<Vec<f64>, ()> = LGraph::new();
        h.add_vertex(vec![0.1]);
        let dataset = vec![g, h];
        let td = GraphVertexTreeDistance::continuous(&dataset, 2, 3).unwrap();
        let x = GraphVertex::Vertex { graph: 0, vertex: 0 };
        let y = GraphVertex::Vertex { graph: 0, vertex: 1 };
        let z = GraphVertex::Vertex { graph: 1, vertex: 0 };
        assert_relative_eq!(0.0, td.compute(&x, &z).unwrap());
        assert_relative_eq!(2.0, td.compute(&x, &y).unwrap());

        let mut bad: LGraph<Vec<f64>, ()> = LGraph::new();
        bad.add_vertex(vec![1.0, 2.0]);
        let dataset = vec![dataset[0].clone(), bad];
        assert!(matches!(
            GraphVertexTreeDistance::continuous(&dataset, 2, 3),
            Err(Error::UnsupportedLabels(_))
        ));
    }

    #[test]
    fn test_linear_matches_hungarian_on_tree_costs() {
        let dataset = vec![
            path(&['a', 'b', 'a', 'c']),
            path(&['a', 'b', 'c']),
            path(&['c', 'c']),
        ];
        let td = GraphVertexTreeDistance::discrete(&dataset, 2).unwrap();
        for i in 0..dataset.len() {
            for j in 0..dataset.len() {
                let c = td.assignment_cost_matrix(i, j).unwrap();
                let optimum = Hungarian.minimum_cost(&c).unwrap();
                let (a, b) = td.padded_vertices(i, j).unwrap();
                let mut solver = TreeDistanceAssignmentSolver::new(&td);
                let assignment = solver.solve(&a, &b).unwrap();
                assert_relative_eq!(optimum, assignment_cost(&assignment, &c), epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_linear_ged() {
        let dataset = vec![path(&['a', 'b', 'c']), path(&['a', 'b', 'c']), path(&['a', 'b'])];
        let costs = Arc::new(GraphEditCosts::default());
        for tiebreak in [Tiebreak::Default, Tiebreak::Random { seed: 9 }, Tiebreak::Amenable] {
            let td = GraphVertexTreeDistance::discrete(&dataset, 3).unwrap();
            let ged = LinearTreeGed::new(&dataset, costs.clone(), td, tiebreak).unwrap();
            assert_relative_eq!(0.0, ged.compute(0, 1).unwrap());
            // delete c and its edge
            assert_relative_eq!(2.0, ged.compute(0, 2).unwrap());
            let d = ged.compute_all().unwrap();
            assert_eq!(d, d.t());
            assert!(ged.compute(0, 3).is_err());
        }
    }

    #[test]
    fn test_matrix_solver_on_tree_costs() {
        let dataset = vec![path(&['a', 'b', 'c']), path(&['c', 'b', 'a']), path(&['a', 'b'])];
        let td = Arc::new(GraphVertexTreeDistance::discrete(&dataset, 2).unwrap());
        let costs = Arc::new(GraphEditCosts::default());
        let tree_costs = TreeDistanceEditCosts::new(td.clone(), &dataset).unwrap();
        let quadratic = GraphEditDistanceAssignment::with_solver(Box::new(Hungarian), costs.clone(), Box::new(tree_costs));
        let linear = LinearTreeGed::new(&dataset, costs, (*td).clone(), Tiebreak::Default).unwrap();

        for i in 0..dataset.len() {
            for j in 0..dataset.len() {
                let c = quadratic.cost_matrix(&dataset[i], &dataset[j]).unwrap();
                let tree_optimum = Hungarian.minimum_cost(&td.assignment_cost_matrix(i, j).unwrap()).unwrap();
                assert_relative_eq!(tree_optimum, Hungarian.minimum_cost(&c).unwrap(), epsilon = 1e-9);
            }
        }
        // reversed path
        assert_relative_eq!(0.0, quadratic.compute(&dataset[0], &dataset[1]).unwrap());
        assert_relative_eq!(linear.compute(0, 1).unwrap(), quadratic.compute(&dataset[0], &dataset[1]).unwrap());
        // delete c and its edge
        assert_relative_eq!(2.0, quadratic.compute(&dataset[0], &dataset[2]).unwrap());
        assert_relative_eq!(linear.compute(0, 2).unwrap(), quadratic.compute(&dataset[0], &dataset[2]).unwrap());

        let outsider = path(&['a', 'b', 'c']);
        assert!(matches!(
            quadratic.compute(&outsider, &dataset[0]),
            Err(Error::UnmappedElement(_))
        ));
        assert!(TreeDistanceEditCosts::new(td, &dataset[..2]).is_err());
    }

    #[test]
    fn test_dataset_size_must_match() {
        let dataset = vec![path(&['a'])];
        let td = GraphVertexTreeDistance::discrete(&dataset, 1).unwrap();
        let more = vec![path(&['a']), path(&['b'])];
        assert!(LinearTreeGed::new(&more, Arc::new(GraphEditCosts::default()), td, Tiebreak::Default).is_err());
    }
}
