//! Graph edit distance approximated by optimal assignments between the vertices of two
//! graphs, see [Riesen and Bunke][1].
//!
//! Two estimators are provided:
//!
//! * [`GraphEditDistanceAssignment`] solves the assignment on the full cost matrix with a
//!   pluggable [`AssignmentSolver`] (Hungarian, Jonker-Volgenant or greedy).
//! * [`LinearTreeGed`] maps all vertices of a dataset into one weighted rooted tree and
//!   solves the assignment under the tree metric in linear time, as described by
//!   [Kriege et al.][2]. The tree comes from colour refinement for discrete labels and from
//!   bisecting k-means for real-valued labels.
//!
//! The crate also contains the colour refinement amenability test ([`test_amenable`]) which
//! tells for which graphs a refinement tree separates non-isomorphic graphs.
//!
//! [1]: https://doi.org/10.1016/j.imavis.2008.04.004 "2009, Kaspar Riesen and Horst Bunke,
//!      Approximate graph edit distance computation by means of bipartite graph matching"
//! [2]: https://doi.org/10.1016/j.patrec.2019.04.004 "2019, Nils M. Kriege, Pierre-Louis
//!      Giscard, Franka Bause, Richard C. Wilson, Computing optimal assignments in linear
//!      time for approximate graph matching"

pub mod amenable;
pub mod assignment;
pub mod clustering;
pub mod config;
pub mod connectivity;
mod dynamic_subgraph;
pub mod edit_costs;
mod error;
pub mod ged;
pub mod graph;
pub mod graph_tools;
mod graph_traits;
pub mod label_distance;
mod property;
pub mod refinement;
mod rooted_tree;
pub mod tiebreak;
pub mod tree_costs;
pub mod tree_distance;

pub use amenable::{check_amenable, test_amenable, Amenability};
pub use assignment::{Assignment, AssignmentSolver, GreedyBasic, GreedySort, Hungarian, JonkerVolgenant};
pub use config::{build_dataset_distance, EditCostConfig, GedMethod};
pub use edit_costs::GraphEditCosts;
pub use ged::{edit_costs, DatasetDistance, GraphEditDistanceAssignment, QuadraticGed};
pub use graph::{AdjListGraph, GraphBuilder, LGraph};
pub use label_distance::{Attributes, LabelDistance};
pub use tiebreak::Tiebreak;
pub use tree_costs::{GraphVertex, GraphVertexTreeDistance, LinearTreeGed, TreeDistanceEditCosts};
pub use tree_distance::{TreeDistance, TreeDistanceAssignmentSolver, TreeMetric};
pub use {dynamic_subgraph::*, error::*, graph_traits::*, property::*, rooted_tree::*};
