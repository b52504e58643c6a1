//! Estimator selection for datasets of attributed graphs.

use crate::assignment::GreedyBasic;
use crate::edit_costs::{ExtendedAssignmentCosts, GraphEditCosts};
use crate::error::{Error, Result};
use crate::ged::{DatasetDistance, GraphEditDistanceAssignment, QuadraticGed};
use crate::graph::LGraph;
use crate::graph_traits::Graph;
use crate::label_distance::{Attributes, AttributesDistance};
use crate::tiebreak::Tiebreak;
use crate::tree_costs::{GraphVertexTreeDistance, LinearTreeGed};
use log::info;
use std::sync::Arc;

/// Uniform insertion and deletion costs. Relabeling uses [`AttributesDistance`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EditCostConfig {
    pub vertex_cost: f64,
    pub edge_cost: f64,
}

impl Default for EditCostConfig {
    fn default() -> Self {
        EditCostConfig {
            vertex_cost: 1.0,
            edge_cost: 1.0,
        }
    }
}

impl EditCostConfig {
    pub fn edit_costs(&self) -> GraphEditCosts<Attributes, Attributes> {
        GraphEditCosts::uniform(
            self.vertex_cost,
            self.edge_cost,
            Box::new(AttributesDistance),
            Box::new(AttributesDistance),
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GedMethod {
    /// Hungarian method on the full cost matrix.
    Bipartite,
    /// Row-wise greedy assignment on the full cost matrix.
    Greedy,
    /// Tree-metric assignment. `iterations` applies to nominal labels, `partitions` and
    /// `seed` to real-valued labels; `seed` also drives a random tiebreak.
    Linear {
        iterations: usize,
        partitions: usize,
        tiebreak: Tiebreak,
        seed: u64,
    },
}

impl GedMethod {
    pub fn linear() -> GedMethod {
        GedMethod::Linear {
            iterations: 7,
            partitions: 300,
            tiebreak: Tiebreak::Default,
            seed: 0,
        }
    }
}

impl Default for GedMethod {
    fn default() -> Self {
        GedMethod::linear()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum LabelKind {
    Nominal,
    RealValued,
}

fn label_kind(dataset: &[LGraph<Attributes, Attributes>]) -> Result<LabelKind> {
    let mut nominal = false;
    let mut real = false;
    for g in dataset {
        for v in g.vertices() {
            let label = g.vertex_label(v);
            nominal |= label.has_nominal();
            real |= label.has_real_valued();
        }
    }
    match (nominal, real) {
        (true, true) => Err(Error::UnsupportedLabels(
            "vertices carry both nominal and real-valued attributes".to_string(),
        )),
        (false, true) => Ok(LabelKind::RealValued),
        _ => Ok(LabelKind::Nominal),
    }
}

/// Pairwise graph edit distances over `dataset` with the chosen method.
///
/// The linear method builds a refinement tree for nominal labels and a clustering tree for
/// real-valued labels. Datasets mixing both kinds are rejected.
pub fn build_dataset_distance<'a>(
    method: &GedMethod,
    costs: &EditCostConfig,
    dataset: &'a [LGraph<Attributes, Attributes>],
) -> Result<Box<dyn DatasetDistance + 'a>> {
    let edit_costs = Arc::new(costs.edit_costs());
    info!("{:?} edit distance over {} graphs", method, dataset.len());
    Ok(match *method {
        GedMethod::Bipartite => Box::new(QuadraticGed::new(
            dataset,
            GraphEditDistanceAssignment::new(edit_costs),
        )),
        GedMethod::Greedy => Box::new(QuadraticGed::new(
            dataset,
            GraphEditDistanceAssignment::with_solver(
                Box::new(GreedyBasic),
                edit_costs.clone(),
                Box::new(ExtendedAssignmentCosts::new(edit_costs)),
            ),
        )),
        GedMethod::Linear {
            iterations,
            partitions,
            tiebreak,
            seed,
        } => {
            let tree = match label_kind(dataset)? {
                LabelKind::Nominal => GraphVertexTreeDistance::discrete(dataset, iterations)?,
                LabelKind::RealValued => GraphVertexTreeDistance::continuous(dataset, partitions, seed)?,
            };
            Box::new(LinearTreeGed::new(dataset, edit_costs, tree, tiebreak)?)
        }
    })
}
