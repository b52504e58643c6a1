//! Solvers for the rectangular linear assignment problem over a dense cost matrix.
//!
//! Every solver maps each row to at most one column. When the matrix is not square, rows
//! left over are unmatched (`None`). Positive infinity marks a forbidden cell.

use crate::error::{Error, Result};
use log::trace;
use munkres::{solve_assignment, WeightMatrix};
use ndarray::Array2;
use std::fmt::Debug;

/// Row-indexed assignment: `assignment[i]` is the column assigned to row `i`.
pub type Assignment = Vec<Option<usize>>;

pub trait AssignmentSolver: Debug + Send + Sync {
    /// Computes an assignment for the `n x m` matrix `costs`.
    fn solve(&self, costs: &Array2<f64>) -> Result<Assignment>;

    fn minimum_cost(&self, costs: &Array2<f64>) -> Result<f64> {
        let assignment = self.solve(costs)?;
        Ok(assignment_cost(&assignment, costs))
    }
}

/// Sum of the assigned entries. Unmatched rows contribute nothing.
pub fn assignment_cost(assignment: &[Option<usize>], costs: &Array2<f64>) -> f64 {
    assignment
        .iter()
        .enumerate()
        .filter_map(|(i, j)| j.map(|j| costs[[i, j]]))
        .sum()
}

fn check_numbers(costs: &Array2<f64>) -> Result<()> {
    match costs.indexed_iter().find(|(_, c)| c.is_nan()) {
        Some(((row, column), _)) => Err(Error::InvalidCost { row, column }),
        None => Ok(()),
    }
}

/// Pads `costs` to a square matrix with zeros and replaces forbidden cells by a finite
/// value exceeding the cost of every assignment that avoids them.
fn square_with_surrogate(costs: &Array2<f64>) -> Array2<f64> {
    let (n, m) = costs.dim();
    let k = n.max(m);
    let finite_total: f64 = costs
        .iter()
        .filter(|c| c.is_finite())
        .map(|c| c.abs())
        .sum();
    let forbidden = (finite_total + 1.0) * (k as f64 + 1.0);
    Array2::from_shape_fn((k, k), |(i, j)| {
        if i < n && j < m {
            let c = costs[[i, j]];
            if c.is_finite() {
                c
            } else {
                forbidden
            }
        } else {
            0.0
        }
    })
}

/// Restricts a square solution to the original shape and rejects forbidden cells.
fn restrict(row_to_column: &[usize], costs: &Array2<f64>) -> Result<Assignment> {
    let (n, m) = costs.dim();
    let mut assignment = vec![None; n];
    for (i, slot) in assignment.iter_mut().enumerate() {
        let j = row_to_column[i];
        if j < m {
            if costs[[i, j]] == f64::INFINITY {
                return Err(Error::Infeasible);
            }
            *slot = Some(j);
        }
    }
    Ok(assignment)
}

fn is_degenerate(costs: &Array2<f64>) -> Option<Assignment> {
    let (n, m) = costs.dim();
    if n == 0 || m == 0 {
        Some(vec![None; n])
    } else {
        None
    }
}

/// Hungarian method. Solves the problem exactly in cubic time.
#[derive(Debug, Default, Copy, Clone)]
pub struct Hungarian;

impl AssignmentSolver for Hungarian {
    fn solve(&self, costs: &Array2<f64>) -> Result<Assignment> {
        if let Some(empty) = is_degenerate(costs) {
            return Ok(empty);
        }
        check_numbers(costs)?;
        let square = square_with_surrogate(costs);
        let k = square.nrows();
        let mut weights = WeightMatrix::from_row_vec(k, square.into_raw_vec());
        let positions = solve_assignment(&mut weights).map_err(|_| Error::Infeasible)?;
        let mut row_to_column = vec![usize::MAX; k];
        for pos in positions {
            row_to_column[pos.row] = pos.column;
        }
        trace!("hungarian solved a {}x{} matrix", costs.nrows(), costs.ncols());
        restrict(&row_to_column, costs)
    }
}

/// Shortest augmenting path algorithm with the column-reduction start of Jonker and
/// Volgenant. Exact; usually faster than [`Hungarian`] on square matrices.
#[derive(Debug, Default, Copy, Clone)]
pub struct JonkerVolgenant;

impl JonkerVolgenant {
    /// Returns the column of every row of the square matrix `c`, whose entries are finite.
    fn augment(c: &Array2<f64>) -> Vec<usize> {
        let n = c.nrows();
        // potentials and matching are 1-based; index 0 is the virtual start column
        let mut u = vec![0.0; n + 1];
        let mut v = vec![0.0; n + 1];
        for j in 1..=n {
            v[j] = c.column(j - 1).iter().cloned().fold(f64::INFINITY, f64::min);
        }
        let mut row_of = vec![0usize; n + 1];
        let mut way = vec![0usize; n + 1];
        let mut min_slack = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        for i in 1..=n {
            row_of[0] = i;
            let mut j0 = 0;
            min_slack.iter_mut().for_each(|x| *x = f64::INFINITY);
            used.iter_mut().for_each(|x| *x = false);
            loop {
                used[j0] = true;
                let i0 = row_of[j0];
                let mut delta = f64::INFINITY;
                let mut j1 = 0;
                for j in 1..=n {
                    if !used[j] {
                        let slack = c[[i0 - 1, j - 1]] - u[i0] - v[j];
                        if slack < min_slack[j] {
                            min_slack[j] = slack;
                            way[j] = j0;
                        }
                        if min_slack[j] < delta {
                            delta = min_slack[j];
                            j1 = j;
                        }
                    }
                }
                for j in 0..=n {
                    if used[j] {
                        u[row_of[j]] += delta;
                        v[j] -= delta;
                    } else {
                        min_slack[j] -= delta;
                    }
                }
                j0 = j1;
                if row_of[j0] == 0 {
                    break;
                }
            }
            // flip the augmenting path
            loop {
                let j1 = way[j0];
                row_of[j0] = row_of[j1];
                j0 = j1;
                if j0 == 0 {
                    break;
                }
            }
        }

        let mut row_to_column = vec![0; n];
        for j in 1..=n {
            if row_of[j] != 0 {
                row_to_column[row_of[j] - 1] = j - 1;
            }
        }
        row_to_column
    }
}

impl AssignmentSolver for JonkerVolgenant {
    fn solve(&self, costs: &Array2<f64>) -> Result<Assignment> {
        if let Some(empty) = is_degenerate(costs) {
            return Ok(empty);
        }
        check_numbers(costs)?;
        let square = square_with_surrogate(costs);
        let row_to_column = JonkerVolgenant::augment(&square);
        restrict(&row_to_column, costs)
    }
}

/// Greedy algorithm accepting cells in order of increasing cost. O(nm log(nm)).
#[derive(Debug, Default, Copy, Clone)]
pub struct GreedySort;

impl AssignmentSolver for GreedySort {
    fn solve(&self, costs: &Array2<f64>) -> Result<Assignment> {
        if let Some(empty) = is_degenerate(costs) {
            return Ok(empty);
        }
        check_numbers(costs)?;
        let (n, m) = costs.dim();
        let flat: Vec<f64> = costs.iter().cloned().collect();
        let mut idx: Vec<usize> = (0..n * m).collect();
        // sort indices according to cell costs
        idx.sort_by(|&a, &b| flat[a].total_cmp(&flat[b]));

        let mut assignment = vec![None; n];
        let mut row_used = vec![false; n];
        let mut column_used = vec![false; m];
        let target = n.min(m);
        let mut assigned = 0;
        for x in idx {
            let (i, j) = (x / m, x % m);
            if !row_used[i] && !column_used[j] {
                row_used[i] = true;
                column_used[j] = true;
                assignment[i] = Some(j);
                assigned += 1;
                if assigned == target {
                    break;
                }
            }
        }
        Ok(assignment)
    }
}

/// Row-wise greedy algorithm: every row takes the cheapest free column. O(nm).
#[derive(Debug, Default, Copy, Clone)]
pub struct GreedyBasic;

impl AssignmentSolver for GreedyBasic {
    fn solve(&self, costs: &Array2<f64>) -> Result<Assignment> {
        if let Some(empty) = is_degenerate(costs) {
            return Ok(empty);
        }
        check_numbers(costs)?;
        let (n, m) = costs.dim();
        let mut assignment = vec![None; n];
        let mut matched = vec![false; m];
        for (i, slot) in assignment.iter_mut().enumerate() {
            let best = (0..m)
                .filter(|&j| !matched[j])
                .min_by(|&a, &b| costs[[i, a]].total_cmp(&costs[[i, b]]));
            if let Some(j) = best {
                matched[j] = true;
                *slot = Some(j);
            }
        }
        Ok(assignment)
    }
}
