//! Hierarchical clustering of real-valued points into a rooted tree.

use crate::error::{Error, Result};
use crate::graph_traits::{Graph, VertexIndex};
use crate::rooted_tree::RootedTree;
use log::debug;
use ndarray::{Array1, Array2, ArrayView1};
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

const MAX_ROUNDS: usize = 300;

pub trait HierarchicalClustering {
    /// Clusters the rows of `points`. Returns the hierarchy and, for every row, the leaf
    /// holding it.
    fn cluster(&mut self, points: &Array2<f64>) -> Result<(RootedTree, Vec<VertexIndex>)>;
}

/// Divisive clustering: the largest cluster is split in two by the best of several 2-means
/// runs until `k` leaves exist.
///
/// Clusters that cannot be split into two non-empty halves, such as a cluster of identical
/// points, stay leaves; the hierarchy then ends up with fewer than `k` leaves.
#[derive(Debug, Clone)]
pub struct BisectingKMeans {
    iter: usize,
    k: usize,
    rng: Pcg64Mcg,
}

impl BisectingKMeans {
    /// `iter` 2-means runs per bisection, at most `k` leaves.
    pub fn new(iter: usize, k: usize, seed: u64) -> Result<BisectingKMeans> {
        if iter == 0 || k == 0 {
            return Err(Error::InvalidParameter(format!(
                "bisecting k-means needs iter > 0 and k > 0, got iter={} k={}",
                iter, k
            )));
        }
        Ok(BisectingKMeans {
            iter,
            k,
            rng: Pcg64Mcg::seed_from_u64(seed),
        })
    }

    fn bisect(&mut self, points: &Array2<f64>, members: &[usize]) -> Option<[Vec<usize>; 2]> {
        let mut best: Option<([Vec<usize>; 2], f64)> = None;
        for _ in 0..self.iter {
            let halves = two_means(points, members, &mut self.rng);
            if halves.iter().any(Vec::is_empty) {
                continue;
            }
            let ssd = halves.iter().map(|h| sum_of_squares(points, h)).sum::<f64>();
            if best.as_ref().map_or(true, |(_, b)| ssd < *b) {
                best = Some((halves, ssd));
            }
        }
        best.map(|(halves, _)| halves)
    }
}

impl HierarchicalClustering for BisectingKMeans {
    fn cluster(&mut self, points: &Array2<f64>) -> Result<(RootedTree, Vec<VertexIndex>)> {
        let mut tree = RootedTree::with_capacity(2 * self.k.min(points.nrows().max(1)) - 1);
        let root = tree.create_root()?;
        // leaf, members, whether a split is still worth trying
        let mut leaves = vec![(root, (0..points.nrows()).collect::<Vec<_>>(), true)];

        while leaves.len() < self.k {
            let largest = leaves
                .iter()
                .enumerate()
                .filter(|(_, (_, members, splittable))| *splittable && members.len() > 1)
                .max_by(|(i, (_, x, _)), (j, (_, y, _))| x.len().cmp(&y.len()).then(j.cmp(i)))
                .map(|(i, _)| i);
            let Some(largest) = largest else {
                break;
            };
            match self.bisect(points, &leaves[largest].1) {
                Some([first, second]) => {
                    let parent = leaves[largest].0;
                    let c1 = tree.create_child(parent);
                    let c2 = tree.create_child(parent);
                    leaves[largest] = (c1, first, true);
                    leaves.push((c2, second, true));
                }
                None => leaves[largest].2 = false,
            }
        }

        let mut leaf_of = vec![root; points.nrows()];
        for (leaf, members, _) in &leaves {
            for &p in members {
                leaf_of[p] = *leaf;
            }
        }
        debug!(
            "bisecting k-means: {} points in {} leaves, {} tree vertices",
            points.nrows(),
            leaves.len(),
            tree.vertex_bound()
        );
        Ok((tree, leaf_of))
    }
}

fn squared_distance(a: ArrayView1<f64>, b: &Array1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn mean(points: &Array2<f64>, members: &[usize]) -> Array1<f64> {
    let mut m = Array1::zeros(points.ncols());
    for &p in members {
        m += &points.row(p);
    }
    m / members.len() as f64
}

fn sum_of_squares(points: &Array2<f64>, members: &[usize]) -> f64 {
    let m = mean(points, members);
    members
        .iter()
        .map(|&p| squared_distance(points.row(p), &m))
        .sum()
}

/// Lloyd's algorithm with two clusters and Forgy initialisation. An empty cluster is
/// reseeded with a random member point.
fn two_means<R: Rng + ?Sized>(points: &Array2<f64>, members: &[usize], rng: &mut R) -> [Vec<usize>; 2] {
    let seeds = sample(rng, members.len(), 2);
    let mut means = [
        points.row(members[seeds.index(0)]).to_owned(),
        points.row(members[seeds.index(1)]).to_owned(),
    ];
    let mut side = vec![0usize; members.len()];

    for _ in 0..MAX_ROUNDS {
        let mut changed = false;
        for (k, &p) in members.iter().enumerate() {
            let nearest = if squared_distance(points.row(p), &means[1])
                < squared_distance(points.row(p), &means[0])
            {
                1
            } else {
                0
            };
            if nearest != side[k] {
                side[k] = nearest;
                changed = true;
            }
        }
        if !changed {
            break;
        }
        for (c, m) in means.iter_mut().enumerate() {
            let cluster: Vec<usize> = members
                .iter()
                .zip(&side)
                .filter(|(_, &s)| s == c)
                .map(|(&p, _)| p)
                .collect();
            *m = if cluster.is_empty() {
                points.row(members[rng.gen_range(0..members.len())]).to_owned()
            } else {
                mean(points, &cluster)
            };
        }
    }

    let mut halves = [Vec::new(), Vec::new()];
    for (&p, &s) in members.iter().zip(&side) {
        halves[s].push(p);
    }
    halves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph_traits::Graph;
    use ndarray::array;

    fn two_groups() -> Array2<f64> {
        array![
            [0.0, 0.0],
            [0.5, 0.0],
            [0.0, 0.5],
            [10.0, 10.0],
            [10.5, 10.0],
            [10.0, 10.5],
        ]
    }

    #[test]
    fn test_separates_groups() {
        let mut km = BisectingKMeans::new(3, 2, 7).unwrap();
        let (tree, leaf_of) = km.cluster(&two_groups()).unwrap();
        assert_eq!(3, tree.vertex_count());
        assert_eq!(leaf_of[0], leaf_of[1]);
        assert_eq!(leaf_of[0], leaf_of[2]);
        assert_eq!(leaf_of[3], leaf_of[5]);
        assert_ne!(leaf_of[0], leaf_of[3]);
        assert!(tree.is_leaf(leaf_of[0]));
    }

    #[test]
    fn test_reproducible() {
        let points = two_groups();
        let run = || {
            let mut km = BisectingKMeans::new(2, 4, 11).unwrap();
            km.cluster(&points).unwrap().1
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_identical_points_stay_together() {
        let points = array![[1.0], [1.0], [1.0]];
        let mut km = BisectingKMeans::new(3, 3, 0).unwrap();
        let (tree, leaf_of) = km.cluster(&points).unwrap();
        assert_eq!(1, tree.vertex_count());
        assert_eq!(vec![0, 0, 0], leaf_of);
    }

    #[test]
    fn test_leaf_count_above_point_count() {
        let mut km = BisectingKMeans::new(3, usize::MAX, 5).unwrap();
        let (tree, leaf_of) = km.cluster(&two_groups()).unwrap();
        assert!(tree.vertex_count() <= 11);
        assert_ne!(leaf_of[0], leaf_of[3]);
        for &leaf in &leaf_of {
            assert!(tree.is_leaf(leaf));
        }
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(BisectingKMeans::new(0, 3, 0).is_err());
        assert!(BisectingKMeans::new(3, 0, 0).is_err());
        let mut km = BisectingKMeans::new(3, 5, 0).unwrap();
        let (tree, leaf_of) = km.cluster(&Array2::zeros((0, 2))).unwrap();
        assert_eq!(1, tree.vertex_count());
        assert!(leaf_of.is_empty());
        let (tree, leaf_of) = km.cluster(&array![[4.0, 2.0]]).unwrap();
        assert_eq!(1, tree.vertex_count());
        assert_eq!(vec![0], leaf_of);
    }
}
