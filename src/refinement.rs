//! Colour refinement (1-dimensional Weisfeiler-Lehman).
//!
//! One round recolours every vertex by its own colour together with the sorted multiset
//! of (edge colour, neighbour colour) pairs, then compresses these signatures to small
//! integers. Refinement never merges colour classes, so the number of colours is
//! non-decreasing and a round that does not increase it has reached the stable partition.

use crate::graph::LGraph;
use crate::graph_traits::{EdgeIndex, Graph, VertexIndex};
use crate::property::{EdgeMap, VertexMap};
use log::trace;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

pub type Color = usize;

/// Own colour and sorted (edge colour, neighbour colour) pairs.
pub type Signature = (Color, Vec<(Color, Color)>);

/// Assigns consecutive colours to keys in order of first appearance.
///
/// [`ColorCompressor::clear`] forgets the keys but not the counter, so colours handed out
/// after a clear never coincide with earlier ones.
#[derive(Debug, Clone)]
pub struct ColorCompressor<K> {
    colors: HashMap<K, Color>,
    next: Color,
}

impl<K: Hash + Eq> ColorCompressor<K> {
    pub fn new() -> Self {
        ColorCompressor::starting_at(0)
    }

    pub fn starting_at(next: Color) -> Self {
        ColorCompressor {
            colors: HashMap::new(),
            next,
        }
    }

    pub fn compress(&mut self, key: K) -> Color {
        let next = &mut self.next;
        *self.colors.entry(key).or_insert_with(|| {
            let c = *next;
            *next += 1;
            c
        })
    }

    /// The colour the next unseen key will receive.
    pub fn next_color(&self) -> Color {
        self.next
    }

    /// Number of keys seen since the last clear.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn clear(&mut self) {
        self.colors.clear();
    }
}

impl<K: Hash + Eq> Default for ColorCompressor<K> {
    fn default() -> Self {
        ColorCompressor::new()
    }
}

/// One refinement round.
pub fn refine<G, F>(
    g: &G,
    colors: &VertexMap<Color>,
    edge_color: F,
    compressor: &mut ColorCompressor<Signature>,
) -> VertexMap<Color>
where
    G: Graph + ?Sized,
    F: Fn(EdgeIndex) -> Color,
{
    let mut refined = VertexMap::new(g, 0);
    for v in g.vertices() {
        let mut neighborhood: Vec<(Color, Color)> = g
            .incident_edges(v)
            .iter()
            .map(|&e| (edge_color(e), colors[g.edge(e).opposite(v)]))
            .collect();
        neighborhood.sort_unstable();
        refined[v] = compressor.compress((colors[v], neighborhood));
    }
    refined
}

pub fn count_colors<G: Graph + ?Sized>(g: &G, colors: &VertexMap<Color>) -> usize {
    g.vertices().map(|v| colors[v]).collect::<HashSet<_>>().len()
}

/// Refines `initial` on an unlabeled graph until the number of colours is stable. The
/// resulting colours are `0..k`, numbered in vertex order of first appearance.
pub fn stable_coloring<G: Graph + ?Sized>(g: &G, initial: VertexMap<Color>) -> VertexMap<Color> {
    let mut colors = initial;
    let mut count = count_colors(g, &colors);
    let mut round = 0;
    loop {
        let mut compressor = ColorCompressor::new();
        colors = refine(g, &colors, |_| 0, &mut compressor);
        round += 1;
        trace!("refinement round {}: {} colours", round, compressor.len());
        if compressor.len() == count {
            return colors;
        }
        count = compressor.len();
    }
}

/// The cells of the stable partition reached from the uniform colouring, ordered by
/// colour. Vertices within a cell are in ascending order.
pub fn stable_partition<G: Graph + ?Sized>(g: &G) -> Vec<Vec<VertexIndex>> {
    if g.vertex_count() == 0 {
        return Vec::new();
    }
    let colors = stable_coloring(g, VertexMap::new(g, 0));
    let k = g.vertices().map(|v| colors[v] + 1).max().unwrap_or(0);
    let mut cells = vec![Vec::new(); k];
    for v in g.vertices() {
        cells[colors[v]].push(v);
    }
    cells
}

/// Colour refinement over a collection of labeled graphs.
///
/// Colours of one round are comparable across all graphs of the collection. Initial labels
/// and every round draw from one colour counter, so colours of different rounds are
/// disjoint.
#[derive(Debug)]
pub struct DatasetRefinement<'a, V, E> {
    graphs: &'a [LGraph<V, E>],
    edge_colors: Vec<EdgeMap<Color>>,
    colors: Vec<VertexMap<Color>>,
    compressor: ColorCompressor<Signature>,
    rounds: usize,
}

impl<'a, V: Hash + Eq, E: Hash + Eq> DatasetRefinement<'a, V, E> {
    /// Colours every vertex by its compressed label.
    pub fn new(graphs: &'a [LGraph<V, E>]) -> Self {
        let mut vertex_labels = ColorCompressor::new();
        let colors = graphs
            .iter()
            .map(|g| VertexMap::from_vec(g.vertex_labels().iter().map(|l| vertex_labels.compress(l)).collect()))
            .collect();
        let mut edge_labels = ColorCompressor::new();
        let edge_colors = graphs
            .iter()
            .map(|g| EdgeMap::from_vec(g.edge_labels().iter().map(|l| edge_labels.compress(l)).collect()))
            .collect();
        DatasetRefinement {
            graphs,
            edge_colors,
            colors,
            compressor: ColorCompressor::starting_at(vertex_labels.next_color()),
            rounds: 0,
        }
    }
}

impl<'a, V, E> DatasetRefinement<'a, V, E> {
    /// Current colours, one map per graph.
    pub fn colors(&self) -> &[VertexMap<Color>] {
        &self.colors
    }

    /// An upper bound for all colours handed out so far.
    pub fn color_bound(&self) -> Color {
        self.compressor.next_color()
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn refine(&mut self) {
        self.compressor.clear();
        for (i, g) in self.graphs.iter().enumerate() {
            let edge_colors = &self.edge_colors[i];
            self.colors[i] = refine(g, &self.colors[i], |e| edge_colors[e], &mut self.compressor);
        }
        self.rounds += 1;
        trace!(
            "dataset refinement round {}: {} colours",
            self.rounds,
            self.compressor.len()
        );
    }
}
