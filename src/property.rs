//! Dense, array-backed property maps attached to the vertices or edges of a graph.
//!
//! A map is sized from the index range of the graph at creation time. It stays valid as
//! long as that range does not shrink below the map's size; vertices or edges created
//! afterwards must be added with [`VertexMap::grow`] / [`EdgeMap::grow`].

use crate::graph_traits::{EdgeIndex, Graph, VertexIndex};
use std::ops::{Index, IndexMut};

macro_rules! property_map {
    ($name:ident, $index:ty, $bound:ident, $what:literal) => {
        #[doc = concat!("Maps every ", $what, " of a graph to a value, indexed by its stable index.")]
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name<T> {
            values: Vec<T>,
        }

        impl<T: Clone> $name<T> {
            /// Creates a map covering the whole index range of `graph`, filled with `value`.
            pub fn new<G: Graph + ?Sized>(graph: &G, value: T) -> $name<T> {
                $name {
                    values: vec![value; graph.$bound()],
                }
            }

            /// Extends the map to cover indices created after the map.
            pub fn grow(&mut self, len: usize, value: T) {
                if len > self.values.len() {
                    self.values.resize(len, value);
                }
            }
        }

        impl<T> $name<T> {
            pub fn from_vec(values: Vec<T>) -> $name<T> {
                $name { values }
            }

            #[inline]
            pub fn len(&self) -> usize {
                self.values.len()
            }

            #[inline]
            pub fn is_empty(&self) -> bool {
                self.values.is_empty()
            }

            #[inline]
            pub fn get(&self, i: $index) -> Option<&T> {
                self.values.get(i)
            }

            #[inline]
            pub fn set(&mut self, i: $index, value: T) {
                self.values[i] = value;
            }

            pub fn push(&mut self, value: T) -> $index {
                self.values.push(value);
                self.values.len() - 1
            }

            pub fn iter(&self) -> std::slice::Iter<'_, T> {
                self.values.iter()
            }

            pub fn as_slice(&self) -> &[T] {
                &self.values
            }

            pub fn into_vec(self) -> Vec<T> {
                self.values
            }
        }

        impl<T> Index<$index> for $name<T> {
            type Output = T;

            #[inline]
            fn index(&self, i: $index) -> &T {
                &self.values[i]
            }
        }

        impl<T> IndexMut<$index> for $name<T> {
            #[inline]
            fn index_mut(&mut self, i: $index) -> &mut T {
                &mut self.values[i]
            }
        }

        impl<T> Default for $name<T> {
            fn default() -> Self {
                $name { values: Vec::new() }
            }
        }
    };
}

property_map!(VertexMap, VertexIndex, vertex_bound, "vertex");
property_map!(EdgeMap, EdgeIndex, edge_bound, "edge");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AdjListGraph;

    #[test]
    fn test_sized_from_graph() {
        let mut g = AdjListGraph::new();
        let a = g.create_vertex();
        let b = g.create_vertex();
        let e = g.create_edge(a, b);

        let mut depth = VertexMap::new(&g, 0usize);
        depth[b] = 3;
        assert_eq!(2, depth.len());
        assert_eq!(3, depth[b]);

        let mut weight = EdgeMap::new(&g, 1.0);
        weight[e] = 0.5;
        assert_eq!(Some(&0.5), weight.get(e));
        assert_eq!(None, weight.get(1));

        let c = g.create_vertex();
        depth.grow(g.vertex_bound(), 7);
        assert_eq!(7, depth[c]);
    }
}
