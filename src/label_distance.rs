use std::fmt::Debug;
use std::hash::{Hash, Hasher};

pub trait LabelDistance<T: ?Sized>: Debug + Send + Sync {
    /// Determines how distant the labels `a` and `b` are. Used for relabeling costs.
    ///
    /// NOTE: The returned value MUST be non-negative, and should be zero iff the labels are
    /// equal for the edit-distance bounds to hold. This is not checked.
    fn distance(&self, a: &T, b: &T) -> f64;
}

#[derive(Debug, Default, Copy, Clone)]
/// 0 for equal labels, 1 otherwise.
pub struct IdentityDistance;

impl<T: PartialEq + ?Sized> LabelDistance<T> for IdentityDistance {
    fn distance(&self, a: &T, b: &T) -> f64 {
        if a == b {
            0.0
        } else {
            1.0
        }
    }
}

/// Labels that carry a real-valued vector.
pub trait RealValued {
    fn real_values(&self) -> &[f64];
}

impl RealValued for Vec<f64> {
    fn real_values(&self) -> &[f64] {
        self
    }
}

impl RealValued for [f64] {
    fn real_values(&self) -> &[f64] {
        self
    }
}

fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "points with different number of components");
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[derive(Debug, Default, Copy, Clone)]
pub struct EuclideanDistance;

impl<T: RealValued + ?Sized> LabelDistance<T> for EuclideanDistance {
    fn distance(&self, a: &T, b: &T) -> f64 {
        squared_euclidean(a.real_values(), b.real_values()).sqrt()
    }
}

#[derive(Debug, Default, Copy, Clone)]
pub struct SquaredEuclideanDistance;

impl<T: RealValued + ?Sized> LabelDistance<T> for SquaredEuclideanDistance {
    fn distance(&self, a: &T, b: &T) -> f64 {
        squared_euclidean(a.real_values(), b.real_values())
    }
}

/// Vertex or edge attributes: nominal values plus a real-valued vector.
///
/// Equality and hashing compare real values bitwise, so attributes can serve as keys for
/// colour refinement.
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    pub nominal: Vec<String>,
    pub real: Vec<f64>,
}

impl Attributes {
    pub fn new(nominal: Vec<String>, real: Vec<f64>) -> Attributes {
        Attributes { nominal, real }
    }

    pub fn nominal<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Attributes {
        Attributes {
            nominal: values.into_iter().map(Into::into).collect(),
            real: Vec::new(),
        }
    }

    pub fn real(values: Vec<f64>) -> Attributes {
        Attributes {
            nominal: Vec::new(),
            real: values,
        }
    }

    pub fn has_nominal(&self) -> bool {
        !self.nominal.is_empty()
    }

    pub fn has_real_valued(&self) -> bool {
        !self.real.is_empty()
    }
}

impl PartialEq for Attributes {
    fn eq(&self, other: &Self) -> bool {
        self.nominal == other.nominal
            && self.real.len() == other.real.len()
            && self
                .real
                .iter()
                .zip(&other.real)
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

impl Eq for Attributes {}

impl Hash for Attributes {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.nominal.hash(state);
        for x in &self.real {
            x.to_bits().hash(state);
        }
    }
}

impl RealValued for Attributes {
    fn real_values(&self) -> &[f64] {
        &self.real
    }
}

/// Identity distance summed over the nominal attributes plus the Euclidean distance of the
/// real-valued attributes.
#[derive(Debug, Default, Copy, Clone)]
pub struct AttributesDistance;

impl LabelDistance<Attributes> for AttributesDistance {
    fn distance(&self, a: &Attributes, b: &Attributes) -> f64 {
        let nominal: f64 = a
            .nominal
            .iter()
            .zip(&b.nominal)
            .map(|(x, y)| IdentityDistance.distance(x, y))
            .sum();
        nominal + EuclideanDistance.distance(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_attributes_distance() {
        let a = Attributes::new(vec!["C".into(), "x".into()], vec![0.0, 0.0]);
        let b = Attributes::new(vec!["C".into(), "y".into()], vec![3.0, 4.0]);
        assert_relative_eq!(6.0, AttributesDistance.distance(&a, &b));
        assert_relative_eq!(0.0, AttributesDistance.distance(&a, &a.clone()));
        assert_relative_eq!(25.0, SquaredEuclideanDistance.distance(&a, &b));
    }

    #[test]
    fn test_identity() {
        assert_eq!(0.0, IdentityDistance.distance("a", "a"));
        assert_eq!(1.0, IdentityDistance.distance(&1u8, &2u8));
    }
}
