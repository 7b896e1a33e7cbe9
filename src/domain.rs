//! Search-space domains
//!
//! Every query policy and every experiment caller agrees on a small taxonomy
//! of search spaces. A domain is immutable after construction, knows its
//! dimension, and can decide membership for any candidate point without
//! failing — a point of the wrong shape is simply not a member.

use crate::error::{DesignerError, DesignerResult};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A candidate query point.
///
/// Points are opaque JSON values: a numeric vector for euclidean/integral
/// domains, a bare item for discrete domains, and an array of items for
/// products of discrete domains.
pub type Point = Value;

/// A fidelity at which a point may be evaluated (multi-fidelity mode).
pub type Fidel = Value;

/// Stable domain type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DomainKind {
    /// Everything is a member
    Universal,
    /// Box-bounded real vectors
    Euclidean,
    /// Box-bounded integer vectors
    Integral,
    /// A finite set of opaque items
    Discrete,
    /// A product of finite sets
    ProdDiscrete,
}

impl DomainKind {
    /// Stable tag string for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainKind::Universal => "universal",
            DomainKind::Euclidean => "euclidean",
            DomainKind::Integral => "integral",
            DomainKind::Discrete => "discrete",
            DomainKind::ProdDiscrete => "prod_discrete",
        }
    }
}

impl fmt::Display for DomainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A search space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Domain {
    /// Universal domain; membership is trivially true and the dimension is
    /// undefined. Useful when the domain is not load-bearing.
    Universal,
    /// Euclidean box with inclusive per-coordinate bounds
    Euclidean { bounds: Vec<(f64, f64)> },
    /// Integer box with inclusive per-coordinate bounds
    Integral { bounds: Vec<(i64, i64)> },
    /// Finite list of opaque items; membership is set containment
    Discrete { items: Vec<Value> },
    /// Product of finite item lists; membership is the pointwise conjunction
    ProdDiscrete { factors: Vec<Vec<Value>> },
}

impl Domain {
    /// Create a euclidean domain from `(lo, hi)` bound pairs.
    ///
    /// Bounds must be finite with `lo <= hi`.
    pub fn euclidean(bounds: Vec<(f64, f64)>) -> DesignerResult<Self> {
        for (i, &(lo, hi)) in bounds.iter().enumerate() {
            if !lo.is_finite() || !hi.is_finite() {
                return Err(DesignerError::InvalidDomain(format!(
                    "non-finite bound at coordinate {i}: ({lo}, {hi})"
                )));
            }
            if lo > hi {
                return Err(DesignerError::InvalidDomain(format!(
                    "empty bound at coordinate {i}: ({lo}, {hi})"
                )));
            }
        }
        Ok(Domain::Euclidean { bounds })
    }

    /// Create an integral domain from `(lo, hi)` bound pairs.
    pub fn integral(bounds: Vec<(i64, i64)>) -> DesignerResult<Self> {
        for (i, &(lo, hi)) in bounds.iter().enumerate() {
            if lo > hi {
                return Err(DesignerError::InvalidDomain(format!(
                    "empty bound at coordinate {i}: ({lo}, {hi})"
                )));
            }
        }
        Ok(Domain::Integral { bounds })
    }

    /// Create a discrete domain from a list of items.
    pub fn discrete(items: Vec<Value>) -> Self {
        Domain::Discrete { items }
    }

    /// Create a product-of-discrete domain from per-factor item lists.
    pub fn prod_discrete(factors: Vec<Vec<Value>>) -> Self {
        Domain::ProdDiscrete { factors }
    }

    /// The stable type tag of this domain
    pub fn kind(&self) -> DomainKind {
        match self {
            Domain::Universal => DomainKind::Universal,
            Domain::Euclidean { .. } => DomainKind::Euclidean,
            Domain::Integral { .. } => DomainKind::Integral,
            Domain::Discrete { .. } => DomainKind::Discrete,
            Domain::ProdDiscrete { .. } => DomainKind::ProdDiscrete,
        }
    }

    /// Dimension of the space; `None` for the universal domain.
    ///
    /// Discrete domains are one-dimensional; for the other variants the
    /// dimension equals the number of bound rows or factor lists.
    pub fn dim(&self) -> Option<usize> {
        match self {
            Domain::Universal => None,
            Domain::Euclidean { bounds } => Some(bounds.len()),
            Domain::Integral { bounds } => Some(bounds.len()),
            Domain::Discrete { .. } => Some(1),
            Domain::ProdDiscrete { factors } => Some(factors.len()),
        }
    }

    /// Whether `point` is a member of this domain.
    ///
    /// Total over all inputs: a point of the wrong shape is not a member,
    /// never an error.
    pub fn contains(&self, point: &Point) -> bool {
        match self {
            Domain::Universal => true,
            Domain::Euclidean { bounds } => match point.as_array() {
                Some(coords) if coords.len() == bounds.len() => coords
                    .iter()
                    .zip(bounds)
                    .all(|(c, &(lo, hi))| c.as_f64().is_some_and(|x| lo <= x && x <= hi)),
                _ => false,
            },
            Domain::Integral { bounds } => match point.as_array() {
                Some(coords) if coords.len() == bounds.len() => coords
                    .iter()
                    .zip(bounds)
                    .all(|(c, &(lo, hi))| c.as_i64().is_some_and(|x| lo <= x && x <= hi)),
                _ => false,
            },
            Domain::Discrete { items } => items.contains(point),
            Domain::ProdDiscrete { factors } => match point.as_array() {
                Some(elems) if elems.len() == factors.len() => elems
                    .iter()
                    .zip(factors)
                    .all(|(elem, factor)| factor.contains(elem)),
                _ => false,
            },
        }
    }

    /// Draw a uniform random member of this domain.
    ///
    /// Returns `None` for the universal domain (nothing to sample from) and
    /// for discrete domains with no items.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Point> {
        match self {
            Domain::Universal => None,
            Domain::Euclidean { bounds } => {
                let coords = bounds
                    .iter()
                    .map(|&(lo, hi)| Value::from(rng.gen_range(lo..=hi)))
                    .collect();
                Some(Value::Array(coords))
            }
            Domain::Integral { bounds } => {
                let coords = bounds
                    .iter()
                    .map(|&(lo, hi)| Value::from(rng.gen_range(lo..=hi)))
                    .collect();
                Some(Value::Array(coords))
            }
            Domain::Discrete { items } => items.choose(rng).cloned(),
            Domain::ProdDiscrete { factors } => factors
                .iter()
                .map(|factor| factor.choose(rng).cloned())
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Universal => write!(f, "universal domain"),
            Domain::Euclidean { bounds } => write!(f, "euclidean domain {bounds:?}"),
            Domain::Integral { bounds } => write!(f, "integral domain {bounds:?}"),
            Domain::Discrete { items } => {
                if items.len() < 4 {
                    write!(f, "discrete domain({}): {items:?}", items.len())
                } else {
                    write!(f, "discrete domain({})", items.len())
                }
            }
            Domain::ProdDiscrete { factors } => {
                let size: usize = factors.iter().map(Vec::len).product();
                write!(f, "prod discrete domain(d={}, size={size})", factors.len())
            }
        }
    }
}
