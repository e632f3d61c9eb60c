use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single candidate value of a swept variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SweepValue {
    Flag(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl SweepValue {
    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SweepValue::Integer(v) => Some(*v as f64),
            SweepValue::Float(v) => Some(*v),
            SweepValue::Flag(_) | SweepValue::Text(_) => None,
        }
    }

    /// Integer view of the value. Floats with no fractional part count.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            SweepValue::Integer(v) => u64::try_from(*v).ok(),
            SweepValue::Float(v) if *v >= 0.0 && v.fract() == 0.0 => Some(*v as u64),
            _ => None,
        }
    }
}

impl fmt::Display for SweepValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepValue::Flag(v) => write!(f, "{v}"),
            SweepValue::Integer(v) => write!(f, "{v}"),
            SweepValue::Float(v) => write!(f, "{v}"),
            SweepValue::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for SweepValue {
    fn from(v: f64) -> Self {
        SweepValue::Float(v)
    }
}

impl From<i64> for SweepValue {
    fn from(v: i64) -> Self {
        SweepValue::Integer(v)
    }
}

impl From<i32> for SweepValue {
    fn from(v: i32) -> Self {
        SweepValue::Integer(v.into())
    }
}

impl From<&str> for SweepValue {
    fn from(v: &str) -> Self {
        SweepValue::Text(v.to_string())
    }
}

/// Variable name → ordered candidate values.
///
/// Backed by a sorted map: the order in which variables were declared never
/// changes what gets counted or the order dimensions are enumerated in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SweepSpecification {
    domains: BTreeMap<String, Vec<SweepValue>>,
}

impl SweepSpecification {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the domain of a variable
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        values: Vec<SweepValue>,
    ) -> Option<Vec<SweepValue>> {
        self.domains.insert(name.into(), values)
    }

    /// Builder-style variant of [`insert`](Self::insert)
    pub fn with(mut self, name: impl Into<String>, values: Vec<SweepValue>) -> Self {
        self.insert(name, values);
        self
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Variable names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.domains.keys().map(String::as_str)
    }

    pub fn domain(&self, name: &str) -> Option<&[SweepValue]> {
        self.domains.get(name).map(Vec::as_slice)
    }

    pub fn domain_len(&self, name: &str) -> Option<usize> {
        self.domains.get(name).map(Vec::len)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[SweepValue])> {
        self.domains
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<SweepValue>)> for SweepSpecification {
    fn from_iter<I: IntoIterator<Item = (K, Vec<SweepValue>)>>(iter: I) -> Self {
        Self {
            domains: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// How variables are grouped into sweep dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepMode {
    /// Each variable is swept on its own
    #[default]
    Single,
    /// Every unordered pair of variables is swept jointly
    #[serde(alias = "double")]
    Paired,
}

impl fmt::Display for SweepMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepMode::Single => write!(f, "single"),
            SweepMode::Paired => write!(f, "paired"),
        }
    }
}

/// Identifies one sweep dimension
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DimensionId {
    Single(String),
    Pair(String, String),
}

impl DimensionId {
    pub fn single(name: impl Into<String>) -> Self {
        DimensionId::Single(name.into())
    }

    /// Pairs are unordered; names are stored sorted so `(a, b) == (b, a)`.
    pub fn pair(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            DimensionId::Pair(a, b)
        } else {
            DimensionId::Pair(b, a)
        }
    }

    /// The variable names this dimension sweeps
    pub fn names(&self) -> Vec<&str> {
        match self {
            DimensionId::Single(name) => vec![name.as_str()],
            DimensionId::Pair(a, b) => vec![a.as_str(), b.as_str()],
        }
    }

    /// Whether this identifier has the shape the mode expects
    pub fn matches_mode(&self, mode: SweepMode) -> bool {
        matches!(
            (self, mode),
            (DimensionId::Single(_), SweepMode::Single) | (DimensionId::Pair(..), SweepMode::Paired)
        )
    }
}

impl fmt::Display for DimensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionId::Single(name) => write!(f, "{name}"),
            DimensionId::Pair(a, b) => write!(f, "({a}, {b})"),
        }
    }
}

impl From<&str> for DimensionId {
    fn from(name: &str) -> Self {
        DimensionId::single(name)
    }
}

impl From<(&str, &str)> for DimensionId {
    fn from((a, b): (&str, &str)) -> Self {
        DimensionId::pair(a, b)
    }
}
