//! Base parameter record handed to the simulator.
//!
//! Sweep steps never mutate the base record: each step gets its own copy with
//! the swept values applied.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tonosweep_core::SweepValue;

/// Named simulation parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    values: BTreeMap<String, SweepValue>,
}

/// Ties a neuron category to the parameter that holds its layer size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub size_parameter: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParameterError {
    Missing {
        category: String,
        parameter: String,
    },
    NotASize {
        category: String,
        parameter: String,
        value: SweepValue,
    },
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterError::Missing {
                category,
                parameter,
            } => write!(
                f,
                "size parameter `{parameter}` for category `{category}` is not set"
            ),
            ParameterError::NotASize {
                category,
                parameter,
                value,
            } => write!(
                f,
                "size parameter `{parameter}` for category `{category}` must be a non-negative integer, got {value}"
            ),
        }
    }
}

impl std::error::Error for ParameterError {}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: SweepValue) -> Option<SweepValue> {
        self.values.insert(name.into(), value)
    }

    pub fn with(mut self, name: impl Into<String>, value: SweepValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&SweepValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SweepValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// A copy of this record with the given values replaced
    pub fn with_overrides<'a>(
        &self,
        overrides: impl IntoIterator<Item = (&'a str, &'a SweepValue)>,
    ) -> Self {
        let mut copy = self.clone();
        for (name, value) in overrides {
            copy.insert(name, value.clone());
        }
        copy
    }

    /// Resolve each category's layer size through its configured parameter
    pub fn category_sizes(
        &self,
        categories: &BTreeMap<String, CategoryConfig>,
    ) -> Result<BTreeMap<String, u64>, ParameterError> {
        categories
            .iter()
            .map(|(category, config)| -> Result<(String, u64), ParameterError> {
                let value = self.get(&config.size_parameter).ok_or_else(|| {
                    ParameterError::Missing {
                        category: category.clone(),
                        parameter: config.size_parameter.clone(),
                    }
                })?;
                let size = value.as_u64().ok_or_else(|| ParameterError::NotASize {
                    category: category.clone(),
                    parameter: config.size_parameter.clone(),
                    value: value.clone(),
                })?;
                Ok((category.clone(), size))
            })
            .collect()
    }
}
