//! Tuning-curve statistics over per-frequency firing rates.
//!
//! A unit's tuning width is the number of frequency steps at which it fired
//! at all. Widths are summarized per neuron category as a mean with its
//! standard error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::RateError;

/// Rates observed at one frequency step: category → rate of each unit
pub type FrequencyRates = BTreeMap<String, Vec<f64>>;

/// Rates accumulated over every frequency step of one test point,
/// indexed as category → unit → frequency step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FiringRates {
    categories: BTreeMap<String, Vec<Vec<f64>>>,
}

impl FiringRates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one frequency step. The first step fixes the category set and
    /// the number of units per category.
    pub fn record_frequency(&mut self, rates: FrequencyRates) -> Result<(), RateError> {
        if self.categories.is_empty() {
            self.categories = rates
                .into_iter()
                .map(|(category, units)| (category, units.into_iter().map(|r| vec![r]).collect()))
                .collect();
            return Ok(());
        }

        if !self.categories.keys().eq(rates.keys()) {
            return Err(RateError::CategoryMismatch {
                expected: self.categories.keys().cloned().collect(),
                found: rates.keys().cloned().collect(),
            });
        }
        for (category, units) in &rates {
            let expected = self.categories[category].len();
            if units.len() != expected {
                return Err(RateError::UnitCountMismatch {
                    category: category.clone(),
                    expected,
                    found: units.len(),
                });
            }
        }

        for (category, units) in rates {
            if let Some(history) = self.categories.get_mut(&category) {
                for (unit, rate) in history.iter_mut().zip(units) {
                    unit.push(rate);
                }
            }
        }
        Ok(())
    }

    pub fn category(&self, name: &str) -> Option<&[Vec<f64>]> {
        self.categories.get(name).map(Vec::as_slice)
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &[Vec<f64>])> {
        self.categories
            .iter()
            .map(|(name, units)| (name.as_str(), units.as_slice()))
    }
}

/// Tuning-width summary for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuningStats {
    pub units: usize,
    pub mean_width: f64,
    /// Standard error of the mean; `None` with fewer than two units
    pub sem: Option<f64>,
}

/// Number of frequency steps with a non-zero rate
pub fn tuning_width(unit_rates: &[f64]) -> usize {
    unit_rates.iter().filter(|&&r| r != 0.0).count()
}

/// Mean and standard error (sample deviation over `sqrt(n)`)
pub fn mean_and_sem(values: &[f64]) -> (f64, Option<f64>) {
    let n = values.len();
    if n == 0 {
        return (0.0, None);
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    if n < 2 {
        return (mean, None);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    (mean, Some(variance.sqrt() / (n as f64).sqrt()))
}

/// Tuning statistics for every category
pub fn summarize(rates: &FiringRates) -> BTreeMap<String, TuningStats> {
    rates
        .categories()
        .map(|(category, units)| {
            let widths: Vec<f64> = units.iter().map(|u| tuning_width(u) as f64).collect();
            let (mean_width, sem) = mean_and_sem(&widths);
            (
                category.to_string(),
                TuningStats {
                    units: units.len(),
                    mean_width,
                    sem,
                },
            )
        })
        .collect()
}
