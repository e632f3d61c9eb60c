//! Trial counting for single-variable and pairwise sweeps.
//!
//! All counts depend only on domain sizes, never on the order variables were
//! declared in.

use crate::error::{Result, SweepError};
use crate::model::{DimensionId, SweepMode, SweepSpecification};

/// Check that a specification can drive a sweep in the given mode
pub fn validate(spec: &SweepSpecification, mode: SweepMode) -> Result<()> {
    if spec.is_empty() {
        return Err(SweepError::InvalidSpecification(
            "no variables to sweep".to_string(),
        ));
    }
    if let Some((name, _)) = spec.iter().find(|(_, values)| values.is_empty()) {
        return Err(SweepError::InvalidSpecification(format!(
            "variable `{name}` has no test values"
        )));
    }
    if mode == SweepMode::Paired && spec.len() < 2 {
        return Err(SweepError::InvalidSpecification(format!(
            "paired sweeps need at least two variables, got {}",
            spec.len()
        )));
    }
    Ok(())
}

/// Number of sweep dimensions
pub fn count_dimensions(spec: &SweepSpecification, mode: SweepMode) -> Result<usize> {
    validate(spec, mode)?;
    let n = spec.len();
    Ok(match mode {
        SweepMode::Single => n,
        SweepMode::Paired => n * (n - 1) / 2,
    })
}

/// Total number of trials across every dimension and frequency step
pub fn count_trials(
    spec: &SweepSpecification,
    mode: SweepMode,
    frequency_count: usize,
) -> Result<usize> {
    if frequency_count == 0 {
        return Err(SweepError::InvalidSpecification(
            "frequency count must be positive".to_string(),
        ));
    }
    let per_frequency = dimensions(spec, mode)?
        .iter()
        .map(|dim| dimension_trial_count(spec, dim))
        .sum::<Result<usize>>()?;
    Ok(per_frequency * frequency_count)
}

/// Number of test points in one dimension (excluding frequency steps)
pub fn dimension_trial_count(spec: &SweepSpecification, dimension: &DimensionId) -> Result<usize> {
    let len = |name: &str| {
        spec.domain_len(name)
            .ok_or_else(|| SweepError::UnknownDimension(dimension.clone()))
    };
    match dimension {
        DimensionId::Single(name) => len(name),
        DimensionId::Pair(a, b) if a != b => Ok(len(a)? * len(b)?),
        DimensionId::Pair(..) => Err(SweepError::UnknownDimension(dimension.clone())),
    }
}

/// Dimension identifiers in canonical order.
///
/// Single mode yields the variable names sorted; paired mode yields the
/// lexicographic 2-combinations of the sorted names.
pub fn dimensions(spec: &SweepSpecification, mode: SweepMode) -> Result<Vec<DimensionId>> {
    validate(spec, mode)?;
    let names: Vec<&str> = spec.names().collect();
    Ok(match mode {
        SweepMode::Single => names.iter().map(|name| DimensionId::single(*name)).collect(),
        SweepMode::Paired => {
            let mut pairs = Vec::with_capacity(names.len() * (names.len() - 1) / 2);
            for (i, a) in names.iter().enumerate() {
                for b in &names[i + 1..] {
                    pairs.push(DimensionId::pair(*a, *b));
                }
            }
            pairs
        }
    })
}
