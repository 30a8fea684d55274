//! Field constraint checks shared by the domain services.

use crate::ports::{PortError, PortResult};

/// Character-count bounds, inclusive on both ends.
pub fn check_length(field: &str, value: &str, min: usize, max: usize) -> PortResult<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(PortError::Validation(format!(
            "{} must be between {} and {} characters",
            field, min, max
        )));
    }
    Ok(())
}

pub fn check_max_length(field: &str, value: Option<&str>, max: usize) -> PortResult<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(PortError::Validation(format!(
            "{} must be at most {} characters",
            field, max
        ))),
        _ => Ok(()),
    }
}

pub fn check_range(field: &str, value: i64, min: i64, max: i64) -> PortResult<()> {
    if !(min..=max).contains(&value) {
        return Err(PortError::Validation(format!(
            "{} must be between {} and {}",
            field, min, max
        )));
    }
    Ok(())
}

pub fn check_non_negative(field: &str, value: f64) -> PortResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PortError::Validation(format!("{} must be a non-negative number", field)));
    }
    Ok(())
}
