// This file is part of changematrix.
// Copyright (C) 2026 changematrix contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! No-data value ranges.
use ordered_float::NotNan;
use serde::{Deserialize, Serialize};

use crate::{ensure_config, errors::ChangeMatrixError, errors::Result};

/// A range of sample values treated as no-data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct NoDataRange {
    min: NotNan<f64>,
    max: NotNan<f64>,
    min_included: bool,
    max_included: bool,
}

#[derive(Deserialize)]
struct RawRange {
    min: f64,
    max: f64,
    #[serde(default = "included")]
    min_included: bool,
    #[serde(default = "included")]
    max_included: bool,
}

fn included() -> bool {
    true
}

impl TryFrom<RawRange> for NoDataRange {
    type Error = ChangeMatrixError;

    fn try_from(raw: RawRange) -> Result<NoDataRange> {
        NoDataRange::new(raw.min, raw.max, raw.min_included, raw.max_included)
    }
}

impl NoDataRange {
    /// Create a range, rejecting NaN bounds and reversed ranges.
    pub fn new(min: f64, max: f64, min_included: bool, max_included: bool) -> Result<NoDataRange> {
        let min = NotNan::new(min)
            .map_err(|_| crate::config_err!("no-data range minimum is NaN"))?;
        let max = NotNan::new(max)
            .map_err(|_| crate::config_err!("no-data range maximum is NaN"))?;
        ensure_config!(
            min <= max,
            "no-data range minimum {} is greater than maximum {}",
            min,
            max
        );
        Ok(NoDataRange {
            min,
            max,
            min_included,
            max_included,
        })
    }

    /// Closed range `[min, max]`.
    pub fn inclusive(min: f64, max: f64) -> Result<NoDataRange> {
        NoDataRange::new(min, max, true, true)
    }

    /// Range holding exactly one value.
    pub fn single(value: f64) -> Result<NoDataRange> {
        NoDataRange::inclusive(value, value)
    }

    pub fn min(&self) -> f64 {
        self.min.into_inner()
    }

    pub fn max(&self) -> f64 {
        self.max.into_inner()
    }

    pub fn contains(&self, value: f64) -> bool {
        let Ok(value) = NotNan::new(value) else {
            return false;
        };
        let above = if self.min_included {
            value >= self.min
        } else {
            value > self.min
        };
        let below = if self.max_included {
            value <= self.max
        } else {
            value < self.max
        };
        above && below
    }

    pub fn contains_class(&self, class: i32) -> bool {
        self.contains(class as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusive_bounds() {
        let r = NoDataRange::new(4.0, 6.0, false, false).unwrap();
        assert!(r.contains_class(5));
        assert!(!r.contains_class(4));
        assert!(!r.contains_class(6));
    }

    #[test]
    fn test_single() {
        let r = NoDataRange::single(0.0).unwrap();
        assert!(r.contains_class(0));
        assert!(!r.contains_class(1));
        assert!(!r.contains(f64::NAN));
    }

    #[test]
    fn test_invalid() {
        assert!(NoDataRange::inclusive(f64::NAN, 1.0).is_err());
        assert!(NoDataRange::inclusive(3.0, 1.0).is_err());
    }

    #[test]
    fn test_deserialize() {
        let r: NoDataRange = serde_json::from_str(r#"{"min": 1, "max": 3, "max_included": false}"#).unwrap();
        assert!(r.contains_class(1));
        assert!(!r.contains_class(3));
        assert!(serde_json::from_str::<NoDataRange>(r#"{"min": 5, "max": 3}"#).is_err());
    }
}
