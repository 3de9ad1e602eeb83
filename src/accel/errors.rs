// This file is part of changematrix.
// Copyright (C) 2026 changematrix contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Error types for change matrix computation.

use thiserror::Error;

/// Errors raised while setting up or computing a change matrix.
///
/// None of these are recoverable inside the crate: the caller decides
/// whether to retry the whole operation with corrected parameters.
#[derive(Error, Debug)]
pub enum ChangeMatrixError {
    /// Invalid setup, detected before any pixel is processed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A pixel class exceeds the pixel multiplier.
    #[error(
        "pixel multiplier {multiplier} should be bigger than the maximum class ({class}) at ({x}, {y})"
    )]
    IllegalInput {
        multiplier: i32,
        class: i32,
        x: i64,
        y: i64,
    },

    /// An encoded value does not fit the destination storage type.
    #[error("internal error: {0}")]
    Internal(String),

    #[error("invalid parameters: {0}")]
    Params(#[from] serde_json::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),
}

pub type Result<T> = std::result::Result<T, ChangeMatrixError>;

/// Build a [ChangeMatrixError::Configuration] from a format string.
#[macro_export]
macro_rules! config_err {
    ($($arg:tt)*) => {
        $crate::errors::ChangeMatrixError::Configuration(format!($($arg)*))
    };
}

/// Return a configuration error unless the condition holds.
#[macro_export]
macro_rules! ensure_config {
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::config_err!($($arg)*));
        }
    };
}

#[cfg(feature = "python")]
impl From<ChangeMatrixError> for pyo3::PyErr {
    fn from(err: ChangeMatrixError) -> Self {
        use pyo3::exceptions::{PyRuntimeError, PyValueError};
        match err {
            ChangeMatrixError::Internal(_) | ChangeMatrixError::Arrow(_) => {
                PyRuntimeError::new_err(err.to_string())
            }
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

#[test]
fn test_illegal_input_message() {
    let err = ChangeMatrixError::IllegalInput {
        multiplier: 1,
        class: 36,
        x: 4,
        y: 2,
    };
    let msg = err.to_string();
    assert!(msg.contains("should be bigger than the maximum class"));
    assert!(msg.contains("(36)"));
}

#[test]
fn test_config_macro() {
    fn check(ok: bool) -> Result<()> {
        ensure_config!(ok, "value {} rejected", 7);
        Ok(())
    }
    assert!(check(true).is_ok());
    let err = check(false).unwrap_err();
    assert!(matches!(err, ChangeMatrixError::Configuration(_)));
    assert_eq!(err.to_string(), "configuration error: value 7 rejected");
}
