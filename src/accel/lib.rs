// This file is part of changematrix.
// Copyright (C) 2026 changematrix contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Land-cover change matrices over tiled class rasters.
//!
//! A [ChangeMatrixOp] encodes each pixel of a reference and an actual class
//! raster as `reference + multiplier * actual`, and registers the transition
//! in a shared [ChangeMatrix].  Regions can be computed concurrently; see
//! [parallel::compute_all] for a driver over the whole output grid.

mod atomic;
pub mod config;
pub mod crop;
pub mod engine;
pub mod errors;
pub mod gate;
pub mod matrix;
pub mod nodata;
pub mod parallel;
pub mod planner;
mod progress;
pub mod raster;
pub mod roi;
pub mod types;

#[cfg(feature = "python")]
mod py;

pub use config::ChangeMatrixParams;
pub use engine::ChangeMatrixOp;
pub use errors::{ChangeMatrixError, Result};
pub use matrix::{ChangeMatrix, ClassPair, PairTally, NODATA_CLASS};
pub use nodata::NoDataRange;
pub use raster::{EncodedRaster, Raster, Rect};
pub use roi::Roi;
pub use types::SampleType;

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Entry point for the Python extension module.
#[cfg(feature = "python")]
#[pymodule]
fn changematrix(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();
    py::register_py(m)
}
