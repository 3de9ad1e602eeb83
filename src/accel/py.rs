// This file is part of changematrix.
// Copyright (C) 2026 changematrix contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Python bindings.
use std::sync::Arc;

use arrow::{array::RecordBatch, pyarrow::PyArrowType};
use numpy::{PyArray2, PyArrayMethods, ToPyArray};
use pyo3::{
    exceptions::{PyRuntimeError, PyTypeError},
    prelude::*,
};

use crate::{
    config::ChangeMatrixParams, engine::ChangeMatrixOp, matrix::ChangeMatrix, parallel,
    raster::Raster,
};

/// Python handle to a shared change matrix.
#[pyclass(name = "ChangeMatrix", frozen)]
pub struct PyChangeMatrix {
    inner: Arc<ChangeMatrix>,
}

#[pymethods]
impl PyChangeMatrix {
    #[new]
    fn new(classes: Vec<i32>) -> Self {
        PyChangeMatrix {
            inner: Arc::new(ChangeMatrix::new(classes)),
        }
    }

    fn freeze(&self) {
        self.inner.freeze()
    }

    #[getter]
    fn frozen(&self) -> bool {
        self.inner.is_frozen()
    }

    fn pair_count(&self, reference: i32, actual: i32) -> u64 {
        self.inner.pair_count(reference, actual)
    }

    fn pair_area(&self, reference: i32, actual: i32) -> f64 {
        self.inner.pair_area(reference, actual)
    }

    fn registered_classes(&self) -> Vec<i32> {
        self.inner.registered_classes().iter().copied().collect()
    }

    fn total_registrations(&self) -> u64 {
        self.inner.total_registrations()
    }

    /// Export the matrix as a PyArrow record batch.
    fn to_arrow(&self) -> PyResult<PyArrowType<RecordBatch>> {
        Ok(self.inner.to_record_batch()?.into())
    }
}

macro_rules! try_band {
    ($obj:expr, $($t:ty),+) => {
        $(
            if let Ok(arr) = $obj.downcast::<PyArray2<$t>>() {
                return Ok(Raster::from_band(arr.readonly().as_array().to_owned()));
            }
        )+
    };
}

fn raster_from_numpy(name: &str, obj: &Bound<'_, PyAny>) -> PyResult<Raster> {
    try_band!(obj, u8, u16, i16, i32, f32, f64);
    Err(PyTypeError::new_err(format!(
        "{} must be a 2-D array of uint8, uint16, int16, int32, float32 or float64",
        name
    )))
}

/// Compute the encoded transition raster of two class rasters, registering
/// every pixel in `matrix`.
///
/// `params` is a JSON object of operation parameters.
#[pyfunction]
#[pyo3(signature = (reference, actual, matrix, params, area=None))]
pub fn compute_change_matrix<'py>(
    py: Python<'py>,
    reference: &Bound<'py, PyAny>,
    actual: &Bound<'py, PyAny>,
    matrix: &Bound<'py, PyChangeMatrix>,
    params: &str,
    area: Option<&Bound<'py, PyAny>>,
) -> PyResult<Bound<'py, PyAny>> {
    let params = ChangeMatrixParams::from_json(params)?;
    let reference = raster_from_numpy("reference", reference)?;
    let actual = raster_from_numpy("actual", actual)?;
    let area = area.map(|a| raster_from_numpy("area", a)).transpose()?;
    let cm = matrix.get().inner.clone();

    let out = py.allow_threads(|| {
        let op = ChangeMatrixOp::new(&reference, &actual, area.as_ref(), &params, &cm)?;
        parallel::compute_all(&op)
    })?;

    Ok(crate::with_encoded_array!(out.data(), a => a.to_pyarray(py).into_any()))
}

#[pyfunction]
pub fn init_accel_pool(n_threads: usize) -> PyResult<()> {
    parallel::init_pool(n_threads)
        .map_err(|_| PyErr::new::<PyRuntimeError, _>("Rayon initialization error"))
}

#[pyfunction]
pub fn thread_count() -> PyResult<usize> {
    Ok(parallel::thread_count())
}

/// Register the Python classes and functions.
pub fn register_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyChangeMatrix>()?;
    m.add_function(wrap_pyfunction!(compute_change_matrix, m)?)?;
    m.add_function(wrap_pyfunction!(init_accel_pool, m)?)?;
    m.add_function(wrap_pyfunction!(thread_count, m)?)?;
    Ok(())
}
