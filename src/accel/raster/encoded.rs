// This file is part of changematrix.
// Copyright (C) 2026 changematrix contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Destination buffers holding encoded transitions.
use ndarray::{s, Array2, ArrayView2};

use super::Rect;
use crate::{
    config_err,
    errors::Result,
    types::{EncodedSample, SampleType},
};

/// Typed single-band storage for encoded values, shaped `(rows, cols)`.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodedData {
    Byte(Array2<i8>),
    UShort(Array2<u16>),
    Short(Array2<i16>),
    Int(Array2<i32>),
}

/// Sample types that can back an [EncodedRaster].
pub trait EncodedBand: EncodedSample {
    fn encoded(data: &EncodedData) -> Option<&Array2<Self>>;
}

macro_rules! encoded_band {
    ($t:ty, $var:ident) => {
        impl EncodedBand for $t {
            fn encoded(data: &EncodedData) -> Option<&Array2<Self>> {
                match data {
                    EncodedData::$var(a) => Some(a),
                    _ => None,
                }
            }
        }
    };
}

encoded_band!(i8, Byte);
encoded_band!(u16, UShort);
encoded_band!(i16, Short);
encoded_band!(i32, Int);

fn filled<T: EncodedSample>(rows: usize, cols: usize) -> Array2<T> {
    Array2::from_elem((rows, cols), T::SENTINEL)
}

fn fill_sentinel<T: EncodedSample>(array: &mut Array2<T>) {
    array.fill(T::SENTINEL)
}

impl EncodedData {
    /// Allocate storage of a destination type, filled with its sentinel.
    pub fn sentinel_filled(sample_type: SampleType, rows: usize, cols: usize) -> Result<Self> {
        Ok(match sample_type {
            SampleType::Byte => EncodedData::Byte(filled(rows, cols)),
            SampleType::UShort => EncodedData::UShort(filled(rows, cols)),
            SampleType::Short => EncodedData::Short(filled(rows, cols)),
            SampleType::Int => EncodedData::Int(filled(rows, cols)),
            t => return Err(config_err!("{} is not a valid destination type", t)),
        })
    }

    pub fn sample_type(&self) -> SampleType {
        match self {
            EncodedData::Byte(_) => SampleType::Byte,
            EncodedData::UShort(_) => SampleType::UShort,
            EncodedData::Short(_) => SampleType::Short,
            EncodedData::Int(_) => SampleType::Int,
        }
    }

    pub fn dim(&self) -> (usize, usize) {
        crate::with_encoded_array!(self, a => a.dim())
    }

    /// Reset every sample to the sentinel.
    pub fn fill_sentinel(&mut self) {
        crate::with_encoded_array!(self, a => fill_sentinel(a))
    }
}

/// An encoded raster (or tile of one) in absolute coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRaster {
    bounds: Rect,
    data: EncodedData,
}

impl EncodedRaster {
    /// Create a raster covering `bounds`, filled with the sentinel.
    pub fn new(sample_type: SampleType, bounds: Rect) -> Result<Self> {
        let rows = bounds.height.max(0) as usize;
        let cols = bounds.width.max(0) as usize;
        Ok(EncodedRaster {
            bounds,
            data: EncodedData::sentinel_filled(sample_type, rows, cols)?,
        })
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn sample_type(&self) -> SampleType {
        self.data.sample_type()
    }

    pub fn data(&self) -> &EncodedData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut EncodedData {
        &mut self.data
    }

    /// Borrow the samples as a typed array.
    pub fn array<T: EncodedBand>(&self) -> Option<ArrayView2<'_, T>> {
        T::encoded(&self.data).map(|a| a.view())
    }

    /// Read an encoded sample, if the coordinates are inside the raster.
    pub fn sample(&self, x: i64, y: i64) -> Option<i64> {
        if !self.bounds.contains(x, y) {
            return None;
        }
        let r = (y - self.bounds.y) as usize;
        let c = (x - self.bounds.x) as usize;
        Some(crate::with_encoded_array!(&self.data, a => a[[r, c]].to_encoded()))
    }

    /// Copy a tile into this raster; the tile must lie within the bounds and share the type.
    pub fn paste(&mut self, tile: &EncodedRaster) -> Result<()> {
        let tb = tile.bounds;
        if !tb.is_empty() && !self.bounds.contains_rect(&tb) {
            return Err(config_err!(
                "tile {:?} lies outside the raster bounds {:?}",
                tb,
                self.bounds
            ));
        }
        if tb.is_empty() {
            return Ok(());
        }
        let r0 = (tb.y - self.bounds.y) as usize;
        let c0 = (tb.x - self.bounds.x) as usize;
        let r1 = r0 + tb.height as usize;
        let c1 = c0 + tb.width as usize;
        match (&mut self.data, &tile.data) {
            (EncodedData::Byte(d), EncodedData::Byte(t)) => d.slice_mut(s![r0..r1, c0..c1]).assign(t),
            (EncodedData::UShort(d), EncodedData::UShort(t)) => {
                d.slice_mut(s![r0..r1, c0..c1]).assign(t)
            }
            (EncodedData::Short(d), EncodedData::Short(t)) => {
                d.slice_mut(s![r0..r1, c0..c1]).assign(t)
            }
            (EncodedData::Int(d), EncodedData::Int(t)) => d.slice_mut(s![r0..r1, c0..c1]).assign(t),
            (d, t) => {
                return Err(config_err!(
                    "cannot paste a {} tile into a {} raster",
                    t.sample_type(),
                    d.sample_type()
                ))
            }
        }
        Ok(())
    }
}
