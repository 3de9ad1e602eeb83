// This file is part of changematrix.
// Copyright (C) 2026 changematrix contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! In-memory source rasters.
use ndarray::{s, Array2, Array3, ArrayView2, Axis};

use super::{Rect, TileGrid};
use crate::types::{RasterSample, SampleType};

/// Default tile edge for rasters built without an explicit tiling.
pub const DEFAULT_TILE_SIZE: usize = 256;

/// Band-major sample storage, shaped `(bands, rows, cols)`.
#[derive(Debug, Clone)]
pub enum RasterData {
    Byte(Array3<u8>),
    UShort(Array3<u16>),
    Short(Array3<i16>),
    Int(Array3<i32>),
    Float(Array3<f32>),
    Double(Array3<f64>),
}

/// Sample types that can back a [Raster].
pub trait BandSample: RasterSample {
    fn into_raster_data(array: Array3<Self>) -> RasterData;
    fn raster_data(data: &RasterData) -> Option<&Array3<Self>>;
}

macro_rules! band_sample {
    ($t:ty, $var:ident) => {
        impl BandSample for $t {
            fn into_raster_data(array: Array3<Self>) -> RasterData {
                RasterData::$var(array)
            }

            fn raster_data(data: &RasterData) -> Option<&Array3<Self>> {
                match data {
                    RasterData::$var(a) => Some(a),
                    _ => None,
                }
            }
        }
    };
}

band_sample!(u8, Byte);
band_sample!(u16, UShort);
band_sample!(i16, Short);
band_sample!(i32, Int);
band_sample!(f32, Float);
band_sample!(f64, Double);

impl RasterData {
    pub fn sample_type(&self) -> SampleType {
        match self {
            RasterData::Byte(_) => SampleType::Byte,
            RasterData::UShort(_) => SampleType::UShort,
            RasterData::Short(_) => SampleType::Short,
            RasterData::Int(_) => SampleType::Int,
            RasterData::Float(_) => SampleType::Float,
            RasterData::Double(_) => SampleType::Double,
        }
    }

    /// Shape as `(bands, rows, cols)`.
    pub fn dim(&self) -> (usize, usize, usize) {
        crate::with_band_array!(self, a => a.dim())
    }
}

/// A tiled, possibly multi-band raster with an origin in absolute coordinates.
#[derive(Debug, Clone)]
pub struct Raster {
    bounds: Rect,
    tile_width: usize,
    tile_height: usize,
    data: RasterData,
}

impl Raster {
    /// Create a single-band raster with its upper-left pixel at `(x, y)`.
    pub fn new<T: BandSample>(x: i64, y: i64, band: Array2<T>) -> Raster {
        Raster::multi_band(x, y, band.insert_axis(Axis(0)))
    }

    /// Create a raster from a `(bands, rows, cols)` array.
    pub fn multi_band<T: BandSample>(x: i64, y: i64, bands: Array3<T>) -> Raster {
        let (_, rows, cols) = bands.dim();
        Raster {
            bounds: Rect::new(x, y, cols as i64, rows as i64),
            tile_width: DEFAULT_TILE_SIZE,
            tile_height: DEFAULT_TILE_SIZE,
            data: T::into_raster_data(bands),
        }
    }

    /// Create a single-band raster anchored at the origin.
    pub fn from_band<T: BandSample>(band: Array2<T>) -> Raster {
        Raster::new(0, 0, band)
    }

    pub fn with_tile_size(mut self, tile_width: usize, tile_height: usize) -> Raster {
        self.tile_width = tile_width.max(1);
        self.tile_height = tile_height.max(1);
        self
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn tile_width(&self) -> usize {
        self.tile_width
    }

    pub fn tile_height(&self) -> usize {
        self.tile_height
    }

    pub fn tile_grid(&self) -> TileGrid {
        TileGrid::new(self.bounds, self.tile_width, self.tile_height)
    }

    pub fn sample_type(&self) -> SampleType {
        self.data.sample_type()
    }

    pub fn num_bands(&self) -> usize {
        self.data.dim().0
    }

    pub fn data(&self) -> &RasterData {
        &self.data
    }

    /// Borrow one band as a typed array.
    pub fn band<T: BandSample>(&self, band: usize) -> Option<ArrayView2<'_, T>> {
        let arr = T::raster_data(&self.data)?;
        if band >= arr.dim().0 {
            return None;
        }
        Some(arr.index_axis(Axis(0), band))
    }

    /// Borrow one band over a rectangle, which must lie within the bounds.
    pub fn region_view<T: BandSample>(&self, band: usize, rect: &Rect) -> Option<ArrayView2<'_, T>> {
        if !self.bounds.contains_rect(rect) {
            return None;
        }
        let arr = T::raster_data(&self.data)?;
        if band >= arr.dim().0 {
            return None;
        }
        let r0 = (rect.y - self.bounds.y) as usize;
        let c0 = (rect.x - self.bounds.x) as usize;
        let r1 = r0 + rect.height as usize;
        let c1 = c0 + rect.width as usize;
        Some(arr.slice(s![band, r0..r1, c0..c1]))
    }

    /// Read a sample as a double, if the coordinates are inside the raster.
    pub fn sample(&self, x: i64, y: i64, band: usize) -> Option<f64> {
        if !self.bounds.contains(x, y) || band >= self.num_bands() {
            return None;
        }
        let r = (y - self.bounds.y) as usize;
        let c = (x - self.bounds.x) as usize;
        Some(crate::with_band_array!(&self.data, a => a[[band, r, c]].to_f64()))
    }
}
