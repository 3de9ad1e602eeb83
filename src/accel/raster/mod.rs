// This file is part of changematrix.
// Copyright (C) 2026 changematrix contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Raster geometry and typed pixel buffers.

mod data;
mod dispatch;
mod encoded;
mod grid;
mod rect;

pub use data::{BandSample, Raster, RasterData, DEFAULT_TILE_SIZE};
pub use encoded::{EncodedBand, EncodedData, EncodedRaster};
pub use grid::TileGrid;
pub use rect::Rect;
