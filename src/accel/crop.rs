// This file is part of changematrix.
// Copyright (C) 2026 changematrix contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Cropping and single-source mosaicking of input rasters.
use log::*;
use ndarray::{s, Array3};

use crate::{
    ensure_config,
    errors::Result,
    nodata::NoDataRange,
    raster::{BandSample, Raster, Rect},
    roi::Roi,
};

/// No-data policy for a masked crop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MosaicNoData {
    /// Source values treated as no-data.
    pub range: NoDataRange,
    /// Value written for no-data pixels, converted to the raster's type.
    pub destination: f64,
}

/// Crop a raster to a rectangle, optionally limited to a ROI.
///
/// The result covers `rect`, the raster bounds and the ROI bounds all at
/// once. With a no-data policy, the crop is composed with [mosaic_overlay]
/// so pixels outside the ROI or inside the no-data range become no-data.
pub fn crop(
    raster: &Raster,
    rect: &Rect,
    roi: Option<&Roi>,
    nodata: Option<&MosaicNoData>,
) -> Result<Raster> {
    let mut bounds = rect.intersection(&raster.bounds());
    if let Some(roi) = roi {
        bounds = bounds.intersection(&roi.bounds());
    }
    ensure_config!(
        !bounds.is_empty(),
        "crop area {:?} does not intersect raster bounds {:?}",
        rect,
        raster.bounds()
    );
    debug!("cropping {:?} to {:?}", raster.bounds(), bounds);

    match nodata {
        Some(nd) => {
            let effective = match roi {
                Some(roi) => roi.intersect(&bounds),
                None => Roi::from(bounds),
            };
            mosaic_overlay(raster, &bounds, &effective, nd)
        }
        None => Ok(crate::with_band_array!(raster.data(), a => {
            Raster::multi_band(bounds.x, bounds.y, slice_bands(a, &raster.bounds(), &bounds))
                .with_tile_size(raster.tile_width(), raster.tile_height())
        })),
    }
}

/// Overlay a single source onto a destination covering `bounds`.
///
/// Pixels inside `roi` keep their source value unless it is in the no-data
/// range; every other pixel receives the destination no-data value.
pub fn mosaic_overlay(
    raster: &Raster,
    bounds: &Rect,
    roi: &Roi,
    nodata: &MosaicNoData,
) -> Result<Raster> {
    ensure_config!(
        raster.bounds().contains_rect(bounds),
        "mosaic bounds {:?} are outside raster bounds {:?}",
        bounds,
        raster.bounds()
    );
    Ok(crate::with_band_array!(raster.data(), a => {
        Raster::multi_band(bounds.x, bounds.y, overlay_bands(a, &raster.bounds(), bounds, roi, nodata))
            .with_tile_size(raster.tile_width(), raster.tile_height())
    }))
}

fn slice_bands<T: BandSample>(data: &Array3<T>, origin: &Rect, bounds: &Rect) -> Array3<T> {
    let r0 = (bounds.y - origin.y) as usize;
    let c0 = (bounds.x - origin.x) as usize;
    let r1 = r0 + bounds.height as usize;
    let c1 = c0 + bounds.width as usize;
    data.slice(s![.., r0..r1, c0..c1]).to_owned()
}

fn overlay_bands<T: BandSample>(
    data: &Array3<T>,
    origin: &Rect,
    bounds: &Rect,
    roi: &Roi,
    nodata: &MosaicNoData,
) -> Array3<T> {
    let fill = T::from_f64(nodata.destination);
    let mut out = slice_bands(data, origin, bounds);
    for ((_, r, c), v) in out.indexed_iter_mut() {
        let x = bounds.x + c as i64;
        let y = bounds.y + r as i64;
        if !roi.contains(x, y) || nodata.range.contains(v.to_f64()) {
            *v = fill;
        }
    }
    out
}
