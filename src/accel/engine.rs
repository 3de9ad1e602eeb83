// This file is part of changematrix.
// Copyright (C) 2026 changematrix contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! The change matrix operator and its region kernel.
use log::*;
use ndarray::{ArrayView2, ArrayViewMut2};

use crate::{
    config::ChangeMatrixParams,
    config_err, dispatch_region, ensure_config,
    errors::{ChangeMatrixError, Result},
    gate::{PixelScope, RegionGate},
    matrix::{ChangeMatrix, RegionTally, NO_AREA},
    nodata::NoDataRange,
    planner::{plan_layout, plan_output_type, OutputLayout},
    raster::{BandSample, EncodedRaster, Raster, Rect, TileGrid},
    roi::Roi,
    types::{ClassSample, EncodedSample, SampleType},
};

/// A configured change matrix computation over two co-registered rasters.
///
/// Setup validates every input once; [ChangeMatrixOp::compute_rect] can then
/// be called for any region, from any thread, in any order. Each call
/// registers its pixels in the shared [ChangeMatrix].
pub struct ChangeMatrixOp<'a> {
    reference: &'a Raster,
    actual: &'a Raster,
    area: Option<&'a Raster>,
    matrix: &'a ChangeMatrix,
    multiplier: i32,
    roi: Option<Roi>,
    nodata: Option<NoDataRange>,
    layout: OutputLayout,
}

impl<'a> ChangeMatrixOp<'a> {
    pub fn new(
        reference: &'a Raster,
        actual: &'a Raster,
        area: Option<&'a Raster>,
        params: &ChangeMatrixParams,
        matrix: &'a ChangeMatrix,
    ) -> Result<ChangeMatrixOp<'a>> {
        let source = reference.sample_type();
        ensure_config!(
            source == actual.sample_type(),
            "reference ({}) and actual ({}) rasters have different data types",
            source,
            actual.sample_type()
        );
        ensure_config!(
            source.is_integral(),
            "cannot compute transitions of {} rasters",
            source
        );
        ensure_config!(
            reference.bounds() == actual.bounds(),
            "reference {:?} and actual {:?} rasters have different bounds",
            reference.bounds(),
            actual.bounds()
        );
        ensure_config!(
            reference.num_bands() == 1 && actual.num_bands() == 1,
            "source rasters must have a single band"
        );
        let bounds = reference.bounds();

        let roi = match &params.roi {
            Some(roi) => {
                ensure_config!(roi.intersects(&bounds), "ROI must intersect source bounds");
                let massaged = roi.intersect(&bounds);
                debug!("using ROI bounded by {:?}", massaged.bounds());
                Some(massaged)
            }
            None => None,
        };

        if let Some(nodata) = &params.nodata {
            if let Some(c) = matrix
                .registered_classes()
                .iter()
                .find(|c| nodata.contains_class(**c))
            {
                return Err(config_err!(
                    "one or more provided classes are contained in the no-data range (class {})",
                    c
                ));
            }
        }

        if let Some(area) = area {
            ensure_config!(
                area.sample_type() == SampleType::Double,
                "unable to process area image as it has a non double data type ({})",
                area.sample_type()
            );
            ensure_config!(area.num_bands() == 1, "area raster must have a single band");
            ensure_config!(
                area.bounds() == bounds,
                "area raster bounds {:?} do not match source bounds {:?}",
                area.bounds(),
                bounds
            );
        }

        let sample_type = plan_output_type(params.multiplier, source)?;
        let tile = params.tile_size;
        let layout = plan_layout(
            sample_type,
            1,
            tile.unwrap_or(reference.tile_width()),
            tile.unwrap_or(reference.tile_height()),
            params.color_model,
        );

        Ok(ChangeMatrixOp {
            reference,
            actual,
            area,
            matrix,
            multiplier: params.multiplier,
            roi,
            nodata: params.nodata,
            layout,
        })
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    pub fn bounds(&self) -> Rect {
        self.reference.bounds()
    }

    pub fn matrix(&self) -> &ChangeMatrix {
        self.matrix
    }

    /// The ROI after trimming to the source bounds.
    pub fn roi(&self) -> Option<&Roi> {
        self.roi.as_ref()
    }

    /// Tile grid of the encoded output.
    pub fn tile_grid(&self) -> TileGrid {
        TileGrid::new(self.bounds(), self.layout.tile_width, self.layout.tile_height)
    }

    /// Allocate an output buffer for a region, filled with the sentinel.
    pub fn create_output(&self, rect: Rect) -> Result<EncodedRaster> {
        EncodedRaster::new(self.layout.sample_type, rect)
    }

    /// Compute one tile of the output grid.
    pub fn compute_tile(&self, tx: usize, ty: usize) -> Result<EncodedRaster> {
        let rect = self.tile_grid().tile_rect(tx, ty);
        let mut tile = self.create_output(rect)?;
        self.compute_rect(&mut tile)?;
        Ok(tile)
    }

    /// Compute the region covered by `dest`, encoding into it and
    /// registering its in-scope pixels.
    pub fn compute_rect(&self, dest: &mut EncodedRaster) -> Result<()> {
        let rect = dest.bounds();
        if rect.is_empty() {
            return Ok(());
        }
        ensure_config!(
            self.bounds().contains_rect(&rect),
            "region {:?} is outside the source bounds {:?}",
            rect,
            self.bounds()
        );
        ensure_config!(
            dest.sample_type() == self.layout.sample_type,
            "destination is {}, expected {}",
            dest.sample_type(),
            self.layout.sample_type
        );

        let Some(gate) = RegionGate::open(&rect, self.roi.as_ref(), self.nodata.as_ref()) else {
            dest.data_mut().fill_sentinel();
            return Ok(());
        };

        let area = match self.area {
            Some(a) => Some(a.region_view::<f64>(0, &rect).ok_or_else(|| {
                ChangeMatrixError::Internal(format!("area raster does not cover {:?}", rect))
            })?),
            None => None,
        };

        let source = self.reference.sample_type();
        let target = dest.sample_type();
        trace!("computing {:?} ({} -> {})", rect, source, target);
        let res = dispatch_region!(source, dest.data_mut(), encode_region(self, &gate, &rect, area), {
            Byte(u8) => Byte(i8),
            Byte(u8) => Short(i16),
            Byte(u8) => Int(i32),
            UShort(u16) => UShort(u16),
            UShort(u16) => Int(i32),
            Short(i16) => Short(i16),
            Short(i16) => Int(i32),
            Int(i32) => Int(i32),
        });
        match res {
            Some(r) => r,
            None => Err(ChangeMatrixError::Internal(format!(
                "no kernel for {} sources with {} output",
                source, target
            ))),
        }
    }
}

/// Encode and register one region.
///
/// Every pixel is checked against the multiplier, in or out of the ROI.
/// Transitions are tallied locally and merged into the matrix once the
/// whole region succeeded. Int sources written to int output wrap instead
/// of failing the fit check.
fn encode_region<S, D>(
    op: &ChangeMatrixOp<'_>,
    gate: &RegionGate<'_>,
    rect: &Rect,
    area: Option<ArrayView2<'_, f64>>,
    mut dest: ArrayViewMut2<'_, D>,
) -> Result<()>
where
    S: ClassSample + BandSample,
    D: EncodedSample,
{
    let missing = || ChangeMatrixError::Internal(format!("source rasters do not cover {:?}", rect));
    let reference = op.reference.region_view::<S>(0, rect).ok_or_else(missing)?;
    let actual = op.actual.region_view::<S>(0, rect).ok_or_else(missing)?;
    let multiplier = op.multiplier;
    let wrapping = S::SAMPLE_TYPE == SampleType::Int && D::SAMPLE_TYPE == SampleType::Int;
    let mut tally = RegionTally::new();

    for ((r, c), out) in dest.indexed_iter_mut() {
        let x = rect.x + c as i64;
        let y = rect.y + r as i64;
        let before = reference[[r, c]].class();
        let after = actual[[r, c]].class();
        if before > multiplier || after > multiplier {
            return Err(ChangeMatrixError::IllegalInput {
                multiplier,
                class: before.max(after),
                x,
                y,
            });
        }

        let pixel_area = area.as_ref().map_or(NO_AREA, |a| a[[r, c]]);
        match gate.classify(x, y, before, after) {
            PixelScope::Outside => *out = D::SENTINEL,
            PixelScope::NoData(pair) => {
                tally.record(pair, pixel_area);
                *out = D::SENTINEL;
            }
            PixelScope::Valid(pair) => {
                let encoded = before as i64 + multiplier as i64 * after as i64;
                let value = if wrapping {
                    Some(D::wrap_encoded(encoded))
                } else {
                    D::from_encoded(encoded)
                };
                *out = value.ok_or_else(|| {
                    ChangeMatrixError::Internal(format!(
                        "encoded value {} at ({}, {}) does not fit {} output",
                        encoded,
                        x,
                        y,
                        D::SAMPLE_TYPE
                    ))
                })?;
                tally.record(pair, pixel_area);
            }
        }
    }
    op.matrix.merge(tally);
    Ok(())
}
