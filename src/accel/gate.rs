// This file is part of changematrix.
// Copyright (C) 2026 changematrix contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Per-region ROI and no-data resolution.
use log::*;

use crate::{
    matrix::{ClassPair, NODATA_CLASS},
    nodata::NoDataRange,
    raster::Rect,
    roi::Roi,
};

/// How a single pixel takes part in the computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelScope {
    /// Outside the ROI: neither registered nor encoded.
    Outside,
    /// At least one side is no-data; that side is replaced by [NODATA_CLASS].
    NoData(ClassPair),
    /// A regular transition.
    Valid(ClassPair),
}

/// ROI and no-data policy resolved for one region.
#[derive(Debug, Clone)]
pub struct RegionGate<'a> {
    roi: Option<Roi>,
    nodata: Option<&'a NoDataRange>,
}

impl<'a> RegionGate<'a> {
    /// Resolve the gate for a region, or `None` if the region lies entirely
    /// outside the ROI and should be skipped.
    ///
    /// The ROI is trimmed to the region grown by one pixel on each side.
    pub fn open(
        rect: &Rect,
        roi: Option<&Roi>,
        nodata: Option<&'a NoDataRange>,
    ) -> Option<RegionGate<'a>> {
        let roi = match roi {
            Some(roi) => {
                let trimmed = roi.intersect(&rect.grow(1, 1));
                if trimmed.is_empty() {
                    trace!("region {:?} is outside the ROI, skipping", rect);
                    return None;
                }
                Some(trimmed)
            }
            None => None,
        };
        Some(RegionGate { roi, nodata })
    }

    pub fn in_scope(&self, x: i64, y: i64) -> bool {
        match &self.roi {
            Some(roi) => roi.contains(x, y),
            None => true,
        }
    }

    /// Classify the pixel at `(x, y)` with the given classes.
    pub fn classify(&self, x: i64, y: i64, reference: i32, actual: i32) -> PixelScope {
        if !self.in_scope(x, y) {
            return PixelScope::Outside;
        }
        if let Some(nodata) = self.nodata {
            let ref_nd = nodata.contains_class(reference);
            let act_nd = nodata.contains_class(actual);
            if ref_nd || act_nd {
                return PixelScope::NoData(ClassPair::new(
                    if ref_nd { NODATA_CLASS } else { reference },
                    if act_nd { NODATA_CLASS } else { actual },
                ));
            }
        }
        PixelScope::Valid(ClassPair::new(reference, actual))
    }
}
