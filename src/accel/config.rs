// This file is part of changematrix.
// Copyright (C) 2026 changematrix contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Operation parameters.
use serde::{Deserialize, Serialize};

use crate::{errors::Result, nodata::NoDataRange, planner::ColorModel, roi::Roi};

/// Parameters of a change matrix operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeMatrixParams {
    /// Multiplier applied to the actual class when encoding transitions.
    pub multiplier: i32,
    /// Region of interest; JSON holds it as a list of rectangles.
    #[serde(default, with = "roi_rects")]
    pub roi: Option<Roi>,
    #[serde(default)]
    pub nodata: Option<NoDataRange>,
    /// Output tile edge; defaults to the reference raster's tiling.
    #[serde(default)]
    pub tile_size: Option<usize>,
    #[serde(default)]
    pub color_model: Option<ColorModel>,
}

impl ChangeMatrixParams {
    pub fn new(multiplier: i32) -> ChangeMatrixParams {
        ChangeMatrixParams {
            multiplier,
            roi: None,
            nodata: None,
            tile_size: None,
            color_model: None,
        }
    }

    /// Parse parameters from JSON.
    pub fn from_json(json: &str) -> Result<ChangeMatrixParams> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_roi<R: Into<Roi>>(mut self, roi: R) -> ChangeMatrixParams {
        self.roi = Some(roi.into());
        self
    }

    pub fn with_nodata(mut self, nodata: NoDataRange) -> ChangeMatrixParams {
        self.nodata = Some(nodata);
        self
    }

    pub fn with_tile_size(mut self, tile_size: usize) -> ChangeMatrixParams {
        self.tile_size = Some(tile_size);
        self
    }

    pub fn with_color_model(mut self, color_model: ColorModel) -> ChangeMatrixParams {
        self.color_model = Some(color_model);
        self
    }
}

mod roi_rects {
    use serde::{de::Deserializer, ser::Error, ser::Serializer, Deserialize, Serialize};

    use crate::{raster::Rect, roi::Roi};

    pub fn serialize<S: Serializer>(roi: &Option<Roi>, ser: S) -> Result<S::Ok, S::Error> {
        match roi {
            None => ser.serialize_none(),
            Some(Roi::Rects(rects)) => Some(rects).serialize(ser),
            Some(Roi::Mask { .. }) => Err(S::Error::custom("mask ROIs cannot be serialized")),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Roi>, D::Error> {
        let rects = Option::<Vec<Rect>>::deserialize(de)?;
        Ok(rects.map(Roi::from_rects))
    }
}
