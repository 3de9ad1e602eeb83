// This file is part of changematrix.
// Copyright (C) 2026 changematrix contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Destination storage type and layout planning.
use log::*;
use serde::{Deserialize, Serialize};

use crate::{ensure_config, errors::Result, types::SampleType};

/// Color space of an output color model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    Gray,
    Rgb,
}

/// Transparency mode of an output color model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transparency {
    Opaque,
    Bitmask,
    Translucent,
}

/// Component color model describing how output samples are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorModel {
    pub color_space: ColorSpace,
    pub num_components: usize,
    pub has_alpha: bool,
    pub premultiplied: bool,
    pub transparency: Transparency,
    pub sample_type: SampleType,
}

impl ColorModel {
    /// Minimal opaque grayscale model.
    pub fn gray(sample_type: SampleType) -> ColorModel {
        ColorModel {
            color_space: ColorSpace::Gray,
            num_components: 1,
            has_alpha: false,
            premultiplied: false,
            transparency: Transparency::Opaque,
            sample_type,
        }
    }

    /// Whether this model can describe samples of a type and band count.
    pub fn is_compatible(&self, sample_type: SampleType, bands: usize) -> bool {
        self.sample_type == sample_type && self.num_components == bands
    }

    /// The same model over a different storage type.
    pub fn with_sample_type(&self, sample_type: SampleType) -> ColorModel {
        ColorModel {
            sample_type,
            ..*self
        }
    }
}

/// Storage layout of the encoded output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputLayout {
    pub sample_type: SampleType,
    pub bands: usize,
    pub tile_width: usize,
    pub tile_height: usize,
    pub color_model: ColorModel,
}

/// Choose the destination type for a multiplier and source storage type.
///
/// The largest encoded value is `multiplier * (1 + multiplier)`. When it does
/// not fit a signed byte, unsigned 16-bit sources widen to unsigned 16-bit or
/// int, and every other source widens to short or int. The source type is
/// kept whenever it is at least as wide as the widened type.
pub fn plan_output_type(multiplier: i32, source: SampleType) -> Result<SampleType> {
    ensure_config!(
        source.is_integral(),
        "cannot encode transitions of {} sources",
        source
    );
    ensure_config!(
        multiplier > 0,
        "pixel multiplier must be positive, got {}",
        multiplier
    );

    let m = multiplier as i64;
    let max_allowed = m * (1 + m);

    let mut target = SampleType::Byte;
    if max_allowed > i8::MAX as i64 {
        target = if source == SampleType::UShort {
            if max_allowed > u16::MAX as i64 {
                SampleType::Int
            } else {
                SampleType::UShort
            }
        } else if max_allowed > i16::MAX as i64 {
            SampleType::Int
        } else {
            SampleType::Short
        };
    }

    let chosen = target.max(source);
    debug!(
        "multiplier {} (max encoded {}) on {} source: output type {}",
        multiplier, max_allowed, source, chosen
    );
    Ok(chosen)
}

/// Build the output layout for a destination type.
///
/// A supplied color model is kept when compatible; otherwise its color
/// space is carried over to the new type if the component count still
/// matches, and a grayscale opaque model is used as the fallback.
pub fn plan_layout(
    sample_type: SampleType,
    bands: usize,
    tile_width: usize,
    tile_height: usize,
    requested: Option<ColorModel>,
) -> OutputLayout {
    let color_model = match requested {
        Some(cm) if cm.is_compatible(sample_type, bands) => cm,
        Some(cm) if cm.num_components == bands => {
            warn!(
                "color model for {} samples does not fit {} output, converting",
                cm.sample_type, sample_type
            );
            cm.with_sample_type(sample_type)
        }
        Some(cm) => {
            warn!(
                "color model with {} components does not fit {}-band output, using grayscale",
                cm.num_components, bands
            );
            ColorModel::gray(sample_type)
        }
        None => ColorModel::gray(sample_type),
    };

    OutputLayout {
        sample_type,
        bands,
        tile_width: tile_width.max(1),
        tile_height: tile_height.max(1),
        color_model,
    }
}
