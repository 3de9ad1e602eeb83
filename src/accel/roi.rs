// This file is part of changematrix.
// Copyright (C) 2026 changematrix contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Regions of interest.
use ndarray::{s, Array2};

use crate::raster::Rect;

/// A region of interest in absolute raster coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Roi {
    /// Union of rectangles.
    Rects(Vec<Rect>),
    /// Bit mask shaped `(rows, cols)`, with its upper-left pixel at the corner of `bounds`.
    Mask { bounds: Rect, mask: Array2<bool> },
}

impl From<Rect> for Roi {
    fn from(rect: Rect) -> Roi {
        Roi::from_rects(vec![rect])
    }
}

impl Roi {
    /// Create a ROI from a union of rectangles; empty rectangles are dropped.
    pub fn from_rects(rects: Vec<Rect>) -> Roi {
        Roi::Rects(rects.into_iter().filter(|r| !r.is_empty()).collect())
    }

    /// Create a ROI from a mask whose upper-left pixel is at `(x, y)`.
    pub fn from_mask(x: i64, y: i64, mask: Array2<bool>) -> Roi {
        let (rows, cols) = mask.dim();
        Roi::Mask {
            bounds: Rect::new(x, y, cols as i64, rows as i64),
            mask,
        }
    }

    /// Bounding rectangle of the region.
    pub fn bounds(&self) -> Rect {
        match self {
            Roi::Rects(rects) => rects
                .iter()
                .fold(Rect::default(), |acc, r| acc.union(r)),
            Roi::Mask { bounds, .. } => *bounds,
        }
    }

    /// Whether the region covers no pixels at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Roi::Rects(rects) => rects.is_empty(),
            Roi::Mask { mask, .. } => !mask.iter().any(|b| *b),
        }
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        match self {
            Roi::Rects(rects) => rects.iter().any(|r| r.contains(x, y)),
            Roi::Mask { bounds, mask } => {
                bounds.contains(x, y)
                    && mask[[(y - bounds.y) as usize, (x - bounds.x) as usize]]
            }
        }
    }

    /// Whether any pixel of the region lies inside `rect`.
    pub fn intersects(&self, rect: &Rect) -> bool {
        !self.intersect(rect).is_empty()
    }

    /// Trim the region to a rectangle.
    pub fn intersect(&self, rect: &Rect) -> Roi {
        match self {
            Roi::Rects(rects) => {
                Roi::from_rects(rects.iter().map(|r| r.intersection(rect)).collect())
            }
            Roi::Mask { bounds, mask } => {
                let clip = bounds.intersection(rect);
                if clip.is_empty() {
                    return Roi::Rects(Vec::new());
                }
                let r0 = (clip.y - bounds.y) as usize;
                let c0 = (clip.x - bounds.x) as usize;
                let r1 = r0 + clip.height as usize;
                let c1 = c0 + clip.width as usize;
                Roi::Mask {
                    bounds: clip,
                    mask: mask.slice(s![r0..r1, c0..c1]).to_owned(),
                }
            }
        }
    }
}
