// This file is part of changematrix.
// Copyright (C) 2026 changematrix contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Integer rectangles in absolute raster coordinates.
use serde::{Deserialize, Serialize};

/// A rectangle of pixels; `x`/`y` is the upper-left corner, maxima are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl Rect {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Rect {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle anchored at the origin.
    pub fn sized(width: usize, height: usize) -> Rect {
        Rect::new(0, 0, width as i64, height as i64)
    }

    pub fn max_x(&self) -> i64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> i64 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Number of pixels covered.
    pub fn area(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            (self.width as u64) * (self.height as u64)
        }
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.x && y >= self.y && x < self.max_x() && y < self.max_y()
    }

    /// Whether `other` lies entirely within this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        !other.is_empty()
            && !self.is_empty()
            && other.x >= self.x
            && other.y >= self.y
            && other.max_x() <= self.max_x()
            && other.max_y() <= self.max_y()
    }

    /// Intersection of two rectangles; empty rectangles have zero size.
    pub fn intersection(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let mx = self.max_x().min(other.max_x());
        let my = self.max_y().min(other.max_y());
        if mx <= x || my <= y {
            Rect::new(x, y, 0, 0)
        } else {
            Rect::new(x, y, mx - x, my - y)
        }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        !self.intersection(other).is_empty()
    }

    /// Expand the rectangle by `dx`/`dy` pixels on each side.
    pub fn grow(&self, dx: i64, dy: i64) -> Rect {
        Rect::new(
            self.x - dx,
            self.y - dy,
            self.width + 2 * dx,
            self.height + 2 * dy,
        )
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let mx = self.max_x().max(other.max_x());
        let my = self.max_y().max(other.max_y());
        Rect::new(x, y, mx - x, my - y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersection() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_eq!(a.intersection(&b), Rect::new(5, 5, 5, 5));
        assert!(a.intersects(&b));
    }

    #[test]
    fn test_disjoint() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 3, 3);
        assert!(a.intersection(&b).is_empty());
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_grow() {
        let r = Rect::new(4, 4, 2, 3).grow(1, 1);
        assert_eq!(r, Rect::new(3, 3, 4, 5));
        assert!(r.contains(3, 7));
        assert!(!r.contains(7, 3));
    }

    #[test]
    fn test_contains_rect() {
        let outer = Rect::new(0, 0, 10, 10);
        assert!(outer.contains_rect(&Rect::new(2, 2, 8, 8)));
        assert!(!outer.contains_rect(&Rect::new(2, 2, 9, 8)));
        assert!(!outer.contains_rect(&Rect::new(2, 2, 0, 8)));
    }

    #[test]
    fn test_union() {
        let a = Rect::new(0, 0, 2, 2);
        let b = Rect::new(5, 1, 2, 4);
        assert_eq!(a.union(&b), Rect::new(0, 0, 7, 5));
        assert_eq!(a.union(&Rect::default()), a);
    }
}
