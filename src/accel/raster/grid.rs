// This file is part of changematrix.
// Copyright (C) 2026 changematrix contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

use log::*;

use super::Rect;

/// Regular grid of tiles covering a raster, anchored at its origin.
#[derive(Debug, Clone)]
pub struct TileGrid {
    bounds: Rect,
    tile_width: usize,
    tile_height: usize,
    pub num_tiles_x: usize,
    pub num_tiles_y: usize,
}

impl TileGrid {
    pub fn new(bounds: Rect, tile_width: usize, tile_height: usize) -> TileGrid {
        let tile_width = tile_width.max(1);
        let tile_height = tile_height.max(1);
        let width = bounds.width.max(0) as usize;
        let height = bounds.height.max(0) as usize;
        let num_tiles_x = width.div_ceil(tile_width);
        let num_tiles_y = height.div_ceil(tile_height);

        trace!(
            "tile grid: {}x{} raster, {}x{} tiles -> {}x{} grid",
            width,
            height,
            tile_width,
            tile_height,
            num_tiles_x,
            num_tiles_y
        );

        TileGrid {
            bounds,
            tile_width,
            tile_height,
            num_tiles_x,
            num_tiles_y,
        }
    }

    pub fn total_tiles(&self) -> usize {
        self.num_tiles_x * self.num_tiles_y
    }

    /// Rectangle of a tile, clipped to the raster bounds.
    pub fn tile_rect(&self, tx: usize, ty: usize) -> Rect {
        let x = self.bounds.x + (tx * self.tile_width) as i64;
        let y = self.bounds.y + (ty * self.tile_height) as i64;
        let tile = Rect::new(x, y, self.tile_width as i64, self.tile_height as i64);
        tile.intersection(&self.bounds)
    }

    /// Tile coordinates for a linear tile index (row-major).
    pub fn tile_coords(&self, idx: usize) -> (usize, usize) {
        (idx % self.num_tiles_x, idx / self.num_tiles_x)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Rect)> + '_ {
        (0..self.total_tiles()).map(|i| {
            let (tx, ty) = self.tile_coords(i);
            (tx, ty, self.tile_rect(tx, ty))
        })
    }
}

#[test]
fn test_grid_even() {
    let grid = TileGrid::new(Rect::sized(400, 400), 200, 200);
    assert_eq!(grid.num_tiles_x, 2);
    assert_eq!(grid.num_tiles_y, 2);
    assert_eq!(grid.total_tiles(), 4);
    assert_eq!(grid.tile_rect(1, 1), Rect::new(200, 200, 200, 200));
}

#[test]
fn test_grid_ragged_edge() {
    let grid = TileGrid::new(Rect::new(10, 20, 250, 100), 100, 256);
    assert_eq!(grid.num_tiles_x, 3);
    assert_eq!(grid.num_tiles_y, 1);
    assert_eq!(grid.tile_rect(2, 0), Rect::new(210, 20, 50, 100));
}

#[test]
fn test_grid_covers_all_pixels() {
    let bounds = Rect::sized(37, 11);
    let grid = TileGrid::new(bounds, 8, 4);
    let total: u64 = grid.iter().map(|(_, _, r)| r.area()).sum();
    assert_eq!(total, bounds.area());
}
