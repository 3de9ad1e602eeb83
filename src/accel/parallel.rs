// This file is part of changematrix.
// Copyright (C) 2026 changematrix contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Worker pool and whole-raster driver.
use log::*;
use rayon::{current_num_threads, prelude::*, ThreadPoolBuilder};

use crate::{
    config_err,
    engine::ChangeMatrixOp,
    errors::Result,
    progress::ProgressHandle,
    raster::EncodedRaster,
};

/// Configure the global worker pool.
pub fn init_pool(n_threads: usize) -> Result<()> {
    debug!("initializing worker thread pool with {} threads", n_threads);
    ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build_global()
        .map_err(|e| config_err!("thread pool initialization error: {}", e))
}

/// Number of threads in the current pool.
pub fn thread_count() -> usize {
    current_num_threads()
}

/// Compute every tile of an operation's output grid in parallel.
///
/// Returns the assembled output, or the first error raised by a tile. The
/// matrix is left unfrozen; freezing is up to the caller.
pub fn compute_all(op: &ChangeMatrixOp<'_>) -> Result<EncodedRaster> {
    let grid = op.tile_grid();
    let n_tiles = grid.total_tiles();
    debug!(
        "computing {} tiles ({}x{}) on {} threads",
        n_tiles,
        grid.num_tiles_x,
        grid.num_tiles_y,
        current_num_threads()
    );

    let pb = ProgressHandle::new("change matrix tiles", n_tiles);
    let tiles = (0..n_tiles)
        .into_par_iter()
        .map(|i| {
            let (tx, ty) = grid.tile_coords(i);
            let tile = op.compute_tile(tx, ty);
            pb.tick();
            tile
        })
        .collect::<Result<Vec<_>>>()?;
    pb.finish();

    let mut out = op.create_output(op.bounds())?;
    for tile in &tiles {
        out.paste(tile)?;
    }
    Ok(out)
}
