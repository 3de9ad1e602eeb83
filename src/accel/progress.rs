// This file is part of changematrix.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2026 Drexel University.
// Copyright (C) 2026 changematrix contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

use std::sync::RwLock;
use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Instant,
};

use log::*;

const UPDATE_SECS: f64 = 2.0;

#[derive(Clone, Copy)]
struct UpdateState {
    count: usize,
    time: f64,
    rate: f64,
}

/// Progress reporter for tiled computations.
///
/// This applies internal throttling so that concurrent workers can tick it
/// freely while only emitting a log line every couple of seconds.
pub(crate) struct ProgressHandle {
    label: &'static str,
    total: usize,
    start: Instant,
    count: AtomicUsize,
    last_update: RwLock<Option<UpdateState>>,
}

impl ProgressHandle {
    pub fn new(label: &'static str, total: usize) -> Self {
        ProgressHandle {
            label,
            total,
            count: AtomicUsize::new(0),
            start: Instant::now(),
            last_update: RwLock::new(None),
        }
    }

    pub fn tick(&self) {
        self.advance(1);
    }

    pub fn advance(&self, n: usize) {
        let count = self.count.fetch_add(n, Ordering::Relaxed) + n;

        let last_update = match self.last_update.read() {
            Ok(lock) => *lock,
            Err(_) => return,
        };

        let thresh = if let Some(lu) = last_update {
            // bail early if the rate estimate says we don't need to update
            let n = (count - lu.count) as f64;
            if n / lu.rate < UPDATE_SECS * 0.95 {
                return;
            }

            lu.time
        } else {
            0.0
        };

        let time = self.start.elapsed().as_secs_f64();
        // bail if we haven't been running long enough
        if time < thresh + UPDATE_SECS {
            return;
        }

        // if someone else is writing, do nothing, they've handled it
        if let Ok(mut lock) = self.last_update.try_write() {
            *lock = Some(UpdateState {
                count,
                time,
                rate: count as f64 / time,
            });
            info!(
                "{}: {}/{} done ({:.1}s)",
                self.label, count, self.total, time
            );
        }
    }

    /// Number of items completed so far.
    pub fn completed(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    /// Log the final tally.
    pub fn finish(&self) {
        debug!(
            "{}: finished {}/{} in {:.2}s",
            self.label,
            self.completed(),
            self.total,
            self.start.elapsed().as_secs_f64()
        );
    }
}

#[test]
fn test_progress_counts() {
    let pb = ProgressHandle::new("test", 10);
    for _ in 0..7 {
        pb.tick();
    }
    pb.advance(3);
    assert_eq!(pb.completed(), 10);
    pb.finish();
}
