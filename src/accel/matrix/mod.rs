// This file is part of changematrix.
// Copyright (C) 2026 changematrix contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Concurrent accumulation of class transitions.
use std::{
    collections::BTreeSet,
    hash::BuildHasher,
    sync::atomic::{AtomicBool, AtomicU64, Ordering},
};

use log::*;
use rustc_hash::{FxBuildHasher, FxHashMap};

use crate::atomic::{AtomicCell, AtomicF64};

mod export;
mod pair;

pub use pair::{ClassPair, PairTally};

/// Class recorded in place of a no-data value.
pub const NODATA_CLASS: i32 = i32::MIN;

/// Area passed when no area layer is configured.
pub const NO_AREA: f64 = -1.0;

const N_SHARDS: usize = 64;

type Shard = FxHashMap<ClassPair, PairTally>;

/// Tallies for one region, kept local to a worker and merged into a
/// [ChangeMatrix] with [ChangeMatrix::merge].
#[derive(Debug, Default)]
pub struct RegionTally {
    pairs: Shard,
    count: u64,
    area: f64,
}

impl RegionTally {
    pub fn new() -> RegionTally {
        RegionTally::default()
    }

    /// Record one occurrence of a transition.
    pub fn record(&mut self, pair: ClassPair, area: f64) {
        self.pairs.entry(pair).or_default().record(area);
        self.count += 1;
        if area >= 0.0 {
            self.area += area;
        }
    }

    /// Number of occurrences recorded.
    pub fn count(&self) -> u64 {
        self.count
    }
}

/// Thread-safe change matrix.
///
/// Registrations hash each pair to one of a fixed set of shards, each guarded
/// by an [AtomicCell], so writers only contend when their pairs share a shard.
/// Once frozen, registrations are ignored and the queries are final.
pub struct ChangeMatrix {
    classes: BTreeSet<i32>,
    frozen: AtomicBool,
    shards: Vec<AtomicCell<Shard>>,
    total: AtomicU64,
    total_area: AtomicF64,
}

impl ChangeMatrix {
    /// Create an empty matrix over a set of registered classes.
    pub fn new<I: IntoIterator<Item = i32>>(classes: I) -> ChangeMatrix {
        let classes: BTreeSet<i32> = classes.into_iter().collect();
        debug!("creating change matrix with {} classes", classes.len());
        ChangeMatrix {
            classes,
            frozen: AtomicBool::new(false),
            shards: AtomicCell::new_vec((0..N_SHARDS).map(|_| Shard::default())),
            total: AtomicU64::new(0),
            total_area: AtomicF64::new(0.0),
        }
    }

    fn shard(&self, pair: &ClassPair) -> &AtomicCell<Shard> {
        let h = FxBuildHasher.hash_one(pair);
        &self.shards[(h as usize) % N_SHARDS]
    }

    /// Record one occurrence of a transition.
    ///
    /// Returns `false` (and records nothing) if the matrix is frozen.
    pub fn register_pair(&self, reference: i32, actual: i32, area: f64) -> bool {
        let mut tally = RegionTally::new();
        tally.record(ClassPair::new(reference, actual), area);
        self.merge(tally)
    }

    /// Add a region's tallies, locking each touched shard once per pair.
    ///
    /// Returns `false` (and records nothing) if the matrix is frozen.
    pub fn merge(&self, tally: RegionTally) -> bool {
        if self.frozen.load(Ordering::Acquire) {
            trace!(
                "ignoring {} registrations on frozen matrix",
                tally.count
            );
            return false;
        }
        if tally.count == 0 {
            return true;
        }
        for (pair, t) in &tally.pairs {
            self.shard(pair)
                .update(|map| map.entry(*pair).or_default().merge(t));
        }
        self.total.fetch_add(tally.count, Ordering::Relaxed);
        if tally.area > 0.0 {
            self.total_area.fetch_add(tally.area);
        }
        true
    }

    /// Stop accepting registrations.
    pub fn freeze(&self) {
        if !self.frozen.swap(true, Ordering::AcqRel) {
            debug!(
                "froze change matrix with {} registrations",
                self.total_registrations()
            );
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    fn tally(&self, reference: i32, actual: i32) -> PairTally {
        let pair = ClassPair::new(reference, actual);
        self.shard(&pair)
            .read(|map| map.get(&pair).copied().unwrap_or_default())
    }

    /// Number of occurrences of a transition.
    pub fn pair_count(&self, reference: i32, actual: i32) -> u64 {
        self.tally(reference, actual).count
    }

    /// Area accumulated for a transition.
    pub fn pair_area(&self, reference: i32, actual: i32) -> f64 {
        self.tally(reference, actual).area
    }

    pub fn registered_classes(&self) -> &BTreeSet<i32> {
        &self.classes
    }

    /// Total number of registrations across all pairs.
    pub fn total_registrations(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Total area across all pairs.
    pub fn total_area(&self) -> f64 {
        self.total_area.load()
    }

    /// Number of distinct pairs recorded.
    pub fn num_pairs(&self) -> usize {
        self.shards.iter().map(|s| s.read(|m| m.len())).sum()
    }

    /// Snapshot of every recorded pair, sorted by pair.
    pub fn pairs(&self) -> Vec<(ClassPair, PairTally)> {
        let mut pairs: Vec<_> = self
            .shards
            .iter()
            .flat_map(|s| s.read(|m| m.iter().map(|(p, t)| (*p, *t)).collect::<Vec<_>>()))
            .collect();
        pairs.sort_unstable_by_key(|(p, _)| *p);
        pairs
    }
}

#[cfg(test)]
mod tests {
    use rayon::prelude::*;

    use super::*;

    #[test]
    fn test_register_and_query() {
        let cm = ChangeMatrix::new([0, 1, 35, 36]);
        assert!(cm.register_pair(35, 36, NO_AREA));
        assert!(cm.register_pair(35, 36, NO_AREA));
        assert!(cm.register_pair(36, 35, NO_AREA));
        cm.freeze();

        assert_eq!(cm.pair_count(35, 36), 2);
        assert_eq!(cm.pair_count(36, 35), 1);
        assert_eq!(cm.pair_count(0, 1), 0);
        assert_eq!(cm.pair_area(35, 36), 0.0);
        assert_eq!(cm.total_registrations(), 3);
        assert_eq!(cm.num_pairs(), 2);
        assert!(cm.registered_classes().contains(&35));
    }

    #[test]
    fn test_frozen_ignores_registrations() {
        let cm = ChangeMatrix::new([1]);
        cm.register_pair(1, 1, 2.0);
        cm.freeze();
        assert!(cm.is_frozen());
        assert!(!cm.register_pair(1, 1, 2.0));
        assert_eq!(cm.pair_count(1, 1), 1);
        assert_eq!(cm.pair_area(1, 1), 2.0);
    }

    #[test]
    fn test_concurrent_registration() {
        let cm = ChangeMatrix::new(0..5);
        (0..50_000).into_par_iter().for_each(|i: i32| {
            cm.register_pair(i % 5, (i / 5) % 5, 0.5);
        });
        cm.freeze();
        assert_eq!(cm.total_registrations(), 50_000);
        assert_eq!(cm.num_pairs(), 25);
        for (_, tally) in cm.pairs() {
            assert_eq!(tally.count, 2_000);
            assert_eq!(tally.area, 1_000.0);
        }
        assert_eq!(cm.total_area(), 25_000.0);
    }

    #[test]
    fn test_merge_region_tally() {
        let cm = ChangeMatrix::new([1, 2]);
        let mut tally = RegionTally::new();
        tally.record(ClassPair::new(1, 2), 1.5);
        tally.record(ClassPair::new(1, 2), NO_AREA);
        tally.record(ClassPair::new(2, 2), 0.5);
        assert_eq!(tally.count(), 3);
        assert!(cm.merge(tally));
        cm.register_pair(1, 2, 1.0);

        assert_eq!(cm.pair_count(1, 2), 3);
        assert_eq!(cm.pair_area(1, 2), 2.5);
        assert_eq!(cm.total_registrations(), 4);
        assert_eq!(cm.total_area(), 3.0);

        cm.freeze();
        let mut late = RegionTally::new();
        late.record(ClassPair::new(1, 1), 1.0);
        assert!(!cm.merge(late));
        assert_eq!(cm.pair_count(1, 1), 0);
    }

    #[test]
    fn test_pairs_sorted() {
        let cm = ChangeMatrix::new([]);
        cm.register_pair(3, 1, NO_AREA);
        cm.register_pair(NODATA_CLASS, 1, NO_AREA);
        cm.register_pair(1, 2, NO_AREA);
        let keys: Vec<_> = cm.pairs().into_iter().map(|(p, _)| p).collect();
        assert_eq!(
            keys,
            vec![
                ClassPair::new(NODATA_CLASS, 1),
                ClassPair::new(1, 2),
                ClassPair::new(3, 1)
            ]
        );
    }
}
