// This file is part of changematrix.
// Copyright (C) 2026 changematrix contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

/// An ordered (reference, actual) class transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassPair {
    pub reference: i32,
    pub actual: i32,
}

impl ClassPair {
    pub fn new(reference: i32, actual: i32) -> ClassPair {
        ClassPair { reference, actual }
    }
}

/// Occurrence count and area accumulated for one pair.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PairTally {
    pub count: u64,
    pub area: f64,
}

impl PairTally {
    /// Record one occurrence.  Negative or NaN areas only bump the count.
    pub(super) fn record(&mut self, area: f64) {
        self.count += 1;
        if area >= 0.0 {
            self.area += area;
        }
    }

    pub(super) fn merge(&mut self, other: &PairTally) {
        self.count += other.count;
        self.area += other.area;
    }
}

#[test]
fn test_tally_ignores_negative_area() {
    let mut t = PairTally::default();
    t.record(2.5);
    t.record(-1.0);
    t.record(f64::NAN);
    assert_eq!(t.count, 3);
    assert_eq!(t.area, 2.5);
}

#[test]
fn test_tally_merge() {
    let mut a = PairTally::default();
    a.record(1.0);
    let mut b = PairTally::default();
    b.record(-1.0);
    b.record(3.0);
    a.merge(&b);
    assert_eq!(a, PairTally { count: 3, area: 4.0 });
}

#[test]
fn test_pair_order() {
    assert_ne!(ClassPair::new(35, 36), ClassPair::new(36, 35));
    assert!(ClassPair::new(i32::MIN, 4) < ClassPair::new(0, 0));
}
