// This file is part of changematrix.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2026 Drexel University.
// Copyright (C) 2026 changematrix contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Atomic utilities

use std::{
    hint::spin_loop,
    ptr,
    sync::atomic::{AtomicPtr, AtomicU64, Ordering},
};

/// A cell supporting atomic mutation with spin locks for waiters.
///
/// This uses spin loops on atomic pointers instead of full OS-level mutexes, so
/// we can create a lot of these (one per accumulator shard) without incurring
/// the overhead of going to pthreads.
#[repr(transparent)]
pub struct AtomicCell<T: Send> {
    pointer: AtomicPtr<T>,
}

// SAFETY: the cell hands out the value to one thread at a time.
unsafe impl<T: Send> Sync for AtomicCell<T> {}

/// Exclusive access to the value of an [AtomicCell], released on drop.
struct CellGuard<'a, T: Send> {
    cell: &'a AtomicCell<T>,
    ptr: *mut T,
}

impl<T: Send> AtomicCell<T> {
    /// Construct a new atomic cell.
    pub fn new(value: T) -> Self {
        let ptr = Box::into_raw(Box::new(value));
        AtomicCell {
            pointer: AtomicPtr::new(ptr),
        }
    }

    /// Create a new vector of atomic cells.
    pub fn new_vec<S: IntoIterator<Item = T>>(src: S) -> Vec<AtomicCell<T>> {
        src.into_iter().map(AtomicCell::new).collect()
    }

    /// Mutate the cell.
    pub fn update<R, F: FnOnce(&mut T) -> R>(&self, func: F) -> R {
        let guard = self.acquire();
        // SAFETY: the pointer is live and we hold the lock until the guard drops
        let tref = unsafe { &mut *guard.ptr };
        func(tref)
    }

    /// Read the cell without mutating it.
    pub fn read<R, F: FnOnce(&T) -> R>(&self, func: F) -> R {
        self.update(|v| func(v))
    }

    /// Unwrap the cell into its value.
    #[cfg(test)]
    pub fn into_inner(mut self) -> T {
        let ptr = std::mem::replace(self.pointer.get_mut(), ptr::null_mut());
        assert!(!ptr.is_null(), "atomic cell consumed while locked");
        // SAFETY: the pointer came from Box::into_raw and we own it now
        *unsafe { Box::from_raw(ptr) }
    }

    /// Acquire the pointer.
    fn acquire(&self) -> CellGuard<'_, T> {
        let mut ptr = self.pointer.load(Ordering::Relaxed);
        loop {
            if !ptr.is_null() {
                // the cell is live, try to take the lock (null the cell)
                match self.pointer.compare_exchange_weak(
                    ptr,
                    ptr::null_mut(),
                    Ordering::Acquire,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => return CellGuard { cell: self, ptr },
                    Err(p) => {
                        ptr = p;
                        continue;
                    }
                }
            }
            // someone else holds the lock, reload and try again
            spin_loop();
            ptr = self.pointer.load(Ordering::Relaxed);
        }
    }
}

impl<T: Send> Drop for CellGuard<'_, T> {
    fn drop(&mut self) {
        let res = self.cell.pointer.compare_exchange(
            ptr::null_mut(),
            self.ptr,
            Ordering::Release,
            Ordering::Relaxed,
        );
        if res.is_err() && !std::thread::panicking() {
            panic!("another thread wrote while we have the lock");
        }
    }
}

impl<T: Send> Drop for AtomicCell<T> {
    fn drop(&mut self) {
        let ptr = self.pointer.get_mut();
        if !ptr.is_null() {
            // SAFETY: the pointer came from Box::into_raw and nobody holds the lock
            let _ = unsafe { Box::from_raw(*ptr) };
        }
    }
}

/// A 64-bit float supporting atomic addition.
///
/// Stores the bit pattern in an [AtomicU64] and adds with a CAS loop.
#[derive(Debug, Default)]
pub struct AtomicF64 {
    bits: AtomicU64,
}

impl AtomicF64 {
    pub fn new(value: f64) -> Self {
        AtomicF64 {
            bits: AtomicU64::new(value.to_bits()),
        }
    }

    pub fn load(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    /// Add a value, returning the previous one.
    pub fn fetch_add(&self, delta: f64) -> f64 {
        let mut cur = self.bits.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(cur) + delta).to_bits();
            match self
                .bits
                .compare_exchange_weak(cur, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(old) => return f64::from_bits(old),
                Err(actual) => cur = actual,
            }
        }
    }
}
