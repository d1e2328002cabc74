// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Reusable object pools.
//!
//! - [`BoundedPool`]: hard ceiling on checked-out items, enforced with an
//!   atomic counter. What happens at the ceiling is a type parameter:
//!   [`Blocking`] spins, then parks the thread until a release (optionally
//!   with a timeout), [`FailFast`] returns [`Error::PoolOverflow`].
//! - [`SoftPool`]: no accounting; releases beyond a soft capacity per
//!   segment are dropped. Used for frame stacks and scratch bytes.
//! - [`DisposablePool`] / [`Pooled`]: scoped checkout. The guard returns its
//!   item on drop, so early returns and `?` never leak an item.
//!
//! Idle items live in [`NUM_SEGMENTS`] spinlock-protected stacks; each thread
//! is pinned to one segment, so concurrent callers rarely touch the same lock.
//!
//! [`Error::PoolOverflow`]: crate::error::Error::PoolOverflow
//! [`NUM_SEGMENTS`]: crate::util::NUM_SEGMENTS

mod bounded;
mod disposable;
mod soft;

pub use bounded::{Blocking, BoundedPool, FailFast, Gate, OverflowPolicy};
pub use disposable::{DisposablePool, Pooled, Release};
pub use soft::SoftPool;

use crate::buffer::Buffer;
use crate::util::{segment_index, Spinlock, NUM_SEGMENTS};

/// Items returned to a pool are reset before the next caller sees them.
pub trait Reusable {
    fn reset(&mut self);
}

impl Reusable for Buffer {
    #[inline(always)]
    fn reset(&mut self) {
        self.clear();
    }
}

impl<T> Reusable for Vec<T> {
    #[inline(always)]
    fn reset(&mut self) {
        self.clear();
    }
}

/// Point-in-time counters of a pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub in_use: usize,
    pub idle: usize,
    pub ceiling: usize,
    pub waiting: usize,
}

/// A segment containing a spinlock-protected stack of idle items.
pub(crate) struct Segment<T> {
    items: Spinlock<Vec<T>>,
}

impl<T> Segment<T> {
    fn new() -> Self {
        Segment {
            items: Spinlock::new(Vec::new()),
        }
    }

    #[inline(always)]
    fn pop(&self) -> Option<T> {
        self.items.lock().pop()
    }

    #[inline(always)]
    fn push(&self, item: T) {
        self.items.lock().push(item);
    }

    /// Pushes unless the segment already holds `cap` items; returns the
    /// rejected item otherwise.
    #[inline(always)]
    fn push_bounded(&self, item: T, cap: usize) -> Option<T> {
        let mut items = self.items.lock();
        if items.len() < cap {
            items.push(item);
            None
        } else {
            Some(item)
        }
    }

    fn len(&self) -> usize {
        self.items.lock().len()
    }
}

/// Idle storage shared by both pool flavors.
pub(crate) struct Segments<T> {
    segments: [Segment<T>; NUM_SEGMENTS],
}

impl<T> Segments<T> {
    pub(crate) fn new() -> Self {
        Segments {
            segments: std::array::from_fn(|_| Segment::new()),
        }
    }

    /// Pops from the caller's segment first, then from the others.
    #[inline(always)]
    pub(crate) fn pop(&self) -> Option<T> {
        let home = segment_index();
        if let Some(item) = self.segments[home].pop() {
            return Some(item);
        }
        (1..NUM_SEGMENTS)
            .map(|offset| (home + offset) % NUM_SEGMENTS)
            .find_map(|idx| self.segments[idx].pop())
    }

    #[inline(always)]
    pub(crate) fn push(&self, item: T) {
        self.segments[segment_index()].push(item);
    }

    #[inline(always)]
    pub(crate) fn push_bounded(&self, item: T, cap: usize) -> Option<T> {
        self.segments[segment_index()].push_bounded(item, cap)
    }

    /// Spreads pre-created items across segments.
    pub(crate) fn seed(&self, items: impl IntoIterator<Item = T>) {
        for (i, item) in items.into_iter().enumerate() {
            self.segments[i % NUM_SEGMENTS].push(item);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.segments.iter().map(Segment::len).sum()
    }
}
