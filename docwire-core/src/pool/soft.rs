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

use super::{Pooled, Release, Reusable, Segments};

/// A segmented object pool without a ceiling.
///
/// `acquire` never blocks: it pops an idle item or builds a new one.
/// `release` keeps at most `soft_capacity` idle items per segment and drops
/// the rest, so a burst of callers does not grow the pool forever.
pub struct SoftPool<T> {
    idle: Segments<T>,
    factory: Box<dyn Fn() -> T + Send + Sync>,
    soft_capacity: usize,
}

impl<T: Reusable> SoftPool<T> {
    pub fn new<F>(soft_capacity: usize, factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        SoftPool {
            idle: Segments::new(),
            factory: Box::new(factory),
            soft_capacity,
        }
    }

    #[inline(always)]
    pub fn acquire(&self) -> T {
        self.idle.pop().unwrap_or_else(&*self.factory)
    }

    #[inline(always)]
    pub fn release(&self, mut item: T) {
        item.reset();
        // over capacity: let it drop
        let _ = self.idle.push_bounded(item, self.soft_capacity);
    }

    /// Checks out an item that returns itself to the pool when dropped.
    #[inline(always)]
    pub fn checkout(&self) -> Pooled<'_, T> {
        Pooled::new(self.acquire(), self)
    }

    /// Borrows an item, executes the handler, and returns the item to the pool.
    #[inline(always)]
    pub fn borrow_mut<R>(&self, handler: impl FnOnce(&mut T) -> R) -> R {
        let mut item = self.checkout();
        handler(&mut item)
    }

    pub fn idle(&self) -> usize {
        self.idle.len()
    }
}

impl<T: Reusable> Release<T> for SoftPool<T> {
    fn release(&self, item: T) {
        SoftPool::release(self, item);
    }
}
