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

use std::fmt;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};

use super::{BoundedPool, OverflowPolicy, PoolStats, Reusable};
use crate::error::Result;

/// Release callback a [`Pooled`] guard is bound to.
pub trait Release<T> {
    fn release(&self, item: T);

    /// Called instead of `release` when an item leaves pool management.
    fn forget(&self) {}
}

/// A checked-out item that goes back to its pool when dropped.
pub struct Pooled<'p, T> {
    item: ManuallyDrop<T>,
    pool: &'p dyn Release<T>,
}

impl<'p, T> Pooled<'p, T> {
    pub fn new(item: T, pool: &'p dyn Release<T>) -> Self {
        Pooled {
            item: ManuallyDrop::new(item),
            pool,
        }
    }

    /// Returns the item to its pool now.
    pub fn dispose(self) {
        drop(self);
    }

    /// Takes the item out of pool management; it will not be returned, but
    /// a bounded pool gives its slot back.
    pub fn detach(self) -> T {
        let mut this = ManuallyDrop::new(self);
        this.pool.forget();
        // SAFETY: `this` is never dropped, so the item is taken exactly once.
        unsafe { ManuallyDrop::take(&mut this.item) }
    }
}

impl<T> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.item
    }
}

impl<T> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.item
    }
}

impl<T> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        // SAFETY: drop runs once and `item` is not touched afterwards.
        let item = unsafe { ManuallyDrop::take(&mut self.item) };
        self.pool.release(item);
    }
}

impl<T: fmt::Debug> fmt::Debug for Pooled<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pooled").field(&*self.item).finish()
    }
}

impl<T: Reusable, P: OverflowPolicy> Release<T> for BoundedPool<T, P> {
    fn release(&self, item: T) {
        BoundedPool::release(self, item);
    }

    fn forget(&self) {
        BoundedPool::forget(self);
    }
}

/// A [`BoundedPool`] whose items are handed out as [`Pooled`] guards.
pub struct DisposablePool<T, P> {
    inner: BoundedPool<T, P>,
}

impl<T: Reusable, P: OverflowPolicy> DisposablePool<T, P> {
    pub fn new(inner: BoundedPool<T, P>) -> Self {
        DisposablePool { inner }
    }

    pub fn acquire(&self) -> Result<Pooled<'_, T>> {
        let item = self.inner.acquire()?;
        Ok(Pooled::new(item, &self.inner))
    }

    pub fn try_acquire(&self) -> Option<Pooled<'_, T>> {
        self.inner
            .try_acquire()
            .map(|item| Pooled::new(item, &self.inner as &dyn Release<T>))
    }

    pub fn stats(&self) -> PoolStats {
        self.inner.stats()
    }

    pub fn inner(&self) -> &BoundedPool<T, P> {
        &self.inner
    }
}
