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

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, Thread};
use std::time::{Duration, Instant};

use tracing::debug;

use super::{PoolStats, Reusable, Segments};
use crate::error::{Error, Result};
use crate::util::Spinlock;

/// Spin iterations a blocking acquire burns before parking.
const DEFAULT_SPINS: u32 = 64;

/// Admission control of a [`BoundedPool`]: the checked-out counter, its
/// ceiling and the threads parked waiting for a slot.
pub struct Gate {
    in_use: AtomicUsize,
    ceiling: usize,
    waiters: Spinlock<Vec<Thread>>,
}

impl Gate {
    fn new(ceiling: usize) -> Self {
        Gate {
            in_use: AtomicUsize::new(0),
            ceiling,
            waiters: Spinlock::new(Vec::new()),
        }
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Claims a slot if the ceiling allows it.
    #[inline(always)]
    pub fn try_reserve(&self) -> bool {
        let mut current = self.in_use.load(Ordering::Relaxed);
        loop {
            if current >= self.ceiling {
                return false;
            }
            match self.in_use.compare_exchange_weak(
                current,
                current + 1,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    #[inline(always)]
    fn release_slot(&self) {
        self.in_use.fetch_sub(1, Ordering::Release);
        self.wake_one();
    }

    fn wake_one(&self) {
        let waiter = self.waiters.lock().pop();
        if let Some(thread) = waiter {
            thread.unpark();
        }
    }

    fn register(&self, me: &Thread) {
        let mut waiters = self.waiters.lock();
        if !waiters.iter().any(|t| t.id() == me.id()) {
            waiters.push(me.clone());
        }
    }

    /// Removes `me` from the waiter list. When a release already popped it,
    /// the wake-up it spent on us is handed to the next waiter so that no
    /// parked thread misses a freed slot.
    fn deregister(&self, me: &Thread) {
        let found = {
            let mut waiters = self.waiters.lock();
            match waiters.iter().position(|t| t.id() == me.id()) {
                Some(idx) => {
                    waiters.swap_remove(idx);
                    true
                }
                None => false,
            }
        };
        if !found {
            self.wake_one();
        }
    }

    fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Acquire)
    }

    fn waiting(&self) -> usize {
        self.waiters.lock().len()
    }
}

/// Behavior of [`BoundedPool::acquire`] once the ceiling is reached.
pub trait OverflowPolicy: Send + Sync {
    /// Returns `Ok` once a slot has been reserved on `gate`.
    fn wait_for_slot(&self, gate: &Gate) -> Result<()>;
}

/// Reports [`Error::PoolOverflow`] instead of waiting.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailFast;

impl OverflowPolicy for FailFast {
    #[inline(always)]
    fn wait_for_slot(&self, gate: &Gate) -> Result<()> {
        debug!(ceiling = gate.ceiling(), "fail-fast pool at ceiling");
        Err(Error::pool_overflow(gate.ceiling()))
    }
}

/// Spins, then parks until a release frees a slot.
///
/// Waiters are not woken in FIFO order. With a timeout, an acquire that
/// cannot get a slot in time reports [`Error::PoolOverflow`].
#[derive(Clone, Copy, Debug)]
pub struct Blocking {
    timeout: Option<Duration>,
    spins: u32,
}

impl Default for Blocking {
    fn default() -> Self {
        Blocking {
            timeout: None,
            spins: DEFAULT_SPINS,
        }
    }
}

impl Blocking {
    pub fn new(timeout: Option<Duration>) -> Self {
        Blocking {
            timeout,
            ..Default::default()
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(Some(timeout))
    }

    pub fn spins(mut self, spins: u32) -> Self {
        self.spins = spins;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl OverflowPolicy for Blocking {
    fn wait_for_slot(&self, gate: &Gate) -> Result<()> {
        for _ in 0..self.spins {
            std::hint::spin_loop();
            if gate.try_reserve() {
                return Ok(());
            }
        }
        let deadline = self.timeout.map(|t| Instant::now() + t);
        let me = thread::current();
        loop {
            gate.register(&me);
            // re-check after registering: a release from here on unparks us
            if gate.try_reserve() {
                gate.deregister(&me);
                return Ok(());
            }
            match deadline {
                None => {
                    debug!(ceiling = gate.ceiling(), "pool at ceiling, parking");
                    thread::park();
                }
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        gate.deregister(&me);
                        debug!(
                            ceiling = gate.ceiling(),
                            timeout = ?self.timeout,
                            "pool acquire timed out"
                        );
                        return Err(Error::pool_overflow(gate.ceiling()));
                    }
                    thread::park_timeout(deadline - now);
                }
            }
        }
    }
}

/// Thread-safe pool with a hard ceiling on concurrently checked-out items.
///
/// Items are created lazily by the factory (plus `initial_size` created up
/// front) and reset via [`Reusable`] when released.
pub struct BoundedPool<T, P = Blocking> {
    idle: Segments<T>,
    factory: Box<dyn Fn() -> T + Send + Sync>,
    gate: Gate,
    created: AtomicUsize,
    policy: P,
}

impl<T: Reusable, P: OverflowPolicy> BoundedPool<T, P> {
    pub fn new<F>(initial_size: usize, ceiling: usize, policy: P, factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let ceiling = ceiling.max(1);
        let initial_size = initial_size.min(ceiling);
        let idle = Segments::new();
        idle.seed((0..initial_size).map(|_| factory()));
        BoundedPool {
            idle,
            factory: Box::new(factory),
            gate: Gate::new(ceiling),
            created: AtomicUsize::new(initial_size),
            policy,
        }
    }

    /// Checks out an item, waiting or failing per the overflow policy when
    /// the ceiling is reached.
    pub fn acquire(&self) -> Result<T> {
        if !self.gate.try_reserve() {
            self.policy.wait_for_slot(&self.gate)?;
        }
        Ok(self.take_idle())
    }

    /// Checks out an item only if a slot is free right now.
    pub fn try_acquire(&self) -> Option<T> {
        if self.gate.try_reserve() {
            Some(self.take_idle())
        } else {
            None
        }
    }

    /// Returns an item and wakes one waiter, if any.
    pub fn release(&self, mut item: T) {
        item.reset();
        self.idle.push(item);
        self.gate.release_slot();
    }

    /// Gives up the slot of an item that will never come back.
    pub fn forget(&self) {
        self.gate.release_slot();
    }

    #[inline(always)]
    fn take_idle(&self) -> T {
        match self.idle.pop() {
            Some(item) => item,
            None => {
                let total = self.created.fetch_add(1, Ordering::Relaxed) + 1;
                debug!(total, ceiling = self.gate.ceiling(), "pool creating item");
                (self.factory)()
            }
        }
    }

    pub fn ceiling(&self) -> usize {
        self.gate.ceiling()
    }

    pub fn in_use(&self) -> usize {
        self.gate.in_use()
    }

    pub fn idle(&self) -> usize {
        self.idle.len()
    }

    /// Items ever constructed by this pool.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            in_use: self.in_use(),
            idle: self.idle(),
            ceiling: self.ceiling(),
            waiting: self.gate.waiting(),
        }
    }
}
