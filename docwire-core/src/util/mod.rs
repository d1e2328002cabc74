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

mod sync;

pub use sync::{Spinlock, SpinlockGuard};

use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Number of segments in the pools. Using 16 segments to reduce contention.
pub(crate) const NUM_SEGMENTS: usize = 16;

/// Global counter to assign unique IDs to threads for segment selection.
static THREAD_ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    /// Cached segment index for the current thread.
    static SEGMENT_INDEX: Cell<usize> = Cell::new(
        THREAD_ID_COUNTER.fetch_add(1, Ordering::Relaxed) % NUM_SEGMENTS
    );
}

/// Pool segment assigned to the calling thread.
#[inline(always)]
pub(crate) fn segment_index() -> usize {
    SEGMENT_INDEX.with(|idx| idx.get())
}

/// Writes the decimal digits of `n` into `out` and returns how many were used.
///
/// Array element keys are `"0"`, `"1"`, ... on the BSON wire; this keeps the
/// writer from formatting them through `String`.
#[inline]
pub(crate) fn write_decimal(mut n: usize, out: &mut [u8; 20]) -> usize {
    if n == 0 {
        out[0] = b'0';
        return 1;
    }
    let mut tmp = [0u8; 20];
    let mut len = 0;
    while n > 0 {
        tmp[len] = b'0' + (n % 10) as u8;
        n /= 10;
        len += 1;
    }
    for i in 0..len {
        out[i] = tmp[len - 1 - i];
    }
    len
}
