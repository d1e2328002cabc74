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

use std::time::Duration;

/// Largest document accepted on decode unless configured otherwise (16 MiB).
pub const DEFAULT_MAX_DOCUMENT_SIZE: usize = 16 * 1024 * 1024;

/// How binary and extension payloads are materialized on decode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BinaryMode {
    /// Payloads are copied into freshly allocated storage.
    #[default]
    Owned,
    /// Payloads decoded from a shared `Bytes` input are slices of that input.
    View,
}

/// Configuration for a [`Codec`](crate::codec::Codec).
///
/// The overflow behavior of the buffer pool is not part of this struct; it
/// is chosen by the codec's type parameter (see [`crate::pool::Blocking`] and
/// [`crate::pool::FailFast`]).
#[derive(Clone, Debug)]
pub struct Config {
    /// Buffers created eagerly when the codec is built.
    pub pool_initial_size: usize,
    /// Hard ceiling of buffers checked out at the same time.
    pub pool_max_size: usize,
    /// Bound on how long a blocking acquire may wait. `None` waits forever.
    pub acquire_timeout: Option<Duration>,
    /// Decode-time ceiling on a document's byte length.
    pub max_document_size: usize,
    /// Binary payload materialization on decode.
    pub binary_mode: BinaryMode,
    /// Capacity of freshly created buffers.
    pub initial_buffer_capacity: usize,
    /// Idle items kept per soft-pool segment; further releases are dropped.
    pub scratch_soft_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pool_initial_size: 4,
            pool_max_size: 64,
            acquire_timeout: None,
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
            binary_mode: BinaryMode::Owned,
            initial_buffer_capacity: 256,
            scratch_soft_capacity: 32,
        }
    }
}

impl Config {
    /// Creates a new Config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pool_initial_size(mut self, size: usize) -> Self {
        self.pool_initial_size = size;
        self
    }

    /// Sets the buffer pool ceiling. A ceiling of zero is raised to one.
    pub fn pool_max_size(mut self, size: usize) -> Self {
        self.pool_max_size = size.max(1);
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = Some(timeout);
        self
    }

    pub fn max_document_size(mut self, size: usize) -> Self {
        self.max_document_size = size;
        self
    }

    pub fn binary_mode(mut self, mode: BinaryMode) -> Self {
        self.binary_mode = mode;
        self
    }

    pub fn initial_buffer_capacity(mut self, capacity: usize) -> Self {
        self.initial_buffer_capacity = capacity;
        self
    }

    pub fn scratch_soft_capacity(mut self, capacity: usize) -> Self {
        self.scratch_soft_capacity = capacity;
        self
    }

    #[inline(always)]
    pub fn get_pool_initial_size(&self) -> usize {
        self.pool_initial_size.min(self.pool_max_size)
    }

    #[inline(always)]
    pub fn get_pool_max_size(&self) -> usize {
        self.pool_max_size
    }

    #[inline(always)]
    pub fn get_acquire_timeout(&self) -> Option<Duration> {
        self.acquire_timeout
    }

    #[inline(always)]
    pub fn get_max_document_size(&self) -> usize {
        self.max_document_size
    }

    #[inline(always)]
    pub fn get_binary_mode(&self) -> BinaryMode {
        self.binary_mode
    }

    #[inline(always)]
    pub fn get_initial_buffer_capacity(&self) -> usize {
        self.initial_buffer_capacity
    }

    #[inline(always)]
    pub fn get_scratch_soft_capacity(&self) -> usize {
        self.scratch_soft_capacity
    }
}
