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

//! Growable write buffer and bounds-checked reader.
//!
//! [`Buffer`] is append-only while in write mode and doubles its capacity
//! when an append does not fit. Length prefixes are reserved with
//! [`Buffer::reserve_i32`] and patched later with [`Buffer::put_i32_at`].
//! [`Buffer::flip`] switches it into read mode, after which
//! [`Buffer::reader`] hands out a [`Reader`] over the written bytes.
//!
//! Default byte order is little-endian (BSON). The `_be` methods write
//! MessagePack's big-endian fields directly.
//!
//! [`Reader`] checks every read against a movable `limit`. The frame-stack
//! reader lowers the limit to the end of the container being decoded so that
//! a scalar can never be read from outside its parent's declared range.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::cmp::max;

use crate::error::{Error, Result};
use crate::scanner;

#[derive(Debug, Default)]
pub struct Buffer {
    bf: Vec<u8>,
    cursor: usize,
    readable: bool,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Buffer {
            bf: Vec::with_capacity(capacity),
            cursor: 0,
            readable: false,
        }
    }

    /// Makes room for `additional` more bytes.
    ///
    /// Grows to `max(capacity * 2, capacity + additional)` when the remaining
    /// capacity is too small; written bytes are carried over.
    #[inline(always)]
    pub fn ensure_capacity(&mut self, additional: usize) {
        let capacity = self.bf.capacity();
        if capacity - self.bf.len() < additional {
            let target = max(capacity * 2, capacity + additional);
            self.bf.reserve_exact(target - self.bf.len());
        }
    }

    /// Clears contents, keeps capacity and returns to write mode.
    pub fn clear(&mut self) {
        self.bf.clear();
        self.cursor = 0;
        self.readable = false;
    }

    /// Switches from write mode to read mode with the read cursor at zero.
    pub fn flip(&mut self) {
        self.readable = true;
        self.cursor = 0;
    }

    pub fn is_readable(&self) -> bool {
        self.readable
    }

    /// Write position in write mode, read position in read mode.
    #[inline(always)]
    pub fn position(&self) -> usize {
        if self.readable {
            self.cursor
        } else {
            self.bf.len()
        }
    }

    /// Moves the read cursor. Only meaningful in read mode.
    pub fn set_position(&mut self, position: usize) {
        debug_assert!(self.readable, "set_position on a buffer in write mode");
        self.cursor = position.min(self.bf.len());
    }

    /// Unread bytes in read mode.
    pub fn remaining(&self) -> usize {
        self.bf.len() - self.cursor
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.bf.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.bf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.bf.capacity()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bf
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.bf.clone()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bf
    }

    /// Reader over the unread bytes. Flips the buffer first if it is still
    /// in write mode.
    pub fn reader(&mut self) -> Reader<'_> {
        if !self.readable {
            self.flip();
        }
        Reader::new(&self.bf[self.cursor..])
    }

    /// Reserves a 4-byte length slot and returns its offset.
    #[inline(always)]
    pub fn reserve_i32(&mut self) -> usize {
        let offset = self.bf.len();
        self.write_i32(0);
        offset
    }

    /// Patches a previously reserved little-endian i32 slot.
    #[inline(always)]
    pub fn put_i32_at(&mut self, offset: usize, value: i32) {
        LittleEndian::write_i32(&mut self.bf[offset..offset + 4], value);
    }

    #[inline(always)]
    pub fn write_u8(&mut self, value: u8) {
        debug_assert!(!self.readable, "write into a flipped buffer");
        self.ensure_capacity(1);
        self.bf.push(value);
    }

    #[inline(always)]
    pub fn write_i8(&mut self, value: i8) {
        self.write_u8(value as u8);
    }

    #[inline(always)]
    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    #[inline(always)]
    pub fn write_bytes(&mut self, v: &[u8]) -> usize {
        debug_assert!(!self.readable, "write into a flipped buffer");
        self.ensure_capacity(v.len());
        self.bf.extend_from_slice(v);
        v.len()
    }

    #[inline(always)]
    pub fn write_i32(&mut self, value: i32) {
        self.write_bytes(&value.to_le_bytes());
    }

    #[inline(always)]
    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    #[inline(always)]
    pub fn write_i64(&mut self, value: i64) {
        self.write_bytes(&value.to_le_bytes());
    }

    #[inline(always)]
    pub fn write_u64(&mut self, value: u64) {
        self.write_bytes(&value.to_le_bytes());
    }

    #[inline(always)]
    pub fn write_f64(&mut self, value: f64) {
        self.write_bytes(&value.to_le_bytes());
    }

    #[inline(always)]
    pub fn write_u16_be(&mut self, value: u16) {
        self.write_bytes(&value.to_be_bytes());
    }

    #[inline(always)]
    pub fn write_u32_be(&mut self, value: u32) {
        self.write_bytes(&value.to_be_bytes());
    }

    #[inline(always)]
    pub fn write_u64_be(&mut self, value: u64) {
        self.write_bytes(&value.to_be_bytes());
    }

    #[inline(always)]
    pub fn write_i16_be(&mut self, value: i16) {
        self.write_bytes(&value.to_be_bytes());
    }

    #[inline(always)]
    pub fn write_i32_be(&mut self, value: i32) {
        self.write_bytes(&value.to_be_bytes());
    }

    #[inline(always)]
    pub fn write_i64_be(&mut self, value: i64) {
        self.write_bytes(&value.to_be_bytes());
    }

    #[inline(always)]
    pub fn write_f32_be(&mut self, value: f32) {
        self.write_bytes(&value.to_be_bytes());
    }

    #[inline(always)]
    pub fn write_f64_be(&mut self, value: f64) {
        self.write_bytes(&value.to_be_bytes());
    }
}

pub struct Reader<'a> {
    bf: &'a [u8],
    cursor: usize,
    limit: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bf: &'a [u8]) -> Reader<'a> {
        Reader {
            bf,
            cursor: 0,
            limit: bf.len(),
        }
    }

    #[inline(always)]
    pub fn position(&self) -> usize {
        self.cursor
    }

    #[inline(always)]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Narrows (or restores) the readable range to `[.., limit)`.
    #[inline(always)]
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.min(self.bf.len());
    }

    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.cursor)
    }

    /// Whole underlying input, ignoring cursor and limit.
    pub fn get_slice(&self) -> &'a [u8] {
        self.bf
    }

    #[inline(always)]
    fn check_bound(&self, n: usize) -> Result<()> {
        if self.cursor + n > self.limit {
            Err(Error::truncated(n, self.remaining()))
        } else {
            Ok(())
        }
    }

    #[inline(always)]
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.check_bound(n)?;
        self.cursor += n;
        Ok(())
    }

    #[inline(always)]
    pub fn peek_u8(&self) -> Result<u8> {
        self.check_bound(1)?;
        Ok(self.bf[self.cursor])
    }

    #[inline(always)]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.check_bound(1)?;
        let result = self.bf[self.cursor];
        self.cursor += 1;
        Ok(result)
    }

    #[inline(always)]
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    #[inline(always)]
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.check_bound(len)?;
        let s = &self.bf[self.cursor..self.cursor + len];
        self.cursor += len;
        Ok(s)
    }

    /// Reads up to the next zero byte inside the limit and consumes it.
    /// The returned slice excludes the terminator.
    pub fn read_cstr(&mut self) -> Result<&'a [u8]> {
        let window = &self.bf[self.cursor..self.limit.max(self.cursor)];
        match scanner::find_zero(window, 0) {
            Some(end) => {
                let s = &window[..end];
                self.cursor += end + 1;
                Ok(s)
            }
            None => Err(Error::truncated(window.len() + 1, window.len())),
        }
    }

    #[inline(always)]
    pub fn read_i32(&mut self) -> Result<i32> {
        self.check_bound(4)?;
        let result = LittleEndian::read_i32(&self.bf[self.cursor..]);
        self.cursor += 4;
        Ok(result)
    }

    #[inline(always)]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.check_bound(4)?;
        let result = LittleEndian::read_u32(&self.bf[self.cursor..]);
        self.cursor += 4;
        Ok(result)
    }

    #[inline(always)]
    pub fn read_i64(&mut self) -> Result<i64> {
        self.check_bound(8)?;
        let result = LittleEndian::read_i64(&self.bf[self.cursor..]);
        self.cursor += 8;
        Ok(result)
    }

    #[inline(always)]
    pub fn read_u64(&mut self) -> Result<u64> {
        self.check_bound(8)?;
        let result = LittleEndian::read_u64(&self.bf[self.cursor..]);
        self.cursor += 8;
        Ok(result)
    }

    #[inline(always)]
    pub fn read_f64(&mut self) -> Result<f64> {
        self.check_bound(8)?;
        let result = LittleEndian::read_f64(&self.bf[self.cursor..]);
        self.cursor += 8;
        Ok(result)
    }

    #[inline(always)]
    pub fn read_u16_be(&mut self) -> Result<u16> {
        self.check_bound(2)?;
        let result = BigEndian::read_u16(&self.bf[self.cursor..]);
        self.cursor += 2;
        Ok(result)
    }

    #[inline(always)]
    pub fn read_u32_be(&mut self) -> Result<u32> {
        self.check_bound(4)?;
        let result = BigEndian::read_u32(&self.bf[self.cursor..]);
        self.cursor += 4;
        Ok(result)
    }

    #[inline(always)]
    pub fn read_u64_be(&mut self) -> Result<u64> {
        self.check_bound(8)?;
        let result = BigEndian::read_u64(&self.bf[self.cursor..]);
        self.cursor += 8;
        Ok(result)
    }

    #[inline(always)]
    pub fn read_i16_be(&mut self) -> Result<i16> {
        self.check_bound(2)?;
        let result = BigEndian::read_i16(&self.bf[self.cursor..]);
        self.cursor += 2;
        Ok(result)
    }

    #[inline(always)]
    pub fn read_i32_be(&mut self) -> Result<i32> {
        self.check_bound(4)?;
        let result = BigEndian::read_i32(&self.bf[self.cursor..]);
        self.cursor += 4;
        Ok(result)
    }

    #[inline(always)]
    pub fn read_i64_be(&mut self) -> Result<i64> {
        self.check_bound(8)?;
        let result = BigEndian::read_i64(&self.bf[self.cursor..]);
        self.cursor += 8;
        Ok(result)
    }

    #[inline(always)]
    pub fn read_f32_be(&mut self) -> Result<f32> {
        self.check_bound(4)?;
        let result = BigEndian::read_f32(&self.bf[self.cursor..]);
        self.cursor += 4;
        Ok(result)
    }

    #[inline(always)]
    pub fn read_f64_be(&mut self) -> Result<f64> {
        self.check_bound(8)?;
        let result = BigEndian::read_f64(&self.bf[self.cursor..]);
        self.cursor += 8;
        Ok(result)
    }
}
