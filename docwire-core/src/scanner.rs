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

//! Word-at-a-time delimiter search.
//!
//! Eight bytes are loaded as one little-endian `u64`, XORed against the
//! delimiter repeated in every byte, and tested with the classic
//! `(v - 0x01..01) & !v & 0x80..80` trick: the result is non-zero exactly
//! when some byte of `v` is zero, and its lowest set bit marks the first
//! such byte. Bytes that do not fill a whole word are scanned one at a time.

use byteorder::{ByteOrder, LittleEndian};

const WORD: usize = 8;
const LO_BITS: u64 = 0x0101_0101_0101_0101;
const HI_BITS: u64 = 0x8080_8080_8080_8080;

#[inline(always)]
fn zero_byte_mask(v: u64) -> u64 {
    v.wrapping_sub(LO_BITS) & !v & HI_BITS
}

/// Offset (relative to the start of `haystack`) of the first `needle` at or
/// after `from`.
pub fn find_byte(haystack: &[u8], from: usize, needle: u8) -> Option<usize> {
    if from >= haystack.len() {
        return None;
    }
    let pattern = LO_BITS.wrapping_mul(needle as u64);
    let mut pos = from;
    while pos + WORD <= haystack.len() {
        let word = LittleEndian::read_u64(&haystack[pos..pos + WORD]) ^ pattern;
        let mask = zero_byte_mask(word);
        if mask != 0 {
            return Some(pos + (mask.trailing_zeros() / 8) as usize);
        }
        pos += WORD;
    }
    haystack[pos..]
        .iter()
        .position(|&b| b == needle)
        .map(|i| pos + i)
}

/// Offset of the next NUL terminator at or after `from`.
#[inline(always)]
pub fn find_zero(haystack: &[u8], from: usize) -> Option<usize> {
    find_byte(haystack, from, 0)
}
