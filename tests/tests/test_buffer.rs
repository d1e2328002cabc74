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

use docwire::error::should_panic_on_error;
use docwire::scanner::{find_byte, find_zero};
use docwire::{Buffer, Error, Reader};

#[test]
fn test_growth_keeps_written_bytes() {
    let mut buffer = Buffer::with_capacity(4);
    buffer.write_i32(7);
    let before = buffer.capacity();
    buffer.write_bytes(&[1u8; 9]);
    assert!(buffer.capacity() >= before * 2);
    assert!(buffer.capacity() >= 13);
    assert_eq!(&buffer.as_slice()[..4], &7i32.to_le_bytes());
    assert_eq!(buffer.len(), 13);
}

#[test]
fn test_reserved_length_slot() {
    let mut buffer = Buffer::new();
    buffer.write_u8(0xff);
    let slot = buffer.reserve_i32();
    buffer.write_bytes(b"abc");
    buffer.put_i32_at(slot, (buffer.len() - slot) as i32);
    assert_eq!(buffer.as_slice(), &[0xff, 7, 0, 0, 0, b'a', b'b', b'c']);
}

#[test]
fn test_little_and_big_endian() {
    let mut buffer = Buffer::new();
    buffer.write_i32(-2);
    buffer.write_u64(1);
    buffer.write_f64(1.5);
    buffer.write_u16_be(0x0102);
    buffer.write_u32_be(0x0304_0506);
    buffer.write_i64_be(-3);
    buffer.write_f32_be(2.5);

    let mut reader = buffer.reader();
    assert_eq!(reader.read_i32().unwrap(), -2);
    assert_eq!(reader.read_u64().unwrap(), 1);
    assert_eq!(reader.read_f64().unwrap(), 1.5);
    assert_eq!(reader.read_u16_be().unwrap(), 0x0102);
    assert_eq!(reader.read_u32_be().unwrap(), 0x0304_0506);
    assert_eq!(reader.read_i64_be().unwrap(), -3);
    assert_eq!(reader.read_f32_be().unwrap(), 2.5);
    assert_eq!(reader.remaining(), 0);
}

#[test]
fn test_flip_and_clear() {
    let mut buffer = Buffer::new();
    buffer.write_bytes(b"hello");
    assert_eq!(buffer.position(), 5);
    buffer.flip();
    assert!(buffer.is_readable());
    assert_eq!(buffer.position(), 0);
    assert_eq!(buffer.remaining(), 5);
    buffer.set_position(2);
    assert_eq!(buffer.reader().read_bytes(3).unwrap(), b"llo");

    let capacity = buffer.capacity();
    buffer.clear();
    assert!(!buffer.is_readable());
    assert!(buffer.is_empty());
    assert_eq!(buffer.capacity(), capacity);
}

#[test]
fn test_reader_limit_and_truncation() {
    if should_panic_on_error() {
        return;
    }
    let data = [1u8, 2, 3, 4, 5, 6];
    let mut reader = Reader::new(&data);
    reader.set_limit(3);
    assert_eq!(reader.read_u8().unwrap(), 1);
    assert!(matches!(
        reader.read_i32(),
        Err(Error::Truncated {
            expected: 4,
            available: 2
        })
    ));
    // a failed read does not move the cursor
    assert_eq!(reader.position(), 1);
    reader.set_limit(data.len());
    assert_eq!(reader.read_bytes(5).unwrap(), &data[1..]);
    assert!(reader.peek_u8().is_err());
}

#[test]
fn test_read_cstr() {
    if should_panic_on_error() {
        return;
    }
    let data = b"key\0rest";
    let mut reader = Reader::new(data);
    assert_eq!(reader.read_cstr().unwrap(), b"key");
    assert_eq!(reader.position(), 4);
    assert!(matches!(reader.read_cstr(), Err(Error::Truncated { .. })));
}

#[test]
fn test_scanner_matches_naive_search() {
    let mut haystack: Vec<u8> = (1..=200u8).collect();
    for zero_at in [0usize, 7, 8, 15, 16, 63, 199] {
        haystack[zero_at] = 0;
        for from in [0usize, 1, 8, 9, 100] {
            let expected = haystack
                .iter()
                .enumerate()
                .skip(from)
                .find(|(_, &b)| b == 0)
                .map(|(i, _)| i);
            assert_eq!(find_zero(&haystack, from), expected, "{} {}", zero_at, from);
        }
        haystack[zero_at] = zero_at as u8 + 1;
    }
    assert_eq!(find_zero(&haystack, 0), None);
    assert_eq!(find_byte(&haystack, 10, 0x80), Some(0x7f));
    assert_eq!(find_byte(&haystack, 500, 1), None);
}

#[test]
fn test_scanner_high_bytes_do_not_match_zero() {
    let haystack = [0x80u8, 0xff, 0x01, 0x81, 0x80, 0x7f, 0xfe, 0x80, 0x00];
    assert_eq!(find_zero(&haystack, 0), Some(8));
}
