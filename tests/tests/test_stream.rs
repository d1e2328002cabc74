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
use docwire::{BinaryMode, Codec, Config, Error, Format};
use std::io::{self, Cursor, Read};
use tests::{bson_document, msgpack_document, small_document};

/// Hands out at most `chunk` bytes per read.
struct Trickle<R> {
    inner: R,
    chunk: usize,
}

impl<R: Read> Read for Trickle<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.chunk);
        self.inner.read(&mut buf[..n])
    }
}

struct Broken;

impl Read for Broken {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
    }
}

#[test]
fn test_bson_frame_is_the_document() {
    let codec = Codec::default();
    let mut wire = Vec::new();
    let written = codec.write_bson_to(&small_document(), &mut wire).unwrap();
    assert_eq!(written, 41);
    assert_eq!(wire, codec.serialize_bson(&small_document()).unwrap());
}

#[test]
fn test_msgpack_frame_has_length_prefix() {
    let codec = Codec::default();
    let mut wire = Vec::new();
    let written = codec.write_msgpack_to(&small_document(), &mut wire).unwrap();
    assert_eq!(written, 4 + 13);
    assert_eq!(&wire[..4], &13u32.to_le_bytes());
}

#[test]
fn test_many_frames_over_slow_reader() {
    for mode in [BinaryMode::Owned, BinaryMode::View] {
        let codec = Codec::new(Config::new().binary_mode(mode));
        let mut wire = Vec::new();
        for _ in 0..3 {
            codec.write_to(&bson_document(), Format::Bson, &mut wire).unwrap();
            codec
                .write_to(&msgpack_document(), Format::MsgPack, &mut wire)
                .unwrap();
        }
        let mut input = Trickle {
            inner: Cursor::new(wire),
            chunk: 3,
        };
        for _ in 0..3 {
            assert_eq!(codec.read_from(&mut input, Format::Bson).unwrap(), bson_document());
            assert_eq!(
                codec.read_from(&mut input, Format::MsgPack).unwrap(),
                msgpack_document()
            );
        }
        // clean end of stream
        assert!(matches!(
            codec.read_bson_from(&mut input),
            Err(Error::Truncated {
                expected: 4,
                available: 0
            })
        ));
    }
}

#[test]
fn test_truncated_bson_frame() {
    if should_panic_on_error() {
        return;
    }
    let codec = Codec::default();
    let mut wire = Vec::new();
    codec.write_bson_to(&small_document(), &mut wire).unwrap();
    wire.truncate(30);
    assert!(matches!(
        codec.read_bson_from(&mut Cursor::new(wire)),
        Err(Error::Truncated {
            expected: 41,
            available: 30
        })
    ));
}

#[test]
fn test_bad_bson_header() {
    if should_panic_on_error() {
        return;
    }
    let codec = Codec::default();
    let wire = [2u8, 0, 0, 0, 0];
    assert!(matches!(
        codec.read_bson_from(&mut Cursor::new(wire)),
        Err(Error::Corruption(_))
    ));
}

#[test]
fn test_oversized_frame() {
    if should_panic_on_error() {
        return;
    }
    let codec = Codec::new(Config::new().max_document_size(32));
    let mut wire = Vec::new();
    Codec::default()
        .write_bson_to(&small_document(), &mut wire)
        .unwrap();
    assert!(matches!(
        codec.read_bson_from(&mut Cursor::new(wire)),
        Err(Error::Capacity { size: 41, max: 32 })
    ));
}

#[test]
fn test_io_errors_pass_through() {
    if should_panic_on_error() {
        return;
    }
    let codec = Codec::default();
    match codec.read_msgpack_from(&mut Broken) {
        Err(Error::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::ConnectionReset),
        other => panic!("unexpected {:?}", other),
    }
}
