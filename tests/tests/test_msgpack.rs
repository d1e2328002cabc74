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

use std::time::{Duration, Instant};

use bytes::Bytes;
use docwire::error::should_panic_on_error;
use docwire::{BinaryMode, Codec, Config, Document, Error, Extension, Format, Value};
use tests::{assert_roundtrip, msgpack_document, nested_document, small_document};

#[test]
fn test_small_document_bytes() {
    let codec = Codec::default();
    let bytes = codec.serialize_msgpack(&small_document()).unwrap();
    assert_eq!(
        bytes,
        [0x82, 0xa1, b'a', 0x01, 0xa1, b'b', 0x93, 0x01, 0xa3, b't', b'w', b'o', 0xc0]
    );
    assert_eq!(codec.deserialize_msgpack(&bytes).unwrap(), small_document());
}

#[test]
fn test_empty_containers() {
    let codec = Codec::default();
    assert_eq!(codec.serialize_msgpack(&Document::new()).unwrap(), [0x80]);

    let mut doc = Document::new();
    doc.insert("a", Value::Array(vec![]));
    doc.insert("m", Document::new());
    let bytes = codec.serialize_msgpack(&doc).unwrap();
    assert_eq!(bytes, [0x82, 0xa1, b'a', 0x90, 0xa1, b'm', 0x80]);
    assert_eq!(codec.deserialize_msgpack(&bytes).unwrap(), doc);
}

#[test]
fn test_all_kinds_roundtrip() {
    let codec = Codec::default();
    assert_roundtrip(&codec, &msgpack_document(), Format::MsgPack);
}

#[test]
fn test_large_containers_use_wide_headers() {
    let codec = Codec::default();
    let mut doc = Document::new();
    for i in 0..20 {
        doc.insert(format!("k{}", i), i);
    }
    doc.insert("list", (0..70_000).map(Value::Int32).collect::<Vec<_>>());
    let bytes = codec.serialize_msgpack(&doc).unwrap();
    // 21 entries: map16
    assert_eq!(&bytes[..3], &[0xde, 0, 21]);
    assert_eq!(codec.deserialize_msgpack(&bytes).unwrap(), doc);
}

#[test]
fn test_deep_nesting_roundtrip() {
    let codec = Codec::default();
    let doc = nested_document(100_000);
    let bytes = codec.serialize_msgpack(&doc).unwrap();
    assert_eq!(codec.deserialize_msgpack(&bytes).unwrap(), doc);
}

#[test]
fn test_deep_decode_then_drop() {
    // {"d": [[[ ... [] ... ]]]}, 300_001 arrays deep
    let mut bytes = vec![0x81, 0xa1, b'd'];
    bytes.resize(bytes.len() + 300_000, 0x91);
    bytes.push(0x90);
    let codec = Codec::default();
    let doc = codec.deserialize_msgpack(&bytes).unwrap();
    let mut depth = 0;
    let mut node = doc.get("d").and_then(Value::as_array);
    while let Some([child]) = node {
        depth += 1;
        node = child.as_array();
    }
    assert_eq!(depth, 300_000);
    assert_eq!(node.map(|items| items.len()), Some(0));
    assert_eq!(codec.deserialize_msgpack(&bytes).unwrap(), doc);
    assert_eq!(codec.serialize_msgpack(&doc).unwrap(), bytes);
    drop(doc);
}

#[test]
fn test_wide_map_decodes_in_linear_time() {
    const ENTRIES: u32 = 80_000;
    // map32 of six-character keys bound to nil
    let mut bytes = vec![0xdf];
    bytes.extend_from_slice(&ENTRIES.to_be_bytes());
    for i in 0..ENTRIES {
        bytes.push(0xa6);
        bytes.extend_from_slice(format!("{:06}", i).as_bytes());
        bytes.push(0xc0);
    }
    let codec = Codec::default();
    let start = Instant::now();
    let doc = codec.deserialize_msgpack(&bytes).unwrap();
    let elapsed = start.elapsed();
    assert_eq!(doc.len(), ENTRIES as usize);
    assert_eq!(doc.get("079999"), Some(&Value::Null));
    assert_eq!(doc.keys().next(), Some("000000"));
    assert!(elapsed < Duration::from_secs(5), "decode took {:?}", elapsed);
    assert_eq!(codec.serialize_msgpack(&doc).unwrap(), bytes);
}

#[test]
fn test_integer_width_is_not_preserved() {
    let codec = Codec::default();
    let mut doc = Document::new();
    doc.insert("n", Value::Int64(7));
    let back = codec
        .deserialize_msgpack(&codec.serialize_msgpack(&doc).unwrap())
        .unwrap();
    assert!(matches!(back.get("n"), Some(Value::Int32(7))));
    // numeric equality across widths
    assert_eq!(back, doc);
}

#[test]
fn test_extension_and_float32() {
    let codec = Codec::default();
    let mut doc = Document::new();
    doc.insert("e1", Extension::new(5, vec![0xaau8]));
    doc.insert("e3", Extension::new(-1, vec![1u8, 2, 3]));
    doc.insert("f", 0.25f32);
    let bytes = codec.serialize_msgpack(&doc).unwrap();
    // fixext1
    assert_eq!(&bytes[1..7], &[0xa2, b'e', b'1', 0xd4, 5, 0xaa]);
    let back = codec.deserialize_msgpack(&bytes).unwrap();
    assert!(matches!(back.get("f"), Some(Value::Float32(v)) if *v == 0.25));
    assert_eq!(back, doc);
}

#[test]
fn test_shared_binary_view() {
    let codec = Codec::new(Config::new().binary_mode(BinaryMode::View));
    let mut doc = Document::new();
    doc.insert("blob", vec![1u8; 64]);
    let bytes = Bytes::from(codec.serialize_msgpack(&doc).unwrap());
    let back = codec.deserialize_msgpack_shared(&bytes).unwrap();
    let payload = back.get("blob").and_then(Value::as_binary).unwrap();
    let range = bytes.as_ptr_range();
    assert!(range.contains(&payload.as_slice().as_ptr()));
    assert_eq!(back, doc);
}

#[test]
fn test_malformed_input() {
    if should_panic_on_error() {
        return;
    }
    let codec = Codec::default();
    // root must be a map
    assert!(matches!(
        codec.deserialize_msgpack(&[0x91, 0x01]),
        Err(Error::Format(_))
    ));
    // empty input
    assert!(matches!(
        codec.deserialize_msgpack(&[]),
        Err(Error::Truncated { .. })
    ));
    // map declares two entries, holds one
    assert!(matches!(
        codec.deserialize_msgpack(&[0x82, 0xa1, b'a', 0x01]),
        Err(Error::Corruption(_)) | Err(Error::Truncated { .. })
    ));
    // trailing bytes
    assert!(matches!(
        codec.deserialize_msgpack(&[0x80, 0x00]),
        Err(Error::Format(_))
    ));
    // invalid UTF-8 in a string value
    assert!(matches!(
        codec.deserialize_msgpack(&[0x81, 0xa1, b'a', 0xa1, 0xff]),
        Err(Error::Format(_))
    ));
}

#[test]
fn test_bson_only_kinds_rejected() {
    if should_panic_on_error() {
        return;
    }
    let codec = Codec::default();
    let mut doc = Document::new();
    doc.insert("d", tests::decimal("1.5"));
    assert!(matches!(
        codec.serialize_msgpack(&doc),
        Err(Error::EncodeType(_))
    ));
    // a failed encode returns its buffer to the pool
    assert_eq!(codec.buffer_pool_stats().in_use, 0);
}

#[test]
fn test_max_document_size() {
    if should_panic_on_error() {
        return;
    }
    let codec = Codec::new(Config::new().max_document_size(4));
    let bytes = codec.serialize_msgpack(&small_document()).unwrap();
    assert!(matches!(
        codec.deserialize_msgpack(&bytes),
        Err(Error::Capacity { size: 13, max: 4 })
    ));
}
