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

use docwire::error::should_panic_on_error;
use docwire::{Binary, Codec, Config, Document, Error, ErrorKind, Extension, Format, Value};
use tests::{assert_roundtrip, bson_document, nested_document, small_document};

const SMALL_BSON: [u8; 41] = [
    41, 0, 0, 0, //
    0x10, b'a', 0, 1, 0, 0, 0, //
    0x04, b'b', 0, 26, 0, 0, 0, //
    0x10, b'0', 0, 1, 0, 0, 0, //
    0x02, b'1', 0, 4, 0, 0, 0, b't', b'w', b'o', 0, //
    0x0A, b'2', 0, //
    0, //
    0,
];

#[test]
fn test_small_document_bytes() {
    let codec = Codec::default();
    let bytes = codec.serialize_bson(&small_document()).unwrap();
    assert_eq!(bytes, SMALL_BSON);
    assert_eq!(codec.deserialize_bson(&SMALL_BSON).unwrap(), small_document());
}

#[test]
fn test_empty_containers() {
    let codec = Codec::default();
    let bytes = codec.serialize_bson(&Document::new()).unwrap();
    assert_eq!(bytes, [5, 0, 0, 0, 0]);
    assert!(codec.deserialize_bson(&bytes).unwrap().is_empty());

    let mut doc = Document::new();
    doc.insert("arr", Value::Array(vec![]));
    doc.insert("map", Document::new());
    let bytes = codec.serialize_bson(&doc).unwrap();
    // 4 + (1 + 4 + 5) + (1 + 4 + 5) + 1
    assert_eq!(bytes.len(), 25);
    assert_eq!(codec.deserialize_bson(&bytes).unwrap(), doc);
}

#[test]
fn test_all_kinds_roundtrip() {
    let codec = Codec::default();
    assert_roundtrip(&codec, &bson_document(), Format::Bson);
}

#[test]
fn test_old_binary_subtype_roundtrip() {
    let codec = Codec::default();
    let mut doc = Document::new();
    doc.insert("old", Binary::with_subtype(2, vec![1u8, 2, 3]));
    let bytes = codec.serialize_bson(&doc).unwrap();
    // outer length covers the inner length prefix
    assert_eq!(&bytes[9..18], &[7, 0, 0, 0, 2, 3, 0, 0, 0]);
    assert_eq!(codec.deserialize_bson(&bytes).unwrap(), doc);
}

#[test]
fn test_deep_nesting_roundtrip() {
    let codec = Codec::default();
    let doc = nested_document(100_000);
    let bytes = codec.serialize_bson(&doc).unwrap();
    let back = codec.deserialize_bson(&bytes).unwrap();
    assert_eq!(back, doc);
}

#[test]
fn test_deep_decode_then_drop() {
    let codec = Codec::default();
    let bytes = codec.serialize_bson(&nested_document(300_000)).unwrap();
    // 8 bytes per enclosing document around the 12-byte {"n": 0}
    assert_eq!(bytes.len(), 300_000 * 8 + 12);
    let back = codec.deserialize_bson(&bytes).unwrap();
    let mut depth = 0;
    let mut node = back.get("n");
    while let Some(Value::Map(doc)) = node {
        depth += 1;
        node = doc.get("n");
    }
    assert_eq!(depth, 300_000);
    assert_eq!(node, Some(&Value::Int32(0)));
    drop(back);
}

#[test]
fn test_wide_document_decodes_in_linear_time() {
    let codec = Codec::default();
    let doc: Document = (0..80_000).map(|i| (format!("k{:06}", i), i)).collect();
    let bytes = codec.serialize_bson(&doc).unwrap();
    let start = Instant::now();
    let back = codec.deserialize_bson(&bytes).unwrap();
    let elapsed = start.elapsed();
    assert_eq!(back.len(), 80_000);
    assert_eq!(back.get("k079999"), Some(&Value::Int32(79_999)));
    assert!(elapsed < Duration::from_secs(5), "decode took {:?}", elapsed);
}

#[test]
fn test_key_order_preserved() {
    let codec = Codec::default();
    let doc: Document = [("z", 1), ("a", 2), ("m", 3)].into_iter().collect();
    let back = codec
        .deserialize_bson(&codec.serialize_bson(&doc).unwrap())
        .unwrap();
    assert_eq!(back.keys().collect::<Vec<_>>(), ["z", "a", "m"]);
}

#[test]
fn test_unsupported_kinds() {
    if should_panic_on_error() {
        return;
    }
    let codec = Codec::default();
    for value in [Value::Float32(1.0), Value::Extension(Extension::new(1, vec![0u8]))] {
        let mut doc = Document::new();
        doc.insert("v", value);
        let err = codec.serialize_bson(&doc).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EncodeType);
    }
    let mut doc = Document::new();
    doc.insert("bad\0key", 1);
    assert!(matches!(
        codec.serialize_bson(&doc),
        Err(Error::EncodeType(_))
    ));
}

#[test]
fn test_nested_length_corruption() {
    if should_panic_on_error() {
        return;
    }
    let codec = Codec::default();

    let mut bytes = SMALL_BSON;
    bytes[14] = 100;
    assert!(matches!(
        codec.deserialize_bson(&bytes),
        Err(Error::Corruption(_))
    ));

    let mut bytes = SMALL_BSON;
    bytes[14] = 4;
    assert!(matches!(
        codec.deserialize_bson(&bytes),
        Err(Error::Corruption(_))
    ));
}

#[test]
fn test_malformed_input() {
    if should_panic_on_error() {
        return;
    }
    let codec = Codec::default();

    // declared length larger than the input
    assert!(matches!(
        codec.deserialize_bson(&SMALL_BSON[..30]),
        Err(Error::Truncated {
            expected: 41,
            available: 30
        })
    ));

    // declared length below the minimum document
    assert!(matches!(
        codec.deserialize_bson(&[4, 0, 0, 0, 0]),
        Err(Error::Corruption(_))
    ));

    // unknown element type
    let mut bytes = SMALL_BSON;
    bytes[4] = 0x42;
    match codec.deserialize_bson(&bytes) {
        Err(Error::Format(msg)) => assert!(msg.contains("0x42"), "{}", msg),
        other => panic!("unexpected {:?}", other),
    }

    // trailing bytes after the document
    let mut bytes = SMALL_BSON.to_vec();
    bytes.push(0);
    assert!(matches!(
        codec.deserialize_bson(&bytes),
        Err(Error::Format(_))
    ));

    // input shorter than a length prefix
    assert!(matches!(
        codec.deserialize_bson(&[5, 0]),
        Err(Error::Truncated { .. })
    ));
}

#[test]
fn test_max_document_size() {
    if should_panic_on_error() {
        return;
    }
    let codec = Codec::new(Config::new().max_document_size(16));
    assert!(matches!(
        codec.deserialize_bson(&SMALL_BSON),
        Err(Error::Capacity { size: 41, max: 16 })
    ));
    // the ceiling only applies to decoding
    assert_eq!(codec.serialize_bson(&small_document()).unwrap().len(), 41);
}

#[test]
fn test_deserialize_into_reuses_document() {
    let codec = Codec::default();
    let mut doc = Document::new();
    doc.insert("stale", true);
    codec.deserialize_bson_into(&SMALL_BSON, &mut doc).unwrap();
    assert_eq!(doc, small_document());
}

#[test]
fn test_pooled_output() {
    let codec = Codec::default();
    {
        let buf = codec.serialize_bson_pooled(&small_document()).unwrap();
        assert_eq!(buf.as_slice(), SMALL_BSON);
        assert_eq!(codec.buffer_pool_stats().in_use, 1);
    }
    assert_eq!(codec.buffer_pool_stats().in_use, 0);
}
