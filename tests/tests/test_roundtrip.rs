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

//! Randomized round-trips through both formats.

use bigdecimal::BigDecimal;
use docwire::error::should_panic_on_error;
use docwire::{Binary, Codec, DateTime, Document, Extension, Format, ObjectId, Value};
use proptest::prelude::*;

fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z0-9_]{0,11}"
}

fn common_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::Int32),
        any::<i64>().prop_map(Value::Int64),
        (-1e15f64..1e15f64).prop_map(Value::Float64),
        ".{0,24}".prop_map(Value::String),
        prop::collection::vec(any::<u8>(), 0..48).prop_map(|b| Value::Binary(Binary::new(b))),
    ]
}

fn bson_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => common_scalar(),
        1 => any::<[u8; 12]>().prop_map(|b| Value::ObjectId(ObjectId::from_bytes(b))),
        1 => any::<i64>().prop_map(|ms| Value::DateTime(DateTime::from_millis(ms))),
        1 => (any::<i64>(), -40i32..40).prop_map(|(digits, exp)| {
            let d: BigDecimal = format!("{}E{}", digits, exp).parse().unwrap();
            Value::Decimal(d)
        }),
        1 => (any::<u8>(), prop::collection::vec(any::<u8>(), 0..16))
            .prop_map(|(subtype, b)| Value::Binary(Binary::with_subtype(subtype, b))),
    ]
}

fn msgpack_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => common_scalar(),
        1 => (-1e6f32..1e6f32).prop_map(Value::Float32),
        1 => (any::<i8>(), prop::collection::vec(any::<u8>(), 0..300))
            .prop_map(|(kind, data)| Value::Extension(Extension::new(kind, data))),
    ]
}

fn tree(leaf: impl Strategy<Value = Value> + 'static) -> impl Strategy<Value = Value> {
    leaf.prop_recursive(6, 128, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec((key_strategy(), inner), 0..6)
                .prop_map(|entries| Value::Map(entries.into_iter().collect())),
        ]
    })
}

fn document(leaf: impl Strategy<Value = Value> + 'static) -> impl Strategy<Value = Document> {
    prop::collection::vec((key_strategy(), tree(leaf)), 0..8)
        .prop_map(|entries| entries.into_iter().collect())
}

/// Wraps `doc` `levels` times, alternating arrays and maps.
fn bury(doc: Document, levels: usize) -> Document {
    let mut value = Value::Map(doc);
    for level in 0..levels {
        value = if level % 2 == 0 {
            Value::Array(vec![Value::Null, value])
        } else {
            let mut wrapper = Document::new();
            wrapper.insert("level", value);
            Value::Map(wrapper)
        };
    }
    let mut root = Document::new();
    root.insert("root", value);
    root
}

proptest! {
    #[test]
    fn bson_roundtrip(doc in document(bson_scalar())) {
        let codec = Codec::default();
        let bytes = codec.serialize(&doc, Format::Bson).unwrap();
        prop_assert_eq!(bytes.len(), i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize);
        prop_assert_eq!(codec.deserialize(&bytes, Format::Bson).unwrap(), doc);
    }

    #[test]
    fn msgpack_roundtrip(doc in document(msgpack_scalar())) {
        let codec = Codec::default();
        let bytes = codec.serialize(&doc, Format::MsgPack).unwrap();
        prop_assert_eq!(codec.deserialize(&bytes, Format::MsgPack).unwrap(), doc);
    }

    #[test]
    fn deep_roundtrip_both_formats(doc in document(common_scalar()), levels in 5usize..12) {
        let codec = Codec::default();
        let doc = bury(doc, levels);
        for format in [Format::Bson, Format::MsgPack] {
            let bytes = codec.serialize(&doc, format).unwrap();
            prop_assert_eq!(&codec.deserialize(&bytes, format).unwrap(), &doc);
        }
    }

    #[test]
    fn truncated_input_never_panics(doc in document(common_scalar()), cut in any::<prop::sample::Index>()) {
        if should_panic_on_error() {
            return Ok(());
        }
        let codec = Codec::default();
        for format in [Format::Bson, Format::MsgPack] {
            let bytes = codec.serialize(&doc, format).unwrap();
            let cut = cut.index(bytes.len());
            prop_assert!(codec.deserialize(&bytes[..cut], format).is_err());
        }
    }
}
