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

use docwire::{Codec, Config, Document, Format, Value};
use std::sync::Arc;
use std::thread;

fn numbered(i: i32) -> Document {
    let mut doc = tests::common_document();
    doc.insert("i", i);
    doc.insert("nested", tests::nested_document(i as usize % 20));
    doc
}

#[test]
fn test_shared_codec_multi_thread() {
    let codec = Arc::new(Codec::new(Config::new().pool_max_size(2)));
    let mut handles = vec![];
    for i in 0..16 {
        let codec_clone = Arc::clone(&codec);
        let handle = thread::spawn(move || {
            let doc = numbered(i);
            for format in [Format::Bson, Format::MsgPack] {
                let bytes = codec_clone.serialize(&doc, format).unwrap();
                let back = codec_clone.deserialize(&bytes, format).unwrap();
                assert_eq!(back, doc);
            }
            i
        });
        handles.push(handle);
    }
    let mut seen: Vec<i32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..16).collect::<Vec<_>>());
    assert_eq!(codec.buffer_pool_stats().in_use, 0);
}

#[test]
fn test_serialize_then_deserialize_across_threads() {
    let codec = Arc::new(Codec::default());
    let mut handles = vec![];
    for i in 0..8 {
        let codec_clone = Arc::clone(&codec);
        handles.push(thread::spawn(move || {
            codec_clone.serialize_bson(&numbered(i)).unwrap()
        }));
    }
    let serialized: Vec<Vec<u8>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let mut handles = vec![];
    for bytes in serialized {
        let codec_clone = Arc::clone(&codec);
        handles.push(thread::spawn(move || {
            codec_clone.deserialize_bson(&bytes).unwrap()
        }));
    }
    let mut ids: Vec<i32> = handles
        .into_iter()
        .map(|h| match h.join().unwrap().get("i") {
            Some(Value::Int32(i)) => *i,
            other => panic!("unexpected {:?}", other),
        })
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, (0..8).collect::<Vec<_>>());
}
