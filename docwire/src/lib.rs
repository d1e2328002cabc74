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

//! # Docwire
//!
//! Docwire converts schemaless document trees to and from BSON and
//! MessagePack. Encoding and decoding walk the tree with an explicit frame
//! stack instead of recursion, so nesting depth is bounded by memory rather
//! than by the thread stack, and all per-call working memory comes from
//! pools owned by a [`Codec`].
//!
//! ## Key Features
//!
//! - **Two wire formats**: BSON documents and MessagePack maps share one
//!   value model and one traversal engine
//! - **Iterative engine**: no recursion on either the write or the read path
//! - **Pooled buffers**: output buffers are checked out of a bounded pool
//!   that either blocks or fails fast when every buffer is in use
//! - **Exact decimals**: [`Value::Decimal`] round-trips through the 16-byte
//!   IEEE 754 decimal128 encoding
//! - **Zero-copy binaries**: decoding from `bytes::Bytes` can share binary
//!   payloads with the input instead of copying them
//! - **Hardened decoding**: declared lengths are checked against the bytes
//!   that are actually present and against a configurable size ceiling
//!
//! ## Quick Start
//!
//! ```rust
//! use docwire::{Codec, Document, Value};
//!
//! let codec = Codec::default();
//!
//! let mut doc = Document::new();
//! doc.insert("a", 1);
//! doc.insert(
//!     "b",
//!     Value::Array(vec![Value::from(1), Value::from("two"), Value::Null]),
//! );
//!
//! let bytes = codec.serialize_bson(&doc).unwrap();
//! assert_eq!(bytes.len(), 41);
//! assert_eq!(codec.deserialize_bson(&bytes).unwrap(), doc);
//!
//! let packed = codec.serialize_msgpack(&doc).unwrap();
//! assert_eq!(codec.deserialize_msgpack(&packed).unwrap(), doc);
//! ```
//!
//! ## Value Model
//!
//! | Variant            | BSON                  | MessagePack            |
//! |--------------------|-----------------------|------------------------|
//! | `Null`             | null (0x0A)           | nil                    |
//! | `Bool`             | boolean (0x08)        | true / false           |
//! | `Int32`, `Int64`   | int32 / int64         | smallest int marker    |
//! | `Float32`          | not supported         | float 32               |
//! | `Float64`          | double (0x01)         | float 64               |
//! | `String`           | string (0x02)         | str                    |
//! | `Binary`           | binary (0x05)         | bin                    |
//! | `ObjectId`         | ObjectId (0x07)       | not supported          |
//! | `DateTime`         | UTC datetime (0x09)   | not supported          |
//! | `Decimal`          | decimal128 (0x13)     | not supported          |
//! | `Extension`        | not supported         | ext                    |
//! | `Array`            | array (0x04)          | array                  |
//! | `Map`              | document (0x03)       | map                    |
//!
//! Encoding a value into a format that cannot represent it fails with
//! [`Error::EncodeType`].
//!
//! ## Configuration
//!
//! ```rust
//! use std::time::Duration;
//! use docwire::{BinaryMode, Codec, Config};
//!
//! let config = Config::new()
//!     .pool_max_size(8)
//!     .acquire_timeout(Duration::from_millis(50))
//!     .max_document_size(1 << 20)
//!     .binary_mode(BinaryMode::View);
//! let codec = Codec::new(config);
//! assert_eq!(codec.config().get_pool_max_size(), 8);
//! ```
//!
//! A codec built with [`Codec::fail_fast`] returns [`Error::PoolOverflow`]
//! as soon as every pooled buffer is checked out, instead of waiting.
//!
//! ## Streams
//!
//! ```rust
//! use std::io::Cursor;
//! use docwire::{Codec, Document};
//!
//! let codec = Codec::default();
//! let doc: Document = [("k", "v")].into_iter().collect();
//!
//! let mut wire = Vec::new();
//! codec.write_msgpack_to(&doc, &mut wire).unwrap();
//! codec.write_msgpack_to(&doc, &mut wire).unwrap();
//!
//! let mut input = Cursor::new(wire);
//! assert_eq!(codec.read_msgpack_from(&mut input).unwrap(), doc);
//! assert_eq!(codec.read_msgpack_from(&mut input).unwrap(), doc);
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use docwire::{Codec, Error};
//!
//! let codec = Codec::default();
//! match codec.deserialize_bson(&[9, 0, 0, 0, 0]) {
//!     Err(Error::Truncated { expected, available }) => {
//!         assert_eq!((expected, available), (9, 5));
//!     }
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```

pub use docwire_core::{
    buffer, codec, config, decimal128, error, format, pool, scanner, stream, value, BinaryMode,
    Binary, Blocking, BoundedPool, Buffer, Codec, Config, DateTime, Decimal128, DisposablePool,
    Document, Error, ErrorKind, Extension, FailFast, Format, ObjectId, OverflowPolicy, PoolStats,
    Pooled, Reader, Release, Result, Reusable, SoftPool, Value, ValueKind, subtype,
};
