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

//! # Docwire Core
//!
//! The engine behind the `docwire` crate: converts a [`Document`] tree to
//! BSON or MessagePack and back without recursion and with pooled working
//! memory.
//!
//! ## Architecture
//!
//! - **`buffer`**: growable little-endian [`Buffer`] with reserved length
//!   slots, and a bounds-checked [`Reader`]
//! - **`scanner`**: word-at-a-time search for NUL-terminated keys
//! - **`pool`**: bounded pools with blocking or fail-fast overflow, soft
//!   pools and scoped [`Pooled`] guards
//! - **`value`**: the document tree ([`Value`], [`Document`])
//! - **`decimal128`**: exact IEEE 754 decimal128 (BID) conversion
//! - **`engine`**: frame-stack writer and reader shared by both formats
//! - **`format`**: BSON and MessagePack wire adapters
//! - **`codec`**: the [`Codec`] facade, including stream framing
//!
//! ## Usage
//!
//! ```rust
//! use docwire_core::{Codec, Config, Document, Value};
//!
//! let codec = Codec::new(Config::default());
//! let doc: Document = [("name", Value::from("docwire")), ("depth", Value::from(5))]
//!     .into_iter()
//!     .collect();
//! let bytes = codec.serialize_bson(&doc).unwrap();
//! assert_eq!(codec.deserialize_bson(&bytes).unwrap(), doc);
//! ```

pub mod buffer;
pub mod codec;
pub mod config;
pub mod decimal128;
pub(crate) mod engine;
pub mod error;
pub mod format;
pub mod pool;
pub mod scanner;
pub mod stream;
pub mod util;
pub mod value;

pub use buffer::{Buffer, Reader};
pub use codec::Codec;
pub use config::{BinaryMode, Config};
pub use decimal128::Decimal128;
pub use error::{Error, ErrorKind, Result};
pub use format::Format;
pub use pool::{
    Blocking, BoundedPool, DisposablePool, FailFast, OverflowPolicy, PoolStats, Pooled, Release,
    Reusable, SoftPool,
};
pub use value::{subtype, Binary, DateTime, Document, Extension, ObjectId, Value, ValueKind};
