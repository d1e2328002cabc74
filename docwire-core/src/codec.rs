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

use bytes::Bytes;
use tracing::trace;

use crate::buffer::{Buffer, Reader};
use crate::config::{BinaryMode, Config};
use crate::engine::reader::{self, ReadFrame};
use crate::engine::writer::{self, WriteFrame};
use crate::engine::{DecodeContext, WireRead, WireWrite};
use crate::ensure;
use crate::error::{Error, Result};
use crate::format::bson::Bson;
use crate::format::msgpack::MsgPack;
use crate::format::Format;
use crate::pool::{
    Blocking, BoundedPool, DisposablePool, FailFast, OverflowPolicy, PoolStats, Pooled, SoftPool,
};
use crate::value::Document;

/// Entry point for encoding and decoding documents.
///
/// A `Codec` owns the pools every call draws from: wire buffers (bounded by
/// [`Config::pool_max_size`]), frame stacks for both traversal directions,
/// and scratch bytes for the stream variants. It is `Send + Sync`; share one
/// instance between threads behind an `Arc` or a `static`.
///
/// The type parameter picks what a call does when all buffers are checked
/// out: [`Blocking`] (the default) waits, [`FailFast`] returns
/// [`Error::PoolOverflow`](crate::error::Error::PoolOverflow).
///
/// # Examples
///
/// ```rust
/// use docwire_core::{Codec, Config, Document, Value};
///
/// let codec = Codec::new(Config::default());
/// let mut doc = Document::new();
/// doc.insert("a", 1);
/// doc.insert("b", vec![Value::from(1), Value::from("two"), Value::Null]);
///
/// let bytes = codec.serialize_bson(&doc).unwrap();
/// assert_eq!(codec.deserialize_bson(&bytes).unwrap(), doc);
///
/// let bytes = codec.serialize_msgpack(&doc).unwrap();
/// assert_eq!(codec.deserialize_msgpack(&bytes).unwrap(), doc);
/// ```
///
/// A fail-fast codec reports pool exhaustion instead of waiting:
///
/// ```rust
/// use docwire_core::{Codec, Config};
///
/// let codec = Codec::fail_fast(Config::new().pool_max_size(1));
/// let held = codec.acquire_buffer().unwrap();
/// assert!(codec.acquire_buffer().is_err());
/// drop(held);
/// assert!(codec.acquire_buffer().is_ok());
/// ```
pub struct Codec<P: OverflowPolicy = Blocking> {
    config: Config,
    buffers: DisposablePool<Buffer, P>,
    write_frames: SoftPool<Vec<WriteFrame<'static>>>,
    read_frames: SoftPool<Vec<ReadFrame>>,
    scratch: SoftPool<Vec<u8>>,
}

impl Default for Codec<Blocking> {
    fn default() -> Self {
        Codec::new(Config::default())
    }
}

impl Codec<Blocking> {
    /// Creates a codec whose buffer pool blocks at its ceiling, for at most
    /// [`Config::acquire_timeout`] when one is set.
    pub fn new(config: Config) -> Self {
        let policy = Blocking::new(config.get_acquire_timeout());
        Self::with_policy(config, policy)
    }
}

impl Codec<FailFast> {
    /// Creates a codec whose buffer pool fails immediately at its ceiling.
    pub fn fail_fast(config: Config) -> Self {
        Self::with_policy(config, FailFast)
    }
}

impl<P: OverflowPolicy> Codec<P> {
    pub fn with_policy(config: Config, policy: P) -> Self {
        let capacity = config.get_initial_buffer_capacity();
        let soft = config.get_scratch_soft_capacity();
        let buffers = BoundedPool::new(
            config.get_pool_initial_size(),
            config.get_pool_max_size(),
            policy,
            move || Buffer::with_capacity(capacity),
        );
        Codec {
            buffers: DisposablePool::new(buffers),
            write_frames: SoftPool::new(soft, Vec::new),
            read_frames: SoftPool::new(soft, Vec::new),
            scratch: SoftPool::new(soft, Vec::new),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Checks a buffer out of the bounded pool. It returns when the guard
    /// is dropped.
    pub fn acquire_buffer(&self) -> Result<Pooled<'_, Buffer>> {
        self.buffers.acquire()
    }

    pub fn buffer_pool_stats(&self) -> PoolStats {
        self.buffers.stats()
    }

    pub(crate) fn scratch(&self) -> &SoftPool<Vec<u8>> {
        &self.scratch
    }

    fn encode<W: WireWrite>(&self, doc: &Document, buf: &mut Buffer) -> Result<()> {
        let mut frames: Vec<WriteFrame<'_>> = self.write_frames.acquire();
        let result = writer::write_document::<W>(buf, doc, &mut frames);
        self.write_frames.release(writer::recycle(frames));
        result
    }

    /// Encodes into a caller-owned buffer, refusing one in read mode.
    fn encode_into<W: WireWrite>(&self, doc: &Document, buf: &mut Buffer) -> Result<()> {
        ensure!(
            !buf.is_readable(),
            Error::encode_type("buffer is in read mode; clear it before encoding into it")
        );
        self.encode::<W>(doc, buf)
    }

    fn encode_to_vec<W: WireWrite>(&self, doc: &Document, format: Format) -> Result<Vec<u8>> {
        let mut buf = self.buffers.acquire()?;
        self.encode::<W>(doc, &mut buf)?;
        trace!(%format, bytes = buf.len(), entries = doc.len(), "serialized document");
        Ok(buf.to_vec())
    }

    fn encode_pooled<W: WireWrite>(&self, doc: &Document) -> Result<Pooled<'_, Buffer>> {
        let mut buf = self.buffers.acquire()?;
        self.encode::<W>(doc, &mut buf)?;
        buf.flip();
        Ok(buf)
    }

    fn decode<R: WireRead>(
        &self,
        input: &[u8],
        shared: Option<&Bytes>,
        doc: &mut Document,
        format: Format,
    ) -> Result<()> {
        let ctx = DecodeContext {
            max_document_size: self.config.get_max_document_size(),
            shared,
        };
        let mut input_reader = Reader::new(input);
        let mut frames = self.read_frames.checkout();
        reader::read_document::<R>(&mut input_reader, &ctx, doc, &mut frames)?;
        let consumed = input_reader.position();
        ensure!(
            consumed == input.len(),
            "{} trailing bytes after a {} document of {} bytes",
            input.len() - consumed,
            format,
            consumed
        );
        trace!(%format, bytes = consumed, entries = doc.len(), "deserialized document");
        Ok(())
    }

    fn decode_shared<R: WireRead>(&self, input: &Bytes, format: Format) -> Result<Document> {
        let shared = match self.config.get_binary_mode() {
            BinaryMode::View => Some(input),
            BinaryMode::Owned => None,
        };
        let mut doc = Document::new();
        self.decode::<R>(input, shared, &mut doc, format)?;
        Ok(doc)
    }

    /// Serializes `doc` as BSON.
    ///
    /// # Errors
    ///
    /// - [`Error::EncodeType`](crate::error::Error::EncodeType) when the tree
    ///   holds a kind BSON cannot carry (`float32`, `extension`), a key with a
    ///   NUL byte, or a decimal outside the decimal128 range.
    /// - [`Error::PoolOverflow`](crate::error::Error::PoolOverflow) when no
    ///   buffer can be acquired.
    pub fn serialize_bson(&self, doc: &Document) -> Result<Vec<u8>> {
        self.encode_to_vec::<Bson>(doc, Format::Bson)
    }

    /// Appends the BSON encoding of `doc` to a caller-owned buffer in write
    /// mode. On error the buffer contents are unspecified.
    ///
    /// # Errors
    ///
    /// [`Error::EncodeType`] when `buf` has been flipped to read mode; it is
    /// left untouched.
    pub fn serialize_bson_into(&self, doc: &Document, buf: &mut Buffer) -> Result<()> {
        self.encode_into::<Bson>(doc, buf)
    }

    /// Serializes into a pooled buffer, returned flipped and ready to read.
    /// Dropping the guard gives the buffer back to the pool.
    pub fn serialize_bson_pooled(&self, doc: &Document) -> Result<Pooled<'_, Buffer>> {
        self.encode_pooled::<Bson>(doc)
    }

    /// Deserializes exactly one BSON document spanning all of `bytes`.
    ///
    /// Binary payloads are always copied; use
    /// [`deserialize_bson_shared`](Self::deserialize_bson_shared) for views.
    pub fn deserialize_bson(&self, bytes: &[u8]) -> Result<Document> {
        let mut doc = Document::new();
        self.decode::<Bson>(bytes, None, &mut doc, Format::Bson)?;
        Ok(doc)
    }

    /// Like [`deserialize_bson`](Self::deserialize_bson), reusing `doc`,
    /// whose previous contents are discarded.
    pub fn deserialize_bson_into(&self, bytes: &[u8], doc: &mut Document) -> Result<()> {
        self.decode::<Bson>(bytes, None, doc, Format::Bson)
    }

    /// Deserializes from shared bytes. With [`BinaryMode::View`], binary
    /// payloads are slices of `bytes` instead of copies.
    pub fn deserialize_bson_shared(&self, bytes: &Bytes) -> Result<Document> {
        self.decode_shared::<Bson>(bytes, Format::Bson)
    }

    /// Serializes `doc` as MessagePack.
    ///
    /// # Errors
    ///
    /// - [`Error::EncodeType`](crate::error::Error::EncodeType) for object
    ///   ids, datetimes, decimals and non-generic binary subtypes.
    /// - [`Error::PoolOverflow`](crate::error::Error::PoolOverflow) when no
    ///   buffer can be acquired.
    pub fn serialize_msgpack(&self, doc: &Document) -> Result<Vec<u8>> {
        self.encode_to_vec::<MsgPack>(doc, Format::MsgPack)
    }

    pub fn serialize_msgpack_into(&self, doc: &Document, buf: &mut Buffer) -> Result<()> {
        self.encode_into::<MsgPack>(doc, buf)
    }

    pub fn serialize_msgpack_pooled(&self, doc: &Document) -> Result<Pooled<'_, Buffer>> {
        self.encode_pooled::<MsgPack>(doc)
    }

    /// Deserializes exactly one MessagePack map spanning all of `bytes`.
    pub fn deserialize_msgpack(&self, bytes: &[u8]) -> Result<Document> {
        let mut doc = Document::new();
        self.decode::<MsgPack>(bytes, None, &mut doc, Format::MsgPack)?;
        Ok(doc)
    }

    pub fn deserialize_msgpack_into(&self, bytes: &[u8], doc: &mut Document) -> Result<()> {
        self.decode::<MsgPack>(bytes, None, doc, Format::MsgPack)
    }

    pub fn deserialize_msgpack_shared(&self, bytes: &Bytes) -> Result<Document> {
        self.decode_shared::<MsgPack>(bytes, Format::MsgPack)
    }

    /// Serializes in the format chosen at runtime.
    pub fn serialize(&self, doc: &Document, format: Format) -> Result<Vec<u8>> {
        match format {
            Format::Bson => self.serialize_bson(doc),
            Format::MsgPack => self.serialize_msgpack(doc),
        }
    }

    pub fn serialize_pooled(&self, doc: &Document, format: Format) -> Result<Pooled<'_, Buffer>> {
        match format {
            Format::Bson => self.serialize_bson_pooled(doc),
            Format::MsgPack => self.serialize_msgpack_pooled(doc),
        }
    }

    pub fn deserialize(&self, bytes: &[u8], format: Format) -> Result<Document> {
        match format {
            Format::Bson => self.deserialize_bson(bytes),
            Format::MsgPack => self.deserialize_msgpack(bytes),
        }
    }

    pub fn deserialize_shared(&self, bytes: &Bytes, format: Format) -> Result<Document> {
        match format {
            Format::Bson => self.deserialize_bson_shared(bytes),
            Format::MsgPack => self.deserialize_msgpack_shared(bytes),
        }
    }
}
