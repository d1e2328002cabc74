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

//! Iterative frame-stack traversal shared by every wire format.
//!
//! Neither direction recurses: each open map or array is a frame on an
//! explicit stack, so document depth is bounded by heap, not by the thread
//! stack. A format plugs in through [`WireWrite`] and [`WireRead`], which
//! only deal with one element or container header at a time.

pub(crate) mod reader;
pub(crate) mod writer;

use bytes::Bytes;

use crate::buffer::{Buffer, Reader};
use crate::error::Result;
use crate::value::{Document, Value};

/// How an element is addressed inside its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Key<'a> {
    Name(&'a str),
    Index(usize),
}

/// A container being written.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Container<'a> {
    Map(&'a Document),
    Array(&'a [Value]),
}

impl<'a> Container<'a> {
    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        match self {
            Container::Map(doc) => doc.len(),
            Container::Array(items) => items.len(),
        }
    }

    #[inline(always)]
    fn entry(&self, index: usize) -> Option<(Key<'a>, &'a Value)> {
        match *self {
            Container::Map(doc) => doc.entry(index).map(|(k, v)| (Key::Name(k), v)),
            Container::Array(items) => items.get(index).map(|v| (Key::Index(index), v)),
        }
    }
}

/// Scalar and container-header rules of one wire format, write side.
pub(crate) trait WireWrite {
    /// Opens the root map and returns the offset its length is measured from.
    fn open_root(buf: &mut Buffer, root: &Document) -> Result<usize>;

    /// Writes the element header of a nested container (tag, key and any
    /// size field) and returns the offset its length is measured from.
    fn open(buf: &mut Buffer, key: Key<'_>, container: Container<'_>) -> Result<usize>;

    /// Writes one non-container element.
    fn scalar(buf: &mut Buffer, key: Key<'_>, value: &Value) -> Result<()>;

    /// Finishes the container opened at `start`.
    fn close(buf: &mut Buffer, start: usize) -> Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ContainerKind {
    Map,
    Array,
}

/// Where a container being read stops: a byte offset for length-prefixed
/// formats, an entry count for count-prefixed ones. Formats ignore the field
/// they do not use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Bounds {
    pub(crate) end: usize,
    pub(crate) remaining: usize,
}

/// One step of reading a container.
#[derive(Debug)]
pub(crate) enum Element {
    /// The container is complete.
    End,
    Scalar(Option<String>, Value),
    Open {
        key: Option<String>,
        kind: ContainerKind,
        bounds: Bounds,
    },
}

/// Decode-time options carried through one call.
pub(crate) struct DecodeContext<'s> {
    pub(crate) max_document_size: usize,
    /// Input owner for zero-copy payloads; `None` copies.
    pub(crate) shared: Option<&'s Bytes>,
}

impl DecodeContext<'_> {
    /// Payload bytes as a slice of the shared input, or a copy.
    #[inline(always)]
    pub(crate) fn payload(&self, raw: &[u8]) -> Bytes {
        match self.shared {
            Some(shared) => shared.slice_ref(raw),
            None => Bytes::copy_from_slice(raw),
        }
    }
}

/// Scalar and container-header rules of one wire format, read side.
pub(crate) trait WireRead {
    /// Reads the root header, enforcing the document-size ceiling before
    /// anything else is decoded.
    fn open_root(reader: &mut Reader<'_>, ctx: &DecodeContext<'_>) -> Result<Bounds>;

    /// Reads the next element of the container bounded by `bounds`.
    fn next(
        reader: &mut Reader<'_>,
        bounds: &mut Bounds,
        kind: ContainerKind,
        ctx: &DecodeContext<'_>,
    ) -> Result<Element>;
}
