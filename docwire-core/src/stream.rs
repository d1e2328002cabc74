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

//! Length-framed transport over `std::io`.
//!
//! Every frame starts with a 4-byte little-endian length. A BSON document
//! already begins with its own total length, so its frame is the document
//! itself. A MessagePack frame is a `u32` payload length followed by the
//! payload. The length is checked against the size ceiling before anything
//! is allocated, and a stream that ends early is reported as
//! [`Error::Truncated`].

use std::io::{self, Read, Write};

use bytes::Bytes;
use tracing::trace;

use crate::codec::Codec;
use crate::config::BinaryMode;
use crate::ensure;
use crate::error::{Error, Result};
use crate::format::bson::MIN_DOCUMENT_SIZE;
use crate::format::Format;
use crate::pool::OverflowPolicy;
use crate::value::Document;

pub const FRAME_HEADER_SIZE: usize = 4;

/// Fills `out` completely. `already` is the number of frame bytes consumed
/// before `out`, so a short read reports the whole frame's shortfall.
fn read_full<R: Read>(input: &mut R, out: &mut [u8], frame_len: usize, already: usize) -> Result<()> {
    let mut filled = 0;
    while filled < out.len() {
        match input.read(&mut out[filled..]) {
            Ok(0) => return Err(Error::truncated(frame_len, already + filled)),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::from(e)),
        }
    }
    Ok(())
}

impl<P: OverflowPolicy> Codec<P> {
    /// Writes one framed document and returns the number of bytes written.
    pub fn write_to<W: Write>(&self, doc: &Document, format: Format, out: &mut W) -> Result<usize> {
        let buf = self.serialize_pooled(doc, format)?;
        let payload = buf.as_slice();
        let written = match format {
            Format::Bson => {
                out.write_all(payload)?;
                payload.len()
            }
            Format::MsgPack => {
                let len = u32::try_from(payload.len()).map_err(|_| {
                    Error::encode_type(format!(
                        "frame of {} bytes does not fit a 4-byte header",
                        payload.len()
                    ))
                })?;
                out.write_all(&len.to_le_bytes())?;
                out.write_all(payload)?;
                FRAME_HEADER_SIZE + payload.len()
            }
        };
        trace!(%format, bytes = written, "wrote frame");
        Ok(written)
    }

    /// Reads exactly one framed document.
    ///
    /// With [`BinaryMode::View`] the frame is read into a fresh allocation
    /// that binary payloads then share; otherwise a pooled scratch buffer
    /// is used and payloads are copied out of it.
    pub fn read_from<R: Read>(&self, input: &mut R, format: Format) -> Result<Document> {
        let mut header = [0u8; FRAME_HEADER_SIZE];
        read_full(input, &mut header, FRAME_HEADER_SIZE, 0)?;
        let declared = u32::from_le_bytes(header) as usize;
        let (frame_len, body_len, keep_header) = match format {
            Format::Bson => {
                ensure!(
                    declared >= MIN_DOCUMENT_SIZE && declared <= i32::MAX as usize,
                    Error::corruption(format!("invalid document length {} in frame header", declared))
                );
                (declared, declared - FRAME_HEADER_SIZE, true)
            }
            Format::MsgPack => (FRAME_HEADER_SIZE + declared, declared, false),
        };
        let max = self.config().get_max_document_size();
        let payload_len = if keep_header { frame_len } else { body_len };
        ensure!(payload_len <= max, Error::capacity(payload_len, max));

        let fill = |dst: &mut Vec<u8>, input: &mut R| -> Result<()> {
            if keep_header {
                dst.extend_from_slice(&header);
            }
            let start = dst.len();
            dst.resize(start + body_len, 0);
            read_full(input, &mut dst[start..], frame_len, FRAME_HEADER_SIZE)
        };

        let doc = match self.config().get_binary_mode() {
            BinaryMode::View => {
                let mut owned = Vec::with_capacity(payload_len);
                fill(&mut owned, input)?;
                self.deserialize_shared(&Bytes::from(owned), format)?
            }
            BinaryMode::Owned => {
                let mut scratch = self.scratch().checkout();
                fill(&mut scratch, input)?;
                self.deserialize(&scratch, format)?
            }
        };
        trace!(%format, bytes = frame_len, "read frame");
        Ok(doc)
    }

    pub fn write_bson_to<W: Write>(&self, doc: &Document, out: &mut W) -> Result<usize> {
        self.write_to(doc, Format::Bson, out)
    }

    pub fn read_bson_from<R: Read>(&self, input: &mut R) -> Result<Document> {
        self.read_from(input, Format::Bson)
    }

    pub fn write_msgpack_to<W: Write>(&self, doc: &Document, out: &mut W) -> Result<usize> {
        self.write_to(doc, Format::MsgPack, out)
    }

    pub fn read_msgpack_from<R: Read>(&self, input: &mut R) -> Result<Document> {
        self.read_from(input, Format::MsgPack)
    }
}
