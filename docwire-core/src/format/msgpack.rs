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

//! MessagePack wire adapter.
//!
//! Containers carry an entry count up front instead of a byte length, so
//! nothing is patched after the fact. Multi-byte fields are big-endian.
//! Integers are written with the narrowest marker that holds them and read
//! back as `Int32` when they fit, `Int64` otherwise.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::buffer::{Buffer, Reader};
use crate::engine::{
    Bounds, Container, ContainerKind, DecodeContext, Element, Key, WireRead, WireWrite,
};
use crate::error::{Error, Result};
use crate::value::{subtype, Binary, Document, Extension, Value};
use crate::{bail, ensure};

pub const POSITIVE_FIXINT_MAX: u8 = 0x7f;
pub const FIXMAP: u8 = 0x80;
pub const FIXARRAY: u8 = 0x90;
pub const FIXSTR: u8 = 0xa0;
pub const NEGATIVE_FIXINT: u8 = 0xe0;
/// Never used by the format.
pub const RESERVED: u8 = 0xc1;

const FIXMAP_MAX_LEN: usize = 15;
const FIXARRAY_MAX_LEN: usize = 15;
const FIXSTR_MAX_LEN: usize = 31;

/// Markers outside the fix families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[allow(non_camel_case_types)]
#[repr(u8)]
pub enum Marker {
    NIL = 0xc0,
    FALSE = 0xc2,
    TRUE = 0xc3,
    BIN8 = 0xc4,
    BIN16 = 0xc5,
    BIN32 = 0xc6,
    EXT8 = 0xc7,
    EXT16 = 0xc8,
    EXT32 = 0xc9,
    FLOAT32 = 0xca,
    FLOAT64 = 0xcb,
    UINT8 = 0xcc,
    UINT16 = 0xcd,
    UINT32 = 0xce,
    UINT64 = 0xcf,
    INT8 = 0xd0,
    INT16 = 0xd1,
    INT32 = 0xd2,
    INT64 = 0xd3,
    FIXEXT1 = 0xd4,
    FIXEXT2 = 0xd5,
    FIXEXT4 = 0xd6,
    FIXEXT8 = 0xd7,
    FIXEXT16 = 0xd8,
    STR8 = 0xd9,
    STR16 = 0xda,
    STR32 = 0xdb,
    ARRAY16 = 0xdc,
    ARRAY32 = 0xdd,
    MAP16 = 0xde,
    MAP32 = 0xdf,
}

#[cold]
fn unsupported(value: &Value) -> Error {
    Error::encode_type(format!("{} has no MessagePack representation", value.kind()))
}

#[cold]
fn too_long(what: &str, len: usize) -> Error {
    Error::encode_type(format!("{} of length {} exceeds the MessagePack limit", what, len))
}

#[inline(always)]
fn narrow(v: i64) -> Value {
    match i32::try_from(v) {
        Ok(v) => Value::Int32(v),
        Err(_) => Value::Int64(v),
    }
}

/// MessagePack adapter for the frame-stack engine.
pub struct MsgPack;

impl MsgPack {
    pub fn write_int(buf: &mut Buffer, v: i64) {
        if v >= 0 {
            if v <= POSITIVE_FIXINT_MAX as i64 {
                buf.write_u8(v as u8);
            } else if v <= u8::MAX as i64 {
                buf.write_u8(Marker::UINT8.into());
                buf.write_u8(v as u8);
            } else if v <= u16::MAX as i64 {
                buf.write_u8(Marker::UINT16.into());
                buf.write_u16_be(v as u16);
            } else if v <= u32::MAX as i64 {
                buf.write_u8(Marker::UINT32.into());
                buf.write_u32_be(v as u32);
            } else {
                buf.write_u8(Marker::UINT64.into());
                buf.write_u64_be(v as u64);
            }
        } else if v >= -32 {
            buf.write_i8(v as i8);
        } else if v >= i8::MIN as i64 {
            buf.write_u8(Marker::INT8.into());
            buf.write_i8(v as i8);
        } else if v >= i16::MIN as i64 {
            buf.write_u8(Marker::INT16.into());
            buf.write_i16_be(v as i16);
        } else if v >= i32::MIN as i64 {
            buf.write_u8(Marker::INT32.into());
            buf.write_i32_be(v as i32);
        } else {
            buf.write_u8(Marker::INT64.into());
            buf.write_i64_be(v);
        }
    }

    pub fn write_str(buf: &mut Buffer, s: &str) -> Result<()> {
        let len = s.len();
        if len <= FIXSTR_MAX_LEN {
            buf.write_u8(FIXSTR | len as u8);
        } else if len <= u8::MAX as usize {
            buf.write_u8(Marker::STR8.into());
            buf.write_u8(len as u8);
        } else if len <= u16::MAX as usize {
            buf.write_u8(Marker::STR16.into());
            buf.write_u16_be(len as u16);
        } else if len <= u32::MAX as usize {
            buf.write_u8(Marker::STR32.into());
            buf.write_u32_be(len as u32);
        } else {
            return Err(too_long("string", len));
        }
        buf.write_bytes(s.as_bytes());
        Ok(())
    }

    fn write_bin(buf: &mut Buffer, bytes: &[u8]) -> Result<()> {
        let len = bytes.len();
        if len <= u8::MAX as usize {
            buf.write_u8(Marker::BIN8.into());
            buf.write_u8(len as u8);
        } else if len <= u16::MAX as usize {
            buf.write_u8(Marker::BIN16.into());
            buf.write_u16_be(len as u16);
        } else if len <= u32::MAX as usize {
            buf.write_u8(Marker::BIN32.into());
            buf.write_u32_be(len as u32);
        } else {
            return Err(too_long("binary", len));
        }
        buf.write_bytes(bytes);
        Ok(())
    }

    fn write_ext(buf: &mut Buffer, ext: &Extension) -> Result<()> {
        let len = ext.data.len();
        let fixed = match len {
            1 => Some(Marker::FIXEXT1),
            2 => Some(Marker::FIXEXT2),
            4 => Some(Marker::FIXEXT4),
            8 => Some(Marker::FIXEXT8),
            16 => Some(Marker::FIXEXT16),
            _ => None,
        };
        if let Some(marker) = fixed {
            buf.write_u8(marker.into());
        } else if len <= u8::MAX as usize {
            buf.write_u8(Marker::EXT8.into());
            buf.write_u8(len as u8);
        } else if len <= u16::MAX as usize {
            buf.write_u8(Marker::EXT16.into());
            buf.write_u16_be(len as u16);
        } else if len <= u32::MAX as usize {
            buf.write_u8(Marker::EXT32.into());
            buf.write_u32_be(len as u32);
        } else {
            return Err(too_long("extension", len));
        }
        buf.write_i8(ext.kind);
        buf.write_bytes(&ext.data);
        Ok(())
    }

    fn write_header(buf: &mut Buffer, kind: ContainerKind, len: usize) -> Result<()> {
        let (fix, max_fix, m16, m32) = match kind {
            ContainerKind::Map => (FIXMAP, FIXMAP_MAX_LEN, Marker::MAP16, Marker::MAP32),
            ContainerKind::Array => (FIXARRAY, FIXARRAY_MAX_LEN, Marker::ARRAY16, Marker::ARRAY32),
        };
        if len <= max_fix {
            buf.write_u8(fix | len as u8);
        } else if len <= u16::MAX as usize {
            buf.write_u8(m16.into());
            buf.write_u16_be(len as u16);
        } else if len <= u32::MAX as usize {
            buf.write_u8(m32.into());
            buf.write_u32_be(len as u32);
        } else {
            return Err(too_long("container", len));
        }
        Ok(())
    }

    #[inline(always)]
    fn write_key(buf: &mut Buffer, key: Key<'_>) -> Result<()> {
        match key {
            Key::Name(name) => Self::write_str(buf, name),
            Key::Index(_) => Ok(()),
        }
    }

    fn read_str(reader: &mut Reader<'_>, len: usize) -> Result<String> {
        let offset = reader.position();
        let bytes = reader.read_bytes(len)?;
        match std::str::from_utf8(bytes) {
            Ok(s) => Ok(s.to_owned()),
            Err(e) => bail!("invalid UTF-8 at offset {}: {}", offset, e),
        }
    }

    fn read_key(reader: &mut Reader<'_>) -> Result<String> {
        let offset = reader.position();
        let marker = reader.read_u8()?;
        let len = match marker {
            FIXSTR..=0xbf => (marker & 0x1f) as usize,
            _ => match Marker::try_from(marker) {
                Ok(Marker::STR8) => reader.read_u8()? as usize,
                Ok(Marker::STR16) => reader.read_u16_be()? as usize,
                Ok(Marker::STR32) => reader.read_u32_be()? as usize,
                _ => bail!(
                    "map key at offset {} is not a string (marker {:#04x})",
                    offset,
                    marker
                ),
            },
        };
        Self::read_str(reader, len)
    }

    /// Checks a declared entry count against the bytes left; every entry
    /// takes at least one byte per slot.
    #[inline(always)]
    fn check_count(
        reader: &Reader<'_>,
        kind: ContainerKind,
        count: usize,
        offset: usize,
    ) -> Result<()> {
        let min_bytes = match kind {
            ContainerKind::Map => count.saturating_mul(2),
            ContainerKind::Array => count,
        };
        ensure!(
            min_bytes <= reader.remaining(),
            Error::corruption(format!(
                "{} entries declared at offset {} but only {} bytes remain",
                count,
                offset,
                reader.remaining()
            ))
        );
        Ok(())
    }

    #[inline(always)]
    fn open_container(
        reader: &Reader<'_>,
        key: Option<String>,
        kind: ContainerKind,
        count: usize,
        offset: usize,
        end: usize,
    ) -> Result<Element> {
        Self::check_count(reader, kind, count, offset)?;
        Ok(Element::Open {
            key,
            kind,
            bounds: Bounds {
                end,
                remaining: count,
            },
        })
    }

    fn read_ext(
        reader: &mut Reader<'_>,
        len: usize,
        ctx: &DecodeContext<'_>,
    ) -> Result<Extension> {
        let kind = reader.read_i8()?;
        let data = reader.read_bytes(len)?;
        Ok(Extension::new(kind, ctx.payload(data)))
    }
}

impl WireWrite for MsgPack {
    #[inline(always)]
    fn open_root(buf: &mut Buffer, root: &Document) -> Result<usize> {
        Self::write_header(buf, ContainerKind::Map, root.len())?;
        Ok(buf.len())
    }

    #[inline(always)]
    fn open(buf: &mut Buffer, key: Key<'_>, container: Container<'_>) -> Result<usize> {
        Self::write_key(buf, key)?;
        let kind = match container {
            Container::Map(_) => ContainerKind::Map,
            Container::Array(_) => ContainerKind::Array,
        };
        Self::write_header(buf, kind, container.len())?;
        Ok(buf.len())
    }

    fn scalar(buf: &mut Buffer, key: Key<'_>, value: &Value) -> Result<()> {
        Self::write_key(buf, key)?;
        match value {
            Value::Null => buf.write_u8(Marker::NIL.into()),
            Value::Bool(false) => buf.write_u8(Marker::FALSE.into()),
            Value::Bool(true) => buf.write_u8(Marker::TRUE.into()),
            Value::Int32(v) => Self::write_int(buf, *v as i64),
            Value::Int64(v) => Self::write_int(buf, *v),
            Value::Float32(v) => {
                buf.write_u8(Marker::FLOAT32.into());
                buf.write_f32_be(*v);
            }
            Value::Float64(v) => {
                buf.write_u8(Marker::FLOAT64.into());
                buf.write_f64_be(*v);
            }
            Value::String(s) => Self::write_str(buf, s)?,
            Value::Binary(binary) => {
                if binary.subtype != subtype::GENERIC {
                    return Err(Error::encode_type(format!(
                        "binary subtype {:#04x} has no MessagePack representation",
                        binary.subtype
                    )));
                }
                Self::write_bin(buf, binary.as_slice())?;
            }
            Value::Extension(ext) => Self::write_ext(buf, ext)?,
            Value::ObjectId(_)
            | Value::DateTime(_)
            | Value::Decimal(_)
            | Value::Array(_)
            | Value::Map(_) => return Err(unsupported(value)),
        }
        Ok(())
    }

    #[inline(always)]
    fn close(_buf: &mut Buffer, _start: usize) -> Result<()> {
        Ok(())
    }
}

impl WireRead for MsgPack {
    fn open_root(reader: &mut Reader<'_>, ctx: &DecodeContext<'_>) -> Result<Bounds> {
        let size = reader.remaining();
        ensure!(
            size <= ctx.max_document_size,
            Error::capacity(size, ctx.max_document_size)
        );
        let offset = reader.position();
        let marker = reader.read_u8()?;
        let count = match marker {
            FIXMAP..=0x8f => (marker & 0x0f) as usize,
            _ => match Marker::try_from(marker) {
                Ok(Marker::MAP16) => reader.read_u16_be()? as usize,
                Ok(Marker::MAP32) => reader.read_u32_be()? as usize,
                _ => bail!("root must be a map, found marker {:#04x}", marker),
            },
        };
        Self::check_count(reader, ContainerKind::Map, count, offset)?;
        Ok(Bounds {
            end: reader.limit(),
            remaining: count,
        })
    }

    fn next(
        reader: &mut Reader<'_>,
        bounds: &mut Bounds,
        kind: ContainerKind,
        ctx: &DecodeContext<'_>,
    ) -> Result<Element> {
        if bounds.remaining == 0 {
            return Ok(Element::End);
        }
        bounds.remaining -= 1;
        let key = match kind {
            ContainerKind::Map => Some(Self::read_key(reader)?),
            ContainerKind::Array => None,
        };
        let offset = reader.position();
        let marker = reader.read_u8()?;
        let end = bounds.end;
        let value = match marker {
            0x00..=POSITIVE_FIXINT_MAX => Value::Int32(marker as i32),
            FIXMAP..=0x8f => {
                let count = (marker & 0x0f) as usize;
                return Self::open_container(reader, key, ContainerKind::Map, count, offset, end);
            }
            FIXARRAY..=0x9f => {
                let count = (marker & 0x0f) as usize;
                return Self::open_container(reader, key, ContainerKind::Array, count, offset, end);
            }
            FIXSTR..=0xbf => Value::String(Self::read_str(reader, (marker & 0x1f) as usize)?),
            NEGATIVE_FIXINT..=0xff => Value::Int32(marker as i8 as i32),
            _ => {
                let marker = match Marker::try_from(marker) {
                    Ok(m) => m,
                    Err(_) => bail!("reserved marker {:#04x} at offset {}", marker, offset),
                };
                match marker {
                    Marker::NIL => Value::Null,
                    Marker::FALSE => Value::Bool(false),
                    Marker::TRUE => Value::Bool(true),
                    Marker::BIN8 | Marker::BIN16 | Marker::BIN32 => {
                        let len = match marker {
                            Marker::BIN8 => reader.read_u8()? as usize,
                            Marker::BIN16 => reader.read_u16_be()? as usize,
                            _ => reader.read_u32_be()? as usize,
                        };
                        Value::Binary(Binary::new(ctx.payload(reader.read_bytes(len)?)))
                    }
                    Marker::EXT8 => {
                        let len = reader.read_u8()? as usize;
                        Value::Extension(Self::read_ext(reader, len, ctx)?)
                    }
                    Marker::EXT16 => {
                        let len = reader.read_u16_be()? as usize;
                        Value::Extension(Self::read_ext(reader, len, ctx)?)
                    }
                    Marker::EXT32 => {
                        let len = reader.read_u32_be()? as usize;
                        Value::Extension(Self::read_ext(reader, len, ctx)?)
                    }
                    Marker::FIXEXT1 => Value::Extension(Self::read_ext(reader, 1, ctx)?),
                    Marker::FIXEXT2 => Value::Extension(Self::read_ext(reader, 2, ctx)?),
                    Marker::FIXEXT4 => Value::Extension(Self::read_ext(reader, 4, ctx)?),
                    Marker::FIXEXT8 => Value::Extension(Self::read_ext(reader, 8, ctx)?),
                    Marker::FIXEXT16 => Value::Extension(Self::read_ext(reader, 16, ctx)?),
                    Marker::FLOAT32 => Value::Float32(reader.read_f32_be()?),
                    Marker::FLOAT64 => Value::Float64(reader.read_f64_be()?),
                    Marker::UINT8 => Value::Int32(reader.read_u8()? as i32),
                    Marker::UINT16 => Value::Int32(reader.read_u16_be()? as i32),
                    Marker::UINT32 => narrow(reader.read_u32_be()? as i64),
                    Marker::UINT64 => {
                        let v = reader.read_u64_be()?;
                        match i64::try_from(v) {
                            Ok(v) => narrow(v),
                            Err(_) => bail!(
                                "uint64 {} at offset {} does not fit a signed 64-bit integer",
                                v,
                                offset
                            ),
                        }
                    }
                    Marker::INT8 => Value::Int32(reader.read_i8()? as i32),
                    Marker::INT16 => Value::Int32(reader.read_i16_be()? as i32),
                    Marker::INT32 => Value::Int32(reader.read_i32_be()?),
                    Marker::INT64 => narrow(reader.read_i64_be()?),
                    Marker::STR8 => {
                        let len = reader.read_u8()? as usize;
                        Value::String(Self::read_str(reader, len)?)
                    }
                    Marker::STR16 => {
                        let len = reader.read_u16_be()? as usize;
                        Value::String(Self::read_str(reader, len)?)
                    }
                    Marker::STR32 => {
                        let len = reader.read_u32_be()? as usize;
                        Value::String(Self::read_str(reader, len)?)
                    }
                    Marker::ARRAY16 => {
                        let count = reader.read_u16_be()? as usize;
                        return Self::open_container(
                            reader,
                            key,
                            ContainerKind::Array,
                            count,
                            offset,
                            end,
                        );
                    }
                    Marker::ARRAY32 => {
                        let count = reader.read_u32_be()? as usize;
                        return Self::open_container(
                            reader,
                            key,
                            ContainerKind::Array,
                            count,
                            offset,
                            end,
                        );
                    }
                    Marker::MAP16 => {
                        let count = reader.read_u16_be()? as usize;
                        return Self::open_container(reader, key, ContainerKind::Map, count, offset, end);
                    }
                    Marker::MAP32 => {
                        let count = reader.read_u32_be()? as usize;
                        return Self::open_container(reader, key, ContainerKind::Map, count, offset, end);
                    }
                }
            }
        };
        Ok(Element::Scalar(key, value))
    }
}
