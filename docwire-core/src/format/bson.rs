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

//! BSON wire adapter.
//!
//! ```text
//! document := int32 total_length | element* | 0x00
//! element  := u8 type | cstring key | payload
//! ```
//!
//! The length covers itself, every element and the terminator. Array
//! elements are keyed `"0"`, `"1"`, ... and those keys are not validated on
//! read. All numbers are little-endian.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::buffer::{Buffer, Reader};
use crate::decimal128::Decimal128;
use crate::engine::{
    Bounds, Container, ContainerKind, DecodeContext, Element, Key, WireRead, WireWrite,
};
use crate::error::{Error, Result};
use crate::scanner;
use crate::util::write_decimal;
use crate::value::{subtype, Binary, DateTime, Document, ObjectId, Value};
use crate::{bail, ensure};

pub const END_OF_DOCUMENT: u8 = 0x00;
/// Length prefix plus terminator of an empty document.
pub const MIN_DOCUMENT_SIZE: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[allow(non_camel_case_types)]
#[repr(u8)]
pub enum ElementType {
    DOUBLE = 0x01,
    STRING = 0x02,
    DOCUMENT = 0x03,
    ARRAY = 0x04,
    BINARY = 0x05,
    OBJECT_ID = 0x07,
    BOOLEAN = 0x08,
    DATETIME = 0x09,
    NULL = 0x0A,
    INT32 = 0x10,
    INT64 = 0x12,
    DECIMAL128 = 0x13,
}

impl ElementType {
    /// Tag for `value`, or [`Error::EncodeType`] if BSON cannot carry it.
    pub fn of(value: &Value) -> Result<ElementType> {
        Ok(match value {
            Value::Null => ElementType::NULL,
            Value::Bool(_) => ElementType::BOOLEAN,
            Value::Int32(_) => ElementType::INT32,
            Value::Int64(_) => ElementType::INT64,
            Value::Float64(_) => ElementType::DOUBLE,
            Value::String(_) => ElementType::STRING,
            Value::Binary(_) => ElementType::BINARY,
            Value::ObjectId(_) => ElementType::OBJECT_ID,
            Value::DateTime(_) => ElementType::DATETIME,
            Value::Decimal(_) => ElementType::DECIMAL128,
            Value::Array(_) => ElementType::ARRAY,
            Value::Map(_) => ElementType::DOCUMENT,
            Value::Float32(_) | Value::Extension(_) => return Err(unsupported(value)),
        })
    }
}

#[cold]
fn unsupported(value: &Value) -> Error {
    Error::encode_type(format!("{} has no BSON representation", value.kind()))
}

#[inline(always)]
fn length_i32(len: usize, what: &str) -> Result<i32> {
    i32::try_from(len)
        .map_err(|_| Error::encode_type(format!("{} of {} bytes exceeds the BSON limit", what, len)))
}

/// BSON adapter for the frame-stack engine.
pub struct Bson;

impl Bson {
    fn write_key(buf: &mut Buffer, key: Key<'_>) -> Result<()> {
        match key {
            Key::Name(name) => {
                ensure!(
                    scanner::find_zero(name.as_bytes(), 0).is_none(),
                    Error::encode_type(format!("key {:?} contains a NUL byte", name))
                );
                buf.write_bytes(name.as_bytes());
            }
            Key::Index(index) => {
                let mut digits = [0u8; 20];
                let len = write_decimal(index, &mut digits);
                buf.write_bytes(&digits[..len]);
            }
        }
        buf.write_u8(END_OF_DOCUMENT);
        Ok(())
    }

    fn write_string(buf: &mut Buffer, s: &str) -> Result<()> {
        buf.write_i32(length_i32(s.len() + 1, "string")?);
        buf.write_bytes(s.as_bytes());
        buf.write_u8(0);
        Ok(())
    }

    fn write_binary(buf: &mut Buffer, binary: &Binary) -> Result<()> {
        let len = binary.len();
        if binary.subtype == subtype::BINARY_OLD {
            buf.write_i32(length_i32(len + 4, "binary")?);
            buf.write_u8(binary.subtype);
            buf.write_i32(length_i32(len, "binary")?);
        } else {
            buf.write_i32(length_i32(len, "binary")?);
            buf.write_u8(binary.subtype);
        }
        buf.write_bytes(binary.as_slice());
        Ok(())
    }

    fn read_str<'a>(bytes: &'a [u8], offset: usize) -> Result<&'a str> {
        std::str::from_utf8(bytes)
            .map_err(|e| Error::format_error(format!("invalid UTF-8 at offset {}: {}", offset, e)))
    }

    fn read_string(reader: &mut Reader<'_>) -> Result<String> {
        let offset = reader.position();
        let len = reader.read_i32()?;
        ensure!(
            len >= 1,
            "string length {} at offset {} is below the minimum of 1",
            len,
            offset
        );
        let bytes = reader.read_bytes(len as usize - 1)?;
        let terminator = reader.read_u8()?;
        ensure!(
            terminator == 0,
            "string at offset {} is not NUL-terminated",
            offset
        );
        Ok(Self::read_str(bytes, offset)?.to_owned())
    }

    fn read_binary(reader: &mut Reader<'_>, ctx: &DecodeContext<'_>) -> Result<Binary> {
        let offset = reader.position();
        let len = reader.read_i32()?;
        ensure!(
            len >= 0,
            "binary length {} at offset {} is negative",
            len,
            offset
        );
        let subtype = reader.read_u8()?;
        let payload = if subtype == subtype::BINARY_OLD {
            ensure!(
                len >= 4,
                Error::corruption(format!(
                    "old binary length {} at offset {} cannot hold its inner length",
                    len, offset
                ))
            );
            let inner = reader.read_i32()?;
            ensure!(
                inner == len - 4,
                Error::corruption(format!(
                    "old binary at offset {} declares inner length {}, expected {}",
                    offset,
                    inner,
                    len - 4
                ))
            );
            reader.read_bytes(inner as usize)?
        } else {
            reader.read_bytes(len as usize)?
        };
        Ok(Binary::with_subtype(subtype, ctx.payload(payload)))
    }
}

impl WireWrite for Bson {
    #[inline(always)]
    fn open_root(buf: &mut Buffer, _root: &Document) -> Result<usize> {
        Ok(buf.reserve_i32())
    }

    #[inline(always)]
    fn open(buf: &mut Buffer, key: Key<'_>, container: Container<'_>) -> Result<usize> {
        let tag = match container {
            Container::Map(_) => ElementType::DOCUMENT,
            Container::Array(_) => ElementType::ARRAY,
        };
        buf.write_u8(tag.into());
        Self::write_key(buf, key)?;
        Ok(buf.reserve_i32())
    }

    fn scalar(buf: &mut Buffer, key: Key<'_>, value: &Value) -> Result<()> {
        let tag = ElementType::of(value)?;
        buf.write_u8(tag.into());
        Self::write_key(buf, key)?;
        match value {
            Value::Null => {}
            Value::Bool(v) => buf.write_bool(*v),
            Value::Int32(v) => buf.write_i32(*v),
            Value::Int64(v) => buf.write_i64(*v),
            Value::Float64(v) => buf.write_f64(*v),
            Value::String(s) => Self::write_string(buf, s)?,
            Value::Binary(binary) => Self::write_binary(buf, binary)?,
            Value::ObjectId(oid) => {
                buf.write_bytes(oid.as_bytes());
            }
            Value::DateTime(dt) => buf.write_i64(dt.timestamp_millis()),
            Value::Decimal(d) => {
                let d = Decimal128::from_bigdecimal(d)?;
                buf.write_u64(d.low());
                buf.write_u64(d.high());
            }
            Value::Float32(_) | Value::Extension(_) | Value::Array(_) | Value::Map(_) => {
                return Err(unsupported(value))
            }
        }
        Ok(())
    }

    #[inline(always)]
    fn close(buf: &mut Buffer, start: usize) -> Result<()> {
        buf.write_u8(END_OF_DOCUMENT);
        let len = length_i32(buf.len() - start, "document")?;
        buf.put_i32_at(start, len);
        Ok(())
    }
}

impl WireRead for Bson {
    fn open_root(reader: &mut Reader<'_>, ctx: &DecodeContext<'_>) -> Result<Bounds> {
        let start = reader.position();
        let available = reader.remaining();
        let len = reader.read_i32()?;
        ensure!(
            len >= MIN_DOCUMENT_SIZE as i32,
            Error::corruption(format!(
                "document length {} is below the minimum of {}",
                len, MIN_DOCUMENT_SIZE
            ))
        );
        let len = len as usize;
        ensure!(
            len <= ctx.max_document_size,
            Error::capacity(len, ctx.max_document_size)
        );
        ensure!(len <= available, Error::truncated(len, available));
        Ok(Bounds {
            end: start + len,
            remaining: 0,
        })
    }

    fn next(
        reader: &mut Reader<'_>,
        bounds: &mut Bounds,
        kind: ContainerKind,
        ctx: &DecodeContext<'_>,
    ) -> Result<Element> {
        let offset = reader.position();
        ensure!(
            offset < bounds.end,
            Error::corruption(format!(
                "document ending at offset {} has no terminator",
                bounds.end
            ))
        );
        let tag = reader.read_u8()?;
        if tag == END_OF_DOCUMENT {
            ensure!(
                offset + 1 == bounds.end,
                Error::corruption(format!(
                    "terminator at offset {} but the declared end is offset {}",
                    offset, bounds.end
                ))
            );
            return Ok(Element::End);
        }
        let element_type = match ElementType::try_from(tag) {
            Ok(t) => t,
            Err(_) => bail!("unknown element type {:#04x} at offset {}", tag, offset),
        };
        let raw_key = reader.read_cstr()?;
        let key = match kind {
            ContainerKind::Map => Some(Self::read_str(raw_key, offset + 1)?.to_owned()),
            ContainerKind::Array => None,
        };
        let value = match element_type {
            ElementType::DOCUMENT | ElementType::ARRAY => {
                let start = reader.position();
                let len = reader.read_i32()?;
                ensure!(
                    len >= MIN_DOCUMENT_SIZE as i32,
                    Error::corruption(format!(
                        "nested length {} at offset {} is below the minimum of {}",
                        len, start, MIN_DOCUMENT_SIZE
                    ))
                );
                let end = start + len as usize;
                ensure!(
                    end <= bounds.end,
                    Error::corruption(format!(
                        "nested length {} at offset {} exceeds the parent bound at offset {}",
                        len, start, bounds.end
                    ))
                );
                let kind = if element_type == ElementType::DOCUMENT {
                    ContainerKind::Map
                } else {
                    ContainerKind::Array
                };
                return Ok(Element::Open {
                    key,
                    kind,
                    bounds: Bounds { end, remaining: 0 },
                });
            }
            ElementType::DOUBLE => Value::Float64(reader.read_f64()?),
            ElementType::STRING => Value::String(Self::read_string(reader)?),
            ElementType::BINARY => Value::Binary(Self::read_binary(reader, ctx)?),
            ElementType::OBJECT_ID => {
                let mut bytes = [0u8; ObjectId::LEN];
                bytes.copy_from_slice(reader.read_bytes(ObjectId::LEN)?);
                Value::ObjectId(ObjectId::from_bytes(bytes))
            }
            ElementType::BOOLEAN => match reader.read_u8()? {
                0 => Value::Bool(false),
                1 => Value::Bool(true),
                other => bail!(
                    "invalid boolean byte {:#04x} at offset {}",
                    other,
                    reader.position() - 1
                ),
            },
            ElementType::DATETIME => Value::DateTime(DateTime::from_millis(reader.read_i64()?)),
            ElementType::NULL => Value::Null,
            ElementType::INT32 => Value::Int32(reader.read_i32()?),
            ElementType::INT64 => Value::Int64(reader.read_i64()?),
            ElementType::DECIMAL128 => {
                let low = reader.read_u64()?;
                let high = reader.read_u64()?;
                Value::Decimal(Decimal128::from_words(low, high).to_bigdecimal()?)
            }
        };
        Ok(Element::Scalar(key, value))
    }
}
