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

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use chrono::{TimeZone, Utc};

use crate::error::Error;

/// BSON binary subtypes.
pub mod subtype {
    pub const GENERIC: u8 = 0x00;
    pub const FUNCTION: u8 = 0x01;
    /// Deprecated layout that repeats the payload length inside the payload.
    pub const BINARY_OLD: u8 = 0x02;
    pub const UUID: u8 = 0x04;
    pub const MD5: u8 = 0x05;
    pub const USER_DEFINED: u8 = 0x80;
}

/// Opaque byte payload tagged with a subtype.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Binary {
    pub subtype: u8,
    pub bytes: Bytes,
}

impl Binary {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Binary {
            subtype: subtype::GENERIC,
            bytes: bytes.into(),
        }
    }

    pub fn with_subtype(subtype: u8, bytes: impl Into<Bytes>) -> Self {
        Binary {
            subtype,
            bytes: bytes.into(),
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// MessagePack extension: an application-defined type byte plus raw payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Extension {
    pub kind: i8,
    pub data: Bytes,
}

impl Extension {
    pub fn new(kind: i8, data: impl Into<Bytes>) -> Self {
        Extension {
            kind,
            data: data.into(),
        }
    }
}

/// 12-byte object identifier, rendered as 24 lowercase hex digits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    pub const LEN: usize = 12;

    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        ObjectId(bytes)
    }

    pub const fn bytes(&self) -> [u8; 12] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn parse_str(s: &str) -> Result<Self, Error> {
        let mut bytes = [0u8; 12];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| Error::format_error(format!("invalid object id {:?}: {}", s, e)))?;
        Ok(ObjectId(bytes))
    }
}

impl From<[u8; 12]> for ObjectId {
    fn from(bytes: [u8; 12]) -> Self {
        ObjectId(bytes)
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

/// UTC timestamp with millisecond precision, stored as milliseconds since
/// the Unix epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct DateTime(i64);

impl DateTime {
    pub const fn from_millis(millis: i64) -> Self {
        DateTime(millis)
    }

    pub const fn timestamp_millis(&self) -> i64 {
        self.0
    }

    pub fn now() -> Self {
        Self::from_chrono(&Utc::now())
    }

    /// `None` when the instant is outside chrono's representable range.
    pub fn to_chrono(&self) -> Option<chrono::DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.0).single()
    }

    pub fn from_chrono<Tz: TimeZone>(dt: &chrono::DateTime<Tz>) -> Self {
        DateTime(dt.timestamp_millis())
    }
}

impl<Tz: TimeZone> From<chrono::DateTime<Tz>> for DateTime {
    fn from(dt: chrono::DateTime<Tz>) -> Self {
        Self::from_chrono(&dt)
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_chrono() {
            Some(dt) => write!(f, "{}", dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
            None => write!(f, "{}ms", self.0),
        }
    }
}
