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

//! The document tree exchanged with callers.

mod document;
mod types;

pub use document::{Document, Iter};
pub use types::{subtype, Binary, DateTime, Extension, ObjectId};

use std::fmt;

use bigdecimal::BigDecimal;
use bytes::Bytes;

/// One node of a document tree.
///
/// `Int32` and `Int64` compare by numeric value, so `Int32(7) == Int64(7)`.
/// Comparing and dropping walk the tree with a heap stack, so a decoded
/// document of any depth can be compared and discarded safely.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    String(String),
    Binary(Binary),
    ObjectId(ObjectId),
    DateTime(DateTime),
    /// `BigDecimal` has no signed zero: a decimal128 `-0` decodes as `0`
    /// and re-encodes without its sign bit.
    Decimal(BigDecimal),
    Extension(Extension),
    Array(Vec<Value>),
    Map(Document),
}

/// Discriminant of a [`Value`], used in error messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
    Binary,
    ObjectId,
    DateTime,
    Decimal,
    Extension,
    Array,
    Map,
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Int32 => "int32",
            ValueKind::Int64 => "int64",
            ValueKind::Float32 => "float32",
            ValueKind::Float64 => "float64",
            ValueKind::String => "string",
            ValueKind::Binary => "binary",
            ValueKind::ObjectId => "object id",
            ValueKind::DateTime => "datetime",
            ValueKind::Decimal => "decimal128",
            ValueKind::Extension => "extension",
            ValueKind::Array => "array",
            ValueKind::Map => "map",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int32(_) => ValueKind::Int32,
            Value::Int64(_) => ValueKind::Int64,
            Value::Float32(_) => ValueKind::Float32,
            Value::Float64(_) => ValueKind::Float64,
            Value::String(_) => ValueKind::String,
            Value::Binary(_) => ValueKind::Binary,
            Value::ObjectId(_) => ValueKind::ObjectId,
            Value::DateTime(_) => ValueKind::DateTime,
            Value::Decimal(_) => ValueKind::Decimal,
            Value::Extension(_) => ValueKind::Extension,
            Value::Array(_) => ValueKind::Array,
            Value::Map(_) => ValueKind::Map,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Map(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(v) => Some(*v),
            Value::Int64(v) => i32::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int32(v) => Some(*v as i64),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float32(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&Binary> {
        match self {
            Value::Binary(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_object_id(&self) -> Option<ObjectId> {
        match self {
            Value::ObjectId(oid) => Some(*oid),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<&BigDecimal> {
        match self {
            Value::Decimal(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_extension(&self) -> Option<&Extension> {
        match self {
            Value::Extension(ext) => Some(ext),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Map(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn as_document_mut(&mut self) -> Option<&mut Document> {
        match self {
            Value::Map(doc) => Some(doc),
            _ => None,
        }
    }
}

/// Node pairs still to be compared.
pub(crate) type Pending<'a> = Vec<(&'a Value, &'a Value)>;

impl Value {
    /// Compares everything but the children of two containers, which are
    /// queued on `pending` instead.
    fn eq_shallow<'a>(&'a self, other: &'a Value, pending: &mut Pending<'a>) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Int32(a), Value::Int64(b)) | (Value::Int64(b), Value::Int32(a)) => {
                *a as i64 == *b
            }
            (Value::Float32(a), Value::Float32(b)) => a == b,
            (Value::Float64(a), Value::Float64(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Binary(a), Value::Binary(b)) => a == b,
            (Value::ObjectId(a), Value::ObjectId(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Extension(a), Value::Extension(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                if a.len() != b.len() {
                    return false;
                }
                pending.extend(a.iter().zip(b.iter()));
                true
            }
            (Value::Map(a), Value::Map(b)) => a.pair_entries(b, pending),
            _ => false,
        }
    }
}

/// Drains `pending`, returning false at the first unequal pair.
pub(crate) fn compare_pending(mut pending: Pending<'_>) -> bool {
    while let Some((left, right)) = pending.pop() {
        if !left.eq_shallow(right, &mut pending) {
            return false;
        }
    }
    true
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = Vec::new();
        self.eq_shallow(other, &mut pending) && compare_pending(pending)
    }
}

impl Drop for Value {
    fn drop(&mut self) {
        let mut orphans: Vec<Value> = match self {
            Value::Array(items) if !items.is_empty() => std::mem::take(items),
            Value::Map(doc) if !doc.is_empty() => doc.drain_values().collect(),
            _ => return,
        };
        // Children are emptied before they drop, so no drop below recurses.
        while let Some(mut value) = orphans.pop() {
            match &mut value {
                Value::Array(items) => orphans.append(items),
                Value::Map(doc) => orphans.extend(doc.drain_values()),
                _ => {}
            }
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from!(
    bool => Bool,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    String => String,
    Binary => Binary,
    ObjectId => ObjectId,
    DateTime => DateTime,
    BigDecimal => Decimal,
    Extension => Extension,
    Vec<Value> => Array,
    Document => Map,
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Binary(Binary::new(v))
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Binary(Binary::new(v))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
