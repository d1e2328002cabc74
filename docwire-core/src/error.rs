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

//! # PERFORMANCE CRITICAL MODULE
//!
//! Error constructors are reachable from every bounds check in the buffer
//! reader and from every scalar dispatch in the wire adapters. They are
//! marked `#[cold]` so that LLVM lays out the success path as the fall-through
//! branch; changing those attributes shows up directly in decode throughput.

use std::borrow::Cow;

use thiserror::Error;

/// Set `DOCWIRE_PANIC_ON_ERROR=1` at compile time to panic where an error is created.
pub const PANIC_ON_ERROR: bool = option_env!("DOCWIRE_PANIC_ON_ERROR").is_some();

/// Check if `DOCWIRE_PANIC_ON_ERROR` was set at compile time.
#[inline(always)]
pub const fn should_panic_on_error() -> bool {
    PANIC_ON_ERROR
}

/// Error type for docwire encode, decode and pool operations.
///
/// # IMPORTANT: Always Use Static Constructor Functions
///
/// Do not construct variants with enum syntax. Use [`Error::format_error`],
/// [`Error::corruption`], [`Error::truncated`], [`Error::capacity`],
/// [`Error::pool_overflow`] and [`Error::encode_type`] instead, so that the
/// `DOCWIRE_PANIC_ON_ERROR` debug switch sees every error at its origin.
///
/// ```rust
/// use docwire_core::error::Error;
///
/// let err = Error::format_error("unknown element type 0x42 at offset 17");
/// let err = Error::truncated(8, 3);
/// ```
///
/// ## Debug Mode: DOCWIRE_PANIC_ON_ERROR
///
/// ```bash
/// RUST_BACKTRACE=1 DOCWIRE_PANIC_ON_ERROR=1 cargo test
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Unknown type tag or malformed literal.
    ///
    /// Do not construct this variant directly; use [`Error::format_error`] instead.
    #[error("format error: {0}")]
    Format(Cow<'static, str>),

    /// A declared length contradicts the bytes around it.
    ///
    /// Do not construct this variant directly; use [`Error::corruption`] instead.
    #[error("corrupted document: {0}")]
    Corruption(Cow<'static, str>),

    /// Fewer bytes are available than a declared length requires.
    ///
    /// Do not construct this variant directly; use [`Error::truncated`] instead.
    #[error("truncated input: expected {expected} bytes, {available} available")]
    Truncated { expected: usize, available: usize },

    /// Document exceeds the configured decode-time size ceiling.
    ///
    /// Do not construct this variant directly; use [`Error::capacity`] instead.
    #[error("document of {size} bytes exceeds the maximum of {max} bytes")]
    Capacity { size: usize, max: usize },

    /// A fail-fast pool (or a blocking pool past its timeout) is at its ceiling.
    ///
    /// Do not construct this variant directly; use [`Error::pool_overflow`] instead.
    #[error("pool exhausted: all {ceiling} items are checked out")]
    PoolOverflow { ceiling: usize },

    /// A value cannot be represented in the target wire format.
    ///
    /// Do not construct this variant directly; use [`Error::encode_type`] instead.
    #[error("cannot encode: {0}")]
    EncodeType(Cow<'static, str>),

    /// I/O failure in a stream variant, other than a short read.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`enum@Error`], used to decide between retry,
/// drop and escalate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Format,
    Corruption,
    Truncated,
    Capacity,
    PoolOverflow,
    EncodeType,
    Io,
}

impl Error {
    /// Creates a new [`Error::Format`].
    ///
    /// If `DOCWIRE_PANIC_ON_ERROR` is set, this panics with the error message.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn format_error<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::Format(s.into());
        if PANIC_ON_ERROR {
            panic!("DOCWIRE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::Corruption`].
    ///
    /// If `DOCWIRE_PANIC_ON_ERROR` is set, this panics with the error message.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn corruption<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::Corruption(s.into());
        if PANIC_ON_ERROR {
            panic!("DOCWIRE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::Truncated`] from the byte count a read needed
    /// and the byte count left in its bound.
    ///
    /// ```
    /// use docwire_core::error::Error;
    ///
    /// let err = Error::truncated(4, 1);
    /// assert_eq!(err.to_string(), "truncated input: expected 4 bytes, 1 available");
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn truncated(expected: usize, available: usize) -> Self {
        let err = Error::Truncated {
            expected,
            available,
        };
        if PANIC_ON_ERROR {
            panic!("DOCWIRE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::Capacity`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn capacity(size: usize, max: usize) -> Self {
        let err = Error::Capacity { size, max };
        if PANIC_ON_ERROR {
            panic!("DOCWIRE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::PoolOverflow`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn pool_overflow(ceiling: usize) -> Self {
        let err = Error::PoolOverflow { ceiling };
        if PANIC_ON_ERROR {
            panic!("DOCWIRE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::EncodeType`].
    ///
    /// ```
    /// use docwire_core::error::Error;
    ///
    /// let err = Error::encode_type(format!("{} has no BSON representation", "float32"));
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn encode_type<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::EncodeType(s.into());
        if PANIC_ON_ERROR {
            panic!("DOCWIRE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Format(_) => ErrorKind::Format,
            Error::Corruption(_) => ErrorKind::Corruption,
            Error::Truncated { .. } => ErrorKind::Truncated,
            Error::Capacity { .. } => ErrorKind::Capacity,
            Error::PoolOverflow { .. } => ErrorKind::PoolOverflow,
            Error::EncodeType(_) => ErrorKind::EncodeType,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// Only pool overflow leaves nothing behind that a retry would trip over.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::PoolOverflow { .. })
    }
}

/// Result type alias for docwire operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Ensures a condition is true; otherwise returns the given [`enum@Error`].
///
/// ```
/// use docwire_core::ensure;
/// use docwire_core::error::Error;
///
/// fn check_len(n: i32) -> Result<(), Error> {
///     ensure!(n >= 5, Error::corruption(format!("length {} below minimum", n)));
///     Ok(())
/// }
/// assert!(check_len(4).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::error::Error::format_error(format!($fmt, $($arg)*)));
        }
    };
}

/// Returns early with an [`Error::Format`].
///
/// ```
/// use docwire_core::bail;
/// use docwire_core::error::Error;
///
/// fn reject(tag: u8) -> Result<(), Error> {
///     bail!("reserved tag {:#04x}", tag);
/// }
/// assert!(reject(0xc1).is_err());
/// ```
#[macro_export]
macro_rules! bail {
    ($err:expr) => {
        return Err($crate::error::Error::format_error($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::error::Error::format_error(format!($fmt, $($arg)*)))
    };
}
