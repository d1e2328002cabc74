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

//! IEEE 754-2008 decimal128 in the binary integer (BID) encoding.
//!
//! Layout of the high word, most significant bit first:
//!
//! ```text
//! small form: sign(1) | exponent(14) | coefficient bits 112..64 (49)
//! large form: sign(1) | 11 | exponent(14) | coefficient bits 110..64 (47)
//! special:    sign(1) | 11110 = infinity, 11111 = NaN
//! ```
//!
//! The low word carries coefficient bits 63..0. Exponents are stored biased
//! by [`EXPONENT_BIAS`]. A coefficient above 10^34 - 1 is not canonical and
//! decodes as zero.

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use num_traits::{ToPrimitive, Zero};

use crate::error::{Error, Result};

pub const EXPONENT_BIAS: i32 = 6176;
pub const MIN_EXPONENT: i32 = -6176;
pub const MAX_EXPONENT: i32 = 6111;
pub const MAX_DIGITS: u32 = 34;

const SIGN_BIT: u64 = 1 << 63;
const EXPONENT_MASK: u64 = 0x3fff;
const SMALL_EXPONENT_SHIFT: u32 = 49;
const LARGE_EXPONENT_SHIFT: u32 = 47;
const SMALL_COEFFICIENT_HIGH_MASK: u64 = (1 << 49) - 1;
const LARGE_COEFFICIENT_HIGH_MASK: u64 = (1 << 47) - 1;
const LARGE_FORM: u64 = 0b11 << 61;
const INFINITY_BITS: u64 = 0b11110;
const NAN_BITS: u64 = 0b11111;
/// 10^34 - 1, the largest canonical coefficient.
const MAX_COEFFICIENT: u128 = 9_999_999_999_999_999_999_999_999_999_999_999;

/// Raw 128-bit decimal as its two little-endian wire words.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Decimal128 {
    low: u64,
    high: u64,
}

impl Decimal128 {
    pub const fn from_words(low: u64, high: u64) -> Self {
        Decimal128 { low, high }
    }

    pub const fn low(&self) -> u64 {
        self.low
    }

    pub const fn high(&self) -> u64 {
        self.high
    }

    pub fn from_le_bytes(bytes: [u8; 16]) -> Self {
        let mut low = [0u8; 8];
        let mut high = [0u8; 8];
        low.copy_from_slice(&bytes[..8]);
        high.copy_from_slice(&bytes[8..]);
        Decimal128 {
            low: u64::from_le_bytes(low),
            high: u64::from_le_bytes(high),
        }
    }

    pub fn to_le_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[..8].copy_from_slice(&self.low.to_le_bytes());
        out[8..].copy_from_slice(&self.high.to_le_bytes());
        out
    }

    #[inline(always)]
    fn combination(&self) -> u64 {
        (self.high >> 58) & 0x1f
    }

    pub fn is_nan(&self) -> bool {
        self.combination() == NAN_BITS
    }

    pub fn is_infinite(&self) -> bool {
        self.combination() == INFINITY_BITS
    }

    /// Encodes `value` exactly.
    ///
    /// Fails with [`Error::EncodeType`] when the exponent is outside
    /// `[MIN_EXPONENT, MAX_EXPONENT]` or the coefficient needs more than
    /// [`MAX_DIGITS`] digits. Values are never rounded or clamped.
    pub fn from_bigdecimal(value: &BigDecimal) -> Result<Self> {
        let (digits, scale) = value.as_bigint_and_exponent();
        let exponent = -scale;
        if exponent < MIN_EXPONENT as i64 || exponent > MAX_EXPONENT as i64 {
            return Err(Error::encode_type(format!(
                "decimal128 exponent {} outside [{}, {}]",
                exponent, MIN_EXPONENT, MAX_EXPONENT
            )));
        }
        let negative = digits.sign() == Sign::Minus;
        let coefficient = match digits.magnitude().to_u128() {
            Some(c) if c <= MAX_COEFFICIENT => c,
            _ => {
                return Err(Error::encode_type(format!(
                    "decimal128 coefficient of {} exceeds {} digits",
                    value, MAX_DIGITS
                )))
            }
        };
        let biased = (exponent + EXPONENT_BIAS as i64) as u64;
        let mut high = (biased << SMALL_EXPONENT_SHIFT)
            | ((coefficient >> 64) as u64 & SMALL_COEFFICIENT_HIGH_MASK);
        if negative {
            high |= SIGN_BIT;
        }
        Ok(Decimal128 {
            low: coefficient as u64,
            high,
        })
    }

    /// Decodes to an exact decimal. NaN and infinity have no decimal form
    /// and are reported as [`Error::Format`].
    ///
    /// `BigDecimal` has no signed zero, so the sign of `-0` (at any exponent)
    /// is lost: it decodes as zero and re-encodes with the sign bit clear.
    pub fn to_bigdecimal(&self) -> Result<BigDecimal> {
        if self.is_nan() {
            return Err(Error::format_error("decimal128 NaN is not supported"));
        }
        if self.is_infinite() {
            return Err(Error::format_error("decimal128 infinity is not supported"));
        }
        let (biased, coefficient) = if self.high & LARGE_FORM == LARGE_FORM {
            let biased = (self.high >> LARGE_EXPONENT_SHIFT) & EXPONENT_MASK;
            let high_bits = (0b100u64 << 47) | (self.high & LARGE_COEFFICIENT_HIGH_MASK);
            (biased, ((high_bits as u128) << 64) | self.low as u128)
        } else {
            let biased = (self.high >> SMALL_EXPONENT_SHIFT) & EXPONENT_MASK;
            let high_bits = self.high & SMALL_COEFFICIENT_HIGH_MASK;
            (biased, ((high_bits as u128) << 64) | self.low as u128)
        };
        let exponent = biased as i64 - EXPONENT_BIAS as i64;
        let magnitude = if coefficient > MAX_COEFFICIENT {
            BigInt::zero()
        } else {
            BigInt::from(coefficient)
        };
        let digits = if self.high & SIGN_BIT != 0 {
            -magnitude
        } else {
            magnitude
        };
        Ok(BigDecimal::new(digits, -exponent))
    }
}
