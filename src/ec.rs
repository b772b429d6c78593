// SPDX-FileCopyrightText: 2024 Michael Spiegel
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reed–Solomon error-correction encoding over `GF(2⁸)`.
//!
//! Elements are bytes, reduced modulo the primitive polynomial `0x11D`
//! (`x⁸ + x⁴ + x³ + x² + 1`). Multiplication and inverse are table lookups
//! rather than polynomial long division, per the redesign from an
//! arbitrary-precision polynomial ring to precomputed exponent/logarithm
//! tables of size 256.

use crate::types::{EcLevel, QrResult, Version, symbol_attributes};

const PRIMITIVE_POLY: u32 = 0x11D;

const fn build_tables() -> ([u8; 256], [u8; 256]) {
    let mut exp = [0u8; 256];
    let mut log = [0u8; 256];
    let mut x: u32 = 1;
    let mut i = 0;
    while i < 255 {
        exp[i] = x as u8;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIMITIVE_POLY;
        }
        i += 1;
    }
    exp[255] = exp[0];
    (exp, log)
}

const TABLES: ([u8; 256], [u8; 256]) = build_tables();
const EXP_TABLE: [u8; 256] = TABLES.0;
const LOG_TABLE: [u8; 256] = TABLES.1;

/// `α^exponent`, reduced mod 255 (the multiplicative order of `GF(2⁸)*`).
#[must_use]
pub const fn gf_exp(exponent: u8) -> u8 {
    EXP_TABLE[exponent as usize % 255]
}

/// `GF(2⁸)` multiplication via the exp/log tables.
#[must_use]
pub const fn gf_mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let sum = LOG_TABLE[a as usize] as usize + LOG_TABLE[b as usize] as usize;
    EXP_TABLE[sum % 255]
}

/// `GF(2⁸)` multiplicative inverse.
///
/// # Panics
///
/// Panics if `a == 0`: division/inverse of zero is undefined and never
/// reachable from valid Reed–Solomon inputs.
#[must_use]
pub const fn gf_inv(a: u8) -> u8 {
    assert!(a != 0, "GF(2^8) inverse of zero is undefined");
    let log_a = LOG_TABLE[a as usize] as usize;
    EXP_TABLE[(255 - log_a) % 255]
}

/// `GF(2⁸)` division `a / b`.
///
/// # Panics
///
/// Panics if `b == 0`.
#[must_use]
pub const fn gf_div(a: u8, b: u8) -> u8 {
    if a == 0 { 0 } else { gf_mul(a, gf_inv(b)) }
}

/// The Reed–Solomon generator polynomial for the given EC codeword count,
/// leading coefficient first, as `α`-exponents per the reference tables.
fn generator_exponents(ec_codeword_count: usize) -> &'static [u8] {
    match ec_codeword_count {
        2 => &[0, 25, 1],
        5 => &[0, 113, 164, 166, 119, 10],
        6 => &[0, 166, 0, 134, 5, 176, 15],
        8 => &[0, 175, 238, 208, 249, 215, 252, 196, 28],
        10 => &[0, 251, 67, 46, 61, 118, 70, 64, 94, 32, 45],
        14 => &[
            0, 199, 249, 155, 48, 190, 124, 218, 137, 216, 87, 207, 59, 22, 91,
        ],
        _ => unreachable!("no generator polynomial tabulated for {ec_codeword_count} EC codewords"),
    }
}

/// The Reed–Solomon generator polynomial, as `GF(2⁸)` coefficients.
#[must_use]
pub fn generator_polynomial(ec_codeword_count: usize) -> Vec<u8> {
    generator_exponents(ec_codeword_count)
        .iter()
        .map(|&e| gf_exp(e))
        .collect()
}

/// Systematic Reed–Solomon encoding: treats `data` as the high-order
/// coefficients of a polynomial, computes the remainder of
/// `data(x)·x^{ec_codeword_count} mod generator(x)` by long division in
/// `GF(2⁸)`, and returns that remainder as the EC codewords.
#[must_use]
pub fn rs_encode(data: &[u8], ec_codeword_count: usize) -> Vec<u8> {
    let generator = generator_polynomial(ec_codeword_count);
    let mut message = data.to_vec();
    message.extend(std::iter::repeat_n(0u8, ec_codeword_count));

    for i in 0..data.len() {
        let coefficient = message[i];
        if coefficient != 0 {
            for (j, &g) in generator.iter().enumerate() {
                message[i + j] ^= gf_mul(g, coefficient);
            }
        }
    }

    message.split_off(data.len())
}

/// Computes the error-correction codewords for `data_codewords` under
/// `(version, ec_level)`.
///
/// # Errors
///
/// Returns [`crate::types::QrError::InvalidPair`] if `(version, ec_level)`
/// is not one of the eight legal combinations.
pub fn error_correction_codewords(
    data_codewords: &[u8],
    version: Version,
    ec_level: EcLevel,
) -> QrResult<Vec<u8>> {
    let attrs = symbol_attributes(version, ec_level)?;
    Ok(rs_encode(data_codewords, attrs.ec_codeword_count))
}


#[cfg(test)]
mod rs_tests {
    use super::*;

    /// JIS X0510 Annex I.3: M2/L data codewords `40 18 AC C3 00` produce EC
    /// codewords `86 0D 22 AE 30`.
    #[test]
    fn test_annex_i_rs_encode() {
        let data = [0x40, 0x18, 0xAC, 0xC3, 0x00];
        let ec = rs_encode(&data, 5);
        assert_eq!(ec, vec![0x86, 0x0D, 0x22, 0xAE, 0x30]);
    }

    #[test]
    fn test_error_correction_codewords_length() {
        let data = [0; 5];
        let ec = error_correction_codewords(&data, Version::M2, EcLevel::L).unwrap();
        assert_eq!(ec.len(), 5);
    }
}
