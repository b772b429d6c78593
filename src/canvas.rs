// SPDX-FileCopyrightText: 2014 kennytm
// SPDX-FileCopyrightText: 2018 Ethan Pailes
// SPDX-FileCopyrightText: 2023 Nakanishi
// SPDX-FileCopyrightText: 2024 Michael Spiegel
// SPDX-FileCopyrightText: 2024 Shun Sakai
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Matrix assembly: function patterns, zig-zag codeword placement, mask
//! selection, and format-information encoding.
//!
//! `Canvas` is the mutable builder used while assembling a symbol;
//! [`Matrix`] is the frozen, indexable value returned to callers.

use core::ops::Index;

use crate::cast::As;
use crate::types::{Color, EcLevel, Mask, QrResult, Version, symbol_number};

/// Whether `(row, col)` is part of the function pattern or format-info
/// reservation, and therefore never a data-codeword or maskable cell.
///
/// Covers the full timing row/column (`row == 0 || col == 0`) and the
/// top-left 9×9 finder/separator/format-information block.
#[must_use]
pub const fn is_functional(row: usize, col: usize) -> bool {
    row == 0 || col == 0 || (row <= 8 && col <= 8)
}

/// A frozen `side × side` grid of modules.
#[derive(Clone, Debug)]
pub struct Matrix {
    side: usize,
    cells: Vec<Color>,
}

impl Matrix {
    /// The number of modules on each side.
    #[must_use]
    #[inline]
    pub const fn side(&self) -> usize {
        self.side
    }

    /// The color of the module at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is out of bounds.
    #[must_use]
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Color {
        self.cells[row * self.side + col]
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = Color;

    /// Indexes by `(row, col)`.
    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        &self.cells[row * self.side + col]
    }
}

/// The mutable builder used to assemble a symbol one stage at a time.
#[derive(Clone, Debug)]
struct Canvas {
    side: usize,
    cells: Vec<Color>,
}

impl Canvas {
    fn new(version: Version) -> Self {
        let side = version.side();
        Self { side, cells: vec![Color::Light; side * side] }
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> Color {
        self.cells[row * self.side + col]
    }

    #[inline]
    fn set(&mut self, row: usize, col: usize, color: Color) {
        self.cells[row * self.side + col] = color;
    }

    /// Draws the timing patterns and the 7×7 finder pattern.
    ///
    /// Timing: every even-indexed cell of row 0 and column 0 is dark.
    /// Finder: a dark 7×7 square, a light 5×5 ring inside it, a dark 3×3
    /// center.
    fn draw_all_functional_patterns(&mut self) {
        let mut i = 0;
        while i < self.side {
            self.set(i, 0, Color::Dark);
            self.set(0, i, Color::Dark);
            i += 2;
        }
        for row in 0..7 {
            for col in 0..7 {
                self.set(row, col, Color::Dark);
            }
        }
        for row in 1..6 {
            for col in 1..6 {
                self.set(row, col, Color::Light);
            }
        }
        for row in 2..5 {
            for col in 2..5 {
                self.set(row, col, Color::Dark);
            }
        }
    }

    /// Places `bits` into the data region in zig-zag order: two-column
    /// stripes from the right edge, walking vertically and reversing
    /// direction each stripe, skipping rows 0–8 while the stripe's right
    /// column is itself ≤ 8 (i.e. it would cross the finder/format block).
    ///
    /// # Panics
    ///
    /// Panics (debug only) if `bits.len()` does not equal the data region's
    /// cell count, `(side−1)² − 64`.
    fn draw_data(&mut self, bits: &[bool]) {
        debug_assert_eq!(bits.len(), (self.side - 1) * (self.side - 1) - 64);

        let mut it = bits.iter().copied();
        for (stripe, right_col) in (1..self.side).rev().step_by(2).enumerate() {
            let rows: Box<dyn Iterator<Item = usize>> = if right_col <= 8 {
                Box::new(9..self.side)
            } else {
                Box::new(1..self.side)
            };
            let rows: Vec<usize> = if stripe % 2 == 0 {
                rows.rev().collect()
            } else {
                rows.collect()
            };
            for row in rows {
                if let Some(bit) = it.next() {
                    self.set(row, right_col, Color::from(bit));
                }
                if let Some(bit) = it.next() {
                    self.set(row, right_col - 1, Color::from(bit));
                }
            }
        }
        debug_assert!(it.next().is_none());
    }

    /// The Micro-QR mask score: `16·min(s1, s2) + max(s1, s2)`, where `s1`
    /// is the dark-module count of the bottom row (excluding column 0) and
    /// `s2` is the dark-module count of the rightmost column (excluding
    /// row 0).
    fn score(&self) -> u32 {
        let last = self.side - 1;
        let s1 = (1..self.side).filter(|&col| self.get(last, col) == Color::Dark).count();
        let s2 = (1..self.side).filter(|&row| self.get(row, last) == Color::Dark).count();
        let (s1, s2) = (s1.as_u32(), s2.as_u32());
        16 * s1.min(s2) + s1.max(s2)
    }

    /// Tries each of the four masks against the data region, applies the
    /// highest-scoring one in place (ties go to the lowest reference
    /// value), and returns which mask was chosen.
    fn apply_best_mask(&mut self) -> Mask {
        let (best_mask, best_cells) = Mask::ALL
            .into_iter()
            .map(|mask| {
                let mut candidate = self.clone();
                candidate.invert_data_region(mask);
                let score = candidate.score();
                (mask, candidate.cells, score)
            })
            .fold(None, |best: Option<(Mask, Vec<Color>, u32)>, (mask, cells, score)| {
                match &best {
                    Some((_, _, best_score)) if *best_score >= score => best,
                    _ => Some((mask, cells, score)),
                }
            })
            .map(|(mask, cells, _)| (mask, cells))
            .expect("Mask::ALL is non-empty");

        self.cells = best_cells;
        best_mask
    }

    /// Inverts every data-region cell for which `mask` applies.
    fn invert_data_region(&mut self, mask: Mask) {
        for row in 0..self.side {
            for col in 0..self.side {
                if !is_functional(row, col) && mask.applies(row, col) {
                    let inverted = !self.get(row, col);
                    self.set(row, col, inverted);
                }
            }
        }
    }

    fn into_colors(self) -> Matrix {
        Matrix { side: self.side, cells: self.cells }
    }
}

/// The 10-bit BCH generator for the 15-bit format-information field.
const FORMAT_INFO_GENERATOR: u32 = 0b101_0011_0111;

/// The XOR mask applied to the (field ∥ BCH) pair before placement.
const FORMAT_INFO_XOR_MASK: u32 = 0b100_0100_0100_0101;

/// Computes the 10-bit BCH remainder of `field << 10` modulo
/// [`FORMAT_INFO_GENERATOR`], via binary polynomial long division over
/// `GF(2)`.
fn bch_remainder(field: u32) -> u32 {
    let mut register = field << 10;
    for bit in (10..=14).rev() {
        if register & (1 << bit) != 0 {
            register ^= FORMAT_INFO_GENERATOR << (bit - 10);
        }
    }
    register & 0x3FF
}

/// Computes the 15-bit format-information value for `(version, ec_level,
/// mask)`: `((symbol_number << 2) | mask_reference) ∥ bch`, XORed with
/// [`FORMAT_INFO_XOR_MASK`].
///
/// # Errors
///
/// Returns [`crate::types::QrError::InvalidPair`] if `(version, ec_level)`
/// is not one of the eight legal combinations.
fn format_information_value(version: Version, ec_level: EcLevel, mask: Mask) -> QrResult<u32> {
    let field = (symbol_number(version, ec_level)?.as_u32() << 2) | mask.reference_value();
    let bch = bch_remainder(field);
    Ok(((field << 10) | bch) ^ FORMAT_INFO_XOR_MASK)
}

/// The reserved cells, in MSB-to-LSB placement order: `(8,1)…(8,8)` then
/// `(7,8)…(1,8)`.
const fn format_information_positions() -> [(usize, usize); 15] {
    [
        (8, 1), (8, 2), (8, 3), (8, 4), (8, 5), (8, 6), (8, 7), (8, 8),
        (7, 8), (6, 8), (5, 8), (4, 8), (3, 8), (2, 8), (1, 8),
    ]
}

/// Builds the complete symbol matrix for `(version, ec_level)` from the
/// concatenated data and error-correction codeword bits.
///
/// `data_bits` is the natural, unpadded data-codeword bit stream (exactly
/// `data_bit_capacity(version, ec_level)` bits); `ec_codewords` is the
/// byte-aligned error-correction codeword stream. Together they must total
/// exactly `(side−1)² − 64` bits.
///
/// # Errors
///
/// Returns [`crate::types::QrError::InvalidPair`] if `(version, ec_level)`
/// is not one of the eight legal combinations.
pub fn build_matrix(
    version: Version,
    ec_level: EcLevel,
    data_bits: impl Iterator<Item = bool>,
    ec_codewords: &[u8],
) -> QrResult<(Matrix, Mask)> {
    let mut bits: Vec<bool> = data_bits.collect();
    for byte in ec_codewords {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1 != 0);
        }
    }

    let mut canvas = Canvas::new(version);
    canvas.draw_all_functional_patterns();
    canvas.draw_data(&bits);
    let mask = canvas.apply_best_mask();

    let format_info = format_information_value(version, ec_level, mask)?;
    for (k, &(row, col)) in format_information_positions().iter().enumerate() {
        let bit = (format_info >> (14 - k)) & 1 != 0;
        canvas.set(row, col, Color::from(bit));
    }

    Ok((canvas.into_colors(), mask))
}

#[cfg(test)]
mod is_functional_tests {
    use super::*;

    #[test]
    fn test_timing_row_and_column() {
        assert!(is_functional(0, 5));
        assert!(is_functional(5, 0));
    }

    #[test]
    fn test_finder_block() {
        assert!(is_functional(8, 8));
        assert!(!is_functional(9, 8));
        assert!(!is_functional(8, 9));
    }
}

#[cfg(test)]
mod format_information_tests {
    use super::*;

    /// JIS X0510 Annex I.3: M2/L, mask 01 → format information
    /// `101000010011001`.
    #[test]
    fn test_annex_i_format_information() {
        let value = format_information_value(Version::M2, EcLevel::L, Mask::M1).unwrap();
        assert_eq!(format!("{value:015b}"), "101000010011001");
    }
}

#[cfg(test)]
mod build_matrix_tests {
    use super::*;
    use crate::bits::BitSequence;

    /// JIS X0510 Annex I.3: "01234567" under M2/L renders to this exact
    /// 13×13 matrix, selecting mask 01.
    #[test]
    fn test_annex_i_full_matrix() {
        let data = "0100000000011000101011001100001100000000";
        let mut bits = BitSequence::new();
        for c in data.chars() {
            bits.push_uint(u32::from(c == '1'), 1);
        }

        let ec = [0x86, 0x0D, 0x22, 0xAE, 0x30];
        let (matrix, mask) =
            build_matrix(Version::M2, EcLevel::L, bits.iter(), &ec).unwrap();

        assert_eq!(mask, Mask::M1);

        let expected = [
            "1111111010101",
            "1000001011101",
            "1011101001101",
            "1011101001111",
            "1011101011100",
            "1000001010001",
            "1111111001111",
            "0000000001100",
            "1101000010001",
            "0110101010101",
            "1110011111110",
            "0001010000110",
            "1110100110111",
        ];
        for (row, line) in expected.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                let expected_color = if ch == '1' { Color::Dark } else { Color::Light };
                assert_eq!(
                    matrix.get(row, col),
                    expected_color,
                    "mismatch at ({row}, {col})"
                );
            }
        }
    }
}
