// SPDX-FileCopyrightText: 2014 kennytm
// SPDX-FileCopyrightText: 2016 Steven Allen
// SPDX-FileCopyrightText: 2019 Ivan Tham
// SPDX-FileCopyrightText: 2019 Jasper Bryant-Greene
// SPDX-FileCopyrightText: 2024 Michael Spiegel
// SPDX-FileCopyrightText: 2024 Shun Sakai
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The `microqr` crate is a [Micro QR code] symbol encoder conforming to
//! JIS X0510.
//!
//! It implements the full pipeline from text to symbol: character
//! classification, segment optimization, codeword assembly, Reed–Solomon
//! error correction, and matrix layout with mask selection — but stops at a
//! boolean module matrix. Rendering to an image, SVG, or string is left to
//! callers.
//!
//! # Examples
//!
//! ```
//! use microqr::{EcLevel, MicroQrCode};
//!
//! let code = MicroQrCode::new("01234567", EcLevel::L).unwrap();
//! println!("{}", code.to_debug_str('#', '.'));
//! ```
//!
//! [Micro QR code]: https://www.qrcode.com/codes/microqr.html

#![deny(missing_docs)]

pub mod bits;
pub mod canvas;
mod cast;
pub mod config;
pub mod ec;
pub mod optimize;
pub mod types;

use std::ops::Index;

pub use crate::canvas::Matrix;
pub use crate::types::{Color, EcLevel, Mask, Mode, QrError, QrResult, Version};

use crate::{
    bits::build_data_codewords,
    canvas::{build_matrix, is_functional},
    config::Config,
    ec::error_correction_codewords,
    optimize::analyze_text,
};

/// Encodes `text` into a Micro QR Code symbol matrix.
///
/// Chooses the smallest legal `(version, ecl)` combination whose error
/// correction level is at least `ecl_preference`, promoting it as high as
/// capacity allows. Byte-mode text is encoded as Shift-JIS
/// ([`Config::default`]); use [`encode_with_config`] to choose another
/// encoding.
///
/// The returned matrix carries no quiet zone; callers add one externally.
///
/// # Errors
///
/// - [`QrError::InvalidCharacter`] if a character is encodable in no mode.
/// - [`QrError::InvalidPair`] if the search space admits no legal
///   `(version, ecl, modes)` triple.
/// - [`QrError::OverCapacity`] if a legal combination exists but none has
///   enough data-bit capacity for `text`.
///
/// # Examples
///
/// ```
/// use microqr::{EcLevel, encode};
///
/// let matrix = encode("01234567", EcLevel::L).unwrap();
/// assert_eq!(matrix.side(), 13);
/// ```
pub fn encode(text: &str, ecl_preference: EcLevel) -> QrResult<Matrix> {
    encode_with_config(text, ecl_preference, Config::default())
}

/// Identical to [`encode`], but encodes Byte-mode text with `config`'s
/// configured encoding rather than the Shift-JIS default.
///
/// # Errors
///
/// See [`encode`].
pub fn encode_with_config(text: &str, ecl_preference: EcLevel, config: Config) -> QrResult<Matrix> {
    let (version, ec_level, segments) = analyze_text(text, config, Version::M4, ecl_preference)?;
    let data_bits = build_data_codewords(&segments, version, ec_level)?;
    let data_codewords = data_bits.to_rs_codewords();
    let ec_codewords = error_correction_codewords(&data_codewords, version, ec_level)?;
    let (matrix, _mask) = build_matrix(version, ec_level, data_bits.iter(), &ec_codewords)?;
    Ok(matrix)
}

/// An encoded Micro QR Code symbol.
///
/// An ergonomic wrapper around [`Matrix`] that also remembers the chosen
/// `(version, ec_level)` and offers indexing and debug-printing.
#[derive(Clone, Debug)]
pub struct MicroQrCode {
    matrix: Matrix,
    version: Version,
    ec_level: EcLevel,
}

impl MicroQrCode {
    /// Constructs a new Micro QR code which automatically encodes `text` at
    /// the smallest legal version whose error correction level is at least
    /// `ecl_preference`.
    ///
    /// # Errors
    ///
    /// See [`encode`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use microqr::{EcLevel, MicroQrCode};
    /// #
    /// let code = MicroQrCode::new("Some data", EcLevel::M).unwrap();
    /// ```
    #[inline]
    pub fn new(text: &str, ecl_preference: EcLevel) -> QrResult<Self> {
        Self::with_config(text, ecl_preference, Config::default())
    }

    /// Identical to [`Self::new`], but encodes Byte-mode text with `config`'s
    /// configured encoding.
    ///
    /// # Errors
    ///
    /// See [`encode`].
    pub fn with_config(text: &str, ecl_preference: EcLevel, config: Config) -> QrResult<Self> {
        let (version, ec_level, segments) =
            analyze_text(text, config, Version::M4, ecl_preference)?;
        let data_bits = build_data_codewords(&segments, version, ec_level)?;
        let data_codewords = data_bits.to_rs_codewords();
        let ec_codewords = error_correction_codewords(&data_codewords, version, ec_level)?;
        let (matrix, _mask) = build_matrix(version, ec_level, data_bits.iter(), &ec_codewords)?;
        Ok(Self { matrix, version, ec_level })
    }

    /// Gets the version of this Micro QR code.
    ///
    /// # Examples
    ///
    /// ```
    /// # use microqr::{EcLevel, MicroQrCode, Version};
    /// #
    /// let code = MicroQrCode::new("01234567", EcLevel::L).unwrap();
    /// assert_eq!(code.version(), Version::M2);
    /// ```
    #[must_use]
    #[inline]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Gets the error correction level of this Micro QR code.
    ///
    /// This may be higher than the `ecl_preference` passed to [`Self::new`]:
    /// the encoder promotes it as high as the chosen version's capacity
    /// allows.
    #[must_use]
    #[inline]
    pub const fn error_correction_level(&self) -> EcLevel {
        self.ec_level
    }

    /// Gets the number of modules per side of this Micro QR code.
    #[must_use]
    #[inline]
    pub fn side(&self) -> usize {
        self.matrix.side()
    }

    /// Checks whether the module at `(row, col)` is part of the function
    /// pattern or format-information reservation, rather than a data or
    /// error-correction codeword bit.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is beyond the size of the Micro QR code.
    #[must_use]
    pub fn is_functional(&self, row: usize, col: usize) -> bool {
        assert!(
            row < self.side() && col < self.side(),
            "coordinate is too large for this Micro QR code"
        );
        is_functional(row, col)
    }

    /// Converts the Micro QR code into a human-readable string. This is
    /// mainly for debugging only.
    #[must_use]
    pub fn to_debug_str(&self, on_char: char, off_char: char) -> String {
        let side = self.side();
        let mut out = String::with_capacity(side * (side + 1));
        for row in 0..side {
            for col in 0..side {
                out.push(match self.matrix.get(row, col) {
                    Color::Dark => on_char,
                    Color::Light => off_char,
                });
            }
            if row + 1 < side {
                out.push('\n');
            }
        }
        out
    }

    /// Converts the Micro QR code to a vector of colors, row-major.
    #[must_use]
    pub fn to_colors(&self) -> Vec<Color> {
        let side = self.side();
        (0..side)
            .flat_map(|row| (0..side).map(move |col| self.matrix.get(row, col)))
            .collect()
    }
}

impl Index<(usize, usize)> for MicroQrCode {
    type Output = Color;

    /// Indexes by `(x, y)`, i.e. `(col, row)`.
    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        &self.matrix[(y, x)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// JIS X0510 Annex I.3: "01234567" under M2/L.
    #[test]
    fn test_annex_i_micro_qr() {
        let code = MicroQrCode::new("01234567", EcLevel::L).unwrap();
        assert_eq!(code.version(), Version::M2);
        assert_eq!(code.error_correction_level(), EcLevel::L);
        assert_eq!(
            code.to_debug_str('#', '.'),
            concat!(
                "#######.#.#.#\n",
                "#.....#.###.#\n",
                "#.###.#..##.#\n",
                "#.###.#..####\n",
                "#.###.#.###..\n",
                "#.....#.#...#\n",
                "#######..####\n",
                ".........##..\n",
                "##.#....#...#\n",
                ".##.#.#.#.#.#\n",
                "###..#######.\n",
                "...#.#....##.\n",
                "###.#..##.###"
            )
        );
    }

    #[test]
    fn test_encode_matches_micro_qr_code() {
        let matrix = encode("01234567", EcLevel::L).unwrap();
        let code = MicroQrCode::new("01234567", EcLevel::L).unwrap();
        for row in 0..matrix.side() {
            for col in 0..matrix.side() {
                assert_eq!(matrix.get(row, col), code.matrix.get(row, col));
            }
        }
    }

    #[test]
    fn test_numeric_any_ecl() {
        for ecl in [EcLevel::None, EcLevel::L, EcLevel::M, EcLevel::Q] {
            assert!(encode("1111", ecl).is_ok());
        }
    }

    #[test]
    fn test_byte_mode_smallest_version() {
        let code = MicroQrCode::new("aaaa", EcLevel::L).unwrap();
        assert_eq!(code.version(), Version::M3);
    }

    #[test]
    fn test_over_capacity_boundary() {
        let fits = "1".repeat(35);
        let overflows = "1".repeat(36);
        assert!(encode(&fits, EcLevel::L).is_ok());
        assert_eq!(encode(&overflows, EcLevel::L), Err(QrError::OverCapacity));
    }

    #[test]
    fn test_invalid_character() {
        assert_eq!(encode("\u{1F600}", EcLevel::L), Err(QrError::InvalidCharacter('\u{1F600}')));
    }

    #[test]
    fn test_is_functional_matches_canvas() {
        let code = MicroQrCode::new("01234567", EcLevel::L).unwrap();
        assert!(code.is_functional(0, 0));
        assert!(!code.is_functional(9, 9));
    }
}
