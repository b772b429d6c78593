// SPDX-FileCopyrightText: 2014 kennytm
// SPDX-FileCopyrightText: 2018 Ethan Pailes
// SPDX-FileCopyrightText: 2023 Nakanishi
// SPDX-FileCopyrightText: 2024 Michael Spiegel
// SPDX-FileCopyrightText: 2024 Shun Sakai
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The `types` module contains types associated with the functional elements of
//! a Micro QR code.

use core::{error::Error, fmt, ops::Not};

// `QrResult`

/// `QrError` encodes the error encountered when generating a Micro QR code.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QrError {
    /// A character is encodable in no mode under the active configuration.
    InvalidCharacter(char),

    /// The requested (version, error correction level) or (version, mode)
    /// combination is illegal, or the search space admits no legal triple.
    InvalidPair,

    /// A legal combination exists, but none has enough data-bit capacity for
    /// the text.
    OverCapacity,
}

impl fmt::Display for QrError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCharacter(c) => write!(f, "invalid character : {c}"),
            Self::InvalidPair => write!(f, "invalid pair"),
            Self::OverCapacity => write!(f, "over capacity"),
        }
    }
}

impl Error for QrError {}

/// `QrResult` is a convenient alias for a Micro QR code generation result.
pub type QrResult<T> = Result<T, QrError>;

// Color

/// The color of a module.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Color {
    /// The module is light colored.
    Light,

    /// The module is dark colored.
    Dark,
}

impl Color {
    /// Selects a value according to color of the module. Equivalent to `if self
    /// != Color::Light { dark } else { light }`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use microqr::Color;
    /// #
    /// assert_eq!(Color::Light.select(1, 0), 0);
    /// assert_eq!(Color::Dark.select("black", "white"), "black");
    /// ```
    #[inline]
    pub fn select<T>(self, dark: T, light: T) -> T {
        match self {
            Self::Light => light,
            Self::Dark => dark,
        }
    }
}

impl From<bool> for Color {
    #[inline]
    fn from(dark: bool) -> Self {
        if dark { Self::Dark } else { Self::Light }
    }
}

impl Not for Color {
    type Output = Self;

    #[inline]
    fn not(self) -> Self::Output {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

// Version

/// The version (size) of a Micro QR code symbol. Unlike a normal QR code, a
/// Micro QR symbol has only four versions.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum Version {
    /// 11×11 modules. Only [`Mode::Numeric`] and [`EcLevel::None`] are
    /// supported.
    M1,

    /// 13×13 modules. Only [`Mode::Numeric`] and [`Mode::Alphanumeric`] are
    /// supported.
    M2,

    /// 15×15 modules. All four modes are supported.
    M3,

    /// 17×17 modules. All four modes are supported.
    M4,
}

impl Version {
    /// All four Micro QR versions, in ascending order.
    pub const ALL: [Self; 4] = [Self::M1, Self::M2, Self::M3, Self::M4];

    /// Gets the number of modules on each side of the symbol.
    ///
    /// # Examples
    ///
    /// ```
    /// # use microqr::Version;
    /// #
    /// assert_eq!(Version::M1.side(), 11);
    /// assert_eq!(Version::M4.side(), 17);
    /// ```
    #[must_use]
    #[inline]
    pub const fn side(self) -> usize {
        match self {
            Self::M1 => 11,
            Self::M2 => 13,
            Self::M3 => 15,
            Self::M4 => 17,
        }
    }

    /// Gets the number of bits needed to encode the mode indicator. `M1`
    /// omits the mode indicator entirely, so this is `0`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use microqr::Version;
    /// #
    /// assert_eq!(Version::M1.mode_indicator_length(), 0);
    /// assert_eq!(Version::M4.mode_indicator_length(), 3);
    /// ```
    #[must_use]
    #[inline]
    pub const fn mode_indicator_length(self) -> usize {
        match self {
            Self::M1 => 0,
            Self::M2 => 1,
            Self::M3 => 2,
            Self::M4 => 3,
        }
    }

    /// Gets the length, in bits, of the terminator appended after the last
    /// segment.
    #[must_use]
    #[inline]
    pub const fn terminator_length(self) -> usize {
        match self {
            Self::M1 => 3,
            Self::M2 => 5,
            Self::M3 => 7,
            Self::M4 => 9,
        }
    }

    /// Gets the zero-based index of this version among [`Self::ALL`].
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::M1 => 0,
            Self::M2 => 1,
            Self::M3 => 2,
            Self::M4 => 3,
        }
    }

    /// Gets the character-count-indicator length, in bits, for `mode` under
    /// this version.
    ///
    /// Returns [`Err`] if `mode` is not supported by this version (e.g.
    /// `Alphanumeric` under `M1`).
    pub const fn length_bits_count(self, mode: Mode) -> QrResult<usize> {
        let table = match self {
            Self::M1 => [3, 0, 0, 0],
            Self::M2 => [4, 3, 0, 0],
            Self::M3 => [5, 4, 4, 3],
            Self::M4 => [6, 5, 5, 4],
        };
        let (value, supported) = match mode {
            Mode::Numeric => (table[0], true),
            Mode::Alphanumeric => (table[1], !matches!(self, Self::M1)),
            Mode::Byte => (table[2], matches!(self, Self::M3 | Self::M4)),
            Mode::Kanji => (table[3], matches!(self, Self::M3 | Self::M4)),
        };
        if supported { Ok(value) } else { Err(QrError::InvalidPair) }
    }
}

impl fmt::Display for Version {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::M1 => "M1",
            Self::M2 => "M2",
            Self::M3 => "M3",
            Self::M4 => "M4",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod version_tests {
    use super::*;

    #[test]
    fn test_side() {
        assert_eq!(Version::M1.side(), 11);
        assert_eq!(Version::M2.side(), 13);
        assert_eq!(Version::M3.side(), 15);
        assert_eq!(Version::M4.side(), 17);
    }

    #[test]
    fn test_mode_indicator_length() {
        assert_eq!(Version::M1.mode_indicator_length(), 0);
        assert_eq!(Version::M2.mode_indicator_length(), 1);
        assert_eq!(Version::M3.mode_indicator_length(), 2);
        assert_eq!(Version::M4.mode_indicator_length(), 3);
    }

    #[test]
    fn test_terminator_length() {
        assert_eq!(Version::M1.terminator_length(), 3);
        assert_eq!(Version::M2.terminator_length(), 5);
        assert_eq!(Version::M3.terminator_length(), 7);
        assert_eq!(Version::M4.terminator_length(), 9);
    }

    #[test]
    fn test_length_bits_count() {
        assert_eq!(Version::M1.length_bits_count(Mode::Numeric), Ok(3));
        assert_eq!(
            Version::M1.length_bits_count(Mode::Alphanumeric),
            Err(QrError::InvalidPair)
        );
        assert_eq!(Version::M2.length_bits_count(Mode::Numeric), Ok(4));
        assert_eq!(Version::M2.length_bits_count(Mode::Alphanumeric), Ok(3));
        assert_eq!(Version::M3.length_bits_count(Mode::Kanji), Ok(3));
        assert_eq!(Version::M4.length_bits_count(Mode::Byte), Ok(5));
    }
}

// Error correction level

/// The error correction level. It allows the original information be
/// recovered even if parts of the symbol are damaged.
///
/// Unlike a normal QR code, a Micro QR symbol additionally supports
/// [`Self::None`], which is detection-only and exclusive to [`Version::M1`].
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum EcLevel {
    /// Error detection only. Exclusive to [`Version::M1`].
    None = 0,

    /// Low error correction. Allows up to 7% of wrong blocks.
    L = 1,

    /// Medium error correction. Allows up to 15% of wrong blocks.
    M = 2,

    /// "Quartile" error correction. Allows up to 25% of wrong blocks.
    /// Exclusive to [`Version::M4`].
    Q = 3,
}

impl fmt::Display for EcLevel {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::L => "L",
            Self::M => "M",
            Self::Q => "Q",
        };
        f.write_str(name)
    }
}

/// The eight legal `(Version, EcLevel)` combinations, in `symbol_number`
/// order (§4.9 of the format information procedure).
pub const LEGAL_VERSION_EC_PAIRS: [(Version, EcLevel); 8] = [
    (Version::M1, EcLevel::None),
    (Version::M2, EcLevel::L),
    (Version::M2, EcLevel::M),
    (Version::M3, EcLevel::L),
    (Version::M3, EcLevel::M),
    (Version::M4, EcLevel::L),
    (Version::M4, EcLevel::M),
    (Version::M4, EcLevel::Q),
];

/// Per-`(version, ecl)` constant attributes: data-bit capacity and EC
/// codeword count, indexed in `symbol_number` order.
#[derive(Clone, Copy, Debug)]
pub struct SymbolAttributes {
    /// Data-bit capacity (before error correction).
    pub data_bit_capacity: usize,
    /// Error-correction codeword count.
    pub ec_codeword_count: usize,
}

/// Looks up the `symbol_number` (index into [`LEGAL_VERSION_EC_PAIRS`]) for a
/// `(version, ecl)` pair, or [`QrError::InvalidPair`] if the combination is
/// not one of the eight legal ones.
pub fn symbol_number(version: Version, ec_level: EcLevel) -> QrResult<usize> {
    LEGAL_VERSION_EC_PAIRS
        .iter()
        .position(|&(v, e)| v == version && e == ec_level)
        .ok_or(QrError::InvalidPair)
}

/// Looks up the data-bit capacity and EC codeword count for a `(version,
/// ecl)` pair.
pub fn symbol_attributes(version: Version, ec_level: EcLevel) -> QrResult<SymbolAttributes> {
    const TABLE: [SymbolAttributes; 8] = [
        SymbolAttributes { data_bit_capacity: 20, ec_codeword_count: 2 },
        SymbolAttributes { data_bit_capacity: 40, ec_codeword_count: 5 },
        SymbolAttributes { data_bit_capacity: 32, ec_codeword_count: 6 },
        SymbolAttributes { data_bit_capacity: 84, ec_codeword_count: 6 },
        SymbolAttributes { data_bit_capacity: 68, ec_codeword_count: 8 },
        SymbolAttributes { data_bit_capacity: 128, ec_codeword_count: 8 },
        SymbolAttributes { data_bit_capacity: 112, ec_codeword_count: 10 },
        SymbolAttributes { data_bit_capacity: 80, ec_codeword_count: 14 },
    ];
    Ok(TABLE[symbol_number(version, ec_level)?])
}

#[cfg(test)]
mod ec_level_tests {
    use super::*;

    #[test]
    fn test_symbol_number() {
        assert_eq!(symbol_number(Version::M1, EcLevel::None), Ok(0));
        assert_eq!(symbol_number(Version::M4, EcLevel::Q), Ok(7));
        assert_eq!(
            symbol_number(Version::M1, EcLevel::L),
            Err(QrError::InvalidPair)
        );
    }

    #[test]
    fn test_symbol_attributes() {
        let attrs = symbol_attributes(Version::M2, EcLevel::L).unwrap();
        assert_eq!(attrs.data_bit_capacity, 40);
        assert_eq!(attrs.ec_codeword_count, 5);

        let attrs = symbol_attributes(Version::M4, EcLevel::Q).unwrap();
        assert_eq!(attrs.data_bit_capacity, 80);
        assert_eq!(attrs.ec_codeword_count, 14);
    }
}

// Mode indicator

/// The mode indicator, which specifies the character set of an encoded
/// segment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    /// The data contains only characters 0 to 9.
    Numeric,

    /// The data contains only uppercase letters (A–Z), numbers (0–9) and a
    /// few punctuations marks (space, `$`, `%`, `*`, `+`, `-`, `.`, `/`, `:`).
    Alphanumeric,

    /// The data contains arbitrary bytes in the configured byte encoding.
    Byte,

    /// The data contains Shift-JIS-encoded double-byte text.
    Kanji,
}

impl Mode {
    /// All four modes, in classifier priority order (lowest-indexed
    /// supporting mode wins).
    pub const CLASSIFIER_ORDER: [Self; 4] =
        [Self::Numeric, Self::Alphanumeric, Self::Kanji, Self::Byte];

    /// The mode indicator's numeric value, as placed into the symbol.
    #[must_use]
    #[inline]
    pub const fn indicator_value(self) -> u32 {
        match self {
            Self::Numeric => 0,
            Self::Alphanumeric => 1,
            Self::Byte => 2,
            Self::Kanji => 3,
        }
    }

    /// Computes the number of bits needed to encode `raw_data_len` characters
    /// (or bytes, for [`Self::Byte`]) of data under this mode.
    ///
    /// Note that for [`Self::Kanji`], `raw_data_len` is the number of
    /// characters, not the number of bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use microqr::types::Mode;
    /// #
    /// assert_eq!(Mode::Numeric.data_bits_count(8), 27);
    /// assert_eq!(Mode::Numeric.data_bits_count(7), 24);
    /// ```
    #[must_use]
    #[inline]
    pub const fn data_bits_count(self, raw_data_len: usize) -> usize {
        match self {
            Self::Numeric => {
                let whole = raw_data_len / 3;
                let rem = raw_data_len % 3;
                10 * whole + match rem {
                    0 => 0,
                    1 => 4,
                    _ => 7,
                }
            }
            Self::Alphanumeric => 11 * (raw_data_len / 2) + 6 * (raw_data_len % 2),
            Self::Byte => raw_data_len * 8,
            Self::Kanji => raw_data_len * 13,
        }
    }

    /// Finds the lowest common mode which both modes are compatible with.
    ///
    /// This is the least-upper-bound merge used by the segmentation
    /// optimizer when combining two adjacent runs under a single mode.
    ///
    /// # Examples
    ///
    /// ```
    /// # use microqr::types::Mode;
    /// #
    /// assert_eq!(Mode::Numeric.merge(Mode::Kanji), Mode::Byte);
    /// assert_eq!(Mode::Numeric.merge(Mode::Alphanumeric), Mode::Alphanumeric);
    /// assert_eq!(Mode::Kanji.merge(Mode::Kanji), Mode::Kanji);
    /// ```
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        use Mode::{Alphanumeric, Byte, Kanji, Numeric};
        match (self, other) {
            (a, b) if a == b => a,
            (Byte, _) | (_, Byte) | (Kanji, _) | (_, Kanji) => Byte,
            (Alphanumeric, _) | (_, Alphanumeric) => Alphanumeric,
            (Numeric, Numeric) => Numeric,
        }
    }
}

impl fmt::Display for Mode {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Numeric => "numeric",
            Self::Alphanumeric => "alphanumeric",
            Self::Byte => "byte",
            Self::Kanji => "kanji",
        };
        f.write_str(name)
    }
}


// Mask

/// The four mask patterns a Micro QR symbol can use.
///
/// Unlike a normal QR code, a Micro QR symbol only ever carries a 2-bit mask
/// reference, never a combined format field with 8 choices.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mask {
    /// Pattern `00`: dark iff `row mod 2 == 0`.
    M0,
    /// Pattern `01`: dark iff `(row/2 + col/3) mod 2 == 0`.
    M1,
    /// Pattern `10`: dark iff `((row·col) mod 2 + (row·col) mod 3) mod 2 == 0`.
    M2,
    /// Pattern `11`: dark iff `((row+col) mod 2 + (row·col) mod 3) mod 2 == 0`.
    M3,
}

impl Mask {
    /// All four mask patterns, in reference-value order.
    pub const ALL: [Self; 4] = [Self::M0, Self::M1, Self::M2, Self::M3];

    /// The 2-bit mask-pattern reference value placed into the format
    /// information.
    #[must_use]
    #[inline]
    pub const fn reference_value(self) -> u32 {
        match self {
            Self::M0 => 0,
            Self::M1 => 1,
            Self::M2 => 2,
            Self::M3 => 3,
        }
    }

    /// Evaluates the mask predicate at `(row, col)`.
    #[must_use]
    pub const fn applies(self, row: usize, col: usize) -> bool {
        match self {
            Self::M0 => row % 2 == 0,
            Self::M1 => (row / 2 + col / 3) % 2 == 0,
            Self::M2 => ((row * col) % 2 + (row * col) % 3) % 2 == 0,
            Self::M3 => ((row + col) % 2 + (row * col) % 3) % 2 == 0,
        }
    }
}

#[cfg(test)]
mod mask_tests {
    use super::*;

    #[test]
    fn test_reference_values() {
        let values: Vec<u32> = Mask::ALL.iter().map(|m| m.reference_value()).collect();
        assert_eq!(values, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_applies_corner() {
        assert!(Mask::M0.applies(0, 0));
        assert!(!Mask::M0.applies(1, 0));
    }
}
