// SPDX-FileCopyrightText: 2024 Michael Spiegel
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bit-sequence assembly: per-mode encoders, segments, and the codeword
//! builder (terminator, bit padding, pad codewords).

use encoding_rs::SHIFT_JIS;

use crate::{
    cast::{As, Truncate},
    config::Config,
    types::{EcLevel, Mode, QrError, QrResult, Version, symbol_attributes},
};

/// The 45-character Alphanumeric character set, indexed 0–44.
pub const ALPHANUMERIC_CHARS: &[u8; 45] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// Returns the Alphanumeric value (0–44) of `c`, or [`None`] if `c` is not in
/// the Alphanumeric character set.
#[must_use]
pub fn alphanumeric_value(c: char) -> Option<u32> {
    u8::try_from(c)
        .ok()
        .and_then(|b| ALPHANUMERIC_CHARS.iter().position(|&a| a == b))
        .map(|i| i.as_u32())
}

/// Encodes `c` into its 2-byte Shift-JIS code point, or [`None`] if it does
/// not encode to exactly two bytes in Shift-JIS.
#[must_use]
pub fn shift_jis_code(c: char) -> Option<u16> {
    let mut buf = [0u8; 4];
    let s = c.encode_utf8(&mut buf);
    let (bytes, _, had_errors) = SHIFT_JIS.encode(s);
    if had_errors || bytes.len() != 2 {
        return None;
    }
    Some((u16::from(bytes[0]) << 8) | u16::from(bytes[1]))
}

/// Whether a 2-byte Shift-JIS code point `x` falls in a legal Kanji range.
///
/// Ranges `[0x8140,0x9FFC] ∪ [0xE040,0xEBBF]` with `low != 0x7F`, per the
/// two canonical ranges the `encode` path assumes (see the module docs on
/// the historical `is_valid` boundary discrepancy this avoids).
#[must_use]
pub fn is_valid_kanji_code(x: u16) -> bool {
    let low = x & 0xFF;
    if low == 0x7F {
        return false;
    }
    (0x8140..=0x9FFC).contains(&x) || (0xE040..=0xEBBF).contains(&x)
}

/// An ordered sequence of bits, MSB-first.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BitSequence {
    bits: Vec<bool>,
}

impl BitSequence {
    /// Creates an empty bit sequence.
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        Self { bits: Vec::new() }
    }

    /// The number of bits.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether the sequence is empty.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Appends a single bit.
    #[inline]
    pub fn push_bit(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    /// Appends the `n_bits` low bits of `value`, most-significant bit first.
    pub fn push_uint(&mut self, value: u32, n_bits: usize) {
        debug_assert!(n_bits <= 32);
        for i in (0..n_bits).rev() {
            self.bits.push((value >> i) & 1 != 0);
        }
    }

    /// Appends `count` zero bits.
    pub fn push_zeros(&mut self, count: usize) {
        self.bits.extend(std::iter::repeat_n(false, count));
    }

    /// Appends every bit of `other` to `self`.
    pub fn append(&mut self, other: &Self) {
        self.bits.extend_from_slice(&other.bits);
    }

    /// Iterates over the bits, in order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().copied()
    }

    /// Converts the sequence to bytes, MSB-first, zero-padding a trailing
    /// partial byte on the low end.
    ///
    /// Used to present the data bit stream to the Reed–Solomon encoder: a
    /// Micro QR M1/M3 symbol's last data "codeword" is a 4-bit nibble, which
    /// the error-correction computation treats as a full byte with 4 zero
    /// low bits appended (§4.6).
    #[must_use]
    pub fn to_rs_codewords(&self) -> Vec<u8> {
        self.bits
            .chunks(8)
            .map(|chunk| {
                let mut byte: u32 = 0;
                for (i, &bit) in chunk.iter().enumerate() {
                    if bit {
                        byte |= 1 << (7 - i);
                    }
                }
                byte.truncate_as_u8()
            })
            .collect()
    }
}

/// One `(mode, text-slice)` segment, expanded to
/// `mode_indicator ∥ character_count_indicator ∥ encoded_data`.
#[derive(Clone, Debug)]
pub struct Segment {
    mode: Mode,
    bits: BitSequence,
}

impl Segment {
    /// The mode this segment was encoded under.
    #[must_use]
    #[inline]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// The assembled bit sequence: mode indicator, character-count
    /// indicator, and encoded data.
    #[must_use]
    #[inline]
    pub const fn bits(&self) -> &BitSequence {
        &self.bits
    }

    /// Builds a segment by encoding `text` under `mode` for `version`.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::InvalidCharacter`] if a character in `text` is not
    /// representable under `mode`, and [`QrError::InvalidPair`] if `mode` is
    /// not supported by `version`.
    pub fn build(version: Version, mode: Mode, text: &str, config: Config) -> QrResult<Self> {
        let data = encode_data(mode, text, config)?;
        let char_count = match mode {
            Mode::Byte => data.len() / 8,
            _ => text.chars().count(),
        };

        let mut bits = BitSequence::new();
        let mode_indicator_len = version.mode_indicator_length();
        if mode_indicator_len > 0 {
            bits.push_uint(mode.indicator_value(), mode_indicator_len);
        }
        let cci_len = version.length_bits_count(mode)?;
        debug_assert!(
            char_count < (1usize << cci_len),
            "character count overflows the character-count indicator"
        );
        bits.push_uint(char_count.as_u32(), cci_len);
        bits.append(&data);
        Ok(Self { mode, bits })
    }
}

/// Encodes `text` as raw mode data (no mode indicator, no character-count
/// indicator) under `mode`.
///
/// # Errors
///
/// Returns [`QrError::InvalidCharacter`] if a character is not representable
/// under `mode`.
pub fn encode_data(mode: Mode, text: &str, config: Config) -> QrResult<BitSequence> {
    match mode {
        Mode::Numeric => encode_numeric(text),
        Mode::Alphanumeric => encode_alphanumeric(text),
        Mode::Byte => encode_byte(text, config),
        Mode::Kanji => encode_kanji(text),
    }
}

/// Encodes digits 0–9 in chunks of up to three, each emitting 4, 7, or 10
/// bits as the big-endian binary value of the chunk.
fn encode_numeric(text: &str) -> QrResult<BitSequence> {
    let mut bits = BitSequence::new();
    let chars: Vec<char> = text.chars().collect();
    for chunk in chars.chunks(3) {
        let mut value: u32 = 0;
        for &c in chunk {
            let digit = c.to_digit(10).ok_or(QrError::InvalidCharacter(c))?;
            value = value * 10 + digit;
        }
        let n_bits = match chunk.len() {
            1 => 4,
            2 => 7,
            _ => 10,
        };
        bits.push_uint(value, n_bits);
    }
    Ok(bits)
}

/// Encodes Alphanumeric characters in pairs, each pair `(a, b)` emitting 11
/// bits as `a * 45 + b`; a trailing single character emits 6 bits as `a`.
fn encode_alphanumeric(text: &str) -> QrResult<BitSequence> {
    let mut bits = BitSequence::new();
    let chars: Vec<char> = text.chars().collect();
    for pair in chars.chunks(2) {
        let values: Vec<u32> = pair
            .iter()
            .map(|&c| alphanumeric_value(c).ok_or(QrError::InvalidCharacter(c)))
            .collect::<QrResult<_>>()?;
        if values.len() == 2 {
            bits.push_uint(values[0] * 45 + values[1], 11);
        } else {
            bits.push_uint(values[0], 6);
        }
    }
    Ok(bits)
}

/// Encodes `text` to bytes using `config`'s byte encoding, each byte
/// emitting 8 bits.
fn encode_byte(text: &str, config: Config) -> QrResult<BitSequence> {
    let (encoded, _, had_errors) = config.byte_encoding().encode(text);
    if had_errors {
        let c = text.chars().next().unwrap_or_default();
        return Err(QrError::InvalidCharacter(c));
    }
    let mut bits = BitSequence::new();
    for byte in encoded.iter() {
        bits.push_uint(u32::from(*byte), 8);
    }
    Ok(bits)
}

/// Encodes Kanji characters: for each character's 2-byte Shift-JIS code `x`,
/// subtract `0x8140` if `x <= 0x9FFC` else `0xC140`, split into
/// `(high, low) = divmod(x, 0x100)`, and emit `high * 0xC0 + low` as 13 bits.
fn encode_kanji(text: &str) -> QrResult<BitSequence> {
    let mut bits = BitSequence::new();
    for c in text.chars() {
        let code = shift_jis_code(c).ok_or(QrError::InvalidCharacter(c))?;
        if !is_valid_kanji_code(code) {
            return Err(QrError::InvalidCharacter(c));
        }
        let x = if code <= 0x9FFC {
            u32::from(code) - 0x8140
        } else {
            u32::from(code) - 0xC140
        };
        let high = x / 0x100;
        let low = x % 0x100;
        bits.push_uint(high * 0xC0 + low, 13);
    }
    Ok(bits)
}

/// Computes the bit length `mode_indicator + character_count_indicator +
/// data_bits` that encoding `text` under `mode` for `version` would produce,
/// without actually encoding it.
///
/// Used by the segmentation optimizer to compare candidate groupings
/// cheaply.
///
/// # Errors
///
/// Returns [`QrError::InvalidPair`] if `mode` is unsupported by `version`,
/// and [`QrError::InvalidCharacter`] if `text` cannot be encoded as Byte data
/// under `config`'s encoding.
pub fn segment_bit_length(
    version: Version,
    mode: Mode,
    text: &str,
    config: Config,
) -> QrResult<usize> {
    let char_count = match mode {
        Mode::Byte => {
            let (encoded, _, had_errors) = config.byte_encoding().encode(text);
            if had_errors {
                let c = text.chars().next().unwrap_or_default();
                return Err(QrError::InvalidCharacter(c));
            }
            encoded.len()
        }
        _ => text.chars().count(),
    };
    let cci_len = version.length_bits_count(mode)?;
    Ok(version.mode_indicator_length() + cci_len + mode.data_bits_count(char_count))
}

/// Appends the version-dependent terminator, truncated so the sequence
/// never exceeds `capacity` bits.
pub fn add_terminator(bits: &mut BitSequence, version: Version, capacity: usize) {
    let len = version.terminator_length().min(capacity - bits.len());
    bits.push_zeros(len);
}

/// Pads with zero bits up to the next multiple of 8, truncated to
/// `capacity`.
pub fn add_padding_bit(bits: &mut BitSequence, capacity: usize) {
    let to_boundary = (8 - bits.len() % 8) % 8;
    let len = to_boundary.min(capacity - bits.len());
    bits.push_zeros(len);
}

/// Appends alternating pad codewords `0xEC, 0x11, …` until `capacity` is
/// reached. If the final gap is 4 bits (the M1/M3 trailing-nibble case),
/// ends with 4 zero bits instead of a full pad codeword.
pub fn add_pad_codewords(bits: &mut BitSequence, capacity: usize) {
    let mut use_ec = true;
    while bits.len() < capacity {
        let remaining = capacity - bits.len();
        if remaining == 4 {
            bits.push_zeros(4);
            break;
        }
        bits.push_uint(if use_ec { 0xEC } else { 0x11 }, 8);
        use_ec = !use_ec;
    }
}

/// Assembles the segments of a symbol into its full data codeword bit
/// stream: concatenated segments, terminator, bit padding, and pad
/// codewords, totaling exactly `data_bit_capacity(version, ec_level)` bits.
///
/// # Errors
///
/// Returns [`QrError::OverCapacity`] if the segments alone already exceed
/// capacity.
pub fn build_data_codewords(
    segments: &[Segment],
    version: Version,
    ec_level: EcLevel,
) -> QrResult<BitSequence> {
    let capacity = symbol_attributes(version, ec_level)?.data_bit_capacity;

    let mut bits = BitSequence::new();
    for segment in segments {
        bits.append(segment.bits());
    }
    if bits.len() > capacity {
        return Err(QrError::OverCapacity);
    }

    add_terminator(&mut bits, version, capacity);
    add_padding_bit(&mut bits, capacity);
    add_pad_codewords(&mut bits, capacity);

    debug_assert_eq!(bits.len(), capacity);
    Ok(bits)
}

#[cfg(test)]
mod bit_sequence_tests {
    use super::*;

    #[test]
    fn test_push_uint_msb_first() {
        let mut bits = BitSequence::new();
        bits.push_uint(0b101, 3);
        assert_eq!(bits.iter().collect::<Vec<_>>(), vec![true, false, true]);
    }

    #[test]
    fn test_to_rs_codewords_pads_trailing_nibble() {
        let mut bits = BitSequence::new();
        bits.push_uint(0b1010, 4);
        assert_eq!(bits.to_rs_codewords(), vec![0b1010_0000]);
    }
}

#[cfg(test)]
mod encode_tests {
    use super::*;

    #[test]
    fn test_encode_numeric_annex_i() {
        let bits = encode_numeric("01234567").unwrap();
        assert_eq!(bits.len(), 27);
        let expected = "000000110001010110011000011";
        let actual: String = bits
            .iter()
            .map(|b| if b { '1' } else { '0' })
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_encode_alphanumeric_pair() {
        let bits = encode_alphanumeric("AC").unwrap();
        assert_eq!(bits.len(), 11);
    }

    #[test]
    fn test_encode_numeric_rejects_non_digit() {
        assert_eq!(
            encode_numeric("12a").unwrap_err(),
            QrError::InvalidCharacter('a')
        );
    }

    #[test]
    fn test_shift_jis_code_roundtrip() {
        // U+6708 (月) is 0x8C8E in Shift-JIS.
        assert_eq!(shift_jis_code('月'), Some(0x8C8E));
        assert!(is_valid_kanji_code(0x8C8E));
    }

    #[test]
    fn test_is_valid_kanji_code_rejects_low_0x7f() {
        assert!(!is_valid_kanji_code(0x817F));
    }
}

#[cfg(test)]
mod codeword_builder_tests {
    use super::*;

    #[test]
    fn test_add_pad_codewords_nibble_tail() {
        let mut bits = BitSequence::new();
        bits.push_zeros(12);
        add_pad_codewords(&mut bits, 20);
        assert_eq!(bits.len(), 20);
    }

    #[test]
    fn test_build_data_codewords_over_capacity() {
        // 7 digits is within the M1 character-count indicator (3 bits, max
        // 7), but its 24-bit encoding exceeds M1/NONE's 20-bit capacity.
        let segment = Segment::build(Version::M1, Mode::Numeric, "1234567", Config::default());
        let segments = [segment.unwrap()];
        let result = build_data_codewords(&segments, Version::M1, EcLevel::None);
        assert_eq!(result.unwrap_err(), QrError::OverCapacity);
    }
}
