// SPDX-FileCopyrightText: 2024 Michael Spiegel
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Encoding configuration threaded through the analyzer and mode encoders.
//!
//! The only process-wide setting the original program carries is the
//! byte-mode text encoding. Here it is a value, passed explicitly, rather
//! than a module-level mutable field.

use encoding_rs::{Encoding, SHIFT_JIS};

/// Configuration affecting Byte-mode text encoding.
///
/// `Config` is a plain value; there is no global or thread-local default.
/// Callers construct one (or use [`Config::default`]) and pass it to
/// [`crate::optimize::analyze_text`] and the mode encoders in [`crate::bits`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    byte_encoding: &'static Encoding,
}

impl Config {
    /// Creates a configuration using the given encoding for Byte mode.
    #[must_use]
    #[inline]
    pub const fn new(byte_encoding: &'static Encoding) -> Self {
        Self { byte_encoding }
    }

    /// Creates a configuration from an encoding label (e.g. `"shift-jis"`,
    /// `"utf-8"`), as accepted by [`Encoding::for_label`].
    ///
    /// Returns [`None`] if the label is not recognized.
    #[must_use]
    pub fn with_byte_encoding(label: &str) -> Option<Self> {
        Encoding::for_label(label.as_bytes()).map(Self::new)
    }

    /// The configured byte-mode text encoding.
    #[must_use]
    #[inline]
    pub const fn byte_encoding(self) -> &'static Encoding {
        self.byte_encoding
    }
}

impl Default for Config {
    /// The default configuration encodes Byte mode as Shift-JIS.
    #[inline]
    fn default() -> Self {
        Self::new(SHIFT_JIS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_shift_jis() {
        assert_eq!(Config::default().byte_encoding(), SHIFT_JIS);
    }

    #[test]
    fn test_with_byte_encoding_label() {
        let config = Config::with_byte_encoding("utf-8").unwrap();
        assert_eq!(config.byte_encoding(), encoding_rs::UTF_8);
    }

    #[test]
    fn test_with_byte_encoding_unknown_label() {
        assert!(Config::with_byte_encoding("not-a-real-encoding").is_none());
    }
}
