// SPDX-FileCopyrightText: 2024 Michael Spiegel
// SPDX-FileCopyrightText: 2024 Shun Sakai
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end scenarios against the public `encode`/`MicroQrCode` API.

use microqr::{EcLevel, MicroQrCode, QrError, Version, encode};

/// JIS X0510 Annex I.3: "01234567" under M2/L renders to this exact 13×13
/// matrix and selects mask 01.
#[test]
fn test_annex_i_full_symbol() {
    let code = MicroQrCode::new("01234567", EcLevel::L).unwrap();
    assert_eq!(code.version(), Version::M2);
    assert_eq!(
        code.to_debug_str('1', '0'),
        concat!(
            "1111111010101\n",
            "1000001011101\n",
            "1011101001101\n",
            "1011101001111\n",
            "1011101011100\n",
            "1000001010001\n",
            "1111111001111\n",
            "0000000001100\n",
            "1101000010001\n",
            "0110101010101\n",
            "1110011111110\n",
            "0001010000110\n",
            "1110100110111",
        )
    );
}

#[test]
fn test_numeric_succeeds_under_any_ecl() {
    for ecl in [EcLevel::None, EcLevel::L, EcLevel::M, EcLevel::Q] {
        let matrix = encode("1111", ecl).unwrap();
        assert!(matrix.side() >= 11);
    }
}

#[test]
fn test_byte_mode_picks_smallest_version() {
    let code = MicroQrCode::new("aaaa", EcLevel::L).unwrap();
    assert_eq!(code.version(), Version::M3);
}

/// Mixed Kanji/Byte/Numeric/Alphanumeric text should segment into a legal
/// M4 symbol within the 128-bit ECL L capacity.
#[test]
fn test_mixed_mode_segmentation_fits_m4() {
    let code = MicroQrCode::new("12月31日(火)", EcLevel::L).unwrap();
    assert_eq!(code.version(), Version::M4);
}

#[test]
fn test_ecl_l_capacity_boundary() {
    let fits = "1".repeat(35);
    let overflows = "1".repeat(36);
    assert!(encode(&fits, EcLevel::L).is_ok());
    assert_eq!(encode(&overflows, EcLevel::L), Err(QrError::OverCapacity));
}

#[test]
fn test_ecl_q_capacity_boundary() {
    let fits = "1".repeat(21);
    let overflows = "1".repeat(22);
    assert!(encode(&fits, EcLevel::Q).is_ok());
    assert_eq!(encode(&overflows, EcLevel::Q), Err(QrError::OverCapacity));
}

#[test]
fn test_invalid_character_under_shift_jis() {
    let err = encode("😀", EcLevel::L).unwrap_err();
    assert_eq!(err, QrError::InvalidCharacter('😀'));
}

#[test]
fn test_is_functional_excludes_data_region() {
    let code = MicroQrCode::new("01234567", EcLevel::L).unwrap();
    assert!(code.is_functional(0, 0));
    assert!(code.is_functional(8, 8));
    assert!(!code.is_functional(12, 12));
}
