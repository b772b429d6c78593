// SPDX-FileCopyrightText: 2024 Michael Spiegel
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mode classification and the segmentation optimizer: partitioning text
//! into a sequence of mode-tagged segments whose total encoded bit length is
//! minimum, and the `(version, ecl)` selection procedure built on top of it.

use std::{collections::HashSet, ops::Range};

use crate::{
    bits::{self, Segment, alphanumeric_value, is_valid_kanji_code, shift_jis_code},
    config::Config,
    types::{EcLevel, Mode, QrError, QrResult, Version, symbol_attributes, symbol_number},
};

/// Finds the lowest-indexed mode that can represent `c`, per the priority
/// Numeric, Alphanumeric, Kanji, Byte.
///
/// # Errors
///
/// Returns [`QrError::InvalidCharacter`] if no mode admits `c`.
pub fn char_mode(c: char, config: Config) -> QrResult<Mode> {
    if c.is_ascii_digit() {
        return Ok(Mode::Numeric);
    }
    if alphanumeric_value(c).is_some() {
        return Ok(Mode::Alphanumeric);
    }
    if shift_jis_code(c).is_some_and(is_valid_kanji_code) {
        return Ok(Mode::Kanji);
    }
    let (_, _, had_errors) = config.byte_encoding().encode(c.encode_utf8(&mut [0u8; 4]));
    if !had_errors {
        return Ok(Mode::Byte);
    }
    Err(QrError::InvalidCharacter(c))
}

/// One maximal run of consecutive characters sharing a classifier mode.
#[derive(Clone, Copy, Debug)]
struct CharRun {
    mode: Mode,
    range: Range<usize>,
}

/// Groups `chars` into maximal runs of the same classifier mode.
fn group_runs(chars: &[char], config: Config) -> QrResult<Vec<CharRun>> {
    let mut runs = Vec::new();
    let mut iter = chars.iter().enumerate();
    let Some((_, &first)) = iter.next() else {
        return Ok(runs);
    };
    let mut mode = char_mode(first, config)?;
    let mut start = 0;
    let mut end = 1;
    for (i, &c) in iter {
        let m = char_mode(c, config)?;
        if m == mode {
            end = i + 1;
        } else {
            runs.push(CharRun { mode, range: start..end });
            mode = m;
            start = i;
            end = i + 1;
        }
    }
    runs.push(CharRun { mode, range: start..end });
    Ok(runs)
}

fn text_of(chars: &[char], range: &Range<usize>) -> String {
    chars[range.clone()].iter().collect()
}

fn merged_mode(runs: &[CharRun]) -> Mode {
    runs[1..]
        .iter()
        .fold(runs[0].mode, |acc, run| acc.merge(run.mode))
}

/// A grouped segment produced by the optimizer: a merged mode over a
/// contiguous span of the original text.
pub type Grouping = Vec<(Mode, Range<usize>)>;

fn group_bit_length(
    version: Version,
    chars: &[char],
    group: &(Mode, Range<usize>),
    config: Config,
) -> QrResult<usize> {
    let text = text_of(chars, &group.1);
    bits::segment_bit_length(version, group.0, &text, config)
}

fn total_bit_length(
    version: Version,
    chars: &[char],
    grouping: &Grouping,
    config: Config,
) -> QrResult<usize> {
    grouping
        .iter()
        .map(|g| group_bit_length(version, chars, g, config))
        .sum()
}

/// Partitions `text` into mode-tagged segments minimizing total encoded bit
/// length for `version`, by exhaustively trying every subset of the
/// `2^(n-1)` inter-run boundaries (`n` = number of classifier runs).
///
/// # Errors
///
/// Returns [`QrError::InvalidCharacter`] if a character admits no mode, and
/// [`QrError::InvalidPair`] if no boundary subset yields a grouping whose
/// every segment mode is supported by `version`.
pub fn optimize_exhaustive(version: Version, text: &str, config: Config) -> QrResult<Grouping> {
    let chars: Vec<char> = text.chars().collect();
    let runs = group_runs(&chars, config)?;
    if runs.is_empty() {
        return Ok(Vec::new());
    }
    let boundaries = runs.len() - 1;
    // `boundaries` is bounded by input length (practical ceiling ~35 chars),
    // so `1 << boundaries` never approaches overflow in practice.
    let subset_count = 1u32 << boundaries;

    let mut best: Option<(usize, Grouping)> = None;
    for mask in 0..subset_count {
        let mut grouping: Grouping = Vec::new();
        let mut mode = runs[0].mode;
        let mut start = runs[0].range.start;
        let mut end = runs[0].range.end;
        for (i, run) in runs.iter().enumerate().skip(1) {
            if (mask >> (i - 1)) & 1 != 0 {
                mode = mode.merge(run.mode);
                end = run.range.end;
            } else {
                grouping.push((mode, start..end));
                mode = run.mode;
                start = run.range.start;
                end = run.range.end;
            }
        }
        grouping.push((mode, start..end));

        let Ok(len) = total_bit_length(version, &chars, &grouping, config) else {
            continue;
        };
        if best.as_ref().is_none_or(|(best_len, _)| len < *best_len) {
            best = Some((len, grouping));
        }
    }
    best.map(|(_, g)| g).ok_or(QrError::InvalidPair)
}

/// Partitions `text` the same way as [`optimize_exhaustive`], but by
/// recursive hill-climbing: repeatedly finds the single contiguous cut
/// `(left, right)` whose merge minimizes bit length, recursing into the
/// resulting (up to three) parts until no cut improves on leaving a span
/// unmerged.
///
/// Equivalent in total bit length to [`optimize_exhaustive`] (a tested
/// property), much cheaper for long inputs.
///
/// # Errors
///
/// Same conditions as [`optimize_exhaustive`].
pub fn optimize_hill_climbing(version: Version, text: &str, config: Config) -> QrResult<Grouping> {
    let chars: Vec<char> = text.chars().collect();
    let runs = group_runs(&chars, config)?;
    hill_climb(version, &runs, &chars, config)
}

fn hill_climb(
    version: Version,
    runs: &[CharRun],
    chars: &[char],
    config: Config,
) -> QrResult<Grouping> {
    if runs.len() <= 1 {
        return Ok(runs.iter().map(|r| (r.mode, r.range.clone())).collect());
    }

    let part_length = |part: &[CharRun]| -> QrResult<usize> {
        if part.is_empty() {
            return Ok(0);
        }
        let mode = merged_mode(part);
        let range = part[0].range.start..part[part.len() - 1].range.end;
        group_bit_length(version, chars, &(mode, range), config)
    };

    let n = runs.len();
    let mut best: Option<(usize, usize, usize)> = None;
    for left in 0..n {
        for right in (left + 1)..n {
            let Ok(l) = part_length(&runs[..left]) else { continue };
            let Ok(m) = part_length(&runs[left..right]) else { continue };
            let Ok(r) = part_length(&runs[right..]) else { continue };
            let total = l + m + r;
            if best.as_ref().is_none_or(|&(best_len, ..)| total < best_len) {
                best = Some((total, left, right));
            }
        }
    }

    let whole_mode = merged_mode(runs);
    let whole_range = runs[0].range.start..runs[n - 1].range.end;
    let no_cut_len = group_bit_length(version, chars, &(whole_mode, whole_range.clone()), config)?;

    match best {
        Some((best_len, left, right)) if no_cut_len > best_len => {
            let mut result = Vec::new();
            result.extend(hill_climb(version, &runs[..left], chars, config)?);
            result.extend(hill_climb(version, &runs[left..right], chars, config)?);
            result.extend(hill_climb(version, &runs[right..], chars, config)?);
            Ok(result)
        }
        _ => Ok(vec![(whole_mode, whole_range)]),
    }
}

/// Builds the actual [`Segment`]s (with mode indicator and character-count
/// indicator) for a grouping produced by the optimizer.
pub fn build_segments(
    version: Version,
    grouping: &Grouping,
    chars: &[char],
    config: Config,
) -> QrResult<Vec<Segment>> {
    grouping
        .iter()
        .map(|(mode, range)| Segment::build(version, *mode, &text_of(chars, range), config))
        .collect()
}

fn version_supports_modes(version: Version, modes: &HashSet<Mode>) -> bool {
    modes.iter().all(|&m| version.length_bits_count(m).is_ok())
}

/// All four error correction levels, strongest first — the search order
/// used by the `(version, ecl)` selection procedure.
const ECL_SEARCH_ORDER: [EcLevel; 4] = [EcLevel::Q, EcLevel::M, EcLevel::L, EcLevel::None];

type Optimizer = fn(Version, &str, Config) -> QrResult<Grouping>;

/// Chooses `(version, ecl, segments)` for `text`, minimizing encoded bit
/// length subject to per-version mode and capacity constraints.
///
/// `max_version` bounds the search from above (inclusive); `min_ecl` is the
/// required minimum error correction level. The returned `ecl` is promoted
/// as high as capacity allows above `min_ecl`.
///
/// # Errors
///
/// Returns [`QrError::InvalidCharacter`] if a character admits no mode,
/// [`QrError::InvalidPair`] if the search space admits no legal
/// `(version, ecl, modes)` triple, and [`QrError::OverCapacity`] if a legal
/// combination exists but none has enough capacity.
pub fn analyze_text(
    text: &str,
    config: Config,
    max_version: Version,
    min_ecl: EcLevel,
) -> QrResult<(Version, EcLevel, Vec<Segment>)> {
    analyze_text_with(text, config, max_version, min_ecl, optimize_exhaustive)
}

/// Identical to [`analyze_text`] but uses [`optimize_hill_climbing`] for
/// segmentation.
pub fn analyze_text_hill_climbing(
    text: &str,
    config: Config,
    max_version: Version,
    min_ecl: EcLevel,
) -> QrResult<(Version, EcLevel, Vec<Segment>)> {
    analyze_text_with(text, config, max_version, min_ecl, optimize_hill_climbing)
}

fn analyze_text_with(
    text: &str,
    config: Config,
    max_version: Version,
    min_ecl: EcLevel,
    optimize: Optimizer,
) -> QrResult<(Version, EcLevel, Vec<Segment>)> {
    let chars: Vec<char> = text.chars().collect();
    let mut modes_used = HashSet::new();
    for &c in &chars {
        modes_used.insert(char_mode(c, config)?);
    }

    let mut versions: Vec<Version> = Version::ALL
        .into_iter()
        .filter(|&v| v <= max_version)
        .collect();
    let mut ecls: Vec<EcLevel> = ECL_SEARCH_ORDER
        .into_iter()
        .filter(|&e| e >= min_ecl)
        .collect();

    // M1/NONE is a special case: it is the only version that omits the mode
    // indicator, and the only ecl usable only there.
    if versions.contains(&Version::M1) && ecls.contains(&EcLevel::None) {
        let legal = modes_used.iter().all(|&m| m == Mode::Numeric);
        if legal {
            let grouping = optimize(Version::M1, text, config)?;
            let len = total_bit_length(Version::M1, &chars, &grouping, config)?;
            let capacity = symbol_attributes(Version::M1, EcLevel::None)?.data_bit_capacity;
            if len <= capacity {
                let segments = build_segments(Version::M1, &grouping, &chars, config)?;
                return Ok((Version::M1, EcLevel::None, segments));
            }
        }
    }
    versions.retain(|&v| v != Version::M1);
    ecls.retain(|&e| e != EcLevel::None);
    if versions.is_empty() || ecls.is_empty() {
        return Err(QrError::InvalidPair);
    }

    let weakest_ecl = *ecls.last().expect("ecls non-empty");
    let mut exists_valid_pair = false;
    let mut chosen_version = None;
    for &version in &versions {
        if !version_supports_modes(version, &modes_used) {
            continue;
        }
        let Ok(attrs) = symbol_attributes(version, weakest_ecl) else {
            continue;
        };
        exists_valid_pair = true;

        let grouping = optimize(version, text, config)?;
        let len = total_bit_length(version, &chars, &grouping, config)?;
        if len <= attrs.data_bit_capacity {
            chosen_version = Some(version);
            break;
        }
    }
    let Some(version) = chosen_version else {
        return Err(if exists_valid_pair {
            QrError::OverCapacity
        } else {
            QrError::InvalidPair
        });
    };

    for &ecl in &ecls {
        if symbol_number(version, ecl).is_err() || !version_supports_modes(version, &modes_used) {
            continue;
        }
        let grouping = optimize(version, text, config)?;
        let len = total_bit_length(version, &chars, &grouping, config)?;
        let capacity = symbol_attributes(version, ecl)?.data_bit_capacity;
        if len <= capacity {
            let segments = build_segments(version, &grouping, &chars, config)?;
            return Ok((version, ecl, segments));
        }
    }
    unreachable!("weakest_ecl already proved a fit for `version`")
}

#[cfg(test)]
mod classifier_tests {
    use super::*;

    #[test]
    fn test_char_mode_priority() {
        let config = Config::default();
        assert_eq!(char_mode('5', config), Ok(Mode::Numeric));
        assert_eq!(char_mode('A', config), Ok(Mode::Alphanumeric));
        assert_eq!(char_mode('a', config), Ok(Mode::Byte));
        assert_eq!(char_mode('月', config), Ok(Mode::Kanji));
    }
}

#[cfg(test)]
mod optimizer_tests {
    use super::*;

    #[test]
    fn test_exhaustive_numeric_only() {
        let config = Config::default();
        let grouping = optimize_exhaustive(Version::M2, "01234567", config).unwrap();
        assert_eq!(grouping.len(), 1);
        assert_eq!(grouping[0].0, Mode::Numeric);
    }

    #[test]
    fn test_exhaustive_and_hill_climbing_agree() {
        let config = Config::default();
        let samples = ["01234567", "AAAA1111", "aaaa", "A1A1A1A1", "12345AB"];
        for text in samples {
            let exhaustive_len = {
                let chars: Vec<char> = text.chars().collect();
                let g = optimize_exhaustive(Version::M4, text, config).unwrap();
                total_bit_length(Version::M4, &chars, &g, config).unwrap()
            };
            let hill_climbing_len = {
                let chars: Vec<char> = text.chars().collect();
                let g = optimize_hill_climbing(Version::M4, text, config).unwrap();
                total_bit_length(Version::M4, &chars, &g, config).unwrap()
            };
            assert_eq!(
                exhaustive_len, hill_climbing_len,
                "mismatch for {text:?}"
            );
        }
    }
}

#[cfg(test)]
mod analyzer_tests {
    use super::*;

    #[test]
    fn test_analyze_m1_special_case() {
        let config = Config::default();
        let (version, ecl, _) =
            analyze_text("1111", config, Version::M4, EcLevel::None).unwrap();
        assert_eq!(version, Version::M1);
        assert_eq!(ecl, EcLevel::None);
    }

    #[test]
    fn test_analyze_annex_i() {
        let config = Config::default();
        let (version, ecl, _) =
            analyze_text("01234567", config, Version::M4, EcLevel::None).unwrap();
        assert_eq!(version, Version::M2);
        assert_eq!(ecl, EcLevel::L);
    }

    #[test]
    fn test_analyze_byte_mode_smallest_version() {
        let config = Config::default();
        let (version, _, segments) =
            analyze_text("aaaa", config, Version::M4, EcLevel::None).unwrap();
        assert_eq!(segments[0].mode(), Mode::Byte);
        assert!(version >= Version::M1);
    }

    #[test]
    fn test_analyze_over_capacity() {
        let config = Config::default();
        let text = "1".repeat(36);
        let result = analyze_text(&text, config, Version::M4, EcLevel::L);
        assert_eq!(result.unwrap_err(), QrError::OverCapacity);
    }

    #[test]
    fn test_analyze_fits_at_boundary() {
        let config = Config::default();
        let text = "1".repeat(35);
        assert!(analyze_text(&text, config, Version::M4, EcLevel::L).is_ok());
    }

    #[test]
    fn test_analyze_invalid_character() {
        let config = Config::default();
        // U+0041..U+005A etc are fine; use a character with no byte mapping
        // in Shift-JIS and no ASCII/Alphanumeric membership.
        let result = analyze_text("\u{1F600}", config, Version::M4, EcLevel::None);
        assert!(matches!(result, Err(QrError::InvalidCharacter(_))));
    }
}
