// SPDX-FileCopyrightText: 2017 kennytm
// SPDX-FileCopyrightText: 2025 Shun Sakai
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Checked numeric narrowing helpers, used wherever a bit-width or table
//! index conversion must not silently wrap.

pub trait Truncate {
    fn truncate_as_u8(self) -> u8;
}

impl Truncate for u16 {
    #[allow(clippy::cast_possible_truncation)]
    fn truncate_as_u8(self) -> u8 {
        self as u8
    }
}

impl Truncate for u32 {
    #[allow(clippy::cast_possible_truncation)]
    fn truncate_as_u8(self) -> u8 {
        self as u8
    }
}

impl Truncate for usize {
    #[allow(clippy::cast_possible_truncation)]
    fn truncate_as_u8(self) -> u8 {
        self as u8
    }
}

#[allow(clippy::wrong_self_convention)]
pub trait As {
    fn as_u32(self) -> u32;
    fn as_usize(self) -> usize;
}

macro_rules! impl_as {
    ($ty:ty) => {
        #[cfg(debug_assertions)]
        impl As for $ty {
            fn as_u32(self) -> u32 {
                u32::try_from(self).unwrap()
            }

            fn as_usize(self) -> usize {
                usize::try_from(self).unwrap()
            }
        }

        #[cfg(not(debug_assertions))]
        impl As for $ty {
            fn as_u32(self) -> u32 {
                self as u32
            }

            fn as_usize(self) -> usize {
                self as usize
            }
        }
    };
}
impl_as!(u32);
impl_as!(usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(0x1_u32.truncate_as_u8(), 1);
        assert_eq!(255_usize.truncate_as_u8(), 255);
    }

    #[test]
    fn test_as_roundtrip() {
        assert_eq!(7_usize.as_u32(), 7_u32);
        assert_eq!(7_u32.as_usize(), 7_usize);
    }
}
