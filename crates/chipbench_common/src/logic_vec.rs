//! Packed vectors of 4-state logic values used for pins and buses.

use crate::logic::Logic;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A fixed-width vector of 4-state [`Logic`] values.
///
/// Each logic value occupies 2 bits, with 32 values packed per `u64` word.
/// Index 0 is the least significant bit.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicVec {
    width: u32,
    /// Packed storage: 2 bits per logic value, 32 values per u64.
    data: Vec<u64>,
}

/// Number of logic values packed per u64 word.
const VALUES_PER_WORD: u32 = 32;

/// Packed word with every 2-bit lane set to `X` (0b10).
const ALL_X_WORD: u64 = 0xAAAA_AAAA_AAAA_AAAA;

impl LogicVec {
    /// Creates a new `LogicVec` of the given width, initialized to all `Zero`.
    pub fn new(width: u32) -> Self {
        Self {
            width,
            data: vec![0; word_count(width)],
        }
    }

    /// Returns the number of logic values in this vector.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Gets the logic value at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn get(&self, index: u32) -> Logic {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word_idx = (index / VALUES_PER_WORD) as usize;
        let bit_offset = (index % VALUES_PER_WORD) * 2;
        Logic::from_bits(self.data[word_idx] >> bit_offset)
    }

    /// Sets the logic value at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn set(&mut self, index: u32, value: Logic) {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word_idx = (index / VALUES_PER_WORD) as usize;
        let bit_offset = (index % VALUES_PER_WORD) * 2;
        let mask = !(0b11u64 << bit_offset);
        self.data[word_idx] = (self.data[word_idx] & mask) | ((value as u64) << bit_offset);
    }

    /// Creates a `LogicVec` with all bits set to `Zero`.
    pub fn all_zero(width: u32) -> Self {
        Self::new(width)
    }

    /// Creates a `LogicVec` with all bits set to `One`.
    ///
    /// This is the "-1" pattern a testbench writes to enable every input.
    pub fn all_one(width: u32) -> Self {
        Self::filled(width, Logic::One)
    }

    /// Creates a `LogicVec` with all bits set to `X`.
    pub fn all_x(width: u32) -> Self {
        let mut v = Self {
            width,
            data: vec![ALL_X_WORD; word_count(width)],
        };
        v.clear_unused();
        v
    }

    /// Creates a `LogicVec` with every bit set to `value`.
    pub fn filled(width: u32, value: Logic) -> Self {
        let mut v = Self::new(width);
        for i in 0..width {
            v.set(i, value);
        }
        v
    }

    /// Creates a single-bit `LogicVec` from a boolean value.
    pub fn from_bool(value: bool) -> Self {
        let mut v = Self::new(1);
        v.set(0, Logic::from_bool(value));
        v
    }

    /// Creates a `LogicVec` from a `u64` value with the given width.
    ///
    /// Bits beyond the given width are ignored.
    pub fn from_u64(value: u64, width: u32) -> Self {
        let mut v = Self::new(width);
        for i in 0..width.min(64) {
            if (value >> i) & 1 != 0 {
                v.set(i, Logic::One);
            }
        }
        v
    }

    /// Parses a binary string like `"10XZ"` into a `LogicVec`.
    ///
    /// The leftmost character is the most significant bit. Returns `None` if
    /// the string contains invalid characters.
    pub fn from_binary_str(s: &str) -> Option<Self> {
        let mut v = Self::new(s.len() as u32);
        for (i, c) in s.chars().rev().enumerate() {
            v.set(i as u32, Logic::from_char(c)?);
        }
        Some(v)
    }

    /// Converts the `LogicVec` to a `u64`, if all bits are definite (0 or 1).
    ///
    /// Returns `None` if the vector contains X or Z values, or if the width
    /// exceeds 64 bits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.width > 64 {
            return None;
        }
        let mut result = 0u64;
        for i in 0..self.width {
            match self.get(i) {
                Logic::Zero => {}
                Logic::One => result |= 1 << i,
                Logic::X | Logic::Z => return None,
            }
        }
        Some(result)
    }

    /// Returns the least significant bit, or `X` for a zero-width vector.
    pub fn lsb(&self) -> Logic {
        if self.width == 0 {
            Logic::X
        } else {
            self.get(0)
        }
    }

    /// Returns true if no bit is `X` or `Z`.
    pub fn is_fully_defined(&self) -> bool {
        (0..self.width).all(|i| self.get(i).is_definite())
    }

    /// Returns true if all bits are `Logic::One`.
    pub fn is_all_one(&self) -> bool {
        self.width > 0 && (0..self.width).all(|i| self.get(i) == Logic::One)
    }

    /// Zeroes the packed lanes above `width` so equality stays structural.
    fn clear_unused(&mut self) {
        let used = self.width % VALUES_PER_WORD;
        if used != 0 {
            if let Some(last) = self.data.last_mut() {
                *last &= (1u64 << (used * 2)) - 1;
            }
        }
    }
}

impl fmt::Display for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.width).rev() {
            write!(f, "{}", self.get(i))?;
        }
        Ok(())
    }
}

impl fmt::Debug for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogicVec({self})")
    }
}

/// Computes the number of u64 words needed to store `width` logic values.
fn word_count(width: u32) -> usize {
    width.div_ceil(VALUES_PER_WORD) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_all_zero() {
        let v = LogicVec::new(8);
        assert_eq!(v.width(), 8);
        assert_eq!(v.to_u64(), Some(0));
    }

    #[test]
    fn all_one_is_minus_one_pattern() {
        let v = LogicVec::all_one(12);
        assert_eq!(v.to_u64(), Some(0xFFF));
        assert!(v.is_all_one());
    }

    #[test]
    fn all_x_is_undefined() {
        let v = LogicVec::all_x(40);
        assert!(!v.is_fully_defined());
        assert_eq!(v.to_u64(), None);
        assert_eq!(v.get(39), Logic::X);
        assert_eq!(v, LogicVec::filled(40, Logic::X));
    }

    #[test]
    fn from_u64_truncates_to_width() {
        let v = LogicVec::from_u64(0x1FF, 8);
        assert_eq!(v.to_u64(), Some(0xFF));
    }

    #[test]
    fn to_u64_rejects_wide_vectors() {
        let v = LogicVec::new(65);
        assert_eq!(v.to_u64(), None);
    }

    #[test]
    fn set_and_get_across_words() {
        let mut v = LogicVec::new(70);
        v.set(0, Logic::One);
        v.set(33, Logic::Z);
        v.set(69, Logic::X);
        assert_eq!(v.get(0), Logic::One);
        assert_eq!(v.get(33), Logic::Z);
        assert_eq!(v.get(69), Logic::X);
        assert_eq!(v.get(1), Logic::Zero);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn get_out_of_bounds_panics() {
        LogicVec::new(4).get(4);
    }

    #[test]
    fn lsb_of_single_bit() {
        assert_eq!(LogicVec::from_bool(true).lsb(), Logic::One);
        assert_eq!(LogicVec::from_bool(false).lsb(), Logic::Zero);
        assert_eq!(LogicVec::new(0).lsb(), Logic::X);
    }

    #[test]
    fn binary_str_msb_first() {
        let v = LogicVec::from_binary_str("10XZ").unwrap();
        assert_eq!(v.get(3), Logic::One);
        assert_eq!(v.get(0), Logic::Z);
        assert_eq!(v.to_string(), "10XZ");
        assert!(LogicVec::from_binary_str("102").is_none());
    }

    #[test]
    fn zero_width_is_not_all_one() {
        assert!(!LogicVec::new(0).is_all_one());
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", LogicVec::from_u64(5, 4)), "LogicVec(0101)");
    }

    #[test]
    fn serde_roundtrip() {
        let v = LogicVec::from_binary_str("1X0Z").unwrap();
        let json = serde_json::to_string(&v).unwrap();
        let back: LogicVec = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
