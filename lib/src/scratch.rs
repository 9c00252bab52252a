//! Scalar scratch slots for passing extra values across a call boundary.
//!
//! The slots carry no meaning of their own; callers agree on what each
//! offset holds. All access is bounds-checked.

use crate::error::{Error, Result};

pub const F64_SLOTS: usize = 128;
pub const I64_SLOTS: usize = 16;

#[derive(Clone, Debug, PartialEq)]
pub struct ScratchBuffers {
    doubles: [f64; F64_SLOTS],
    ints: [i64; I64_SLOTS],
}

impl Default for ScratchBuffers {
    fn default() -> Self {
        Self::new()
    }
}

fn out_of_range(index: usize, len: usize) -> Error {
    Error::IndexOutOfRange { index, len }
}

impl ScratchBuffers {
    pub const fn new() -> Self {
        Self {
            doubles: [0.0; F64_SLOTS],
            ints: [0; I64_SLOTS],
        }
    }

    pub fn f64(&self, index: usize) -> Result<f64> {
        self.doubles
            .get(index)
            .copied()
            .ok_or_else(|| out_of_range(index, F64_SLOTS))
    }

    pub fn set_f64(&mut self, index: usize, value: f64) -> Result<()> {
        let slot = self
            .doubles
            .get_mut(index)
            .ok_or_else(|| out_of_range(index, F64_SLOTS))?;
        *slot = value;
        Ok(())
    }

    pub fn i64(&self, index: usize) -> Result<i64> {
        self.ints
            .get(index)
            .copied()
            .ok_or_else(|| out_of_range(index, I64_SLOTS))
    }

    pub fn set_i64(&mut self, index: usize, value: i64) -> Result<()> {
        let slot = self
            .ints
            .get_mut(index)
            .ok_or_else(|| out_of_range(index, I64_SLOTS))?;
        *slot = value;
        Ok(())
    }

    /// Zero every slot.
    pub fn clear(&mut self) {
        self.doubles.fill(0.0);
        self.ints.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_round_trip() {
        let mut s = ScratchBuffers::new();
        s.set_f64(127, 2.5).unwrap();
        s.set_i64(15, -7).unwrap();
        assert_eq!(s.f64(127), Ok(2.5));
        assert_eq!(s.i64(15), Ok(-7));
        assert_eq!(s.f64(0), Ok(0.0));
        s.clear();
        assert_eq!(s.f64(127), Ok(0.0));
        assert_eq!(s.i64(15), Ok(0));
    }

    #[test]
    fn out_of_range_is_checked() {
        let mut s = ScratchBuffers::new();
        assert_eq!(
            s.f64(128),
            Err(Error::IndexOutOfRange { index: 128, len: 128 })
        );
        assert_eq!(
            s.set_i64(16, 1),
            Err(Error::IndexOutOfRange { index: 16, len: 16 })
        );
        assert!(s.set_f64(usize::MAX, 1.0).is_err());
        assert!(s.i64(99).is_err());
    }
}
