use std::fmt::{Debug, Display};
use std::iter::Sum;
use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

use rustfft::num_traits::{Float, FloatConst};
use rustfft::FftNum;

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Floating-point width used by a whole analysis pipeline.
///
/// Implemented for `f32` and `f64` only. A session is monomorphised over one
/// of them and never mixes the two.
pub trait Sample:
    sealed::Sealed
    + FftNum
    + Float
    + FloatConst
    + Sum
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + Default
    + Debug
    + Display
    + Into<f64>
{
    /// Converts an `f64` constant into this precision.
    fn of(value: f64) -> Self;

    /// Converts an index or count into this precision.
    fn of_usize(value: usize) -> Self;
}

impl Sample for f32 {
    #[inline]
    fn of(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn of_usize(value: usize) -> Self {
        value as f32
    }
}

impl Sample for f64 {
    #[inline]
    fn of(value: f64) -> Self {
        value
    }

    #[inline]
    fn of_usize(value: usize) -> Self {
        value as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_conversions() {
        assert_eq!(<f32 as Sample>::of(0.5), 0.5f32);
        assert_eq!(<f64 as Sample>::of_usize(7), 7.0f64);
        let widened: f64 = <f32 as Sample>::of(1.25).into();
        assert_eq!(widened, 1.25);
    }
}
