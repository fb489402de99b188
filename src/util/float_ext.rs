pub trait FloatExt: Sized {
    /// `self == other`
    fn eq(self, other: Self) -> bool;

    /// `self != other`
    fn not_eq(self, other: Self) -> bool;

    /// Whether `self` and `other` are at most `acceptable_difference` apart.
    fn almost_eq(self, other: Self, acceptable_difference: Self) -> bool;

    /// Linear interpolation between `start` and `end` by `amount`.
    fn lerp(start: Self, end: Self, amount: Self) -> Self;
}

macro_rules! impl_float_ext {
    ( $ty:ty ) => {
        impl FloatExt for $ty {
            fn eq(self, other: Self) -> bool {
                (self - other).abs() < <$ty>::EPSILON
            }

            fn not_eq(self, other: Self) -> bool {
                (self - other).abs() >= <$ty>::EPSILON
            }

            fn almost_eq(self, other: Self, acceptable_difference: Self) -> bool {
                (self - other).abs() <= acceptable_difference
            }

            fn lerp(start: Self, end: Self, amount: Self) -> Self {
                start + (end - start) * amount
            }
        }
    };
}

impl_float_ext!(f32);
impl_float_ext!(f64);

#[cfg(test)]
mod tests {
    use super::FloatExt;

    #[test]
    fn lerp_bounds() {
        assert!(<f64 as FloatExt>::lerp(0.75, 1.0, 0.0).eq(0.75));
        assert!(<f64 as FloatExt>::lerp(0.75, 1.0, 1.0).eq(1.0));
        assert!(<f64 as FloatExt>::lerp(1.0, 10.0, 0.5).eq(5.5));
    }
}
