use super::float_ext::FloatExt;

pub const fn bpm_to_milliseconds(bpm: f64, delimiter: Option<i32>) -> f64 {
    60_000.0 / i32_unwrap_or(delimiter, 4) as f64 / bpm
}

pub const fn milliseconds_to_bpm(ms: f64, delimiter: Option<i32>) -> f64 {
    60_000.0 / (ms * i32_unwrap_or(delimiter, 4) as f64)
}

// `Option::unwrap_or` is not const
const fn i32_unwrap_or(option: Option<i32>, default: i32) -> i32 {
    match option {
        Some(value) => value,
        None => default,
    }
}

// `f64::exp` is not const
pub fn logistic(x: f64, midpoint_offset: f64, multiplier: f64, max_value: Option<f64>) -> f64 {
    max_value.unwrap_or(1.0) / (1.0 + f64::exp(multiplier * (midpoint_offset - x)))
}

/// The standard logistic function `1 / (1 + e^-x)`.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + f64::exp(-x))
}

/// Generalized mean `(a^p + b^p)^(1/p)`.
pub fn power_mean(a: f64, b: f64, p: f64) -> f64 {
    (a.powf(p) + b.powf(p)).powf(p.recip())
}

/// Smooth approximation of `min(a, b)`; a higher `power` makes it sharper.
pub fn softmin(a: f64, b: f64, power: f64) -> f64 {
    a * b / f64::ln(power.powf(a) + power.powf(b))
}

/// `1 - min(a, b) / max(a, b)`
pub fn rhythm_difference(t1: f64, t2: f64) -> f64 {
    let max = t1.max(t2);

    if max.eq(0.0) {
        return 0.0;
    }

    1.0 - t1.min(t2) / max
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_mean_of_zero() {
        assert!(power_mean(0.0, 3.0, 1.1).almost_eq(3.0, 1e-12));
        assert!(power_mean(0.0, 0.0, 1.5).eq(0.0));
    }

    #[test]
    fn softmin_is_below_min() {
        let value = softmin(10.0, 4.0, 5.0);

        assert!(value < 4.0);
        assert!(value.almost_eq(2.4849, 1e-3), "{value}");

        // Closer values are pushed further below the minimum
        assert!(softmin(4.0, 4.0, 5.0) < value);
    }

    #[test]
    fn rhythm_difference_guards_zero() {
        assert!(rhythm_difference(0.0, 0.0).eq(0.0));
        assert!(rhythm_difference(100.0, 200.0).eq(0.5));
    }
}
