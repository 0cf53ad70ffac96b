/// Mathematical utility functions shared by the transport solvers
///
/// Interpolation helpers, interface averaging, and the deviation assertion
/// macro used throughout the test suites.

use crate::constants::CONDUCTIVITY_EPSILON;

/// Assert that the deviation between two values is less than a threshold
///
/// Calculates the percentage deviation between `actual` and `expected`, then
/// asserts that this deviation is less than the specified `max_deviation`.
#[macro_export]
macro_rules! assert_deviation {
    ($actual:expr, $expected:expr, $max_deviation:expr) => {
        {
            let actual_val = $actual;
            let expected_val = $expected;
            let max_dev = $max_deviation;
            let actual_deviation = $crate::math_utils::deviation(actual_val, expected_val);

            if actual_deviation >= max_dev {
                panic!(
                    "assertion failed: deviation {:.2}% >= {:.2}%\n  actual: {:?},\n  expected: {:?}",
                    actual_deviation, max_dev, actual_val, expected_val
                );
            }
        }
    };
    ($actual:expr, $expected:expr, $max_deviation:expr, $($arg:tt)+) => {
        {
            let actual_val = $actual;
            let expected_val = $expected;
            let max_dev = $max_deviation;
            let actual_deviation = $crate::math_utils::deviation(actual_val, expected_val);

            if actual_deviation >= max_dev {
                panic!(
                    "assertion failed: deviation {:.2}% >= {:.2}%: {}\n  actual: {:?},\n  expected: {:?}",
                    actual_deviation, max_dev, format_args!($($arg)+), actual_val, expected_val
                );
            }
        }
    };
}

/// Linear interpolation between two values
///
/// # Arguments
/// * `a` - Start value
/// * `b` - End value
/// * `ratio` - Interpolation ratio (0.0 = a, 1.0 = b)
pub fn lerp(a: f64, b: f64, ratio: f64) -> f64 {
    a + (b - a) * ratio
}

/// Percentage deviation of `actual` from `expected`
///
/// Returns 0.0 when both are zero; deviation is relative to the larger
/// magnitude so the result is symmetric in its arguments.
pub fn deviation(actual: f64, expected: f64) -> f64 {
    let scale = actual.abs().max(expected.abs());
    if scale < f64::EPSILON {
        0.0
    } else {
        (actual - expected).abs() / scale * 100.0
    }
}

/// Harmonic mean of two interface values: `2ab / (a + b)`
///
/// The correct averaging rule for flux continuity across a material
/// discontinuity. The epsilon keeps the result finite when both sides are
/// zero; a single zero side yields a near-zero interface value, so flux
/// degrades instead of diverging.
pub fn harmonic_mean(a: f64, b: f64) -> f64 {
    2.0 * a * b / (a + b + CONDUCTIVITY_EPSILON)
}

/// Evaluate a `(key, value)` table by linear interpolation
///
/// Keys must be sorted ascending. Queries outside the table clamp to the
/// first or last entry.
pub fn interpolate_table(table: &[(f64, f64)], key: f64) -> f64 {
    if table.is_empty() {
        return 0.0;
    }
    if key <= table[0].0 {
        return table[0].1;
    }
    if key >= table[table.len() - 1].0 {
        return table[table.len() - 1].1;
    }

    for window in table.windows(2) {
        let (k1, v1) = window[0];
        let (k2, v2) = window[1];
        if key >= k1 && key <= k2 {
            let f = (key - k1) / (k2 - k1);
            return lerp(v1, v2, f);
        }
    }

    0.0 // Fallback
}
