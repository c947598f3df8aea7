//! Conversion of unitless grid values to physical units for display.
//!
//! Conversions are piecewise-linear over fixed breakpoint tables.

/// Breakpoints mapping normalized precipitation to millimetres per year
pub const PRECIPITATION_MM_PER_YEAR: [(f32, f32); 6] = [
    (0.0, 0.0),
    (0.2, 250.0),
    (0.4, 500.0),
    (0.6, 1000.0),
    (0.8, 2000.0),
    (1.0, 4000.0),
];

/// Piecewise-linear interpolation over breakpoints sorted by input.
/// Inputs outside the table clamp to the first or last output.
pub fn piecewise_linear(breakpoints: &[(f32, f32)], value: f32) -> f32 {
    let Some(&(first_in, first_out)) = breakpoints.first() else {
        return value;
    };
    if value <= first_in || value.is_nan() {
        return first_out;
    }
    for pair in breakpoints.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if value <= x1 {
            let span = x1 - x0;
            if span <= 0.0 {
                return y1;
            }
            return y0 + (value - x0) / span * (y1 - y0);
        }
    }
    breakpoints[breakpoints.len() - 1].1
}

/// Normalized precipitation to millimetres per year.
pub fn precipitation_mm_per_year(normalized: f32) -> f32 {
    piecewise_linear(&PRECIPITATION_MM_PER_YEAR, normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakpoints_exact() {
        for &(input, output) in &PRECIPITATION_MM_PER_YEAR {
            assert!((precipitation_mm_per_year(input) - output).abs() < 1e-3);
        }
    }

    #[test]
    fn test_interpolates_and_clamps() {
        assert!((precipitation_mm_per_year(0.7) - 1500.0).abs() < 1e-2);
        assert_eq!(precipitation_mm_per_year(-1.0), 0.0);
        assert_eq!(precipitation_mm_per_year(2.0), 4000.0);
    }

    #[test]
    fn test_monotonic() {
        let mut prev = precipitation_mm_per_year(0.0);
        for i in 1..=100 {
            let v = precipitation_mm_per_year(i as f32 / 100.0);
            assert!(v >= prev);
            prev = v;
        }
    }
}
