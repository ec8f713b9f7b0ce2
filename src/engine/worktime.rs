/// Baseline expected daily duration when the user has none configured or
/// the configured value is unusable.
pub const DEFAULT_EXPECTED_HOURS: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkSplit {
    pub overtime: f64,
    pub deficit: f64,
}

/// Splits a day's worked hours against the expected daily hours. Exactly one
/// side of the split is nonzero, except at equality where both are zero.
pub fn split_overtime(total_hours: f64, expected_hours: f64) -> WorkSplit {
    let total = if total_hours.is_finite() && total_hours > 0.0 {
        total_hours
    } else {
        0.0
    };
    let expected = if expected_hours.is_finite() && expected_hours > 0.0 {
        expected_hours
    } else {
        DEFAULT_EXPECTED_HOURS
    };

    if total > expected {
        WorkSplit {
            overtime: total - expected,
            deficit: 0.0,
        }
    } else {
        WorkSplit {
            overtime: 0.0,
            deficit: expected - total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overtime_when_over_expected() {
        let split = split_overtime(10.0, 8.0);
        assert_eq!(split.overtime, 2.0);
        assert_eq!(split.deficit, 0.0);
    }

    #[test]
    fn deficit_when_under_expected() {
        let split = split_overtime(6.0, 8.0);
        assert_eq!(split.overtime, 0.0);
        assert_eq!(split.deficit, 2.0);
    }

    #[test]
    fn equality_yields_both_zero() {
        let split = split_overtime(8.0, 8.0);
        assert_eq!(split.overtime, 0.0);
        assert_eq!(split.deficit, 0.0);
    }

    #[test]
    fn negative_total_clamps_to_zero() {
        let split = split_overtime(-3.0, 8.0);
        assert_eq!(split.overtime, 0.0);
        assert_eq!(split.deficit, 8.0);
    }

    #[test]
    fn bad_expected_falls_back_to_default() {
        let split = split_overtime(9.0, 0.0);
        assert_eq!(split.overtime, 1.0);
        let split = split_overtime(9.0, f64::NAN);
        assert_eq!(split.overtime, 1.0);
    }
}
