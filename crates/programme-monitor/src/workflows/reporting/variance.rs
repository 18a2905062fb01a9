use serde::Serialize;

/// Variance of an actual value against its target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VarianceFigures {
    pub variance: f64,
    /// Unrounded; use [`VarianceFigures::percent_display`] for presentation.
    pub percent: f64,
}

impl VarianceFigures {
    /// Percent rounded to one decimal place. Never used for comparisons.
    pub fn percent_display(&self) -> f64 {
        let rounded = (self.percent * 10.0).round() / 10.0;
        if rounded == 0.0 {
            0.0
        } else {
            rounded
        }
    }

    /// Signed summary such as `-50 people (-5.0%)`.
    pub fn summary(&self, unit: &str) -> String {
        let sign = if self.variance > 0.0 { "+" } else { "" };
        format!(
            "{sign}{} {unit} ({:.1}%)",
            format_quantity(self.variance),
            self.percent_display()
        )
    }
}

/// `percent` is defined as zero when `target == 0`.
pub fn compute_variance(target: f64, actual: f64) -> VarianceFigures {
    let variance = actual - target;
    let percent = if target == 0.0 {
        0.0
    } else {
        (variance / target) * 100.0
    };

    VarianceFigures { variance, percent }
}

pub(crate) fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn computes_negative_variance_against_target() {
        let figures = compute_variance(1000.0, 950.0);
        assert_eq!(figures.variance, -50.0);
        assert_eq!(figures.percent, -5.0);
        assert_eq!(figures.percent_display(), -5.0);
    }

    #[test]
    fn zero_target_yields_zero_percent() {
        let figures = compute_variance(0.0, 42.0);
        assert_eq!(figures.variance, 42.0);
        assert_eq!(figures.percent, 0.0);
    }

    #[test]
    fn display_rounding_keeps_internal_precision() {
        let figures = compute_variance(3.0, 2.0);
        assert!((figures.percent - (-33.333_333_333)).abs() < 1e-6);
        assert_eq!(figures.percent_display(), -33.3);
    }

    #[test]
    fn summary_signs_positive_variance_only() {
        assert_eq!(
            compute_variance(1000.0, 950.0).summary("people"),
            "-50 people (-5.0%)"
        );
        assert_eq!(
            compute_variance(100.0, 112.5).summary("km"),
            "+12.5 km (12.5%)"
        );
        assert_eq!(compute_variance(80.0, 80.0).summary("boreholes"), "0 boreholes (0.0%)");
    }

    proptest! {
        #[test]
        fn variance_is_actual_minus_target(target in 0.001f64..1.0e9, actual in -1.0e9f64..1.0e9) {
            let figures = compute_variance(target, actual);
            prop_assert_eq!(figures.variance, actual - target);
            prop_assert!(figures.percent.is_finite());
        }

        #[test]
        fn zero_target_never_divides(actual in -1.0e12f64..1.0e12) {
            prop_assert_eq!(compute_variance(0.0, actual).percent, 0.0);
        }
    }
}
