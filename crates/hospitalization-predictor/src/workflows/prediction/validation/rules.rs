use super::ValidationErrorKind;

/// Tolerance applied to the step-grid remainder.
pub const STEP_EPSILON: f64 = 1e-8;

/// Whether `value` sits on the `step` grid, within [`STEP_EPSILON`].
pub fn step_aligned(value: f64, step: f64) -> bool {
    let remainder = (value / step).rem_euclid(1.0);
    remainder <= STEP_EPSILON || 1.0 - remainder <= STEP_EPSILON
}

/// Inclusive range with an optional step grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRule {
    pub min: f64,
    pub max: f64,
    pub step: Option<f64>,
}

impl NumericRule {
    pub const fn range(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            step: None,
        }
    }

    pub const fn stepped(min: f64, max: f64, step: f64) -> Self {
        Self {
            min,
            max,
            step: Some(step),
        }
    }

    /// Range first, then the step grid.
    pub(crate) fn check(&self, value: f64) -> Option<ValidationErrorKind> {
        if value < self.min || value > self.max {
            return Some(ValidationErrorKind::Range {
                min: self.min,
                max: self.max,
                actual: value,
            });
        }
        match self.step {
            Some(step) if !step_aligned(value, step) => Some(ValidationErrorKind::Step {
                required_step: step,
                actual_value: value,
            }),
            _ => None,
        }
    }
}

pub(crate) const AGE: NumericRule = NumericRule::range(1.0, 120.0);
pub(crate) const TEMPERATURE: NumericRule = NumericRule::stepped(34.0, 43.0, 0.1);
pub(crate) const OXYGEN: NumericRule = NumericRule::stepped(80.0, 100.0, 0.1);
