//! Segment shaping curves for envelope phases.
//!
//! Each curve maps normalized phase progress `t ∈ [0, 1]` to normalized
//! output `y ∈ [0, 1]` with `apply(0) = 0`, `apply(1) = 1`, monotonic in
//! between. Input is clamped before evaluation.
//!
//! | Curve | Formula | Character |
//! |-------|---------|-----------|
//! | [`Curve::Linear`] | `t` | constant rate |
//! | [`Curve::Exponential`] | `t²` | slow start, steep finish |
//! | [`Curve::Logarithmic`] | `√t` | steep start, slow finish |
//! | [`Curve::SCurve`] | `t²(3 − 2t)` | smoothstep ease-in/ease-out |

use crate::math::clamp_unit;
use libm::{asinf, sinf, sqrtf};

/// Envelope segment curve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Curve {
    /// `y = t`
    #[default]
    Linear,
    /// `y = t²`
    Exponential,
    /// `y = √t`
    Logarithmic,
    /// `y = t²(3 − 2t)`
    SCurve,
}

impl Curve {
    /// All curve variants, in declaration order.
    pub const ALL: [Curve; 4] = [
        Curve::Linear,
        Curve::Exponential,
        Curve::Logarithmic,
        Curve::SCurve,
    ];

    /// Evaluate the curve at `t` (clamped to `[0, 1]`).
    ///
    /// # Example
    /// ```rust
    /// use voltseq_core::Curve;
    ///
    /// assert_eq!(Curve::Linear.apply(0.5), 0.5);
    /// assert_eq!(Curve::Exponential.apply(0.5), 0.25);
    /// assert_eq!(Curve::SCurve.apply(0.5), 0.5);
    /// assert_eq!(Curve::Logarithmic.apply(2.0), 1.0);
    /// ```
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = clamp_unit(t);
        match self {
            Curve::Linear => t,
            Curve::Exponential => t * t,
            Curve::Logarithmic => sqrtf(t),
            Curve::SCurve => t * t * (3.0 - 2.0 * t),
        }
    }

    /// Invert the curve: the progress `t` for which `apply(t) == y`.
    ///
    /// `y` is clamped to `[0, 1]`. Used to seed a legato segment at the point
    /// where the attack curve already equals the current level.
    pub fn inverse(self, y: f32) -> f32 {
        let y = clamp_unit(y);
        let t = match self {
            Curve::Linear => y,
            Curve::Exponential => sqrtf(y),
            Curve::Logarithmic => y * y,
            // Closed-form inverse of smoothstep.
            Curve::SCurve => 0.5 - sinf(asinf(1.0 - 2.0 * y) / 3.0),
        };
        clamp_unit(t)
    }

    /// Short lowercase name, matching the serialized form.
    pub fn name(self) -> &'static str {
        match self {
            Curve::Linear => "linear",
            Curve::Exponential => "exponential",
            Curve::Logarithmic => "logarithmic",
            Curve::SCurve => "s_curve",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_fixed() {
        for curve in Curve::ALL {
            assert_eq!(curve.apply(0.0), 0.0, "{curve:?} at 0");
            assert!((curve.apply(1.0) - 1.0).abs() < 1e-6, "{curve:?} at 1");
        }
    }

    #[test]
    fn input_is_clamped() {
        for curve in Curve::ALL {
            assert_eq!(curve.apply(-1.0), 0.0);
            assert!((curve.apply(3.0) - 1.0).abs() < 1e-6);
            assert_eq!(curve.apply(f32::NAN), 0.0);
        }
    }

    #[test]
    fn exponential_lags_linear_and_logarithmic_leads() {
        for i in 1..10 {
            let t = i as f32 / 10.0;
            assert!(Curve::Exponential.apply(t) < t);
            assert!(Curve::Logarithmic.apply(t) > t);
        }
    }

    #[test]
    fn inverse_undoes_apply() {
        for curve in Curve::ALL {
            for i in 0..=20 {
                let t = i as f32 / 20.0;
                let back = curve.inverse(curve.apply(t));
                assert!(
                    (back - t).abs() < 1e-3,
                    "{curve:?}: inverse(apply({t})) = {back}"
                );
            }
        }
    }

    #[test]
    fn monotonic_on_unit_interval() {
        for curve in Curve::ALL {
            let mut prev = curve.apply(0.0);
            for i in 1..=1000 {
                let y = curve.apply(i as f32 / 1000.0);
                assert!(y >= prev, "{curve:?} not monotonic at step {i}");
                prev = y;
            }
        }
    }
}
