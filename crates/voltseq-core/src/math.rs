//! Normalization helpers shared by the control-rate path.
//!
//! Every numeric input to the core is clamped rather than rejected. These
//! helpers are the single place where that rule is spelled out, including the
//! treatment of NaN (which `f32::clamp` would otherwise propagate).

/// Clamp to `[0, 1]`, mapping NaN to `0.0`.
///
/// # Example
/// ```rust
/// use voltseq_core::clamp_unit;
///
/// assert_eq!(clamp_unit(1.5), 1.0);
/// assert_eq!(clamp_unit(-0.2), 0.0);
/// assert_eq!(clamp_unit(f32::NAN), 0.0);
/// ```
#[inline]
pub fn clamp_unit(x: f32) -> f32 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

/// Clamp to `[-1, 1]`, mapping NaN to `0.0`.
#[inline]
pub fn clamp_bipolar(x: f32) -> f32 {
    if x.is_nan() { 0.0 } else { x.clamp(-1.0, 1.0) }
}

/// Clamp to `[min, max]`, mapping NaN to `min`.
///
/// Tolerates swapped bounds by ordering them first.
#[inline]
pub fn clamp_range(x: f32, min: f32, max: f32) -> f32 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    if x.is_nan() { lo } else { x.clamp(lo, hi) }
}

/// Phase duration as used by the evaluator: non-finite or negative -> `0.0`.
///
/// A zero-length phase is an instantaneous jump to its end value.
#[inline]
pub(crate) fn phase_ms(ms: f32) -> f32 {
    if ms.is_finite() && ms > 0.0 { ms } else { 0.0 }
}

/// Elapsed time as used by the evaluator: NaN and negatives -> `0.0`.
#[inline]
pub(crate) fn elapsed_ms(t: f32) -> f32 {
    if t.is_nan() { 0.0 } else { t.max(0.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_range_orders_bounds() {
        assert_eq!(clamp_range(7.0, 5.0, -5.0), 5.0);
        assert_eq!(clamp_range(-7.0, 5.0, -5.0), -5.0);
        assert_eq!(clamp_range(f32::NAN, -5.0, 5.0), -5.0);
    }

    #[test]
    fn phase_ms_rejects_garbage() {
        assert_eq!(phase_ms(-3.0), 0.0);
        assert_eq!(phase_ms(f32::INFINITY), 0.0);
        assert_eq!(phase_ms(f32::NAN), 0.0);
        assert_eq!(phase_ms(12.5), 12.5);
    }

    #[test]
    fn bipolar_clamps() {
        assert_eq!(clamp_bipolar(-4.0), -1.0);
        assert_eq!(clamp_bipolar(0.25), 0.25);
    }
}
