//! Euclidean rhythm generation (Bjorklund's algorithm) and step transforms.
//!
//! A Euclidean rhythm spreads `pulses` onsets as evenly as possible over
//! `steps` positions. The generator repeatedly divides the rests among the
//! pulses, tracking quotient (`counts`) and remainder (`remainders`) per
//! level until the remainder is at most one, then flattens the resulting
//! recursion tree into a boolean sequence. The output is rotated so the
//! first step is a pulse, then the caller's rotation is applied as a
//! circular left shift.
//!
//! Generation is deterministic and allocation-light (one `Vec` of `steps`
//! booleans plus two small level tables whose length is `O(log steps)`).
//!
//! ```rust
//! use voltseq_core::euclid;
//!
//! let tresillo = euclid::generate(8, 3, 0);
//! assert_eq!(
//!     tresillo,
//!     [true, false, false, true, false, false, true, false]
//! );
//! ```

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

/// Serializable description of a Euclidean rhythm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EuclideanPattern {
    /// Pattern length. Zero produces an empty pattern.
    pub steps: usize,
    /// Onset count; clamped to `0..=steps` on generation.
    pub pulses: i32,
    /// Left rotation in steps; any integer, reduced modulo `steps`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub rotation: i32,
}

impl EuclideanPattern {
    /// Create a pattern description.
    pub const fn new(steps: usize, pulses: i32, rotation: i32) -> Self {
        Self {
            steps,
            pulses,
            rotation,
        }
    }

    /// Copy with `pulses` clamped to `0..=steps` and rotation normalized.
    pub fn clamped(self) -> Self {
        let steps_i = i64::try_from(self.steps).unwrap_or(i64::MAX);
        let pulses = i64::from(self.pulses).clamp(0, steps_i);
        Self {
            steps: self.steps,
            pulses: i32::try_from(pulses).unwrap_or(i32::MAX),
            rotation: i32::try_from(normalize_rotation(self.rotation, self.steps)).unwrap_or(0),
        }
    }

    /// Generate the step sequence.
    pub fn generate(&self) -> Vec<bool> {
        generate(self.steps, self.pulses, self.rotation)
    }
}

/// Generate a Euclidean rhythm of length `steps`.
///
/// - `pulses <= 0`: all rests.
/// - `pulses >= steps`: all onsets.
/// - `steps == 0`: empty.
///
/// `rotation` shifts the result left by `((rotation % steps) + steps) % steps`.
pub fn generate(steps: usize, pulses: i32, rotation: i32) -> Vec<bool> {
    if steps == 0 {
        return Vec::new();
    }
    let pulses = usize::try_from(pulses).unwrap_or(0);

    let mut pattern = if pulses == 0 {
        vec![false; steps]
    } else if pulses >= steps {
        vec![true; steps]
    } else {
        bjorklund(steps, pulses)
    };

    pattern.rotate_left(normalize_rotation(rotation, steps));
    pattern
}

/// Generate a Euclidean rhythm with per-onset velocities.
///
/// Onsets are counted in emission order (not by step index). The first onset
/// and every `accent_every`-th one after it get `accent_velocity`; the rest get
/// `base_velocity`. `accent_every == 0` disables accents. Rests are `None`.
/// Velocities are clamped to `[0, 1]`.
///
/// ```rust
/// use voltseq_core::euclid;
///
/// let steps = euclid::generate_with_velocity(8, 4, 0, 2, 1.0, 0.5);
/// assert_eq!(
///     steps,
///     [Some(1.0), None, Some(0.5), None, Some(1.0), None, Some(0.5), None]
/// );
/// ```
pub fn generate_with_velocity(
    steps: usize,
    pulses: i32,
    rotation: i32,
    accent_every: usize,
    accent_velocity: f32,
    base_velocity: f32,
) -> Vec<Option<f32>> {
    accent(
        &generate(steps, pulses, rotation),
        accent_every,
        accent_velocity,
        base_velocity,
    )
}

/// Assign velocities to the onsets of any step pattern.
///
/// Same accent rule as [`generate_with_velocity`]: onsets are counted in
/// order, the first and every `accent_every`-th one after it are accented.
pub fn accent(
    pattern: &[bool],
    accent_every: usize,
    accent_velocity: f32,
    base_velocity: f32,
) -> Vec<Option<f32>> {
    let accent = crate::math::clamp_unit(accent_velocity);
    let base = crate::math::clamp_unit(base_velocity);
    let mut emitted = 0usize;

    pattern
        .iter()
        .map(|&on| {
            on.then(|| {
                let is_accent = accent_every > 0 && emitted % accent_every == 0;
                emitted += 1;
                if is_accent { accent } else { base }
            })
        })
        .collect()
}

/// Reverse the step order.
pub fn reverse(pattern: &[bool]) -> Vec<bool> {
    pattern.iter().rev().copied().collect()
}

/// Swap onsets and rests.
pub fn invert(pattern: &[bool]) -> Vec<bool> {
    pattern.iter().map(|&on| !on).collect()
}

/// Circular shift toward index 0 by `n` steps.
pub fn shift_left(pattern: &[bool], n: usize) -> Vec<bool> {
    let mut out = pattern.to_vec();
    if !out.is_empty() {
        let len = out.len();
        out.rotate_left(n % len);
    }
    out
}

/// Circular shift away from index 0 by `n` steps.
pub fn shift_right(pattern: &[bool], n: usize) -> Vec<bool> {
    let mut out = pattern.to_vec();
    if !out.is_empty() {
        let len = out.len();
        out.rotate_right(n % len);
    }
    out
}

/// Half-speed: each step is followed by a rest. Length doubles.
pub fn double(pattern: &[bool]) -> Vec<bool> {
    pattern.iter().flat_map(|&on| [on, false]).collect()
}

/// Double-speed: keep every even-indexed step. Length becomes `ceil(n / 2)`.
pub fn halve(pattern: &[bool]) -> Vec<bool> {
    pattern.iter().step_by(2).copied().collect()
}

/// Number of onsets in a pattern.
pub fn pulse_count(pattern: &[bool]) -> usize {
    pattern.iter().filter(|&&on| on).count()
}

fn normalize_rotation(rotation: i32, steps: usize) -> usize {
    if steps == 0 {
        return 0;
    }
    let steps = i64::try_from(steps).unwrap_or(i64::MAX);
    // ((r % n) + n) % n, computed in i64 so it cannot overflow.
    let r = (i64::from(rotation) % steps + steps) % steps;
    usize::try_from(r).unwrap_or(0)
}

/// Bjorklund's algorithm for `0 < pulses < steps`.
fn bjorklund(steps: usize, pulses: usize) -> Vec<bool> {
    let mut counts: Vec<usize> = Vec::new();
    let mut remainders: Vec<usize> = vec![pulses];
    let mut divisor = steps - pulses;
    let mut level = 0usize;

    loop {
        counts.push(divisor / remainders[level]);
        remainders.push(divisor % remainders[level]);
        divisor = remainders[level];
        level += 1;
        if remainders[level] <= 1 {
            break;
        }
    }
    counts.push(divisor);

    let mut pattern = Vec::with_capacity(steps);
    build(level as isize, &counts, &remainders, &mut pattern);
    debug_assert_eq!(pattern.len(), steps);

    // Start on the first onset.
    if let Some(first) = pattern.iter().position(|&on| on) {
        pattern.rotate_left(first);
    }
    pattern
}

/// Flatten one level of the recursion tree. Level `-1` is a rest, `-2` an onset.
fn build(level: isize, counts: &[usize], remainders: &[usize], pattern: &mut Vec<bool>) {
    match level {
        -1 => pattern.push(false),
        -2 => pattern.push(true),
        _ => {
            let index = level as usize;
            for _ in 0..counts[index] {
                build(level - 1, counts, remainders, pattern);
            }
            if remainders[index] != 0 {
                build(level - 2, counts, remainders, pattern);
            }
        }
    }
}
