//! Snap MIDI notes to a scale.
//!
//! The quantizer works in semitones relative to a root. For each note it
//! computes the pitch class `(note − root) mod 12` and octave, then scans the
//! scale's intervals in ascending order. Every interval is tried directly,
//! then one octave up (`+12`), then one octave down (`−12`), so a note near
//! the top of the octave can snap to the root above it. A candidate only
//! replaces the current best when it is strictly closer: on an exact tie the
//! candidate scanned first wins.
//!
//! ```rust
//! use voltseq_core::{Scale, ScaleQuantizer};
//!
//! let q = ScaleQuantizer::new(Scale::Major);
//! assert_eq!(q.quantize(61, 60), 60); // C# -> C (tie with D, C scanned first)
//! assert_eq!(q.quantize(66, 60), 65); // F# -> F (tie with G)
//! assert_eq!(q.quantize(71, 60), 71); // B is in the scale
//! ```

/// Built-in scales.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Scale {
    /// All twelve semitones.
    #[default]
    Chromatic,
    /// Ionian.
    Major,
    /// Natural minor (Aeolian).
    Minor,
    /// Dorian.
    Dorian,
    /// Mixolydian.
    Mixolydian,
    /// Major pentatonic.
    PentatonicMajor,
    /// Minor pentatonic.
    PentatonicMinor,
    /// Minor blues hexatonic.
    Blues,
}

impl Scale {
    /// Semitone offsets from the root, ascending.
    pub fn intervals(self) -> &'static [u8] {
        match self {
            Scale::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
            Scale::Major => &[0, 2, 4, 5, 7, 9, 11],
            Scale::Minor => &[0, 2, 3, 5, 7, 8, 10],
            Scale::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            Scale::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            Scale::PentatonicMajor => &[0, 2, 4, 7, 9],
            Scale::PentatonicMinor => &[0, 3, 5, 7, 10],
            Scale::Blues => &[0, 3, 5, 6, 7, 10],
        }
    }
}

/// Quantizer over a fixed interval set.
///
/// Stores the intervals inline (no allocation), sorted and de-duplicated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScaleQuantizer {
    intervals: [u8; 12],
    len: usize,
}

impl Default for ScaleQuantizer {
    fn default() -> Self {
        Self::new(Scale::Chromatic)
    }
}

impl ScaleQuantizer {
    /// Quantizer for a built-in scale.
    pub fn new(scale: Scale) -> Self {
        Self::from_intervals(scale.intervals())
    }

    /// Quantizer for a custom interval set.
    ///
    /// Intervals are reduced modulo 12, sorted and de-duplicated. An empty set
    /// leaves notes unchanged.
    pub fn from_intervals(intervals: &[u8]) -> Self {
        let mut present = [false; 12];
        for &interval in intervals {
            present[usize::from(interval % 12)] = true;
        }

        let mut sorted = [0u8; 12];
        let mut len = 0;
        for (semitone, _) in present.iter().enumerate().filter(|(_, p)| **p) {
            sorted[len] = semitone as u8;
            len += 1;
        }
        Self {
            intervals: sorted,
            len,
        }
    }

    /// Active intervals, ascending.
    pub fn intervals(&self) -> &[u8] {
        &self.intervals[..self.len]
    }

    /// Whether `note` already lies on the scale rooted at `root`.
    pub fn contains(&self, note: u8, root: u8) -> bool {
        let pitch_class = (i32::from(note) - i32::from(root)).rem_euclid(12);
        self.intervals()
            .iter()
            .any(|&interval| i32::from(interval) == pitch_class)
    }

    /// Nearest scale note to `note` for the scale rooted at `root`.
    ///
    /// A nearest note that falls outside `0..=127` is folded back by one
    /// octave, so the result is always a scale note in the MIDI range.
    pub fn quantize(&self, note: u8, root: u8) -> u8 {
        if self.len == 0 {
            return note;
        }
        let relative = i32::from(note) - i32::from(root);
        let octave = relative.div_euclid(12);
        let pitch_class = relative.rem_euclid(12);

        let mut best = i32::from(self.intervals[0]);
        let mut best_distance = i32::MAX;
        for &interval in self.intervals() {
            let interval = i32::from(interval);
            for candidate in [interval, interval + 12, interval - 12] {
                let distance = (pitch_class - candidate).abs();
                if distance < best_distance {
                    best = candidate;
                    best_distance = distance;
                }
            }
        }

        let mut snapped = i32::from(root) + octave * 12 + best;
        if snapped > 127 {
            snapped -= 12;
        } else if snapped < 0 {
            snapped += 12;
        }
        snapped as u8
    }
}

/// Pitch CV for a MIDI note at 1 V/octave, with middle C (60) at 0 V.
#[inline]
pub fn note_to_volts(note: u8) -> f32 {
    (f32::from(note) - 60.0) / 12.0
}
