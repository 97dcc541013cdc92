use serde::{Deserialize, Serialize};

use crate::note::{Note, NoteSet};

/// Reference and estimate notes after filtering and clock alignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreparedNotes {
    pub reference: NoteSet,
    pub estimate: NoteSet,
}

/// Filter raw note lists and align the two clocks by `time_shift` seconds.
///
/// Only one side is ever moved:
/// - `time_shift >= 0`: every estimate note is delayed by `time_shift`.
/// - `time_shift < 0`: every reference note is delayed by `|time_shift|`.
///
/// A note survives when it is non-null, has positive duration, and its
/// (possibly shifted) onset is not negative. Pitches are copied through in
/// MIDI units; nothing is returned for dropped notes and empty outputs are
/// not an error.
pub fn prepare(reference: &[Option<Note>], estimate: &[Option<Note>], time_shift: f64) -> PreparedNotes {
    let (reference_shift, estimate_shift) = if time_shift >= 0.0 {
        (0.0, time_shift)
    } else {
        (-time_shift, 0.0)
    };

    PreparedNotes {
        reference: filter_shifted(reference, reference_shift),
        estimate: filter_shifted(estimate, estimate_shift),
    }
}

fn filter_shifted(notes: &[Option<Note>], shift: f64) -> NoteSet {
    let mut set = NoteSet::default();

    for note in notes.iter().flatten() {
        // Duration is judged on the unshifted timestamps.
        if note.offset - note.onset > 0.0 && note.onset + shift >= 0.0 {
            set.push(note.onset + shift, note.offset + shift, note.pitch);
        }
    }

    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn n(onset: f64, offset: f64, pitch: f64) -> Option<Note> {
        Some(Note::new(onset, offset, pitch))
    }

    #[test]
    fn drops_nulls_and_non_positive_durations() {
        let notes = vec![n(0.0, 1.0, 60.0), None, n(2.0, 2.0, 61.0), n(3.0, 2.5, 62.0), n(4.0, 4.5, 63.0)];
        let prepared = prepare(&notes, &notes, 0.0);

        assert_eq!(prepared.reference.intervals, vec![[0.0, 1.0], [4.0, 4.5]]);
        assert_eq!(prepared.reference.pitches, vec![60.0, 63.0]);
        assert_eq!(prepared.estimate, prepared.reference);
    }

    #[test]
    fn drops_negative_onsets() {
        let notes = vec![n(-0.5, 1.0, 60.0), n(0.0, 1.0, 61.0)];
        let prepared = prepare(&notes, &[], 0.0);
        assert_eq!(prepared.reference.pitches, vec![61.0]);
        assert!(prepared.estimate.is_empty());
    }

    #[test]
    fn positive_shift_moves_estimate_only() {
        let reference = vec![n(1.0, 2.0, 60.0)];
        let estimate = vec![n(1.0, 2.0, 60.0), n(-0.25, 0.5, 62.0), n(-0.75, 0.5, 64.0)];
        let prepared = prepare(&reference, &estimate, 0.5);

        assert_eq!(prepared.reference.intervals, vec![[1.0, 2.0]]);
        // -0.25 + 0.5 >= 0 survives, -0.75 + 0.5 does not
        assert_eq!(prepared.estimate.intervals, vec![[1.5, 2.5], [0.25, 1.0]]);
        assert_eq!(prepared.estimate.pitches, vec![60.0, 62.0]);
    }

    #[test]
    fn negative_shift_moves_reference_only() {
        let reference = vec![n(1.0, 2.0, 60.0), n(-0.5, 0.5, 62.0)];
        let estimate = vec![n(1.0, 2.0, 60.0), n(-0.1, 0.5, 62.0)];
        let prepared = prepare(&reference, &estimate, -0.5);

        assert_eq!(prepared.reference.intervals, vec![[1.5, 2.5], [0.0, 1.0]]);
        // The estimate is unshifted, so its negative onset is still dropped.
        assert_eq!(prepared.estimate.intervals, vec![[1.0, 2.0]]);
    }

    #[test]
    fn shifted_note_with_zero_duration_stays_dropped() {
        let estimate = vec![n(1.0, 1.0, 60.0)];
        let prepared = prepare(&[], &estimate, 1.0);
        assert!(prepared.estimate.is_empty());
    }
}
