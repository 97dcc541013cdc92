use serde::{Deserialize, Serialize};

/// A single transcribed or annotated note.
///
/// On the wire a note is the 3-element array `[onset_seconds, offset_seconds, pitch]`,
/// where pitch is a (possibly fractional) MIDI note number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Note {
    pub onset: f64,
    pub offset: f64,
    pub pitch: f64,
}

impl Note {
    pub fn new(onset: f64, offset: f64, pitch: f64) -> Self {
        Self {
            onset,
            offset,
            pitch,
        }
    }
}

impl From<[f64; 3]> for Note {
    fn from([onset, offset, pitch]: [f64; 3]) -> Self {
        Self::new(onset, offset, pitch)
    }
}

impl From<Note> for [f64; 3] {
    fn from(note: Note) -> Self {
        [note.onset, note.offset, note.pitch]
    }
}

/// One song's notes as stored in a collection file. `None` entries are
/// placeholders (`null` in JSON) and are skipped during preparation.
pub type NoteList = Vec<Option<Note>>;

/// Filtered, time-aligned notes for one side of a comparison.
///
/// `intervals[i]` and `pitches[i]` describe the same note. Pitches stay in
/// MIDI units until [`NoteSet::pitches_hz`] is called.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteSet {
    pub intervals: Vec<[f64; 2]>,
    pub pitches: Vec<f64>,
}

impl NoteSet {
    pub fn push(&mut self, onset: f64, offset: f64, pitch: f64) {
        self.intervals.push([onset, offset]);
        self.pitches.push(pitch);
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Add a constant number of semitones to every pitch.
    pub fn shift_pitches(&mut self, semitones: f64) {
        for p in &mut self.pitches {
            *p += semitones;
        }
    }

    pub fn pitches_hz(&self) -> Vec<f64> {
        self.pitches.iter().map(|&m| midi_to_hz(m)).collect()
    }
}

/// Convert a (fractional) MIDI note number to frequency in Hz, A4 = 440 Hz.
pub fn midi_to_hz(midi: f64) -> f64 {
    440.0 * 2.0_f64.powf((midi - 69.0) / 12.0)
}
